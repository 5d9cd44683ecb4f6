use std::path::Path;

use rigcal_extrinsics::{CameraIntrinsics, Pose};

use crate::{
    text::{content_lines, format_row, parse_array, read_to_string, write_string},
    RigIoError,
};

/// Write the calibration of one camera to a text file.
///
/// Layout, one item per line:
///
/// ```text
/// width height
/// K row 0
/// K row 1
/// K row 2
/// R row 0
/// R row 1
/// R row 2
/// t0
/// t1
/// t2
/// k1 k2 p1 p2 k3
/// ```
///
/// # Arguments
///
/// * `path` - The output file.
/// * `intrinsics` - The fixed camera intrinsics.
/// * `pose` - The resolved camera pose.
pub fn write_camera_txt(
    path: impl AsRef<Path>,
    intrinsics: &CameraIntrinsics,
    pose: &Pose,
) -> Result<(), RigIoError> {
    let mut lines = Vec::with_capacity(11);
    lines.push(format!(
        "{} {}",
        intrinsics.image_size.0, intrinsics.image_size.1
    ));
    lines.extend(intrinsics.camera_matrix.iter().map(|row| format_row(row)));
    lines.extend(pose.rotation_rows().iter().map(|row| format_row(row)));
    lines.extend(pose.translation.to_array().iter().map(|v| v.to_string()));
    lines.push(format_row(&intrinsics.distortion));

    let mut contents = lines.join("\n");
    contents.push('\n');
    write_string(path.as_ref(), &contents)
}

/// Read a camera calibration written by [`write_camera_txt`].
pub fn read_camera_txt(path: impl AsRef<Path>) -> Result<(CameraIntrinsics, Pose), RigIoError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let lines = content_lines(&text).collect::<Vec<_>>();
    if lines.len() != 11 {
        return Err(RigIoError::parse(
            path,
            text.lines().count(),
            format!("expected 11 lines, found {}", lines.len()),
        ));
    }

    let [width, height]: [u32; 2] = parse_array(lines[0].1, path, lines[0].0)?;

    let mut camera_matrix = [[0.0; 3]; 3];
    for (row, (line_number, line)) in camera_matrix.iter_mut().zip(&lines[1..4]) {
        *row = parse_array(line, path, *line_number)?;
    }

    let mut rotation = [[0.0; 3]; 3];
    for (row, (line_number, line)) in rotation.iter_mut().zip(&lines[4..7]) {
        *row = parse_array(line, path, *line_number)?;
    }

    let mut translation = [0.0; 3];
    for (value, (line_number, line)) in translation.iter_mut().zip(&lines[7..10]) {
        let [v]: [f64; 1] = parse_array(line, path, *line_number)?;
        *value = v;
    }

    let distortion = parse_array(lines[10].1, path, lines[10].0)?;

    let intrinsics = CameraIntrinsics {
        image_size: (width, height),
        camera_matrix,
        distortion,
    };
    Ok((intrinsics, Pose::from_rows(&rotation, &translation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_camera_file_layout() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Kinect01.txt");

        let intrinsics = CameraIntrinsics::new((500.0, 501.0), (320.0, 240.0), (640, 480));
        let pose = Pose::new(glam::DMat3::IDENTITY, DVec3::new(0.5, -1.0, 2.0));
        write_camera_txt(&path, &intrinsics, &pose)?;

        let contents = std::fs::read_to_string(&path)?;
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "640 480");
        assert_eq!(lines[1], "500 0 320");
        assert_eq!(lines[4], "1 0 0");
        assert_eq!(lines[7..10], ["0.5", "-1", "2"]);
        assert_eq!(lines[10], "0 0 0 0 0");
        Ok(())
    }

    #[test]
    fn test_write_read_camera() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Kinect03.txt");

        let intrinsics = CameraIntrinsics::new((612.3, 611.9), (638.1, 367.4), (1280, 720))
            .with_distortion([0.2, -0.1, 0.001, 0.002, -0.03]);
        let pose = Pose::from_rotation_vector(DVec3::new(0.3, 1.2, -0.1), DVec3::new(-2.0, 0.1, 0.7));
        write_camera_txt(&path, &intrinsics, &pose)?;

        let (read_intrinsics, read_pose) = read_camera_txt(&path)?;
        assert_eq!(read_intrinsics, intrinsics);
        assert_eq!(read_pose, pose);
        Ok(())
    }
}
