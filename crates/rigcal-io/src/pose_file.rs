use std::path::Path;

use rigcal_extrinsics::Pose;

use crate::{
    text::{content_lines, format_row, parse_array, read_to_string, write_string},
    RigIoError,
};

/// Read an absolute camera pose from a text file.
///
/// The file holds the three rows of the rotation followed by one line with the
/// translation.
pub fn read_pose_txt(path: impl AsRef<Path>) -> Result<Pose, RigIoError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;

    let mut lines = content_lines(&text);
    let mut next_line = |what: &str| {
        lines.next().ok_or_else(|| {
            RigIoError::parse(path, text.lines().count(), format!("missing {}", what))
        })
    };

    let mut rotation = [[0.0; 3]; 3];
    for row in rotation.iter_mut() {
        let (line_number, line) = next_line("rotation row")?;
        *row = parse_array(line, path, line_number)?;
    }

    let (line_number, line) = next_line("translation")?;
    let translation: [f64; 3] = parse_array(line, path, line_number)?;

    Ok(Pose::from_rows(&rotation, &translation))
}

/// Write an absolute camera pose to a text file readable by [`read_pose_txt`].
pub fn write_pose_txt(path: impl AsRef<Path>, pose: &Pose) -> Result<(), RigIoError> {
    let mut contents = String::new();
    for row in pose.rotation_rows() {
        contents.push_str(&format_row(&row));
        contents.push('\n');
    }
    contents.push_str(&format_row(&pose.translation.to_array()));
    contents.push('\n');
    write_string(path.as_ref(), &contents)
}
