use std::path::Path;

use rigcal_extrinsics::CameraIntrinsics;

use crate::{
    text::{content_lines, format_row, parse_array, read_to_string, write_string},
    RigIoError,
};

const SECTION: &str = "[Intrinsics]";

/// Read the intrinsics of a camera from an INI file.
///
/// The file holds a single `[Intrinsics]` section with the keys `ImageSize`
/// (width and height), `Matrix` (row-major 3x3) and `Distortion` (`k1 k2 p1 p2 k3`).
///
/// # Arguments
///
/// * `path` - The path to the INI file.
///
/// # Returns
///
/// The camera intrinsics.
pub fn read_intrinsics_ini(path: impl AsRef<Path>) -> Result<CameraIntrinsics, RigIoError> {
    let path = path.as_ref();
    parse_intrinsics_ini(&read_to_string(path)?, path)
}

/// Parse the contents of an intrinsics INI file. `path` is only used in errors.
pub fn parse_intrinsics_ini(text: &str, path: &Path) -> Result<CameraIntrinsics, RigIoError> {
    let mut in_section = false;
    let mut image_size: Option<[u32; 2]> = None;
    let mut matrix: Option<[f64; 9]> = None;
    let mut distortion: Option<[f64; 5]> = None;

    for (line_number, line) in content_lines(text) {
        if line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            in_section = line == SECTION;
            continue;
        }

        if !in_section {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(RigIoError::parse(path, line_number, "expected `key= value`"));
        };

        match key.trim() {
            "ImageSize" => image_size = Some(parse_array(value, path, line_number)?),
            "Matrix" => matrix = Some(parse_array(value, path, line_number)?),
            "Distortion" => distortion = Some(parse_array(value, path, line_number)?),
            other => log::debug!("{}: ignoring key {}", path.display(), other),
        }
    }

    let end = text.lines().count();
    let missing = |key: &str| RigIoError::parse(path, end, format!("missing key {}", key));

    let [width, height] = image_size.ok_or_else(|| missing("ImageSize"))?;
    let m = matrix.ok_or_else(|| missing("Matrix"))?;
    let distortion = distortion.ok_or_else(|| missing("Distortion"))?;

    Ok(CameraIntrinsics {
        image_size: (width, height),
        camera_matrix: [[m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]]],
        distortion,
    })
}

/// Write the intrinsics of a camera to an INI file.
pub fn write_intrinsics_ini(
    path: impl AsRef<Path>,
    intrinsics: &CameraIntrinsics,
) -> Result<(), RigIoError> {
    let matrix = intrinsics.camera_matrix.concat();
    let contents = format!(
        "{}\nImageSize= {} {}\nMatrix= {}\nDistortion= {}\n",
        SECTION,
        intrinsics.image_size.0,
        intrinsics.image_size.1,
        format_row(&matrix),
        format_row(&intrinsics.distortion),
    );
    write_string(path.as_ref(), &contents)
}
