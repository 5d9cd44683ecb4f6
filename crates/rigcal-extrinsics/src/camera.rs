/// Intrinsic parameters of a pinhole camera with radial-tangential distortion.
///
/// Intrinsics are loaded once and never modified while resolving extrinsics.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraIntrinsics {
    /// The image dimensions (width, height) in pixels.
    pub image_size: (u32, u32),
    /// The camera matrix, row-major.
    pub camera_matrix: [[f64; 3]; 3],
    /// Distortion coefficients `k1 k2 p1 p2 k3`.
    pub distortion: [f64; 5],
}

impl CameraIntrinsics {
    /// Creates intrinsics without distortion from focal length and principal point.
    pub fn new(focal_length: (f64, f64), principal_point: (f64, f64), image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            camera_matrix: [
                [focal_length.0, 0.0, principal_point.0],
                [0.0, focal_length.1, principal_point.1],
                [0.0, 0.0, 1.0],
            ],
            distortion: [0.0; 5],
        }
    }

    /// Returns a copy with the given distortion coefficients.
    pub fn with_distortion(mut self, distortion: [f64; 5]) -> Self {
        self.distortion = distortion;
        self
    }

    /// The focal length in pixels (fx, fy).
    pub fn focal_length(&self) -> (f64, f64) {
        (self.camera_matrix[0][0], self.camera_matrix[1][1])
    }

    /// The principal point in pixels (cx, cy).
    pub fn principal_point(&self) -> (f64, f64) {
        (self.camera_matrix[0][2], self.camera_matrix[1][2])
    }
}

/// A camera of the rig.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Index of the camera in the rig, `0..N`.
    pub index: usize,
    /// Human readable label, e.g. the device serial.
    pub label: String,
    /// Fixed intrinsic parameters.
    pub intrinsics: CameraIntrinsics,
}

impl Camera {
    /// Creates a new camera.
    pub fn new(index: usize, label: impl Into<String>, intrinsics: CameraIntrinsics) -> Self {
        Self {
            index,
            label: label.into(),
            intrinsics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsics_accessors() {
        let intrinsics = CameraIntrinsics::new((800.0, 810.0), (320.0, 240.0), (640, 480))
            .with_distortion([0.1, -0.05, 0.0, 0.0, 0.01]);
        assert_eq!(intrinsics.focal_length(), (800.0, 810.0));
        assert_eq!(intrinsics.principal_point(), (320.0, 240.0));
        assert_eq!(intrinsics.camera_matrix[2], [0.0, 0.0, 1.0]);
        assert_eq!(intrinsics.distortion[4], 0.01);
    }
}
