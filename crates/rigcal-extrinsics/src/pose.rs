use glam::{DMat3, DVec3};
use rigcal_lie::so3::{mat3_to_rows, rows_to_mat3, SO3};

/// Absolute pose of a camera.
///
/// Maps a point from the world frame into the camera frame as
/// `p_cam = rotation * p_world + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rotation from world to camera.
    pub rotation: DMat3,
    /// Translation from world to camera.
    pub translation: DVec3,
}

impl Pose {
    /// The identity pose: the camera frame is the world frame.
    pub const IDENTITY: Self = Self {
        rotation: DMat3::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a new pose.
    pub fn new(rotation: DMat3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create a pose from a row-major rotation and a translation array.
    pub fn from_rows(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Self {
        Self::new(rows_to_mat3(rotation), DVec3::from_array(*translation))
    }

    /// Create a pose from a rotation vector and a translation.
    pub fn from_rotation_vector(rotation_vector: DVec3, translation: DVec3) -> Self {
        Self::new(SO3::exp(rotation_vector).matrix(), translation)
    }

    /// The rotation as a row-major array.
    pub fn rotation_rows(&self) -> [[f64; 3]; 3] {
        mat3_to_rows(&self.rotation)
    }

    /// The rotation vector (axis-angle) of this pose's rotation.
    pub fn rotation_vector(&self) -> DVec3 {
        SO3::from_matrix(&self.rotation).log()
    }

    /// Transform a world point into the camera frame.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Camera center in world coordinates.
    pub fn center(&self) -> DVec3 {
        -(self.rotation.transpose() * self.translation)
    }

    /// Geodesic rotation distance to another pose, in radians.
    pub fn rotation_distance(&self, other: &Pose) -> f64 {
        SO3::from_matrix(&self.rotation).angle_to(&SO3::from_matrix(&other.rotation))
    }

    /// Euclidean translation distance to another pose.
    pub fn translation_distance(&self, other: &Pose) -> f64 {
        (self.translation - other.translation).length()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Measured relative pose between two cameras.
///
/// For the edge `(source, target)` a point in source camera coordinates maps to
/// target camera coordinates as `p_target = rotation * p_source + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePose {
    /// Rotation from source to target.
    pub rotation: DMat3,
    /// Translation from source to target.
    pub translation: DVec3,
    /// Number of correspondence observations used for the estimate.
    pub num_observations: usize,
    /// Residual of the estimate, typically the stereo reprojection error.
    pub residual: f64,
}

impl RelativePose {
    /// Create a new relative pose with a zero residual.
    pub fn new(rotation: DMat3, translation: DVec3, num_observations: usize) -> Self {
        Self {
            rotation,
            translation,
            num_observations,
            residual: 0.0,
        }
    }

    /// Set the residual of the estimate.
    pub fn with_residual(mut self, residual: f64) -> Self {
        self.residual = residual;
        self
    }

    /// The relative pose implied by two absolute poses, from `source` to `target`.
    pub fn between(source: &Pose, target: &Pose, num_observations: usize) -> Self {
        let rotation = target.rotation * source.rotation.transpose();
        let translation = target.translation - rotation * source.translation;
        Self::new(rotation, translation, num_observations)
    }

    /// The reverse edge, from target to source.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            rotation,
            translation: -(rotation * self.translation),
            num_observations: self.num_observations,
            residual: self.residual,
        }
    }

    /// Pose of the target camera given the pose of the source camera.
    pub fn target_pose(&self, source: &Pose) -> Pose {
        Pose::new(
            self.rotation * source.rotation,
            self.rotation * source.translation + self.translation,
        )
    }

    /// Pose of the source camera given the pose of the target camera.
    pub fn source_pose(&self, target: &Pose) -> Pose {
        let rotation_inv = self.rotation.transpose();
        Pose::new(
            rotation_inv * target.rotation,
            rotation_inv * (target.translation - self.translation),
        )
    }
}
