use thiserror::Error;

/// Error types for rig pose resolution.
#[derive(Debug, Error, PartialEq)]
pub enum ExtrinsicsError {
    /// A camera pair shares too few observations to estimate an edge.
    #[error("pair ({source_camera}, {target_camera}) has {found} shared observations, at least {required} required")]
    InsufficientObservations {
        /// Source camera index.
        source_camera: usize,
        /// Target camera index.
        target_camera: usize,
        /// Number of observations found.
        found: usize,
        /// Minimum number of observations.
        required: usize,
    },

    /// The reference camera could not be given a pose.
    #[error("reference camera {0} has no absolute observation and no edge to anchor it")]
    MissingReferencePose(usize),

    /// Cameras unreachable from the initialized cameras through any edge chain.
    #[error("cameras {0:?} are not connected to the reference camera")]
    DisconnectedCamera(Vec<usize>),

    /// A camera received no estimate during a refinement sweep.
    #[error("camera {camera} received no pose estimate in refinement iteration {iteration}")]
    NoEvidenceForCamera {
        /// Camera index.
        camera: usize,
        /// Zero-based sweep index.
        iteration: usize,
    },

    /// The edge endpoints are equal or out of range.
    #[error("invalid camera pair ({source_camera}, {target_camera}) for a rig of {num_cameras} cameras")]
    InvalidCameraPair {
        /// Source camera index.
        source_camera: usize,
        /// Target camera index.
        target_camera: usize,
        /// Number of cameras in the rig.
        num_cameras: usize,
    },

    /// A camera index is out of range.
    #[error("camera index {index} out of range for a rig of {num_cameras} cameras")]
    InvalidCameraIndex {
        /// Offending index.
        index: usize,
        /// Number of cameras in the rig.
        num_cameras: usize,
    },

    /// A per-camera input has the wrong length.
    #[error("expected {expected} per-camera entries, got {actual}")]
    MismatchedCameraCount {
        /// Number of cameras in the rig.
        expected: usize,
        /// Number of entries provided.
        actual: usize,
    },
}
