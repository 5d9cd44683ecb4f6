use std::path::PathBuf;

use rigcal_extrinsics::ExtrinsicsError;

/// Error types for the rig calibration files.
#[derive(Debug, thiserror::Error)]
pub enum RigIoError {
    /// Error reading or writing a file.
    #[error("error accessing {}: {source}", .path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Malformed text file.
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Edge blob could not be decoded.
    #[error("cannot decode edge blob {}: {message}", .path.display())]
    InvalidBlob {
        /// Offending path.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Edge blob could not be encoded.
    #[error("cannot encode edge blob {}: {source}", .path.display())]
    Encode {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: bincode::error::EncodeError,
    },

    /// Rig manifest could not be read.
    #[error("invalid rig manifest {}: {source}", .path.display())]
    Manifest {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The camera labels of a rig cannot be used together.
    #[error("invalid rig: {0}")]
    InvalidRig(String),

    /// A label does not name a camera of the rig.
    #[error("unknown camera label {0}")]
    UnknownCamera(String),

    /// Error of the pose resolution.
    #[error(transparent)]
    Extrinsics(#[from] ExtrinsicsError),
}

impl RigIoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
