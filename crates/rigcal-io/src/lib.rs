#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Camera calibration output files.
pub mod camera_file;

/// Persistent cache of pairwise edges.
pub mod edge_cache;

mod error;
pub use error::RigIoError;

/// Camera intrinsics INI files.
pub mod intrinsics;

/// JSON description of a calibration run.
pub mod manifest;

/// End-to-end calibration runs.
pub mod pipeline;

/// Absolute pose text files.
pub mod pose_file;

/// Error report of a calibration run.
pub mod report;

/// Loading rig inputs and writing rig outputs.
pub mod rig;

mod text;

pub use camera_file::{read_camera_txt, write_camera_txt};
pub use edge_cache::EdgeCache;
pub use intrinsics::{read_intrinsics_ini, write_intrinsics_ini};
pub use manifest::RigManifest;
pub use pipeline::{calibrate_rig, Calibration};
pub use pose_file::{read_pose_txt, write_pose_txt};
pub use report::ErrorReport;
pub use rig::{
    load_rig_inputs, populate_edge_store, write_rig_cameras, write_snapshot, CachedEdgesOnly,
    PairwiseEstimator, RigInputs,
};
