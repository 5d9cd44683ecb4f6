#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Rig extrinsics
//!
//! Given relative poses measured between pairs of cameras, compute one absolute
//! pose per camera in the frame of a reference camera:
//!
//! - [`edges`]: store of the measured relative poses
//! - [`bootstrap`]: initial poses propagated along edge chains
//! - [`refine`]: synchronous consensus averaging over all edges
//! - [`solver`]: the full pipeline and per-edge consistency

/// Bootstrap of the absolute poses.
pub mod bootstrap;

/// Camera identity and intrinsics.
pub mod camera;

/// Relative pose edge store.
pub mod edges;

mod error;
pub use error::ExtrinsicsError;

mod pose;
pub use pose::{Pose, RelativePose};

/// Consensus refinement of the absolute poses.
pub mod refine;

/// Full rig resolution.
pub mod solver;

pub use bootstrap::{bootstrap_poses, BootstrapOrder, BootstrapParams};
pub use camera::{Camera, CameraIntrinsics};
pub use edges::{check_observations, EdgeStore};
pub use refine::{refine_poses, EdgeWeighting, RefineParams, RefineResult, SweepReport};
pub use solver::{edge_consistency, resolve_extrinsics, EdgeConsistency, ResolveParams, Resolution};
