#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Rig calibration rotations
//!
//! Rotations in a camera rig are averaged in rotation-vector form. This crate
//! provides the SO(3) exp/log maps and the sign alignment that keeps averages of
//! rotation vectors from cancelling out near `π`.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use rigcal_lie::so3::SO3;
//!
//! let rotation = SO3::exp(DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
//! let rotated = rotation * DVec3::X;
//! assert!((rotated.y - 1.0).abs() < 1e-12);
//! ```

/// Rotation-vector complement and alignment.
pub mod rotation_vector;

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;
