//! # SO(3): 3D rotations
//!
//! Rotations are stored as unit quaternions (double precision). A quaternion `q`
//! and `-q` describe the same rotation; [`SO3::log`] always picks the
//! representative with a non-negative scalar part, so the returned rotation
//! vector has an angle in `[0, π]`.
//!
//! The exp/log maps convert between rotations and rotation vectors (axis scaled
//! by the angle in radians), the representation used when averaging rotations.

use glam::{DMat3, DQuat, DVec3};

const SMALL_ANGLE_EPSILON: f64 = 1.0e-10;

/// A 3D rotation, stored as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SO3 {
    /// The unit quaternion.
    pub q: DQuat,
}

impl SO3 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { q: DQuat::IDENTITY };

    /// Create a rotation from a 3x3 rotation matrix.
    pub fn from_matrix(mat: &DMat3) -> Self {
        Self {
            q: DQuat::from_mat3(mat).normalize(),
        }
    }

    /// The rotation as a 3x3 matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.q)
    }

    /// The inverse rotation.
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.inverse(),
        }
    }

    /// Rotation vector -> rotation.
    pub fn exp(v: DVec3) -> Self {
        let theta_sq = v.dot(v);
        let theta = theta_sq.sqrt();
        let theta_half = 0.5 * theta;

        let (w, b) = if theta < SMALL_ANGLE_EPSILON {
            // taylor expansion of cos(x/2) and sin(x/2)/x around 0
            (1.0 - theta_sq / 8.0, 0.5 - theta_sq / 48.0)
        } else {
            (theta_half.cos(), theta_half.sin() / theta)
        };

        let xyz = b * v;

        Self {
            q: DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, w).normalize(),
        }
    }

    /// Rotation -> rotation vector with angle in `[0, π]`.
    pub fn log(&self) -> DVec3 {
        let mut w = self.q.w;
        let mut vec = DVec3::new(self.q.x, self.q.y, self.q.z);

        if w < 0.0 {
            w = -w;
            vec = -vec;
        }

        let sin_half_theta = vec.length();

        if sin_half_theta > SMALL_ANGLE_EPSILON {
            let half_theta = sin_half_theta.atan2(w);
            vec * (2.0 * half_theta / sin_half_theta)
        } else {
            vec * (2.0 / w)
        }
    }

    /// The rotation angle in radians, in `[0, π]`.
    pub fn angle(&self) -> f64 {
        self.log().length()
    }

    /// Geodesic distance to another rotation in radians.
    pub fn angle_to(&self, other: &Self) -> f64 {
        (self.inverse() * *other).angle()
    }
}

impl Default for SO3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SO3> for SO3 {
    type Output = SO3;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            q: (self.q * rhs.q).normalize(),
        }
    }
}

impl std::ops::Mul<DVec3> for SO3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.q * rhs
    }
}

/// Convert a row-major 3x3 array into a matrix.
pub fn rows_to_mat3(rows: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(rows).transpose()
}

/// Convert a matrix into a row-major 3x3 array.
pub fn mat3_to_rows(mat: &DMat3) -> [[f64; 3]; 3] {
    mat.transpose().to_cols_array_2d()
}
