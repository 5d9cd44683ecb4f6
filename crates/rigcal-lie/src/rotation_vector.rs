use glam::DVec3;

/// Return the complement of a rotation vector.
///
/// A rotation of angle `θ` about `axis` is the same rotation as an angle of
/// `θ - 2π` about the same axis. The complement of `v = θ·axis` is therefore
/// `(θ - 2π)·axis`, which points the opposite way. The zero vector is its own
/// complement.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use rigcal_lie::rotation_vector::complement_rotation_vector;
///
/// let v = DVec3::new(0.0, 0.0, 3.0);
/// let c = complement_rotation_vector(v);
/// assert!((c.z - (3.0 - 2.0 * std::f64::consts::PI)).abs() < 1e-12);
/// ```
pub fn complement_rotation_vector(v: DVec3) -> DVec3 {
    let theta = v.length();
    if theta == 0.0 {
        return v;
    }
    v * ((theta - 2.0 * std::f64::consts::PI) / theta)
}

/// Align a rotation vector with a reference rotation vector before averaging.
///
/// If `candidate` points away from `reference` (negative dot product) its
/// complement is returned, otherwise `candidate` is returned unchanged. Both
/// results describe the same rotation, but only the aligned one can be averaged
/// component-wise with vectors close to `reference`.
pub fn align_rotation_vector(candidate: DVec3, reference: DVec3) -> DVec3 {
    if candidate.dot(reference) < 0.0 {
        complement_rotation_vector(candidate)
    } else {
        candidate
    }
}
