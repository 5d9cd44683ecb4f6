use glam::DVec3;
use rigcal_lie::{rotation_vector::align_rotation_vector, so3::SO3};

use crate::{EdgeStore, ExtrinsicsError, Pose};

/// How the estimates contributed by each edge are weighted in the average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeWeighting {
    /// Every edge contributes equally.
    #[default]
    Uniform,
    /// Every edge contributes proportionally to its observation count.
    ObservationCount,
}

/// Parameters of the consensus refinement.
#[derive(Debug, Clone)]
pub struct RefineParams {
    /// Number of synchronous sweeps to run.
    pub num_iterations: usize,
    /// Weighting of the per-edge estimates.
    pub weighting: EdgeWeighting,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            num_iterations: 100,
            weighting: EdgeWeighting::Uniform,
        }
    }
}

/// Per-camera change produced by one refinement sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// Zero-based sweep index.
    pub iteration: usize,
    /// Geodesic rotation change per camera, in radians.
    pub rotation_deltas: Vec<f64>,
    /// Translation change per camera.
    pub translation_deltas: Vec<f64>,
}

impl SweepReport {
    /// Largest rotation change of the sweep.
    pub fn max_rotation_delta(&self) -> f64 {
        self.rotation_deltas.iter().copied().fold(0.0, f64::max)
    }

    /// Largest translation change of the sweep.
    pub fn max_translation_delta(&self) -> f64 {
        self.translation_deltas.iter().copied().fold(0.0, f64::max)
    }
}

/// Result of the consensus refinement.
#[derive(Debug, Clone)]
pub struct RefineResult {
    /// Final pose per camera.
    pub poses: Vec<Pose>,
    /// One report per sweep.
    pub sweeps: Vec<SweepReport>,
}

/// Refine the absolute poses of a rig by iterated consensus averaging.
///
/// # Arguments
///
/// * `store` - The measured relative poses.
/// * `initial` - Initial pose per camera, typically from the bootstrap.
/// * `reference` - Index of the reference camera, whose pose is never modified.
/// * `params` - Refinement parameters.
pub fn refine_poses(
    store: &EdgeStore,
    initial: &[Pose],
    reference: usize,
    params: &RefineParams,
) -> Result<RefineResult, ExtrinsicsError> {
    refine_poses_with(store, initial, reference, params, |_, _| {})
}

/// Same as [`refine_poses`], calling `observer` after every sweep with its
/// report and the new pose table.
pub fn refine_poses_with<F>(
    store: &EdgeStore,
    initial: &[Pose],
    reference: usize,
    params: &RefineParams,
    mut observer: F,
) -> Result<RefineResult, ExtrinsicsError>
where
    F: FnMut(&SweepReport, &[Pose]),
{
    let num_cameras = store.num_cameras();
    if initial.len() != num_cameras {
        return Err(ExtrinsicsError::MismatchedCameraCount {
            expected: num_cameras,
            actual: initial.len(),
        });
    }
    if reference >= num_cameras {
        return Err(ExtrinsicsError::InvalidCameraIndex {
            index: reference,
            num_cameras,
        });
    }

    let mut poses = initial.to_vec();
    let mut sweeps = Vec::with_capacity(params.num_iterations);

    for iteration in 0..params.num_iterations {
        let (next, report) = refine_sweep(store, &poses, reference, params.weighting, iteration)?;

        log::debug!(
            "refinement iteration {}: max rotation delta {:.3e} rad, max translation delta {:.3e}",
            iteration,
            report.max_rotation_delta(),
            report.max_translation_delta()
        );

        observer(&report, &next);
        poses = next;
        sweeps.push(report);
    }

    Ok(RefineResult { poses, sweeps })
}

/// Run one synchronous sweep.
///
/// Every camera's new pose is computed from `poses` only; the returned table
/// replaces it as a whole. The reference entry is copied unchanged.
pub fn refine_sweep(
    store: &EdgeStore,
    poses: &[Pose],
    reference: usize,
    weighting: EdgeWeighting,
    iteration: usize,
) -> Result<(Vec<Pose>, SweepReport), ExtrinsicsError> {
    let mut next = poses.to_vec();
    let mut rotation_deltas = vec![0.0; poses.len()];
    let mut translation_deltas = vec![0.0; poses.len()];

    for camera in (0..poses.len()).filter(|&c| c != reference) {
        let pose = consensus_pose(store, poses, camera, weighting)
            .ok_or(ExtrinsicsError::NoEvidenceForCamera { camera, iteration })?;

        rotation_deltas[camera] = poses[camera].rotation_distance(&pose);
        translation_deltas[camera] = poses[camera].translation_distance(&pose);
        next[camera] = pose;
    }

    Ok((
        next,
        SweepReport {
            iteration,
            rotation_deltas,
            translation_deltas,
        },
    ))
}

/// Average of all pose estimates of `camera` implied by its edges.
///
/// Every edge `k -> camera` contributes `E · pose(k)` and every edge
/// `camera -> k` contributes `E⁻¹ · pose(k)`. Rotation vectors are aligned with
/// the camera's current rotation vector before averaging.
///
/// Returns `None` when no edge touches `camera`.
pub fn consensus_pose(
    store: &EdgeStore,
    poses: &[Pose],
    camera: usize,
    weighting: EdgeWeighting,
) -> Option<Pose> {
    let current = poses[camera].rotation_vector();

    let mut rotation_sum = DVec3::ZERO;
    let mut translation_sum = DVec3::ZERO;
    let mut weight_sum = 0.0;

    for (other, other_pose) in poses.iter().enumerate() {
        if other == camera {
            continue;
        }

        let incoming = store
            .get_edge(other, camera)
            .map(|edge| (edge.target_pose(other_pose), edge.num_observations));
        let outgoing = store
            .get_edge(camera, other)
            .map(|edge| (edge.source_pose(other_pose), edge.num_observations));

        for (estimate, num_observations) in incoming.into_iter().chain(outgoing) {
            let weight = match weighting {
                EdgeWeighting::Uniform => 1.0,
                EdgeWeighting::ObservationCount => num_observations.max(1) as f64,
            };
            let rotation_vector = SO3::from_matrix(&estimate.rotation).log();
            rotation_sum += weight * align_rotation_vector(rotation_vector, current);
            translation_sum += weight * estimate.translation;
            weight_sum += weight;
        }
    }

    if weight_sum == 0.0 {
        return None;
    }

    Some(Pose::new(
        SO3::exp(rotation_sum / weight_sum).matrix(),
        translation_sum / weight_sum,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RelativePose;
    use approx::assert_relative_eq;
    use glam::DMat3;
    use std::f64::consts::PI;

    fn pose(rv: [f64; 3], t: [f64; 3]) -> Pose {
        Pose::from_rotation_vector(DVec3::from_array(rv), DVec3::from_array(t))
    }

    fn full_store(truth: &[Pose]) -> EdgeStore {
        let mut store = EdgeStore::new(truth.len());
        for i in 0..truth.len() {
            for j in 0..truth.len() {
                if i != j {
                    store
                        .insert(i, j, RelativePose::between(&truth[i], &truth[j], 40))
                        .expect("valid pair");
                }
            }
        }
        store
    }

    #[test]
    fn test_consistent_triangle_is_fixed_point() -> Result<(), ExtrinsicsError> {
        let truth = vec![
            Pose::IDENTITY,
            pose([0.0, 0.5, 0.1], [-1.0, 0.0, 0.2]),
            pose([0.2, -0.7, 0.0], [1.0, 0.3, 0.0]),
        ];
        let store = full_store(&truth);

        let result = refine_poses(&store, &truth, 0, &RefineParams::default())?;
        assert_eq!(result.sweeps.len(), 100);
        for sweep in &result.sweeps {
            assert!(sweep.max_rotation_delta() < 1e-9);
            assert!(sweep.max_translation_delta() < 1e-9);
        }
        for (estimate, expected) in result.poses.iter().zip(truth.iter()) {
            assert!(estimate.rotation.abs_diff_eq(expected.rotation, 1e-9));
            assert!(estimate.translation.abs_diff_eq(expected.translation, 1e-9));
        }
        Ok(())
    }

    #[test]
    fn test_reference_untouched() -> Result<(), ExtrinsicsError> {
        let truth = vec![
            pose([0.3, 0.0, 0.0], [0.0, 0.0, 1.0]),
            pose([0.0, 0.5, 0.1], [-1.0, 0.0, 0.2]),
            pose([0.2, -0.7, 0.0], [1.0, 0.3, 0.0]),
        ];
        let mut store = full_store(&truth);
        // inconsistent measurements keep the other cameras moving
        let mut noisy = *store.get_edge(1, 2).expect("edge");
        noisy.translation += DVec3::new(0.05, -0.02, 0.0);
        store.insert(1, 2, noisy)?;

        let reference = truth[0];
        let mut checked = 0;
        refine_poses_with(&store, &truth, 0, &RefineParams::default(), |report, poses| {
            assert_eq!(poses[0].rotation, reference.rotation);
            assert_eq!(poses[0].translation, reference.translation);
            assert_eq!(report.rotation_deltas[0], 0.0);
            checked += 1;
        })?;
        assert_eq!(checked, 100);
        Ok(())
    }

    #[test]
    fn test_identity_reference_stays_identity() -> Result<(), ExtrinsicsError> {
        let truth = vec![
            Pose::IDENTITY,
            pose([0.0, 0.5, 0.1], [-1.0, 0.0, 0.2]),
        ];
        let store = full_store(&truth);
        let start = vec![Pose::IDENTITY, pose([0.0, 0.4, 0.1], [-0.9, 0.0, 0.2])];

        let result = refine_poses(&store, &start, 0, &RefineParams::default())?;
        assert_eq!(result.poses[0].rotation, DMat3::IDENTITY);
        assert_eq!(result.poses[0].translation, DVec3::ZERO);
        Ok(())
    }

    #[test]
    fn test_estimates_across_pi_do_not_cancel() {
        // rotations just below and just above pi about z: the second one's
        // rotation vector flips to the -z axis and has to be complemented
        let axis = DVec3::Z;
        let current = Pose::from_rotation_vector(axis * (PI - 0.05), DVec3::ZERO);
        let below = Pose::from_rotation_vector(axis * (PI - 0.03), DVec3::ZERO);
        let above = Pose::from_rotation_vector(axis * (PI + 0.03), DVec3::ZERO);
        assert!(above.rotation_vector().z < 0.0);

        let mut store = EdgeStore::new(3);
        store
            .insert(0, 2, RelativePose::between(&Pose::IDENTITY, &below, 10))
            .expect("valid pair");
        store
            .insert(1, 2, RelativePose::between(&Pose::IDENTITY, &above, 10))
            .expect("valid pair");

        let poses = [Pose::IDENTITY, Pose::IDENTITY, current];
        let averaged = consensus_pose(&store, &poses, 2, EdgeWeighting::Uniform).expect("evidence");
        let expected = Pose::from_rotation_vector(axis * PI, DVec3::ZERO);
        assert!(averaged.rotation_distance(&expected) < 1e-9);
    }

    #[test]
    fn test_same_rotation_written_two_ways_averages_to_itself() {
        // angle theta and theta - 2 pi give the same matrix, so both edges
        // log to the same canonical vector
        let theta = PI - 0.01;
        let axis = DVec3::new(1.0, 0.0, 0.0);
        let target = Pose::from_rotation_vector(axis * theta, DVec3::ZERO);

        let edge_a = RelativePose::new(SO3::exp(axis * theta).matrix(), DVec3::ZERO, 5);
        let edge_b = RelativePose::new(SO3::exp(axis * (theta - 2.0 * PI)).matrix(), DVec3::ZERO, 5);

        let mut store = EdgeStore::new(3);
        store.insert(0, 2, edge_a).expect("valid pair");
        store.insert(1, 2, edge_b).expect("valid pair");

        let poses = [Pose::IDENTITY, Pose::IDENTITY, target];
        let averaged = consensus_pose(&store, &poses, 2, EdgeWeighting::Uniform).expect("evidence");
        assert!(averaged.rotation_distance(&target) < 1e-9);
        assert_relative_eq!(averaged.rotation_vector().length(), theta, epsilon = 1e-9);
    }

    #[test]
    fn test_raw_opposed_vectors_are_complemented_before_averaging() {
        // the uncanonicalized vector of angle theta - 2 pi points away from the
        // current estimate and must be replaced by its complement
        let theta = PI - 0.01;
        let axis = DVec3::new(1.0, 0.0, 0.0);
        let current = axis * theta;
        let raw = axis * (theta - 2.0 * PI);
        assert!(raw.dot(current) < 0.0);

        let aligned = align_rotation_vector(raw, current);
        assert_relative_eq!(aligned.x, theta, epsilon = 1e-12);
        assert_relative_eq!(aligned.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(aligned.z, 0.0, epsilon = 1e-12);

        let naive = (raw + current) / 2.0;
        let averaged = (aligned + current) / 2.0;
        assert!(naive.length() < 0.1);
        assert!(SO3::exp(averaged).angle_to(&SO3::exp(current)) < 1e-9);
    }

    #[test]
    fn test_translation_average() {
        let mut store = EdgeStore::new(3);
        store
            .insert(0, 2, RelativePose::new(DMat3::IDENTITY, DVec3::new(1.0, 0.0, 0.0), 1))
            .expect("valid pair");
        store
            .insert(2, 1, RelativePose::new(DMat3::IDENTITY, DVec3::new(0.0, -3.0, 0.0), 3))
            .expect("valid pair");
        let poses = [Pose::IDENTITY; 3];

        // 0 -> 2 gives (1, 0, 0); inverting 2 -> 1 gives (0, 3, 0)
        let uniform = consensus_pose(&store, &poses, 2, EdgeWeighting::Uniform).expect("evidence");
        assert_relative_eq!(uniform.translation.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(uniform.translation.y, 1.5, epsilon = 1e-12);

        let weighted =
            consensus_pose(&store, &poses, 2, EdgeWeighting::ObservationCount).expect("evidence");
        assert_relative_eq!(weighted.translation.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(weighted.translation.y, 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_no_evidence() -> Result<(), ExtrinsicsError> {
        let mut store = EdgeStore::new(3);
        store.insert(0, 1, RelativePose::new(DMat3::IDENTITY, DVec3::X, 10))?;

        let result = refine_poses(&store, &[Pose::IDENTITY; 3], 0, &RefineParams::default());
        assert_eq!(
            result.map(|r| r.poses),
            Err(ExtrinsicsError::NoEvidenceForCamera {
                camera: 2,
                iteration: 0
            })
        );
        Ok(())
    }

    #[test]
    fn test_sweeps_are_synchronous() -> Result<(), ExtrinsicsError> {
        // camera 2 depends only on camera 1; within the first sweep it must use
        // camera 1's starting pose, not the pose camera 1 receives in that sweep
        let mut store = EdgeStore::new(3);
        store.insert(0, 1, RelativePose::new(DMat3::IDENTITY, DVec3::new(1.0, 0.0, 0.0), 10))?;
        store.insert(1, 2, RelativePose::new(DMat3::IDENTITY, DVec3::new(1.0, 0.0, 0.0), 10))?;

        let start = [Pose::IDENTITY; 3];
        let (next, report) = refine_sweep(&store, &start, 0, EdgeWeighting::Uniform, 0)?;

        // camera 1 averages 0 -> 1 (1, 0, 0) and the inverted 1 -> 2 (-1, 0, 0)
        assert_relative_eq!(next[1].translation.x, 0.0, epsilon = 1e-12);
        // camera 2 only sees camera 1 at the origin
        assert_relative_eq!(next[2].translation.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.translation_deltas[2], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_zero_iterations() -> Result<(), ExtrinsicsError> {
        let store = EdgeStore::new(2);
        let params = RefineParams {
            num_iterations: 0,
            ..Default::default()
        };
        let start = [Pose::IDENTITY, pose([0.0, 0.1, 0.0], [1.0, 0.0, 0.0])];
        let result = refine_poses(&store, &start, 0, &params)?;
        assert_eq!(result.poses, start.to_vec());
        assert!(result.sweeps.is_empty());
        Ok(())
    }
}
