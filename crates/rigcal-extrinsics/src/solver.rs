use crate::{
    bootstrap::{bootstrap_poses, BootstrapParams},
    refine::{refine_poses_with, RefineParams, SweepReport},
    EdgeStore, ExtrinsicsError, Pose, RelativePose,
};

/// Parameters of a full rig resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveParams {
    /// Index of the reference camera.
    pub reference: usize,
    /// Bootstrap parameters.
    pub bootstrap: BootstrapParams,
    /// Refinement parameters.
    pub refine: RefineParams,
}

/// Result of a full rig resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Poses assigned by the bootstrap.
    pub bootstrap_poses: Vec<Pose>,
    /// Final refined poses.
    pub poses: Vec<Pose>,
    /// One report per refinement sweep.
    pub sweeps: Vec<SweepReport>,
}

/// Resolve the absolute pose of every camera of the rig.
///
/// Runs the bootstrap followed by the consensus refinement.
///
/// Example:
///
/// ```
/// use glam::{DMat3, DVec3};
/// use rigcal_extrinsics::{resolve_extrinsics, EdgeStore, ResolveParams};
///
/// let mut store = EdgeStore::new(2);
/// store.put_edge(0, 1, DMat3::IDENTITY, DVec3::new(-1.0, 0.0, 0.0), 40).unwrap();
///
/// let resolution = resolve_extrinsics(&store, &[None, None], &ResolveParams::default()).unwrap();
/// assert_eq!(resolution.poses[1].translation, DVec3::new(-1.0, 0.0, 0.0));
/// ```
pub fn resolve_extrinsics(
    store: &EdgeStore,
    absolute: &[Option<Pose>],
    params: &ResolveParams,
) -> Result<Resolution, ExtrinsicsError> {
    resolve_extrinsics_with(store, absolute, params, |_, _| {})
}

/// Same as [`resolve_extrinsics`], calling `observer` after every refinement sweep.
pub fn resolve_extrinsics_with<F>(
    store: &EdgeStore,
    absolute: &[Option<Pose>],
    params: &ResolveParams,
    observer: F,
) -> Result<Resolution, ExtrinsicsError>
where
    F: FnMut(&SweepReport, &[Pose]),
{
    log::info!(
        "resolving {} cameras from {} edges, reference camera {}",
        store.num_cameras(),
        store.len(),
        params.reference
    );

    let bootstrap_poses = bootstrap_poses(store, absolute, params.reference, &params.bootstrap)?;
    log::info!("bootstrap initialized {} cameras", bootstrap_poses.len());

    let refined = refine_poses_with(
        store,
        &bootstrap_poses,
        params.reference,
        &params.refine,
        observer,
    )?;
    if let Some(last) = refined.sweeps.last() {
        log::info!(
            "refinement finished after {} iterations, last max deltas {:.3e} rad / {:.3e}",
            refined.sweeps.len(),
            last.max_rotation_delta(),
            last.max_translation_delta()
        );
    }

    Ok(Resolution {
        bootstrap_poses,
        poses: refined.poses,
        sweeps: refined.sweeps,
    })
}

/// Agreement between a measured edge and the final poses.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConsistency {
    /// Source camera index.
    pub source: usize,
    /// Target camera index.
    pub target: usize,
    /// Angle between measured and implied relative rotation, in radians.
    pub rotation_error: f64,
    /// Distance between measured and implied relative translation.
    pub translation_error: f64,
    /// Observation count of the measured edge.
    pub num_observations: usize,
    /// Residual of the measured edge.
    pub residual: f64,
}

/// Compare every stored edge against the relative pose implied by `poses`.
pub fn edge_consistency(store: &EdgeStore, poses: &[Pose]) -> Vec<EdgeConsistency> {
    store
        .edges()
        .filter(|((source, target), _)| *source < poses.len() && *target < poses.len())
        .map(|((source, target), edge)| {
            let implied = RelativePose::between(&poses[source], &poses[target], 0);
            let measured = Pose::new(edge.rotation, edge.translation);
            let expected = Pose::new(implied.rotation, implied.translation);
            EdgeConsistency {
                source,
                target,
                rotation_error: measured.rotation_distance(&expected),
                translation_error: measured.translation_distance(&expected),
                num_observations: edge.num_observations,
                residual: edge.residual,
            }
        })
        .collect()
}
