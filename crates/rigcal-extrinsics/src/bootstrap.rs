use std::collections::VecDeque;

use crate::{EdgeStore, ExtrinsicsError, Pose};

/// Order in which uninitialized cameras are reached from initialized ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapOrder {
    /// Breadth-first traversal from the directly observed cameras.
    #[default]
    BreadthFirst,
    /// Up to N greedy passes, each using the first valid edge to an initialized camera.
    Passes,
}

/// Parameters of the bootstrap.
#[derive(Debug, Clone, Default)]
pub struct BootstrapParams {
    /// Traversal order.
    pub order: BootstrapOrder,
}

/// Assign an initial absolute pose to every camera of the rig.
///
/// # Arguments
///
/// * `store` - The measured relative poses.
/// * `absolute` - Direct absolute observations, one entry per camera.
/// * `reference` - Index of the reference camera.
/// * `params` - Bootstrap parameters.
///
/// When no absolute observation is supplied at all, the reference camera is
/// anchored at the identity as long as it takes part in at least one edge (or
/// is the only camera).
///
/// # Returns
///
/// One pose per camera, or the first fatal condition found.
pub fn bootstrap_poses(
    store: &EdgeStore,
    absolute: &[Option<Pose>],
    reference: usize,
    params: &BootstrapParams,
) -> Result<Vec<Pose>, ExtrinsicsError> {
    let num_cameras = store.num_cameras();
    if absolute.len() != num_cameras {
        return Err(ExtrinsicsError::MismatchedCameraCount {
            expected: num_cameras,
            actual: absolute.len(),
        });
    }
    if reference >= num_cameras {
        return Err(ExtrinsicsError::InvalidCameraIndex {
            index: reference,
            num_cameras,
        });
    }

    let mut poses = absolute.to_vec();

    if poses[reference].is_none() {
        let no_observations = absolute.iter().all(Option::is_none);
        let anchored_by_graph = num_cameras == 1 || !store.neighbors(reference).is_empty();
        if !(no_observations && anchored_by_graph) {
            return Err(ExtrinsicsError::MissingReferencePose(reference));
        }
        log::info!("anchoring reference camera {} at the identity", reference);
        poses[reference] = Some(Pose::IDENTITY);
    }

    let anchors = poses
        .iter()
        .enumerate()
        .filter_map(|(camera, pose)| pose.is_some().then_some(camera))
        .collect::<Vec<_>>();
    let unreachable = store.unreachable_from(&anchors);
    if !unreachable.is_empty() {
        return Err(ExtrinsicsError::DisconnectedCamera(unreachable));
    }

    match params.order {
        BootstrapOrder::BreadthFirst => propagate_breadth_first(store, &mut poses),
        BootstrapOrder::Passes => propagate_passes(store, &mut poses),
    }

    // every camera is reachable from an anchor, so propagation initialized it
    poses
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ExtrinsicsError::DisconnectedCamera(store.unreachable_from(&anchors)))
}

/// Pose of `target` implied by the pose of `source` and the edge between them.
///
/// The edge `source -> target` is used when measured, otherwise the inverted
/// edge `target -> source`.
pub fn propagate_pose(
    store: &EdgeStore,
    source: usize,
    source_pose: &Pose,
    target: usize,
) -> Option<Pose> {
    if let Some(edge) = store.get_edge(source, target) {
        return Some(edge.target_pose(source_pose));
    }
    store
        .get_edge(target, source)
        .map(|edge| edge.source_pose(source_pose))
}

fn propagate_breadth_first(store: &EdgeStore, poses: &mut [Option<Pose>]) {
    let mut queue = poses
        .iter()
        .enumerate()
        .filter_map(|(camera, pose)| pose.map(|_| camera))
        .collect::<VecDeque<_>>();

    while let Some(camera) = queue.pop_front() {
        let Some(camera_pose) = poses[camera] else {
            continue;
        };
        for neighbor in store.neighbors(camera) {
            if poses[neighbor].is_some() {
                continue;
            }
            if let Some(pose) = propagate_pose(store, camera, &camera_pose, neighbor) {
                log::debug!("bootstrap: camera {} from camera {}", neighbor, camera);
                poses[neighbor] = Some(pose);
                queue.push_back(neighbor);
            }
        }
    }
}

fn propagate_passes(store: &EdgeStore, poses: &mut [Option<Pose>]) {
    let num_cameras = poses.len();
    for pass in 0..num_cameras {
        if poses.iter().all(Option::is_some) {
            break;
        }
        for camera in 0..num_cameras {
            if poses[camera].is_some() {
                continue;
            }
            for other in 0..num_cameras {
                let Some(other_pose) = poses[other].filter(|_| other != camera) else {
                    continue;
                };
                if let Some(pose) = propagate_pose(store, other, &other_pose, camera) {
                    log::debug!(
                        "bootstrap pass {}: camera {} from camera {}",
                        pass,
                        camera,
                        other
                    );
                    poses[camera] = Some(pose);
                    break;
                }
            }
        }
    }
}
