use std::path::{Path, PathBuf};

use rigcal_extrinsics::{check_observations, Camera, EdgeStore, Pose, RelativePose};

use crate::{
    camera_file::write_camera_txt, edge_cache::EdgeCache, intrinsics::read_intrinsics_ini,
    manifest::RigManifest, pose_file::read_pose_txt, RigIoError,
};

/// Source of freshly measured relative poses for camera pairs missing from the cache.
pub trait PairwiseEstimator {
    /// Estimate the edge from camera `source` to camera `target`.
    ///
    /// Returns `None` when the pair cannot be measured at all.
    fn estimate(
        &mut self,
        source: &Camera,
        target: &Camera,
    ) -> Result<Option<RelativePose>, RigIoError>;
}

/// Estimator that never measures anything; only cached edges are used.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedEdgesOnly;

impl PairwiseEstimator for CachedEdgesOnly {
    fn estimate(&mut self, _: &Camera, _: &Camera) -> Result<Option<RelativePose>, RigIoError> {
        Ok(None)
    }
}

/// Everything needed to resolve the extrinsics of a rig.
#[derive(Debug, Clone)]
pub struct RigInputs {
    /// The cameras, in manifest order.
    pub cameras: Vec<Camera>,
    /// Edges between the cameras.
    pub store: EdgeStore,
    /// Optional direct absolute observation per camera.
    pub absolute: Vec<Option<Pose>>,
}

/// Load the cameras of the manifest with their intrinsics.
pub fn load_cameras(manifest: &RigManifest) -> Result<Vec<Camera>, RigIoError> {
    manifest
        .cameras
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let path = manifest.intrinsics_dir.join(format!("{}.ini", label));
            let intrinsics = read_intrinsics_ini(&path)?;
            log::info!("loaded intrinsics of {} from {}", label, path.display());
            Ok(Camera::new(index, label.clone(), intrinsics))
        })
        .collect()
}

/// Build the edge store of the rig, reusing cached edges and estimating the others.
///
/// Every ordered pair of distinct cameras is visited. Freshly estimated edges with
/// fewer than `min_observations` observations are discarded with a warning and
/// never cached; cached edges under the threshold are skipped the same way.
pub fn populate_edge_store<E: PairwiseEstimator>(
    cameras: &[Camera],
    cache: &EdgeCache,
    min_observations: usize,
    estimator: &mut E,
) -> Result<EdgeStore, RigIoError> {
    let mut store = EdgeStore::new(cameras.len());

    for source in cameras {
        for target in cameras {
            if source.index == target.index {
                continue;
            }

            let edge = cache.load_or_compute(&source.label, &target.label, || {
                let edge = estimator.estimate(source, target)?;
                Ok(edge.filter(|e| accept_edge(source, target, e, min_observations)))
            })?;

            if let Some(edge) = edge {
                if accept_edge(source, target, &edge, min_observations) {
                    store.insert(source.index, target.index, edge)?;
                }
            }
        }
    }

    log::info!(
        "edge store holds {} edges between {} cameras",
        store.len(),
        cameras.len()
    );
    Ok(store)
}

fn accept_edge(source: &Camera, target: &Camera, edge: &RelativePose, minimum: usize) -> bool {
    match check_observations(source.index, target.index, edge.num_observations, minimum) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("skipping edge {} -> {}: {}", source.label, target.label, err);
            false
        }
    }
}

/// Load the optional absolute pose `<dir>/<label>.pose` of every camera.
pub fn load_absolute_poses(
    cameras: &[Camera],
    dir: Option<&Path>,
) -> Result<Vec<Option<Pose>>, RigIoError> {
    let Some(dir) = dir else {
        return Ok(vec![None; cameras.len()]);
    };

    cameras
        .iter()
        .map(|camera| {
            let path = dir.join(format!("{}.pose", camera.label));
            if !path.exists() {
                return Ok(None);
            }
            log::info!("absolute pose of {} from {}", camera.label, path.display());
            read_pose_txt(&path).map(Some)
        })
        .collect()
}

/// Load everything the manifest describes.
pub fn load_rig_inputs<E: PairwiseEstimator>(
    manifest: &RigManifest,
    estimator: &mut E,
) -> Result<RigInputs, RigIoError> {
    let cameras = load_cameras(manifest)?;
    let cache = EdgeCache::create(&manifest.edges_dir)?;
    let store = populate_edge_store(&cameras, &cache, manifest.min_pair_observations, estimator)?;
    let absolute = load_absolute_poses(&cameras, manifest.absolute_dir.as_deref())?;
    Ok(RigInputs {
        cameras,
        store,
        absolute,
    })
}

/// Write one `<label>.txt` calibration file per camera into `dir`.
pub fn write_rig_cameras(
    dir: impl AsRef<Path>,
    cameras: &[Camera],
    poses: &[Pose],
) -> Result<(), RigIoError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| RigIoError::io(dir, e))?;
    for (camera, pose) in cameras.iter().zip(poses) {
        write_camera_txt(dir.join(format!("{}.txt", camera.label)), &camera.intrinsics, pose)?;
    }
    Ok(())
}

/// Directory of the snapshot taken after sweep `iteration`.
pub fn snapshot_dir(output_dir: impl AsRef<Path>, iteration: usize) -> PathBuf {
    output_dir.as_ref().join(format!("iter_{:04}", iteration))
}

/// Write the poses after sweep `iteration` into `<output_dir>/iter_<NNNN>/`.
pub fn write_snapshot(
    output_dir: impl AsRef<Path>,
    iteration: usize,
    cameras: &[Camera],
    poses: &[Pose],
) -> Result<PathBuf, RigIoError> {
    let dir = snapshot_dir(output_dir, iteration);
    write_rig_cameras(&dir, cameras, poses)?;
    log::debug!("snapshot of sweep {} written to {}", iteration, dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_file::read_camera_txt;
    use glam::DVec3;
    use rigcal_extrinsics::CameraIntrinsics;

    fn cameras(n: usize) -> Vec<Camera> {
        (0..n)
            .map(|i| {
                let intrinsics = CameraIntrinsics::new((500.0, 500.0), (320.0, 240.0), (640, 480));
                Camera::new(i, format!("cam{}", i), intrinsics)
            })
            .collect()
    }

    struct ChainEstimator {
        calls: usize,
        num_observations: usize,
    }

    impl PairwiseEstimator for ChainEstimator {
        fn estimate(
            &mut self,
            source: &Camera,
            target: &Camera,
        ) -> Result<Option<RelativePose>, RigIoError> {
            self.calls += 1;
            if target.index != source.index + 1 {
                return Ok(None);
            }
            let t = DVec3::new(-1.0, 0.0, 0.0);
            Ok(Some(RelativePose::new(
                glam::DMat3::IDENTITY,
                t,
                self.num_observations,
            )))
        }
    }

    #[test]
    fn test_populate_uses_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let cache = EdgeCache::create(dir.path())?;
        let cameras = cameras(3);

        let mut estimator = ChainEstimator {
            calls: 0,
            num_observations: 50,
        };
        let store = populate_edge_store(&cameras, &cache, 10, &mut estimator)?;
        assert_eq!(estimator.calls, 6);
        assert_eq!(store.len(), 2);
        assert!(store.has_edge(0, 1) && store.has_edge(1, 2));

        // cached pairs are not estimated again
        let mut estimator = ChainEstimator {
            calls: 0,
            num_observations: 50,
        };
        let again = populate_edge_store(&cameras, &cache, 10, &mut estimator)?;
        assert_eq!(estimator.calls, 4);
        assert_eq!(again.get_edge(0, 1), store.get_edge(0, 1));
        assert_eq!(again.get_edge(1, 2), store.get_edge(1, 2));

        let cached = populate_edge_store(&cameras, &cache, 10, &mut CachedEdgesOnly)?;
        assert_eq!(cached.len(), 2);
        Ok(())
    }

    #[test]
    fn test_populate_skips_weak_pairs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let cache = EdgeCache::create(dir.path())?;
        let cameras = cameras(3);

        let mut estimator = ChainEstimator {
            calls: 0,
            num_observations: 5,
        };
        let store = populate_edge_store(&cameras, &cache, 10, &mut estimator)?;
        assert!(store.is_empty());
        assert!(!cache.edge_path("cam0", "cam1").exists());
        Ok(())
    }

    #[test]
    fn test_load_absolute_poses() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let cameras = cameras(2);
        let pose = Pose::new(glam::DMat3::IDENTITY, DVec3::new(0.0, 1.0, 0.0));
        crate::pose_file::write_pose_txt(dir.path().join("cam1.pose"), &pose)?;

        let absolute = load_absolute_poses(&cameras, Some(dir.path()))?;
        assert_eq!(absolute, vec![None, Some(pose)]);
        assert_eq!(load_absolute_poses(&cameras, None)?, vec![None, None]);
        Ok(())
    }

    #[test]
    fn test_write_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let cameras = cameras(2);
        let poses = vec![Pose::IDENTITY, Pose::new(glam::DMat3::IDENTITY, DVec3::X)];

        let snapshot = write_snapshot(dir.path(), 7, &cameras, &poses)?;
        assert_eq!(snapshot, dir.path().join("iter_0007"));

        let (_, pose) = read_camera_txt(snapshot.join("cam1.txt"))?;
        assert_eq!(pose, poses[1]);
        Ok(())
    }
}
