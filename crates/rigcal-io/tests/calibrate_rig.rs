use std::path::Path;

use approx::assert_relative_eq;
use glam::DVec3;
use rigcal_extrinsics::{Camera, CameraIntrinsics, ExtrinsicsError, Pose, RelativePose};
use rigcal_io::{
    calibrate_rig,
    manifest::RigManifest,
    read_camera_txt, write_intrinsics_ini, CachedEdgesOnly, PairwiseEstimator, RigIoError,
};

const LABELS: [&str; 4] = ["Kinect01", "Kinect02", "Kinect03", "Kinect05"];

fn ground_truth() -> Vec<Pose> {
    (0..LABELS.len())
        .map(|i| {
            let s = i as f64;
            Pose::from_rotation_vector(
                DVec3::new(0.0, 0.6 * s, 0.05 * s),
                DVec3::new(-0.8 * s, 0.1 * s, 0.2 * s),
            )
        })
        .collect()
}

/// Measures exact edges between consecutive cameras only.
struct ChainRig {
    truth: Vec<Pose>,
    calls: usize,
}

impl PairwiseEstimator for ChainRig {
    fn estimate(
        &mut self,
        source: &Camera,
        target: &Camera,
    ) -> Result<Option<RelativePose>, RigIoError> {
        self.calls += 1;
        if source.index.abs_diff(target.index) != 1 {
            return Ok(None);
        }
        Ok(Some(RelativePose::between(
            &self.truth[source.index],
            &self.truth[target.index],
            60,
        )))
    }
}

fn write_rig(root: &Path) -> Result<RigManifest, Box<dyn std::error::Error>> {
    let intrinsics_dir = root.join("Intrinsics");
    std::fs::create_dir_all(&intrinsics_dir)?;
    for (i, label) in LABELS.iter().enumerate() {
        let intrinsics =
            CameraIntrinsics::new((500.0 + i as f64, 501.0), (320.0, 288.0), (640, 576))
                .with_distortion([0.1, -0.02, 0.0, 0.0, 0.001]);
        write_intrinsics_ini(intrinsics_dir.join(format!("{}.ini", label)), &intrinsics)?;
    }

    let manifest_path = root.join("rig.json");
    std::fs::write(
        &manifest_path,
        r#"{
            "cameras": ["Kinect01", "Kinect02", "Kinect03", "Kinect05"],
            "reference": "Kinect01",
            "intrinsics_dir": "Intrinsics",
            "edges_dir": "edges",
            "output_dir": "output",
            "num_iterations": 20,
            "snapshot_every": 10
        }"#,
    )?;
    Ok(RigManifest::from_file(&manifest_path)?)
}

#[test]
fn calibrates_rig_from_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_rig(dir.path())?;
    let truth = ground_truth();

    let mut estimator = ChainRig {
        truth: truth.clone(),
        calls: 0,
    };
    let calibration = calibrate_rig(&manifest, &mut estimator)?;
    assert_eq!(estimator.calls, 12);
    assert_eq!(calibration.cameras.len(), 4);
    assert_eq!(calibration.resolution.sweeps.len(), 20);

    for (label, expected) in LABELS.iter().zip(&truth) {
        let (intrinsics, pose) = read_camera_txt(manifest.output_dir.join(format!("{}.txt", label)))?;
        assert_eq!(intrinsics.image_size, (640, 576));
        assert!(pose.rotation_distance(expected) < 1e-9);
        assert_relative_eq!(pose.translation.x, expected.translation.x, epsilon = 1e-9);
        assert_relative_eq!(pose.translation.y, expected.translation.y, epsilon = 1e-9);
        assert_relative_eq!(pose.translation.z, expected.translation.z, epsilon = 1e-9);
    }

    assert!(manifest.output_dir.join("iter_0009").join("Kinect03.txt").exists());
    assert!(manifest.output_dir.join("iter_0019").join("Kinect03.txt").exists());
    assert!(!manifest.output_dir.join("iter_0010").exists());

    let report = std::fs::read_to_string(manifest.output_dir.join("error.txt"))?;
    assert!(report.contains("Extrinsics Error Kinect02 -> Kinect03"));
    assert!(report.contains("Iteration 19"));
    Ok(())
}

#[test]
fn rerun_reuses_cached_edges() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_rig(dir.path())?;

    let mut estimator = ChainRig {
        truth: ground_truth(),
        calls: 0,
    };
    let first = calibrate_rig(&manifest, &mut estimator)?;

    // only the cache is available the second time
    let second = calibrate_rig(&manifest, &mut CachedEdgesOnly)?;
    assert_eq!(first.resolution.poses, second.resolution.poses);

    // the report accumulates both runs
    let report = std::fs::read_to_string(manifest.output_dir.join("error.txt"))?;
    assert_eq!(report.lines().filter(|l| l.starts_with('#')).count(), 2);
    Ok(())
}

#[test]
fn missing_edges_fail_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manifest = write_rig(dir.path())?;

    let result = calibrate_rig(&manifest, &mut CachedEdgesOnly);
    assert!(matches!(
        result,
        Err(RigIoError::Extrinsics(ExtrinsicsError::MissingReferencePose(0)))
    ));
    Ok(())
}
