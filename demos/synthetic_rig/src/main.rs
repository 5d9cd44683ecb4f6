use argh::FromArgs;
use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

use rigcal::extrinsics::{Camera, CameraIntrinsics, Pose, RelativePose};
use rigcal::io::{
    calibrate_rig, manifest::WeightingConfig, write_intrinsics_ini, PairwiseEstimator, RigIoError,
    RigManifest,
};
use rigcal::lie::so3::SO3;

#[derive(FromArgs)]
/// Calibrate a synthetic camera ring with noisy pairwise measurements
struct Args {
    /// directory receiving the generated rig and its calibration
    #[argh(option)]
    output_dir: PathBuf,

    /// number of cameras on the ring
    #[argh(option, default = "6")]
    num_cameras: usize,

    /// magnitude of the rotation and translation noise
    #[argh(option, default = "0.01")]
    noise: f64,

    /// seed of the noise generator
    #[argh(option, default = "0")]
    seed: u64,

    /// weight edges by their observation count
    #[argh(switch)]
    weighted: bool,
}

/// Measures every camera pair of a known rig with uniform noise.
struct NoisyRig {
    truth: Vec<Pose>,
    noise: f64,
    rng: StdRng,
}

impl NoisyRig {
    fn random_vector(&mut self) -> DVec3 {
        DVec3::new(
            self.rng.random_range(-self.noise..=self.noise),
            self.rng.random_range(-self.noise..=self.noise),
            self.rng.random_range(-self.noise..=self.noise),
        )
    }
}

impl PairwiseEstimator for NoisyRig {
    fn estimate(
        &mut self,
        source: &Camera,
        target: &Camera,
    ) -> Result<Option<RelativePose>, RigIoError> {
        let num_observations = self.rng.random_range(20..200);
        let exact = RelativePose::between(
            &self.truth[source.index],
            &self.truth[target.index],
            num_observations,
        );
        let rotation = SO3::exp(self.random_vector()).matrix() * exact.rotation;
        let translation = exact.translation + self.random_vector();
        Ok(Some(RelativePose::new(rotation, translation, num_observations)))
    }
}

fn ring(num_cameras: usize) -> Vec<Pose> {
    (0..num_cameras)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / num_cameras as f64;
            // camera i looks at the ring center from angle `angle`
            let center = DVec3::new(2.0 * angle.sin(), 0.0, 2.0 * (1.0 - angle.cos()));
            let rotation = SO3::exp(DVec3::new(0.0, -angle, 0.0)).matrix();
            Pose::new(rotation, -(rotation * center))
        })
        .collect()
}

fn pose_errors(poses: &[Pose], truth: &[Pose]) -> (f64, f64) {
    poses.iter().zip(truth).fold((0.0, 0.0), |(r, t), (pose, expected)| {
        (
            r + pose.rotation_distance(expected),
            t + pose.translation_distance(expected),
        )
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let truth = ring(args.num_cameras);
    let labels = (0..args.num_cameras)
        .map(|i| format!("cam{:02}", i))
        .collect::<Vec<_>>();

    let intrinsics_dir = args.output_dir.join("Intrinsics");
    std::fs::create_dir_all(&intrinsics_dir)?;
    for label in &labels {
        let intrinsics = CameraIntrinsics::new((600.0, 600.0), (320.0, 240.0), (640, 480));
        write_intrinsics_ini(intrinsics_dir.join(format!("{}.ini", label)), &intrinsics)?;
    }

    let manifest = RigManifest {
        cameras: labels.clone(),
        reference: labels.first().cloned().ok_or("the rig needs at least one camera")?,
        intrinsics_dir,
        edges_dir: args.output_dir.join("edges"),
        absolute_dir: None,
        output_dir: args.output_dir.join("output"),
        min_pair_observations: 30,
        num_iterations: 100,
        weighting: if args.weighted {
            WeightingConfig::ObservationCount
        } else {
            WeightingConfig::Uniform
        },
        bootstrap_order: Default::default(),
        snapshot_every: None,
    };
    manifest.to_file(args.output_dir.join("rig.json"))?;
    log::info!("synthetic rig written to {}", args.output_dir.display());

    let mut estimator = NoisyRig {
        truth: truth.clone(),
        noise: args.noise,
        rng: StdRng::seed_from_u64(args.seed),
    };
    let calibration = calibrate_rig(&manifest, &mut estimator)?;

    let (rotation, translation) = pose_errors(&calibration.resolution.bootstrap_poses, &truth);
    println!(
        "bootstrap: total rotation error {:.5} rad, total translation error {:.5}",
        rotation, translation
    );
    let (rotation, translation) = pose_errors(&calibration.resolution.poses, &truth);
    println!(
        "refined:   total rotation error {:.5} rad, total translation error {:.5}",
        rotation, translation
    );

    Ok(())
}
