use argh::FromArgs;
use std::path::PathBuf;

use rigcal::io::{calibrate_rig, CachedEdgesOnly, RigManifest};

#[derive(FromArgs)]
/// Resolve the extrinsics of a camera rig from its cached pairwise edges
struct Args {
    /// path to the rig manifest (JSON)
    #[argh(option)]
    manifest: PathBuf,

    /// override the number of refinement sweeps of the manifest
    #[argh(option)]
    num_iterations: Option<usize>,

    /// override the snapshot interval of the manifest
    #[argh(option)]
    snapshot_every: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut manifest = RigManifest::from_file(&args.manifest)?;
    if let Some(num_iterations) = args.num_iterations {
        manifest.num_iterations = num_iterations;
    }
    if args.snapshot_every.is_some() {
        manifest.snapshot_every = args.snapshot_every;
    }

    let calibration = calibrate_rig(&manifest, &mut CachedEdgesOnly)?;

    for (camera, pose) in calibration
        .cameras
        .iter()
        .zip(&calibration.resolution.poses)
    {
        let center = pose.center();
        println!(
            "{}: center [{:.4}, {:.4}, {:.4}], rotation {:.3} deg",
            camera.label,
            center.x,
            center.y,
            center.z,
            pose.rotation_vector().length().to_degrees()
        );
    }

    if let Some(last) = calibration.resolution.sweeps.last() {
        println!(
            "last sweep: max rotation delta {:.3e} rad, max translation delta {:.3e}",
            last.max_rotation_delta(),
            last.max_translation_delta()
        );
    }
    println!("Output written to {}", manifest.output_dir.display());

    Ok(())
}
