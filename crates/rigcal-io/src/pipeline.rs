use rigcal_extrinsics::{edge_consistency, solver::resolve_extrinsics_with, Camera, Resolution};

use crate::{
    manifest::RigManifest,
    report::ErrorReport,
    rig::{load_rig_inputs, write_rig_cameras, write_snapshot, PairwiseEstimator},
    RigIoError,
};

/// Name of the error report inside the output directory.
pub const ERROR_REPORT_FILE: &str = "error.txt";

/// Outcome of a calibration run.
#[derive(Debug, Clone)]
pub struct Calibration {
    /// The calibrated cameras, in manifest order.
    pub cameras: Vec<Camera>,
    /// Bootstrap and refined poses with the sweep reports.
    pub resolution: Resolution,
}

/// Run the full calibration described by a manifest.
///
/// Loads the intrinsics, builds the edge store from the cache (estimating
/// missing pairs with `estimator`), resolves the extrinsics, writes one
/// `<label>.txt` per camera into the output directory and appends the error
/// report. Snapshots are written along the way when the manifest asks for them.
///
/// # Arguments
///
/// * `manifest` - The description of the run, with resolved directories.
/// * `estimator` - Source of edges for pairs missing from the cache.
///
/// # Returns
///
/// The calibrated cameras and the resolution.
pub fn calibrate_rig<E: PairwiseEstimator>(
    manifest: &RigManifest,
    estimator: &mut E,
) -> Result<Calibration, RigIoError> {
    let params = manifest.resolve_params()?;
    let inputs = load_rig_inputs(manifest, estimator)?;

    std::fs::create_dir_all(&manifest.output_dir)
        .map_err(|e| RigIoError::io(&manifest.output_dir, e))?;

    let mut snapshot_error = None;
    let resolution = resolve_extrinsics_with(
        &inputs.store,
        &inputs.absolute,
        &params,
        |sweep, poses| {
            let Some(every) = manifest.snapshot_every.filter(|&every| every > 0) else {
                return;
            };
            if snapshot_error.is_some() || (sweep.iteration + 1) % every != 0 {
                return;
            }
            if let Err(e) = write_snapshot(&manifest.output_dir, sweep.iteration, &inputs.cameras, poses) {
                snapshot_error = Some(e);
            }
        },
    )?;
    if let Some(e) = snapshot_error {
        return Err(e);
    }

    write_rig_cameras(&manifest.output_dir, &inputs.cameras, &resolution.poses)?;

    let mut report = ErrorReport::append(manifest.output_dir.join(ERROR_REPORT_FILE))?;
    report.write_heading(&format!(
        "{} cameras, reference {}, {} edges",
        inputs.cameras.len(),
        manifest.reference,
        inputs.store.len()
    ))?;
    report.write_edge_consistency(
        &inputs.cameras,
        &edge_consistency(&inputs.store, &resolution.poses),
    )?;
    report.write_sweeps(&resolution.sweeps)?;
    report.flush()?;

    log::info!(
        "calibration of {} cameras written to {}",
        inputs.cameras.len(),
        manifest.output_dir.display()
    );

    Ok(Calibration {
        cameras: inputs.cameras,
        resolution,
    })
}
