use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rigcal_extrinsics::{
    BootstrapOrder, BootstrapParams, EdgeWeighting, RefineParams, ResolveParams,
};
use serde::{Deserialize, Serialize};

use crate::RigIoError;

/// Per-edge weighting as written in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingConfig {
    /// Every edge counts once.
    #[default]
    Uniform,
    /// Edges are weighted by their observation count.
    ObservationCount,
}

impl From<WeightingConfig> for EdgeWeighting {
    fn from(config: WeightingConfig) -> Self {
        match config {
            WeightingConfig::Uniform => EdgeWeighting::Uniform,
            WeightingConfig::ObservationCount => EdgeWeighting::ObservationCount,
        }
    }
}

/// Bootstrap traversal as written in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapOrderConfig {
    /// Breadth-first traversal from the anchored cameras.
    #[default]
    BreadthFirst,
    /// Repeated greedy passes over the uninitialized cameras.
    Passes,
}

impl From<BootstrapOrderConfig> for BootstrapOrder {
    fn from(config: BootstrapOrderConfig) -> Self {
        match config {
            BootstrapOrderConfig::BreadthFirst => BootstrapOrder::BreadthFirst,
            BootstrapOrderConfig::Passes => BootstrapOrder::Passes,
        }
    }
}

fn default_min_pair_observations() -> usize {
    10
}

fn default_num_iterations() -> usize {
    RefineParams::default().num_iterations
}

/// Description of a rig calibration run.
///
/// Relative directories are resolved against the directory of the manifest
/// file by [`RigManifest::from_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigManifest {
    /// Camera labels; the position of a label is the camera index.
    pub cameras: Vec<String>,
    /// Label of the reference camera.
    pub reference: String,
    /// Directory holding one `<label>.ini` intrinsics file per camera.
    pub intrinsics_dir: PathBuf,
    /// Directory of the edge blob cache.
    pub edges_dir: PathBuf,
    /// Optional directory of `<label>.pose` absolute observations.
    #[serde(default)]
    pub absolute_dir: Option<PathBuf>,
    /// Directory receiving the calibrated cameras and the error report.
    pub output_dir: PathBuf,
    /// Minimum number of observations for a camera pair to produce an edge.
    #[serde(default = "default_min_pair_observations")]
    pub min_pair_observations: usize,
    /// Number of refinement sweeps.
    #[serde(default = "default_num_iterations")]
    pub num_iterations: usize,
    /// Edge weighting of the refinement.
    #[serde(default)]
    pub weighting: WeightingConfig,
    /// Bootstrap traversal.
    #[serde(default)]
    pub bootstrap_order: BootstrapOrderConfig,
    /// Write a snapshot of the poses every that many sweeps.
    #[serde(default)]
    pub snapshot_every: Option<usize>,
}

impl RigManifest {
    /// Read a manifest from a JSON file and resolve its directories.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RigIoError> {
        let path = path.as_ref();
        let text = crate::text::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&text).map_err(|e| RigIoError::Manifest {
            path: path.to_path_buf(),
            source: e,
        })?;

        manifest.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.resolve_dirs(base))
    }

    /// Write the manifest as pretty printed JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), RigIoError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|e| RigIoError::Manifest {
            path: path.to_path_buf(),
            source: e,
        })?;
        crate::text::write_string(path, &text)
    }

    /// Make relative directories relative to `base`.
    pub fn resolve_dirs(mut self, base: &Path) -> Self {
        let resolve = |dir: &mut PathBuf| {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        };
        resolve(&mut self.intrinsics_dir);
        resolve(&mut self.edges_dir);
        resolve(&mut self.output_dir);
        if let Some(dir) = self.absolute_dir.as_mut() {
            resolve(dir);
        }
        self
    }

    /// Check that the camera labels are unique and that every ordered pair of
    /// cameras gets its own edge blob name.
    pub fn validate(&self) -> Result<(), RigIoError> {
        let mut seen = HashMap::new();
        for (index, label) in self.cameras.iter().enumerate() {
            if let Some(first) = seen.insert(label.as_str(), index) {
                return Err(RigIoError::InvalidRig(format!(
                    "camera label {} used by cameras {} and {}",
                    label, first, index
                )));
            }
        }

        let mut blob_names = HashMap::new();
        for source in &self.cameras {
            for target in &self.cameras {
                if source == target {
                    continue;
                }
                let name = format!("{}_{}", source, target);
                if let Some((s, t)) = blob_names.insert(name.clone(), (source, target)) {
                    return Err(RigIoError::InvalidRig(format!(
                        "edges {} -> {} and {} -> {} share the blob name {}",
                        s, t, source, target, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Index of the camera with the given label.
    pub fn camera_index(&self, label: &str) -> Result<usize, RigIoError> {
        self.cameras
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| RigIoError::UnknownCamera(label.to_string()))
    }

    /// Resolution parameters described by the manifest.
    pub fn resolve_params(&self) -> Result<ResolveParams, RigIoError> {
        self.validate()?;
        Ok(ResolveParams {
            reference: self.camera_index(&self.reference)?,
            bootstrap: BootstrapParams {
                order: self.bootstrap_order.into(),
            },
            refine: RefineParams {
                num_iterations: self.num_iterations,
                weighting: self.weighting.into(),
            },
        })
    }
}
