use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use rigcal_extrinsics::{Pose, RelativePose};

use crate::RigIoError;

/// Leading bytes of every edge blob.
pub const EDGE_MAGIC: [u8; 4] = *b"RGED";

/// Version of the edge blob layout.
pub const EDGE_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct EdgeRecord {
    version: u32,
    source: String,
    target: String,
    rotation: [[f64; 3]; 3],
    translation: [f64; 3],
    num_observations: u64,
    residual: f64,
}

impl EdgeRecord {
    fn from_edge(source: &str, target: &str, edge: &RelativePose) -> Self {
        Self {
            version: EDGE_VERSION,
            source: source.to_string(),
            target: target.to_string(),
            rotation: Pose::new(edge.rotation, edge.translation).rotation_rows(),
            translation: edge.translation.to_array(),
            num_observations: edge.num_observations as u64,
            residual: edge.residual,
        }
    }

    fn into_edge(self) -> RelativePose {
        let pose = Pose::from_rows(&self.rotation, &self.translation);
        RelativePose::new(pose.rotation, pose.translation, self.num_observations as usize)
            .with_residual(self.residual)
    }
}

/// Encode the edge measured from camera `source` to camera `target` into a blob.
pub fn encode_edge(
    source: &str,
    target: &str,
    edge: &RelativePose,
) -> Result<Vec<u8>, bincode::error::EncodeError> {
    let mut bytes = EDGE_MAGIC.to_vec();
    bytes.extend(bincode::encode_to_vec(
        EdgeRecord::from_edge(source, target, edge),
        bincode::config::standard(),
    )?);
    Ok(bytes)
}

/// Decode a blob written by [`encode_edge`] for the pair `source -> target`.
///
/// A blob recorded for another pair is rejected. Returns a description of the
/// problem on failure.
pub fn decode_edge(bytes: &[u8], source: &str, target: &str) -> Result<RelativePose, String> {
    let payload = bytes
        .strip_prefix(&EDGE_MAGIC)
        .ok_or_else(|| "missing edge magic".to_string())?;

    let (record, read) =
        bincode::decode_from_slice::<EdgeRecord, _>(payload, bincode::config::standard())
            .map_err(|e| e.to_string())?;

    if record.version != EDGE_VERSION {
        return Err(format!(
            "unsupported version {}, expected {}",
            record.version, EDGE_VERSION
        ));
    }
    if read != payload.len() {
        return Err(format!("{} trailing bytes", payload.len() - read));
    }
    if record.source != source || record.target != target {
        return Err(format!(
            "blob holds the edge {} -> {}, expected {} -> {}",
            record.source, record.target, source, target
        ));
    }

    Ok(record.into_edge())
}

/// Directory of persisted pairwise edges.
///
/// The edge measured from camera `source` to camera `target` lives in
/// `<dir>/<source>_<target>.edge`, keyed by the camera labels. Blobs also record
/// both labels, and a blob recorded for another pair fails to load. Cached edges are
/// reused as is, so an interrupted calibration resumes without re-estimating
/// the pairs it already finished.
#[derive(Debug, Clone)]
pub struct EdgeCache {
    dir: PathBuf,
}

impl EdgeCache {
    /// Open the cache rooted at `dir`, creating the directory when needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, RigIoError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| RigIoError::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob of the edge from `source` to `target`.
    pub fn edge_path(&self, source: &str, target: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.edge", source, target))
    }

    /// Load a cached edge, `None` when the pair was never stored.
    pub fn load(&self, source: &str, target: &str) -> Result<Option<RelativePose>, RigIoError> {
        let path = self.edge_path(source, target);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RigIoError::io(path, e)),
        };

        decode_edge(&bytes, source, target)
            .map(Some)
            .map_err(|message| RigIoError::InvalidBlob { path, message })
    }

    /// Persist an edge, replacing any previous blob of the pair.
    pub fn store(&self, source: &str, target: &str, edge: &RelativePose) -> Result<(), RigIoError> {
        let path = self.edge_path(source, target);
        let bytes = encode_edge(source, target, edge).map_err(|e| RigIoError::Encode {
            path: path.clone(),
            source: e,
        })?;

        // write to a sibling file and rename into place
        let partial = path.with_extension("edge.partial");
        std::fs::write(&partial, bytes).map_err(|e| RigIoError::io(&partial, e))?;
        std::fs::rename(&partial, &path).map_err(|e| RigIoError::io(&path, e))
    }

    /// Return the cached edge of the pair, or run `estimate` and persist its result.
    ///
    /// `estimate` returning `None` means the pair produced no edge; nothing is stored
    /// and the estimator runs again on the next call.
    pub fn load_or_compute<F>(
        &self,
        source: &str,
        target: &str,
        estimate: F,
    ) -> Result<Option<RelativePose>, RigIoError>
    where
        F: FnOnce() -> Result<Option<RelativePose>, RigIoError>,
    {
        if let Some(edge) = self.load(source, target)? {
            log::debug!("edge {} -> {} loaded from cache", source, target);
            return Ok(Some(edge));
        }

        let edge = estimate()?;
        if let Some(edge) = &edge {
            self.store(source, target, edge)?;
            log::debug!("edge {} -> {} estimated and cached", source, target);
        }
        Ok(edge)
    }
}
