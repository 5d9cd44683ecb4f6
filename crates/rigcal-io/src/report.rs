use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use rigcal_extrinsics::{Camera, EdgeConsistency, SweepReport};

use crate::RigIoError;

/// Human readable error report of a calibration run, usually `error.txt`.
///
/// Lines are appended, so consecutive runs accumulate in the same file.
pub struct ErrorReport {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ErrorReport {
    /// Open the report at `path` for appending, creating it when needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, RigIoError> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| RigIoError::io(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) -> Result<(), RigIoError> {
        writeln!(self.writer, "{}", line).map_err(|e| RigIoError::io(&self.path, e))
    }

    /// Write a free form heading line.
    pub fn write_heading(&mut self, heading: &str) -> Result<(), RigIoError> {
        self.write_line(&format!("# {}", heading))
    }

    /// Write one line per camera pair comparing the measured edge to the final poses.
    pub fn write_edge_consistency(
        &mut self,
        cameras: &[Camera],
        entries: &[EdgeConsistency],
    ) -> Result<(), RigIoError> {
        let label = |index: usize| {
            cameras
                .get(index)
                .map(|c| c.label.clone())
                .unwrap_or_else(|| index.to_string())
        };

        for entry in entries {
            let line = format!(
                "Extrinsics Error {} -> {}: rotation {:.4} deg, translation {:.6}, residual {:.6}, observations {}",
                label(entry.source),
                label(entry.target),
                entry.rotation_error.to_degrees(),
                entry.translation_error,
                entry.residual,
                entry.num_observations,
            );
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Write one line per refinement sweep with the largest pose updates.
    pub fn write_sweeps(&mut self, sweeps: &[SweepReport]) -> Result<(), RigIoError> {
        for sweep in sweeps {
            let line = format!(
                "Iteration {}: max rotation delta {:.6e} rad, max translation delta {:.6e}",
                sweep.iteration,
                sweep.max_rotation_delta(),
                sweep.max_translation_delta(),
            );
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Flush the buffered lines to disk.
    pub fn flush(&mut self) -> Result<(), RigIoError> {
        self.writer.flush().map_err(|e| RigIoError::io(&self.path, e))
    }
}
