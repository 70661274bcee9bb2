//! JSON checkpoint hash file.
//!
//! ```json
//! { "hashlines": [ { "height": 7500, "hash": "<64 hex chars>" } ] }
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shangd_consensus::hash256_to_hex;
use shangd_log::{log_debug, log_info};

use crate::error::CheckpointError;
use crate::loader::LoadReport;
use crate::registry::Checkpoints;

#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct CheckpointFile {
    #[serde(default)]
    pub hashlines: Vec<HashLine>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct HashLine {
    pub height: u64,
    pub hash: String,
}

impl CheckpointFile {
    pub fn from_checkpoints(checkpoints: &Checkpoints) -> Self {
        Self {
            hashlines: checkpoints
                .iter()
                .map(|point| HashLine {
                    height: point.height,
                    hash: hash256_to_hex(&point.hash),
                })
                .collect(),
        }
    }
}

/// Reads a hash file, returning `None` when it does not exist.
pub fn read_checkpoints_file(path: &Path) -> Result<Option<CheckpointFile>, CheckpointError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

pub fn write_checkpoints_file(path: &Path, checkpoints: &Checkpoints) -> Result<(), CheckpointError> {
    let file = CheckpointFile::from_checkpoints(checkpoints);
    let json = serde_json::to_vec_pretty(&file)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl Checkpoints {
    /// Extends the registry from a local hash file.
    ///
    /// Only heights above the maximum known before the call are added; the
    /// rest are already covered by a stronger source. A missing file is not
    /// an error. The first failing entry aborts the load, entries applied
    /// before it stay.
    pub fn load_checkpoints_from_file(&mut self, path: &Path) -> Result<LoadReport, CheckpointError> {
        let Some(file) = read_checkpoints_file(path)? else {
            log_info!("checkpoint file {} not found", path.display());
            return Ok(LoadReport::default());
        };

        log_info!("adding checkpoints from {}", path.display());
        let prev_max_height = self.max_height();
        match prev_max_height {
            Some(height) => log_info!("max checkpoint height before file is {height}"),
            None => log_info!("no checkpoints loaded before file"),
        }

        let mut report = LoadReport::default();
        for line in &file.hashlines {
            if prev_max_height.is_some_and(|max| line.height <= max) {
                log_debug!("ignoring checkpoint height {}", line.height);
                report.skipped += 1;
                continue;
            }
            log_debug!("adding checkpoint height {}, hash={}", line.height, line.hash);
            if self.add_checkpoint(line.height, &line.hash)? {
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }
}
