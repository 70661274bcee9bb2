//! Startup loading in trust order: hardcoded table, hash file, DNS.

use std::path::Path;

use shangd_consensus::{chain_params, Network};
use shangd_log::log_info;

use crate::dns::TxtResolver;
use crate::error::CheckpointError;
use crate::registry::Checkpoints;

/// Counts of entries a loader newly pinned and passed over (below the
/// previous maximum, malformed, or already pinned with the same hash).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadReport {
    pub added: usize,
    pub skipped: usize,
}

impl LoadReport {
    fn merge(self, other: LoadReport) -> LoadReport {
        LoadReport {
            added: self.added + other.added,
            skipped: self.skipped + other.skipped,
        }
    }
}

impl Checkpoints {
    /// Pins the hardcoded table shipped for `network`.
    pub fn init_default_checkpoints(&mut self, network: Network) -> Result<(), CheckpointError> {
        let params = chain_params(network);
        for (height, hash) in params.checkpoints {
            self.add_checkpoint(*height, hash)?;
        }
        log_info!(
            "loaded {} default checkpoints for {}",
            params.checkpoints.len(),
            network.as_str()
        );
        Ok(())
    }

    /// Runs the file loader and then, if `use_dns`, the DNS loader.
    ///
    /// Both loaders run even when the file fails; the first error is
    /// returned.
    pub fn load_new_checkpoints(
        &mut self,
        path: &Path,
        network: Network,
        use_dns: bool,
        resolver: &dyn TxtResolver,
    ) -> Result<LoadReport, CheckpointError> {
        let file_result = self.load_checkpoints_from_file(path);
        if !use_dns {
            return file_result;
        }
        let dns_result = self.load_checkpoints_from_dns(network, resolver);
        match (file_result, dns_result) {
            (Ok(file), Ok(dns)) => Ok(file.merge(dns)),
            (Err(err), _) | (Ok(_), Err(err)) => Err(err),
        }
    }
}
