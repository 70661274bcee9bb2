use shangd_checkpoints::{CheckpointObserver, Hash256};
use shangd_consensus::hash256_to_hex;
use shangd_log::{log_info, log_warn};

/// Reports checkpoint matches through the process log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl CheckpointObserver for LogObserver {
    fn checkpoint_passed(&self, height: u64, hash: &Hash256) {
        log_info!("checkpoint passed for height {height} {}", hash256_to_hex(hash));
    }

    fn checkpoint_failed(&self, height: u64, expected: &Hash256, actual: &Hash256) {
        log_warn!(
            "checkpoint failed for height {height}. expected hash: {}, fetched hash: {}",
            hash256_to_hex(expected),
            hash256_to_hex(actual)
        );
    }
}
