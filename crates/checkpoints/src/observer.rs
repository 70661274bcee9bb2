//! Pass/fail notifications from [`Checkpoints::check_block`].
//!
//! [`Checkpoints::check_block`]: crate::Checkpoints::check_block

use shangd_consensus::Hash256;

pub trait CheckpointObserver: Send + Sync {
    fn checkpoint_passed(&self, height: u64, hash: &Hash256);

    fn checkpoint_failed(&self, height: u64, expected: &Hash256, actual: &Hash256);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl CheckpointObserver for NoopObserver {
    fn checkpoint_passed(&self, _height: u64, _hash: &Hash256) {}

    fn checkpoint_failed(&self, _height: u64, _expected: &Hash256, _actual: &Hash256) {}
}
