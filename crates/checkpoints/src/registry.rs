use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use shangd_consensus::{hash256_from_hex, Hash256};

use crate::error::CheckpointError;
use crate::observer::{CheckpointObserver, NoopObserver};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub height: u64,
    pub hash: Hash256,
}

/// Outcome of matching a block against the pinned set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockCheck {
    pub passed: bool,
    pub is_checkpoint: bool,
}

/// Ordered height -> hash pins.
///
/// Heights are unique and a pinned height is never rewritten: every mutation
/// goes through [`Checkpoints::add_checkpoint_hash`], which refuses a second
/// hash for an existing height.
#[derive(Clone)]
pub struct Checkpoints {
    points: BTreeMap<u64, Hash256>,
    observer: Arc<dyn CheckpointObserver>,
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Checkpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoints")
            .field("len", &self.points.len())
            .field("max_height", &self.max_height())
            .finish()
    }
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(NoopObserver))
    }

    pub fn with_observer(observer: Arc<dyn CheckpointObserver>) -> Self {
        Self {
            points: BTreeMap::new(),
            observer,
        }
    }

    /// Pins `height` to the hash written as 64 hex characters.
    pub fn add_checkpoint(&mut self, height: u64, hash_hex: &str) -> Result<bool, CheckpointError> {
        let hash = hash256_from_hex(hash_hex)?;
        self.add_checkpoint_hash(height, hash)
    }

    /// Returns `true` if `height` was newly pinned, `false` if the same hash
    /// was already there.
    pub fn add_checkpoint_hash(&mut self, height: u64, hash: Hash256) -> Result<bool, CheckpointError> {
        if let Some(existing) = self.points.get(&height) {
            if *existing != hash {
                return Err(CheckpointError::Conflict {
                    height,
                    existing: *existing,
                    proposed: hash,
                });
            }
            return Ok(false);
        }
        self.points.insert(height, hash);
        Ok(true)
    }

    pub fn is_in_checkpoint_zone(&self, height: u64) -> bool {
        self.max_height().is_some_and(|max| height <= max)
    }

    pub fn check_block(&self, height: u64, hash: &Hash256) -> bool {
        self.check_block_detailed(height, hash).passed
    }

    /// Matches `hash` against the pin at `height`, if any.
    ///
    /// Heights without a pin pass with `is_checkpoint == false`. The observer
    /// hears about every pinned height, with both hashes on a mismatch.
    pub fn check_block_detailed(&self, height: u64, hash: &Hash256) -> BlockCheck {
        let Some(expected) = self.points.get(&height) else {
            return BlockCheck {
                passed: true,
                is_checkpoint: false,
            };
        };

        let passed = expected == hash;
        if passed {
            self.observer.checkpoint_passed(height, hash);
        } else {
            self.observer.checkpoint_failed(height, expected, hash);
        }
        BlockCheck {
            passed,
            is_checkpoint: true,
        }
    }

    /// Whether a block competing with the best chain may sit at `block_height`.
    ///
    /// Alternatives must land strictly above the greatest checkpoint at or
    /// below `blockchain_height`. Height 0 is never an alternative.
    pub fn is_alternative_block_allowed(&self, blockchain_height: u64, block_height: u64) -> bool {
        if block_height == 0 {
            return false;
        }

        match self.points.range(..=blockchain_height).next_back() {
            Some((&boundary, _)) => boundary < block_height,
            None => true,
        }
    }

    pub fn max_height(&self) -> Option<u64> {
        self.points.last_key_value().map(|(height, _)| *height)
    }

    pub fn get_max_height(&self) -> Result<u64, CheckpointError> {
        self.max_height().ok_or(CheckpointError::EmptyRegistry)
    }

    pub fn get_points(&self) -> &BTreeMap<u64, Hash256> {
        &self.points
    }

    pub fn get(&self, height: u64) -> Option<&Hash256> {
        self.points.get(&height)
    }

    pub fn iter(&self) -> impl Iterator<Item = Checkpoint> + '_ {
        self.points
            .iter()
            .map(|(height, hash)| Checkpoint {
                height: *height,
                hash: *hash,
            })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fails on the first height `other` pins to a different hash than we do.
    pub fn check_for_conflicts(&self, other: &Checkpoints) -> Result<(), CheckpointError> {
        for (height, theirs) in other.get_points() {
            if let Some(ours) = self.points.get(height) {
                if ours != theirs {
                    return Err(CheckpointError::Conflict {
                        height: *height,
                        existing: *ours,
                        proposed: *theirs,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> Hash256 {
        [byte; 32]
    }

    fn hex(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    fn pinned() -> Checkpoints {
        let mut checkpoints = Checkpoints::new();
        checkpoints.add_checkpoint(10, &hex(0xaa)).expect("10");
        checkpoints.add_checkpoint(20, &hex(0xbb)).expect("20");
        checkpoints
    }

    #[test]
    fn repeated_insert_is_idempotent() {
        let mut checkpoints = Checkpoints::new();
        assert!(checkpoints.add_checkpoint(7, &hex(0x11)).expect("first"));
        assert!(!checkpoints.add_checkpoint(7, &hex(0x11)).expect("second"));
        assert_eq!(checkpoints.len(), 1);
        assert_eq!(checkpoints.get(7), Some(&hash(0x11)));
    }

    #[test]
    fn conflicting_insert_keeps_first_hash() {
        let mut checkpoints = Checkpoints::new();
        checkpoints.add_checkpoint(7, &hex(0x11)).expect("first");
        let err = checkpoints
            .add_checkpoint(7, &hex(0x22))
            .expect_err("conflict");
        assert!(matches!(
            err,
            CheckpointError::Conflict { height: 7, existing, proposed }
                if existing == hash(0x11) && proposed == hash(0x22)
        ));
        assert_eq!(checkpoints.get(7), Some(&hash(0x11)));
        assert_eq!(checkpoints.len(), 1);
    }

    #[test]
    fn malformed_hash_leaves_store_untouched() {
        let mut checkpoints = pinned();
        assert!(matches!(
            checkpoints.add_checkpoint(30, "abcd"),
            Err(CheckpointError::Parse(_))
        ));
        let mut bad = hex(0xcc);
        bad.replace_range(0..1, "z");
        assert!(matches!(
            checkpoints.add_checkpoint(30, &bad),
            Err(CheckpointError::Parse(_))
        ));
        assert_eq!(checkpoints.len(), 2);
        assert_eq!(checkpoints.get(30), None);
    }

    #[test]
    fn empty_registry_has_no_zone() {
        let checkpoints = Checkpoints::new();
        for height in [0, 1, 10, u64::MAX] {
            assert!(!checkpoints.is_in_checkpoint_zone(height));
        }
        assert!(matches!(
            checkpoints.get_max_height(),
            Err(CheckpointError::EmptyRegistry)
        ));
    }

    #[test]
    fn zone_ends_at_highest_checkpoint() {
        let checkpoints = pinned();
        assert!(checkpoints.is_in_checkpoint_zone(5));
        assert!(checkpoints.is_in_checkpoint_zone(20));
        assert!(!checkpoints.is_in_checkpoint_zone(21));
        assert_eq!(checkpoints.get_max_height().expect("max"), 20);
    }

    #[test]
    fn check_block_on_unpinned_height() {
        let checkpoints = pinned();
        assert_eq!(
            checkpoints.check_block_detailed(15, &hash(0x42)),
            BlockCheck {
                passed: true,
                is_checkpoint: false
            }
        );
        assert!(checkpoints.check_block(15, &hash(0x42)));
    }

    #[test]
    fn check_block_on_pinned_height() {
        let checkpoints = pinned();
        assert_eq!(
            checkpoints.check_block_detailed(10, &hash(0xaa)),
            BlockCheck {
                passed: true,
                is_checkpoint: true
            }
        );
        assert_eq!(
            checkpoints.check_block_detailed(10, &hash(0xcc)),
            BlockCheck {
                passed: false,
                is_checkpoint: true
            }
        );
        assert!(!checkpoints.check_block(10, &hash(0xcc)));
    }

    #[test]
    fn genesis_is_never_an_alternative() {
        let checkpoints = pinned();
        for chain_height in [0, 5, 15, 100] {
            assert!(!checkpoints.is_alternative_block_allowed(chain_height, 0));
        }
        assert!(!Checkpoints::new().is_alternative_block_allowed(0, 0));
    }

    #[test]
    fn alternatives_must_sit_above_boundary() {
        let checkpoints = pinned();
        assert!(checkpoints.is_alternative_block_allowed(15, 12));
        assert!(!checkpoints.is_alternative_block_allowed(15, 8));
        assert!(!checkpoints.is_alternative_block_allowed(15, 10));
        assert!(checkpoints.is_alternative_block_allowed(5, 3));
        assert!(!checkpoints.is_alternative_block_allowed(20, 20));
        assert!(checkpoints.is_alternative_block_allowed(20, 21));
        assert!(checkpoints.is_alternative_block_allowed(10, 11));
        assert!(Checkpoints::new().is_alternative_block_allowed(1_000, 1));
    }

    #[test]
    fn conflict_check_is_pure() {
        let mut ours = Checkpoints::new();
        ours.add_checkpoint(10, &hex(0xaa)).expect("10");

        let mut compatible = Checkpoints::new();
        compatible.add_checkpoint(10, &hex(0xaa)).expect("10");
        compatible.add_checkpoint(30, &hex(0xcc)).expect("30");
        ours.check_for_conflicts(&compatible).expect("compatible");

        let mut hostile = Checkpoints::new();
        hostile.add_checkpoint(10, &hex(0xee)).expect("10");
        assert!(matches!(
            ours.check_for_conflicts(&hostile),
            Err(CheckpointError::Conflict { height: 10, .. })
        ));

        assert_eq!(ours.len(), 1);
        assert_eq!(hostile.get(10), Some(&hash(0xee)));
    }

    #[test]
    fn points_iterate_in_height_order() {
        let mut checkpoints = Checkpoints::new();
        for height in [50, 3, 20] {
            checkpoints.add_checkpoint_hash(height, hash(height as u8)).expect("add");
        }
        let heights: Vec<u64> = checkpoints.iter().map(|point| point.height).collect();
        assert_eq!(heights, vec![3, 20, 50]);
        assert_eq!(checkpoints.get_points().keys().copied().collect::<Vec<_>>(), heights);
    }
}
