//! Trusted-checkpoint registry.
//!
//! A [`Checkpoints`] value pins block heights to block hashes. It is filled
//! from the hardcoded table, an optional local hash file and optional DNS TXT
//! records, always through [`Checkpoints::add_checkpoint`], and is then
//! queried by block validation to reject forks below the pinned heights.

pub mod dns;
pub mod error;
pub mod file;
pub mod loader;
pub mod observer;
pub mod registry;
pub mod shared;

pub use dns::{parse_txt_record, DnsFailurePolicy, ResolverError, StaticResolver, TxtResolver};
pub use error::CheckpointError;
pub use file::{read_checkpoints_file, write_checkpoints_file, CheckpointFile, HashLine};
pub use loader::LoadReport;
pub use observer::{CheckpointObserver, NoopObserver};
pub use registry::{BlockCheck, Checkpoint, Checkpoints};
pub use shared::SharedCheckpoints;
pub use shangd_consensus::{Hash256, Network};
