//! Checkpoint-related constants shared by the registry and the node.

/// Length of a hex-encoded block hash.
pub const HASH_HEX_LEN: usize = 64;
/// File name of the bundled checkpoint hash file inside the data directory.
pub const CHECKPOINTS_FILE_NAME: &str = "checkpoints.json";
/// Upper bound on a single DNS checkpoint lookup performed by the node.
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 20;
/// Separator between height and hash in a checkpoint TXT record.
pub const DNS_RECORD_SEPARATOR: char = ':';
