use std::fmt;
use std::io;

use shangd_consensus::{hash256_to_hex, Hash256, HexError};

#[derive(Debug)]
pub enum CheckpointError {
    /// The hash string is not 64 hex characters.
    Parse(HexError),
    /// The height is already pinned to a different hash.
    Conflict {
        height: u64,
        existing: Hash256,
        proposed: Hash256,
    },
    EmptyRegistry,
    Io(io::Error),
    Json(serde_json::Error),
    Resolver(String),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Parse(err) => write!(f, "invalid checkpoint hash: {err}"),
            CheckpointError::Conflict {
                height,
                existing,
                proposed,
            } => write!(
                f,
                "checkpoint at height {height} already exists with hash {}, refusing {}",
                hash256_to_hex(existing),
                hash256_to_hex(proposed)
            ),
            CheckpointError::EmptyRegistry => write!(f, "no checkpoints loaded"),
            CheckpointError::Io(err) => write!(f, "checkpoint file error: {err}"),
            CheckpointError::Json(err) => write!(f, "malformed checkpoint file: {err}"),
            CheckpointError::Resolver(message) => {
                write!(f, "checkpoint dns lookup failed: {message}")
            }
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckpointError::Parse(err) => Some(err),
            CheckpointError::Io(err) => Some(err),
            CheckpointError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HexError> for CheckpointError {
    fn from(err: HexError) -> Self {
        CheckpointError::Parse(err)
    }
}

impl From<io::Error> for CheckpointError {
    fn from(err: io::Error) -> Self {
        CheckpointError::Io(err)
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(err: serde_json::Error) -> Self {
        CheckpointError::Json(err)
    }
}
