//! Chain parameters, digest types, and the hardcoded checkpoint tables.

pub mod constants;
pub mod hash;
pub mod params;

pub use hash::{hash256_from_hex, hash256_to_hex, Hash256, HexError};
pub use params::{chain_params, ChainParams, Network};
