//! 32-byte block digests and their hex representation.

use std::fmt;

use crate::constants::HASH_HEX_LEN;

pub type Hash256 = [u8; 32];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexError {
    InvalidLength(usize),
    InvalidHex,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::InvalidLength(len) => {
                write!(f, "expected {HASH_HEX_LEN} hex characters, got {len}")
            }
            HexError::InvalidHex => write!(f, "hash contains non-hex characters"),
        }
    }
}

impl std::error::Error for HexError {}

/// Parses a block hash written as exactly 64 hex characters.
///
/// Bytes are kept in the order they appear in the string. Whitespace,
/// prefixes and short inputs are rejected rather than trimmed or padded, so a
/// mangled hash can never alias a different checkpoint.
pub fn hash256_from_hex(hex: &str) -> Result<Hash256, HexError> {
    if hex.len() != HASH_HEX_LEN {
        return Err(HexError::InvalidLength(hex.len()));
    }
    // from_str_radix tolerates a leading '+', so check digits up front.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidHex);
    }

    let mut bytes = [0u8; 32];
    for (i, byte_out) in bytes.iter_mut().enumerate() {
        let start = i * 2;
        *byte_out = u8::from_str_radix(&hex[start..start + 2], 16)
            .map_err(|_| HexError::InvalidHex)?;
    }
    Ok(bytes)
}

pub fn hash256_to_hex(hash: &Hash256) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(HASH_HEX_LEN);
    for byte in hash {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "876f6313ea61cec03c444f9196219e7b186102a7baf26f77c164f9ac011a0e79";

    #[test]
    fn parses_in_string_order() {
        let hash = hash256_from_hex(GENESIS).expect("hash");
        assert_eq!(hash[0], 0x87);
        assert_eq!(hash[31], 0x79);
        assert_eq!(hash256_to_hex(&hash), GENESIS);
    }

    #[test]
    fn accepts_uppercase() {
        assert_eq!(
            hash256_from_hex(&GENESIS.to_ascii_uppercase()).expect("hash"),
            hash256_from_hex(GENESIS).expect("hash")
        );
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        assert_eq!(
            hash256_from_hex(&format!("  {GENESIS}\t")),
            Err(HexError::InvalidLength(67))
        );
        assert_eq!(
            hash256_from_hex(&format!("{GENESIS}\n")),
            Err(HexError::InvalidLength(65))
        );
        assert_eq!(
            hash256_from_hex(&format!(" {}", &GENESIS[1..])),
            Err(HexError::InvalidHex)
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(hash256_from_hex(""), Err(HexError::InvalidLength(0)));
        assert_eq!(
            hash256_from_hex(&GENESIS[..63]),
            Err(HexError::InvalidLength(63))
        );
        assert_eq!(
            hash256_from_hex(&format!("0x{}", &GENESIS[..62])),
            Err(HexError::InvalidHex)
        );
        assert_eq!(
            hash256_from_hex(&format!("{GENESIS}00")),
            Err(HexError::InvalidLength(66))
        );
    }

    #[test]
    fn rejects_non_hex() {
        let mut bad = GENESIS.to_string();
        bad.replace_range(10..11, "g");
        assert_eq!(hash256_from_hex(&bad), Err(HexError::InvalidHex));
        let signed = format!("+{}", &GENESIS[1..]);
        assert_eq!(hash256_from_hex(&signed), Err(HexError::InvalidHex));
    }
}
