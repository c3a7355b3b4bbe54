//! Lowercase RFC 4648 base32 without padding.
//!
//! This is the text encoding Filecoin uses for address payloads and for
//! CIDs (behind the multibase `b` prefix). Uppercase input is rejected so
//! every value has exactly one text form.

use std::sync::LazyLock;

use data_encoding::{Encoding, Specification};

use crate::PrimitivesError;

/// The lowercase RFC 4648 alphabet.
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz234567";

static BASE32_LOWER: LazyLock<Encoding> = LazyLock::new(|| {
    let mut spec = Specification::new();
    spec.symbols.push_str(ALPHABET);
    spec.encoding().expect("static base32 specification is valid")
});

/// Encode a byte slice to lowercase unpadded base32.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// The base32 string.
pub fn encode(data: &[u8]) -> String {
    BASE32_LOWER.encode(data)
}

/// Decode a lowercase unpadded base32 string.
///
/// # Arguments
/// * `s` - The base32 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for characters outside the
/// alphabet, impossible lengths, or non-zero trailing bits.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    BASE32_LOWER
        .decode(s.as_bytes())
        .map_err(|e| PrimitivesError::InvalidBase32(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 4648 section 10 vectors, lowercased and without padding.
    #[test]
    fn test_rfc4648_vectors() {
        let cases = [
            ("", ""),
            ("f", "my"),
            ("fo", "mzxq"),
            ("foo", "mzxw6"),
            ("foob", "mzxw6yq"),
            ("fooba", "mzxw6ytb"),
            ("foobar", "mzxw6ytboi"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(encode(plain.as_bytes()), encoded);
            assert_eq!(decode(encoded).unwrap(), plain.as_bytes());
        }
    }

    #[test]
    fn test_rejects_uppercase_and_padding() {
        assert!(decode("MZXW6").is_err());
        assert!(decode("my======").is_err());
        assert!(decode("mz0w6").is_err());
    }

    #[test]
    fn test_roundtrip_binary() {
        let data: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode(&encode(&data)).unwrap(), data);
    }
}
