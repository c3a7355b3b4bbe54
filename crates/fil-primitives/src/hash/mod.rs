//! Hash function primitives for the Filecoin signer.
//!
//! Provides the BLAKE2b variants Filecoin uses for address payloads,
//! address checksums and message digests, plus HMAC-SHA512 for BIP-32.
//! BLAKE2b output length is part of the parameter block, so each width
//! below is a distinct function and not a truncation of another.

use blake2::digest::consts::{U20, U32, U4};
use blake2::{Blake2b, Digest};
use hmac::{Hmac, Mac};
use sha2::Sha512;

/// Compute the 4-byte BLAKE2b digest used as an address checksum.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 4-byte BLAKE2b digest.
pub fn blake2b_32(data: &[u8]) -> [u8; 4] {
    let result = Blake2b::<U4>::digest(data);
    let mut output = [0u8; 4];
    output.copy_from_slice(&result);
    output
}

/// Compute the 20-byte BLAKE2b digest used as a secp256k1/actor address payload.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 20-byte BLAKE2b digest.
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    let result = Blake2b::<U20>::digest(data);
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}

/// Compute the 32-byte BLAKE2b digest.
///
/// Used both as the message multihash inside CIDs and as the digest that
/// secp256k1 signatures are computed over.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte BLAKE2b digest.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b::<U32>::digest(data).into()
}

/// Compute HMAC-SHA512 of the input data with the given key.
///
/// # Arguments
/// * `key` - The HMAC key bytes.
/// * `data` - The message bytes to authenticate.
///
/// # Returns
/// A 64-byte HMAC-SHA512 tag.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    type HmacSha512 = Hmac<Sha512>;
    let mut mac = HmacSha512::new_from_slice(key)
        .expect("HMAC accepts any key length");
    mac.update(data);
    let result = mac.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result.into_bytes());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- BLAKE2b-256 (RFC 7693 / reference implementation) ----

    #[test]
    fn test_blake2b_256_empty_string() {
        let hash = blake2b_256(b"");
        assert_eq!(
            hex::encode(hash),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_blake2b_256_abc() {
        let hash = blake2b_256(b"abc");
        assert_eq!(
            hex::encode(hash),
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }

    // ---- Output width is a parameter, not a truncation ----

    #[test]
    fn test_blake2b_widths_are_independent() {
        let data = b"filecoin";
        let h32 = blake2b_256(data);
        let h20 = blake2b_160(data);
        let h4 = blake2b_32(data);
        assert_ne!(&h32[..20], &h20[..]);
        assert_ne!(&h20[..4], &h4[..]);
    }

    #[test]
    fn test_blake2b_deterministic() {
        assert_eq!(blake2b_160(b"payload"), blake2b_160(b"payload"));
        assert_ne!(blake2b_160(b"payload"), blake2b_160(b"payloae"));
    }

    // ---- HMAC-SHA512 (RFC 4231) ----

    #[test]
    fn test_sha512_hmac_case_1() {
        let key = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
        let msg = hex::decode("4869205468657265").unwrap(); // "Hi There"
        let mac = sha512_hmac(&key, &msg);
        assert_eq!(
            hex::encode(mac),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn test_sha512_hmac_case_2() {
        let key = hex::decode("4a656665").unwrap(); // "Jefe"
        let msg = hex::decode("7768617420646f2079612077616e7420666f72206e6f7468696e673f").unwrap();
        let mac = sha512_hmac(&key, &msg);
        assert_eq!(
            hex::encode(mac),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }
}
