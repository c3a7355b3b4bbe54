//! secp256k1 private key.
//!
//! Wraps the k256 signing key and adds the text encodings the signer
//! exposes (hex, base64), recoverable signing over a 32-byte digest, and
//! the scalar access needed by BIP-32 child derivation. The k256 key
//! zeroises its scalar when dropped.

use base64::Engine;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::ScalarPrimitive;
use k256::{Scalar, Secp256k1};
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key for signing and key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` for a valid scalar, `InvalidKeyLength` if the slice
    /// is not 32 bytes, or `InvalidScalar` if the value is zero or not below
    /// the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| PrimitivesError::InvalidScalar)?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = zeroize::Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Create a private key from a standard base64 string.
    ///
    /// This is the text form used for private keys in exported wallets.
    ///
    /// # Arguments
    /// * `b64` - Base64 encoding of the 32-byte scalar.
    pub fn from_base64(b64: &str) -> Result<Self, PrimitivesError> {
        let bytes = zeroize::Zeroizing::new(
            base64::engine::general_purpose::STANDARD.decode(b64)?,
        );
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Serialize the private key as a standard base64 string.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Derive the corresponding public key for this private key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest using deterministic RFC 6979 nonces.
    ///
    /// Produces a low-S recoverable signature.
    ///
    /// # Arguments
    /// * `digest` - The 32-byte message digest to sign.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(digest, self)
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    /// Convert the private key to a k256 `Scalar` for arithmetic operations.
    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }

    /// Build a private key from a scalar, rejecting zero.
    pub(crate) fn from_scalar(scalar: Scalar) -> Result<Self, PrimitivesError> {
        let scalar_primitive: ScalarPrimitive<Secp256k1> = scalar.into();
        Self::from_bytes(&scalar_primitive.to_bytes())
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// secp256k1 group order n.
    const CURVE_ORDER_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn test_priv_keys() {
        let key_bytes: [u8; 32] = [
            0xea, 0xf0, 0x2c, 0xa3, 0x48, 0xc5, 0x24, 0xe6, 0x39, 0x26, 0x55, 0xba, 0x4d, 0x29,
            0x60, 0x3c, 0xd1, 0xa7, 0x34, 0x7d, 0x9d, 0x65, 0xcf, 0xe9, 0x3c, 0xe1, 0xeb, 0xff,
            0xdc, 0xa2, 0x26, 0x94,
        ];

        let priv_key = PrivateKey::from_bytes(&key_bytes).unwrap();
        let pub_key = priv_key.pub_key();

        let uncompressed = pub_key.to_uncompressed();
        let _parsed = PublicKey::from_bytes(&uncompressed).unwrap();

        let digest = crate::hash::blake2b_256(b"sign me");
        let sig = priv_key.sign(&digest).unwrap();
        assert!(pub_key.verify(&digest, &sig));

        assert_eq!(priv_key.to_bytes(), key_bytes);
    }

    #[test]
    fn test_private_key_text_encodings() {
        let pk = PrivateKey::new();

        let deserialized = PrivateKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, deserialized);

        let deserialized = PrivateKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, deserialized);

        let deserialized = PrivateKey::from_base64(&pk.to_base64()).unwrap();
        assert_eq!(pk, deserialized);
    }

    #[test]
    fn test_private_key_wrong_length() {
        let err = PrivateKey::from_bytes(&[1u8; 31]).unwrap_err();
        assert!(matches!(
            err,
            PrimitivesError::InvalidKeyLength { expected: 32, got: 31 }
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[1u8; 33]),
            Err(PrimitivesError::InvalidKeyLength { expected: 32, got: 33 })
        ));
        assert!(matches!(
            PrivateKey::from_hex(""),
            Err(PrimitivesError::InvalidKeyLength { expected: 32, got: 0 })
        ));
    }

    #[test]
    fn test_private_key_invalid_scalar() {
        assert!(matches!(
            PrivateKey::from_bytes(&[0u8; 32]),
            Err(PrimitivesError::InvalidScalar)
        ));
        assert!(matches!(
            PrivateKey::from_hex(CURVE_ORDER_HEX),
            Err(PrimitivesError::InvalidScalar)
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[0xff; 32]),
            Err(PrimitivesError::InvalidScalar)
        ));
    }

    #[test]
    fn test_private_key_invalid_text() {
        assert!(matches!(
            PrivateKey::from_hex("zz"),
            Err(PrimitivesError::InvalidHex(_))
        ));
        assert!(matches!(
            PrivateKey::from_base64("not base64!"),
            Err(PrimitivesError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_scalar_roundtrip() {
        let pk = PrivateKey::new();
        let back = PrivateKey::from_scalar(pk.to_scalar()).unwrap();
        assert_eq!(pk, back);
        assert!(matches!(
            PrivateKey::from_scalar(Scalar::ZERO),
            Err(PrimitivesError::InvalidScalar)
        ));
    }
}
