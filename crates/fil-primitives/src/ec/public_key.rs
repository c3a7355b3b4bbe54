//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, signature
//! verification, and the point arithmetic hooks used by BIP-32 public
//! derivation. Filecoin address payloads are computed from the
//! uncompressed 65-byte form.

use k256::ecdsa::VerifyingKey;
use k256::{AffinePoint, ProjectivePoint};

use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key for verification and address derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPRESSED_LEN && bytes.len() != UNCOMPRESSED_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "expected {} or {} bytes, got {}",
                COMPRESSED_LEN,
                UNCOMPRESSED_LEN,
                bytes.len()
            )));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Wrap a k256 verifying key.
    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    /// Build a public key from a curve point, rejecting the identity.
    pub(crate) fn from_projective_point(point: ProjectivePoint) -> Result<Self, PrimitivesError> {
        let affine: AffinePoint = point.to_affine();
        let vk = VerifyingKey::from_affine(affine)
            .map_err(|_| PrimitivesError::InvalidPublicKey("point at infinity".to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    ///
    /// The first byte is 0x04, followed by 32-byte X and 32-byte Y coordinates.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key as a lowercase hex string (uncompressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_uncompressed())
    }

    /// Serialize the public key as a lowercase hex string (compressed format).
    pub fn to_compressed_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Verify a signature against a 32-byte digest using this public key.
    ///
    /// # Returns
    /// `true` if the signature is valid for this digest and key, `false` otherwise.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        sig.verify(digest, self)
    }

    /// Access the underlying k256 `VerifyingKey`.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }

    /// Convert the public key to a k256 `ProjectivePoint` for arithmetic.
    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }
}
