//! Recoverable secp256k1 ECDSA signature.
//!
//! Signatures are produced with RFC 6979 deterministic nonces over a
//! 32-byte digest, normalised to low-S, and serialised in the 65-byte
//! `r || s || recovery_id` layout Filecoin uses for secp256k1 messages.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a serialized recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// An ECDSA signature with R and S components and a recovery id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
    /// Recovery id (0-3) selecting the public key candidate.
    recovery_id: u8,
}

impl Signature {
    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Access the recovery id.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Parse a 65-byte `r || s || v` signature.
    ///
    /// # Arguments
    /// * `bytes` - 65-byte recoverable signature.
    ///
    /// # Returns
    /// `Ok(Signature)` if the length is right, the recovery id is 0-3 and
    /// R and S are non-zero scalars below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            )));
        }
        let recovery_id = bytes[64];
        if RecoveryId::from_byte(recovery_id).is_none() {
            return Err(PrimitivesError::InvalidSignature(format!(
                "invalid recovery id {}",
                recovery_id
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        let sig = Signature { r, s, recovery_id };
        sig.to_k256()?;
        Ok(sig)
    }

    /// Serialize to the 65-byte `r || s || v` layout.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.recovery_id;
        out
    }

    /// Sign a 32-byte digest using RFC 6979 deterministic nonces.
    ///
    /// k256 normalises S to the lower half of the order and adjusts the
    /// recovery id to match.
    pub fn sign(digest: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (k256_sig, recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        Ok(Signature {
            r,
            s,
            recovery_id: recovery_id.to_byte(),
        })
    }

    /// Verify this signature against a digest and public key.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, digest: &[u8; 32], pub_key: &PublicKey) -> bool {
        let k256_sig = match self.to_k256() {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        pub_key
            .verifying_key()
            .verify_prehash(digest, &k256_sig)
            .is_ok()
    }

    /// Recover the signer's public key from this signature and the digest.
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let recovery_id = RecoveryId::from_byte(self.recovery_id)
            .ok_or_else(|| PrimitivesError::InvalidSignature("invalid recovery id".to_string()))?;
        let k256_sig = self.to_k256()?;
        let recovered = VerifyingKey::recover_from_prehash(digest, &k256_sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&recovered))
    }

    fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        )
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}
