//! BLS12-381 keys and signatures for Filecoin `f3` accounts.
//!
//! Private keys are 32-byte little-endian scalars, public keys 48-byte
//! compressed G1 points and signatures 96-byte compressed G2 points.
//! Messages are signed as given; hashing to G2 happens inside the scheme.

use std::fmt;

use base64::Engine;
use bls_signatures::Serialize as _;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::PrimitivesError;

/// Length of a BLS private key in bytes.
pub const BLS_PRIVATE_KEY_LEN: usize = 32;

/// Length of a compressed BLS public key in bytes.
pub const BLS_PUBLIC_KEY_LEN: usize = 48;

/// Length of a compressed BLS signature in bytes.
pub const BLS_SIGNATURE_LEN: usize = 96;

// -----------------------------------------------------------------------
// Private key
// -----------------------------------------------------------------------

/// A BLS private key.
#[derive(Clone)]
pub struct BlsPrivateKey {
    inner: bls_signatures::PrivateKey,
}

impl BlsPrivateKey {
    /// Generate a key from OS randomness.
    pub fn generate() -> Self {
        BlsPrivateKey {
            inner: bls_signatures::PrivateKey::generate(&mut OsRng),
        }
    }

    /// Parse a 32-byte little-endian scalar.
    ///
    /// # Returns
    /// `InvalidKeyLength` for anything but 32 bytes, `InvalidScalar` for
    /// zero or a value not below the group order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != BLS_PRIVATE_KEY_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: BLS_PRIVATE_KEY_LEN,
                got: bytes.len(),
            });
        }
        if bytes.iter().all(|&b| b == 0) {
            return Err(PrimitivesError::InvalidScalar);
        }
        let inner = bls_signatures::PrivateKey::from_bytes(bytes)
            .map_err(|_| PrimitivesError::InvalidScalar)?;
        Ok(BlsPrivateKey { inner })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Parse the base64 form Lotus exports BLS keys in.
    pub fn from_base64(b64: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(base64::engine::general_purpose::STANDARD.decode(b64)?);
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; BLS_PRIVATE_KEY_LEN] {
        let bytes = Zeroizing::new(self.inner.as_bytes());
        let mut out = [0u8; BLS_PRIVATE_KEY_LEN];
        out.copy_from_slice(&bytes);
        out
    }

    pub fn to_hex(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        hex::encode(&bytes[..])
    }

    pub fn to_base64(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        base64::engine::general_purpose::STANDARD.encode(&bytes[..])
    }

    pub fn public_key(&self) -> BlsPublicKey {
        BlsPublicKey {
            inner: self.inner.public_key(),
        }
    }

    /// Sign `message` directly. Filecoin passes the message CID bytes.
    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature {
            inner: self.inner.sign(message),
        }
    }
}

impl PartialEq for BlsPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *Zeroizing::new(self.to_bytes()) == *Zeroizing::new(other.to_bytes())
    }
}

impl Eq for BlsPrivateKey {}

impl fmt::Debug for BlsPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlsPrivateKey(..)")
    }
}

// -----------------------------------------------------------------------
// Public key
// -----------------------------------------------------------------------

/// A BLS public key, the payload of an `f3` address.
#[derive(Clone)]
pub struct BlsPublicKey {
    inner: bls_signatures::PublicKey,
}

impl BlsPublicKey {
    /// Parse a 48-byte compressed G1 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != BLS_PUBLIC_KEY_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                BLS_PUBLIC_KEY_LEN,
                bytes.len()
            )));
        }
        let inner = bls_signatures::PublicKey::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(BlsPublicKey { inner })
    }

    pub fn to_bytes(&self) -> [u8; BLS_PUBLIC_KEY_LEN] {
        let mut out = [0u8; BLS_PUBLIC_KEY_LEN];
        out.copy_from_slice(&self.inner.as_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Check `signature` over `message` against this key.
    pub fn verify(&self, message: &[u8], signature: &BlsSignature) -> bool {
        bls_signatures::verify_messages(
            &signature.inner,
            &[message],
            std::slice::from_ref(&self.inner),
        )
    }
}

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsPublicKey({})", self.to_hex())
    }
}

// -----------------------------------------------------------------------
// Signature
// -----------------------------------------------------------------------

/// A BLS signature, single or aggregated.
#[derive(Clone)]
pub struct BlsSignature {
    inner: bls_signatures::Signature,
}

impl BlsSignature {
    /// Parse a 96-byte compressed G2 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != BLS_SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                BLS_SIGNATURE_LEN,
                bytes.len()
            )));
        }
        let inner = bls_signatures::Signature::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(BlsSignature { inner })
    }

    pub fn to_bytes(&self) -> [u8; BLS_SIGNATURE_LEN] {
        let mut out = [0u8; BLS_SIGNATURE_LEN];
        out.copy_from_slice(&self.inner.as_bytes());
        out
    }

    /// Combine signatures into one that verifies against all their
    /// messages at once.
    ///
    /// # Returns
    /// The aggregate, or `InvalidSignature` for an empty slice.
    pub fn aggregate(signatures: &[BlsSignature]) -> Result<Self, PrimitivesError> {
        if signatures.is_empty() {
            return Err(PrimitivesError::InvalidSignature(
                "nothing to aggregate".to_string(),
            ));
        }
        let inners: Vec<bls_signatures::Signature> =
            signatures.iter().map(|s| s.inner.clone()).collect();
        let inner = bls_signatures::aggregate(&inners)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(BlsSignature { inner })
    }

    /// Check an aggregate against `messages[i]` signed by `public_keys[i]`.
    ///
    /// Messages must be distinct; a repeated message never verifies.
    pub fn verify_aggregate(&self, messages: &[&[u8]], public_keys: &[BlsPublicKey]) -> bool {
        if messages.is_empty() || messages.len() != public_keys.len() {
            return false;
        }
        let keys: Vec<bls_signatures::PublicKey> =
            public_keys.iter().map(|k| k.inner.clone()).collect();
        bls_signatures::verify_messages(&self.inner, messages, &keys)
    }
}

impl PartialEq for BlsSignature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsSignature {}

impl fmt::Debug for BlsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsSignature({})", hex::encode(self.to_bytes()))
    }
}
