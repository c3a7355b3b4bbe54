//! Message signatures as carried in signed messages.
//!
//! The byte form is a one-byte signature type followed by the signature
//! data: 65 bytes `r || s || v` for secp256k1, 96 bytes for BLS.

use serde::{Deserialize, Serialize};

use fil_primitives::bls::BlsSignature;
use fil_primitives::ec;

use crate::MessageError;

/// Length of secp256k1 signature data.
pub const SECP256K1_SIG_LEN: usize = 65;
/// Length of BLS signature data.
pub const BLS_SIG_LEN: usize = 96;

/// Signature scheme, serialized as its numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SignatureType {
    Secp256k1 = 1,
    Bls = 2,
}

impl SignatureType {
    fn data_len(self) -> usize {
        match self {
            SignatureType::Secp256k1 => SECP256K1_SIG_LEN,
            SignatureType::Bls => BLS_SIG_LEN,
        }
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = MessageError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            1 => Ok(SignatureType::Secp256k1),
            2 => Ok(SignatureType::Bls),
            other => Err(MessageError::InvalidSignature(format!(
                "unknown signature type {}",
                other
            ))),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(t: SignatureType) -> u8 {
        t as u8
    }
}

/// A typed signature over a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    sig_type: SignatureType,
    data: Vec<u8>,
}

impl Signature {
    /// Build a signature, checking the data length for its type.
    ///
    /// secp256k1 data must also carry a recovery id of 0..=3 and scalars
    /// `r` and `s` in `1..n`; BLS data must be a compressed G2 point in the
    /// prime-order subgroup. A decoded signature can always be verified.
    pub fn new(sig_type: SignatureType, data: Vec<u8>) -> Result<Self, MessageError> {
        if data.len() != sig_type.data_len() {
            return Err(MessageError::InvalidSignature(format!(
                "{:?} signature must be {} bytes, got {}",
                sig_type,
                sig_type.data_len(),
                data.len()
            )));
        }
        let checked = match sig_type {
            SignatureType::Secp256k1 => ec::Signature::from_bytes(&data).map(|_| ()),
            SignatureType::Bls => BlsSignature::from_bytes(&data).map(|_| ()),
        };
        checked.map_err(|e| MessageError::InvalidSignature(e.to_string()))?;
        Ok(Signature { sig_type, data })
    }

    /// Wrap a recoverable secp256k1 signature.
    pub fn new_secp256k1(sig: &ec::Signature) -> Self {
        Signature {
            sig_type: SignatureType::Secp256k1,
            data: sig.to_bytes().to_vec(),
        }
    }

    /// Wrap a BLS signature.
    pub fn new_bls(sig: &BlsSignature) -> Self {
        Signature {
            sig_type: SignatureType::Bls,
            data: sig.to_bytes().to_vec(),
        }
    }

    pub fn sig_type(&self) -> SignatureType {
        self.sig_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Parse the secp256k1 data as a recoverable signature.
    pub fn to_secp256k1(&self) -> Result<ec::Signature, MessageError> {
        if self.sig_type != SignatureType::Secp256k1 {
            return Err(MessageError::InvalidSignature(format!(
                "{:?} is not a secp256k1 signature",
                self.sig_type
            )));
        }
        Ok(ec::Signature::from_bytes(&self.data)?)
    }

    /// Parse the BLS data as a G2 point.
    pub fn to_bls(&self) -> Result<BlsSignature, MessageError> {
        if self.sig_type != SignatureType::Bls {
            return Err(MessageError::InvalidSignature(format!(
                "{:?} is not a BLS signature",
                self.sig_type
            )));
        }
        Ok(BlsSignature::from_bytes(&self.data)?)
    }

    /// The byte form `type || data`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.data.len());
        out.push(self.sig_type.into());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the byte form `type || data`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        let (&sig_type, data) = bytes
            .split_first()
            .ok_or_else(|| MessageError::InvalidSignature("empty signature".to_string()))?;
        Self::new(SignatureType::try_from(sig_type)?, data.to_vec())
    }
}
