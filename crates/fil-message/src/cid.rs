//! Content identifiers for CBOR-encoded messages.
//!
//! Message CIDs are CIDv1 with the dag-cbor codec and a BLAKE2b-256
//! multihash. The text form is multibase base32 (`b` prefix).

use std::fmt;
use std::str::FromStr;

use fil_primitives::base32;
use fil_primitives::hash::blake2b_256;

use crate::MessageError;

/// CIDv1, dag-cbor (0x71), multihash blake2b-256 (varint 0xb220), digest length 32.
const CID_PREFIX: [u8; 6] = [0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20];

/// Length of the binary CID.
pub const CID_LEN: usize = CID_PREFIX.len() + 32;

const MULTIBASE_BASE32: char = 'b';

/// The CID of a dag-cbor block hashed with BLAKE2b-256.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cid {
    digest: [u8; 32],
}

impl Cid {
    /// Compute the CID of an encoded CBOR block.
    pub fn from_cbor(block: &[u8]) -> Self {
        Cid {
            digest: blake2b_256(block),
        }
    }

    /// The BLAKE2b-256 digest of the block.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CID_LEN);
        out.extend_from_slice(&CID_PREFIX);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Parse the binary form, accepting only dag-cbor/blake2b-256 CIDs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() != CID_LEN || bytes[..CID_PREFIX.len()] != CID_PREFIX {
            return Err(MessageError::Serialization(
                "not a dag-cbor blake2b-256 CIDv1".to_string(),
            ));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[CID_PREFIX.len()..]);
        Ok(Cid { digest })
    }

    /// The digest a signer signs: BLAKE2b-256 of the binary CID.
    pub fn signing_digest(&self) -> [u8; 32] {
        blake2b_256(&self.to_bytes())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MULTIBASE_BASE32, base32::encode(&self.to_bytes()))
    }
}

impl FromStr for Cid {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(MULTIBASE_BASE32).ok_or_else(|| {
            MessageError::Serialization(format!("unsupported multibase in {:?}", s))
        })?;
        Self::from_bytes(&base32::decode(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let cid = Cid::from_cbor(b"\x80");
        let s = cid.to_string();
        assert!(s.starts_with("bafy2bzace"));
        assert_eq!(s.parse::<Cid>().unwrap(), cid);
        assert_eq!(Cid::from_bytes(&cid.to_bytes()).unwrap(), cid);
    }

    #[test]
    fn test_rejects_other_cids() {
        assert!("zafy2bzace".parse::<Cid>().is_err());
        let mut bytes = Cid::from_cbor(b"").to_bytes();
        bytes[1] = 0x55;
        assert!(Cid::from_bytes(&bytes).is_err());
        assert!(Cid::from_bytes(&bytes[..10]).is_err());
    }
}
