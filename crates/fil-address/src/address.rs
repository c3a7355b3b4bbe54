/// Filecoin address handling.
///
/// Supports ID, secp256k1, actor and BLS addresses, their `f`/`t` string
/// forms and the `protocol || payload` byte form carried in messages.
/// Non-ID string forms append a 4-byte BLAKE2b checksum of the byte form
/// and encode the result in lowercase unpadded base32.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use fil_primitives::base32;
use fil_primitives::ec::PublicKey;
use fil_primitives::hash::{blake2b_160, blake2b_32};
use fil_primitives::util::UVarInt;

use crate::AddressError;

/// Length of secp256k1 and actor payloads (a BLAKE2b-160 digest).
pub const PAYLOAD_HASH_LEN: usize = 20;
/// Length of a BLS public key payload.
pub const BLS_PUBLIC_KEY_LEN: usize = 48;
/// Length of the address checksum.
pub const CHECKSUM_LEN: usize = 4;
/// Longest possible address string (a BLS address).
pub const MAX_ADDRESS_LEN: usize = 86;
/// Longest decimal form of an ID.
const MAX_ID_DIGITS: usize = 20;

/// Network an address string belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Filecoin mainnet (prefix `f`).
    #[default]
    Mainnet,
    /// Any Filecoin testnet (prefix `t`).
    Testnet,
}

impl Network {
    /// The leading character of address strings on this network.
    pub fn prefix(&self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Testnet => 't',
        }
    }

    /// Select the network from a testnet flag.
    pub fn from_testnet(testnet: bool) -> Self {
        if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    pub fn is_testnet(&self) -> bool {
        *self == Network::Testnet
    }

    fn from_prefix(c: char) -> Result<Self, AddressError> {
        match c {
            'f' => Ok(Network::Mainnet),
            't' => Ok(Network::Testnet),
            other => Err(AddressError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Address protocol, the first byte of the byte form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Protocol {
    /// Actor ID assigned by the init actor.
    Id = 0,
    /// BLAKE2b-160 of an uncompressed secp256k1 public key.
    Secp256k1 = 1,
    /// BLAKE2b-160 of actor construction data.
    Actor = 2,
    /// A BLS public key.
    Bls = 3,
}

impl Protocol {
    /// Parse a protocol byte.
    pub fn from_byte(b: u8) -> Result<Self, AddressError> {
        match b {
            0 => Ok(Protocol::Id),
            1 => Ok(Protocol::Secp256k1),
            2 => Ok(Protocol::Actor),
            3 => Ok(Protocol::Bls),
            other => Err(AddressError::UnknownProtocol(other.to_string())),
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Expected payload length, `None` for variable-length IDs.
    fn payload_len(self) -> Option<usize> {
        match self {
            Protocol::Id => None,
            Protocol::Secp256k1 | Protocol::Actor => Some(PAYLOAD_HASH_LEN),
            Protocol::Bls => Some(BLS_PUBLIC_KEY_LEN),
        }
    }
}

/// The protocol-specific content of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Payload {
    Id(u64),
    Secp256k1([u8; PAYLOAD_HASH_LEN]),
    Actor([u8; PAYLOAD_HASH_LEN]),
    Bls([u8; BLS_PUBLIC_KEY_LEN]),
}

impl Payload {
    pub fn protocol(&self) -> Protocol {
        match self {
            Payload::Id(_) => Protocol::Id,
            Payload::Secp256k1(_) => Protocol::Secp256k1,
            Payload::Actor(_) => Protocol::Actor,
            Payload::Bls(_) => Protocol::Bls,
        }
    }

    /// The payload bytes: an unsigned LEB128 varint for IDs, raw bytes otherwise.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Id(id) => UVarInt(*id).to_bytes(),
            Payload::Secp256k1(h) | Payload::Actor(h) => h.to_vec(),
            Payload::Bls(k) => k.to_vec(),
        }
    }

    fn from_raw_bytes(protocol: Protocol, raw: &[u8]) -> Result<Self, AddressError> {
        if let Some(expected) = protocol.payload_len() {
            if raw.len() != expected {
                return Err(AddressError::InvalidPayload(format!(
                    "{:?} payload must be {} bytes, got {}",
                    protocol,
                    expected,
                    raw.len()
                )));
            }
        }
        match protocol {
            Protocol::Id => {
                let (id, used) = UVarInt::from_bytes(raw)
                    .map_err(|e| AddressError::InvalidPayload(e.to_string()))?;
                if used != raw.len() {
                    return Err(AddressError::InvalidPayload(
                        "trailing bytes after id".to_string(),
                    ));
                }
                Ok(Payload::Id(id.value()))
            }
            Protocol::Secp256k1 => {
                let mut h = [0u8; PAYLOAD_HASH_LEN];
                h.copy_from_slice(raw);
                Ok(Payload::Secp256k1(h))
            }
            Protocol::Actor => {
                let mut h = [0u8; PAYLOAD_HASH_LEN];
                h.copy_from_slice(raw);
                Ok(Payload::Actor(h))
            }
            Protocol::Bls => {
                let mut k = [0u8; BLS_PUBLIC_KEY_LEN];
                k.copy_from_slice(raw);
                Ok(Payload::Bls(k))
            }
        }
    }
}

/// A Filecoin address.
///
/// Equality includes the network. Use [`Address::same_payload`] to compare
/// addresses across networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    payload: Payload,
}

impl Address {
    /// Create a mainnet ID address.
    pub fn new_id(id: u64) -> Self {
        Address {
            network: Network::Mainnet,
            payload: Payload::Id(id),
        }
    }

    /// Create a mainnet secp256k1 address from a SEC1 public key.
    ///
    /// # Arguments
    /// * `public_key` - 33-byte compressed or 65-byte uncompressed key.
    ///
    /// # Returns
    /// The address whose payload is BLAKE2b-160 of the uncompressed key.
    pub fn new_secp256k1(public_key: &[u8]) -> Result<Self, AddressError> {
        let pk = PublicKey::from_bytes(public_key)?;
        Ok(Self::from_public_key(&pk))
    }

    /// Create a mainnet secp256k1 address from a parsed public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address {
            network: Network::Mainnet,
            payload: Payload::Secp256k1(blake2b_160(&public_key.to_uncompressed())),
        }
    }

    /// Create a mainnet actor address from actor construction data.
    pub fn new_actor(data: &[u8]) -> Self {
        Address {
            network: Network::Mainnet,
            payload: Payload::Actor(blake2b_160(data)),
        }
    }

    /// Create a mainnet BLS address from a 48-byte public key.
    pub fn new_bls(public_key: &[u8]) -> Result<Self, AddressError> {
        let payload = Payload::from_raw_bytes(Protocol::Bls, public_key)?;
        Ok(Address {
            network: Network::Mainnet,
            payload,
        })
    }

    /// Return this address on another network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn set_network(&mut self, network: Network) {
        self.network = network;
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn protocol(&self) -> Protocol {
        self.payload.protocol()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether two addresses name the same actor, ignoring network.
    pub fn same_payload(&self, other: &Address) -> bool {
        self.payload == other.payload
    }

    /// The byte form `protocol || payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let raw = self.payload.to_raw_bytes();
        let mut out = Vec::with_capacity(1 + raw.len());
        out.push(self.protocol().to_byte());
        out.extend_from_slice(&raw);
        out
    }

    /// Parse the byte form `protocol || payload`.
    ///
    /// # Arguments
    /// * `bytes` - Address bytes as carried in messages.
    /// * `network` - Network to attach, since bytes do not carry one.
    pub fn from_bytes(bytes: &[u8], network: Network) -> Result<Self, AddressError> {
        let (&protocol, raw) = bytes
            .split_first()
            .ok_or(AddressError::InvalidLength(0))?;
        let protocol = Protocol::from_byte(protocol)?;
        let payload = Payload::from_raw_bytes(protocol, raw)?;
        Ok(Address { network, payload })
    }

    /// The 4-byte checksum over the byte form.
    pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        blake2b_32(&self.to_bytes())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.network.prefix(),
            self.protocol().to_byte()
        )?;
        match &self.payload {
            Payload::Id(id) => write!(f, "{}", id),
            other => {
                let mut data = other.to_raw_bytes();
                data.extend_from_slice(&self.checksum());
                f.write_str(&base32::encode(&data))
            }
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 3 || s.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }
        let mut chars = s.chars();
        let network = Network::from_prefix(chars.next().unwrap_or_default())?;
        let protocol = match chars.next() {
            Some(c @ '0'..='3') => Protocol::from_byte(c as u8 - b'0')?,
            Some(c) => return Err(AddressError::UnknownProtocol(c.to_string())),
            None => return Err(AddressError::InvalidLength(s.len())),
        };
        let rest = chars.as_str();

        if protocol == Protocol::Id {
            if rest.len() > MAX_ID_DIGITS || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AddressError::InvalidEncoding(format!("bad id {:?}", rest)));
            }
            let id: u64 = rest
                .parse()
                .map_err(|_| AddressError::InvalidPayload(format!("id {} out of range", rest)))?;
            return Ok(Address {
                network,
                payload: Payload::Id(id),
            });
        }

        let decoded =
            base32::decode(rest).map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        if decoded.len() < CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }
        let (raw, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
        let payload = Payload::from_raw_bytes(protocol, raw)?;
        let address = Address { network, payload };
        if address.checksum().as_slice() != checksum {
            return Err(AddressError::InvalidChecksum);
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
