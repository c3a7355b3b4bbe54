//! BIP-32 hierarchical deterministic key derivation over secp256k1.
//!
//! Master keys are derived from a BIP-39 seed with HMAC-SHA512 keyed by
//! `"Bitcoin seed"`. Paths use the usual `m/44'/461'/0/0/0` notation,
//! where an apostrophe marks a hardened index.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, Scalar};
use regex::Regex;
use zeroize::Zeroizing;

use crate::ec::{PrivateKey, PublicKey};
use crate::hash::sha512_hmac;
use crate::PrimitivesError;

/// Offset added to an index to mark it hardened.
pub const HARDENED_OFFSET: u32 = 1 << 31;

/// HMAC key for master key generation.
const MASTER_KEY_SALT: &[u8] = b"Bitcoin seed";

/// BIP-44 coin type of Filecoin testnet (and every other testnet).
pub const TESTNET_COIN_TYPE: u32 = 1;

static RE_DERIVATION_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^m(/[0-9]+'?)*$").expect("static path regex is valid"));

/// A single step in a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildNumber {
    index: u32,
    hardened: bool,
}

impl ChildNumber {
    /// A non-hardened child index below 2^31.
    pub fn normal(index: u32) -> Result<Self, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidPath(format!(
                "index {} exceeds maximum",
                index
            )));
        }
        Ok(ChildNumber {
            index,
            hardened: false,
        })
    }

    /// A hardened child index below 2^31 (the offset is added on derivation).
    pub fn hardened(index: u32) -> Result<Self, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidPath(format!(
                "index {} exceeds maximum",
                index
            )));
        }
        Ok(ChildNumber {
            index,
            hardened: true,
        })
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The index without the hardened offset.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The 32-bit value serialized into the HMAC input.
    pub fn value(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A parsed derivation path such as `m/44'/461'/0/0/0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn new(steps: Vec<ChildNumber>) -> Self {
        DerivationPath(steps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildNumber> {
        self.0.iter()
    }

    /// The BIP-44 coin type (second step), if the path has one.
    pub fn coin_type(&self) -> Option<u32> {
        self.0.get(1).map(|c| c.index())
    }

    /// Whether the path's coin type selects a testnet.
    pub fn is_testnet(&self) -> bool {
        self.coin_type() == Some(TESTNET_COIN_TYPE)
    }
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    /// Parse `m` followed by `/`-separated indices, `'` marking hardened.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !RE_DERIVATION_PATH.is_match(s) {
            return Err(PrimitivesError::InvalidPath(format!("malformed path {:?}", s)));
        }
        let mut steps = Vec::new();
        for segment in s.split('/').skip(1) {
            let (digits, hardened) = match segment.strip_suffix('\'') {
                Some(d) => (d, true),
                None => (segment, false),
            };
            let index: u32 = digits.parse().map_err(|_| {
                PrimitivesError::InvalidPath(format!("index {} out of range", digits))
            })?;
            let child = if hardened {
                ChildNumber::hardened(index)?
            } else {
                ChildNumber::normal(index)?
            };
            steps.push(child);
        }
        Ok(DerivationPath(steps))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.0 {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

/// Split an HMAC-SHA512 output into IL (tweak) and IR (chain code).
fn split_hmac(output: &[u8; 64]) -> ([u8; 32], Zeroizing<[u8; 32]>) {
    let mut left = [0u8; 32];
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);
    (left, right)
}

/// Interpret IL as a scalar, rejecting values not below the curve order.
fn tweak_scalar(il: &[u8; 32]) -> Result<Scalar, PrimitivesError> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*il)))
        .ok_or(PrimitivesError::InvalidScalar)
}

/// An extended private key: a private key plus chain code.
#[derive(Clone, Debug)]
pub struct ExtendedPrivateKey {
    private_key: PrivateKey,
    chain_code: Zeroizing<[u8; 32]>,
    depth: u8,
    child_number: Option<ChildNumber>,
}

impl ExtendedPrivateKey {
    /// Derive the master key from a seed.
    ///
    /// # Arguments
    /// * `seed` - BIP-39 seed bytes (normally 64).
    ///
    /// # Returns
    /// The master key, or `InvalidScalar` if IL is zero or not below n.
    pub fn new_master(seed: &[u8]) -> Result<Self, PrimitivesError> {
        let output = Zeroizing::new(sha512_hmac(MASTER_KEY_SALT, seed));
        let (il, chain_code) = split_hmac(&output);
        let il = Zeroizing::new(il);
        let private_key = PrivateKey::from_bytes(&il[..])?;
        Ok(ExtendedPrivateKey {
            private_key,
            chain_code,
            depth: 0,
            child_number: None,
        })
    }

    /// Derive a single child key (CKDpriv).
    pub fn derive_child(&self, child: ChildNumber) -> Result<Self, PrimitivesError> {
        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if child.is_hardened() {
            data.push(0u8);
            data.extend_from_slice(&self.private_key.to_bytes());
        } else {
            data.extend_from_slice(&self.private_key.pub_key().to_compressed());
        }
        data.extend_from_slice(&child.value().to_be_bytes());

        let output = Zeroizing::new(sha512_hmac(&self.chain_code[..], &data));
        let (il, chain_code) = split_hmac(&output);
        let tweak = tweak_scalar(&il)?;
        let private_key = PrivateKey::from_scalar(self.private_key.to_scalar() + tweak)?;

        Ok(ExtendedPrivateKey {
            private_key,
            chain_code,
            depth: self.depth.saturating_add(1),
            child_number: Some(child),
        })
    }

    /// Derive along every step of `path`, starting from this key.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, PrimitivesError> {
        let mut key = self.clone();
        for child in path.iter() {
            key = key.derive_child(*child)?;
        }
        Ok(key)
    }

    /// The neutered key with the same chain code.
    pub fn public(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            public_key: self.private_key.pub_key(),
            chain_code: *self.chain_code,
            depth: self.depth,
            child_number: self.child_number,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The step that produced this key, `None` for the master key.
    pub fn child_number(&self) -> Option<ChildNumber> {
        self.child_number
    }
}

/// An extended public key: a public key plus chain code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    public_key: PublicKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: Option<ChildNumber>,
}

impl ExtendedPublicKey {
    /// Derive a single non-hardened child key (CKDpub).
    ///
    /// # Returns
    /// The child key, `HardenedDerivationRequiresPrivateKey` for a hardened
    /// step, or `InvalidScalar`/`InvalidPublicKey` for the (negligible)
    /// invalid-child cases.
    pub fn derive_child(&self, child: ChildNumber) -> Result<Self, PrimitivesError> {
        if child.is_hardened() {
            return Err(PrimitivesError::HardenedDerivationRequiresPrivateKey {
                index: child.index(),
            });
        }
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.public_key.to_compressed());
        data.extend_from_slice(&child.value().to_be_bytes());

        let output = sha512_hmac(&self.chain_code, &data);
        let (il, chain_code) = split_hmac(&output);
        let tweak = tweak_scalar(&il)?;
        let point = ProjectivePoint::GENERATOR * tweak + self.public_key.to_projective_point();
        let public_key = PublicKey::from_projective_point(point)?;

        Ok(ExtendedPublicKey {
            public_key,
            chain_code: *chain_code,
            depth: self.depth.saturating_add(1),
            child_number: Some(child),
        })
    }

    /// Derive along every step of `path`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, PrimitivesError> {
        let mut key = self.clone();
        for child in path.iter() {
            key = key.derive_child(*child)?;
        }
        Ok(key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::new_master(&hex::decode(VECTOR1_SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_vector1_master() {
        let m = master();
        assert_eq!(
            m.private_key().to_hex(),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            m.public().public_key().to_compressed_hex(),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(m.depth(), 0);
        assert!(m.child_number().is_none());
    }

    #[test]
    fn test_vector1_chain() {
        let m = master();
        let cases = [
            (
                "m/0'",
                "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea",
            ),
            (
                "m/0'/1",
                "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368",
            ),
            (
                "m/0'/1/2'",
                "cbce0d719ecf7431d88e6a89fa1483e02e35092af60c042b1df2ff59fa424dca",
            ),
        ];
        for (path, expected) in cases {
            let path: DerivationPath = path.parse().unwrap();
            let key = m.derive_path(&path).unwrap();
            assert_eq!(key.private_key().to_hex(), expected, "path {}", path);
            assert_eq!(key.depth() as usize, path.len());
        }
        let key = m.derive_path(&"m/0'".parse().unwrap()).unwrap();
        assert_eq!(
            key.public().public_key().to_compressed_hex(),
            "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56"
        );
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let m = master();
        let hardened = m.derive_path(&"m/0'".parse().unwrap()).unwrap();
        let from_private = hardened.derive_child(ChildNumber::normal(1).unwrap()).unwrap();
        let from_public = hardened
            .public()
            .derive_child(ChildNumber::normal(1).unwrap())
            .unwrap();
        assert_eq!(from_private.public(), from_public);
        assert_eq!(
            from_public.public_key().to_compressed_hex(),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );
    }

    #[test]
    fn test_public_hardened_fails() {
        let m = master();
        let err = m
            .public()
            .derive_path(&"m/44'/461'".parse().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            PrimitivesError::HardenedDerivationRequiresPrivateKey { index: 44 }
        ));
    }

    #[test]
    fn test_path_parsing() {
        let path: DerivationPath = "m/44'/461'/0/0/0".parse().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.coin_type(), Some(461));
        assert!(!path.is_testnet());
        assert_eq!(path.to_string(), "m/44'/461'/0/0/0");

        let testnet: DerivationPath = "m/44'/1'/0/0/0".parse().unwrap();
        assert!(testnet.is_testnet());

        let root: DerivationPath = "m".parse().unwrap();
        assert!(root.is_empty());
        assert_eq!(root.coin_type(), None);
    }

    #[test]
    fn test_path_parsing_errors() {
        for bad in [
            "",
            "44'/461'",
            "m/",
            "m//0",
            "m/44''",
            "m/-1",
            "m/a",
            "M/0",
            "m/2147483648",
            "m/4294967296'",
        ] {
            assert!(
                matches!(bad.parse::<DerivationPath>(), Err(PrimitivesError::InvalidPath(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
        assert!("m/2147483647'".parse::<DerivationPath>().is_ok());
    }

    #[test]
    fn test_child_number_value() {
        assert_eq!(ChildNumber::hardened(0).unwrap().value(), HARDENED_OFFSET);
        assert_eq!(ChildNumber::normal(5).unwrap().value(), 5);
        assert!(ChildNumber::normal(HARDENED_OFFSET).is_err());
    }
}
