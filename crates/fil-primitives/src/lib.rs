/// Filecoin signer - Cryptographic primitives, hashing, and utilities.
///
/// This crate provides the foundational building blocks for the signer:
/// - Hash functions (BLAKE2b-32/160/256, HMAC-SHA512)
/// - Canonical CBOR and unsigned LEB128 varint encoding
/// - Lowercase RFC 4648 base32 used by addresses and CIDs
/// - Elliptic curve cryptography (secp256k1 keys, recoverable signatures)
/// - BLS12-381 keys, signatures and aggregation
/// - BIP-39 mnemonics and seeds
/// - BIP-32 hierarchical deterministic derivation

pub mod hash;
pub mod util;
pub mod base32;
pub mod ec;
pub mod bls;
pub mod bip39;
pub mod bip32;

mod error;
pub use error::PrimitivesError;
