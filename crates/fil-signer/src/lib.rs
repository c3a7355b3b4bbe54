/// Filecoin signer - Key derivation, transaction signing and verification.
///
/// Ties the lower crates together into the signer's operations:
/// - Mnemonic generation and BIP-44 key derivation (`m/44'/461'/...`)
/// - Key recovery from raw private keys with the key's views
/// - Signing in the native or legacy Lotus message schema
/// - BLS key recovery, signing and aggregate verification
/// - Signature verification, message parsing and CIDs
///
/// Library code only emits `tracing` events; installing a subscriber is up
/// to the application.

mod error;
pub use error::SignerError;

pub mod config;
pub mod keys;
pub mod signer;
pub mod wallet;

pub use config::SignerConfig;
pub use keys::{
    key_generate_bls, key_recover, key_recover_base64, key_recover_bls, BlsKey, ExtendedKey,
};
pub use signer::{
    aggregate_signatures, get_cid, to_json, to_lotus_json, transaction_parse,
    transaction_serialize, transaction_sign, transaction_sign_bls, transaction_sign_bls_raw,
    transaction_sign_lotus, transaction_sign_raw, verify_aggregated_signature,
    verify_bls_signature, verify_message_signature, verify_signature, ParsedMessage, Signer,
};
pub use wallet::{generate_mnemonic, generate_mnemonic_with, key_derive, key_derive_from_seed};
