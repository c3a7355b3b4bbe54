/// Filecoin signer - Address handling.
///
/// This crate provides Filecoin addresses:
/// - ID, secp256k1, actor and BLS address protocols
/// - Mainnet (`f`) and testnet (`t`) string forms
/// - Byte encoding (`protocol || payload`) used inside messages
/// - Address derivation from secp256k1 public keys

pub mod address;

mod error;
pub use error::AddressError;

pub use address::{Address, Network, Payload, Protocol};
