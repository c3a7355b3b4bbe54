#![deny(missing_docs)]

//! Filecoin signer - Complete SDK.
//!
//! Re-exports every signer component for single-crate usage, with the
//! everyday signing operations at the top level.

pub use fil_primitives as primitives;
pub use fil_address as address;
pub use fil_message as message;
pub use fil_signer as signer;

pub use fil_signer::{
    get_cid, key_derive, key_recover, key_recover_bls, transaction_parse, transaction_serialize,
    transaction_sign, transaction_sign_bls, transaction_sign_lotus, verify_aggregated_signature,
    verify_message_signature, verify_signature,
};
