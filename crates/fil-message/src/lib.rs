/// Filecoin signer - Message encoding, CIDs and the JSON boundary.
///
/// Provides unsigned and signed Filecoin messages, their canonical CBOR
/// encodings in two schemas (the current native message and the legacy
/// Lotus message with a single gas price), message CIDs and the signing
/// digest, and the JSON shapes callers exchange messages in.

pub mod amount;
pub mod api;
pub mod cid;
pub mod message;
pub mod signature;
pub mod signed;

mod error;
pub use error::MessageError;
pub use amount::TokenAmount;
pub use cid::Cid;
pub use message::{Schema, UnsignedMessage};
pub use signature::{Signature, SignatureType};
pub use signed::SignedMessage;
