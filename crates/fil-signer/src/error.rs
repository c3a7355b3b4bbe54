/// Error types for key management and signing operations.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The private key input is not 32 bytes of hex encoding a valid scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The signature scheme does not fit the operation.
    #[error("unsupported signature: {0}")]
    UnsupportedSignature(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("primitives error: {0}")]
    Primitives(#[from] fil_primitives::PrimitivesError),

    #[error("message error: {0}")]
    Message(#[from] fil_message::MessageError),

    #[error("address error: {0}")]
    Address(#[from] fil_address::AddressError),
}
