/// Unified error type for all primitives operations.
///
/// Covers errors from entropy and mnemonic handling, HD derivation, EC
/// operations, and the binary/text encodings used by the signer.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("entropy source unavailable: {0}")]
    EntropySource(String),

    #[error("invalid mnemonic checksum")]
    InvalidChecksum,

    #[error("invalid mnemonic word at position {position}")]
    InvalidWord { position: usize },

    #[error("invalid mnemonic word count: {0} (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount(usize),

    #[error("invalid entropy length: {0} bits")]
    InvalidEntropyLength(usize),

    #[error("unsupported mnemonic language: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("hardened derivation at index {index} requires a private key")]
    HardenedDerivationRequiresPrivateKey { index: u32 },

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid scalar: zero or not below the curve order")]
    InvalidScalar,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base32: {0}")]
    InvalidBase32(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("varint too large")]
    VarIntTooLarge,

    #[error("varint is not minimally encoded")]
    NonMinimalVarInt,

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("invalid cbor: {0}")]
    InvalidCbor(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<base64::DecodeError> for PrimitivesError {
    fn from(e: base64::DecodeError) -> Self {
        PrimitivesError::InvalidBase64(e.to_string())
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidPublicKey(e.to_string())
    }
}
