/// Error types for address operations.
///
/// Covers string and byte decoding failures, checksum mismatches, and
/// payloads of the wrong size for their protocol.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// The leading network character is not `f` or `t`.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// The protocol digit or byte is not 0, 1, 2 or 3.
    #[error("unknown address protocol: {0}")]
    UnknownProtocol(String),

    /// The payload does not fit the protocol.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The address string or byte form has an impossible length.
    #[error("invalid address length: {0}")]
    InvalidLength(usize),

    /// The encoded checksum does not match the payload.
    #[error("invalid address checksum")]
    InvalidChecksum,

    /// The payload text is not valid base32 or decimal.
    #[error("invalid address encoding: {0}")]
    InvalidEncoding(String),

    /// Error from the primitives layer.
    #[error("primitives error: {0}")]
    Primitives(#[from] fil_primitives::PrimitivesError),
}
