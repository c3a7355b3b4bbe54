/// Error types for message operations.
///
/// Field-level variants name the offending field so callers can fix the
/// input. All of them are raised before any encoding or signing happens.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// An address field is missing or malformed.
    #[error("invalid address in field '{field}': {reason}")]
    InvalidAddress { field: String, reason: String },

    /// An amount field is not a non-negative decimal integer.
    #[error("invalid amount in field '{field}': {reason}")]
    InvalidAmount { field: String, reason: String },

    /// A numeric field does not fit its wire type or size limit.
    #[error("field '{field}' out of range: {reason}")]
    FieldOutOfRange { field: String, reason: String },

    /// The params field is not valid base64.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The signature bytes or type are malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// An error occurred during CBOR or JSON encoding or decoding.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An underlying primitives error (forwarded from `fil-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] fil_primitives::PrimitivesError),

    /// An underlying address error (forwarded from `fil-address`).
    #[error("address error: {0}")]
    Address(#[from] fil_address::AddressError),
}

impl MessageError {
    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        MessageError::FieldOutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_amount(field: &str, reason: impl Into<String>) -> Self {
        MessageError::InvalidAmount {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_address(field: &str, reason: impl Into<String>) -> Self {
        MessageError::InvalidAddress {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
