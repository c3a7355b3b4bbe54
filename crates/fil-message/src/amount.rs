//! Token amounts in attoFIL.
//!
//! Amounts are non-negative arbitrary-precision integers. On the wire they
//! use the Filecoin big-int byte form: empty for zero, otherwise a `0x00`
//! sign byte followed by the minimal big-endian magnitude.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::MessageError;

/// Largest serialized big-int, sign byte included.
pub const MAX_BIGINT_BYTES: usize = 128;

const SIGN_POSITIVE: u8 = 0x00;
const SIGN_NEGATIVE: u8 = 0x01;

/// A non-negative token amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    pub fn zero() -> Self {
        TokenAmount(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Parse a decimal string, naming `field` in any error.
    ///
    /// # Arguments
    /// * `field` - Field name reported on failure.
    /// * `s` - Base-10 digits with no sign, whitespace or separators.
    pub fn parse_field(field: &str, s: &str) -> Result<Self, MessageError> {
        if s.is_empty() {
            return Err(MessageError::invalid_amount(field, "empty amount"));
        }
        if s.starts_with('-') {
            return Err(MessageError::invalid_amount(field, "amount is negative"));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MessageError::invalid_amount(
                field,
                format!("{:?} is not a decimal integer", s),
            ));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| MessageError::invalid_amount(field, "unparseable amount"))?;
        Ok(TokenAmount(value))
    }

    /// Number of bytes in the big-int byte form.
    pub fn encoded_len(&self) -> usize {
        if self.is_zero() {
            0
        } else {
            1 + (self.0.bits() as usize).div_ceil(8)
        }
    }

    /// Check the amount fits in [`MAX_BIGINT_BYTES`].
    pub fn check_size(&self, field: &str) -> Result<(), MessageError> {
        let len = self.encoded_len();
        if len > MAX_BIGINT_BYTES {
            return Err(MessageError::out_of_range(
                field,
                format!("amount needs {} bytes, limit is {}", len, MAX_BIGINT_BYTES),
            ));
        }
        Ok(())
    }

    /// Serialize to the big-int byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            return Vec::new();
        }
        let magnitude = self.0.to_bytes_be();
        let mut out = Vec::with_capacity(1 + magnitude.len());
        out.push(SIGN_POSITIVE);
        out.extend_from_slice(&magnitude);
        out
    }

    /// Parse the big-int byte form, rejecting negative and non-minimal values.
    pub fn from_bytes(field: &str, bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() > MAX_BIGINT_BYTES {
            return Err(MessageError::out_of_range(
                field,
                format!("{} byte amount exceeds {} bytes", bytes.len(), MAX_BIGINT_BYTES),
            ));
        }
        let (sign, magnitude) = match bytes.split_first() {
            None => return Ok(TokenAmount::zero()),
            Some((&sign, magnitude)) => (sign, magnitude),
        };
        match sign {
            SIGN_POSITIVE => {}
            SIGN_NEGATIVE => return Err(MessageError::invalid_amount(field, "amount is negative")),
            other => {
                return Err(MessageError::invalid_amount(
                    field,
                    format!("invalid sign byte {:#04x}", other),
                ))
            }
        }
        match magnitude.first() {
            None | Some(0) => Err(MessageError::invalid_amount(
                field,
                "amount is not minimally encoded",
            )),
            Some(_) => Ok(TokenAmount(BigUint::from_bytes_be(magnitude))),
        }
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        TokenAmount(BigUint::from(v))
    }
}

impl From<BigUint> for TokenAmount {
    fn from(v: BigUint) -> Self {
        TokenAmount(v)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("amount", s)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
