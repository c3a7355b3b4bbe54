//! JSON shapes exchanged with callers.
//!
//! Addresses are strings, amounts are decimal strings, `nonce`, `gaslimit`
//! and `method` are numeric literals, and params and signature data are
//! standard base64. Conversion into the typed message validates each field
//! and names the field in the error.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fil_address::Address;

use crate::amount::TokenAmount;
use crate::message::{Schema, UnsignedMessage};
use crate::signature::{Signature, SignatureType};
use crate::signed::SignedMessage;
use crate::MessageError;

fn zero_amount() -> String {
    "0".to_string()
}

/// An unsigned message as callers provide it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedMessageApi {
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: String,
    #[serde(rename = "gasprice", default = "zero_amount")]
    pub gas_price: String,
    #[serde(rename = "gaslimit")]
    pub gas_limit: i64,
    #[serde(rename = "gasfeecap", default = "zero_amount")]
    pub gas_fee_cap: String,
    #[serde(rename = "gaspremium", default = "zero_amount")]
    pub gas_premium: String,
    pub method: u64,
    /// Base64-encoded params, empty for none.
    #[serde(default)]
    pub params: String,
}

impl UnsignedMessageApi {
    /// Parse a JSON object, reporting problems per field.
    ///
    /// Unlike plain deserialization, numbers that do not fit their field
    /// produce `FieldOutOfRange` and bad amounts produce `InvalidAmount`,
    /// both naming the field.
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| MessageError::Serialization(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Field-checked conversion from an already parsed JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self, MessageError> {
        let obj = value.as_object().ok_or_else(|| {
            MessageError::Serialization("unsigned message must be a JSON object".to_string())
        })?;
        Ok(UnsignedMessageApi {
            to: address_field(obj, "to")?,
            from: address_field(obj, "from")?,
            nonce: u64_field(obj, "nonce")?,
            value: amount_field(obj, "value", false)?,
            gas_price: amount_field(obj, "gasprice", true)?,
            gas_limit: i64_field(obj, "gaslimit")?,
            gas_fee_cap: amount_field(obj, "gasfeecap", true)?,
            gas_premium: amount_field(obj, "gaspremium", true)?,
            method: u64_field(obj, "method")?,
            params: match obj.get("params") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(_) => {
                    return Err(MessageError::InvalidParams(
                        "params must be a base64 string".to_string(),
                    ))
                }
            },
        })
    }
}

fn address_field(obj: &Map<String, Value>, field: &str) -> Result<String, MessageError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MessageError::invalid_address(field, "must be a string")),
        None => Err(MessageError::invalid_address(field, "missing")),
    }
}

fn amount_field(
    obj: &Map<String, Value>,
    field: &str,
    optional: bool,
) -> Result<String, MessageError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None if optional => Ok(zero_amount()),
        Some(_) => Err(MessageError::invalid_amount(field, "must be a decimal string")),
        None => Err(MessageError::invalid_amount(field, "missing")),
    }
}

fn u64_field(obj: &Map<String, Value>, field: &str) -> Result<u64, MessageError> {
    obj.get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| MessageError::out_of_range(field, "expected an unsigned 64-bit integer"))
}

fn i64_field(obj: &Map<String, Value>, field: &str) -> Result<i64, MessageError> {
    obj.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| MessageError::out_of_range(field, "expected a signed 64-bit integer"))
}

fn parse_address(field: &str, s: &str) -> Result<Address, MessageError> {
    s.parse::<Address>()
        .map_err(|e| MessageError::invalid_address(field, e.to_string()))
}

impl TryFrom<&UnsignedMessageApi> for UnsignedMessage {
    type Error = MessageError;

    fn try_from(api: &UnsignedMessageApi) -> Result<Self, Self::Error> {
        let params = BASE64
            .decode(&api.params)
            .map_err(|e| MessageError::InvalidParams(e.to_string()))?;
        let message = UnsignedMessage {
            to: parse_address("to", &api.to)?,
            from: parse_address("from", &api.from)?,
            nonce: api.nonce,
            value: TokenAmount::parse_field("value", &api.value)?,
            gas_price: TokenAmount::parse_field("gasprice", &api.gas_price)?,
            gas_limit: api.gas_limit,
            gas_fee_cap: TokenAmount::parse_field("gasfeecap", &api.gas_fee_cap)?,
            gas_premium: TokenAmount::parse_field("gaspremium", &api.gas_premium)?,
            method: api.method,
            params,
        };
        message.validate()?;
        Ok(message)
    }
}

impl From<&UnsignedMessage> for UnsignedMessageApi {
    fn from(m: &UnsignedMessage) -> Self {
        UnsignedMessageApi {
            to: m.to.to_string(),
            from: m.from.to_string(),
            nonce: m.nonce,
            value: m.value.to_string(),
            gas_price: m.gas_price.to_string(),
            gas_limit: m.gas_limit,
            gas_fee_cap: m.gas_fee_cap.to_string(),
            gas_premium: m.gas_premium.to_string(),
            method: m.method,
            params: BASE64.encode(&m.params),
        }
    }
}

/// A signature as `{ "type": 1, "data": "<base64>" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureApi {
    #[serde(rename = "type")]
    pub sig_type: SignatureType,
    pub data: String,
}

impl From<&Signature> for SignatureApi {
    fn from(sig: &Signature) -> Self {
        SignatureApi {
            sig_type: sig.sig_type(),
            data: BASE64.encode(sig.data()),
        }
    }
}

impl TryFrom<&SignatureApi> for Signature {
    type Error = MessageError;

    fn try_from(api: &SignatureApi) -> Result<Self, Self::Error> {
        let data = BASE64
            .decode(&api.data)
            .map_err(|e| MessageError::InvalidSignature(e.to_string()))?;
        Signature::new(api.sig_type, data)
    }
}

/// A signed message as `{ "message": {...}, "signature": {...} }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessageApi {
    pub message: UnsignedMessageApi,
    pub signature: SignatureApi,
}

impl SignedMessageApi {
    /// Convert to a typed signed message produced under `schema`.
    ///
    /// Fails if the message holds a field `schema` does not encode.
    pub fn to_signed(&self, schema: Schema) -> Result<SignedMessage, MessageError> {
        let message = UnsignedMessage::try_from(&self.message)?;
        message.validate_for(schema)?;
        Ok(SignedMessage::new(
            message,
            Signature::try_from(&self.signature)?,
            schema,
        ))
    }
}

impl From<&SignedMessage> for SignedMessageApi {
    fn from(s: &SignedMessage) -> Self {
        SignedMessageApi {
            message: UnsignedMessageApi::from(&s.message),
            signature: SignatureApi::from(&s.signature),
        }
    }
}

/// A legacy Lotus message in Lotus' own PascalCase JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusMessageApi {
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: i64,
    pub method: u64,
    pub params: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignatureApi {
    #[serde(rename = "Type")]
    pub sig_type: SignatureType,
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LotusSignedMessageApi {
    pub message: LotusMessageApi,
    pub signature: LotusSignatureApi,
}

impl From<&SignedMessage> for LotusSignedMessageApi {
    fn from(s: &SignedMessage) -> Self {
        let m = &s.message;
        LotusSignedMessageApi {
            message: LotusMessageApi {
                to: m.to.to_string(),
                from: m.from.to_string(),
                nonce: m.nonce,
                value: m.value.to_string(),
                gas_price: m.gas_price.to_string(),
                gas_limit: m.gas_limit,
                method: m.method,
                params: BASE64.encode(&m.params),
            },
            signature: LotusSignatureApi {
                sig_type: s.signature.sig_type(),
                data: BASE64.encode(s.signature.data()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX_JSON: &str = r#"{
        "to": "t17uoq6tp427uzv7fztkbsnn64iwotfrristwpryy",
        "from": "t1d2xrzcslx7xlbbylc5c3d5lvandqw4iwl6epxba",
        "nonce": 1,
        "value": "100000",
        "gasprice": "2500",
        "gaslimit": 25000,
        "gasfeecap": "1",
        "gaspremium": "1",
        "method": 0,
        "params": ""
    }"#;

    fn json_with(key: &str, value: Value) -> String {
        let mut v: Value = serde_json::from_str(TX_JSON).unwrap();
        v[key] = value;
        v.to_string()
    }

    #[test]
    fn test_from_json_matches_serde() {
        let checked = UnsignedMessageApi::from_json(TX_JSON).unwrap();
        let plain: UnsignedMessageApi = serde_json::from_str(TX_JSON).unwrap();
        assert_eq!(checked, plain);

        let msg = UnsignedMessage::try_from(&checked).unwrap();
        assert_eq!(msg.nonce, 1);
        assert_eq!(msg.gas_price, TokenAmount::from(2500));
        assert!(msg.params.is_empty());
        assert_eq!(UnsignedMessageApi::from(&msg), checked);
    }

    #[test]
    fn test_optional_gas_fields_default_to_zero() {
        let mut v: Value = serde_json::from_str(TX_JSON).unwrap();
        let obj = v.as_object_mut().unwrap();
        obj.remove("gasprice");
        obj.remove("gasfeecap");
        obj.remove("gaspremium");
        obj.remove("params");
        let api = UnsignedMessageApi::from_json(&v.to_string()).unwrap();
        assert_eq!(api.gas_price, "0");
        assert_eq!(api.gas_fee_cap, "0");
        assert_eq!(api.params, "");
    }

    #[test]
    fn test_field_errors_name_the_field() {
        let cases = [
            ("method", serde_json::json!(-1), "method"),
            ("method", serde_json::json!(18446744073709551616.0), "method"),
            ("nonce", serde_json::json!("1"), "nonce"),
            ("gaslimit", serde_json::json!(1.5), "gaslimit"),
        ];
        for (key, value, field) in cases {
            let err = UnsignedMessageApi::from_json(&json_with(key, value)).unwrap_err();
            assert!(
                matches!(err, MessageError::FieldOutOfRange { field: ref f, .. } if f == field),
                "unexpected error {:?}",
                err
            );
        }

        let err = UnsignedMessageApi::from_json(&json_with("value", serde_json::json!(5))).unwrap_err();
        assert!(matches!(err, MessageError::InvalidAmount { ref field, .. } if field == "value"));

        let api = UnsignedMessageApi::from_json(&json_with("value", serde_json::json!("-5"))).unwrap();
        let err = UnsignedMessage::try_from(&api).unwrap_err();
        assert!(matches!(err, MessageError::InvalidAmount { ref field, .. } if field == "value"));

        let api = UnsignedMessageApi::from_json(&json_with("to", serde_json::json!("t1xyz"))).unwrap();
        let err = UnsignedMessage::try_from(&api).unwrap_err();
        assert!(matches!(err, MessageError::InvalidAddress { ref field, .. } if field == "to"));

        let err = UnsignedMessageApi::from_json(r#"{"from": "t01"}"#).unwrap_err();
        assert!(matches!(err, MessageError::InvalidAddress { ref field, .. } if field == "to"));

        let api = UnsignedMessageApi::from_json(&json_with("params", serde_json::json!("!!"))).unwrap();
        assert!(matches!(
            UnsignedMessage::try_from(&api),
            Err(MessageError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_params_base64() {
        let api =
            UnsignedMessageApi::from_json(&json_with("params", serde_json::json!("3q2+7w=="))).unwrap();
        let msg = UnsignedMessage::try_from(&api).unwrap();
        assert_eq!(msg.params, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_signature_json_shape() {
        let sig = Signature::new(SignatureType::Secp256k1, vec![1; 65]).unwrap();
        let json = serde_json::to_value(SignatureApi::from(&sig)).unwrap();
        assert_eq!(json["type"], 1);
        assert!(json["data"].is_string());
        let back: SignatureApi = serde_json::from_value(json).unwrap();
        assert_eq!(Signature::try_from(&back).unwrap(), sig);
    }

    #[test]
    fn test_to_signed_checks_schema_fields() {
        let sig = Signature::new(SignatureType::Secp256k1, vec![1; 65]).unwrap();
        let api = SignedMessageApi {
            message: UnsignedMessageApi::from_json(TX_JSON).unwrap(),
            signature: SignatureApi::from(&sig),
        };
        assert!(matches!(
            api.to_signed(Schema::Native),
            Err(MessageError::FieldOutOfRange { ref field, .. }) if field == "gasprice"
        ));

        let native = SignedMessageApi {
            message: UnsignedMessageApi::from_json(&json_with("gasprice", serde_json::json!("0"))).unwrap(),
            ..api
        };
        let signed = native.to_signed(Schema::Native).unwrap();
        assert_eq!(signed.schema, Schema::Native);
        assert_eq!(signed.signature, sig);
    }
}
