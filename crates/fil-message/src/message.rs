//! Unsigned Filecoin messages and their canonical CBOR encodings.
//!
//! Two schemas are supported. They share field semantics but not layout,
//! and a message encoded under one schema never decodes under the other.

use serde::{Deserialize, Serialize};

use fil_address::{Address, Network};
use fil_primitives::util::{CborReader, CborWriter, MAJOR_ARRAY};

use crate::amount::TokenAmount;
use crate::cid::Cid;
use crate::MessageError;

/// Version field of the native message layout.
pub const MESSAGE_VERSION: u64 = 0;

/// Wire layout of an unsigned message.
///
/// # Native (array of 10)
///
/// | # | Field       | CBOR                     |
/// |---|-------------|--------------------------|
/// | 0 | version     | uint, always 0           |
/// | 1 | to          | bytes (address)          |
/// | 2 | from        | bytes (address)          |
/// | 3 | nonce       | uint                     |
/// | 4 | value       | bytes (big-int)          |
/// | 5 | gas_limit   | int                      |
/// | 6 | gas_fee_cap | bytes (big-int)          |
/// | 7 | gas_premium | bytes (big-int)          |
/// | 8 | method      | uint                     |
/// | 9 | params      | bytes                    |
///
/// # LegacyCompat (array of 8, pre fee-market Lotus)
///
/// `[to, from, nonce, value, gas_price, gas_limit, method, params]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    #[default]
    Native,
    LegacyCompat,
}

impl Schema {
    /// Number of elements in the top-level CBOR array.
    pub fn field_count(&self) -> u64 {
        match self {
            Schema::Native => 10,
            Schema::LegacyCompat => 8,
        }
    }

    /// Guess the schema of an encoded unsigned message from its array length.
    pub fn detect(bytes: &[u8]) -> Result<Self, MessageError> {
        let (major, len) = CborReader::new(bytes)
            .peek_head()
            .map_err(|e| MessageError::Serialization(format!("reading message header: {}", e)))?;
        match (major, len) {
            (MAJOR_ARRAY, 10) => Ok(Schema::Native),
            (MAJOR_ARRAY, 8) => Ok(Schema::LegacyCompat),
            _ => Err(MessageError::Serialization(format!(
                "not an unsigned message (major type {}, length {})",
                major, len
            ))),
        }
    }
}

/// An unsigned Filecoin message.
///
/// `gas_price` is carried only by [`Schema::LegacyCompat`]; `gas_fee_cap`
/// and `gas_premium` only by [`Schema::Native`]. Encoding under a schema
/// fails if a field that schema does not carry is non-zero, so the bytes
/// always cover every value the message holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedMessage {
    pub to: Address,
    pub from: Address,
    pub nonce: u64,
    /// Amount transferred, in attoFIL.
    pub value: TokenAmount,
    pub gas_price: TokenAmount,
    pub gas_limit: i64,
    pub gas_fee_cap: TokenAmount,
    pub gas_premium: TokenAmount,
    /// Actor method number; 0 is a plain transfer.
    pub method: u64,
    /// CBOR-encoded method parameters, empty for none.
    pub params: Vec<u8>,
}

impl UnsignedMessage {
    /// A plain transfer with zero gas fields.
    pub fn transfer(from: Address, to: Address, nonce: u64, value: TokenAmount) -> Self {
        UnsignedMessage {
            to,
            from,
            nonce,
            value,
            gas_price: TokenAmount::zero(),
            gas_limit: 0,
            gas_fee_cap: TokenAmount::zero(),
            gas_premium: TokenAmount::zero(),
            method: 0,
            params: Vec::new(),
        }
    }

    /// Check every field fits the wire format.
    ///
    /// Runs before encoding so no partial output is ever produced.
    pub fn validate(&self) -> Result<(), MessageError> {
        self.value.check_size("value")?;
        self.gas_price.check_size("gasprice")?;
        self.gas_fee_cap.check_size("gasfeecap")?;
        self.gas_premium.check_size("gaspremium")?;
        Ok(())
    }

    /// Check the message fits the wire format of `schema`.
    ///
    /// On top of [`validate`](Self::validate), every amount the schema has
    /// no slot for must be zero.
    pub fn validate_for(&self, schema: Schema) -> Result<(), MessageError> {
        self.validate()?;
        let foreign = match schema {
            Schema::Native => vec![("gasprice", &self.gas_price)],
            Schema::LegacyCompat => vec![
                ("gasfeecap", &self.gas_fee_cap),
                ("gaspremium", &self.gas_premium),
            ],
        };
        for (field, amount) in foreign {
            if !amount.is_zero() {
                return Err(MessageError::out_of_range(
                    field,
                    format!("must be 0, the {:?} schema does not encode it", schema),
                ));
            }
        }
        Ok(())
    }

    /// Copy of this message with the fields `schema` does not carry zeroed.
    ///
    /// The copy passes [`validate_for`](Self::validate_for) whenever
    /// [`validate`](Self::validate) passes.
    pub fn normalized_for(&self, schema: Schema) -> Self {
        let mut out = self.clone();
        match schema {
            Schema::Native => out.gas_price = TokenAmount::zero(),
            Schema::LegacyCompat => {
                out.gas_fee_cap = TokenAmount::zero();
                out.gas_premium = TokenAmount::zero();
            }
        }
        out
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Encode to canonical CBOR under `schema`.
    ///
    /// # Returns
    /// The encoded bytes, or the first validation error. A non-zero field
    /// the schema does not carry is `FieldOutOfRange`.
    pub fn encode(&self, schema: Schema) -> Result<Vec<u8>, MessageError> {
        self.validate_for(schema)?;
        let mut writer = CborWriter::with_capacity(64 + self.params.len());
        self.write_to(&mut writer, schema);
        Ok(writer.into_bytes())
    }

    /// Append the encoding to `writer`. The message must already be validated.
    pub(crate) fn write_to(&self, writer: &mut CborWriter, schema: Schema) {
        writer.write_array_header(schema.field_count());
        match schema {
            Schema::Native => {
                writer.write_uint(MESSAGE_VERSION);
                writer.write_byte_string(&self.to.to_bytes());
                writer.write_byte_string(&self.from.to_bytes());
                writer.write_uint(self.nonce);
                writer.write_byte_string(&self.value.to_bytes());
                writer.write_int(self.gas_limit);
                writer.write_byte_string(&self.gas_fee_cap.to_bytes());
                writer.write_byte_string(&self.gas_premium.to_bytes());
                writer.write_uint(self.method);
                writer.write_byte_string(&self.params);
            }
            Schema::LegacyCompat => {
                writer.write_byte_string(&self.to.to_bytes());
                writer.write_byte_string(&self.from.to_bytes());
                writer.write_uint(self.nonce);
                writer.write_byte_string(&self.value.to_bytes());
                writer.write_byte_string(&self.gas_price.to_bytes());
                writer.write_int(self.gas_limit);
                writer.write_uint(self.method);
                writer.write_byte_string(&self.params);
            }
        }
    }

    /// Decode a message encoded under `schema`.
    ///
    /// Requires exactly one canonical message with no trailing data.
    ///
    /// # Arguments
    /// * `bytes` - CBOR-encoded unsigned message.
    /// * `schema` - Layout the bytes were encoded with.
    /// * `network` - Network to attach to the decoded addresses.
    pub fn decode(bytes: &[u8], schema: Schema, network: Network) -> Result<Self, MessageError> {
        let mut reader = CborReader::new(bytes);
        let message = Self::read_from(&mut reader, schema, network)?;
        if reader.remaining() != 0 {
            return Err(MessageError::Serialization(format!(
                "trailing {} bytes after message",
                reader.remaining()
            )));
        }
        Ok(message)
    }

    pub(crate) fn read_from(
        reader: &mut CborReader,
        schema: Schema,
        network: Network,
    ) -> Result<Self, MessageError> {
        let len = reader.read_array_header().map_err(ser("message header"))?;
        if len != schema.field_count() {
            return Err(MessageError::Serialization(format!(
                "expected {} fields for {:?} message, found {}",
                schema.field_count(),
                schema,
                len
            )));
        }
        let mut message = UnsignedMessage::transfer(
            Address::new_id(0),
            Address::new_id(0),
            0,
            TokenAmount::zero(),
        );
        match schema {
            Schema::Native => {
                let version = reader.read_uint().map_err(ser("version"))?;
                if version != MESSAGE_VERSION {
                    return Err(MessageError::Serialization(format!(
                        "unsupported message version {}",
                        version
                    )));
                }
                message.to = read_address(reader, "to", network)?;
                message.from = read_address(reader, "from", network)?;
                message.nonce = reader.read_uint().map_err(ser("nonce"))?;
                message.value = read_amount(reader, "value")?;
                message.gas_limit = reader.read_int().map_err(ser("gaslimit"))?;
                message.gas_fee_cap = read_amount(reader, "gasfeecap")?;
                message.gas_premium = read_amount(reader, "gaspremium")?;
                message.method = reader.read_uint().map_err(ser("method"))?;
                message.params = reader.read_byte_string().map_err(ser("params"))?.to_vec();
            }
            Schema::LegacyCompat => {
                message.to = read_address(reader, "to", network)?;
                message.from = read_address(reader, "from", network)?;
                message.nonce = reader.read_uint().map_err(ser("nonce"))?;
                message.value = read_amount(reader, "value")?;
                message.gas_price = read_amount(reader, "gasprice")?;
                message.gas_limit = reader.read_int().map_err(ser("gaslimit"))?;
                message.method = reader.read_uint().map_err(ser("method"))?;
                message.params = reader.read_byte_string().map_err(ser("params"))?.to_vec();
            }
        }
        Ok(message)
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// The CID of the message encoded under `schema`.
    pub fn cid(&self, schema: Schema) -> Result<Cid, MessageError> {
        Ok(Cid::from_cbor(&self.encode(schema)?))
    }

    /// The 32-byte digest a secp256k1 signature over this message signs.
    pub fn signing_digest(&self, schema: Schema) -> Result<[u8; 32], MessageError> {
        Ok(self.cid(schema)?.signing_digest())
    }
}

fn ser(field: &'static str) -> impl Fn(fil_primitives::PrimitivesError) -> MessageError {
    move |e| MessageError::Serialization(format!("reading {}: {}", field, e))
}

fn read_address(
    reader: &mut CborReader,
    field: &'static str,
    network: Network,
) -> Result<Address, MessageError> {
    let bytes = reader.read_byte_string().map_err(ser(field))?;
    Address::from_bytes(bytes, network).map_err(|e| MessageError::invalid_address(field, e.to_string()))
}

fn read_amount(reader: &mut CborReader, field: &'static str) -> Result<TokenAmount, MessageError> {
    let bytes = reader.read_byte_string().map_err(ser(field))?;
    TokenAmount::from_bytes(field, bytes)
}
