//! Signed messages: an unsigned message plus its signature.
//!
//! Encoded as the CBOR array `[message, signature_bytes]` where the message
//! uses the schema it was signed under.

use fil_address::Network;
use fil_primitives::util::{CborReader, CborWriter, MAJOR_ARRAY};

use crate::cid::Cid;
use crate::message::{Schema, UnsignedMessage};
use crate::signature::{Signature, SignatureType};
use crate::MessageError;

/// An unsigned message with a signature attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub message: UnsignedMessage,
    pub signature: Signature,
    /// Schema the signed bytes were produced under.
    pub schema: Schema,
}

impl SignedMessage {
    pub fn new(message: UnsignedMessage, signature: Signature, schema: Schema) -> Self {
        SignedMessage {
            message,
            signature,
            schema,
        }
    }

    /// Encode to canonical CBOR.
    ///
    /// Fails like [`UnsignedMessage::encode`] if the message carries a
    /// field its schema does not encode.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        self.message.validate_for(self.schema)?;
        let mut writer = CborWriter::with_capacity(200 + self.message.params.len());
        writer.write_array_header(2);
        self.message.write_to(&mut writer, self.schema);
        writer.write_byte_string(&self.signature.to_bytes());
        Ok(writer.into_bytes())
    }

    /// Decode a signed message whose inner message uses `schema`.
    pub fn decode(bytes: &[u8], schema: Schema, network: Network) -> Result<Self, MessageError> {
        let mut reader = CborReader::new(bytes);
        let len = reader
            .read_array_header()
            .map_err(|e| MessageError::Serialization(format!("reading signed header: {}", e)))?;
        if len != 2 {
            return Err(MessageError::Serialization(format!(
                "expected 2 fields for signed message, found {}",
                len
            )));
        }
        let message = UnsignedMessage::read_from(&mut reader, schema, network)?;
        let sig_bytes = reader
            .read_byte_string()
            .map_err(|e| MessageError::Serialization(format!("reading signature: {}", e)))?;
        let signature = Signature::from_bytes(sig_bytes)?;
        if reader.remaining() != 0 {
            return Err(MessageError::Serialization(format!(
                "trailing {} bytes after signed message",
                reader.remaining()
            )));
        }
        Ok(SignedMessage {
            message,
            signature,
            schema,
        })
    }

    /// Decode a signed message, detecting the inner schema from its layout.
    pub fn decode_detect(bytes: &[u8], network: Network) -> Result<Self, MessageError> {
        let mut reader = CborReader::new(bytes);
        match reader.read_head() {
            Ok((MAJOR_ARRAY, 2)) => {}
            _ => {
                return Err(MessageError::Serialization(
                    "not a signed message".to_string(),
                ))
            }
        }
        let schema = Schema::detect(&bytes[bytes.len() - reader.remaining()..])?;
        Self::decode(bytes, schema, network)
    }

    /// The CID of the message as it is stored on chain.
    ///
    /// BLS-signed messages are identified by their unsigned message, since
    /// BLS signatures are aggregated per block.
    pub fn cid(&self) -> Result<Cid, MessageError> {
        match self.signature.sig_type() {
            SignatureType::Bls => self.message.cid(self.schema),
            SignatureType::Secp256k1 => Ok(Cid::from_cbor(&self.encode()?)),
        }
    }
}
