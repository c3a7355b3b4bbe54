//! Transaction signing, verification and the serialize/parse helpers.
//!
//! Signing hashes the CBOR encoding of the unsigned message into a CID,
//! hashes the CID bytes again with BLAKE2b-256 and signs that digest with a
//! recoverable secp256k1 signature. The schema chosen at signing time is
//! kept on the signed message so verification rebuilds the same digest.
//!
//! BLS keys sign the CID bytes themselves, always in the native schema.
//! Their signatures can be aggregated and checked against many messages.

use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use fil_address::{Address, Network, Payload};
use fil_message::api::{LotusSignedMessageApi, SignedMessageApi, UnsignedMessageApi};
use fil_message::{Cid, Schema, Signature, SignatureType, SignedMessage, UnsignedMessage};
use fil_primitives::bip39::Mnemonic;
use fil_primitives::bls::{BlsPrivateKey, BlsPublicKey, BlsSignature};
use fil_primitives::ec::{PrivateKey, PublicKey};
use fil_primitives::util::{CborReader, MAJOR_ARRAY};

use crate::config::SignerConfig;
use crate::keys::{self, BlsKey, ExtendedKey};
use crate::wallet;
use crate::SignerError;

/// Result of [`transaction_parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedMessage {
    Unsigned {
        message: UnsignedMessage,
        schema: Schema,
    },
    Signed(SignedMessage),
}

fn parse_private_key(private_key_hex: &str) -> Result<PrivateKey, SignerError> {
    let bytes = Zeroizing::new(
        hex::decode(private_key_hex.trim())
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?,
    );
    PrivateKey::from_bytes(&bytes).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))
}

fn parse_bls_private_key(private_key_hex: &str) -> Result<BlsPrivateKey, SignerError> {
    let bytes = Zeroizing::new(
        hex::decode(private_key_hex.trim())
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?,
    );
    BlsPrivateKey::from_bytes(&bytes).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))
}

fn sign_with_schema(
    unsigned: &UnsignedMessageApi,
    private_key_hex: &str,
    schema: Schema,
) -> Result<SignedMessage, SignerError> {
    let message = UnsignedMessage::try_from(unsigned)?;
    message.validate_for(schema)?;
    let private_key = parse_private_key(private_key_hex)?;
    let signature = transaction_sign_raw(&message, &private_key, schema)?;
    debug!(from = %message.from, nonce = message.nonce, ?schema, "signed message");
    Ok(SignedMessage::new(message, signature, schema))
}

/// Sign a message in the native schema.
///
/// # Arguments
/// * `unsigned` - The message as received from the caller.
/// * `private_key_hex` - 64 hex characters. Copied into a zeroising buffer;
///   the caller's string is left untouched.
///
/// # Returns
/// The signed message, `InvalidPrivateKey` for a malformed key, or the
/// message error that rejected a field. A non-zero `gasprice` is
/// `FieldOutOfRange`, since the native schema does not carry it.
pub fn transaction_sign(
    unsigned: &UnsignedMessageApi,
    private_key_hex: &str,
) -> Result<SignedMessage, SignerError> {
    sign_with_schema(unsigned, private_key_hex, Schema::Native)
}

/// Sign a message in the legacy Lotus schema.
///
/// Use [`to_lotus_json`] for the PascalCase JSON Lotus accepts. Non-zero
/// `gasfeecap` or `gaspremium` is `FieldOutOfRange`.
pub fn transaction_sign_lotus(
    unsigned: &UnsignedMessageApi,
    private_key_hex: &str,
) -> Result<SignedMessage, SignerError> {
    sign_with_schema(unsigned, private_key_hex, Schema::LegacyCompat)
}

/// Sign an already typed message with a parsed key.
pub fn transaction_sign_raw(
    message: &UnsignedMessage,
    private_key: &PrivateKey,
    schema: Schema,
) -> Result<Signature, SignerError> {
    let digest = message.signing_digest(schema)?;
    trace!(digest = %hex::encode(digest), "signing digest");
    let sig = private_key.sign(&digest)?;
    Ok(Signature::new_secp256k1(&sig))
}

/// Sign a message with a BLS key.
///
/// The signature covers the native-schema CID bytes, and the signed
/// message keeps the unsigned message's CID.
///
/// # Arguments
/// * `unsigned` - The message as received from the caller.
/// * `private_key_hex` - 64 hex characters of a little-endian scalar.
pub fn transaction_sign_bls(
    unsigned: &UnsignedMessageApi,
    private_key_hex: &str,
) -> Result<SignedMessage, SignerError> {
    let message = UnsignedMessage::try_from(unsigned)?;
    message.validate_for(Schema::Native)?;
    let private_key = parse_bls_private_key(private_key_hex)?;
    let signature = transaction_sign_bls_raw(&message, &private_key)?;
    debug!(from = %message.from, nonce = message.nonce, "signed message with BLS");
    Ok(SignedMessage::new(message, signature, Schema::Native))
}

/// BLS-sign an already typed message with a parsed key.
pub fn transaction_sign_bls_raw(
    message: &UnsignedMessage,
    private_key: &BlsPrivateKey,
) -> Result<Signature, SignerError> {
    let cid = message.cid(Schema::Native)?;
    trace!(%cid, "signing CID with BLS");
    Ok(Signature::new_bls(&private_key.sign(&cid.to_bytes())))
}

/// Check a signed message against a secp256k1 public key.
///
/// # Returns
/// `Ok(true)` if the signature covers the message under its schema,
/// `Ok(false)` on mismatch. A BLS signature is never from a secp256k1
/// key and gives `Ok(false)`; use [`verify_bls_signature`] for those.
pub fn verify_signature(signed: &SignedMessage, public_key: &PublicKey) -> Result<bool, SignerError> {
    if signed.signature.sig_type() == SignatureType::Bls {
        debug!(from = %signed.message.from, "BLS signature checked against a secp256k1 key");
        return Ok(false);
    }
    let sig = signed.signature.to_secp256k1()?;
    let digest = signed.message.signing_digest(signed.schema)?;
    Ok(public_key.verify(&digest, &sig))
}

/// Check a BLS-signed message against a BLS public key.
///
/// A secp256k1 signature gives `Ok(false)`.
pub fn verify_bls_signature(signed: &SignedMessage, public_key: &BlsPublicKey) -> Result<bool, SignerError> {
    if signed.signature.sig_type() != SignatureType::Bls {
        debug!(from = %signed.message.from, "secp256k1 signature checked against a BLS key");
        return Ok(false);
    }
    let sig = signed.signature.to_bls()?;
    let cid = signed.message.cid(signed.schema)?;
    Ok(public_key.verify(&cid.to_bytes(), &sig))
}

/// Check that the `from` address owns the signature.
///
/// secp256k1 signatures are matched by recovering the signer; BLS
/// signatures are checked against the public key an `f3` address carries.
/// ID addresses need chain state to resolve and always give `Ok(false)`.
pub fn verify_message_signature(signed: &SignedMessage) -> Result<bool, SignerError> {
    if signed.signature.sig_type() == SignatureType::Bls {
        return match bls_public_key_of(&signed.message.from) {
            Some(public_key) => verify_bls_signature(signed, &public_key),
            None => Ok(false),
        };
    }
    let sig = signed.signature.to_secp256k1()?;
    let digest = signed.message.signing_digest(signed.schema)?;
    let recovered = match sig.recover_public_key(&digest) {
        Ok(pk) => pk,
        Err(e) => {
            debug!(error = %e, "public key recovery failed");
            return Ok(false);
        }
    };
    Ok(Address::from_public_key(&recovered).same_payload(&signed.message.from))
}

fn bls_public_key_of(address: &Address) -> Option<BlsPublicKey> {
    let Payload::Bls(bytes) = address.payload() else {
        debug!(%address, "not a BLS address");
        return None;
    };
    match BlsPublicKey::from_bytes(bytes) {
        Ok(public_key) => Some(public_key),
        Err(e) => {
            debug!(%address, error = %e, "BLS address does not hold a public key");
            None
        }
    }
}

/// Combine the BLS signatures of several signed messages.
///
/// # Returns
/// The aggregate signature, or `UnsupportedSignature` if any message is
/// not BLS-signed.
pub fn aggregate_signatures(signed: &[SignedMessage]) -> Result<Signature, SignerError> {
    let mut sigs = Vec::with_capacity(signed.len());
    for s in signed {
        if s.signature.sig_type() != SignatureType::Bls {
            warn!(from = %s.message.from, "cannot aggregate a secp256k1 signature");
            return Err(SignerError::UnsupportedSignature(
                "only BLS signatures can be aggregated".to_string(),
            ));
        }
        sigs.push(s.signature.to_bls()?);
    }
    let aggregate = BlsSignature::aggregate(&sigs)?;
    Ok(Signature::new_bls(&aggregate))
}

/// Check an aggregated BLS signature against the messages it covers.
///
/// Each message must come from an `f3` address, whose public key is the
/// signer. Messages are identified by their native-schema CID.
///
/// # Returns
/// `Ok(true)` if every message is covered, `Ok(false)` for a mismatch, a
/// non-BLS signature or `from` address, or an empty message list.
pub fn verify_aggregated_signature(
    signature: &Signature,
    messages: &[UnsignedMessage],
) -> Result<bool, SignerError> {
    if signature.sig_type() != SignatureType::Bls || messages.is_empty() {
        return Ok(false);
    }
    let aggregate = signature.to_bls()?;
    let mut cids = Vec::with_capacity(messages.len());
    let mut public_keys = Vec::with_capacity(messages.len());
    for message in messages {
        let Some(public_key) = bls_public_key_of(&message.from) else {
            return Ok(false);
        };
        cids.push(message.cid(Schema::Native)?.to_bytes());
        public_keys.push(public_key);
    }
    let refs: Vec<&[u8]> = cids.iter().map(|c| c.as_slice()).collect();
    Ok(aggregate.verify_aggregate(&refs, &public_keys))
}

/// Encode a caller message in the native schema.
///
/// A non-zero `gasprice` is `FieldOutOfRange`.
pub fn transaction_serialize(unsigned: &UnsignedMessageApi) -> Result<Vec<u8>, SignerError> {
    let message = UnsignedMessage::try_from(unsigned)?;
    Ok(message.encode(Schema::Native)?)
}

/// Decode an unsigned or signed message in either schema.
pub fn transaction_parse(bytes: &[u8], testnet: bool) -> Result<ParsedMessage, SignerError> {
    parse_on(bytes, Network::from_testnet(testnet))
}

fn parse_on(bytes: &[u8], network: Network) -> Result<ParsedMessage, SignerError> {
    let head = CborReader::new(bytes).peek_head();
    let parsed = match head {
        Ok((MAJOR_ARRAY, 2)) => ParsedMessage::Signed(SignedMessage::decode_detect(bytes, network)?),
        _ => {
            let schema = Schema::detect(bytes)?;
            ParsedMessage::Unsigned {
                message: UnsignedMessage::decode(bytes, schema, network)?,
                schema,
            }
        }
    };
    trace!(len = bytes.len(), ?network, "parsed message");
    Ok(parsed)
}

/// The on-chain CID of a signed message.
pub fn get_cid(signed: &SignedMessage) -> Result<Cid, SignerError> {
    Ok(signed.cid()?)
}

/// Signed message as `{ "message": ..., "signature": ... }` JSON.
pub fn to_json(signed: &SignedMessage) -> Result<String, SignerError> {
    Ok(serde_json::to_string(&SignedMessageApi::from(signed))?)
}

/// Signed message in Lotus' PascalCase JSON.
pub fn to_lotus_json(signed: &SignedMessage) -> Result<String, SignerError> {
    Ok(serde_json::to_string(&LotusSignedMessageApi::from(signed))?)
}

// -----------------------------------------------------------------------
// Signer
// -----------------------------------------------------------------------

/// The signing operations bound to a validated [`SignerConfig`].
#[derive(Clone, Debug, Default)]
pub struct Signer {
    config: SignerConfig,
}

impl Signer {
    pub fn new(config: SignerConfig) -> Result<Self, SignerError> {
        config.validate()?;
        Ok(Signer { config })
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Generate a mnemonic with the configured length and language.
    pub fn generate_mnemonic(&self) -> Result<Mnemonic, SignerError> {
        wallet::generate_mnemonic_with(
            self.config.mnemonic_words()?,
            self.config.mnemonic_language()?,
        )
    }

    /// Derive the key at the configured path.
    pub fn key_derive(&self, mnemonic: &str, password: &str) -> Result<ExtendedKey, SignerError> {
        wallet::key_derive(
            mnemonic,
            &self.config.derivation_path,
            password,
            &self.config.language,
        )
    }

    /// Recover a key with an address on the configured network.
    pub fn key_recover(&self, private_key: &[u8]) -> Result<ExtendedKey, SignerError> {
        keys::key_recover(private_key, self.config.network.is_testnet())
    }

    /// Recover a BLS key with an address on the configured network.
    pub fn key_recover_bls(&self, private_key: &[u8]) -> Result<BlsKey, SignerError> {
        keys::key_recover_bls(private_key, self.config.network.is_testnet())
    }

    /// Sign in the configured schema.
    pub fn sign(
        &self,
        unsigned: &UnsignedMessageApi,
        private_key_hex: &str,
    ) -> Result<SignedMessage, SignerError> {
        sign_with_schema(unsigned, private_key_hex, self.config.schema)
    }

    /// Encode in the configured schema.
    pub fn serialize(&self, unsigned: &UnsignedMessageApi) -> Result<Vec<u8>, SignerError> {
        let message = UnsignedMessage::try_from(unsigned)?;
        Ok(message.encode(self.config.schema)?)
    }

    /// Decode with addresses on the configured network.
    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedMessage, SignerError> {
        parse_on(bytes, self.config.network)
    }

    pub fn verify(&self, signed: &SignedMessage, public_key: &PublicKey) -> Result<bool, SignerError> {
        verify_signature(signed, public_key)
    }
}
