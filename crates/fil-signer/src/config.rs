//! Signer defaults: network, derivation path, mnemonic shape and schema.

use serde::{Deserialize, Serialize};

use fil_address::Network;
use fil_message::Schema;
use fil_primitives::bip32::DerivationPath;
use fil_primitives::bip39::{language_from_code, Language, WordCount};

use crate::SignerError;

/// Default mainnet derivation path (coin type 461).
pub const MAINNET_PATH: &str = "m/44'/461'/0/0/0";
/// Default testnet derivation path (coin type 1).
pub const TESTNET_PATH: &str = "m/44'/1'/0/0/0";

/// Configuration for a [`Signer`](crate::Signer).
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Network prefix for derived and recovered addresses.
    pub network: Network,
    /// Path used by `key_derive` when none is given.
    pub derivation_path: String,
    /// Words in generated mnemonics (12, 15, 18, 21 or 24).
    pub word_count: usize,
    /// Mnemonic language code, such as `"en"` or `"zh-cn"`.
    pub language: String,
    /// Message layout used when signing.
    pub schema: Schema,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl SignerConfig {
    /// Mainnet addresses, coin type 461, 24 English words, native messages.
    pub fn mainnet() -> Self {
        SignerConfig {
            network: Network::Mainnet,
            derivation_path: MAINNET_PATH.to_string(),
            word_count: WordCount::default().words(),
            language: "en".to_string(),
            schema: Schema::Native,
        }
    }

    /// Testnet addresses with the testnet coin type.
    pub fn testnet() -> Self {
        SignerConfig {
            network: Network::Testnet,
            derivation_path: TESTNET_PATH.to_string(),
            ..Self::mainnet()
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SignerError> {
        let config: SignerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field parses and the path agrees with the network.
    pub fn validate(&self) -> Result<(), SignerError> {
        let path = self.path()?;
        self.mnemonic_words()?;
        self.mnemonic_language()?;
        if path.is_testnet() != self.network.is_testnet() {
            return Err(SignerError::Config(format!(
                "derivation path {} does not match network {:?}",
                self.derivation_path, self.network
            )));
        }
        Ok(())
    }

    /// The default derivation path, parsed.
    pub fn path(&self) -> Result<DerivationPath, SignerError> {
        self.derivation_path
            .parse()
            .map_err(|e| SignerError::Config(format!("derivation_path: {}", e)))
    }

    pub fn mnemonic_words(&self) -> Result<WordCount, SignerError> {
        WordCount::from_words(self.word_count)
            .map_err(|e| SignerError::Config(format!("word_count: {}", e)))
    }

    pub fn mnemonic_language(&self) -> Result<Language, SignerError> {
        language_from_code(&self.language)
            .map_err(|e| SignerError::Config(format!("language: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SignerConfig::default().validate().unwrap();
        SignerConfig::testnet().validate().unwrap();
        assert_eq!(SignerConfig::default(), SignerConfig::mainnet());
        assert_eq!(SignerConfig::mainnet().word_count, 24);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SignerConfig::from_json(
            r#"{"network": "testnet", "derivation_path": "m/44'/1'/0/0/3", "schema": "legacy_compat"}"#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.schema, Schema::LegacyCompat);
        assert_eq!(config.word_count, 24);
        assert_eq!(config.path().unwrap().to_string(), "m/44'/1'/0/0/3");
    }

    #[test]
    fn test_rejects_bad_fields() {
        let cases = [
            r#"{"word_count": 13}"#,
            r#"{"language": "xx"}"#,
            r#"{"derivation_path": "44'/461'"}"#,
            r#"{"network": "testnet"}"#,
        ];
        for json in cases {
            assert!(
                matches!(SignerConfig::from_json(json), Err(SignerError::Config(_))),
                "{} should be rejected",
                json
            );
        }
        assert!(matches!(
            SignerConfig::from_json(r#"{"network": "devnet"}"#),
            Err(SignerError::Json(_))
        ));
    }
}
