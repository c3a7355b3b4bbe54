//! Mnemonic generation and hierarchical key derivation.

use tracing::debug;

use fil_address::Network;
use fil_primitives::bip32::{DerivationPath, ExtendedPrivateKey};
use fil_primitives::bip39::{language_from_code, Language, Mnemonic, WordCount};

use crate::keys::ExtendedKey;
use crate::SignerError;

/// Generate a 24-word English mnemonic from OS entropy.
pub fn generate_mnemonic() -> Result<Mnemonic, SignerError> {
    generate_mnemonic_with(WordCount::TwentyFour, Language::English)
}

/// Generate a mnemonic of the given length and language.
pub fn generate_mnemonic_with(
    word_count: WordCount,
    language: Language,
) -> Result<Mnemonic, SignerError> {
    let mnemonic = Mnemonic::generate(word_count, language)?;
    debug!(words = word_count.words(), ?language, "generated mnemonic");
    Ok(mnemonic)
}

/// Derive a key from a mnemonic phrase.
///
/// The address network follows the path: coin type 1 gives a testnet
/// address, anything else mainnet.
///
/// # Arguments
/// * `mnemonic` - Space-separated mnemonic words.
/// * `path` - Derivation path such as `m/44'/461'/0/0/0`.
/// * `password` - BIP-39 passphrase, empty for none.
/// * `language_code` - Wordlist code, `""` or `"en"` for English.
pub fn key_derive(
    mnemonic: &str,
    path: &str,
    password: &str,
    language_code: &str,
) -> Result<ExtendedKey, SignerError> {
    let language = language_from_code(language_code)?;
    let mnemonic = Mnemonic::parse(mnemonic, language)?;
    let seed = mnemonic.to_seed(password);
    key_derive_from_seed(seed.as_bytes(), path)
}

/// Derive a key from a raw BIP-39 seed.
pub fn key_derive_from_seed(seed: &[u8], path: &str) -> Result<ExtendedKey, SignerError> {
    let path: DerivationPath = path.parse()?;
    let master = ExtendedPrivateKey::new_master(seed)?;
    let child = master.derive_path(&path)?;
    let key = ExtendedKey::new(
        child.private_key().clone(),
        Network::from_testnet(path.is_testnet()),
    );
    debug!(%path, address = %key.address(), "derived key");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fil_primitives::PrimitivesError;

    const MNEMONIC: &str = "equip will roof matter pink blind book anxiety banner elbow sun young";

    #[test]
    fn test_key_derive_vector() {
        let key = key_derive(MNEMONIC, "m/44'/461'/0/0/0", "", "en").unwrap();
        assert_eq!(
            key.private_key_hex().as_str(),
            "f15716d3b003b304b8055d9cc62e6b9c869d56cc930c3858d4d7c31f5f53f14a"
        );
        assert_eq!(
            key.address().to_string(),
            "f1d2xrzcslx7xlbbylc5c3d5lvandqw4iwl6epxba"
        );
    }

    #[test]
    fn test_key_derive_password_and_testnet() {
        let key = key_derive(MNEMONIC, "m/44'/461'/0/0/0", "password", "").unwrap();
        assert_eq!(
            key.address().to_string(),
            "f1lrujjcw7cddkik6zungpoptlguyegwz67vzh2fq"
        );

        let key = key_derive(MNEMONIC, "m/44'/1'/0/0/0", "", "en").unwrap();
        assert_eq!(
            key.address().to_string(),
            "t137sjdbgunloi7couiy4l5nc7pd6k2jmq32vizpy"
        );
    }

    #[test]
    fn test_key_derive_errors() {
        assert!(matches!(
            key_derive(MNEMONIC, "m/44'/461'/0/0/0", "", "xx"),
            Err(SignerError::Primitives(PrimitivesError::UnsupportedLanguage(_)))
        ));
        assert!(matches!(
            key_derive(MNEMONIC, "44'/461'", "", "en"),
            Err(SignerError::Primitives(PrimitivesError::InvalidPath(_)))
        ));
        let misspelt = MNEMONIC.replacen("equip", "equipp", 1);
        assert!(matches!(
            key_derive(&misspelt, "m/44'/461'/0/0/0", "", "en"),
            Err(SignerError::Primitives(PrimitivesError::InvalidWord { position: 0 }))
        ));
    }

    #[test]
    fn test_generate_and_derive() {
        let mnemonic = generate_mnemonic().unwrap();
        assert_eq!(mnemonic.word_count(), 24);
        let phrase = mnemonic.phrase();
        let a = key_derive(&phrase, "m/44'/461'/0/0/0", "", "en").unwrap();
        let b = key_derive_from_seed(mnemonic.to_seed("").as_bytes(), "m/44'/461'/0/0/0").unwrap();
        assert_eq!(a, b);

        let italian = generate_mnemonic_with(WordCount::Twelve, Language::Italian).unwrap();
        assert_eq!(italian.word_count(), 12);
        assert!(key_derive(&italian.phrase(), "m/44'/461'/0/0/0", "", "it").is_ok());
    }
}
