//! BIP-39 mnemonic generation and seed derivation.
//!
//! Provides mnemonic phrase generation from OS entropy, validation,
//! entropy round trips, and PBKDF2-based seed derivation for HD wallet
//! compatibility. Wordlists and the checksum rules come from the `bip39`
//! crate; this module adds word count selection, language codes, error
//! mapping, and a seed type that zeroises on drop.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::PrimitivesError;

pub use ::bip39::Language;

/// Length of a BIP-39 seed in bytes.
pub const SEED_LEN: usize = 64;

/// Number of words in a mnemonic phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCount {
    /// 12 words (128-bit entropy)
    Twelve = 12,
    /// 15 words (160-bit entropy)
    Fifteen = 15,
    /// 18 words (192-bit entropy)
    Eighteen = 18,
    /// 21 words (224-bit entropy)
    TwentyOne = 21,
    /// 24 words (256-bit entropy)
    TwentyFour = 24,
}

impl WordCount {
    /// Number of entropy bytes for this word count.
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    /// Number of words.
    pub const fn words(self) -> usize {
        self as usize
    }

    /// Look up the word count for a number of words.
    pub fn from_words(n: usize) -> Result<Self, PrimitivesError> {
        match n {
            12 => Ok(WordCount::Twelve),
            15 => Ok(WordCount::Fifteen),
            18 => Ok(WordCount::Eighteen),
            21 => Ok(WordCount::TwentyOne),
            24 => Ok(WordCount::TwentyFour),
            other => Err(PrimitivesError::InvalidWordCount(other)),
        }
    }
}

impl Default for WordCount {
    fn default() -> Self {
        WordCount::TwentyFour
    }
}

/// Resolve a wordlist language from its ISO 639-1 style code.
///
/// Codes are matched case-insensitively. An empty code selects English.
///
/// # Arguments
/// * `code` - Language code such as `"en"`, `"fr"` or `"zh-cn"`.
pub fn language_from_code(code: &str) -> Result<Language, PrimitivesError> {
    match code.trim().to_ascii_lowercase().as_str() {
        "" | "en" => Ok(Language::English),
        "zh-cn" | "zh-hans" | "zh" => Ok(Language::SimplifiedChinese),
        "zh-tw" | "zh-hant" => Ok(Language::TraditionalChinese),
        "cs" => Ok(Language::Czech),
        "fr" => Ok(Language::French),
        "it" => Ok(Language::Italian),
        "ja" => Ok(Language::Japanese),
        "ko" => Ok(Language::Korean),
        "pt" => Ok(Language::Portuguese),
        "es" => Ok(Language::Spanish),
        other => Err(PrimitivesError::UnsupportedLanguage(other.to_string())),
    }
}

/// A validated BIP-39 mnemonic phrase.
///
/// The phrase is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    inner: ::bip39::Mnemonic,
}

impl Mnemonic {
    /// Generate a new mnemonic from fresh OS entropy.
    ///
    /// # Arguments
    /// * `word_count` - Number of words, which fixes the entropy size.
    /// * `language` - Wordlist to draw words from.
    ///
    /// # Returns
    /// The new mnemonic, or `EntropySource` if the OS RNG fails.
    pub fn generate(word_count: WordCount, language: Language) -> Result<Self, PrimitivesError> {
        let mut entropy = Zeroizing::new([0u8; 32]);
        let len = word_count.entropy_bytes();
        OsRng
            .try_fill_bytes(&mut entropy[..len])
            .map_err(|e| PrimitivesError::EntropySource(e.to_string()))?;
        Self::from_entropy_in(&entropy[..len], language)
    }

    /// Build the English mnemonic encoding `entropy`.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, PrimitivesError> {
        Self::from_entropy_in(entropy, Language::English)
    }

    /// Build the mnemonic encoding `entropy` in the given language.
    ///
    /// # Arguments
    /// * `entropy` - 16, 20, 24, 28 or 32 bytes.
    /// * `language` - Wordlist to use.
    pub fn from_entropy_in(entropy: &[u8], language: Language) -> Result<Self, PrimitivesError> {
        let inner = ::bip39::Mnemonic::from_entropy_in(language, entropy).map_err(map_error)?;
        Ok(Mnemonic { inner })
    }

    /// Parse and validate a phrase.
    ///
    /// Surrounding and repeated whitespace is ignored. Words are matched
    /// against the given wordlist after lowercasing.
    ///
    /// # Returns
    /// The mnemonic, or `InvalidWordCount`, `InvalidWord { position }` or
    /// `InvalidChecksum`.
    pub fn parse(phrase: &str, language: Language) -> Result<Self, PrimitivesError> {
        let normalized = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>();
        WordCount::from_words(normalized.len())?;
        let inner =
            ::bip39::Mnemonic::parse_in(language, normalized.join(" ")).map_err(map_error)?;
        Ok(Mnemonic { inner })
    }

    /// Recover the entropy this mnemonic encodes.
    pub fn to_entropy(&self) -> Vec<u8> {
        self.inner.to_entropy()
    }

    /// Derive the 64-byte seed with PBKDF2-HMAC-SHA512.
    ///
    /// Uses 2048 iterations and the salt `"mnemonic" || passphrase`.
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        Seed(self.inner.to_seed(passphrase))
    }

    /// The space-separated phrase.
    pub fn phrase(&self) -> String {
        self.inner.to_string()
    }

    /// Number of words in the phrase.
    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// Wordlist language of the phrase.
    pub fn language(&self) -> Language {
        self.inner.language()
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl FromStr for Mnemonic {
    type Err = PrimitivesError;

    /// Parses an English phrase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, Language::English)
    }
}

/// Check whether a phrase is a valid English mnemonic.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase, Language::English).is_ok()
}

/// A 64-byte BIP-39 seed, zeroised on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Wrap raw seed bytes.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Seed(bytes)
    }

    /// Access the seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

fn map_error(e: ::bip39::Error) -> PrimitivesError {
    match e {
        ::bip39::Error::BadWordCount(n) => PrimitivesError::InvalidWordCount(n),
        ::bip39::Error::UnknownWord(position) => PrimitivesError::InvalidWord { position },
        ::bip39::Error::BadEntropyBitCount(bits) => PrimitivesError::InvalidEntropyLength(bits),
        ::bip39::Error::InvalidChecksum => PrimitivesError::InvalidChecksum,
        #[allow(unreachable_patterns)]
        other => PrimitivesError::UnsupportedLanguage(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (entropy, phrase, seed with passphrase "TREZOR") from the BIP-39 reference vectors.
    const ZERO_ENTROPY_SEED: &str = "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04";

    #[test]
    fn test_reference_vectors_from_entropy() {
        let cases: [([u8; 16], &str); 4] = [
            (
                [0x00; 16],
                "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
            ),
            (
                [0x7f; 16],
                "legal winner thank year wave sausage worth useful legal winner thank yellow",
            ),
            (
                [0x80; 16],
                "letter advice cage absurd amount doctor acoustic avoid letter advice cage above",
            ),
            ([0xff; 16], "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong"),
        ];
        for (entropy, phrase) in cases {
            let m = Mnemonic::from_entropy(&entropy).unwrap();
            assert_eq!(m.phrase(), phrase);
            assert_eq!(m.to_entropy(), entropy.to_vec());
            let parsed: Mnemonic = phrase.parse().unwrap();
            assert_eq!(parsed, m);
        }
    }

    #[test]
    fn test_24_word_vector() {
        let m = Mnemonic::from_entropy(&[0u8; 32]).unwrap();
        let mut expected = vec!["abandon"; 23];
        expected.push("art");
        assert_eq!(m.phrase(), expected.join(" "));
        assert_eq!(m.word_count(), 24);
    }

    #[test]
    fn test_seed_vector() {
        let m = Mnemonic::from_entropy(&[0u8; 16]).unwrap();
        let seed = m.to_seed("TREZOR");
        assert_eq!(hex::encode(seed.as_bytes()), ZERO_ENTROPY_SEED);
    }

    #[test]
    fn test_generate_word_counts() {
        for wc in [
            WordCount::Twelve,
            WordCount::Fifteen,
            WordCount::Eighteen,
            WordCount::TwentyOne,
            WordCount::TwentyFour,
        ] {
            let m = Mnemonic::generate(wc, Language::English).unwrap();
            assert_eq!(m.word_count(), wc.words());
            assert_eq!(m.to_entropy().len(), wc.entropy_bytes());
            assert!(validate_mnemonic(&m.phrase()));
        }
    }

    #[test]
    fn test_generate_is_random() {
        let a = Mnemonic::generate(WordCount::TwentyFour, Language::English).unwrap();
        let b = Mnemonic::generate(WordCount::TwentyFour, Language::English).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_normalizes_whitespace_and_case() {
        let messy = "  Legal winner thank year wave sausage\tworth useful legal winner thank YELLOW ";
        let m: Mnemonic = messy.parse().unwrap();
        assert_eq!(
            m.phrase(),
            "legal winner thank year wave sausage worth useful legal winner thank yellow"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "abandon abandon abandon".parse::<Mnemonic>(),
            Err(PrimitivesError::InvalidWordCount(3))
        ));
        assert!(matches!(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
                .parse::<Mnemonic>(),
            Err(PrimitivesError::InvalidChecksum)
        ));
        assert!(matches!(
            "abandon abandon xyzzy abandon abandon abandon abandon abandon abandon abandon abandon about"
                .parse::<Mnemonic>(),
            Err(PrimitivesError::InvalidWord { position: 2 })
        ));
        assert!(!validate_mnemonic(""));
    }

    #[test]
    fn test_bad_entropy_length() {
        assert!(matches!(
            Mnemonic::from_entropy(&[0u8; 15]),
            Err(PrimitivesError::InvalidEntropyLength(120))
        ));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(language_from_code("en").unwrap(), Language::English);
        assert_eq!(language_from_code("").unwrap(), Language::English);
        assert_eq!(language_from_code("FR").unwrap(), Language::French);
        assert!(matches!(
            language_from_code("xx"),
            Err(PrimitivesError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_french_roundtrip() {
        let m = Mnemonic::from_entropy_in(&[0x42; 16], Language::French).unwrap();
        let parsed = Mnemonic::parse(&m.phrase(), Language::French).unwrap();
        assert_eq!(parsed.to_entropy(), vec![0x42; 16]);
    }

    #[test]
    fn test_debug_redacts() {
        let m = Mnemonic::from_entropy(&[0u8; 16]).unwrap();
        assert!(!format!("{:?}", m).contains("abandon"));
        assert_eq!(format!("{:?}", m.to_seed("")), "Seed([REDACTED])");
    }
}
