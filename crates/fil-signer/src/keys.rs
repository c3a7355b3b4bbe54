//! Key material produced by derivation and recovery.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;
use zeroize::Zeroizing;

use fil_address::{Address, Network};
use fil_primitives::bls::{BlsPrivateKey, BlsPublicKey, BLS_PUBLIC_KEY_LEN};
use fil_primitives::ec::{PrivateKey, PublicKey};

use crate::SignerError;

/// A private key with its public key and address.
///
/// The private key views return fresh copies; callers own zeroising them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKey {
    private_key: PrivateKey,
    public_key: PublicKey,
    address: Address,
}

impl ExtendedKey {
    /// Bundle a private key with its secp256k1 address on `network`.
    pub fn new(private_key: PrivateKey, network: Network) -> Self {
        let public_key = private_key.pub_key();
        let address = Address::from_public_key(&public_key).with_network(network);
        ExtendedKey {
            private_key,
            public_key,
            address,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.to_bytes())
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(self.private_key.to_hex())
    }

    pub fn private_key_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(self.private_key.to_base64())
    }

    /// Uncompressed 65-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 65] {
        self.public_key.to_uncompressed()
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key.to_uncompressed())
    }

    pub fn public_key_compressed_hex(&self) -> String {
        self.public_key.to_compressed_hex()
    }
}

/// Rebuild key material from a raw 32-byte private key.
///
/// # Arguments
/// * `private_key` - Big-endian scalar bytes.
/// * `testnet` - Use the `t` address prefix instead of `f`.
///
/// # Returns
/// The extended key, `InvalidKeyLength` for anything but 32 bytes, or
/// `InvalidScalar` for zero or values not below the curve order.
pub fn key_recover(private_key: &[u8], testnet: bool) -> Result<ExtendedKey, SignerError> {
    let key = PrivateKey::from_bytes(private_key)?;
    let extended = ExtendedKey::new(key, Network::from_testnet(testnet));
    debug!(address = %extended.address, "recovered key");
    Ok(extended)
}

/// Rebuild key material from a base64 private key, the export format of
/// Lotus wallets.
pub fn key_recover_base64(private_key: &str, testnet: bool) -> Result<ExtendedKey, SignerError> {
    let bytes = Zeroizing::new(
        BASE64
            .decode(private_key.trim())
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?,
    );
    key_recover(&bytes, testnet)
}

// -----------------------------------------------------------------------
// BLS
// -----------------------------------------------------------------------

/// A BLS private key with its public key and `f3` address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlsKey {
    private_key: BlsPrivateKey,
    public_key: BlsPublicKey,
    address: Address,
}

impl BlsKey {
    pub fn new(private_key: BlsPrivateKey, network: Network) -> Result<Self, SignerError> {
        let public_key = private_key.public_key();
        let address = Address::new_bls(&public_key.to_bytes())?.with_network(network);
        Ok(BlsKey {
            private_key,
            public_key,
            address,
        })
    }

    pub fn private_key(&self) -> &BlsPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &BlsPublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.to_bytes())
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(self.private_key.to_hex())
    }

    pub fn private_key_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(self.private_key.to_base64())
    }

    pub fn public_key_bytes(&self) -> [u8; BLS_PUBLIC_KEY_LEN] {
        self.public_key.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key.to_bytes())
    }
}

/// Generate a fresh BLS key from OS randomness.
pub fn key_generate_bls(testnet: bool) -> Result<BlsKey, SignerError> {
    let key = BlsKey::new(BlsPrivateKey::generate(), Network::from_testnet(testnet))?;
    debug!(address = %key.address, "generated BLS key");
    Ok(key)
}

/// Rebuild BLS key material from a raw private key.
///
/// # Arguments
/// * `private_key` - 32-byte little-endian scalar.
/// * `testnet` - Use the `t` address prefix instead of `f`.
///
/// # Returns
/// The key with its `f3` address, `InvalidKeyLength` for anything but 32
/// bytes, or `InvalidScalar` for zero or values not below the group order.
pub fn key_recover_bls(private_key: &[u8], testnet: bool) -> Result<BlsKey, SignerError> {
    let key = BlsKey::new(
        BlsPrivateKey::from_bytes(private_key)?,
        Network::from_testnet(testnet),
    )?;
    debug!(address = %key.address, "recovered BLS key");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fil_primitives::PrimitivesError;

    const PRIVATE_KEY_HEX: &str =
        "f15716d3b003b304b8055d9cc62e6b9c869d56cc930c3858d4d7c31f5f53f14a";
    const PRIVATE_KEY_BASE64: &str = "8VcW07ADswS4BV2cxi5rnIadVsyTDDhY1NfDH19T8Uo=";
    const PUBLIC_KEY_HEX: &str = "0435e752dc6b4113f78edcf2cf7b8082e442021de5f00818f555397a6f181af795ace98f0f7d065793eaffa1b06bf52e572c97030c53a2396dfab40ba0e976b108";

    #[test]
    fn test_recover_views() {
        let bytes = hex::decode(PRIVATE_KEY_HEX).unwrap();
        let key = key_recover(&bytes, true).unwrap();
        assert_eq!(key.address().to_string(), "t1d2xrzcslx7xlbbylc5c3d5lvandqw4iwl6epxba");
        assert_eq!(key.private_key_hex().as_str(), PRIVATE_KEY_HEX);
        assert_eq!(key.private_key_base64().as_str(), PRIVATE_KEY_BASE64);
        assert_eq!(&key.private_key_bytes()[..], &bytes[..]);
        assert_eq!(key.public_key_hex(), PUBLIC_KEY_HEX);
        assert_eq!(hex::encode(key.public_key_bytes()), PUBLIC_KEY_HEX);
        assert_eq!(
            BASE64.decode(key.public_key_base64()).unwrap(),
            hex::decode(PUBLIC_KEY_HEX).unwrap()
        );
        assert_eq!(key.public_key_compressed_hex().len(), 66);
        assert_eq!(&key.public_key_compressed_hex()[2..], &PUBLIC_KEY_HEX[2..66]);
    }

    #[test]
    fn test_recover_network_and_base64() {
        let mainnet = key_recover_base64(PRIVATE_KEY_BASE64, false).unwrap();
        assert_eq!(
            mainnet.address().to_string(),
            "f1d2xrzcslx7xlbbylc5c3d5lvandqw4iwl6epxba"
        );
        assert!(matches!(
            key_recover_base64("not base64!", false),
            Err(SignerError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_recover_rejects_bad_keys() {
        assert!(matches!(
            key_recover(&[1u8; 31], false),
            Err(SignerError::Primitives(PrimitivesError::InvalidKeyLength { expected: 32, got: 31 }))
        ));
        assert!(matches!(
            key_recover(&[0u8; 32], false),
            Err(SignerError::Primitives(PrimitivesError::InvalidScalar))
        ));
        assert!(matches!(
            key_recover(&[0xff; 32], false),
            Err(SignerError::Primitives(PrimitivesError::InvalidScalar))
        ));
    }

    #[test]
    fn test_recover_bls_key() {
        let generated = key_generate_bls(false).unwrap();
        let recovered = key_recover_bls(&generated.private_key_bytes()[..], false).unwrap();
        assert_eq!(recovered, generated);

        let address = recovered.address().to_string();
        assert!(address.starts_with("f3"));
        assert_eq!(address.parse::<Address>().unwrap(), *recovered.address());
        assert_eq!(recovered.public_key_bytes().len(), 48);
        assert_eq!(
            BASE64.decode(recovered.public_key_base64()).unwrap(),
            hex::decode(recovered.public_key_hex()).unwrap()
        );
        assert_eq!(
            BlsPrivateKey::from_hex(&recovered.private_key_hex()).unwrap(),
            *recovered.private_key()
        );

        let testnet = key_recover_bls(&generated.private_key_bytes()[..], true).unwrap();
        assert!(testnet.address().to_string().starts_with("t3"));
        assert!(testnet.address().same_payload(generated.address()));
    }

    #[test]
    fn test_recover_bls_rejects_bad_keys() {
        assert!(matches!(
            key_recover_bls(&[1u8; 33], false),
            Err(SignerError::Primitives(PrimitivesError::InvalidKeyLength { expected: 32, got: 33 }))
        ));
        assert!(matches!(
            key_recover_bls(&[0u8; 32], false),
            Err(SignerError::Primitives(PrimitivesError::InvalidScalar))
        ));
    }
}
