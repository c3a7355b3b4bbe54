use proptest::prelude::*;

use fil_message::api::UnsignedMessageApi;
use fil_message::Schema;
use fil_primitives::bip39::Mnemonic;
use fil_signer::{
    key_derive, key_derive_from_seed, key_generate_bls, key_recover, transaction_parse,
    transaction_sign, transaction_sign_bls, transaction_sign_lotus, verify_message_signature,
    verify_signature, ParsedMessage,
};

/// A message carrying only the gas fields of the schema it is signed in.
fn message_for(
    from: String,
    nonce: u64,
    value: u64,
    gas_limit: i64,
    params: &[u8],
    lotus: bool,
) -> UnsignedMessageApi {
    use base64::Engine;
    let (gas_price, gas_fee_cap, gas_premium) = if lotus { ("100", "0", "0") } else { ("0", "200", "3") };
    UnsignedMessageApi {
        to: "f01234".to_string(),
        from,
        nonce,
        value: value.to_string(),
        gas_price: gas_price.to_string(),
        gas_limit,
        gas_fee_cap: gas_fee_cap.to_string(),
        gas_premium: gas_premium.to_string(),
        method: 0,
        params: base64::engine::general_purpose::STANDARD.encode(params),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn signed_messages_verify(
        secret in prop::array::uniform32(any::<u8>()),
        nonce in any::<u64>(),
        value in any::<u64>(),
        gas_limit in any::<i64>(),
        params in prop::collection::vec(any::<u8>(), 0..32),
        lotus in any::<bool>(),
    ) {
        if let Ok(key) = key_recover(&secret, false) {
            let api = message_for(key.address().to_string(), nonce, value, gas_limit, &params, lotus);
            let signed = if lotus {
                transaction_sign_lotus(&api, &hex::encode(secret)).unwrap()
            } else {
                transaction_sign(&api, &hex::encode(secret)).unwrap()
            };
            prop_assert_eq!(signed.schema, if lotus { Schema::LegacyCompat } else { Schema::Native });
            prop_assert!(verify_signature(&signed, key.public_key()).unwrap());
            prop_assert!(verify_message_signature(&signed).unwrap());

            match transaction_parse(&signed.encode().unwrap(), false).unwrap() {
                ParsedMessage::Signed(parsed) => {
                    prop_assert_eq!(&parsed.message, &signed.message);
                    prop_assert_eq!(&parsed.signature, &signed.signature);
                    prop_assert_eq!(parsed.schema, signed.schema);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn bls_signed_messages_verify(
        nonce in any::<u64>(),
        value in any::<u64>(),
        params in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let key = key_generate_bls(false).unwrap();
        let api = message_for(key.address().to_string(), nonce, value, 1000, &params, false);
        let signed = transaction_sign_bls(&api, &key.private_key_hex()).unwrap();
        prop_assert!(verify_message_signature(&signed).unwrap());
        prop_assert!(!verify_signature(&signed, &fil_primitives::ec::PrivateKey::new().pub_key()).unwrap());
    }

    #[test]
    fn recover_after_derive(entropy in prop::array::uniform16(any::<u8>()), index in 0u32..1000) {
        let mnemonic = Mnemonic::from_entropy(&entropy).unwrap();
        let path = format!("m/44'/461'/0/0/{}", index);
        let derived = key_derive(&mnemonic.phrase(), &path, "", "en").unwrap();
        let from_seed = key_derive_from_seed(mnemonic.to_seed("").as_bytes(), &path).unwrap();
        prop_assert_eq!(&derived, &from_seed);

        let recovered = key_recover(&derived.private_key_bytes()[..], false).unwrap();
        prop_assert_eq!(recovered, derived);
    }
}
