use proptest::prelude::*;

use fil_address::{Address, Network};
use fil_primitives::ec::PrivateKey;

fn network() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Mainnet), Just(Network::Testnet)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn id_address_roundtrip(id in any::<u64>(), net in network()) {
        let addr = Address::new_id(id).with_network(net);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
        prop_assert_eq!(Address::from_bytes(&addr.to_bytes(), net).unwrap(), addr);
    }

    #[test]
    fn secp256k1_address_roundtrip(seed in prop::array::uniform32(any::<u8>()), net in network()) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let addr = Address::from_public_key(&pk.pub_key()).with_network(net);
            let s = addr.to_string();
            prop_assert_eq!(s.len(), 41);
            prop_assert_eq!(s.chars().next(), Some(net.prefix()));
            let parsed: Address = s.parse().unwrap();
            prop_assert_eq!(parsed, addr);
        }
    }

    #[test]
    fn actor_address_roundtrip(data in prop::collection::vec(any::<u8>(), 0..128)) {
        let addr = Address::new_actor(&data);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    #[test]
    fn arbitrary_strings_never_panic(s in "[ft][0-4][a-z2-7]{0,90}") {
        let _ = s.parse::<Address>();
    }
}
