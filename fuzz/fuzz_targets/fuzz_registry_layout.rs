#![no_main]

use libfuzzer_sys::fuzz_target;
use stakepool_types::layout::{decode_registry, encode_registry, REGISTRY_BLOCK_SIZE};

fuzz_target!(|data: &[u8]| {
    match decode_registry(data) {
        Ok(records) => {
            assert_eq!(data.len(), REGISTRY_BLOCK_SIZE);
            let encoded = encode_registry(&records).expect("decoded registry has the full slot count");
            assert_eq!(encoded.as_slice(), data);
        }
        Err(_) => assert_ne!(data.len(), REGISTRY_BLOCK_SIZE),
    }
});
