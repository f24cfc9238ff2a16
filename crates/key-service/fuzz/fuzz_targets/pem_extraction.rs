#![no_main]

use key_service::crypto::codec::{decode_private_key, decode_public_key};
use key_service::crypto::pem::{PemBlock, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use key_service::crypto::KeyAlgorithm;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Extraction and decoding must reject malformed input without panicking
    for (label, is_public) in [(PUBLIC_KEY_LABEL, true), (PRIVATE_KEY_LABEL, false)] {
        if let Ok(block) = PemBlock::extract(text, label) {
            for algorithm in [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa] {
                if is_public {
                    let _ = decode_public_key(&block.body, algorithm);
                } else {
                    let _ = decode_private_key(&block.body, algorithm);
                }
            }
        }
    }
});
