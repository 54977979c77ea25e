#![no_main]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use libfuzzer_sys::fuzz_target;
use b64pump::{decode_url_safe, encode_url_safe, make_url_safe, revert_url_safe};

fuzz_target!(|data: Vec<u8>| {
    // Verify: one-shot encode/decode round trip
    let text = encode_url_safe(&data);
    assert_eq!(text.len(), (data.len() * 4).div_ceil(3));
    assert_eq!(decode_url_safe(text.as_bytes()).unwrap(), data);

    // Verify: alphabet substitution reverses onto the standard encoding
    let standard = STANDARD.encode(&data);
    let mut buf = standard.clone().into_bytes();
    let len = make_url_safe(&mut buf[..]);
    assert_eq!(&buf[..len], text.as_bytes());

    let (len, padding) = revert_url_safe(&mut buf[..len]).unwrap();
    let mut rebuilt = buf[..len].to_vec();
    rebuilt.extend(std::iter::repeat_n(b'=', padding));
    assert_eq!(rebuilt, standard.into_bytes());

    // Verify: arbitrary input never panics the decoder
    let _ = decode_url_safe(&data);
});
