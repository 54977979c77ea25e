#![no_main]

use libfuzzer_sys::fuzz_target;
use b64pump::{OperationStatus, decode, decode_url_safe};

fuzz_target!(|input: (u8, u8, Vec<u8>)| {
    let (piece, dst_len, text) = input;
    let piece = usize::from(piece).max(1);
    let dst_len = usize::from(dst_len).max(3);

    // Decode in pieces through a small, often non-aligned destination.
    let mut out = Vec::new();
    let mut pending = Vec::new();
    let mut dst = vec![0u8; dst_len];
    let mut chunks = text.chunks(piece).peekable();
    let mut failed = false;

    'outer: while let Some(chunk) = chunks.next() {
        pending.extend_from_slice(chunk);
        let is_final = chunks.peek().is_none();
        loop {
            let outcome = decode(&pending, &mut dst, is_final);
            assert!(outcome.consumed <= pending.len());
            assert!(outcome.written <= dst.len());
            out.extend_from_slice(&dst[..outcome.written]);
            pending.drain(..outcome.consumed);
            match outcome.status {
                OperationStatus::Done | OperationStatus::NeedMoreData => break,
                OperationStatus::DestinationTooSmall => assert!(outcome.written > 0),
                OperationStatus::InvalidData => {
                    failed = true;
                    break 'outer;
                }
            }
        }
    }

    // Verify: piecewise decoding agrees with one-shot decoding
    match decode_url_safe(&text) {
        Ok(expected) => {
            assert!(!failed);
            assert_eq!(out, expected);
        }
        Err(_) => assert!(failed || text.len() % 4 == 1),
    }
});
