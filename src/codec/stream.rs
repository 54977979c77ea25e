//! Block-streaming URL-safe encode and decode.
//!
//! Raw 6-bit packing is delegated to the standard engine of the `base64`
//! crate; this module only handles the alphabet substitution, padding, and
//! the bookkeeping needed to feed data in arbitrary pieces.
//!
//! Each call consumes whole groups (3 bytes / 4 symbols) and reports how far
//! it got through a [`CodecOutcome`]. Callers retry from `consumed` after
//! enlarging the destination or appending more input.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::alphabet::{PAD, url_safe_sextet};
use super::url_safe::{make_url_safe, required_padding, revert_symbols};
use crate::error::CodecError;

/// Size of the stack window used to reverse-substitute symbols before decoding.
const DECODE_WINDOW: usize = 256;

/// Status of a streaming codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    /// All input was processed.
    Done,
    /// The destination filled up; enlarge it and retry from `consumed`.
    DestinationTooSmall,
    /// A partial group remains; call again with more input (or `is_final`).
    NeedMoreData,
    /// Malformed input at `consumed`; output up to `written` is valid.
    InvalidData,
}

/// Result of a streaming [`encode`] or [`decode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecOutcome {
    /// Why the call stopped.
    pub status: OperationStatus,
    /// Input elements processed.
    pub consumed: usize,
    /// Output elements produced.
    pub written: usize,
}

impl CodecOutcome {
    const fn new(status: OperationStatus, consumed: usize, written: usize) -> Self {
        Self {
            status,
            consumed,
            written,
        }
    }

    /// Returns `true` if the status is [`OperationStatus::Done`].
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }
}

/// Number of URL-safe symbols needed for `n` bytes: `ceil(n * 4 / 3)`.
pub const fn url_safe_encoded_len(n: usize) -> usize {
    n / 3 * 4 + tail_symbols(n % 3)
}

/// Number of bytes a URL-safe text of `symbols` symbols decodes to.
///
/// Returns `None` if `symbols % 4 == 1`.
pub const fn url_safe_decoded_len(symbols: usize) -> Option<usize> {
    match symbols % 4 {
        1 => None,
        0 => Some(symbols / 4 * 3),
        rem => Some(symbols / 4 * 3 + rem - 1),
    }
}

/// Symbols emitted for a final partial group of `rest` (0-2) bytes.
///
/// The overlap bits left after splitting `rest * 8` into sextets decide the
/// padding: 0 bits need none, 4 bits need one `=`, 2 bits need two.
const fn tail_symbols(rest: usize) -> usize {
    let padding = match (rest * 8) % 6 {
        0 => 0,
        4 => 1,
        _ => 2,
    };
    if rest == 0 { 0 } else { 4 - padding }
}

/// Encodes `src` into URL-safe Base64 symbols in `dst`.
///
/// With `is_final == false` only whole 3-byte groups are consumed and a
/// leftover of 1-2 bytes is reported as [`OperationStatus::NeedMoreData`];
/// the caller carries it into the next call. With `is_final == true` the
/// leftover is emitted without padding.
///
/// # Example
///
/// ```
/// use b64pump::{encode, OperationStatus};
///
/// let mut out = [0u8; 8];
/// let outcome = encode(b"\xfb\xff", &mut out, true);
/// assert_eq!(outcome.status, OperationStatus::Done);
/// assert_eq!(&out[..outcome.written], b"-_8");
/// ```
pub fn encode(src: &[u8], dst: &mut [u8], is_final: bool) -> CodecOutcome {
    let full_groups = src.len() / 3;
    let groups = full_groups.min(dst.len() / 4);
    let mut consumed = groups * 3;
    let mut written = groups * 4;

    if groups > 0 {
        let out = &mut dst[..written];
        if STANDARD.encode_slice(&src[..consumed], &mut *out).is_err() {
            return CodecOutcome::new(OperationStatus::DestinationTooSmall, 0, 0);
        }
        make_url_safe(out);
    }

    if groups < full_groups {
        return CodecOutcome::new(OperationStatus::DestinationTooSmall, consumed, written);
    }

    let rest = src.len() - consumed;
    if rest == 0 {
        return CodecOutcome::new(OperationStatus::Done, consumed, written);
    }
    if !is_final {
        return CodecOutcome::new(OperationStatus::NeedMoreData, consumed, written);
    }

    let symbols = tail_symbols(rest);
    if dst.len() - written < symbols {
        return CodecOutcome::new(OperationStatus::DestinationTooSmall, consumed, written);
    }

    let mut tail = [PAD; 4];
    if STANDARD.encode_slice(&src[consumed..], &mut tail).is_err() {
        return CodecOutcome::new(OperationStatus::DestinationTooSmall, consumed, written);
    }
    let len = make_url_safe(&mut tail[..]);
    debug_assert_eq!(len, symbols);
    dst[written..written + len].copy_from_slice(&tail[..len]);
    consumed += rest;
    written += len;

    CodecOutcome::new(OperationStatus::Done, consumed, written)
}

/// Decodes URL-safe Base64 symbols from `src` into bytes in `dst`.
///
/// With `is_final == false` only whole 4-symbol groups are consumed and a
/// leftover of 1-3 symbols is reported as [`OperationStatus::NeedMoreData`].
/// With `is_final == true` the padding of the leftover is reconstructed
/// before decoding; a single leftover symbol is [`OperationStatus::InvalidData`].
///
/// Progress is limited by whichever of `src / 4` and `dst / 3` groups is
/// smaller, so a destination whose length is not a multiple of 3 yields
/// [`OperationStatus::DestinationTooSmall`] rather than silently dropping
/// input.
///
/// On [`OperationStatus::InvalidData`], `consumed` points at the start of
/// the offending group and the first `written` output bytes are valid.
pub fn decode(src: &[u8], dst: &mut [u8], is_final: bool) -> CodecOutcome {
    let full_groups = src.len() / 4;
    let groups = full_groups.min(dst.len() / 3);
    let limit = groups * 4;

    let mut window = [0u8; DECODE_WINDOW];
    let mut consumed = 0;
    let mut written = 0;

    while consumed < limit {
        let take = (limit - consumed).min(DECODE_WINDOW);
        let batch = &mut window[..take];
        batch.copy_from_slice(&src[consumed..consumed + take]);

        let (valid, failed) = match revert_symbols(&mut *batch, consumed) {
            Ok(()) => (take, false),
            Err(CodecError::InvalidData { offset }) => ((offset - consumed) / 4 * 4, true),
            Err(CodecError::InvalidLength { .. }) => (0, true),
        };

        if valid > 0 {
            let out = &mut dst[written..written + valid / 4 * 3];
            match STANDARD.decode_slice(&batch[..valid], out) {
                Ok(n) => written += n,
                Err(_) => {
                    return CodecOutcome::new(OperationStatus::InvalidData, consumed, written);
                }
            }
        }
        consumed += valid;

        if failed {
            return CodecOutcome::new(OperationStatus::InvalidData, consumed, written);
        }
    }

    if groups < full_groups {
        return CodecOutcome::new(OperationStatus::DestinationTooSmall, consumed, written);
    }

    let rest = src.len() - consumed;
    if rest == 0 {
        return CodecOutcome::new(OperationStatus::Done, consumed, written);
    }
    if !is_final {
        return CodecOutcome::new(OperationStatus::NeedMoreData, consumed, written);
    }

    let padding = match required_padding(rest) {
        Ok(padding) => padding,
        Err(_) => return CodecOutcome::new(OperationStatus::InvalidData, consumed, written),
    };
    let bytes = 3 - padding;
    if dst.len() - written < bytes {
        return CodecOutcome::new(OperationStatus::DestinationTooSmall, consumed, written);
    }

    let mut group = [PAD; 4];
    group[..rest].copy_from_slice(&src[consumed..]);
    if revert_symbols(&mut group[..rest], consumed).is_err() {
        return CodecOutcome::new(OperationStatus::InvalidData, consumed, written);
    }

    let mut out = [0u8; 3];
    match STANDARD.decode_slice(group, &mut out) {
        Ok(n) if n == bytes => {
            dst[written..written + n].copy_from_slice(&out[..n]);
            CodecOutcome::new(OperationStatus::Done, src.len(), written + n)
        }
        // Non-zero trailing bits in the last symbol.
        _ => CodecOutcome::new(OperationStatus::InvalidData, consumed, written),
    }
}

/// Encodes `input` into a URL-safe Base64 string without padding.
///
/// # Example
///
/// ```
/// assert_eq!(b64pump::encode_url_safe(b"f"), "Zg");
/// assert_eq!(b64pump::encode_url_safe(&[0xfb, 0xff]), "-_8");
/// ```
pub fn encode_url_safe(input: &[u8]) -> String {
    let mut out = vec![0u8; url_safe_encoded_len(input.len())];
    let outcome = encode(input, &mut out, true);
    debug_assert!(outcome.is_done());
    out.truncate(outcome.written);
    out.into_iter().map(char::from).collect()
}

/// Decodes unpadded URL-safe Base64 into bytes.
///
/// # Errors
///
/// - [`CodecError::InvalidLength`] if `input.len() % 4 == 1`.
/// - [`CodecError::InvalidData`] with the offset of the first symbol outside
///   the URL-safe alphabet, or of the last symbol if its trailing bits are
///   not zero.
///
/// # Example
///
/// ```
/// assert_eq!(b64pump::decode_url_safe(b"Zg")?, b"f");
/// # Ok::<(), b64pump::CodecError>(())
/// ```
pub fn decode_url_safe(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let len = url_safe_decoded_len(input.len()).ok_or(CodecError::InvalidLength {
        length: input.len(),
    })?;
    let mut out = vec![0u8; len];
    let outcome = decode(input, &mut out, true);
    if !outcome.is_done() {
        let offset = input[outcome.consumed..]
            .iter()
            .position(|&b| url_safe_sextet(b).is_none())
            .map_or(input.len().saturating_sub(1), |p| outcome.consumed + p);
        return Err(CodecError::InvalidData { offset });
    }
    out.truncate(outcome.written);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty() {
        let mut out = [0u8; 4];
        let outcome = encode(b"", &mut out, true);
        assert_eq!(outcome, CodecOutcome::new(OperationStatus::Done, 0, 0));
        assert_eq!(encode_url_safe(b""), "");
    }

    #[test]
    fn test_encode_single_byte_drops_padding() {
        let mut out = [0u8; 4];
        let outcome = encode(b"f", &mut out, true);
        assert_eq!(outcome, CodecOutcome::new(OperationStatus::Done, 1, 2));
        assert_eq!(&out[..2], b"Zg");
    }

    #[test]
    fn test_encode_substitutes_62_and_63() {
        // 0xFB 0xFF -> standard "+/8=", sextets 62, 63, 60.
        assert_eq!(encode_url_safe(&[0xfb, 0xff]), "-_8");
        // 0xFF 0xFE -> standard "//4=".
        assert_eq!(encode_url_safe(&[0xff, 0xfe]), "__4");
    }

    #[test]
    fn test_encode_non_final_keeps_tail() {
        let mut out = [0u8; 16];
        let outcome = encode(b"hello", &mut out, false);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::NeedMoreData, 3, 4)
        );
        assert_eq!(&out[..4], b"aGVs");

        // Carry the pending tail into the final call.
        let tail = &b"hello"[outcome.consumed..];
        let next = encode(tail, &mut out[4..], true);
        assert_eq!(next, CodecOutcome::new(OperationStatus::Done, 2, 3));
        assert_eq!(&out[..7], b"aGVsbG8");
    }

    #[test]
    fn test_encode_destination_too_small() {
        let mut out = [0u8; 6];
        let outcome = encode(b"abcdefg", &mut out, true);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::DestinationTooSmall, 3, 4)
        );

        // Tail does not fit either.
        let mut out = [0u8; 5];
        let outcome = encode(b"abcd", &mut out, true);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::DestinationTooSmall, 3, 4)
        );
    }

    #[test]
    fn test_encoded_len_law() {
        for n in 0..64 {
            assert_eq!(url_safe_encoded_len(n), (n * 4).div_ceil(3));
            assert_eq!(encode_url_safe(&vec![0xAB; n]).len(), (n * 4).div_ceil(3));
        }
    }

    #[test]
    fn test_decoded_len() {
        assert_eq!(url_safe_decoded_len(0), Some(0));
        assert_eq!(url_safe_decoded_len(1), None);
        assert_eq!(url_safe_decoded_len(2), Some(1));
        assert_eq!(url_safe_decoded_len(3), Some(2));
        assert_eq!(url_safe_decoded_len(8), Some(6));
        assert_eq!(url_safe_decoded_len(11), Some(8));
    }

    #[test]
    fn test_decode_single_byte() {
        let mut out = [0u8; 3];
        let outcome = decode(b"Zg", &mut out, true);
        assert_eq!(outcome, CodecOutcome::new(OperationStatus::Done, 2, 1));
        assert_eq!(out[0], b'f');
    }

    #[test]
    fn test_decode_exact_tail_destination() {
        // Tail of 2 bytes fits exactly; the engine's padded estimate must not
        // leak into the caller's destination size.
        let mut out = [0u8; 2];
        let outcome = decode(b"-_8", &mut out, true);
        assert_eq!(outcome, CodecOutcome::new(OperationStatus::Done, 3, 2));
        assert_eq!(out, [0xfb, 0xff]);
    }

    #[test]
    fn test_decode_non_final_keeps_tail() {
        let mut out = [0u8; 16];
        let outcome = decode(b"aGVsbG8", &mut out, false);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::NeedMoreData, 4, 3)
        );
        assert_eq!(&out[..3], b"hel");
    }

    #[test]
    fn test_decode_non_aligned_destination() {
        // 8 symbols = 6 bytes, but only 5 bytes of room: one group fits and
        // the second is reported, not dropped.
        let mut out = [0u8; 5];
        let outcome = decode(b"aGVsbG8h", &mut out, false);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::DestinationTooSmall, 4, 3)
        );

        let mut rest = [0u8; 3];
        let next = decode(&b"aGVsbG8h"[outcome.consumed..], &mut rest, false);
        assert_eq!(next, CodecOutcome::new(OperationStatus::Done, 4, 3));
        assert_eq!(&rest, b"lo!");
    }

    #[test]
    fn test_decode_non_aligned_destination_final() {
        let mut out = [0u8; 4];
        let outcome = decode(b"aGVsbG8", &mut out, true);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::DestinationTooSmall, 4, 3)
        );
    }

    #[test]
    fn test_decode_destination_smaller_than_one_group() {
        let mut out = [0u8; 2];
        let outcome = decode(b"aGVs", &mut out, false);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::DestinationTooSmall, 0, 0)
        );
    }

    #[test]
    fn test_decode_single_leftover_symbol_is_invalid() {
        let mut out = [0u8; 8];
        let outcome = decode(b"aGVsb", &mut out, true);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::InvalidData, 4, 3)
        );
        assert_eq!(&out[..3], b"hel");
    }

    #[test]
    fn test_decode_invalid_symbol_keeps_prior_output() {
        let mut out = [0u8; 16];
        let outcome = decode(b"aGVsbG8h+GVs", &mut out, true);
        assert_eq!(
            outcome,
            CodecOutcome::new(OperationStatus::InvalidData, 8, 6)
        );
        assert_eq!(&out[..6], b"hello!");
    }

    #[test]
    fn test_decode_non_canonical_tail() {
        // 'h' leaves non-zero trailing bits for a 1-byte tail.
        let mut out = [0u8; 3];
        let outcome = decode(b"Zh", &mut out, true);
        assert_eq!(outcome.status, OperationStatus::InvalidData);
        assert_eq!(outcome.written, 0);
    }

    #[test]
    fn test_decode_spans_multiple_windows() {
        let data: Vec<u8> = (0..1000).map(|i| (i * 7 + 13) as u8).collect();
        let text = encode_url_safe(&data);
        assert!(text.len() > DECODE_WINDOW * 2);
        assert_eq!(decode_url_safe(text.as_bytes()).unwrap(), data);
    }

    #[test]
    fn test_decode_url_safe_errors() {
        assert_eq!(
            decode_url_safe(b"Zm9vY"),
            Err(CodecError::InvalidLength { length: 5 })
        );
        assert_eq!(
            decode_url_safe(b"Zm9v*g"),
            Err(CodecError::InvalidData { offset: 4 })
        );
        assert_eq!(
            decode_url_safe(b"Zh"),
            Err(CodecError::InvalidData { offset: 1 })
        );
    }
}
