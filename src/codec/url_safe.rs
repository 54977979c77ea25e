//! In-place conversion between the standard and URL-safe forms.
//!
//! Both directions are O(n), allocation-free, and work on byte or UTF-16
//! symbol buffers through [`Symbol`].

use super::alphabet::{PAD, STANDARD, Symbol, url_safe_sextet};
use crate::error::CodecError;

/// Rewrites standard Base64 symbols in place into the URL-safe alphabet.
///
/// `+` becomes `-` and `/` becomes `_`. Scanning stops at the first padding
/// symbol, since the URL-safe form carries none. Returns the logical length
/// of the converted text, i.e. the index of the first `=` or `buf.len()`.
///
/// Symbols after the returned length are left untouched.
///
/// # Example
///
/// ```
/// let mut text = *b"+/8=";
/// let len = b64pump::make_url_safe(&mut text[..]);
/// assert_eq!(&text[..len], b"-_8");
/// ```
pub fn make_url_safe<S: Symbol>(buf: &mut [S]) -> usize {
    for (i, symbol) in buf.iter_mut().enumerate() {
        match symbol.to_ascii() {
            Some(b'+') => *symbol = S::from_ascii(b'-'),
            Some(b'/') => *symbol = S::from_ascii(b'_'),
            Some(PAD) => return i,
            _ => {}
        }
    }
    buf.len()
}

/// Rewrites URL-safe symbols in place back into the standard alphabet.
///
/// Returns `(length, required_padding)` where
/// `required_padding = (4 - length % 4) % 4` is the number of `=` symbols the
/// caller must append to obtain canonical standard Base64.
///
/// # Errors
///
/// - [`CodecError::InvalidLength`] if `length % 4 == 1`; the buffer is left
///   untouched.
/// - [`CodecError::InvalidData`] on the first symbol outside the URL-safe
///   alphabet; symbols before it have already been rewritten.
///
/// # Example
///
/// ```
/// let mut text = *b"-_8";
/// let (len, padding) = b64pump::revert_url_safe(&mut text[..])?;
/// assert_eq!((&text[..len], padding), (&b"+/8"[..], 1));
/// # Ok::<(), b64pump::CodecError>(())
/// ```
pub fn revert_url_safe<S: Symbol>(buf: &mut [S]) -> Result<(usize, usize), CodecError> {
    let length = buf.len();
    let padding = required_padding(length)?;
    revert_symbols(buf, 0)?;
    Ok((length, padding))
}

/// Number of `=` symbols a URL-safe text of `length` symbols needs.
///
/// # Errors
///
/// [`CodecError::InvalidLength`] when `length % 4 == 1`.
pub fn required_padding(length: usize) -> Result<usize, CodecError> {
    match length % 4 {
        1 => Err(CodecError::InvalidLength { length }),
        rem => Ok((4 - rem) % 4),
    }
}

/// Substitutes every URL-safe symbol with its standard counterpart.
///
/// `base` is added to the offset reported on error so callers working on a
/// window of a larger stream get absolute positions.
pub(crate) fn revert_symbols<S: Symbol>(buf: &mut [S], base: usize) -> Result<(), CodecError> {
    for (i, symbol) in buf.iter_mut().enumerate() {
        let sextet = symbol
            .to_ascii()
            .and_then(url_safe_sextet)
            .ok_or(CodecError::InvalidData { offset: base + i })?;
        *symbol = S::from_ascii(STANDARD[sextet as usize]);
    }
    Ok(())
}
