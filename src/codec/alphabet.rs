//! Alphabet tables and the symbol abstraction shared by the codec.
//!
//! The standard and URL-safe alphabets agree on positions 0-61 and differ
//! only at 62 (`+` / `-`) and 63 (`/` / `_`).

/// Standard Base64 alphabet (RFC 4648 §4).
pub(crate) const STANDARD: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// URL- and filename-safe alphabet (RFC 4648 §5).
pub(crate) const URL_SAFE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Padding symbol of the standard form.
pub(crate) const PAD: u8 = b'=';

const INVALID: u8 = 0xFF;

/// Maps an ASCII symbol to its sextet value in the URL-safe alphabet.
pub(crate) const URL_SAFE_DECODE: [u8; 128] = decode_table(URL_SAFE);

const fn decode_table(alphabet: &[u8; 64]) -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < 64 {
        table[alphabet[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Sextet value of a URL-safe symbol, or `None` if it is not in the alphabet.
#[inline]
pub(crate) fn url_safe_sextet(symbol: u8) -> Option<u8> {
    match URL_SAFE_DECODE.get(symbol as usize) {
        Some(&v) if v != INVALID => Some(v),
        _ => None,
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// A Base64 symbol representation: one byte (UTF-8/ASCII) or one UTF-16
/// code unit.
///
/// Sealed; implemented for `u8` and `u16` only.
pub trait Symbol: Copy + Eq + sealed::Sealed {
    /// Widens an ASCII byte into this representation.
    fn from_ascii(byte: u8) -> Self;

    /// Narrows to ASCII, or `None` if the value is outside `0..0x80`.
    fn to_ascii(self) -> Option<u8>;
}

impl Symbol for u8 {
    #[inline]
    fn from_ascii(byte: u8) -> Self {
        byte
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        self.is_ascii().then_some(self)
    }
}

impl Symbol for u16 {
    #[inline]
    fn from_ascii(byte: u8) -> Self {
        u16::from(byte)
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        u8::try_from(self).ok().filter(u8::is_ascii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabets_differ_only_at_62_and_63() {
        for i in 0..62 {
            assert_eq!(STANDARD[i], URL_SAFE[i]);
        }
        assert_eq!((STANDARD[62], URL_SAFE[62]), (b'+', b'-'));
        assert_eq!((STANDARD[63], URL_SAFE[63]), (b'/', b'_'));
    }

    #[test]
    fn test_decode_table() {
        assert_eq!(url_safe_sextet(b'A'), Some(0));
        assert_eq!(url_safe_sextet(b'-'), Some(62));
        assert_eq!(url_safe_sextet(b'_'), Some(63));
        assert_eq!(url_safe_sextet(b'+'), None);
        assert_eq!(url_safe_sextet(b'='), None);
        assert_eq!(url_safe_sextet(0xC3), None);
    }

    #[test]
    fn test_wide_symbols() {
        assert_eq!(<u16 as Symbol>::from_ascii(b'+'), 0x2B);
        assert_eq!(0x2Bu16.to_ascii(), Some(b'+'));
        assert_eq!(0x012Bu16.to_ascii(), None);
        assert_eq!(0x00E9u16.to_ascii(), None);
    }
}
