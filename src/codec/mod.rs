//! URL-safe Base64 alphabet codec.
//!
//! - [`make_url_safe`] / [`revert_url_safe`] - in-place alphabet substitution
//!   over byte or UTF-16 symbol buffers
//! - [`encode`] / [`decode`] - block-streaming transcoding with an
//!   `is_final` flag and [`OperationStatus`] outcomes
//! - [`encode_url_safe`] / [`decode_url_safe`] - one-shot helpers
//!
//! | Position | Standard | URL-safe |
//! |---|---|---|
//! | 62 | `+` | `-` |
//! | 63 | `/` | `_` |
//! | padding | `=` | omitted |

mod alphabet;
mod stream;
mod url_safe;

pub use alphabet::Symbol;
pub use stream::{
    CodecOutcome, OperationStatus, decode, decode_url_safe, encode, encode_url_safe,
    url_safe_decoded_len, url_safe_encoded_len,
};
pub use url_safe::{make_url_safe, required_padding, revert_url_safe};

pub(crate) use alphabet::PAD;
pub(crate) use url_safe::revert_symbols;
