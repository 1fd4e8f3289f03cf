//! # tabkv Codec
//!
//! Key and record encodings for tabkv.
//!
//! - [`encode`] / [`decode`] build and split composite index keys made of
//!   escaped, separator-terminated fields
//! - [`append_terminal`] / [`decode_entry`] handle the unterminated primary
//!   key that closes every index entry
//! - [`OrderedKey`] gives numbers, booleans and strings a portable byte form
//!   that sorts like the value
//! - [`to_cbor`] / [`from_cbor`] serialize whole records with serde
//!
//! ## Usage
//!
//! ```
//! use tabkv_codec::{append_terminal, decode_entry, encode};
//!
//! let key = append_terminal(encode(&["book"]), b"42");
//! assert_eq!(key, b"book:42".to_vec());
//! assert_eq!(decode_entry(&key).unwrap(), vec![b"book".to_vec(), b"42".to_vec()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cbor;
mod encoder;
mod error;
mod key;
mod ordered;

pub use cbor::{from_cbor, from_cbor_into, to_cbor};
pub use encoder::KeyEncoder;
pub use error::{CodecError, CodecResult};
pub use key::{append_terminal, decode, decode_entry, encode, escape, ESCAPE, SEPARATOR};
pub use ordered::OrderedKey;
