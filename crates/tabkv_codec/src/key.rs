//! Escaped, separator-terminated composite keys.
//!
//! An index entry key is built from field values: each field is escaped and
//! closed by [`SEPARATOR`], and the primary key is appended last, escaped but
//! unterminated.
//!
//! ```text
//! fields ["book", "a:b"], pk "7"   =>   book:a`:b:7
//! ```

use crate::error::{CodecError, CodecResult};

/// Closes a field.
pub const SEPARATOR: u8 = b':';

/// Marks the following byte as literal.
pub const ESCAPE: u8 = b'`';

fn push_escaped(out: &mut Vec<u8>, raw: &[u8]) {
    for &b in raw {
        if b == SEPARATOR || b == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(b);
    }
}

/// Escapes one value without terminating it.
#[must_use]
pub fn escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    push_escaped(&mut out, raw);
    out
}

/// Encodes `fields` into a single key, each field escaped and terminated.
///
/// Equal inputs give equal outputs. The empty list encodes to the empty key.
#[must_use]
pub fn encode<F: AsRef<[u8]>>(fields: &[F]) -> Vec<u8> {
    let mut out = Vec::with_capacity(fields.iter().map(|f| f.as_ref().len() + 1).sum());
    for field in fields {
        push_escaped(&mut out, field.as_ref());
        out.push(SEPARATOR);
    }
    out
}

/// Appends `field` to `dst` escaped but without a separator.
///
/// This is how the primary key closes an index entry key.
#[must_use]
pub fn append_terminal(mut dst: Vec<u8>, field: &[u8]) -> Vec<u8> {
    push_escaped(&mut dst, field);
    dst
}

fn split(bytes: &[u8], close_last: bool) -> CodecResult<Vec<Vec<u8>>> {
    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut open = false;
    let mut iter = bytes.iter().enumerate();

    while let Some((offset, &b)) = iter.next() {
        match b {
            ESCAPE => match iter.next() {
                Some((_, &literal)) => {
                    current.push(literal);
                    open = true;
                }
                None => return Err(CodecError::DanglingEscape { offset }),
            },
            SEPARATOR => {
                fields.push(std::mem::take(&mut current));
                open = false;
            }
            _ => {
                current.push(b);
                open = true;
            }
        }
    }

    if open || close_last {
        fields.push(current);
    }
    Ok(fields)
}

/// Reverses [`encode`].
///
/// An unterminated trailing field is returned as the last element.
///
/// # Errors
///
/// Returns [`CodecError::DanglingEscape`] if the input ends with an escape
/// byte.
pub fn decode(bytes: &[u8]) -> CodecResult<Vec<Vec<u8>>> {
    split(bytes, false)
}

/// Splits an index entry key into its fields followed by the primary key.
///
/// Unlike [`decode`], end of input always closes the last segment, so an
/// empty primary key still shows up.
///
/// # Errors
///
/// Returns [`CodecError::DanglingEscape`] if the input ends with an escape
/// byte.
pub fn decode_entry(bytes: &[u8]) -> CodecResult<Vec<Vec<u8>>> {
    split(bytes, true)
}
