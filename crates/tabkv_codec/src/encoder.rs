//! Incremental index key builder.

use crate::key::{ESCAPE, SEPARATOR};
use crate::ordered::OrderedKey;

/// Builds an index entry key one field at a time.
///
/// Produces the same bytes as [`crate::encode`], so index callbacks can mix
/// raw and ordered fields without collecting them first.
///
/// ```
/// use tabkv_codec::{encode, KeyEncoder, OrderedKey};
///
/// let mut enc = KeyEncoder::new();
/// enc.field(b"book").ordered(&7u32);
/// assert_eq!(enc.into_bytes(), encode(&[b"book".to_vec(), 7u32.to_ordered_bytes()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyEncoder {
    buffer: Vec<u8>,
    scratch: Vec<u8>,
}

impl KeyEncoder {
    /// Create a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            scratch: Vec::new(),
        }
    }

    /// Appends a raw field.
    pub fn field(&mut self, raw: &[u8]) -> &mut Self {
        for &b in raw {
            if b == SEPARATOR || b == ESCAPE {
                self.buffer.push(ESCAPE);
            }
            self.buffer.push(b);
        }
        self.buffer.push(SEPARATOR);
        self
    }

    /// Appends a field using its order-preserving encoding.
    pub fn ordered<K: OrderedKey + ?Sized>(&mut self, value: &K) -> &mut Self {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        value.write_ordered(&mut scratch);
        self.field(&scratch);
        self.scratch = scratch;
        self
    }

    /// Number of encoded bytes so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no field was appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a reference to the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume this encoder and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
