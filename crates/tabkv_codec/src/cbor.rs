//! CBOR record serialization.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes `value` to CBOR.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if serde rejects the value.
pub fn to_cbor<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(out)
}

/// Deserializes a value from CBOR.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] on malformed input or a shape
/// mismatch.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Deserializes into an existing value, leaving it untouched on error.
///
/// # Errors
///
/// See [`from_cbor`].
pub fn from_cbor_into<T: DeserializeOwned>(bytes: &[u8], dst: &mut T) -> CodecResult<()> {
    *dst = from_cbor(bytes)?;
    Ok(())
}
