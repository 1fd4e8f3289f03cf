//! Record serialization capabilities.

use crate::error::CoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Turns records into the bytes stored in the data bucket and back.
///
/// Implementors must be deterministic: marshalling equal records must give
/// equal bytes.
pub trait RecordCodec<T>: Send + Sync {
    /// Serializes a record.
    fn marshal(&self, record: &T) -> CoreResult<Vec<u8>>;

    /// Deserializes a record.
    fn unmarshal(&self, bytes: &[u8]) -> CoreResult<T>;

    /// Deserializes into an existing record.
    fn unmarshal_into(&self, bytes: &[u8], dst: &mut T) -> CoreResult<()> {
        *dst = self.unmarshal(bytes)?;
        Ok(())
    }
}

/// Marshal callback.
pub type MarshalFn<T> = Box<dyn Fn(&T) -> CoreResult<Vec<u8>> + Send + Sync>;

/// Unmarshal callback.
pub type UnmarshalFn<T> = Box<dyn Fn(&[u8]) -> CoreResult<T> + Send + Sync>;

/// A [`RecordCodec`] made of two closures.
pub struct FnCodec<T> {
    marshal: MarshalFn<T>,
    unmarshal: UnmarshalFn<T>,
}

impl<T> FnCodec<T> {
    /// Creates a codec from a marshal and an unmarshal function.
    pub fn new<M, U>(marshal: M, unmarshal: U) -> Self
    where
        M: Fn(&T) -> CoreResult<Vec<u8>> + Send + Sync + 'static,
        U: Fn(&[u8]) -> CoreResult<T> + Send + Sync + 'static,
    {
        Self::from_boxed(Box::new(marshal), Box::new(unmarshal))
    }

    pub(crate) fn from_boxed(marshal: MarshalFn<T>, unmarshal: UnmarshalFn<T>) -> Self {
        Self { marshal, unmarshal }
    }
}

impl<T> fmt::Debug for FnCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<T> RecordCodec<T> for FnCodec<T> {
    fn marshal(&self, record: &T) -> CoreResult<Vec<u8>> {
        (self.marshal)(record)
    }

    fn unmarshal(&self, bytes: &[u8]) -> CoreResult<T> {
        (self.unmarshal)(bytes)
    }
}

/// Stores records as CBOR through serde.
pub struct CborCodec<T>(PhantomData<fn() -> T>);

impl<T> CborCodec<T> {
    /// Creates the codec.
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CborCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CborCodec")
    }
}

impl<T> RecordCodec<T> for CborCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, record: &T) -> CoreResult<Vec<u8>> {
        Ok(tabkv_codec::to_cbor(record)?)
    }

    fn unmarshal(&self, bytes: &[u8]) -> CoreResult<T> {
        Ok(tabkv_codec::from_cbor(bytes)?)
    }

    fn unmarshal_into(&self, bytes: &[u8], dst: &mut T) -> CoreResult<()> {
        Ok(tabkv_codec::from_cbor_into(bytes, dst)?)
    }
}
