//! Byte codecs for keys and values.
//!
//! The [`Serializer`] trait decouples caches and the session store from a
//! concrete wire format. Two codecs ship with the crate:
//! - [`StringSerializer`]: UTF-8 strings, used for store keys
//! - [`JsonSerializer`]: any serde type, the default for values and sessions
//!
//! Decoding an absent payload always yields `Ok(None)`, never an error.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while encoding or decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The value could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The payload could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The payload was not valid UTF-8.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encodes values of `T` to bytes and back.
pub trait Serializer<T>: Send + Sync {
    /// Encode a value.
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError>;

    /// Decode a payload. `None` in, `None` out.
    fn deserialize(&self, bytes: Option<&[u8]>) -> Result<Option<T>, SerializationError>;
}

/// UTF-8 string codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String) -> Result<Vec<u8>, SerializationError> {
        Ok(value.as_bytes().to_vec())
    }

    fn deserialize(&self, bytes: Option<&[u8]>) -> Result<Option<String>, SerializationError> {
        match bytes {
            None => Ok(None),
            Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
        }
    }
}

/// JSON codec for any serde type.
///
/// An empty payload decodes to `None`: that is what the store holds after a
/// cache `put` with an absent value.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    /// Create a codec for `T`.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSerializer")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(value).map_err(|e| SerializationError::Encode(e.to_string()))
    }

    fn deserialize(&self, bytes: Option<&[u8]>) -> Result<Option<T>, SerializationError> {
        match bytes {
            None => Ok(None),
            Some([]) => Ok(None),
            Some(bytes) => serde_json::from_slice(bytes)
                .map(Some)
                .map_err(|e| SerializationError::Decode(e.to_string())),
        }
    }
}
