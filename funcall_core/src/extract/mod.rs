//! Round-tripping values through their JSON encoding
//!
//! [`to_bytes`] and [`from_bytes`] are independent halves; [`as_shape`]
//! composes them. A registry or parameter tree encodes through its schema
//! encoder, so `as_shape::<Vec<serde_json::Value>, _>(&funcs)` yields the
//! wire array as plain JSON without touching the concrete node types.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{DecodeError, EncodeError, ExtractError};

/// Serialize any value to JSON bytes.
pub fn to_bytes<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode JSON bytes into `T`, recording where decoding failed.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let fail = |err: serde_path_to_error::Error<serde_json::Error>| {
        let path = err.path().to_string();
        decode_error::<T>(path, String::from_utf8_lossy(bytes).into_owned(), err.into_inner())
    };

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(fail)?;
    de.end()
        .map_err(|err| decode_error::<T>(".".to_owned(), String::from_utf8_lossy(bytes).into_owned(), err))?;
    Ok(value)
}

/// Encode `value` and decode the result into a fresh `T`.
pub fn as_shape<T, V>(value: &V) -> Result<T, ExtractError>
where
    T: DeserializeOwned,
    V: Serialize + ?Sized,
{
    let bytes = to_bytes(value)?;
    Ok(from_bytes(&bytes)?)
}

/// Decode an already-parsed JSON value.
pub(crate) fn decode_value<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        decode_error::<T>(path, value.to_string(), err.into_inner())
    })
}

fn decode_error<T>(path: String, value: String, source: serde_json::Error) -> DecodeError {
    tracing::trace!(target_type = std::any::type_name::<T>(), %path, "decode failed");
    DecodeError {
        target: std::any::type_name::<T>(),
        path,
        value,
        source,
    }
}
