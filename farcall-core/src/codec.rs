//! Pluggable frame serialization.
//!
//! Transports choose how frames are laid out on the wire by implementing
//! [`MessageCodec`]. [`JsonCodec`] is the default and produces the canonical
//! JSON schema of the protocol; binary codecs (bincode, messagepack, ...)
//! drop in without touching the communicator.
//!
//! # Example
//!
//! ```rust
//! use farcall_core::{Invoke, InvokeReturn, JsonCodec, MessageCodec};
//! use serde_json::json;
//!
//! let codec = JsonCodec;
//! let frame = Invoke::Return(InvokeReturn { uid: 1, success: true, value: json!(5) });
//!
//! let bytes = codec.encode(&frame).expect("encode");
//! let decoded: Invoke = codec.decode(&bytes).expect("decode");
//! assert_eq!(frame, decoded);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode/decode failure in a [`MessageCodec`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Failed to encode a frame to bytes.
    #[error("encode error: {0}")]
    Encode(Box<dyn std::error::Error + Send + Sync>),
    /// Failed to decode bytes to a frame.
    #[error("decode error: {0}")]
    Decode(Box<dyn std::error::Error + Send + Sync>),
}

/// Pluggable serialization format for wire frames.
///
/// The trait requires `Clone + 'static` so codec instances can be stored by
/// queues and sockets. Frame types carry serde bounds, so any serde-backed
/// format can implement this directly.
pub trait MessageCodec: Clone + 'static {
    /// Encode a serializable frame to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, frame: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes to a frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if deserialization fails.
    fn decode<T: DeserializeOwned>(&self, buffer: &[u8]) -> Result<T, CodecError>;
}

/// JSON codec using serde_json; the canonical wire format.
///
/// Human-readable and interoperable with any JSON-speaking peer, at the cost
/// of some encoding efficiency.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn encode<T: Serialize>(&self, frame: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(frame).map_err(|e| CodecError::Encode(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(&self, buffer: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(buffer).map_err(|e| CodecError::Decode(Box::new(e)))
    }
}
