//! # Inter-Process Communication (IPC)
//!
//! This crate converts between byte streams and Message objects.
//!
//! ## Philosophy
//!
//! - **Backend-agnostic callers**: A backend is chosen once, at construction
//! - **Empty is not malformed**: Valid input with nothing in it yields no message
//! - **Streaming-friendly**: A call consumes one value and reports how many bytes it used
//!
//! ## Architecture
//!
//! [`Deserializer`] and [`Serializer`] are the two capabilities a backend
//! provides. [`Backend::deserializer`] and [`Backend::serializer`] hand back
//! boxed trait objects, so the rest of the system never names a concrete
//! backend. JSON is the one backend provided.

pub mod codec;
pub mod config;
pub mod error;
pub mod json;

pub use codec::{decode_all, Backend, Batch, CodecStats, Decoded, Deserializer, Serializer};
pub use config::{CodecConfig, DEFAULT_MAX_INPUT_BYTES};
pub use error::CodecError;
pub use json::{JsonDeserializer, JsonSerializer};
