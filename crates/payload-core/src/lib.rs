//! # payload-core
//!
//! Dynamic JSON value codec for self-describing analytics events.
//!
//! Event payloads are open-ended mappings of field names to booleans, integers,
//! doubles, strings, nulls, arrays and nested objects. This crate keeps them in a
//! closed [`Value`] tree and converts between that tree and JSON text without a
//! schema, so that encode → decode → encode is lossless: integers stay integers,
//! booleans stay booleans, and object members keep their order.
//!
//! ## Quick start
//!
//! ```rust
//! use payload_core::{decode, encode, Value};
//!
//! let json = r#"{"button_id":"checkout","button_text":"Buy Now","screen_name":"cart"}"#;
//! let value = decode(json).unwrap();
//! assert_eq!(value.get("screen_name"), Some(&Value::from("cart")));
//!
//! // Value → JSON (member order preserved)
//! assert_eq!(encode(&value).unwrap(), json);
//! ```
//!
//! ## Modules
//!
//! - [`types`] — `Value` and the ordered `Map`
//! - [`decoder`] — JSON text / `serde_json::Value` → `Value`
//! - [`encoder`] — `Value` → JSON text
//! - [`ser`] — any `Serialize` type → `Value`
//! - [`key`] — object keys and structural paths used in errors
//! - [`limits`] — nesting limits
//! - [`envelope`] — `{"schema", "data"}` self-describing JSON
//! - [`events`] — typed event and entity builders
//! - [`tracker`] — tracker with pluggable emitters
//! - [`error`] — error types

pub mod decoder;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod events;
pub mod key;
pub mod limits;
pub mod ser;
pub mod tracker;
pub mod types;

pub use decoder::{decode, decode_slice, decode_with, from_json, from_json_with};
pub use encoder::{
    encode, encode_serializable, encode_to_vec, encode_with, to_json, to_json_with,
};
pub use envelope::{SchemaUri, SelfDescribingEvent, SelfDescribingJson};
pub use error::{DecodeError, EncodeError, Error, Result};
pub use key::{CodingKey, JsonKey, Path, PathSegment};
pub use limits::{Limits, DEFAULT_MAX_DEPTH};
pub use ser::{to_value, to_value_with};
pub use types::{Map, Value};
