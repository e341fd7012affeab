//! JSON encoder: writes a [`Value`] tree as compact JSON text.
//!
//! One case per variant:
//!
//! - `Null` → `null`, `Bool` → `true`/`false`, `Int` → decimal digits
//! - `Double` → shortest representation that reads back as the same double,
//!   always carrying a `.` or an exponent so it never reads back as `Int`
//! - `String` → quoted, with RFC 8259 escaping; non-ASCII is written as-is
//! - `Array` / `Object` → elements and members in stored order
//!
//! Output is accumulated in a private buffer and only returned when the whole
//! tree was written, so a failure never leaves partial JSON behind.
//!
//! # Example
//! ```
//! use payload_core::{encode, Map, Value};
//! let mut map = Map::new();
//! map.insert("button_id", Value::from("checkout"));
//! map.insert("price", Value::from(7.0));
//! assert_eq!(encode(&Value::Object(map)).unwrap(), r#"{"button_id":"checkout","price":7.0}"#);
//! ```

use serde::Serialize;

use crate::error::EncodeError;
use crate::key::{JsonKey, Path};
use crate::limits::Limits;
use crate::ser;
use crate::types::{Map, Value};

/// Encode a value with the default [`Limits`].
pub fn encode(value: &Value) -> Result<String, EncodeError> {
    encode_with(value, &Limits::default())
}

/// Encode a value with explicit limits.
pub fn encode_with(value: &Value, limits: &Limits) -> Result<String, EncodeError> {
    let mut writer = Writer {
        out: String::new(),
        limits: *limits,
        path: Path::root(),
    };
    writer.write_value(value, 0)?;
    Ok(writer.out)
}

/// Encode a value to UTF-8 bytes with the default [`Limits`].
pub fn encode_to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    encode(value).map(String::into_bytes)
}

/// Project any `Serialize` value onto [`Value`] and encode it.
///
/// Fails with [`EncodeError::UnsupportedValue`] when the value contains
/// something JSON cannot carry (bytes, non-finite floats, integers outside
/// `i64`, non-string map keys).
pub fn encode_serializable<T>(value: &T) -> Result<String, EncodeError>
where
    T: Serialize + ?Sized,
{
    let value = ser::to_value(value)?;
    encode(&value)
}

/// Project a value into a `serde_json` tree, e.g. for pretty-printing.
pub fn to_json(value: &Value) -> Result<serde_json::Value, EncodeError> {
    to_json_with(value, &Limits::default())
}

/// [`to_json`] with explicit limits.
pub fn to_json_with(value: &Value, limits: &Limits) -> Result<serde_json::Value, EncodeError> {
    let mut path = Path::root();
    project_json(value, limits, 0, &mut path)
}

fn project_json(
    value: &Value,
    limits: &Limits,
    depth: usize,
    path: &mut Path,
) -> Result<serde_json::Value, EncodeError> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Double(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => Json::Number(n),
            None => return Err(non_finite(path)),
        },
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => {
            check_depth(limits, depth, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                out.push(project_json(item, limits, depth + 1, path)?);
                path.pop();
            }
            Json::Array(out)
        }
        Value::Object(map) => {
            check_depth(limits, depth, path)?;
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map.iter() {
                path.push_key(&JsonKey::new(key));
                out.insert(key.to_string(), project_json(item, limits, depth + 1, path)?);
                path.pop();
            }
            Json::Object(out)
        }
    })
}

fn check_depth(limits: &Limits, depth: usize, path: &Path) -> Result<(), EncodeError> {
    if limits.allows(depth) {
        Ok(())
    } else {
        Err(EncodeError::DepthExceeded {
            path: path.clone(),
            max_depth: limits.max_depth,
        })
    }
}

fn non_finite(path: &Path) -> EncodeError {
    EncodeError::UnsupportedValue {
        path: path.clone(),
        kind: "non-finite double".to_string(),
    }
}

struct Writer {
    out: String,
    limits: Limits,
    path: Path,
}

impl Writer {
    fn write_value(&mut self, value: &Value, depth: usize) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => self.out.push_str(&i.to_string()),
            Value::Double(f) => {
                let text = format_double(*f).ok_or_else(|| non_finite(&self.path))?;
                self.out.push_str(&text);
            }
            Value::String(s) => write_string(s, &mut self.out),
            Value::Array(items) => self.write_array(items, depth)?,
            Value::Object(map) => self.write_object(map, depth)?,
        }
        Ok(())
    }

    fn write_array(&mut self, items: &[Value], depth: usize) -> Result<(), EncodeError> {
        check_depth(&self.limits, depth, &self.path)?;
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.path.push_index(i);
            self.write_value(item, depth + 1)?;
            self.path.pop();
        }
        self.out.push(']');
        Ok(())
    }

    fn write_object(&mut self, map: &Map, depth: usize) -> Result<(), EncodeError> {
        check_depth(&self.limits, depth, &self.path)?;
        self.out.push('{');
        for (i, (key, item)) in map.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            write_string(key, &mut self.out);
            self.out.push(':');
            self.path.push_key(&JsonKey::new(key));
            self.write_value(item, depth + 1)?;
            self.path.pop();
        }
        self.out.push('}');
        Ok(())
    }
}

/// Shortest round-trip text for a finite double, forced to look like a float:
/// `7.0`, `0.1`, `-0.0`, `1e300`. `None` for NaN and infinities.
fn format_double(f: f64) -> Option<String> {
    if !f.is_finite() {
        return None;
    }
    let mut text = format!("{f:?}");
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    Some(text)
}

/// Quote and escape a string per RFC 8259.
fn write_string(s: &str, out: &mut String) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
