//! JSON decoder: turns raw JSON into a [`Value`] tree.
//!
//! Every value position is resolved by **ordered probing**. The candidate
//! interpretations are tried in a fixed order and the first one that matches is
//! taken:
//!
//! 1. boolean
//! 2. 64-bit integer
//! 3. double
//! 4. string
//! 5. null
//!
//! then array and object. Probes only look at the input; the cursor moves once a
//! probe has been accepted, so a rejected interpretation leaves nothing behind.
//!
//! # Numbers
//!
//! A number becomes [`Value::Int`] when its literal has no `.`, `e` or `E` and
//! fits in an `i64`. Every other valid JSON number becomes [`Value::Double`]
//! (`1.0`, `1e2`, `9223372036854775808`). A literal that overflows a double
//! (`1e400`) is rejected.
//!
//! # Duplicate keys
//!
//! The last occurrence wins and is stored at the position of the first.
//!
//! # Example
//! ```
//! use payload_core::{decode, Value};
//! let value = decode(r#"{"screen_name":"cart","taps":3}"#).unwrap();
//! assert_eq!(value.get("taps"), Some(&Value::Int(3)));
//! ```

use crate::error::DecodeError;
use crate::key::{JsonKey, Path};
use crate::limits::Limits;
use crate::types::{Map, Value};

/// Decode a JSON document with the default [`Limits`].
pub fn decode(input: &str) -> Result<Value, DecodeError> {
    Reader::new(input.as_bytes(), Limits::default()).read_document()
}

/// Decode a UTF-8 JSON document with the default [`Limits`].
pub fn decode_slice(input: &[u8]) -> Result<Value, DecodeError> {
    decode_with(input, &Limits::default())
}

/// Decode a UTF-8 JSON document with explicit limits.
pub fn decode_with(input: &[u8], limits: &Limits) -> Result<Value, DecodeError> {
    if let Err(e) = std::str::from_utf8(input) {
        return Err(DecodeError::UnrecognizedShape {
            path: Path::root(),
            detail: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
        });
    }
    Reader::new(input, *limits).read_document()
}

/// Convert an already-parsed `serde_json` tree with the default [`Limits`].
pub fn from_json(value: &serde_json::Value) -> Result<Value, DecodeError> {
    from_json_with(value, &Limits::default())
}

/// Convert an already-parsed `serde_json` tree with explicit limits.
///
/// Numbers follow the same rule as text input as far as `serde_json` exposes
/// it: anything representable as `i64` becomes `Int`, everything else `Double`.
/// `serde_json` already reads `-0` as the float `-0.0`, so here it stays
/// `Double(-0.0)` where [`decode`] gives `Int(0)`.
pub fn from_json_with(value: &serde_json::Value, limits: &Limits) -> Result<Value, DecodeError> {
    let mut path = Path::root();
    convert_json(value, limits, 0, &mut path)
}

fn convert_json(
    value: &serde_json::Value,
    limits: &Limits,
    depth: usize,
    path: &mut Path,
) -> Result<Value, DecodeError> {
    use serde_json::Value as Json;

    match value {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::Int(i));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Value::Double(f)),
                _ => Err(DecodeError::UnrecognizedShape {
                    path: path.clone(),
                    detail: format!("number {n} is out of range"),
                }),
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Null => Ok(Value::Null),
        Json::Array(items) => {
            check_depth(limits, depth, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                out.push(convert_json(item, limits, depth + 1, path)?);
                path.pop();
            }
            Ok(Value::Array(out))
        }
        Json::Object(members) => {
            check_depth(limits, depth, path)?;
            let mut map = Map::with_capacity(members.len());
            for (key, item) in members {
                path.push_key(&JsonKey::new(key.as_str()));
                let decoded = convert_json(item, limits, depth + 1, path)?;
                path.pop();
                map.insert(key.as_str(), decoded);
            }
            Ok(Value::Object(map))
        }
    }
}

fn check_depth(limits: &Limits, depth: usize, path: &Path) -> Result<(), DecodeError> {
    if limits.allows(depth) {
        Ok(())
    } else {
        Err(DecodeError::DepthExceeded {
            path: path.clone(),
            max_depth: limits.max_depth,
        })
    }
}

/// Recursive-descent reader over validated UTF-8 input.
///
/// `path` always names the slot currently being read, so errors can be reported
/// without unwinding bookkeeping.
struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    limits: Limits,
    path: Path,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8], limits: Limits) -> Self {
        Reader {
            input,
            pos: 0,
            limits,
            path: Path::root(),
        }
    }

    /// A whole document: one value surrounded by optional whitespace.
    fn read_document(mut self) -> Result<Value, DecodeError> {
        self.skip_ws();
        let value = self.read_value(0)?;
        self.skip_ws();
        if self.pos < self.input.len() {
            return Err(self.unrecognized(format!(
                "trailing characters at byte {}",
                self.pos
            )));
        }
        Ok(value)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let scalar = self
            .probe_bool()
            .or_else(|| self.probe_int())
            .or_else(|| self.probe_double())
            .or_else(|| self.probe_string())
            .or_else(|| self.probe_null());
        if let Some((value, end)) = scalar {
            self.pos = end;
            return Ok(value);
        }

        match self.peek() {
            Some(b'[') => self.read_array(depth),
            Some(b'{') => self.read_object(depth),
            _ => Err(self.unrecognized(self.describe_here())),
        }
    }

    fn read_array(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.enter(depth)?;
        self.pos += 1;
        self.skip_ws();

        let mut items = Vec::new();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }

        loop {
            self.path.push_index(items.len());
            self.skip_ws();
            let item = self.read_value(depth + 1)?;
            self.path.pop();
            items.push(item);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                _ => {
                    self.path.push_index(items.len());
                    return Err(self.unrecognized(format!(
                        "expected ',' or ']' but found {}",
                        self.describe_byte()
                    )));
                }
            }
        }
    }

    fn read_object(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.enter(depth)?;
        self.pos += 1;
        self.skip_ws();

        let mut map = Map::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_ws();
            let key = match self.scan_string(self.pos) {
                Some((key, end)) => {
                    self.pos = end;
                    key
                }
                None => {
                    return Err(self.unrecognized(format!(
                        "expected object key but found {}",
                        self.describe_byte()
                    )))
                }
            };

            self.skip_ws();
            if self.peek() != Some(b':') {
                return Err(self.unrecognized(format!(
                    "expected ':' after key {key:?} but found {}",
                    self.describe_byte()
                )));
            }
            self.pos += 1;
            self.skip_ws();

            self.path.push_key(&JsonKey::new(key.as_str()));
            let value = self.read_value(depth + 1)?;
            self.path.pop();
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                _ => {
                    return Err(self.unrecognized(format!(
                        "expected ',' or '}}' but found {}",
                        self.describe_byte()
                    )))
                }
            }
        }
    }

    fn enter(&self, depth: usize) -> Result<(), DecodeError> {
        check_depth(&self.limits, depth, &self.path)
    }

    // ------------------------------------------------------------------------
    // Probes. Each returns the decoded scalar and the offset just past it.
    // ------------------------------------------------------------------------

    fn probe_bool(&self) -> Option<(Value, usize)> {
        if let Some(end) = self.literal(b"true") {
            return Some((Value::Bool(true), end));
        }
        self.literal(b"false").map(|end| (Value::Bool(false), end))
    }

    fn probe_int(&self) -> Option<(Value, usize)> {
        let number = self.scan_number()?;
        if !number.integral {
            return None;
        }
        let text = self.text(self.pos, number.end)?;
        let value: i64 = text.parse().ok()?;
        Some((Value::Int(value), number.end))
    }

    fn probe_double(&self) -> Option<(Value, usize)> {
        let number = self.scan_number()?;
        let text = self.text(self.pos, number.end)?;
        let value: f64 = text.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some((Value::Double(value), number.end))
    }

    fn probe_string(&self) -> Option<(Value, usize)> {
        self.scan_string(self.pos)
            .map(|(s, end)| (Value::String(s), end))
    }

    fn probe_null(&self) -> Option<(Value, usize)> {
        self.literal(b"null").map(|end| (Value::Null, end))
    }

    /// Match a keyword at the cursor. It must be followed by a delimiter so that
    /// `trueish` is not read as `true`.
    fn literal(&self, word: &[u8]) -> Option<usize> {
        let end = self.pos + word.len();
        if self.input.get(self.pos..end)? != word {
            return None;
        }
        self.delimited(end).then_some(end)
    }

    /// Scan a number per RFC 8259:
    /// `-? (0 | [1-9][0-9]*) (\. [0-9]+)? ([eE] [+-]? [0-9]+)?`
    fn scan_number(&self) -> Option<NumberToken> {
        let bytes = self.input;
        let mut i = self.pos;
        let mut integral = true;

        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        match bytes.get(i)? {
            b'0' => i += 1,
            b'1'..=b'9' => i = skip_digits(bytes, i),
            _ => return None,
        }
        if bytes.get(i) == Some(&b'.') {
            integral = false;
            let start = i + 1;
            i = skip_digits(bytes, start);
            if i == start {
                return None;
            }
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            integral = false;
            i += 1;
            if matches!(bytes.get(i), Some(b'+' | b'-')) {
                i += 1;
            }
            let start = i;
            i = skip_digits(bytes, start);
            if i == start {
                return None;
            }
        }

        self.delimited(i).then_some(NumberToken { end: i, integral })
    }

    /// Scan a quoted string starting at `start`, unescaping as it goes.
    fn scan_string(&self, start: usize) -> Option<(String, usize)> {
        let bytes = self.input;
        if bytes.get(start) != Some(&b'"') {
            return None;
        }
        let mut out: Vec<u8> = Vec::new();
        let mut i = start + 1;

        loop {
            let run_start = i;
            while let Some(&b) = bytes.get(i) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                i += 1;
            }
            out.extend_from_slice(&bytes[run_start..i]);

            match bytes.get(i)? {
                b'"' => {
                    let s = String::from_utf8(out).ok()?;
                    return Some((s, i + 1));
                }
                b'\\' => {
                    let (ch, next) = unescape(bytes, i + 1)?;
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    i = next;
                }
                // Raw control character.
                _ => return None,
            }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Whether a scalar ending at `end` is properly terminated.
    fn delimited(&self, end: usize) -> bool {
        match self.input.get(end) {
            None => true,
            Some(b) => matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b':'),
        }
    }

    fn text(&self, start: usize, end: usize) -> Option<&str> {
        std::str::from_utf8(self.input.get(start..end)?).ok()
    }

    fn unrecognized(&self, detail: String) -> DecodeError {
        DecodeError::UnrecognizedShape {
            path: self.path.clone(),
            detail,
        }
    }

    fn describe_byte(&self) -> String {
        match self.char_here() {
            None => "end of input".to_string(),
            Some(c) => format!("{c:?}"),
        }
    }

    /// Explain why nothing matched at the cursor.
    fn describe_here(&self) -> String {
        match self.peek() {
            None => "unexpected end of input".to_string(),
            Some(b'"') => "malformed or unterminated string".to_string(),
            Some(b'-' | b'0'..=b'9') if self.scan_number().is_some() => {
                "number is out of double range".to_string()
            }
            Some(b'-' | b'0'..=b'9') => "malformed number".to_string(),
            Some(b't' | b'f' | b'n') => "malformed literal".to_string(),
            Some(_) => format!("unexpected {}", self.describe_byte()),
        }
    }

    fn char_here(&self) -> Option<char> {
        let rest = self.input.get(self.pos..)?;
        let len = rest.len().min(4);
        (1..=len)
            .find_map(|n| std::str::from_utf8(&rest[..n]).ok())
            .and_then(|s| s.chars().next())
    }
}

struct NumberToken {
    end: usize,
    integral: bool,
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b'0'..=b'9')) {
        i += 1;
    }
    i
}

/// Decode one escape sequence whose body starts at `i` (just past the backslash).
fn unescape(bytes: &[u8], i: usize) -> Option<(char, usize)> {
    let simple = match bytes.get(i)? {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{0008}',
        b'f' => '\u{000C}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return unescape_unicode(bytes, i + 1),
        _ => return None,
    };
    Some((simple, i + 1))
}

/// `\uXXXX`, including UTF-16 surrogate pairs. Lone surrogates are rejected.
fn unescape_unicode(bytes: &[u8], i: usize) -> Option<(char, usize)> {
    let high = hex4(bytes, i)?;
    let after = i + 4;
    match high {
        0xD800..=0xDBFF => {
            if bytes.get(after..after + 2)? != b"\\u" {
                return None;
            }
            let low = hex4(bytes, after + 2)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return None;
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            Some((char::from_u32(code)?, after + 6))
        }
        0xDC00..=0xDFFF => None,
        _ => Some((char::from_u32(high)?, after)),
    }
}

fn hex4(bytes: &[u8], i: usize) -> Option<u32> {
    let digits = std::str::from_utf8(bytes.get(i..i + 4)?).ok()?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
