//! Object keys and structural paths.
//!
//! Some serialization frameworks address array slots and object members through a
//! single "coding key" concept that can be built from either a string or an integer.
//! Objects in this crate are string-keyed only, so [`JsonKey`] accepts every string
//! and refuses every integer. Array positions are tracked separately as
//! [`PathSegment::Index`] so error paths can still point into arrays.

use std::fmt;

/// A key used to address a member of a keyed construct.
pub trait CodingKey: Sized {
    /// Build a key from its string form.
    fn from_string_value(s: &str) -> Option<Self>;

    /// Build a key from a positional index.
    fn from_int_value(index: usize) -> Option<Self>;

    /// The string form of the key.
    fn string_value(&self) -> &str;

    /// The positional form of the key, if it has one.
    fn int_value(&self) -> Option<usize>;
}

/// A string object key. Any string is valid, including the empty string and
/// strings that are not identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonKey(String);

impl JsonKey {
    pub fn new(key: impl Into<String>) -> Self {
        JsonKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl CodingKey for JsonKey {
    fn from_string_value(s: &str) -> Option<Self> {
        Some(JsonKey(s.to_string()))
    }

    /// Objects are never addressed positionally.
    fn from_int_value(_index: usize) -> Option<Self> {
        None
    }

    fn string_value(&self) -> &str {
        &self.0
    }

    fn int_value(&self) -> Option<usize> {
        None
    }
}

impl From<&str> for JsonKey {
    fn from(s: &str) -> Self {
        JsonKey::new(s)
    }
}

impl From<String> for JsonKey {
    fn from(s: String) -> Self {
        JsonKey(s)
    }
}

/// One step of a [`Path`]: an object member or an array slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(JsonKey),
    Index(usize),
}

/// The chain of object keys and array indices leading to a node in a value tree.
///
/// Displayed JSONPath-style: `$`, `$.button_id`, `$.items[3]`, `$["two words"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The root path (`$`).
    pub fn root() -> Self {
        Path::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Path { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_key<K: CodingKey>(&mut self, key: &K) {
        self.segments
            .push(PathSegment::Key(JsonKey::new(key.string_value())));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// A copy of this path extended by one key.
    pub fn child_key<K: CodingKey>(&self, key: &K) -> Path {
        let mut path = self.clone();
        path.push_key(key);
        path
    }

    /// A copy of this path extended by one index.
    pub fn child_index(&self, index: usize) -> Path {
        let mut path = self.clone();
        path.push_index(index);
        path
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) if is_plain_key(key.as_str()) => {
                    write!(f, ".{}", key.as_str())?
                }
                PathSegment::Key(key) => write!(f, "[{:?}]", key.as_str())?,
            }
        }
        Ok(())
    }
}

/// Keys matching `^[A-Za-z_][A-Za-z0-9_]*$` print with dot notation.
fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
