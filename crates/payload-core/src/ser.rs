//! Projection of arbitrary caller values onto [`Value`] through `serde`.
//!
//! Typed event builders derive `Serialize` and are turned into payload trees
//! here. Anything outside the closed `Value` set is refused with
//! [`EncodeError::UnsupportedValue`] naming the offending kind and its path;
//! nothing is stringified or widened behind the caller's back.
//!
//! | Rust                                  | Value                       |
//! |---------------------------------------|-----------------------------|
//! | `bool`                                | `Bool`                      |
//! | `i8`..`i64`, `u8`..`u32`              | `Int`                       |
//! | `u64`, `i128`, `u128` within `i64`    | `Int` (otherwise refused)   |
//! | finite `f32`/`f64`                    | `Double` (otherwise refused)|
//! | `char`, `str`                         | `String`                    |
//! | `None`, `()`, unit struct             | `Null`                      |
//! | seq, tuple, tuple struct              | `Array`                     |
//! | map with string keys, struct          | `Object`                    |
//! | unit variant                          | `String(variant)`           |
//! | newtype/tuple/struct variant          | `{variant: payload}`        |
//! | `&[u8]` via `serialize_bytes`         | refused                     |

use std::fmt::Display;

use serde::ser::{self, Impossible, Serialize};

use crate::error::EncodeError;
use crate::key::{JsonKey, Path};
use crate::limits::Limits;
use crate::types::{Map, Value};

/// Convert a `Serialize` value into a [`Value`] with the default [`Limits`].
pub fn to_value<T>(value: &T) -> Result<Value, EncodeError>
where
    T: Serialize + ?Sized,
{
    to_value_with(value, &Limits::default())
}

/// Convert a `Serialize` value into a [`Value`] with explicit limits.
pub fn to_value_with<T>(value: &T, limits: &Limits) -> Result<Value, EncodeError>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueSerializer {
        path: Path::root(),
        depth: 0,
        limits: *limits,
    })
}

impl ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Serialize {
            path: Path::root(),
            message: msg.to_string(),
        }
    }
}

/// Serializer for one value position.
struct ValueSerializer {
    path: Path,
    depth: usize,
    limits: Limits,
}

impl ValueSerializer {
    fn unsupported(&self, kind: impl Into<String>) -> EncodeError {
        EncodeError::UnsupportedValue {
            path: self.path.clone(),
            kind: kind.into(),
        }
    }

    fn enter(&self) -> Result<(), EncodeError> {
        if self.limits.allows(self.depth) {
            Ok(())
        } else {
            Err(EncodeError::DepthExceeded {
                path: self.path.clone(),
                max_depth: self.limits.max_depth,
            })
        }
    }

    fn double(&self, value: f64) -> Result<Value, EncodeError> {
        if value.is_finite() {
            Ok(Value::Double(value))
        } else {
            Err(self.unsupported("non-finite double"))
        }
    }

    fn wide_int<T>(&self, value: T, type_name: &str) -> Result<Value, EncodeError>
    where
        T: TryInto<i64> + Display + Copy,
    {
        value
            .try_into()
            .map(Value::Int)
            .map_err(|_| self.unsupported(format!("{type_name} {value} outside the 64-bit signed range")))
    }

    /// Serializer for a nested slot one level down.
    fn child(&self, path: Path) -> ValueSerializer {
        ValueSerializer {
            path,
            depth: self.depth + 1,
            limits: self.limits,
        }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantBuilder<SeqBuilder>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantBuilder<MapBuilder>;

    fn serialize_bool(self, v: bool) -> Result<Value, EncodeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, EncodeError> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, EncodeError> {
        self.wide_int(v, "i128")
    }

    fn serialize_u8(self, v: u8) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, EncodeError> {
        self.wide_int(v, "u64")
    }

    fn serialize_u128(self, v: u128) -> Result<Value, EncodeError> {
        self.wide_int(v, "u128")
    }

    fn serialize_f32(self, v: f32) -> Result<Value, EncodeError> {
        self.double(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, EncodeError> {
        self.double(v)
    }

    fn serialize_char(self, v: char) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, EncodeError> {
        Err(self.unsupported("bytes"))
    }

    fn serialize_none(self) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, EncodeError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.enter()?;
        let at = self.path.child_key(&JsonKey::new(variant));
        let payload = value
            .serialize(self.child(at.clone()))
            .map_err(|e| relocate(e, at))?;
        let mut map = Map::with_capacity(1);
        map.insert(variant, payload);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, EncodeError> {
        self.enter()?;
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
            parent: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<SeqBuilder>, EncodeError> {
        self.enter()?;
        let inner = self.child(self.path.child_key(&JsonKey::new(variant)));
        Ok(VariantBuilder {
            variant,
            inner: inner.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, EncodeError> {
        self.enter()?;
        Ok(MapBuilder {
            map: Map::with_capacity(len.unwrap_or(0)),
            next_key: None,
            parent: self,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, EncodeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<MapBuilder>, EncodeError> {
        self.enter()?;
        let inner = self.child(self.path.child_key(&JsonKey::new(variant)));
        Ok(VariantBuilder {
            variant,
            inner: inner.serialize_map(Some(len))?,
        })
    }
}

/// Collects array elements.
struct SeqBuilder {
    items: Vec<Value>,
    parent: ValueSerializer,
}

impl SeqBuilder {
    fn push<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let at = self.parent.path.child_index(self.items.len());
        let item = value
            .serialize(self.parent.child(at.clone()))
            .map_err(|e| relocate(e, at))?;
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Array(self.items)
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

/// Collects object members. Keys must serialize to strings.
struct MapBuilder {
    map: Map,
    next_key: Option<String>,
    parent: ValueSerializer,
}

impl MapBuilder {
    fn put<T>(&mut self, key: String, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let at = self.parent.path.child_key(&JsonKey::new(key.as_str()));
        let item = value
            .serialize(self.parent.child(at.clone()))
            .map_err(|e| relocate(e, at))?;
        self.map.insert(key, item);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let key = key
            .serialize(KeySerializer)
            .map_err(|kind| self.parent.unsupported(format!("non-string map key ({kind})")))?;
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let key = self.next_key.take().ok_or_else(|| EncodeError::Serialize {
            path: self.parent.path.clone(),
            message: "map value serialized before its key".to_string(),
        })?;
        self.put(key, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.put(key.to_string(), value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

/// Wraps a tuple or struct variant payload as `{variant: payload}`.
struct VariantBuilder<B> {
    variant: &'static str,
    inner: B,
}

impl VariantBuilder<SeqBuilder> {
    fn wrap(self) -> Value {
        let mut map = Map::with_capacity(1);
        map.insert(self.variant, self.inner.finish());
        Value::Object(map)
    }
}

impl VariantBuilder<MapBuilder> {
    fn wrap(self) -> Value {
        let mut map = Map::with_capacity(1);
        map.insert(self.variant, self.inner.finish());
        Value::Object(map)
    }
}

impl ser::SerializeTupleVariant for VariantBuilder<SeqBuilder> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.inner.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.wrap())
    }
}

impl ser::SerializeStructVariant for VariantBuilder<MapBuilder> {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        self.inner.put(key.to_string(), value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.wrap())
    }
}

/// Give a custom error raised by a nested `Serialize` impl the path of the slot
/// it was raised in.
fn relocate(err: EncodeError, at: Path) -> EncodeError {
    match err {
        EncodeError::Serialize { path, message } if path.is_root() => {
            EncodeError::Serialize { path: at, message }
        }
        other => other,
    }
}

/// Accepts only string-like keys. The error is the rejected key's kind.
struct KeySerializer;

/// Error type for [`KeySerializer`]: the kind of the rejected key.
#[derive(Debug)]
struct KeyKind(String);

impl Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for KeyKind {}

impl ser::Error for KeyKind {
    fn custom<T: Display>(msg: T) -> Self {
        KeyKind(msg.to_string())
    }
}

fn reject(kind: &str) -> KeyKind {
    KeyKind(kind.to_string())
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = KeyKind;

    type SerializeSeq = Impossible<String, KeyKind>;
    type SerializeTuple = Impossible<String, KeyKind>;
    type SerializeTupleStruct = Impossible<String, KeyKind>;
    type SerializeTupleVariant = Impossible<String, KeyKind>;
    type SerializeMap = Impossible<String, KeyKind>;
    type SerializeStruct = Impossible<String, KeyKind>;
    type SerializeStructVariant = Impossible<String, KeyKind>;

    fn serialize_str(self, v: &str) -> Result<String, KeyKind> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, KeyKind> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, KeyKind> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String, KeyKind>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String, KeyKind> {
        Err(reject("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<String, KeyKind> {
        Err(reject("i8"))
    }

    fn serialize_i16(self, _v: i16) -> Result<String, KeyKind> {
        Err(reject("i16"))
    }

    fn serialize_i32(self, _v: i32) -> Result<String, KeyKind> {
        Err(reject("i32"))
    }

    fn serialize_i64(self, _v: i64) -> Result<String, KeyKind> {
        Err(reject("i64"))
    }

    fn serialize_u8(self, _v: u8) -> Result<String, KeyKind> {
        Err(reject("u8"))
    }

    fn serialize_u16(self, _v: u16) -> Result<String, KeyKind> {
        Err(reject("u16"))
    }

    fn serialize_u32(self, _v: u32) -> Result<String, KeyKind> {
        Err(reject("u32"))
    }

    fn serialize_u64(self, _v: u64) -> Result<String, KeyKind> {
        Err(reject("u64"))
    }

    fn serialize_f32(self, _v: f32) -> Result<String, KeyKind> {
        Err(reject("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, KeyKind> {
        Err(reject("f64"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, KeyKind> {
        Err(reject("bytes"))
    }

    fn serialize_none(self) -> Result<String, KeyKind> {
        Err(reject("none"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String, KeyKind>
    where
        T: Serialize + ?Sized,
    {
        Err(reject("option"))
    }

    fn serialize_unit(self) -> Result<String, KeyKind> {
        Err(reject("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, KeyKind> {
        Err(reject("unit struct"))
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, KeyKind>
    where
        T: Serialize + ?Sized,
    {
        Err(reject("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, KeyKind> {
        Err(reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, KeyKind> {
        Err(reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, KeyKind> {
        Err(reject("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, KeyKind> {
        Err(reject("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, KeyKind> {
        Err(reject("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, KeyKind> {
        Err(reject("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, KeyKind> {
        Err(reject("enum"))
    }
}
