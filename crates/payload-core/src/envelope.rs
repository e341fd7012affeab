//! Self-describing JSON: a payload paired with the schema that names its shape.
//!
//! The same `{"schema": .., "data": ..}` envelope is used for standalone events
//! and for entities attached to another event. The codec underneath does not
//! know about schemas; this module only carries the URI alongside the data.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::encoder::encode;
use crate::error::{Error, Result};
use crate::ser::to_value;
use crate::types::{Map, Value};

/// Schema wrapping the list of entities attached to an event.
pub const CONTEXTS_SCHEMA: &str = "iglu:com.snowplowanalytics.snowplow/contexts/jsonschema/1-0-1";

/// Schema wrapping a self-describing event payload.
pub const UNSTRUCT_EVENT_SCHEMA: &str =
    "iglu:com.snowplowanalytics.snowplow/unstruct_event/jsonschema/1-0-0";

/// A schema identifier of the form
/// `iglu:<vendor>/<name>/<format>/<model>-<revision>-<addition>`.
///
/// Only the shape of the URI is checked; whether the schema exists is someone
/// else's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaUri {
    vendor: String,
    name: String,
    format: String,
    version: (u32, u32, u32),
}

impl SchemaUri {
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// `(model, revision, addition)`
    pub fn version(&self) -> (u32, u32, u32) {
        self.version
    }
}

impl FromStr for SchemaUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |why: &str| Error::Envelope(format!("schema URI {s:?} {why}"));

        let rest = s
            .strip_prefix("iglu:")
            .ok_or_else(|| invalid("must start with 'iglu:'"))?;
        let parts: Vec<&str> = rest.split('/').collect();
        let [vendor, name, format, version] = parts.as_slice() else {
            return Err(invalid("must have vendor/name/format/version"));
        };
        if [vendor, name, format].iter().any(|p| p.is_empty()) {
            return Err(invalid("has an empty segment"));
        }

        let numbers: Vec<u32> = version
            .split('-')
            .map(|n| n.parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid("has a non-numeric version"))?;
        let [model, revision, addition] = numbers.as_slice() else {
            return Err(invalid("version must be model-revision-addition"));
        };

        Ok(SchemaUri {
            vendor: vendor.to_string(),
            name: name.to_string(),
            format: format.to_string(),
            version: (*model, *revision, *addition),
        })
    }
}

impl fmt::Display for SchemaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (model, revision, addition) = self.version;
        write!(
            f,
            "iglu:{}/{}/{}/{}-{}-{}",
            self.vendor, self.name, self.format, model, revision, addition
        )
    }
}

impl Serialize for SchemaUri {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A payload tagged with its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfDescribingJson {
    pub schema: SchemaUri,
    pub data: Value,
}

impl SelfDescribingJson {
    pub fn new(schema: SchemaUri, data: Value) -> Self {
        SelfDescribingJson { schema, data }
    }

    /// Parse the schema and project `data` through [`to_value`].
    pub fn from_serializable<T>(schema: &str, data: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(SelfDescribingJson {
            schema: schema.parse()?,
            data: to_value(data)?,
        })
    }

    /// `{"schema": "<uri>", "data": <data>}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(2);
        map.insert("schema", Value::String(self.schema.to_string()));
        map.insert("data", self.data.clone());
        Value::Object(map)
    }

    /// Read an envelope back from a decoded value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::Envelope(format!("expected an object, found {}", value.kind())))?;
        let schema = map
            .get("schema")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Envelope("missing string member \"schema\"".to_string()))?;
        let data = map
            .get("data")
            .ok_or_else(|| Error::Envelope("missing member \"data\"".to_string()))?;
        Ok(SelfDescribingJson {
            schema: schema.parse()?,
            data: data.clone(),
        })
    }

    /// Compact JSON for the whole envelope.
    pub fn encode(&self) -> Result<String> {
        Ok(encode(&self.to_value())?)
    }
}

/// An event payload together with the entities attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfDescribingEvent {
    pub envelope: SelfDescribingJson,
    pub entities: Vec<SelfDescribingJson>,
}

impl SelfDescribingEvent {
    pub fn new(envelope: SelfDescribingJson) -> Self {
        SelfDescribingEvent {
            envelope,
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: SelfDescribingJson) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn schema(&self) -> &SchemaUri {
        &self.envelope.schema
    }
}

impl From<SelfDescribingJson> for SelfDescribingEvent {
    fn from(envelope: SelfDescribingJson) -> Self {
        SelfDescribingEvent::new(envelope)
    }
}

/// Wrap entities in the contexts envelope, preserving their order.
pub fn contexts(entities: &[SelfDescribingJson]) -> Value {
    let data = entities.iter().map(SelfDescribingJson::to_value).collect();
    wrap(CONTEXTS_SCHEMA, Value::Array(data))
}

/// Wrap an event envelope in the unstruct_event envelope.
pub fn unstruct_event(envelope: &SelfDescribingJson) -> Value {
    wrap(UNSTRUCT_EVENT_SCHEMA, envelope.to_value())
}

fn wrap(schema: &str, data: Value) -> Value {
    let mut map = Map::with_capacity(2);
    map.insert("schema", Value::from(schema));
    map.insert("data", data);
    Value::Object(map)
}
