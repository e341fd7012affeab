//! Event tracker: turns events into tracker-protocol payloads and hands the
//! encoded JSON to an [`Emitter`].
//!
//! A tracker is built explicitly from a [`TrackerConfig`] and an emitter, passed
//! around by reference (it is `Sync` when its emitter is), and torn down with
//! [`Tracker::shutdown`], which flushes the emitter and gives it back. There is
//! no process-wide instance.
//!
//! Sending payloads anywhere beyond the emitter (HTTP, batching, retries) is
//! out of scope.
//!
//! # Example
//! ```
//! use payload_core::tracker::{MemoryEmitter, Structured, Tracker, TrackerConfig};
//!
//! let tracker = Tracker::new(TrackerConfig::new("demo", "my-app"), MemoryEmitter::new());
//! tracker.track(Structured::new("profile", "open").label("settings")).unwrap();
//! let emitter = tracker.shutdown().unwrap();
//! assert_eq!(emitter.payloads().len(), 1);
//! ```

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::encoder::encode_with;
use crate::envelope::{contexts, unstruct_event, SelfDescribingEvent, SelfDescribingJson};
use crate::error::Result;
use crate::limits::Limits;
use crate::types::{Map, Value};

/// Tracker version reported in every payload.
pub const TRACKER_VERSION: &str = concat!("rust-payload-", env!("CARGO_PKG_VERSION"));

/// Schema of the screen view event.
pub const SCREEN_VIEW_SCHEMA: &str =
    "iglu:com.snowplowanalytics.mobile/screen_view/jsonschema/1-0-0";

fn default_platform() -> String {
    "mob".to_string()
}

/// Tracker settings, loadable from JSON.
///
/// ```json
/// { "namespace": "datingDemoTracker", "app_id": "snowplow-dating-demo",
///   "platform": "mob", "limits": { "max_depth": 64 } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackerConfig {
    /// Distinguishes several trackers in one application.
    pub namespace: String,
    pub app_id: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default)]
    pub limits: Limits,
}

impl TrackerConfig {
    pub fn new(namespace: impl Into<String>, app_id: impl Into<String>) -> Self {
        TrackerConfig {
            namespace: namespace.into(),
            app_id: app_id.into(),
            platform: default_platform(),
            limits: Limits::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A category/action event with optional label, property and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Structured {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub property: Option<String>,
    pub value: Option<f64>,
}

impl Structured {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Structured {
            category: category.into(),
            action: action.into(),
            label: None,
            property: None,
            value: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// A screen view, sent as a self-describing event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenView {
    pub name: String,
    pub id: String,
}

impl ScreenView {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        ScreenView {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn to_event(&self) -> Result<SelfDescribingEvent> {
        Ok(SelfDescribingJson::from_serializable(SCREEN_VIEW_SCHEMA, self)?.into())
    }
}

/// Anything a tracker can track.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SelfDescribing(SelfDescribingEvent),
    Structured(Structured),
    ScreenView(ScreenView),
}

impl Event {
    /// Short name used in logs.
    fn kind(&self) -> &'static str {
        match self {
            Event::SelfDescribing(_) => "self_describing",
            Event::Structured(_) => "structured",
            Event::ScreenView(_) => "screen_view",
        }
    }
}

impl From<SelfDescribingEvent> for Event {
    fn from(event: SelfDescribingEvent) -> Self {
        Event::SelfDescribing(event)
    }
}

impl From<SelfDescribingJson> for Event {
    fn from(envelope: SelfDescribingJson) -> Self {
        Event::SelfDescribing(envelope.into())
    }
}

impl From<Structured> for Event {
    fn from(event: Structured) -> Self {
        Event::Structured(event)
    }
}

impl From<ScreenView> for Event {
    fn from(event: ScreenView) -> Self {
        Event::ScreenView(event)
    }
}

/// Destination for encoded payloads, one JSON document per call.
pub trait Emitter {
    fn emit(&self, payload: &str) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps payloads in memory. Useful for tests and for inspecting output.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    payloads: Mutex<Vec<String>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        MemoryEmitter::default()
    }

    /// Payloads emitted so far, oldest first.
    pub fn payloads(&self) -> Vec<String> {
        match self.payloads.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&self, payload: &str) -> io::Result<()> {
        self.payloads
            .lock()
            .map_err(|_| io::Error::other("memory emitter lock poisoned"))?
            .push(payload.to_string());
        Ok(())
    }
}

/// Writes each payload as one line (JSON Lines) to the wrapped writer.
#[derive(Debug)]
pub struct WriterEmitter<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> WriterEmitter<W> {
    pub fn new(writer: W) -> Self {
        WriterEmitter {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> Emitter for WriterEmitter<W> {
    fn emit(&self, payload: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("writer emitter lock poisoned"))?;
        writeln!(writer, "{payload}")
    }

    fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("writer emitter lock poisoned"))?
            .flush()
    }
}

/// Builds payloads for events and emits them.
#[derive(Debug)]
pub struct Tracker<E: Emitter> {
    config: TrackerConfig,
    emitter: E,
    tracked: AtomicU64,
}

impl<E: Emitter> Tracker<E> {
    pub fn new(config: TrackerConfig, emitter: E) -> Self {
        info!(
            namespace = %config.namespace,
            app_id = %config.app_id,
            "tracker initialized"
        );
        Tracker {
            config,
            emitter,
            tracked: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of events emitted so far.
    pub fn tracked(&self) -> u64 {
        self.tracked.load(Ordering::Relaxed)
    }

    /// Track an event stamped with the current time. Returns the payload that
    /// was emitted.
    pub fn track(&self, event: impl Into<Event>) -> Result<Value> {
        self.track_at(event, chrono::Utc::now().timestamp_millis())
    }

    /// Track an event with an explicit device timestamp (milliseconds since
    /// the Unix epoch).
    pub fn track_at(&self, event: impl Into<Event>, timestamp_ms: i64) -> Result<Value> {
        let event = event.into();
        let payload = self.payload(&event, timestamp_ms)?;
        let line = encode_with(&payload, &self.config.limits)?;

        if let Err(e) = self.emitter.emit(&line) {
            warn!(error = %e, event = event.kind(), "emitter rejected payload");
            return Err(e.into());
        }
        self.tracked.fetch_add(1, Ordering::Relaxed);
        let schema = schema_of(&event);
        debug!(
            namespace = %self.config.namespace,
            event = event.kind(),
            schema = schema.as_deref().unwrap_or("-"),
            "tracked event"
        );
        Ok(payload)
    }

    /// Flush the emitter and hand it back.
    pub fn shutdown(self) -> Result<E> {
        self.emitter.flush()?;
        info!(
            namespace = %self.config.namespace,
            tracked = self.tracked(),
            "tracker shut down"
        );
        Ok(self.emitter)
    }

    fn payload(&self, event: &Event, timestamp_ms: i64) -> Result<Value> {
        let mut map = Map::new();
        let code = match event {
            Event::Structured(_) => "se",
            Event::SelfDescribing(_) | Event::ScreenView(_) => "ue",
        };
        map.insert("e", Value::from(code));
        map.insert("tv", Value::from(TRACKER_VERSION));
        map.insert("tna", Value::from(self.config.namespace.as_str()));
        map.insert("aid", Value::from(self.config.app_id.as_str()));
        map.insert("p", Value::from(self.config.platform.as_str()));
        map.insert("dtm", Value::String(timestamp_ms.to_string()));

        match event {
            Event::SelfDescribing(ev) => self.self_describing_fields(&mut map, ev)?,
            Event::ScreenView(view) => self.self_describing_fields(&mut map, &view.to_event()?)?,
            Event::Structured(se) => self.structured_fields(&mut map, se)?,
        }
        Ok(Value::Object(map))
    }

    fn self_describing_fields(&self, map: &mut Map, event: &SelfDescribingEvent) -> Result<()> {
        let limits = &self.config.limits;
        let ue_pr = encode_with(&unstruct_event(&event.envelope), limits)?;
        map.insert("ue_pr", Value::String(ue_pr));
        if !event.entities.is_empty() {
            let co = encode_with(&contexts(&event.entities), limits)?;
            map.insert("co", Value::String(co));
        }
        Ok(())
    }

    fn structured_fields(&self, map: &mut Map, event: &Structured) -> Result<()> {
        map.insert("se_ca", Value::from(event.category.as_str()));
        map.insert("se_ac", Value::from(event.action.as_str()));
        if let Some(label) = &event.label {
            map.insert("se_la", Value::from(label.as_str()));
        }
        if let Some(property) = &event.property {
            map.insert("se_pr", Value::from(property.as_str()));
        }
        if let Some(value) = event.value {
            let text = encode_with(&Value::Double(value), &self.config.limits)?;
            map.insert("se_va", Value::String(text));
        }
        Ok(())
    }
}

fn schema_of(event: &Event) -> Option<String> {
    match event {
        Event::SelfDescribing(ev) => Some(ev.schema().to_string()),
        Event::ScreenView(_) => Some(SCREEN_VIEW_SCHEMA.to_string()),
        Event::Structured(_) => None,
    }
}
