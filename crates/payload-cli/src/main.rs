//! `payload` CLI — encode, inspect, wrap and track JSON payloads from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Re-encode JSON canonically (stdin → stdout)
//! echo '{ "button_id" : "checkout" }' | payload encode
//!
//! # Pretty-print from file to file
//! payload encode --pretty -i event.json -o event.pretty.json
//!
//! # Show the typed tree, one node per line
//! echo '{"rank":3,"score":3.0}' | payload decode
//!
//! # Wrap data in a self-describing envelope
//! payload wrap --schema iglu:com.acme/click/jsonschema/1-0-0 -i click.json
//!
//! # Build tracker payloads (JSON Lines on stdout)
//! payload track --schema iglu:com.acme/click/jsonschema/1-0-0 --config tracker.json -i click.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use payload_core::tracker::{Tracker, TrackerConfig, WriterEmitter};
use payload_core::{Limits, Path, SchemaUri, SelfDescribingJson, Value};
use std::io::{self, Read, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_NAMESPACE: &str = "payload";
const DEFAULT_APP_ID: &str = "payload-cli";

#[derive(Parser)]
#[command(
    name = "payload",
    version,
    about = "Self-describing JSON payload CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum nesting of arrays and objects
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode JSON and write it back in canonical form
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print every node of the decoded tree as `path<TAB>kind<TAB>json`
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Wrap JSON data in a {"schema", "data"} envelope
    Wrap {
        /// Schema URI, e.g. iglu:com.acme/click/jsonschema/1-0-0
        #[arg(long)]
        schema: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Track JSON data as a self-describing event and print the payload
    Track {
        /// Schema URI of the event
        #[arg(long)]
        schema: String,
        /// Tracker configuration file (JSON)
        #[arg(long)]
        config: Option<String>,
        /// Tracker namespace (overrides the config file)
        #[arg(long)]
        namespace: Option<String>,
        /// Application id (overrides the config file)
        #[arg(long)]
        app_id: Option<String>,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let limits = cli.max_depth.map(Limits::new).unwrap_or_default();

    match cli.command {
        Commands::Encode {
            input,
            output,
            pretty,
        } => {
            let value = read_value(input.as_deref(), &limits)?;
            let text = if pretty {
                let json = payload_core::to_json_with(&value, &limits)
                    .context("Failed to encode value")?;
                serde_json::to_string_pretty(&json)?
            } else {
                payload_core::encode_with(&value, &limits).context("Failed to encode value")?
            };
            write_output(output.as_deref(), &format!("{text}\n"))?;
        }
        Commands::Decode { input, output } => {
            let value = read_value(input.as_deref(), &limits)?;
            let mut lines = String::new();
            let mut path = Path::root();
            describe(&value, &mut path, &limits, &mut lines)?;
            write_output(output.as_deref(), &lines)?;
        }
        Commands::Wrap {
            schema,
            input,
            output,
        } => {
            let schema: SchemaUri = schema.parse().context("Invalid --schema")?;
            let data = read_value(input.as_deref(), &limits)?;
            let envelope = SelfDescribingJson::new(schema, data);
            let text = payload_core::encode_with(&envelope.to_value(), &limits)
                .context("Failed to encode envelope")?;
            write_output(output.as_deref(), &format!("{text}\n"))?;
        }
        Commands::Track {
            schema,
            config,
            namespace,
            app_id,
            input,
            output,
        } => {
            let schema: SchemaUri = schema.parse().context("Invalid --schema")?;
            let mut config = load_config(config.as_deref())?;
            if let Some(namespace) = namespace {
                config.namespace = namespace;
            }
            if let Some(app_id) = app_id {
                config.app_id = app_id;
            }
            if cli.max_depth.is_some() {
                config.limits = limits;
            }

            let data = read_value(input.as_deref(), &config.limits)?;
            let writer: Box<dyn Write> = match output.as_deref() {
                Some(path) => Box::new(
                    std::fs::File::create(path)
                        .with_context(|| format!("Failed to create file: {}", path))?,
                ),
                None => Box::new(io::stdout()),
            };
            let tracker = Tracker::new(config, WriterEmitter::new(writer));
            tracker
                .track(SelfDescribingJson::new(schema, data))
                .context("Failed to track event")?;
            tracker.shutdown().context("Failed to flush output")?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins unless `--verbose` is set.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<TrackerConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            let config = TrackerConfig::from_json(&text)
                .with_context(|| format!("Invalid config: {}", path))?;
            debug!(path, namespace = %config.namespace, "loaded tracker config");
            Ok(config)
        }
        None => Ok(TrackerConfig::new(DEFAULT_NAMESPACE, DEFAULT_APP_ID)),
    }
}

/// Append one line per node, parents before children.
fn describe(value: &Value, path: &mut Path, limits: &Limits, out: &mut String) -> Result<()> {
    let json = payload_core::encode_with(value, limits)
        .with_context(|| format!("Failed to encode node at {}", path))?;
    out.push_str(&format!("{}\t{}\t{}\n", path, value.kind(), json));

    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                describe(item, path, limits, out)?;
                path.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter() {
                path.push_key(&payload_core::JsonKey::new(key));
                describe(item, path, limits, out)?;
                path.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

/// Read and decode the input. UTF-8 is checked by the decoder, so invalid
/// bytes surface as a decode error at `$`.
fn read_value(path: Option<&str>, limits: &Limits) -> Result<Value> {
    let bytes = read_input(path)?;
    let value =
        payload_core::decode_with(&bytes, limits).context("Failed to decode JSON input")?;
    debug!(kind = value.kind(), bytes = bytes.len(), "decoded input");
    Ok(value)
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
