//! OpenTelemetry-based observability with file-based trace export.
//!
//! Engine events and passes are instrumented with `tracing` spans and
//! structured fields. This module wires those into a subscriber, optionally
//! exporting finished spans as OTLP JSON for offline analysis.
//!
//! # Architecture
//!
//! ```text
//! tracing → EnvFilter ─┬─ fmt layer → stderr                           (no trace_file)
//!                      └─ tracing-opentelemetry → SDK → FileSpanExporter → rotating JSON file
//! ```
//!
//! # Features
//!
//! - **File-Based Export**: traces written to `trace_file` when configured
//! - **Automatic Rotation**: files rotate at 10MB with 3-backup retention
//! - **OTLP Format**: OTLP/JSON `resourceSpans` documents, one per line
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - `init`: Subscriber setup
//! - `tracer`: Tracer provider with the file span exporter
//! - `span_formatter`: OTLP JSON span serialization
//! - `file_writer`: Rotating file writer with size-based rotation

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
