//! Tracing initialization and subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, then `config.trace_level`, then
/// `"info"`. With `config.trace_file` set, spans are exported as OTLP JSON
/// lines to that file; otherwise events are formatted to stderr.
///
/// Idempotent: only the first call in a process installs a subscriber, and
/// failures (unparsable filter, subscriber already set) are swallowed.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    });

    let otel_layer = config.trace_file.as_ref().map(|path| {
        let resource = Resource::new(vec![
            KeyValue::new("service.name", "feedsieve"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        let provider = tracer::create_tracer_provider(path.clone(), resource);
        OpenTelemetryLayer::new(provider.tracer("feedsieve"))
    });

    let fmt_layer = config.trace_file.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
}
