//! Tracing subscriber construction and registration.
//!
//! Builds a Bunyan-formatted JSON subscriber layered over an env filter and
//! installs it as the global default, bridging `log` records into `tracing`.

use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

/// Composes the application's tracing subscriber.
///
/// # Arguments
/// * `name` - Service name stamped on every log line
/// * `env_filter` - Default filter directive when `RUST_LOG` is unset
/// * `sink` - Where formatted logs are written (stdout in production,
///   `std::io::sink` in tests)
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Registers a subscriber as the global default.
///
/// # Panics
/// Panics if called more than once; the subscriber can only be installed once
/// per process.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("failed to set logger");
    set_global_default(subscriber).expect("failed to set tracing subscriber");
}
