//! Colorful console output for engine events.
//!
//! Provides a `tracing` layer that renders the engine's structured events.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (partition, batch, job and queue start/end)
//! - **DEBUG**: Progress updates (batch units, job state changes, refinement)
//! - **WARN**: Degradations (strategy fallbacks, cache errors, job retries)

mod format;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::OnceLock;

use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::format::format_event;

static INIT: OnceLock<()> = OnceLock::new();

const TARGET_PREFIX: &str = "tripmate";

/// Installs the console layer as the global subscriber.
///
/// Safe to call multiple times - only the first call has effect, and an
/// already installed global subscriber is left in place. `RUST_LOG`
/// overrides the default `info` level.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(TripmateConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats engine events with colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripmateConsoleLayer;

impl<S: Subscriber> Layer<S> for TripmateConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(TARGET_PREFIX) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

/// Fields of one event, by name.
#[derive(Debug, Default)]
pub(crate) struct EventVisitor {
    pub(crate) event: Option<String>,
    pub(crate) text: BTreeMap<&'static str, String>,
    pub(crate) counts: BTreeMap<&'static str, u64>,
    pub(crate) floats: BTreeMap<&'static str, f64>,
    pub(crate) flags: BTreeMap<&'static str, bool>,
}

impl EventVisitor {
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub(crate) fn count(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub(crate) fn float(&self, name: &str) -> Option<f64> {
        self.floats.get(name).copied()
    }

    pub(crate) fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "event" {
            self.event = Some(s);
        } else {
            self.text.insert(field.name(), s);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "event" {
            self.event = Some(value.to_string());
        } else {
            self.text.insert(field.name(), value.to_string());
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.counts.insert(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.floats.insert(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.flags.insert(field.name(), value);
    }
}
