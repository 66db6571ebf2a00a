//! Tracing bootstrap for the embedding runtime.
//!
//! The engine only emits `tracing` events; the process hosting it decides
//! where they go. Call [`init_tracing`] once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, defaulting to `info`.
/// `json_output` switches events to one-line JSON for log aggregation.
/// Calling this when a subscriber is already installed is a no-op.
pub fn init_tracing(json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_output {
        registry.with(fmt::layer().json()).try_init().ok();
    } else {
        registry.with(fmt::layer()).try_init().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_tolerates_repeat_installation() {
        init_tracing(false);
        init_tracing(true);
        tracing::info!("subscriber installed");
    }
}
