//! Tracing subscriber setup

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset: tracker events at info, the rest at
/// warn.
pub const DEFAULT_FILTER: &str = "warn,lectern_core=info,lectern_config=info";

/// Install the global subscriber: an `EnvFilter` (overridable via
/// `RUST_LOG`) and the fmt layer. Fails if a subscriber is already set.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
