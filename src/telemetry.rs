//! Logging setup.
//!
//! The library only emits `tracing` events; binaries and tests that want to
//! see them call [`init_tracing`] once. Verbosity follows `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=brochure_ui=debug   # state transitions, dismissed banners
//! RUST_LOG=warn                # blocked submits and failures only
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

/// Install a compact fmt subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().compact().with_target(false))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
