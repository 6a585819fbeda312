//! Log output setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber that writes to stderr.
///
/// Safe to call more than once; only the first call has an effect. Nothing
/// is installed unless `RUST_LOG` is set, e.g. `RUST_LOG=stratus_engine=debug`
/// for one line per declaration evaluated.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
