//! Diagnostics for the rail-translate binary
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG` (default `warn`).
//! Task progress is reported separately and is not affected by the filter.
//!
//! ```bash
//! RUST_LOG=rail_translate=debug rail-translate translate ./tree --from internal --to public \
//!   --direction forward --output ./out
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).compact())
    .init();
}
