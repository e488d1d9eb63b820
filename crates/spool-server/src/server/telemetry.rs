//! Console logging.
//!
//! Events and spans from both the server and the `spool` core (built with its
//! `tracing` feature) go through a single `fmt` layer. The level is taken
//! from `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=spool=trace,spool_server=debug cargo run
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_file(true),
        )
        .try_init()?;
    Ok(())
}
