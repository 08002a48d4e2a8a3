//! Logger bootstrap.
//!
//! The library itself only talks to the `log` facade. Binaries and tests
//! call [`initialize_logger`] once to route records to `env_logger`.

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Crate records at `Info`, everything else at `Warn`.
fn base_builder() -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("pagetree", LevelFilter::Info)
        .format_timestamp_millis()
        .is_test(cfg!(test));
    builder
}

/// Install the process-wide logger.
///
/// `RUST_LOG` overrides the defaults, e.g. `RUST_LOG=pagetree::index=debug`
/// to watch splits and merges. Safe to call from every test.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = base_builder();
        builder.parse_default_env();

        // Another logger may already be installed by the embedding binary.
        let _ = builder.try_init();
    });
}
