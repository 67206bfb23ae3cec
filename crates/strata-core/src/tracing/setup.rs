//! Subscriber installation.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding `EnvFilter` directives.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Directive used when `STRATA_LOG` is unset or fails to parse.
pub const DEFAULT_DIRECTIVE: &str = "strata=info";

static INSTALLED: Once = Once::new();

/// Filter from `STRATA_LOG`, e.g. `strata_analysis=debug,strata_storage=warn`.
pub fn filter_from_env() -> EnvFilter {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}

/// Install the process-wide subscriber once.
///
/// Later calls do nothing. An embedding host that already set a global
/// subscriber keeps it.
pub fn init_tracing() {
    INSTALLED.call_once(|| {
        let events = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        let installed = tracing_subscriber::registry()
            .with(events)
            .with(filter_from_env())
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
}
