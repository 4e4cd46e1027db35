//! Tracing setup for the `case-report` binary
//!
//! `RUST_LOG` replaces the default filter, e.g.
//! `RUST_LOG=forensic_audit=info,warn` for the audit trail plus warnings.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Audit events pass both defaults
const DEFAULT_FILTER: &str = "case_report=info,forensic_audit=info";
const VERBOSE_FILTER: &str = "case_report=trace,forensic_audit=info";

/// Install the global subscriber; later calls leave the first one in place
///
/// Verbose mode logs at trace level in a multi-line format with source
/// locations and thread names.
pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let layer = fmt::layer()
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_thread_names(verbose);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if verbose {
        registry.with(layer.pretty()).try_init()
    } else {
        registry.with(layer.compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
