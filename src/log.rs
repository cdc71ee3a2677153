// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tracing setup for the shell binary.
//!
//! Simplified relative to the rest of the R3BL stack: no rolling file
//! appender, no custom event formatter, no `SharedWriter` plumbing — stderr
//! only, because stdout is the editor's canvas. `RUST_LOG` overrides the
//! default filter, matching the usual `tracing-subscriber` convention.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a global subscriber that writes compact, timestamp-free lines to
/// stderr. Safe to call once from `main`; a second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
