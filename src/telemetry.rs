//! Tracing initialization logic.

use crate::cli::LogFormat;
use crate::config::Config;
use crate::dispatch::throttle::THROTTLE_WINDOW;
use crate::util;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "pointer_trace=info";

/// Builds the filter from the configured directive, falling back to the
/// default on a parse error.
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid RUST_LOG '{directive}': {e}");
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Initialize the tracing subscriber (fmt layer to stderr) and log the
/// start-up banner and configuration.
pub fn init_tracing(cfg: &Config) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(cfg.verbose)
        .with_level(true);
    let fmt_layer = match cfg.log_format {
        LogFormat::Text => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer.json().boxed(),
    };

    // try_init: a second initialization (tests) is not an error worth dying for.
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter(&cfg.log_filter))
        .try_init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_ts = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "pointer-trace starting"
    );

    info!(
        terse = cfg.toggles.terse,
        throttle = cfg.toggles.throttle,
        throttle_window = %util::format_duration(THROTTLE_WINDOW),
        motion_events = cfg.toggles.motion_events,
        suppress_default_pointer = cfg.toggles.suppress_default_pointer,
        mouse_in_pointer = cfg.toggles.mouse_in_pointer,
        max_log_lines = cfg.max_log_lines,
        headless = cfg.headless,
        inject_interval = %util::format_duration(cfg.inject_interval()),
        log_filter = %cfg.log_filter,
        log_format = ?cfg.log_format,
        "Configuration loaded"
    );
}
