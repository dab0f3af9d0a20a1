// logsift - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr only. stdout carries query results (records, tuples, CSV,
// JSON) that are usually piped into another tool, so diagnostics must never
// interleave with them. There is no file sink; a query run is short-lived
// and `2>` redirection covers capturing its log.

use super::constants;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
/// An unparseable RUST_LOG falls back to the default level.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let env = std::env::var("RUST_LOG").ok();
    let (directive, source) = select_directive(env, debug_flag, config_level);
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(constants::DEFAULT_LOG_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();

    tracing::debug!(
        app = constants::APP_NAME,
        version = constants::APP_VERSION,
        directive = %directive,
        source,
        "Logging initialised"
    );
}

/// Pick the filter directive and name the setting it came from.
fn select_directive(
    env: Option<String>,
    debug_flag: bool,
    config_level: Option<&str>,
) -> (String, &'static str) {
    match (env, debug_flag, config_level) {
        (Some(env), _, _) if !env.trim().is_empty() => (env, "RUST_LOG"),
        (_, true, _) => ("debug".to_string(), "--debug"),
        (_, _, Some(level)) => (level.to_string(), "config"),
        _ => (constants::DEFAULT_LOG_LEVEL.to_string(), "default"),
    }
}
