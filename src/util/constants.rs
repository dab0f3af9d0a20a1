// logsift - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logsift";

/// Application identifier used for config directories.
pub const APP_ID: &str = "logsift";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log format
// =============================================================================

/// Header line: timestamp, severity, bracketed pid, message.
/// Example: `01 Jan 2020, 00:00:00.100: INFO : [111] : start job`
pub const HEADER_PATTERN: &str =
    r"^(\d{2} \w{3} \d{4}, \d{2}:\d{2}:\d{2}\.\d{3}): (\w+) +: \[(\d+)\] : (.+)$";

/// chrono format of the header timestamp.
pub const HEADER_TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M:%S%.f";

/// chrono format used by the canonical record rendering (ISO-8601, millis).
pub const RENDER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Formats accepted for time range bounds and `timestamp` criteria, tried
/// in order.
pub const BOUNDARY_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    HEADER_TIMESTAMP_FORMAT,
];

/// Zero-based index of the file-name token that names the instance.
pub const INSTANCE_TOKEN_INDEX: usize = 3;

/// Separator between file-name tokens.
pub const INSTANCE_TOKEN_SEPARATOR: char = '_';

// =============================================================================
// Criteria keys
// =============================================================================

/// Criteria key selecting a regex search over record text.
pub const KEYWORD_KEY: &str = "keyword";

/// Criteria key selecting an exclusive time range.
pub const TIME_RANGE_KEY: &str = "time_range";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of files to load from one directory argument.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files.
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Default filename include patterns.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log", "*.log.*", "*.txt"];

/// Default exclude patterns. Literal names also prune directories.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.zip", "*.bak", ".git"];

// =============================================================================
// Configuration
// =============================================================================

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default logging level when nothing else is specified.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Placeholder printed for capture groups that did not participate.
pub const ABSENT_GROUP_PLACEHOLDER: &str = "-";
