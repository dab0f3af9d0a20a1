// logsift - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Configuration mistakes (bad patterns, unknown properties) surface at
// construction time; per-line parse problems never become errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logsift operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogSiftError {
    /// Loading a log file failed.
    Parse(ParseError),

    /// Building a filter or an extraction pattern failed.
    Filter(FilterError),

    /// A validated merge found an unordered operand.
    Merge(MergeError),

    /// File discovery failed.
    Discovery(DiscoveryError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LogSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Merge(e) => write!(f, "Merge error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LogSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Merge(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors related to loading log files into a record set.
#[derive(Debug)]
pub enum ParseError {
    /// The file name does not follow the `a_b_c_<instance>...` convention.
    InvalidFileName { path: PathBuf },

    /// I/O error while opening or reading a log file.
    Io { file: PathBuf, source: io::Error },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileName { path } => write!(
                f,
                "'{}': file name has no fourth '_'-separated token to use as instance",
                path.display()
            ),
            Self::Io { file, source } => {
                write!(f, "'{}': I/O error: {source}", file.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for LogSiftError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Configuration errors raised while building predicates, filters, or
/// extraction patterns.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// Criteria key names no record property.
    UnknownProperty { name: String },

    /// Criteria value cannot be converted to the property's type.
    InvalidPropValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Time range is not `start,end` or a bound is not a recognised timestamp.
    InvalidTimeRange { spec: String, reason: String },

    /// Section extraction was asked to run with no patterns.
    EmptySectionList,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid regex '{pattern}': {source}")
            }
            Self::UnknownProperty { name } => write!(
                f,
                "Unknown record property '{name}'. \
                 Expected one of: seq, timestamp, severity, pid, keyword, time_range"
            ),
            Self::InvalidPropValue {
                name,
                value,
                expected,
            } => write!(f, "Value '{value}' for '{name}' is not {expected}"),
            Self::InvalidTimeRange { spec, reason } => {
                write!(f, "Invalid time range '{spec}': {reason}")
            }
            Self::EmptySectionList => {
                write!(f, "Section extraction needs at least one pattern")
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FilterError> for LogSiftError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Merge errors
// ---------------------------------------------------------------------------

/// Errors reported by validated merges.
#[derive(Debug)]
pub enum MergeError {
    /// `index` is the first record whose timestamp is earlier than its
    /// predecessor's.
    Unordered { instance: String, index: usize },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unordered { instance, index } => write!(
                f,
                "Record set '{instance}' is not time ordered at position {index}"
            ),
        }
    }
}

impl std::error::Error for MergeError {}

impl From<MergeError> for LogSiftError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Scan path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Scan path '{}' is not a directory", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<DiscoveryError> for LogSiftError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing query results.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io { source: io::Error },

    /// CSV serialisation error.
    Csv { source: csv::Error },

    /// JSON serialisation error.
    Json { source: serde_json::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { source } => write!(f, "Output I/O error: {source}"),
            Self::Csv { source } => write!(f, "CSV output error: {source}"),
            Self::Json { source } => write!(f, "JSON output error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            Self::Csv { source } => Some(source),
            Self::Json { source } => Some(source),
        }
    }
}

impl From<ExportError> for LogSiftError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LogSiftError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for logsift results.
pub type Result<T> = std::result::Result<T, LogSiftError>;
