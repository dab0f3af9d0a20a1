// logsift - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration and logging initialisation
// 3. Loading each input file into its own record set (in parallel)
// 4. Merging the sets in argument order, then querying the result

use clap::Parser;
use logsift::core::discovery::{self, DiscoveryConfig};
use logsift::core::export;
use logsift::core::record_set::{self, instance_from_path};
use logsift::core::{Criteria, Groups, RecordSet};
use logsift::platform::config::{self, AppConfig, OutputFormat, PlatformPaths};
use logsift::util::constants;
use logsift::util::error::{ExportError, LogSiftError, ParseError};
use logsift::util::logging;
use rayon::prelude::*;
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// logsift - reconstruct, filter and extract data from application logs.
///
/// Files are parsed into multi-line records, merged into one timeline in
/// timestamp order, filtered with --where, and printed or mined with
/// --select / --section.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about)]
struct Cli {
    /// Log files or directories to load.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Criterion KEY=VALUE (repeatable, AND-combined). KEY is keyword,
    /// time_range, seq, timestamp, severity or pid.
    #[arg(short = 'w', long = "where", value_name = "KEY=VALUE", value_parser = parse_criterion)]
    criteria: Vec<(String, String)>,

    /// Print only the number of matching records.
    #[arg(long, conflicts_with_all = ["select", "sections"])]
    count: bool,

    /// Extract capture groups of PATTERN from each matching record.
    #[arg(short = 's', long, value_name = "PATTERN")]
    select: Option<String>,

    /// Let '.' match newlines in --select.
    #[arg(long, requires = "select")]
    dotall: bool,

    /// Stop at the first record matching --select.
    #[arg(long, requires = "select", conflicts_with = "dotall")]
    first: bool,

    /// Section pattern for multi-record extraction (repeatable, in order).
    #[arg(long = "section", value_name = "PATTERN", conflicts_with = "select")]
    sections: Vec<String>,

    /// Output format (defaults to [output] format in config.toml, then text).
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Instance label for every input, instead of the file-name convention.
    #[arg(long, value_name = "NAME")]
    instance: Option<String>,

    /// Refuse to merge inputs that are not in timestamp order.
    #[arg(long)]
    check_order: bool,

    /// Directory containing config.toml (defaults to the platform config dir).
    #[arg(short = 'c', long = "config", value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_criterion(arg: &str) -> Result<(String, String), String> {
    Criteria::parse_pair(arg).ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_dir);
    let (app_config, config_warnings) = config::load_config(&config_dir);

    logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    tracing::debug!(
        version = constants::APP_VERSION,
        inputs = cli.paths.len(),
        "logsift starting"
    );

    match run(&cli, &app_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Query failed");
            eprintln!("Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, app_config: &AppConfig) -> logsift::Result<()> {
    let files = expand_inputs(&cli.paths, app_config)?;
    let sets = load_all(&files, cli.instance.as_deref())?;

    let merged = if cli.check_order {
        record_set::try_merge_all(sets)?
    } else {
        record_set::merge_all(sets)
    };
    let merged =
        merged.unwrap_or_else(|| RecordSet::new(cli.instance.clone().unwrap_or_default()));

    let criteria: Criteria = cli.criteria.iter().cloned().collect();
    let format = cli.format.unwrap_or(app_config.output_format);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.count {
        let count = merged.count(&criteria)?;
        writeln!(out, "{count}").map_err(io_error)?;
        return Ok(());
    }

    let selected = merged.filter(&criteria)?;

    if !cli.sections.is_empty() {
        let rows = selected.select_multi_lines(&cli.sections)?;
        write_groups(&rows, format, &mut out)?;
    } else if let Some(ref pattern) = cli.select {
        let rows = if cli.first {
            selected.select_first(pattern)?.into_iter().collect()
        } else {
            selected.select(pattern, cli.dotall)?
        };
        write_groups(&rows, format, &mut out)?;
    } else {
        write_records(&selected, format, &mut out)?;
    }

    out.flush().map_err(io_error)?;
    Ok(())
}

/// Replace directory arguments with the log files discovered under them.
fn expand_inputs(paths: &[PathBuf], app_config: &AppConfig) -> logsift::Result<Vec<PathBuf>> {
    let discovery_config = DiscoveryConfig {
        max_depth: app_config.max_depth,
        max_files: app_config.max_files,
        include_patterns: app_config.include_patterns.clone(),
        exclude_patterns: app_config.exclude_patterns.clone(),
    };

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let (found, warnings) = discovery::discover_files(path, &discovery_config)?;
            for warning in &warnings {
                tracing::warn!(warning = %warning, "Discovery warning");
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Load every file into its own record set. Order of the result follows
/// the order of `files`.
fn load_all(files: &[PathBuf], instance: Option<&str>) -> Result<Vec<RecordSet>, ParseError> {
    files
        .par_iter()
        .map(|path| -> Result<RecordSet, ParseError> {
            let set = match instance {
                Some(name) => RecordSet::from_file_with_instance(path, name)?,
                None => RecordSet::from_file_with_instance(path, instance_or_stem(path))?,
            };
            tracing::info!(
                file = %path.display(),
                instance = %set.instance(),
                records = set.len(),
                "Loaded"
            );
            Ok(set)
        })
        .collect()
}

/// Instance label from the file-name convention, falling back to the file
/// stem for files that do not follow it.
fn instance_or_stem(path: &Path) -> String {
    instance_from_path(path).unwrap_or_else(|e| {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::warn!(error = %e, fallback = %stem, "Using file stem as instance");
        stem
    })
}

fn write_records<W: Write>(set: &RecordSet, format: OutputFormat, out: &mut W) -> logsift::Result<()> {
    match format {
        OutputFormat::Text => {
            for record in set {
                writeln!(out, "{record}").map_err(io_error)?;
            }
        }
        OutputFormat::Csv => {
            export::export_records_csv(set, &mut *out)?;
        }
        OutputFormat::Json => {
            export::export_records_json(set.records(), &mut *out)?;
            writeln!(out).map_err(io_error)?;
        }
    }
    Ok(())
}

fn write_groups<W: Write>(rows: &[Groups], format: OutputFormat, out: &mut W) -> logsift::Result<()> {
    match format {
        OutputFormat::Text => {
            for row in rows {
                let fields: Vec<&str> = row
                    .iter()
                    .map(|g| g.as_deref().unwrap_or(constants::ABSENT_GROUP_PLACEHOLDER))
                    .collect();
                writeln!(out, "{}", fields.join("\t")).map_err(io_error)?;
            }
        }
        OutputFormat::Csv => {
            export::export_groups_csv(rows, &mut *out)?;
        }
        OutputFormat::Json => {
            export::export_groups_json(rows, &mut *out)?;
            writeln!(out).map_err(io_error)?;
        }
    }
    Ok(())
}

fn io_error(e: io::Error) -> LogSiftError {
    ExportError::Io { source: e }.into()
}
