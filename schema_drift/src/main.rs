mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, DiffArgs, DiffFormat, InputArgs, ScriptArgs};
use schema_drift::config::{self, LoggingConfig};
use schema_drift::input::{self, RawTable};
use schema_drift::utils::logging;
use schema_drift::{Config, DiffRecord, DialectKind, Direction, DriftEngine, Error, Side};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => Config::default(),
    };

    if cli.verbose > 0 || config.logging.is_none() {
        let level = match cli.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        config.logging.get_or_insert_with(LoggingConfig::default).level = level.to_string();
    }
    logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Diff(args) => diff(config, &args),
        Commands::Script(args) => script(config, &args),
    }
}

fn read_inputs(args: &InputArgs) -> Result<(RawTable, RawTable)> {
    let delimiter = input::parse_delimiter(&args.delimiter)?;
    let source = input::read_csv(&args.source, delimiter)
        .with_context(|| format!("Reading source export {:?}", args.source))?;
    let target = input::read_csv(&args.target, delimiter)
        .with_context(|| format!("Reading target export {:?}", args.target))?;
    Ok((source, target))
}

fn diff(config: Config, args: &DiffArgs) -> Result<()> {
    let engine = DriftEngine::new(config)?;
    let (source, target) = read_inputs(&args.input)?;
    let rows = engine
        .compare(&source, &target)
        .map_err(|err| with_export_path(err, &args.input))?;
    let records: Vec<DiffRecord> = rows.iter().map(DiffRecord::from).collect();

    let mut buffer = Vec::new();
    match args.format {
        DiffFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(&mut buffer);
            writer.write_record([
                "table_name",
                "column_in_source",
                "column_in_target",
                "source_datatype",
                "target_datatype",
                "source_length",
                "target_length",
                "comment",
            ])?;
            for record in &records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        DiffFormat::Json => {
            serde_json::to_writer_pretty(&mut buffer, &records)?;
            buffer.push(b'\n');
        }
    }

    write_output(args.output.as_deref(), &buffer)
}

fn script(config: Config, args: &ScriptArgs) -> Result<()> {
    let direction: Direction = match &args.direction {
        Some(value) => value.parse()?,
        None => config.output.direction,
    };
    let dialect: DialectKind = match &args.dialect {
        Some(value) => value.parse()?,
        None => config.dialect_kind()?,
    };

    let engine = DriftEngine::with_dialect(config, dialect)?;
    let (source, target) = read_inputs(&args.input)?;
    let report = engine
        .run(&source, &target, direction)
        .map_err(|err| with_export_path(err, &args.input))?;

    for unsupported in &report.changes.unsupported {
        eprintln!("warning: {unsupported}");
    }

    if let Some(path) = &args.changes {
        let json = serde_json::to_string_pretty(&report.changes.records())?;
        fs::write(path, json).with_context(|| format!("Writing change descriptors to {path:?}"))?;
    }

    let mut text = report.script.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    write_output(args.output.as_deref(), text.as_bytes())
}

/// Export file a validation error refers to
fn malformed_export<'a>(err: &Error, input: &'a InputArgs) -> Option<&'a PathBuf> {
    match err {
        Error::Validation(validation) => Some(match validation.side() {
            Side::Source => &input.source,
            Side::Target => &input.target,
        }),
        _ => None,
    }
}

fn with_export_path(err: Error, input: &InputArgs) -> anyhow::Error {
    match malformed_export(&err, input).cloned() {
        Some(path) => anyhow::Error::new(err).context(format!("Invalid schema export {path:?}")),
        None => err.into(),
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes).with_context(|| format!("Writing {path:?}")),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_drift::schema::types::Attribute;
    use schema_drift::ValidationError;

    fn input() -> InputArgs {
        InputArgs {
            source: PathBuf::from("source.csv"),
            target: PathBuf::from("target.csv"),
            delimiter: ",".to_string(),
        }
    }

    #[test]
    fn validation_errors_name_the_malformed_file() {
        let input = input();
        let err = Error::Validation(ValidationError::EmptyKey {
            side: Side::Target,
            row: 2,
            column: Attribute::TableName,
        });

        assert_eq!(malformed_export(&err, &input), Some(&input.target));

        let wrapped = with_export_path(err, &input);
        assert_eq!(wrapped.to_string(), "Invalid schema export \"target.csv\"");
        assert!(matches!(
            wrapped.downcast_ref::<Error>(),
            Some(Error::Validation(ValidationError::EmptyKey { side: Side::Target, .. }))
        ));
    }

    #[test]
    fn other_errors_are_passed_through() {
        let err = Error::InputError("bad delimiter".to_string());
        assert_eq!(malformed_export(&err, &input()), None);
    }
}
