use anyhow::Result;
use clap::Parser;
use skysnap::cli::{Cli, OutputFormat};
use skysnap::config::WatchConfig;
use skysnap::csv_output::CsvOutput;
use skysnap::json_output::JsonOutput;
use skysnap::parser::SessionParser;
use skysnap::sink::TracingSink;
use skysnap::snapshot::Category;
use skysnap::summary;
use skysnap::watch::{run_pass, PassOutcome, SessionSource};
use std::thread;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; --debug raises everything to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with command-line overrides
fn load_config(args: &Cli) -> Result<WatchConfig> {
    let mut config = match &args.config {
        Some(path) => WatchConfig::from_file(path)?,
        None => WatchConfig::default(),
    };

    if let Some(dir) = &args.dir {
        config.session_dir = Some(dir.clone());
    }
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if args.no_summary {
        config.summary = false;
    }

    config.validate()?;
    Ok(config)
}

/// Pick the session source from FILE or the configured directory
fn session_source(args: &Cli, config: &WatchConfig) -> Result<SessionSource> {
    match (&args.file, &args.dir) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both FILE and --dir. Choose one.");
        }
        (Some(file), None) => Ok(SessionSource::File(file.clone())),
        (None, _) => match &config.session_dir {
            Some(dir) => Ok(SessionSource::Directory {
                dir: dir.clone(),
                extension: config.extension.clone(),
            }),
            None => anyhow::bail!(
                "Must specify either a session FILE or --dir. Usage: skysnap FILE or skysnap --dir DIR"
            ),
        },
    }
}

/// JSON envelope for the snapshot of a finished pass
fn envelope(parser: &SessionParser, outcome: &PassOutcome) -> JsonOutput {
    let output = JsonOutput::new(parser.snapshot().clone()).with_report(&outcome.report);
    match &outcome.path {
        Some(path) => output.with_source(path),
        None => output,
    }
}

/// Print the snapshot of a finished pass in the requested format
fn print_snapshot(
    parser: &SessionParser,
    outcome: &PassOutcome,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = parser.snapshot();
    match format {
        OutputFormat::Json => {
            println!("{}", envelope(parser, outcome).to_json()?);
        }
        OutputFormat::Csv => {
            print!("{}", CsvOutput::from_snapshot(snapshot).to_csv());
        }
        OutputFormat::Text => {
            println!("=== Session Snapshot ===");
            match &outcome.path {
                Some(path) => println!("Source: {}", path.display()),
                None => println!("Source: (none)"),
            }
            println!(
                "Lines: {}  Records: {}  Errors: {}",
                outcome.report.lines_read,
                outcome.report.records_decoded,
                outcome.report.errors.len()
            );
            println!("─────────────────────────────────────────");
            for category in Category::ALL {
                let latest = snapshot
                    .latest(category)
                    .map(|r| summary::describe(&r))
                    .unwrap_or_else(|| format!("{}: -", summary::label(category)));
                println!("{:>4}  {}", snapshot.len(category), latest);
            }
            println!("─────────────────────────────────────────");
        }
    }
    Ok(())
}

/// One pass: parse, print, and write the envelope if configured
fn pass(
    parser: &mut SessionParser,
    source: &SessionSource,
    config: &WatchConfig,
    format: OutputFormat,
) -> Result<()> {
    let outcome = run_pass(parser, source, &mut TracingSink)?;
    print_snapshot(parser, &outcome, format)?;

    if let Some(output_path) = &config.output {
        envelope(parser, &outcome).write_to(output_path)?;
        tracing::debug!(path = %output_path.display(), "snapshot written");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let source = session_source(&args, &config)?;
    let mut parser = SessionParser::new().with_summary(config.summary);

    if !args.watch {
        return pass(&mut parser, &source, &config, args.format);
    }

    tracing::info!(interval_secs = config.interval_secs, "watching {:?}", source);
    loop {
        if let Err(e) = pass(&mut parser, &source, &config, args.format) {
            tracing::error!("snapshot pass failed: {:#}", e);
        }
        thread::sleep(config.interval());
    }
}
