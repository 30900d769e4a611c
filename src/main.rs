//! testsieve command-line entry point
//!
//! Reads test identities, applies the configured selectors, and prints the
//! tests that should run.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use testsieve::cli::{self, Cli, Command, OutputFormat};
use testsieve::error::{AppError, AppResult};
use testsieve::telemetry;
use testsieve::units::parse_bytes;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    // Load configuration
    let config = cli::load_config(cli.config.as_deref())?;

    // Initialize telemetry
    telemetry::init(&config.observability.log_level);

    run(&cli, &config).map_err(|e| {
        tracing::error!(error = %e, "Test selection failed");
        e.into()
    })
}

fn run(cli: &Cli, config: &testsieve::config::Config) -> AppResult<()> {
    let selectors =
        config.selector_list(&cli.selectors, cli.default.map(Into::into))?;

    let max_heap = match cli.max_heap.as_deref() {
        Some(text) => Some(parse_bytes(text)?),
        None => config.runner.max_heap_bytes()?,
    };

    tracing::info!(
        selectors = selectors.len(),
        default_include = selectors.default_verdict(),
        max_heap_bytes = ?max_heap,
        "Built test selector list"
    );

    match &cli.command {
        Some(Command::Explain) => {
            let mut stdout = io::stdout().lock();
            for line in selectors.explain() {
                writeln!(stdout, "{}", line).map_err(AppError::Output)?;
            }
        }
        Some(Command::Filter {
            input,
            json,
            explain,
        }) => {
            let format = if *json {
                OutputFormat::Json
            } else if *explain {
                OutputFormat::Explain
            } else {
                OutputFormat::Plain
            };
            filter(&selectors, input.as_deref(), format)?;
        }
        None => filter(&selectors, None, OutputFormat::Plain)?,
        Some(Command::Config { .. }) => {}
    }

    Ok(())
}

fn filter(
    selectors: &testsieve::selectors::SelectorList,
    input: Option<&std::path::Path>,
    format: OutputFormat,
) -> AppResult<()> {
    let stdout = io::stdout().lock();

    let summary = match input {
        Some(path) => {
            let path_display = path.display().to_string();
            let file = File::open(path).map_err(|source| AppError::InputRead {
                path: path_display.clone(),
                source,
            })?;
            cli::run_filter(selectors, BufReader::new(file), stdout, format, &path_display)?
        }
        None => cli::run_filter(selectors, io::stdin().lock(), stdout, format, "<stdin>")?,
    };

    tracing::info!(
        included = summary.included,
        excluded = summary.excluded,
        "Test selection complete"
    );

    Ok(())
}
