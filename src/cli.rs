//! Command-line interface for testsieve
//!
//! Provides argument parsing and subcommand handling for the testsieve binary.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::selectors::{
    DefaultPolicy, MatchReason, SelectorError, SelectorList, TestIdentity, Verdict,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given; absence is not an error
pub const DEFAULT_CONFIG_PATH: &str = "testsieve.toml";

/// Decide which tests run from ordered include/exclude selectors
#[derive(Parser)]
#[command(name = "testsieve")]
#[command(version)]
#[command(about = "Decide which tests run from ordered include/exclude selectors")]
#[command(
    long_about = "testsieve reads test identities (Class#method, one per line) and decides \
    for each whether it runs. Selectors are evaluated in order and the first match wins; \
    tests matching no selector get the default verdict."
)]
pub struct Cli {
    /// Path to configuration file [default: testsieve.toml, if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Selector rule, e.g. '!com\.slow\..*' or 'com.example.Test#testX' (repeatable,
    /// evaluated before selectors from the config file; ':path' reads rules from a file)
    #[arg(short, long = "selector", global = true, allow_hyphen_values = true)]
    pub selectors: Vec<String>,

    /// Verdict for tests that match no selector (overrides the config file)
    #[arg(short, long, value_enum, global = true)]
    pub default: Option<DefaultArg>,

    /// Heap limit for the test runner, e.g. 512mb (overrides the config file)
    #[arg(long, global = true)]
    pub max_heap: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the tests that should run (default command)
    Filter {
        /// File listing tests as Class#method (reads stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Emit one JSON object per test with its verdict
        #[arg(long, conflicts_with = "explain")]
        json: bool,

        /// Print every test with its verdict and the deciding selector
        #[arg(long)]
        explain: bool,
    },
    /// Print the selectors in evaluation order
    Explain,
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// `--default` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DefaultArg {
    Include,
    Exclude,
    Inferred,
}

impl From<DefaultArg> for DefaultPolicy {
    fn from(arg: DefaultArg) -> Self {
        match arg {
            DefaultArg::Include => DefaultPolicy::Include,
            DefaultArg::Exclude => DefaultPolicy::Exclude,
            DefaultArg::Inferred => DefaultPolicy::Inferred,
        }
    }
}

/// Load the config named on the command line, or the default file if it exists
///
/// # Errors
/// An explicitly named file must exist; the default file is optional.
pub fn load_config(path: Option<&Path>) -> AppResult<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH),
        None => Ok(Config::default()),
    }
}

/// Counts reported after filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub included: usize,
    pub excluded: usize,
}

/// How `run_filter` writes its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Included tests only, one `Class#method` per line
    Plain,
    /// Every test with verdict and deciding selector
    Explain,
    /// One JSON object per test
    Json,
}

#[derive(Serialize)]
struct JsonVerdict<'a> {
    test: String,
    #[serde(flatten)]
    identity: &'a TestIdentity,
    #[serde(flatten)]
    verdict: Verdict,
}

/// Read `Class#method` lines from `reader` and write the selection to `writer`
///
/// Blank lines are skipped. Tests are written in input order.
///
/// # Errors
/// Fails on the first malformed line (reported with its 1-based line number)
/// or on I/O errors.
pub fn run_filter<R: BufRead, W: Write>(
    selectors: &SelectorList,
    reader: R,
    mut writer: W,
    format: OutputFormat,
    source_name: &str,
) -> AppResult<FilterSummary> {
    let mut summary = FilterSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| AppError::InputRead {
            path: source_name.to_string(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let identity: TestIdentity = line.parse().map_err(|e| {
            let cause = match e {
                SelectorError::InvalidIdentity(message) => message,
                other => other.to_string(),
            };
            SelectorError::InvalidIdentity(format!("{}:{}: {}", source_name, index + 1, cause))
        })?;
        let verdict = selectors.decide_with_reason(&identity);

        if verdict.included {
            summary.included += 1;
        } else {
            summary.excluded += 1;
        }

        let written = match format {
            OutputFormat::Plain if verdict.included => writeln!(writer, "{}", identity),
            OutputFormat::Plain => Ok(()),
            OutputFormat::Explain => writeln!(
                writer,
                "{} {} ({})",
                if verdict.included { "include" } else { "exclude" },
                identity,
                describe_reason(selectors, verdict.reason)
            ),
            OutputFormat::Json => {
                let record = JsonVerdict {
                    test: identity.to_string(),
                    identity: &identity,
                    verdict,
                };
                let json = serde_json::to_string(&record)
                    .map_err(|e| AppError::Output(std::io::Error::other(e)))?;
                writeln!(writer, "{}", json)
            }
        };
        written.map_err(AppError::Output)?;
    }

    writer.flush().map_err(AppError::Output)?;
    Ok(summary)
}

fn describe_reason(selectors: &SelectorList, reason: MatchReason) -> String {
    match reason {
        MatchReason::Selector(index) => format!(
            "selector {}: {}",
            index + 1,
            selectors.selectors()[index].explain()
        ),
        MatchReason::Default => "no selector matched".to_string(),
    }
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r##"# testsieve Configuration
# ========================
#
# Decides which tests run. Each test is identified as Class#method and is
# checked against the selectors below in order; the first selector that
# matches decides. Selectors given with --selector on the command line are
# checked before these.

# ─────────────────────────────────────────────────────────────────────────────
# SELECTION
# ─────────────────────────────────────────────────────────────────────────────
#
# Selector syntax: ["!"] [class-part] ["#" [method-part]]
#
#   - A leading "!" excludes matching tests; otherwise they are included
#   - class-part and method-part are regular expressions, matched anywhere
#     in the name (use ^ and $ to anchor)
#   - An empty part matches anything: "#" includes every test, "!#"
#     excludes every test
#   - ":path/to/file" reads one selector per line from a file
#     (blank lines and lines starting with // are skipped); relative paths
#     are resolved against the directory of this config file

[selection]
selectors = [
    '!com\.example\.slow\.',
    '#^test',
]

# Verdict for tests that match no selector:
#   - "include": run them
#   - "exclude": skip them
#   - "inferred": opposite of the last selector's polarity
default = "exclude"

# ─────────────────────────────────────────────────────────────────────────────
# RUNNER
# ─────────────────────────────────────────────────────────────────────────────

[runner]
# Heap limit for the test process (b, kb, mb, gb, tb; base 1024)
max_heap = "512mb"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# Logs are written to stderr; RUST_LOG overrides this setting
log_level = "info"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::str::FromStr;

    fn selectors(raws: &[&str], default_verdict: bool) -> SelectorList {
        SelectorList::builder()
            .add_raw_selectors(raws)
            .unwrap()
            .default_policy(if default_verdict {
                DefaultPolicy::Include
            } else {
                DefaultPolicy::Exclude
            })
            .build()
    }

    fn filter_to_string(list: &SelectorList, input: &str, format: OutputFormat) -> String {
        let mut out = Vec::new();
        run_filter(list, input.as_bytes(), &mut out, format, "<test>").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_arguments() {
        let cli = Cli::parse_from(["testsieve"]);
        assert!(cli.config.is_none());
        assert!(cli.selectors.is_empty());
        assert!(cli.default.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn repeated_selectors_keep_order() {
        let cli = Cli::parse_from(["testsieve", "-s", "!com.slow", "--selector", "#"]);
        assert_eq!(cli.selectors, vec!["!com.slow", "#"]);
    }

    #[test]
    fn default_and_heap_flags() {
        let cli = Cli::parse_from([
            "testsieve",
            "--default",
            "inferred",
            "--max-heap",
            "1gb",
            "explain",
        ]);
        assert_eq!(cli.default, Some(DefaultArg::Inferred));
        assert_eq!(cli.max_heap.as_deref(), Some("1gb"));
        assert!(matches!(cli.command, Some(Command::Explain)));
    }

    #[test]
    fn filter_subcommand_with_input() {
        let cli = Cli::parse_from(["testsieve", "filter", "-i", "tests.txt", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Filter { input: Some(ref path), json: true, explain: false })
                if path == Path::new("tests.txt")
        ));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["testsieve", "config", "-o", "my-config.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == "my-config.toml"
        ));
    }

    #[test]
    fn template_is_valid_config() {
        let config = Config::from_str(generate_config_template())
            .expect("template should parse and validate");
        assert_eq!(config.selection.selectors().len(), 2);
        assert_eq!(config.selection.default_policy(), DefaultPolicy::Exclude);
    }

    #[test]
    fn filter_plain_prints_included_tests() {
        let list = selectors(&[r"!com\.slow\..*", "#"], true);
        let output = filter_to_string(
            &list,
            "com.slow.Foo#testBar\n\ncom.fast.Foo#testBar\n",
            OutputFormat::Plain,
        );
        assert_eq!(output, "com.fast.Foo#testBar\n");
    }

    #[test]
    fn filter_explain_names_deciding_selector() {
        let list = selectors(&["!com.slow"], true);
        let output = filter_to_string(
            &list,
            "com.slow.Foo#testBar\ncom.fast.Foo#testBar",
            OutputFormat::Explain,
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "exclude com.slow.Foo#testBar (selector 1: exclude class:com.slow method:<any>)",
                "include com.fast.Foo#testBar (no selector matched)",
            ]
        );
    }

    #[test]
    fn filter_json_emits_one_object_per_test() {
        let list = selectors(&["#testBar"], false);
        let output = filter_to_string(&list, "A#testBar\nA#testBaz\n", OutputFormat::Json);
        let records: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["test"], "A#testBar");
        assert_eq!(records[0]["class_name"], "A");
        assert_eq!(records[0]["included"], true);
        assert_eq!(records[0]["reason"]["selector"], 0);
        assert_eq!(records[1]["included"], false);
        assert_eq!(records[1]["reason"], "default");
    }

    #[test]
    fn filter_reports_summary_counts() {
        let list = selectors(&["!#slow"], true);
        let summary = run_filter(
            &list,
            "A#fast\nA#slow\nB#slow\n".as_bytes(),
            std::io::sink(),
            OutputFormat::Plain,
            "<test>",
        )
        .unwrap();
        assert_eq!(
            summary,
            FilterSummary {
                included: 1,
                excluded: 2
            }
        );
    }

    #[test]
    fn filter_rejects_malformed_line_with_position() {
        let list = selectors(&["#"], true);
        let err = run_filter(
            &list,
            "A#ok\nnot-a-test\n".as_bytes(),
            std::io::sink(),
            OutputFormat::Plain,
            "tests.txt",
        )
        .unwrap_err();
        assert!(err.to_string().contains("tests.txt:2"), "got: {}", err);
        assert!(err.to_string().contains("not of the form Class#method"), "got: {}", err);
    }

    #[test]
    fn filter_reports_why_identity_was_rejected() {
        let list = selectors(&["#"], true);
        let err = run_filter(
            &list,
            "A#ok\nB#\n".as_bytes(),
            std::io::sink(),
            OutputFormat::Plain,
            "tests.txt",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid test identity: tests.txt:2: method name is empty (class 'B')"
        );
    }
}
