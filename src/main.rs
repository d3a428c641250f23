// src/main.rs
//
// smartquotes: check and/or convert to "smart quotes" in HTML
//
// - With no FILES, reads stdin and writes stdout.
// - With FILES, every document is written to stdout in turn, or back over itself with
//   --modify (via FILE.tmp, renamed into place).
// - Patterns are expanded with glob, for shells that do not do it themselves.
// - If no operation is selected, --all is assumed.
// - A statistics report for the whole run goes to stderr.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use smartquotes::{process_bytes, Checks, Config, Counters, Report};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// CLI flags
#[derive(Debug, Parser)]
#[command(author, version, about = "Check and/or convert to \"smart quotes\" in HTML.")]
struct Cli {
    /// Modify original file(s)
    #[arg(short, long, action = ArgAction::SetTrue)]
    modify: bool,

    /// Character encoding of the input (and output)
    #[arg(long, default_value = "UTF-8")]
    encoding: String,

    /// Enable every operation
    #[arg(short, long, action = ArgAction::SetTrue, help_heading = "Operations")]
    all: bool,

    /// Mark ambiguous quote/apostrophe at end of words
    #[arg(long, action = ArgAction::SetTrue, help_heading = "Operations")]
    apostrophe: bool,

    /// Check for mismatched quotes and brackets
    #[arg(long, action = ArgAction::SetTrue, help_heading = "Operations")]
    mismatch: bool,

    /// Check for quote marks with odd spacing
    #[arg(long, action = ArgAction::SetTrue, help_heading = "Operations")]
    spacing: bool,

    /// Check nested quotations
    #[arg(long, action = ArgAction::SetTrue, help_heading = "Operations")]
    nesting: bool,

    /// Don't try to convert 'straight' quotation marks (this implies they will not be checked at all)
    #[arg(long = "ignore-straight-quotes", action = ArgAction::SetTrue)]
    ignore_straight_quotes: bool,

    /// Warning marker used by most operations
    #[arg(long = "warning-mark", value_name = "MARK", default_value = "#")]
    warning_mark: String,

    /// Don't mark apostrophes at the start of words
    #[arg(long = "skip-leading-apostrophes", action = ArgAction::SetTrue, help_heading = "Options for --apostrophe")]
    skip_leading_apostrophes: bool,

    /// Marker for ambiguous apostrophes
    #[arg(long, value_name = "MARK", default_value = "*", help_heading = "Options for --apostrophe")]
    mark: String,

    /// Allow nested quotations which use the same style of quotation marks
    #[arg(long = "allow-same-quotes", action = ArgAction::SetTrue, help_heading = "Options for --nesting")]
    allow_same_quotes: bool,

    /// Maximum depth of nested quotations/brackets
    #[arg(long = "max-depth", value_name = "N", default_value_t = 2, help_heading = "Options for --nesting")]
    max_depth: usize,

    /// Format of the statistics report
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Don't print the statistics report
    #[arg(long = "no-report", action = ArgAction::SetTrue)]
    no_report: bool,

    /// Increase verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input files (default: stdin)
    files: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let selected = Checks {
            apostrophe: self.apostrophe,
            mismatch: self.mismatch,
            spacing: self.spacing,
            nesting: self.nesting,
        };
        // No operations means all of them.
        let checks = if self.all || !selected.any() {
            Checks::all()
        } else {
            selected
        };

        let config = Config {
            checks,
            mark: self.mark.clone(),
            warn: self.warning_mark.clone(),
            max_depth: self.max_depth,
            allow_same_quotes: self.allow_same_quotes,
            ignore_straight_quotes: self.ignore_straight_quotes,
            skip_leading_apostrophes: self.skip_leading_apostrophes,
            ..Config::default()
        };
        Ok(config.with_encoding_label(&self.encoding)?)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Expand glob patterns. An argument naming an existing file is taken literally, and a
/// pattern matching nothing is kept as a literal path so the error names the file the
/// user asked for.
fn resolve_files(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let literal = PathBuf::from(pattern);
        if literal.exists() {
            files.push(literal);
            continue;
        }
        let matches = glob::glob(pattern)
            .map(|paths| paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect::<Vec<_>>())
            .unwrap_or_default();
        if matches.is_empty() {
            files.push(literal);
        } else {
            files.extend(matches);
        }
    }
    files
}

fn check_file(config: &Config, path: &Path, modify: bool, stdout: &mut impl Write) -> Result<Counters> {
    log::info!("checking {}", path.display());
    let src = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let (out, counters) =
        process_bytes(config, &src).with_context(|| format!("Failed to check: {}", path.display()))?;

    if modify {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &out).with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {} with {}", path.display(), tmp.display()))?;
    } else {
        stdout.write_all(&out)?;
    }
    Ok(counters)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("arguments: {cli:?}");

    let config = cli.config()?;

    let stdout = io::stdout();
    let mut stdout = io::BufWriter::new(stdout.lock());
    let mut total = Counters::default();

    if cli.files.is_empty() {
        if cli.modify {
            bail!("--modify requires at least one filename");
        }
        let mut src = Vec::new();
        io::stdin().read_to_end(&mut src).context("Failed to read stdin")?;
        let (out, counters) = process_bytes(&config, &src)?;
        stdout.write_all(&out)?;
        total += counters;
    } else {
        for path in resolve_files(&cli.files) {
            total += check_file(&config, &path, cli.modify, &mut stdout)?;
        }
    }
    stdout.flush()?;

    if !cli.no_report {
        let report = Report::new(total, config.max_depth);
        match cli.report {
            ReportFormat::Text => eprintln!("\n{report}"),
            ReportFormat::Json => eprintln!("{}", report.to_json()?),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_operations_means_all() {
        let cli = Cli::parse_from(["smartquotes"]);
        assert_eq!(cli.config().unwrap().checks, Checks::all());
    }

    #[test]
    fn selected_operations_only() {
        let cli = Cli::parse_from(["smartquotes", "--spacing", "--nesting"]);
        let checks = cli.config().unwrap().checks;
        assert!(checks.spacing && checks.nesting);
        assert!(!checks.apostrophe && !checks.mismatch);

        let cli = Cli::parse_from(["smartquotes", "--spacing", "--all"]);
        assert_eq!(cli.config().unwrap().checks, Checks::all());
    }

    #[test]
    fn options_flow_into_config() {
        let cli = Cli::parse_from([
            "smartquotes",
            "--mark",
            "@",
            "--warning-mark",
            "!",
            "--max-depth",
            "4",
            "--allow-same-quotes",
            "--skip-leading-apostrophes",
            "--ignore-straight-quotes",
            "--encoding",
            "latin1",
        ]);
        let config = cli.config().unwrap();
        assert_eq!(config.mark, "@");
        assert_eq!(config.warn, "!");
        assert_eq!(config.max_depth, 4);
        assert!(config.allow_same_quotes);
        assert!(config.skip_leading_apostrophes);
        assert!(config.ignore_straight_quotes);
        assert_eq!(config.encoding.name(), "windows-1252");
    }

    #[test]
    fn existing_file_is_not_a_pattern() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let bracketed = temp_dir.path().join("a[1].html");
        fs::write(&bracketed, "x").unwrap();
        fs::write(temp_dir.path().join("a1.html"), "y").unwrap();

        let arg = bracketed.to_string_lossy().into_owned();
        assert_eq!(resolve_files(&[arg]), vec![bracketed]);

        let pattern = temp_dir.path().join("a?.html").to_string_lossy().into_owned();
        assert_eq!(resolve_files(&[pattern]), vec![temp_dir.path().join("a1.html")]);
    }

    #[test]
    fn bad_encoding_is_an_error() {
        let cli = Cli::parse_from(["smartquotes", "--encoding", "nope"]);
        assert!(cli.config().is_err());
    }
}
