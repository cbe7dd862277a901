//! Command-line argument parsing for the `parsehl` binary
//!
//! Supports:
//! - Highlighting a file (whole or a byte range)
//! - Choosing a syntax by id or YAML path
//! - Listing available syntaxes

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Extract syntax highlight ranges from a file
#[derive(Parser, Debug)]
#[command(name = "parsehl", version, about = "Extract syntax highlight ranges from a file")]
pub struct CliArgs {
    /// File to highlight
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Syntax id (e.g. "rust") or path to a syntax YAML file
    #[arg(short, long, value_name = "SYNTAX")]
    pub syntax: Option<String>,

    /// Byte range to parse, as START..END (either side may be omitted)
    #[arg(short, long, value_name = "RANGE")]
    pub range: Option<String>,

    /// Number of extractor worker threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List available syntaxes and exit
    #[arg(long)]
    pub list_syntaxes: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `category start..end text` line per range
    Text,
    /// JSON object of category → spans
    Json,
}

/// How the syntax was chosen on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxChoice {
    /// Detect from the file extension, falling back to the configured default
    Detect,
    /// Syntax id from the registry
    Id(String),
    /// Standalone syntax YAML file
    File(PathBuf),
}

/// Byte range from `--range`; `None` ends mean buffer start / end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeArg {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum RunMode {
    ListSyntaxes,
    Highlight {
        path: PathBuf,
        syntax: SyntaxChoice,
        range: RangeArg,
        jobs: Option<usize>,
        format: OutputFormat,
    },
}

impl CliArgs {
    /// Convert parsed CLI args into a run mode
    pub fn into_mode(self) -> Result<RunMode, String> {
        if self.list_syntaxes {
            return Ok(RunMode::ListSyntaxes);
        }

        let path = self
            .path
            .ok_or_else(|| "No input file given (see --help)".to_string())?;

        let syntax = match self.syntax {
            None => SyntaxChoice::Detect,
            Some(s) if s.ends_with(".yaml") || s.ends_with(".yml") => {
                SyntaxChoice::File(PathBuf::from(s))
            }
            Some(s) => SyntaxChoice::Id(s),
        };

        let range = match self.range.as_deref() {
            Some(raw) => parse_range(raw)?,
            None => RangeArg::default(),
        };

        if self.jobs == Some(0) {
            return Err("--jobs must be at least 1".to_string());
        }

        Ok(RunMode::Highlight {
            path,
            syntax,
            range,
            jobs: self.jobs,
            format: self.format,
        })
    }
}

/// Parse `START..END`, `START..`, `..END` or `..`
pub fn parse_range(raw: &str) -> Result<RangeArg, String> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| format!("Invalid range {:?}, expected START..END", raw))?;

    let parse_bound = |s: &str| -> Result<Option<usize>, String> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse()
            .map(Some)
            .map_err(|_| format!("Invalid range bound {:?}", s))
    };

    let range = RangeArg {
        start: parse_bound(start)?,
        end: parse_bound(end)?,
    };

    if let (Some(s), Some(e)) = (range.start, range.end) {
        if s > e {
            return Err(format!("Range start {} is after end {}", s, e));
        }
    }

    Ok(range)
}
