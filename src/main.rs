use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;

use parsehl::cli::{CliArgs, OutputFormat, RangeArg, RunMode, SyntaxChoice};
use parsehl::config::EngineConfig;
use parsehl::span::TextSpan;
use parsehl::syntax::{ParseOperation, ParseOutcome, ParseStatus, Syntax, SyntaxRegistry, SyntaxSource};
use parsehl::text::TextSnapshot;

#[derive(Serialize)]
struct JsonReport<'a> {
    syntax: &'a str,
    span: TextSpan,
    #[serde(flatten)]
    outcome: &'a ParseOutcome,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    parsehl::tracing::init(args.verbose);

    let mode = args.into_mode().map_err(|e| anyhow!(e))?;
    let config = EngineConfig::load();
    let registry = SyntaxRegistry::from_config_dir();

    match mode {
        RunMode::ListSyntaxes => list_syntaxes(&registry),
        RunMode::Highlight {
            path,
            syntax,
            range,
            jobs,
            format,
        } => {
            let syntax = resolve_syntax(&registry, &config, &syntax, &path)?;
            highlight(&path, &syntax, range, jobs, format, &config)
        }
    }
}

fn list_syntaxes(registry: &SyntaxRegistry) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for info in registry.list() {
        let source = match info.source {
            SyntaxSource::User => " (user)",
            SyntaxSource::Builtin => "",
        };
        writeln!(
            out,
            "{:<12} {:<12} {}{}",
            info.id,
            info.name,
            info.extensions.join(", "),
            source
        )?;
    }
    Ok(())
}

fn resolve_syntax(
    registry: &SyntaxRegistry,
    config: &EngineConfig,
    choice: &SyntaxChoice,
    path: &Path,
) -> Result<Syntax> {
    match choice {
        SyntaxChoice::File(file) => Syntax::from_path(file)
            .with_context(|| format!("Failed to load syntax file {}", file.display())),
        SyntaxChoice::Id(id) => registry
            .load(id)
            .with_context(|| format!("Failed to load syntax '{}'", id)),
        SyntaxChoice::Detect => match registry.for_path(path) {
            Some(syntax) => Ok(syntax),
            None => {
                tracing::info!(
                    "No syntax matches {}, using default '{}'",
                    path.display(),
                    config.default_syntax
                );
                registry
                    .load(&config.default_syntax)
                    .with_context(|| format!("Failed to load default syntax '{}'", config.default_syntax))
            }
        },
    }
}

fn highlight(
    path: &Path,
    syntax: &Syntax,
    range: RangeArg,
    jobs: Option<usize>,
    format: OutputFormat,
    config: &EngineConfig,
) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = TextSnapshot::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let start = range.start.unwrap_or(0);
    let end = range.end.unwrap_or(text.len());
    let span = TextSpan::new(start, end)
        .ok_or_else(|| anyhow!("Invalid range {}..{}", start, end))?;

    let workers = jobs.unwrap_or_else(|| config.effective_worker_count());
    tracing::debug!(
        "Highlighting {} with syntax '{}' ({} workers, span {})",
        path.display(),
        syntax.id,
        workers,
        span
    );

    let outcome = ParseOperation::new(syntax.definition.clone(), text.clone(), span)?
        .with_worker_count(workers)
        .run()
        .with_context(|| format!("Failed to highlight {}", path.display()))?;

    if outcome.status == ParseStatus::Cancelled {
        tracing::warn!("Highlighting of {} was cancelled", path.display());
    }

    let mut out = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            for range in outcome.result.ranges() {
                writeln!(
                    out,
                    "{}\t{}\t{:?}",
                    range.category,
                    range.span,
                    &text.as_str()[range.span.as_range()]
                )?;
            }
        }
        OutputFormat::Json => {
            let report = JsonReport {
                syntax: &syntax.id,
                span,
                outcome: &outcome,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
