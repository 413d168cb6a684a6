//! Command handlers for CLI operations
//!
//! - chat: interactive REPL over stdin
//! - ask: one message, one reply
//! - stages: static pipeline metadata

use anyhow::{Context, Result};
use sdk::{EngineError, ErrorExt};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::chat::{ChatApp, GREETING};
use crate::history::DEFAULT_EXPORT_FILE_NAME;
use crate::message_bus::{Event, EventType};
use crate::pipeline::{PipelineReport, PipelineStage, StageId};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// A line typed into the chat REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Submit(String),
    Stages,
    History,
    Export(Option<PathBuf>),
    Reset,
    Quit,
    Unknown(String),
    Blank,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if !trimmed.starts_with('/') {
            return Self::Submit(line.to_string());
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
        match command {
            "/stages" => Self::Stages,
            "/history" => Self::History,
            "/export" => Self::Export(arg.map(PathBuf::from)),
            "/reset" => Self::Reset,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

const REPL_HELP: &str = "Commands: /stages /history /export [path] /reset /quit";

/// One-line summary of a stage, plus one line per grounding source
pub fn format_stage(stage: &PipelineStage) -> String {
    let mut line = format!("{} [{}]", stage.id, stage.status.label());
    let output = stage.status.output();
    if !output.is_empty() {
        line.push_str(": ");
        line.push_str(output);
    }
    for source in stage.status.sources() {
        line.push_str(&format!("\n    - {} ({})", source.title, source.uri));
    }
    line
}

fn print_report(out: &mut impl Write, report: &PipelineReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "VibeBot: {}", report.reply)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(report)?)?,
    }
    Ok(())
}

/// Print the static stage metadata
pub fn handle_stages(out: &mut impl Write, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for id in StageId::ALL {
                writeln!(out, "{}", id)?;
                writeln!(out, "   {}", id.description())?;
            }
        }
        OutputFormat::Json => {
            let stages: Vec<_> = StageId::ALL
                .iter()
                .map(|id| {
                    json!({
                        "id": id.number(),
                        "name": id.name(),
                        "description": id.description(),
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&stages)?)?;
        }
    }
    Ok(())
}

/// Send one message and print the reply, optionally exporting the log
pub async fn handle_ask(
    app: &ChatApp,
    message: &str,
    export: Option<&Path>,
    out: &mut impl Write,
    format: OutputFormat,
) -> Result<()> {
    let report = app.submit(message).await?;
    print_report(out, &report, format)?;

    if let Some(path) = export {
        let written = app
            .export_to_file(path)
            .await
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        tracing::info!("Conversation log written to {}", written.display());
    }
    Ok(())
}

/// Interactive chat until `/quit` or end of input.
///
/// `data_dir` is where `/export` without a path writes.
pub async fn handle_chat<R>(
    app: &ChatApp,
    input: R,
    out: &mut impl Write,
    data_dir: &Path,
    verbose: bool,
    format: OutputFormat,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let progress = if verbose {
        let mut rx = app.message_bus().subscribe(EventType::StageUpdated).await;
        Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Event::StageUpdated(stage) = event {
                    eprintln!("  {} [{}]", stage.id, stage.status.label());
                }
            }
        }))
    } else {
        None
    };

    writeln!(out, "VibeBot: {}", GREETING)?;
    writeln!(out, "{}", REPL_HELP)?;
    out.flush()?;

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Blank => {}
            ReplCommand::Submit(text) => match app.submit(&text).await {
                Ok(report) => print_report(out, &report, format)?,
                Err(EngineError::EmptyMessage) => {}
                Err(e) => writeln!(out, "✗ {} ({})", e, e.user_hint())?,
            },
            ReplCommand::Stages => {
                for stage in app.stages().await {
                    writeln!(out, "{}", format_stage(&stage))?;
                }
            }
            ReplCommand::History => {
                let log = app.log().await;
                if log.is_empty() {
                    writeln!(out, "No messages yet")?;
                }
                for (i, turn) in log.turns().iter().enumerate() {
                    writeln!(out, "{}. you: {}", i + 1, turn.user)?;
                    writeln!(out, "   bot: {}", turn.bot)?;
                }
            }
            ReplCommand::Export(path) => {
                let path = path.unwrap_or_else(|| data_dir.join(DEFAULT_EXPORT_FILE_NAME));
                match app.export_to_file(&path).await {
                    Ok(written) => writeln!(out, "Saved chat history to {}", written.display())?,
                    Err(e) => writeln!(out, "✗ {} ({})", e, e.user_hint())?,
                }
            }
            ReplCommand::Reset => {
                let id = app.reset_session().await;
                tracing::info!(handle = %id, "Session reset from REPL");
                writeln!(out, "Fresh start, bestie. Chat memory cleared.")?;
            }
            ReplCommand::Quit => break,
            ReplCommand::Unknown(command) => {
                writeln!(out, "Unknown command {}. {}", command, REPL_HELP)?;
            }
        }
        out.flush()?;
    }

    if let Some(task) = progress {
        task.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageStatus;
    use sdk::GroundingSource;

    #[test]
    fn test_parse_repl_commands() {
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Blank);
        assert_eq!(
            ReplCommand::parse("hi wassup"),
            ReplCommand::Submit("hi wassup".to_string())
        );
        assert_eq!(ReplCommand::parse("/stages"), ReplCommand::Stages);
        assert_eq!(ReplCommand::parse("/history"), ReplCommand::History);
        assert_eq!(ReplCommand::parse("/export"), ReplCommand::Export(None));
        assert_eq!(
            ReplCommand::parse("/export /tmp/chat.json"),
            ReplCommand::Export(Some(PathBuf::from("/tmp/chat.json")))
        );
        assert_eq!(ReplCommand::parse("/reset"), ReplCommand::Reset);
        assert_eq!(ReplCommand::parse("/quit"), ReplCommand::Quit);
        assert_eq!(
            ReplCommand::parse("/dance"),
            ReplCommand::Unknown("/dance".to_string())
        );
    }

    #[test]
    fn test_format_stage_with_sources() {
        let mut stage = PipelineStage::pending(StageId::Search);
        stage.status = StageStatus::Complete {
            output: "India won".to_string(),
            sources: vec![GroundingSource::new("https://example.com/score", "Scorecard")],
        };

        assert_eq!(
            format_stage(&stage),
            "4. Search Agent [complete]: India won\n    - Scorecard (https://example.com/score)"
        );
    }

    #[test]
    fn test_format_pending_stage() {
        let stage = PipelineStage::pending(StageId::Input);
        assert_eq!(format_stage(&stage), "1. Input Handler [pending]");
    }

    #[test]
    fn test_handle_stages_text() {
        let mut out = Vec::new();
        handle_stages(&mut out, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1. Input Handler"));
        assert!(text.contains("5. Response Generation Agent"));
    }

    #[test]
    fn test_handle_stages_json() {
        let mut out = Vec::new();
        handle_stages(&mut out, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 5);
        assert_eq!(value[2]["name"], "Reasoning Agent");
    }
}
