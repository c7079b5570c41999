//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{ActionRecord, Chunk, Outcome, Transcript};
use crate::error::Error;
use crate::storage::StoreStats;
use crate::tools::ToolRegistry;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Serializes any value as pretty JSON, falling back to an error object.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StoreStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("dexa-rs Status\n");
            output.push_str("==============\n\n");
            let _ = writeln!(output, "  Indexes:    {}", stats.blob_count);
            let _ = writeln!(output, "  Stored:     {} bytes", stats.total_bytes);
            let _ = writeln!(output, "  Schema:     v{}", stats.schema_version);
            if let Some(size) = stats.db_size {
                let _ = writeln!(output, "  DB size:    {size} bytes");
            }
            output
        }
        OutputFormat::Json => format_json(stats),
    }
}

/// Formats the list of persisted index names.
#[must_use]
pub fn format_index_list(names: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if names.is_empty() {
                return "No indexes found.\n".to_string();
            }
            let mut output = String::from("Indexes:\n");
            for name in names {
                let _ = writeln!(output, "  {name}");
            }
            output
        }
        OutputFormat::Json => format_json(&names),
    }
}

/// Formats search hits with scores.
#[must_use]
pub fn format_search_results(hits: &[(&Chunk, f32)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if hits.is_empty() {
                return "No results.\n".to_string();
            }
            let mut output = String::new();
            for (rank, (chunk, score)) in hits.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "{:>2}. [{score:.3}] {}@{}",
                    rank + 1,
                    chunk.source(),
                    chunk.offset()
                );
                let preview = chunk.preview(160).replace('\n', " ");
                let _ = writeln!(output, "    {preview}");
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Hit<'a> {
                source: &'a str,
                offset: usize,
                score: f32,
                text: &'a str,
            }
            let hits: Vec<Hit<'_>> = hits
                .iter()
                .map(|(chunk, score)| Hit {
                    source: chunk.source(),
                    offset: chunk.offset(),
                    score: *score,
                    text: chunk.text(),
                })
                .collect();
            format_json(&hits)
        }
    }
}

/// Formats the tool catalog.
#[must_use]
pub fn format_tool_list(registry: &ToolRegistry, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if registry.is_empty() {
                return "No tools registered.\n".to_string();
            }
            let mut output = String::from("Tools:\n");
            for tool in registry.iter() {
                let _ = writeln!(output, "  {:<16} {}", tool.name(), tool.description());
                let params = tool.schema().params();
                if !params.is_empty() {
                    for param in params {
                        let _ = writeln!(
                            output,
                            "    - {} ({}{})  {}",
                            param.name,
                            param.kind.type_name(),
                            if param.required { ", required" } else { "" },
                            param.description
                        );
                    }
                }
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ToolInfo<'a> {
                name: &'a str,
                description: &'a str,
                schema: serde_json::Value,
            }
            let tools: Vec<ToolInfo<'_>> = registry
                .iter()
                .map(|tool| ToolInfo {
                    name: tool.name(),
                    description: tool.description(),
                    schema: tool.schema().to_json(),
                })
                .collect();
            format_json(&tools)
        }
    }
}

/// Formats a finished transcript: the thought process turn by turn, then
/// the final answer or terminal marker.
#[must_use]
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "--- Agent Thought Process ---\n");

            for (i, turn) in transcript.turns.iter().enumerate() {
                match &turn.action {
                    ActionRecord::ToolCall { name, args } => {
                        let _ = writeln!(output, "[{}] Action: {name} {args}", i + 1);
                    }
                    ActionRecord::FinalAnswer { .. } => {
                        let _ = writeln!(output, "[{}] Action: final answer", i + 1);
                    }
                    ActionRecord::Malformed { .. } => {
                        let _ = writeln!(output, "[{}] Action: (malformed)", i + 1);
                    }
                }
                let _ = writeln!(output, "    Observation: {}\n", turn.observation.render());
            }

            match &transcript.outcome {
                Outcome::Answer { text } => {
                    let _ = writeln!(output, "--- Final Answer ---");
                    let _ = writeln!(output, "{text}");
                }
                _ => {
                    let _ = writeln!(output, "--- No Answer ---");
                    let _ = writeln!(output, "{}", transcript.final_observation().render());
                }
            }
            output
        }
        OutputFormat::Json => format_json(transcript),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorBody {
                error: String,
            }
            format_json(&ErrorBody {
                error: error.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Observation, Turn};
    use crate::tools::register_builtin_tools;
    use serde_json::json;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("anything"), OutputFormat::Text);
    }

    #[test]
    fn test_format_status() {
        let stats = StoreStats {
            blob_count: 2,
            total_bytes: 1024,
            schema_version: 1,
            db_size: Some(4096),
        };
        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Indexes:    2"));
        assert!(text.contains("4096"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"blob_count\": 2"));
    }

    #[test]
    fn test_format_index_list() {
        assert!(format_index_list(&[], OutputFormat::Text).contains("No indexes"));

        let names = vec!["docs".to_string(), "reports".to_string()];
        let text = format_index_list(&names, OutputFormat::Text);
        assert!(text.contains("docs"));
        assert!(text.contains("reports"));
    }

    #[test]
    fn test_format_search_results() {
        let chunk = Chunk::new("notes.txt", 42, "glucose thresholds\nand more".to_string());
        let hits = vec![(&chunk, 0.87f32)];

        let text = format_search_results(&hits, OutputFormat::Text);
        assert!(text.contains("[0.870]"));
        assert!(text.contains("notes.txt@42"));
        // Newlines flattened in previews
        assert!(text.contains("glucose thresholds and more"));

        let json = format_search_results(&hits, OutputFormat::Json);
        assert!(json.contains("\"offset\": 42"));
    }

    #[test]
    fn test_format_tool_list() {
        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry).unwrap();

        let text = format_tool_list(&registry, OutputFormat::Text);
        assert!(text.contains("row_count"));
        assert!(text.contains("histogram"));
        assert!(text.contains("column (string, required)"));
    }

    #[test]
    fn test_format_transcript_text() {
        let transcript = Transcript::new(
            "How many rows?".to_string(),
            vec![
                Turn {
                    action: ActionRecord::ToolCall {
                        name: "row_count".to_string(),
                        args: json!({}),
                    },
                    observation: Observation::text("5"),
                },
                Turn {
                    action: ActionRecord::FinalAnswer {
                        text: "5 rows".to_string(),
                    },
                    observation: Observation::text("5 rows"),
                },
            ],
            Outcome::Answer {
                text: "5 rows".to_string(),
            },
        );

        let text = format_transcript(&transcript, OutputFormat::Text);
        assert!(text.contains("Agent Thought Process"));
        assert!(text.contains("Action: row_count"));
        assert!(text.contains("Observation: 5"));
        assert!(text.contains("--- Final Answer ---"));
        assert!(text.contains("5 rows"));
    }

    #[test]
    fn test_format_transcript_limit_exceeded() {
        let transcript = Transcript::new(
            "q".to_string(),
            vec![],
            Outcome::IterationLimitExceeded { limit: 3 },
        );
        let text = format_transcript(&transcript, OutputFormat::Text);
        assert!(text.contains("No Answer"));
        assert!(text.contains("limit of 3"));
    }

    #[test]
    fn test_format_error() {
        let err = Error::Config {
            message: "bad".to_string(),
        };
        assert_eq!(format_error(&err, OutputFormat::Text), "configuration error: bad");
        assert!(format_error(&err, OutputFormat::Json).contains("\"error\""));
    }
}
