//! Model output parsing into a closed action set.
//!
//! Everything downstream of the model switches on a tagged variant, never
//! on raw text: a reply is a valid action (tool call or final answer),
//! plain prose (treated as a final answer), or a malformed action attempt
//! (something JSON-shaped that fails to parse).

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// A valid action proposed by the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Invoke a tool with JSON arguments.
    ToolCall {
        /// Tool name.
        name: String,
        /// Arguments object (or null for no-argument tools).
        args: Value,
    },

    /// Stop with a final answer.
    FinalAnswer {
        /// The answer text.
        text: String,
    },
}

/// Outcome of parsing one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAction {
    /// A well-formed action.
    Valid(Action),

    /// No action attempt at all; the text is the answer.
    Prose {
        /// The raw reply.
        text: String,
    },

    /// An action attempt that could not be parsed.
    Malformed {
        /// The raw reply.
        raw: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Wire format the model is instructed to emit.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum WireAction {
    /// `{"action": "tool", "tool": "...", "args": {...}}`
    Tool {
        tool: String,
        #[serde(default)]
        args: Value,
    },

    /// `{"action": "final", "answer": "..."}`
    Final { answer: String },
}

/// Matches a fenced code block, optionally tagged `json`.
///
/// The pattern is a valid literal; construction cannot fail.
#[allow(clippy::unwrap_used)]
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap())
}

/// Extracts the JSON candidate from a reply, if it contains one.
///
/// Prefers a fenced block; otherwise takes the outermost brace span.
fn extract_json(raw: &str) -> Option<&str> {
    if let Some(captures) = fence_regex().captures(raw) {
        let inner = captures.get(1)?.as_str();
        if inner.contains('{') {
            return extract_json(inner).or(Some(inner));
        }
        return Some(inner);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parses one model reply into the closed action set.
///
/// A reply with no brace-delimited span anywhere is prose. A reply that
/// attempts an action but does not decode into the wire format is
/// malformed; whether that earns a repair re-ask is the loop's decision.
///
/// # Examples
///
/// ```
/// use dexa_rs::agent::{Action, ParsedAction, parse_action};
///
/// let parsed = parse_action(r#"{"action": "final", "answer": "5 rows"}"#);
/// assert_eq!(
///     parsed,
///     ParsedAction::Valid(Action::FinalAnswer { text: "5 rows".to_string() })
/// );
/// ```
#[must_use]
pub fn parse_action(raw: &str) -> ParsedAction {
    let Some(candidate) = extract_json(raw) else {
        // An opening brace with no close is still an action attempt
        if raw.contains('{') {
            return ParsedAction::Malformed {
                raw: raw.to_string(),
                reason: "unbalanced JSON braces".to_string(),
            };
        }
        return ParsedAction::Prose {
            text: raw.trim().to_string(),
        };
    };

    match serde_json::from_str::<WireAction>(candidate) {
        Ok(WireAction::Tool { tool, args }) => ParsedAction::Valid(Action::ToolCall {
            name: tool,
            args,
        }),
        Ok(WireAction::Final { answer }) => {
            ParsedAction::Valid(Action::FinalAnswer { text: answer })
        }
        Err(e) => ParsedAction::Malformed {
            raw: raw.to_string(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_call() {
        let parsed = parse_action(r#"{"action": "tool", "tool": "row_count", "args": {}}"#);
        assert_eq!(
            parsed,
            ParsedAction::Valid(Action::ToolCall {
                name: "row_count".to_string(),
                args: json!({}),
            })
        );
    }

    #[test]
    fn test_parse_tool_call_without_args() {
        let parsed = parse_action(r#"{"action": "tool", "tool": "columns"}"#);
        assert_eq!(
            parsed,
            ParsedAction::Valid(Action::ToolCall {
                name: "columns".to_string(),
                args: Value::Null,
            })
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let parsed = parse_action(r#"{"action": "final", "answer": "5 rows"}"#);
        assert_eq!(
            parsed,
            ParsedAction::Valid(Action::FinalAnswer {
                text: "5 rows".to_string()
            })
        );
    }

    #[test]
    fn test_parse_fenced_action() {
        let raw = "Here is my action:\n```json\n{\"action\": \"tool\", \"tool\": \"head\", \"args\": {\"n\": 3}}\n```";
        let parsed = parse_action(raw);
        assert_eq!(
            parsed,
            ParsedAction::Valid(Action::ToolCall {
                name: "head".to_string(),
                args: json!({"n": 3}),
            })
        );
    }

    #[test]
    fn test_parse_action_with_surrounding_prose() {
        let raw = r#"I will count the rows now. {"action": "tool", "tool": "row_count", "args": {}} Let me know."#;
        let parsed = parse_action(raw);
        assert!(matches!(parsed, ParsedAction::Valid(Action::ToolCall { .. })));
    }

    #[test]
    fn test_parse_prose() {
        let parsed = parse_action("The dataset has five rows in total.");
        assert_eq!(
            parsed,
            ParsedAction::Prose {
                text: "The dataset has five rows in total.".to_string()
            }
        );
    }

    #[test]
    fn test_parse_malformed_json() {
        let parsed = parse_action(r#"{"action": "tool", "tool": }"#);
        assert!(matches!(parsed, ParsedAction::Malformed { .. }));
    }

    #[test]
    fn test_parse_unknown_action_kind() {
        let parsed = parse_action(r#"{"action": "think", "thought": "hmm"}"#);
        assert!(matches!(parsed, ParsedAction::Malformed { .. }));
    }

    #[test]
    fn test_parse_missing_required_field() {
        let parsed = parse_action(r#"{"action": "final"}"#);
        assert!(matches!(parsed, ParsedAction::Malformed { .. }));
    }

    #[test]
    fn test_parse_empty_reply_is_prose() {
        let parsed = parse_action("");
        assert_eq!(parsed, ParsedAction::Prose { text: String::new() });
    }

    #[test]
    fn test_parse_unclosed_brace_is_malformed() {
        let parsed = parse_action("{not json");
        assert!(matches!(parsed, ParsedAction::Malformed { .. }));
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(raw in ".{0,500}") {
            let _ = parse_action(&raw);
        }

        #[test]
        fn prop_parse_deterministic(raw in ".{0,200}") {
            prop_assert_eq!(parse_action(&raw), parse_action(&raw));
        }

        #[test]
        fn prop_braceless_input_is_prose(text in "[^{}`]{0,200}") {
            prop_assert!(
                matches!(parse_action(&text), ParsedAction::Prose { .. }),
                "braceless input should parse as prose"
            );
        }
    }
}
