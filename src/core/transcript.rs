//! Agent interaction transcripts.
//!
//! A transcript is the ordered record of one agent interaction: the original
//! query, the (action, observation) turns in execution order, and the
//! terminal outcome. The loop produces it; the caller decides whether to
//! keep or discard it.

use crate::core::Observation;
use serde::{Deserialize, Serialize};

/// What the model proposed on one turn, as recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionRecord {
    /// A tool invocation.
    ToolCall {
        /// Tool name.
        name: String,
        /// Arguments as supplied by the model.
        args: serde_json::Value,
    },

    /// A final answer.
    FinalAnswer {
        /// The answer text.
        text: String,
    },

    /// Output that attempted an action but could not be parsed.
    Malformed {
        /// The raw model output.
        raw: String,
    },
}

/// One (action, observation) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// What the model proposed.
    pub action: ActionRecord,

    /// What came back.
    pub observation: Observation,
}

/// How the interaction ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The model produced a final answer.
    Answer {
        /// The answer text.
        text: String,
    },

    /// The iteration bound was exhausted before a final answer.
    IterationLimitExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// The model's output stayed unparsable after the single repair attempt.
    MalformedAction {
        /// The raw output of the failed second attempt.
        raw: String,
    },

    /// The caller abandoned the interaction at a turn boundary.
    Cancelled,
}

/// The ordered record of one agent interaction.
///
/// Turns are strictly ordered by execution time; the outcome is the
/// terminal marker. A limit-exceeded or malformed outcome still carries
/// every turn that completed, so no work is silently lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// The original user query.
    pub query: String,

    /// The turns, in execution order.
    pub turns: Vec<Turn>,

    /// The terminal outcome.
    pub outcome: Outcome,
}

impl Transcript {
    /// Creates a transcript.
    #[must_use]
    pub const fn new(query: String, turns: Vec<Turn>, outcome: Outcome) -> Self {
        Self {
            query,
            turns,
            outcome,
        }
    }

    /// Returns the final answer text, if the interaction produced one.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Answer { text } => Some(text),
            _ => None,
        }
    }

    /// Returns the final observation: the answer, or the terminal marker
    /// for interactions that ended without one.
    #[must_use]
    pub fn final_observation(&self) -> Observation {
        match &self.outcome {
            Outcome::Answer { text } => Observation::text(text.clone()),
            Outcome::IterationLimitExceeded { limit } => {
                Observation::text(format!("[iteration limit of {limit} exceeded]"))
            }
            Outcome::MalformedAction { .. } => {
                Observation::text("[model output unparsable after repair attempt]")
            }
            Outcome::Cancelled => Observation::text("[cancelled]"),
        }
    }

    /// Returns the number of turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_turn_transcript() -> Transcript {
        Transcript::new(
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
        )
    }

    #[test]
    fn test_transcript_answer() {
        let t = two_turn_transcript();
        assert_eq!(t.answer(), Some("5 rows"));
        assert_eq!(t.turn_count(), 2);
    }

    #[test]
    fn test_final_observation_answer() {
        let t = two_turn_transcript();
        assert_eq!(t.final_observation(), Observation::text("5 rows"));
    }

    #[test]
    fn test_final_observation_limit_marker() {
        let t = Transcript::new(
            "q".to_string(),
            vec![],
            Outcome::IterationLimitExceeded { limit: 3 },
        );
        assert!(t.answer().is_none());
        assert!(t.final_observation().render().contains("limit of 3"));
    }

    #[test]
    fn test_final_observation_malformed_marker() {
        let t = Transcript::new(
            "q".to_string(),
            vec![],
            Outcome::MalformedAction {
                raw: "{nope".to_string(),
            },
        );
        assert!(t.final_observation().render().contains("unparsable"));
    }

    #[test]
    fn test_transcript_serialization() {
        let t = two_turn_transcript();
        let json = serde_json::to_string(&t).unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
