//! Tool observations.
//!
//! An observation is what a tool invocation produced: plain text, a
//! structured JSON value, or a reference to a chart file written to disk.
//! Observations are fed back to the model verbatim as the next message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    /// Plain text result.
    Text {
        /// The text.
        text: String,
    },

    /// Structured result rendered as JSON for the model.
    Structured {
        /// The structured value.
        value: serde_json::Value,
    },

    /// A chart file was written. The path is the declared side effect;
    /// the summary is what the model sees.
    Chart {
        /// Path of the written chart file.
        path: PathBuf,
        /// Text summary of the chart content.
        summary: String,
    },
}

impl Observation {
    /// Creates a text observation.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a structured observation.
    #[must_use]
    pub const fn structured(value: serde_json::Value) -> Self {
        Self::Structured { value }
    }

    /// Creates a chart observation.
    #[must_use]
    pub fn chart(path: PathBuf, summary: impl Into<String>) -> Self {
        Self::Chart {
            path,
            summary: summary.into(),
        }
    }

    /// Renders the observation as the text the model will see.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Structured { value } => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Chart { path, summary } => {
                format!("{summary}\n[chart written to {}]", path.display())
            }
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
