//! The agent loop and its collaborators.
//!
//! The loop asks a model for the next action, executes tool calls against
//! the session, feeds observations back, and stops on a final answer, the
//! iteration bound, or an unrepairable reply. Model transport lives
//! behind [`ModelProvider`]; the loop itself is synchronous and
//! single-threaded.

pub mod action;
#[cfg(feature = "openai")]
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod runner;

pub use action::{Action, ParsedAction, parse_action};
#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
pub use prompt::{ANALYST_SYSTEM_PROMPT, PromptSet};
pub use provider::{ChatRole, Message, ModelProvider, ScriptedProvider};
pub use runner::{AgentLoop, DEFAULT_MAX_ITERATIONS, LoopConfig};
