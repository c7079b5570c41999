//! The agent loop state machine.
//!
//! One run drives: `AwaitingModel` → parse the reply → `AwaitingTool` for
//! a tool call (observe, go around) or `Done` for a final answer. The
//! iteration bound is the only forced termination; a malformed reply gets
//! exactly one repair re-ask before terminating the transcript. Tool
//! failures become observations, not errors - the model reacts to them.

use crate::agent::action::{Action, ParsedAction, parse_action};
use crate::agent::prompt::{
    PromptSet, build_observation_message, build_repair_prompt, build_system_prompt,
    build_user_prompt,
};
use crate::agent::provider::{Message, ModelProvider};
use crate::core::{ActionRecord, Observation, Outcome, Transcript, Turn};
use crate::error::{Error, Result};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default iteration bound.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Loop configuration.
#[derive(Clone)]
pub struct LoopConfig {
    /// Maximum model iterations before forced termination. The single
    /// repair re-ask is on top, so worst-case turn count is
    /// `max_iterations + 1`.
    pub max_iterations: usize,

    /// Cooperative cancellation token, checked at turn boundaries only.
    /// An in-flight tool call always completes.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl LoopConfig {
    /// Creates a config with the given iteration bound.
    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            cancel: None,
        }
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Loop states. One run walks these until `Done`.
enum LoopState {
    /// Waiting on the model's next reply.
    AwaitingModel,

    /// A tool call was parsed and is about to execute.
    AwaitingTool {
        /// Tool name.
        name: String,
        /// Arguments as proposed by the model.
        args: Value,
    },

    /// Terminal.
    Done(Outcome),
}

/// The agent loop: drives a model against a session until it answers.
///
/// # Examples
///
/// ```
/// use dexa_rs::agent::{AgentLoop, LoopConfig, ScriptedProvider};
/// use dexa_rs::core::{Dataset, Scalar};
/// use dexa_rs::session::Session;
///
/// let dataset = Dataset::new(
///     vec!["a".to_string()],
///     vec![vec![Scalar::Int(1)], vec![Scalar::Int(2)]],
/// ).unwrap();
/// let session = Session::new().with_builtin_tools().unwrap().with_dataset(dataset);
///
/// let provider = ScriptedProvider::from_slices(&[
///     r#"{"action": "tool", "tool": "row_count", "args": {}}"#,
///     r#"{"action": "final", "answer": "2 rows"}"#,
/// ]);
///
/// let agent = AgentLoop::new(&provider);
/// let transcript = agent.run(&session, "How many rows?").unwrap();
/// assert_eq!(transcript.answer(), Some("2 rows"));
/// ```
pub struct AgentLoop<'a> {
    provider: &'a dyn ModelProvider,
    prompts: PromptSet,
    config: LoopConfig,
}

impl<'a> AgentLoop<'a> {
    /// Creates a loop with default prompts and configuration.
    #[must_use]
    pub fn new(provider: &'a dyn ModelProvider) -> Self {
        Self {
            provider,
            prompts: PromptSet::defaults(),
            config: LoopConfig::new(DEFAULT_MAX_ITERATIONS),
        }
    }

    /// Replaces the prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Replaces the loop configuration.
    #[must_use]
    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    fn cancelled(&self) -> bool {
        self.config
            .cancel
            .as_ref()
            .is_some_and(|token| token.load(Ordering::SeqCst))
    }

    /// Runs one query to completion.
    ///
    /// Retrieval happens up front: when the session carries a retriever,
    /// the top-k chunks for the query are embedded into the opening user
    /// message. The returned transcript always carries every completed
    /// turn, whatever the outcome; recording it on the session is the
    /// caller's call.
    ///
    /// # Errors
    ///
    /// Returns a hard error only for provider transport failures and
    /// retrieval failures (including a query against an empty index).
    /// Tool failures and parse failures are data in the transcript.
    pub fn run(&self, session: &Session, query: &str) -> Result<Transcript> {
        let system = build_system_prompt(&self.prompts.analyst, session.registry());

        let opening = match session.retriever() {
            Some(retriever) => {
                let chunks = retriever.retrieve(query)?;
                tracing::debug!(retrieved = chunks.len(), "context retrieved");
                build_user_prompt(query, session.dataset(), &chunks)
            }
            None => build_user_prompt(query, session.dataset(), &[]),
        };

        let mut messages = vec![Message::system(system), Message::user(opening)];
        let ctx = session.tool_context();

        let max_iterations = self.config.max_iterations;
        let mut turns: Vec<Turn> = Vec::new();
        let mut model_calls = 0usize;
        let mut repair_used = false;
        let mut state = LoopState::AwaitingModel;

        let outcome = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    // Turn boundary: the only place cancellation is honored
                    if self.cancelled() {
                        tracing::info!("run cancelled at turn boundary");
                        break Outcome::Cancelled;
                    }

                    // The repair re-ask is the single +1 over the bound
                    if model_calls >= max_iterations + usize::from(repair_used) {
                        tracing::warn!(limit = max_iterations, "iteration limit exceeded");
                        break Outcome::IterationLimitExceeded {
                            limit: max_iterations,
                        };
                    }

                    let reply = self.provider.complete(&messages)?;
                    model_calls += 1;
                    messages.push(Message::assistant(reply.clone()));

                    match parse_action(&reply) {
                        ParsedAction::Valid(Action::ToolCall { name, args }) => {
                            LoopState::AwaitingTool { name, args }
                        }
                        ParsedAction::Valid(Action::FinalAnswer { text })
                        | ParsedAction::Prose { text } => {
                            turns.push(Turn {
                                action: ActionRecord::FinalAnswer { text: text.clone() },
                                observation: Observation::text(text.clone()),
                            });
                            LoopState::Done(Outcome::Answer { text })
                        }
                        ParsedAction::Malformed { raw, reason } => {
                            if repair_used {
                                turns.push(Turn {
                                    action: ActionRecord::Malformed { raw: raw.clone() },
                                    observation: Observation::text(
                                        "unparsable after repair attempt",
                                    ),
                                });
                                LoopState::Done(Outcome::MalformedAction { raw })
                            } else {
                                repair_used = true;
                                tracing::debug!(%reason, "malformed action, repairing once");
                                turns.push(Turn {
                                    action: ActionRecord::Malformed { raw },
                                    observation: Observation::text(format!(
                                        "parse error: {reason}"
                                    )),
                                });
                                messages.push(Message::user(build_repair_prompt(&reason)));
                                LoopState::AwaitingModel
                            }
                        }
                    }
                }

                LoopState::AwaitingTool { name, args } => {
                    // Tool errors are observations: the model decides what
                    // to do with a failure, the loop never retries
                    let observation = match session.registry().invoke(&name, &ctx, &args) {
                        Ok(observation) => observation,
                        Err(Error::Tool(tool_err)) => {
                            tracing::debug!(tool = %name, error = %tool_err, "tool failed");
                            Observation::text(format!("error: {tool_err}"))
                        }
                        Err(other) => return Err(other),
                    };

                    messages.push(Message::user(build_observation_message(&observation)));
                    turns.push(Turn {
                        action: ActionRecord::ToolCall { name, args },
                        observation,
                    });
                    LoopState::AwaitingModel
                }

                LoopState::Done(outcome) => break outcome,
            };
        };

        tracing::info!(turns = turns.len(), ?model_calls, "run finished");
        Ok(Transcript::new(query.to_string(), turns, outcome))
    }
}
