use std::time::Duration;

use thiserror::Error;

/// Raised by an agent only when even its deterministic fallback is out of
/// reach.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} agent could not produce a result: {reason}")]
    Unavailable { agent: &'static str, reason: String },
    #[error("plan for {destination} is unusable: {reason}")]
    InvalidPlan { destination: String, reason: String },
}

impl AgentError {
    pub fn unavailable(agent: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            agent,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("required {agent} agent failed")]
    RequiredAgent {
        agent: &'static str,
        #[source]
        source: AgentError,
    },
    #[error("request exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

impl OrchestratorError {
    pub fn required(agent: &'static str) -> impl FnOnce(AgentError) -> Self {
        move |source| Self::RequiredAgent { agent, source }
    }
}
