use thiserror::Error;

use crate::incident::ApprovalState;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `OpsSwarm`.
///
/// Each subsystem defines its own error type. Library callers can match on
/// these to decide recovery strategy; the CLI edge uses `anyhow::Result` for
/// ad-hoc context chains.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    #[error("session: {0}")]
    Session(#[from] SessionError),

    #[error("incident: {0}")]
    Incident(#[from] IncidentError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Reasoning oracle errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("no response from {provider}")]
    EmptyResponse { provider: String },

    #[error("{provider} API key not set. Set OPSSWARM_API_KEY or edit config.toml.")]
    MissingApiKey { provider: String },
}

// ─── Tool gateway errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("tool {tool} execution failed: {message}")]
    Execution { tool: String, message: String },

    #[error("tool {0} is not on the allow-list")]
    UnknownTool(String),

    #[error("tool {tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

// ─── Workflow engine errors ──────────────────────────────────────────────────

/// Failures that abort one engine invocation. The state passed to the engine
/// is left exactly as it was before the failing stage.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("oracle unavailable during {stage}: {source}")]
    OracleUnavailable {
        stage: &'static str,
        #[source]
        source: OracleError,
    },

    #[error("oracle timed out during {stage} after {secs}s")]
    OracleTimeout { stage: &'static str, secs: u64 },
}

// ─── Action grammar errors ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("no proposed action on record")]
    Missing,

    #[error("proposed action does not follow `Action: <tool> <args>`: {0}")]
    Malformed(String),

    #[error("tool {0} is not on the allow-list")]
    UnknownTool(String),

    #[error("tool {0} requires an argument")]
    MissingArgument(String),
}

// ─── Incident lifecycle errors ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncidentError {
    #[error("invalid approval transition {from} -> {to}")]
    InvalidTransition {
        from: ApprovalState,
        to: ApprovalState,
    },

    #[error("malformed approval state: {0}")]
    MalformedState(String),

    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

// ─── Session driver errors ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active incident")]
    NoActiveIncident,

    #[error("incident is not awaiting approval (state: {0})")]
    NotAwaitingApproval(ApprovalState),

    #[error("incident has no proposed action to approve")]
    NoProposedAction,

    #[error("incident was rejected; trigger a new incident to continue")]
    Rejected,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Incident(#[from] IncidentError),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, OpsError>;
