use crate::error::OracleError;
use crate::incident::{IncidentRecord, Severity};
use async_trait::async_trait;

/// Why the oracle is being asked. Backends may use it to pick a system
/// prompt; the prompt text itself carries the actual instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OraclePurpose {
    Diagnosis,
    Plan,
    OperatorQuestion,
}

/// Incident context handed to the oracle alongside the prompt.
#[derive(Debug, Clone)]
pub struct IncidentFacts {
    pub purpose: OraclePurpose,
    pub incident_id: String,
    pub severity: Severity,
    pub raw_logs: String,
    pub diagnosis: Option<String>,
    pub status: Option<String>,
}

impl IncidentFacts {
    pub fn from_record(purpose: OraclePurpose, record: &IncidentRecord) -> Self {
        Self {
            purpose,
            incident_id: record.incident_id().to_string(),
            severity: record.severity(),
            raw_logs: record.raw_logs().to_string(),
            diagnosis: record.diagnosis().map(str::to_string),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Text-generation collaborator used for diagnosis and planning.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Backend identifier (e.g. "groq", "rules").
    fn name(&self) -> &str;

    async fn ask(&self, prompt: &str, facts: &IncidentFacts) -> Result<String, OracleError>;
}
