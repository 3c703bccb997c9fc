use crate::error::IncidentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(IncidentError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Approval lifecycle of one incident.
///
/// Valid transitions: `Pending -> Approved`, `Pending -> Rejected`,
/// `Approved -> Executed`. `Executed` and `Rejected` are terminal.
///
/// Deserializing an unrecognized value yields `Pending`, never an approval.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(from = "String", into = "&'static str")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    #[default]
    Pending,
    Approved,
    Rejected,
    Executed,
}

impl ApprovalState {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected) | (Self::Approved, Self::Executed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Executed | Self::Rejected)
    }
}

impl FromStr for ApprovalState {
    type Err = IncidentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "EXECUTED" => Ok(Self::Executed),
            other => Err(IncidentError::MalformedState(other.to_string())),
        }
    }
}

impl From<String> for ApprovalState {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "treating malformed approval state as PENDING");
            Self::Pending
        })
    }
}

/// The structured facts of one incident.
///
/// Identity, logs, severity and intake time are fixed at construction. Only
/// the workflow stages write `diagnosis`/`proposed_action`, and the approval
/// state only moves along [`ApprovalState::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    incident_id: String,
    raw_logs: String,
    severity: Severity,
    created_at: DateTime<Utc>,
    #[serde(default)]
    diagnosis: Option<String>,
    #[serde(default)]
    proposed_action: Option<String>,
    #[serde(default)]
    approval_state: ApprovalState,
}

impl IncidentRecord {
    /// Open a fresh incident with a generated `INC-<year>-<hex>` identifier.
    pub fn new(raw_logs: impl Into<String>, severity: Severity) -> Self {
        Self::with_id(generate_incident_id(), raw_logs, severity)
    }

    pub fn with_id(
        incident_id: impl Into<String>,
        raw_logs: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            incident_id: incident_id.into(),
            raw_logs: raw_logs.into(),
            severity,
            created_at: Utc::now(),
            diagnosis: None,
            proposed_action: None,
            approval_state: ApprovalState::Pending,
        }
    }

    /// Seed analysis carried over from an earlier, interrupted run. The record
    /// stays `Pending`, so the next engine run still diagnoses and plans.
    pub fn with_prior_run(
        mut self,
        diagnosis: Option<String>,
        proposed_action: Option<String>,
    ) -> Self {
        self.diagnosis = diagnosis;
        self.proposed_action = proposed_action;
        self
    }

    pub fn incident_id(&self) -> &str {
        &self.incident_id
    }

    pub fn raw_logs(&self) -> &str {
        &self.raw_logs
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn diagnosis(&self) -> Option<&str> {
        self.diagnosis.as_deref()
    }

    pub fn proposed_action(&self) -> Option<&str> {
        self.proposed_action.as_deref()
    }

    pub fn approval_state(&self) -> ApprovalState {
        self.approval_state
    }

    pub fn is_approved(&self) -> bool {
        self.approval_state == ApprovalState::Approved
    }

    /// Record an explicit human approval. Only a trusted driver calls this.
    pub fn approve(&mut self) -> Result<(), IncidentError> {
        self.transition(ApprovalState::Approved)
    }

    /// Record an explicit human rejection. Terminal.
    pub fn reject(&mut self) -> Result<(), IncidentError> {
        self.transition(ApprovalState::Rejected)
    }

    pub(crate) fn mark_executed(&mut self) -> Result<(), IncidentError> {
        self.transition(ApprovalState::Executed)
    }

    pub(crate) fn set_diagnosis(&mut self, diagnosis: String) {
        self.diagnosis = Some(diagnosis);
    }

    pub(crate) fn set_proposed_action(&mut self, proposed_action: String) {
        self.proposed_action = Some(proposed_action);
    }

    fn transition(&mut self, next: ApprovalState) -> Result<(), IncidentError> {
        if !self.approval_state.can_transition_to(next) {
            return Err(IncidentError::InvalidTransition {
                from: self.approval_state,
                to: next,
            });
        }
        tracing::debug!(
            incident_id = %self.incident_id,
            from = %self.approval_state,
            to = %next,
            "incident.transition"
        );
        self.approval_state = next;
        Ok(())
    }
}

fn generate_incident_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "INC-{}-{}",
        Utc::now().format("%Y"),
        suffix[..6].to_ascii_uppercase()
    )
}
