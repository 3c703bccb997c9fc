use crate::config::Config;
use crate::engine::{EngineSettings, RunOutcome, WorkflowEngine};
use crate::error::SessionError;
use crate::gateway::SimulatedGateway;
use crate::incident::{ApprovalState, IncidentRecord, LogEntryKind, Severity, WorkflowState};
use crate::observability::{Observer, ObserverEvent, create_observer};
use crate::oracle::create_oracle;
use crate::security::{GuardVerdict, REJECTION_MESSAGE, SafetyGuard};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

const ESCALATION_NOTICE: &str = "Plan rejected. Escalating to human SRE team.";

/// Owns one incident's [`WorkflowState`] across approval pauses.
///
/// This is the only place that writes `Approved` or `Rejected`. Triggering a
/// new incident discards the previous state entirely.
pub struct Session {
    engine: WorkflowEngine,
    guard: SafetyGuard,
    observer: Arc<dyn Observer>,
    state: Option<WorkflowState>,
}

impl Session {
    pub fn new(engine: WorkflowEngine, guard: SafetyGuard, observer: Arc<dyn Observer>) -> Self {
        Self {
            engine,
            guard,
            observer,
            state: None,
        }
    }

    /// Wire a session from config: simulated infrastructure, the configured
    /// oracle (or the rule-based one when `offline`), and the guard denylist.
    pub fn from_config(config: &Config, offline: bool) -> Self {
        let observer = create_observer(&config.observability);
        let gateway = SimulatedGateway::new()
            .with_restart_delay(Duration::from_millis(config.gateway.restart_delay_ms));
        let engine = WorkflowEngine::new(
            create_oracle(config, offline),
            Arc::new(gateway),
            Arc::clone(&observer),
            EngineSettings::from_config(config),
        );
        let guard = SafetyGuard::new().with_extra_tokens(&config.guard.extra_denylist);
        Self::new(engine, guard, observer)
    }

    /// Open a fresh incident. Nothing runs until [`advance`](Self::advance).
    pub fn trigger(&mut self, raw_logs: impl Into<String>, severity: Severity) -> &WorkflowState {
        self.open(IncidentRecord::new(raw_logs, severity))
    }

    pub fn open(&mut self, record: IncidentRecord) -> &WorkflowState {
        tracing::info!(
            incident_id = %record.incident_id(),
            severity = %record.severity(),
            "incident.triggered"
        );
        self.state.insert(WorkflowState::new(record))
    }

    /// Run the engine on the current incident.
    pub async fn advance(&mut self) -> Result<RunOutcome, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveIncident)?;
        if state.record().approval_state() == ApprovalState::Rejected {
            return Err(SessionError::Rejected);
        }
        Ok(self.engine.run(state).await?)
    }

    /// Approve the proposed action and resume the workflow to execute it.
    pub async fn approve(&mut self) -> Result<RunOutcome, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveIncident)?;
        let current = state.record().approval_state();
        if current != ApprovalState::Pending {
            return Err(SessionError::NotAwaitingApproval(current));
        }
        if state.record().proposed_action().is_none() {
            return Err(SessionError::NoProposedAction);
        }

        state.record_mut().approve()?;
        self.observer.record_event(&ObserverEvent::ApprovalTransition {
            incident_id: state.record().incident_id().to_string(),
            from: current.to_string(),
            to: ApprovalState::Approved.to_string(),
        });
        self.advance().await
    }

    /// Reject the proposed action. Terminal for this incident.
    pub fn reject(&mut self) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveIncident)?;
        let current = state.record().approval_state();
        if current != ApprovalState::Pending {
            return Err(SessionError::NotAwaitingApproval(current));
        }

        state.record_mut().reject()?;
        state.append(LogEntryKind::Notice, ESCALATION_NOTICE);
        self.observer.record_event(&ObserverEvent::ApprovalTransition {
            incident_id: state.record().incident_id().to_string(),
            from: current.to_string(),
            to: ApprovalState::Rejected.to_string(),
        });
        Ok(())
    }

    /// Manual operator channel. Destructive requests are refused outright;
    /// anything else is answered by the oracle. Never reaches the gateway.
    pub async fn operator_message(&mut self, text: &str) -> Result<GuardVerdict, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveIncident)?;

        let verdict = self.guard.classify(text);
        self.observer.record_event(&ObserverEvent::GuardVerdict {
            blocked: verdict.is_blocked(),
            token: match &verdict {
                GuardVerdict::Blocked { token } => Some(token.clone()),
                GuardVerdict::Allowed => None,
            },
        });

        if verdict.is_blocked() {
            state.append(LogEntryKind::OperatorBlocked, REJECTION_MESSAGE);
            return Ok(verdict);
        }

        state.append(LogEntryKind::OperatorMessage, text.trim());
        let reply = self.engine.answer_operator(state, text.trim()).await?;
        state.append(LogEntryKind::OracleReply, reply);
        Ok(verdict)
    }

    pub fn state(&self) -> Option<&WorkflowState> {
        self.state.as_ref()
    }

    pub fn guard(&self) -> &SafetyGuard {
        &self.guard
    }

    /// Plain-text dashboard of the current incident.
    pub fn render(&self) -> String {
        let Some(state) = &self.state else {
            return "Systems operational. No active incident.\n".to_string();
        };
        let record = state.record();

        let mut out = String::new();
        let _ = writeln!(out, "Incident:  {}", record.incident_id());
        let _ = writeln!(out, "Severity:  {}", record.severity());
        let _ = writeln!(out, "Status:    {}", record.approval_state());
        let _ = writeln!(
            out,
            "Diagnosis: {}",
            record.diagnosis().unwrap_or("(pending)")
        );
        if let Some(action) = record.proposed_action() {
            let _ = writeln!(out, "Proposed:  {action}");
        }
        out.push('\n');
        for entry in state.log() {
            let _ = writeln!(out, "{entry}");
        }
        out
    }
}
