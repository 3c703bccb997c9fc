//! Approval-gated incident workflow: DIAGNOSE → PLAN → EXECUTE.
//!
//! The engine never waits for a human. A run that reaches the approval
//! boundary returns, and the driver re-invokes it once the record has been
//! approved. Stages that already did their work for an approved record are
//! skipped, so a resumed run goes straight to execution.

pub mod action;
mod stages;

pub use action::{ProposedAction, find_resource_id};

use crate::config::Config;
use crate::error::EngineError;
use crate::gateway::ToolGateway;
use crate::incident::{ApprovalState, WorkflowState};
use crate::observability::{Observer, ObserverMetric};
use crate::oracle::ReasoningOracle;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Diagnose,
    Plan,
    Execute,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Ran,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub oracle_timeout: Duration,
    pub gateway_timeout: Duration,
    /// Shard probed by the PLAN status check when no identifier can be found
    /// in the diagnosis or logs.
    pub default_status_target: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(60),
            gateway_timeout: Duration::from_secs(15),
            default_status_target: "DB_SHARD_04".into(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            oracle_timeout: Duration::from_secs(config.oracle.timeout_secs),
            gateway_timeout: Duration::from_secs(config.gateway.timeout_secs),
            default_status_target: config.gateway.status_check_target.clone(),
        }
    }
}

/// What one [`WorkflowEngine::run`] did, for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub diagnose: StageOutcome,
    pub plan: StageOutcome,
    pub execute: StageOutcome,
    pub approval_state: ApprovalState,
    /// The run stopped at the approval boundary with a plan on record.
    pub awaiting_approval: bool,
}

impl RunOutcome {
    pub fn ran(&self, stage: Stage) -> bool {
        let outcome = match stage {
            Stage::Diagnose => self.diagnose,
            Stage::Plan => self.plan,
            Stage::Execute => self.execute,
        };
        outcome == StageOutcome::Ran
    }

    pub fn finished(&self) -> bool {
        self.approval_state.is_terminal()
    }
}

pub struct WorkflowEngine {
    oracle: Arc<dyn ReasoningOracle>,
    gateway: Arc<dyn ToolGateway>,
    observer: Arc<dyn Observer>,
    settings: EngineSettings,
}

impl WorkflowEngine {
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        gateway: Arc<dyn ToolGateway>,
        observer: Arc<dyn Observer>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            oracle,
            gateway,
            observer,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn oracle(&self) -> &dyn ReasoningOracle {
        self.oracle.as_ref()
    }

    /// Run every stage in order against `state`.
    ///
    /// On error the state keeps whatever the stages before the failing one
    /// wrote; the failing stage itself writes nothing.
    pub async fn run(&self, state: &mut WorkflowState) -> Result<RunOutcome, EngineError> {
        let started = Instant::now();
        tracing::info!(
            incident_id = %state.record().incident_id(),
            approval_state = %state.record().approval_state(),
            "workflow.run"
        );

        let diagnose = self.diagnose(state).await?;
        let plan = self.plan(state).await?;
        let execute = self.execute(state).await?;

        let approval_state = state.record().approval_state();
        self.observer
            .record_metric(&ObserverMetric::RunLatency(started.elapsed()));
        self.observer.record_metric(&ObserverMetric::LogEntries(
            u64::try_from(state.log().len()).unwrap_or(u64::MAX),
        ));

        Ok(RunOutcome {
            diagnose,
            plan,
            execute,
            approval_state,
            awaiting_approval: approval_state == ApprovalState::Pending
                && state.approval_requested()
                && state.record().proposed_action().is_some(),
        })
    }

    /// Consuming variant of [`run`](Self::run).
    pub async fn run_owned(&self, mut state: WorkflowState) -> Result<WorkflowState, EngineError> {
        self.run(&mut state).await?;
        Ok(state)
    }
}
