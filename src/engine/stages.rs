use super::action::{ProposedAction, find_resource_id};
use super::{EngineSettings, Stage, StageOutcome, WorkflowEngine};
use crate::error::{ActionParseError, EngineError};
use crate::gateway::{ReadOnlyGateway, ReadOnlyTool, ToolGateway, ToolName, invoke_bounded};
use crate::incident::{ApprovalState, LogEntryKind, WorkflowState};
use crate::observability::{Observer, ObserverEvent};
use crate::oracle::{IncidentFacts, OraclePurpose, ReasoningOracle, prompts};
use std::time::Instant;

const AWAITING_APPROVAL: &str = "Waiting for human approval.";
const REJECTED_BY_OPERATOR: &str = "Proposed action was rejected by the operator.";
const OPERATOR_CHANNEL: &str = "operator";

/// Everything a stage may use apart from tools. Each stage function is handed
/// the narrowest gateway it needs: none for DIAGNOSE, a [`ReadOnlyGateway`]
/// for PLAN and the full gateway only for EXECUTE.
struct StageContext<'a> {
    oracle: &'a dyn ReasoningOracle,
    observer: &'a dyn Observer,
    settings: &'a EngineSettings,
}

impl WorkflowEngine {
    fn context(&self) -> StageContext<'_> {
        StageContext {
            oracle: self.oracle.as_ref(),
            observer: self.observer.as_ref(),
            settings: &self.settings,
        }
    }

    /// Ask the oracle what failed. Skipped unless the record is `Pending`.
    pub async fn diagnose(&self, state: &mut WorkflowState) -> Result<StageOutcome, EngineError> {
        run_diagnose(&self.context(), state).await
    }

    /// Probe live status, then ask the oracle for one remediation action and
    /// request approval for it. Skipped unless the record is `Pending`.
    pub async fn plan(&self, state: &mut WorkflowState) -> Result<StageOutcome, EngineError> {
        let status_view = ReadOnlyGateway::new(self.gateway.as_ref(), self.settings.gateway_timeout);
        run_plan(&self.context(), &status_view, state).await
    }

    /// Carry out the proposed action, but only for an `Approved` record.
    ///
    /// `Executed` records are left alone so a repeated run cannot remediate
    /// twice. Any other state logs a single blocked entry. Gateway failures
    /// and unparseable proposals are logged and leave the record `Approved`.
    pub async fn execute(&self, state: &mut WorkflowState) -> Result<StageOutcome, EngineError> {
        run_execute(&self.context(), self.gateway.as_ref(), state).await
    }

    /// Answer an operator question about the incident. Never touches the
    /// gateway or the record.
    pub async fn answer_operator(
        &self,
        state: &WorkflowState,
        question: &str,
    ) -> Result<String, EngineError> {
        let facts = IncidentFacts::from_record(OraclePurpose::OperatorQuestion, state.record());
        let prompt = prompts::operator_prompt(question, state.record());
        Ok(self
            .context()
            .consult(OPERATOR_CHANNEL, &prompt, &facts)
            .await?
            .trim()
            .to_string())
    }
}

async fn run_diagnose(
    ctx: &StageContext<'_>,
    state: &mut WorkflowState,
) -> Result<StageOutcome, EngineError> {
    if let Some(skipped) = ctx.skip_unless_pending(Stage::Diagnose, state) {
        return Ok(skipped);
    }
    let started = ctx.stage_start(Stage::Diagnose, state);

    let facts = IncidentFacts::from_record(OraclePurpose::Diagnosis, state.record());
    let prompt = prompts::diagnosis_prompt(state.record().raw_logs());
    let diagnosis = ctx
        .consult(Stage::Diagnose.as_str(), &prompt, &facts)
        .await?
        .trim()
        .to_string();

    state.record_mut().set_diagnosis(diagnosis.clone());
    state.append(LogEntryKind::Diagnosis, diagnosis);

    ctx.stage_end(Stage::Diagnose, state, started);
    Ok(StageOutcome::Ran)
}

async fn run_plan(
    ctx: &StageContext<'_>,
    status_view: &ReadOnlyGateway<'_>,
    state: &mut WorkflowState,
) -> Result<StageOutcome, EngineError> {
    if let Some(skipped) = ctx.skip_unless_pending(Stage::Plan, state) {
        return Ok(skipped);
    }
    let started = ctx.stage_start(Stage::Plan, state);

    let target = state
        .record()
        .diagnosis()
        .and_then(find_resource_id)
        .or_else(|| find_resource_id(state.record().raw_logs()))
        .unwrap_or_else(|| ctx.settings.default_status_target.clone());
    let status = check_status(ctx, status_view, &target).await;

    let facts =
        IncidentFacts::from_record(OraclePurpose::Plan, state.record()).with_status(status.clone());
    let prompt = prompts::plan_prompt(
        state.record().diagnosis().unwrap_or("(no diagnosis available)"),
        &status,
    );
    let proposal = ctx
        .consult(Stage::Plan.as_str(), &prompt, &facts)
        .await?
        .trim()
        .to_string();

    state.record_mut().set_proposed_action(proposal.clone());
    state.append(LogEntryKind::Plan, proposal);
    state.append(LogEntryKind::StatusCheck, status);
    state.request_approval();

    ctx.stage_end(Stage::Plan, state, started);
    Ok(StageOutcome::Ran)
}

async fn run_execute(
    ctx: &StageContext<'_>,
    gateway: &dyn ToolGateway,
    state: &mut WorkflowState,
) -> Result<StageOutcome, EngineError> {
    let incident_id = state.record().incident_id().to_string();
    match state.record().approval_state() {
        ApprovalState::Approved => {}
        ApprovalState::Executed => {
            ctx.observer.record_event(&ObserverEvent::StageSkipped {
                stage: Stage::Execute.as_str(),
                incident_id,
                reason: "action already executed".into(),
            });
            return Ok(StageOutcome::Skipped);
        }
        other => {
            ctx.observer.record_event(&ObserverEvent::ExecutionBlocked {
                incident_id,
                approval_state: other.to_string(),
            });
            let reason = if other == ApprovalState::Rejected {
                REJECTED_BY_OPERATOR
            } else {
                AWAITING_APPROVAL
            };
            state
                .log_mut()
                .push_unless_last(LogEntryKind::ExecutionBlocked, reason);
            return Ok(StageOutcome::Ran);
        }
    }

    let started = ctx.stage_start(Stage::Execute, state);
    let parsed = state
        .record()
        .proposed_action()
        .ok_or(ActionParseError::Missing)
        .and_then(ProposedAction::parse);
    let action = match parsed {
        Ok(action) => action,
        Err(err) => {
            tracing::warn!(incident_id = %incident_id, error = %err, "execute.unknown_action");
            state.append(LogEntryKind::UnknownAction, err.to_string());
            ctx.stage_end(Stage::Execute, state, started);
            return Ok(StageOutcome::Ran);
        }
    };

    let call_started = Instant::now();
    let result = invoke_bounded(
        gateway,
        action.tool,
        &action.arguments(),
        ctx.settings.gateway_timeout,
    )
    .await;
    ctx.observer.record_event(&ObserverEvent::ToolCall {
        tool: action.tool.to_string(),
        duration: call_started.elapsed(),
        success: result.is_ok(),
    });

    match result {
        Ok(output) => match state.record_mut().mark_executed() {
            Ok(()) => {
                state.append(LogEntryKind::ExecutionSuccess, output);
                ctx.observer.record_event(&ObserverEvent::ApprovalTransition {
                    incident_id,
                    from: ApprovalState::Approved.to_string(),
                    to: ApprovalState::Executed.to_string(),
                });
            }
            Err(err) => {
                tracing::error!(incident_id = %incident_id, error = %err, "execute.transition");
                state.append(LogEntryKind::ExecutionFailed, err.to_string());
            }
        },
        Err(err) => {
            tracing::warn!(incident_id = %incident_id, tool = %action.tool, error = %err, "execute.failed");
            state.append(LogEntryKind::ExecutionFailed, err.to_string());
        }
    }

    ctx.stage_end(Stage::Execute, state, started);
    Ok(StageOutcome::Ran)
}

/// Read-only status probe. Failures degrade to an explanatory text so
/// planning can continue without live data.
async fn check_status(ctx: &StageContext<'_>, view: &ReadOnlyGateway<'_>, target: &str) -> String {
    let started = Instant::now();
    let result = view.invoke(ReadOnlyTool::CheckDbStatus, target).await;
    ctx.observer.record_event(&ObserverEvent::ToolCall {
        tool: ToolName::from(ReadOnlyTool::CheckDbStatus).to_string(),
        duration: started.elapsed(),
        success: result.is_ok(),
    });

    result.unwrap_or_else(|err| {
        tracing::warn!(shard = %target, error = %err, "plan.status_check_failed");
        format!("STATUS UNKNOWN ({err})")
    })
}

impl StageContext<'_> {
    async fn consult(
        &self,
        stage: &'static str,
        prompt: &str,
        facts: &IncidentFacts,
    ) -> Result<String, EngineError> {
        let started = Instant::now();
        let limit = self.settings.oracle_timeout;
        let result = match tokio::time::timeout(limit, self.oracle.ask(prompt, facts)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(source)) => Err(EngineError::OracleUnavailable { stage, source }),
            Err(_) => Err(EngineError::OracleTimeout {
                stage,
                secs: limit.as_secs(),
            }),
        };

        self.observer.record_event(&ObserverEvent::OracleCall {
            stage,
            duration: started.elapsed(),
            success: result.is_ok(),
        });
        if let Err(err) = &result {
            self.observer.record_event(&ObserverEvent::Error {
                component: format!("oracle:{}", self.oracle.name()),
                message: err.to_string(),
            });
        }
        result
    }

    fn skip_unless_pending(&self, stage: Stage, state: &WorkflowState) -> Option<StageOutcome> {
        let approval = state.record().approval_state();
        if approval == ApprovalState::Pending {
            return None;
        }
        self.observer.record_event(&ObserverEvent::StageSkipped {
            stage: stage.as_str(),
            incident_id: state.record().incident_id().to_string(),
            reason: format!("approval state is {approval}"),
        });
        Some(StageOutcome::Skipped)
    }

    fn stage_start(&self, stage: Stage, state: &WorkflowState) -> Instant {
        self.observer.record_event(&ObserverEvent::StageStart {
            stage: stage.as_str(),
            incident_id: state.record().incident_id().to_string(),
        });
        Instant::now()
    }

    fn stage_end(&self, stage: Stage, state: &WorkflowState, started: Instant) {
        self.observer.record_event(&ObserverEvent::StageEnd {
            stage: stage.as_str(),
            incident_id: state.record().incident_id().to_string(),
            duration: started.elapsed(),
        });
    }
}
