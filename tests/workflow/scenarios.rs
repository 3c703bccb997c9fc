use std::sync::Arc;

use opsswarm::engine::{Stage, StageOutcome};
use opsswarm::incident::{ApprovalState, LogEntryKind};
use opsswarm::oracle::OraclePurpose;
use opsswarm::security::{GuardVerdict, REJECTION_MESSAGE};

use crate::doubles::{
    DB_LOGS, DIAGNOSIS, RESTART_PLAN, RecordingGateway, ScriptedOracle, StalledGateway, engine,
    pending_state, session,
};

#[tokio::test]
async fn first_run_diagnoses_plans_and_pauses() {
    let oracle = Arc::new(ScriptedOracle::db_outage());
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(oracle.clone(), gateway.clone());
    let mut state = pending_state(DB_LOGS);

    let outcome = engine.run(&mut state).await.unwrap();

    let record = state.record();
    assert_eq!(record.diagnosis(), Some(DIAGNOSIS));
    assert!(record.proposed_action().unwrap().starts_with("Action: "));
    assert_eq!(record.approval_state(), ApprovalState::Pending);
    assert!(state.log().len() >= 2);
    assert!(state.approval_requested());
    assert!(outcome.awaiting_approval);
    assert!(outcome.ran(Stage::Diagnose) && outcome.ran(Stage::Plan));
    assert_eq!(
        oracle.asked(),
        vec![OraclePurpose::Diagnosis, OraclePurpose::Plan]
    );
    assert_eq!(gateway.mutating_calls(), 0);
    assert_eq!(
        state.log().last().map(|e| e.kind),
        Some(LogEntryKind::ExecutionBlocked)
    );
}

#[tokio::test]
async fn approved_rerun_executes_once_without_replanning() {
    let oracle = Arc::new(ScriptedOracle::db_outage());
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(oracle.clone(), gateway.clone());
    let mut state = pending_state(DB_LOGS);
    engine.run(&mut state).await.unwrap();
    let diagnosis = state.record().diagnosis().map(str::to_string);
    let proposal = state.record().proposed_action().map(str::to_string);
    let calls_before = gateway.calls().len();

    state.record_mut().approve().unwrap();
    let outcome = engine.run(&mut state).await.unwrap();

    assert_eq!(state.record().diagnosis().map(str::to_string), diagnosis);
    assert_eq!(state.record().proposed_action().map(str::to_string), proposal);
    let new_calls = &gateway.calls()[calls_before..];
    assert_eq!(new_calls.len(), 1);
    assert_eq!(new_calls[0].tool, "restart_resource");
    assert_eq!(
        new_calls[0].arguments.get("resource_id").map(String::as_str),
        Some("DB_SHARD_04")
    );
    assert_eq!(state.record().approval_state(), ApprovalState::Executed);
    assert_eq!(outcome.diagnose, StageOutcome::Skipped);
    assert_eq!(outcome.plan, StageOutcome::Skipped);
    assert!(outcome.finished());
    assert_eq!(oracle.asked().len(), 2);
}

#[tokio::test]
async fn execute_without_approval_logs_one_block() {
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    let mut state = pending_state(DB_LOGS);
    let entries_before = state.log().len();

    engine.execute(&mut state).await.unwrap();

    assert_eq!(state.log().len(), entries_before + 1);
    assert_eq!(
        state.log().last().map(|e| e.kind),
        Some(LogEntryKind::ExecutionBlocked)
    );
    assert_eq!(state.record().approval_state(), ApprovalState::Pending);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn destructive_operator_text_is_refused() {
    let gateway = Arc::new(RecordingGateway::default());
    let oracle = Arc::new(ScriptedOracle::new(&[]));
    let mut session = session(oracle.clone(), gateway.clone());
    session.trigger(DB_LOGS, opsswarm::Severity::Critical);

    let verdict = session
        .operator_message("please drop the database")
        .await
        .unwrap();

    assert!(matches!(verdict, GuardVerdict::Blocked { ref token } if token == "drop"));
    let state = session.state().unwrap();
    let last = state.log().last().unwrap();
    assert_eq!(last.kind, LogEntryKind::OperatorBlocked);
    assert_eq!(last.text, REJECTION_MESSAGE);
    assert!(gateway.calls().is_empty());
    assert!(oracle.asked().is_empty());
}

#[tokio::test]
async fn gateway_failure_keeps_approval() {
    let gateway = Arc::new(RecordingGateway::failing_mutations("connection reset by peer"));
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    let mut state = opsswarm::WorkflowState::new(
        opsswarm::IncidentRecord::with_id("INC-E", DB_LOGS, opsswarm::Severity::High)
            .with_prior_run(Some(DIAGNOSIS.into()), Some(RESTART_PLAN.into())),
    );
    state.record_mut().approve().unwrap();
    let entries_before = state.log().len();

    engine.run(&mut state).await.unwrap();

    assert_eq!(state.record().approval_state(), ApprovalState::Approved);
    assert_eq!(state.log().len(), entries_before + 1);
    let last = state.log().last().unwrap();
    assert_eq!(last.kind, LogEntryKind::ExecutionFailed);
    assert!(last.text.contains("connection reset by peer"));
    assert_eq!(gateway.mutating_calls(), 1);
}

#[tokio::test]
async fn gateway_timeout_is_logged_and_keeps_approval() {
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), Arc::new(StalledGateway));
    let mut state = opsswarm::WorkflowState::new(
        opsswarm::IncidentRecord::with_id("INC-T", DB_LOGS, opsswarm::Severity::High)
            .with_prior_run(Some(DIAGNOSIS.into()), Some(RESTART_PLAN.into())),
    );
    state.record_mut().approve().unwrap();

    let outcome = engine.run(&mut state).await.unwrap();

    assert_eq!(outcome.execute, StageOutcome::Ran);
    assert_eq!(state.record().approval_state(), ApprovalState::Approved);
    let last = state.log().last().unwrap();
    assert_eq!(last.kind, LogEntryKind::ExecutionFailed);
    assert!(last.text.contains("restart_resource"));
    assert!(last.text.contains("timed out"));
}

#[tokio::test]
async fn approved_state_left_by_gateway_failure_executes_on_next_run() {
    let gateway = Arc::new(RecordingGateway::failing_mutations_once("connection reset by peer"));
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    let mut state = opsswarm::WorkflowState::new(
        opsswarm::IncidentRecord::with_id("INC-RT", DB_LOGS, opsswarm::Severity::High)
            .with_prior_run(Some(DIAGNOSIS.into()), Some(RESTART_PLAN.into())),
    );
    state.record_mut().approve().unwrap();
    engine.run(&mut state).await.unwrap();
    assert_eq!(state.record().approval_state(), ApprovalState::Approved);

    engine.run(&mut state).await.unwrap();

    assert_eq!(state.record().approval_state(), ApprovalState::Executed);
    assert_eq!(gateway.mutating_calls(), 2);
    assert_eq!(state.log().count_kind(LogEntryKind::ExecutionFailed), 1);
    assert_eq!(state.log().count_kind(LogEntryKind::ExecutionSuccess), 1);
}
