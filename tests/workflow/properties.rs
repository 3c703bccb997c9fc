use std::sync::Arc;

use opsswarm::error::EngineError;
use opsswarm::incident::{ApprovalState, IncidentRecord, LogEntryKind, Severity, WorkflowState};

use crate::doubles::{
    DB_LOGS, DIAGNOSIS, RESTART_PLAN, RecordingGateway, ScriptedOracle, StalledOracle, engine,
    pending_state,
};

fn planned(id: &str) -> WorkflowState {
    WorkflowState::new(
        IncidentRecord::with_id(id, DB_LOGS, Severity::Critical)
            .with_prior_run(Some(DIAGNOSIS.into()), Some(RESTART_PLAN.into())),
    )
}

#[tokio::test]
async fn no_mutation_without_approval_in_any_state() {
    let mut pending = planned("INC-P");
    let mut rejected = planned("INC-R");
    rejected.record_mut().reject().unwrap();
    let mut bare = pending_state(DB_LOGS);

    for state in [&mut pending, &mut rejected, &mut bare] {
        let gateway = Arc::new(RecordingGateway::default());
        let engine = engine(Arc::new(ScriptedOracle::db_outage()), gateway.clone());
        engine.run(state).await.unwrap();
        engine.execute(state).await.unwrap();
        assert_eq!(
            gateway.mutating_calls(),
            0,
            "{} mutated while {}",
            state.record().incident_id(),
            state.record().approval_state()
        );
    }
}

#[tokio::test]
async fn approved_record_skips_diagnosis_and_planning_entirely() {
    let oracle = Arc::new(ScriptedOracle::new(&["new diagnosis", "Action: fetch_service_logs x"]));
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(oracle.clone(), gateway.clone());
    let mut state = planned("INC-S");
    state.record_mut().approve().unwrap();

    engine.diagnose(&mut state).await.unwrap();
    engine.plan(&mut state).await.unwrap();

    assert_eq!(state.record().diagnosis(), Some(DIAGNOSIS));
    assert_eq!(state.record().proposed_action(), Some(RESTART_PLAN));
    assert!(state.log().is_empty());
    assert!(oracle.asked().is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn executed_record_is_left_alone_on_rerun() {
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    let mut state = planned("INC-I");
    state.record_mut().approve().unwrap();
    engine.run(&mut state).await.unwrap();
    assert_eq!(state.record().approval_state(), ApprovalState::Executed);
    let calls = gateway.calls().len();
    let entries = state.log().len();

    engine.run(&mut state).await.unwrap();
    engine.run(&mut state).await.unwrap();

    assert_eq!(gateway.calls().len(), calls);
    assert_eq!(state.log().len(), entries);
    assert_eq!(state.log().count_kind(LogEntryKind::ExecutionSuccess), 1);
}

#[tokio::test]
async fn oracle_failure_during_diagnosis_changes_nothing() {
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(
        Arc::new(ScriptedOracle::new(&[]).then_fail("503 upstream")),
        gateway.clone(),
    );
    let mut state = pending_state(DB_LOGS);
    let before = state.record().clone();

    let err = engine.run(&mut state).await.unwrap_err();

    assert!(matches!(err, EngineError::OracleUnavailable { stage: "diagnose", .. }));
    assert_eq!(state.record(), &before);
    assert!(state.log().is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn oracle_failure_during_planning_keeps_diagnosis_only() {
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(
        Arc::new(ScriptedOracle::new(&[DIAGNOSIS]).then_fail("rate limited")),
        gateway,
    );
    let mut state = pending_state(DB_LOGS);

    let err = engine.run(&mut state).await.unwrap_err();

    assert!(matches!(err, EngineError::OracleUnavailable { stage: "plan", .. }));
    assert_eq!(state.record().diagnosis(), Some(DIAGNOSIS));
    assert_eq!(state.record().proposed_action(), None);
    assert!(!state.approval_requested());
    assert_eq!(state.record().approval_state(), ApprovalState::Pending);
}

#[tokio::test]
async fn oracle_timeout_is_reported_separately() {
    let engine = engine(Arc::new(StalledOracle), Arc::new(RecordingGateway::default()));
    let mut state = pending_state(DB_LOGS);

    let err = engine.run(&mut state).await.unwrap_err();

    assert!(matches!(err, EngineError::OracleTimeout { stage: "diagnose", .. }));
    assert!(state.record().diagnosis().is_none());
}

#[tokio::test]
async fn prior_partial_run_is_replanned_while_pending() {
    let oracle = Arc::new(ScriptedOracle::new(&[
        "Shard 04 refusing connections",
        "Action: restart_resource DB_SHARD_04",
    ]));
    let engine = engine(oracle.clone(), Arc::new(RecordingGateway::default()));
    let mut state = WorkflowState::new(
        IncidentRecord::with_id("INC-PR", DB_LOGS, Severity::High)
            .with_prior_run(Some("stale".into()), Some("Action: fetch_service_logs old".into())),
    );

    engine.run(&mut state).await.unwrap();

    assert_eq!(state.record().diagnosis(), Some("Shard 04 refusing connections"));
    assert_eq!(
        state.record().proposed_action(),
        Some("Action: restart_resource DB_SHARD_04")
    );
    assert_eq!(oracle.asked().len(), 2);
}

#[tokio::test]
async fn malformed_approval_in_snapshot_cannot_execute() {
    let state = planned("INC-M");
    let mut json = serde_json::to_value(&state).unwrap();
    json["record"]["approval_state"] = serde_json::Value::from("approved");
    let mut restored: WorkflowState = serde_json::from_value(json).unwrap();
    assert_eq!(restored.record().approval_state(), ApprovalState::Pending);

    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    engine.execute(&mut restored).await.unwrap();

    assert_eq!(gateway.mutating_calls(), 0);
}

#[tokio::test]
async fn unrecognized_plan_stays_approved_with_unknown_entry() {
    let gateway = Arc::new(RecordingGateway::default());
    let engine = engine(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    let mut state = WorkflowState::new(
        IncidentRecord::with_id("INC-U", DB_LOGS, Severity::High)
            .with_prior_run(Some(DIAGNOSIS.into()), Some("Escalate to the DBA on call".into())),
    );
    state.record_mut().approve().unwrap();

    engine.run(&mut state).await.unwrap();

    assert_eq!(state.record().approval_state(), ApprovalState::Approved);
    assert_eq!(state.log().count_kind(LogEntryKind::UnknownAction), 1);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn run_owned_returns_updated_state() {
    let engine = engine(
        Arc::new(ScriptedOracle::db_outage()),
        Arc::new(RecordingGateway::default()),
    );

    let state = engine.run_owned(pending_state(DB_LOGS)).await.unwrap();

    assert_eq!(state.record().proposed_action(), Some(RESTART_PLAN));
}
