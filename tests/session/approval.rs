use std::sync::Arc;

use opsswarm::error::SessionError;
use opsswarm::incident::{ApprovalState, LogEntryKind, Severity};

use crate::doubles::{DB_LOGS, RecordingGateway, ScriptedOracle, session};

#[tokio::test]
async fn approve_before_planning_is_refused() {
    let gateway = Arc::new(RecordingGateway::default());
    let mut session = session(Arc::new(ScriptedOracle::new(&[])), gateway.clone());
    session.trigger(DB_LOGS, Severity::Critical);

    let err = session.approve().await.unwrap_err();

    assert!(matches!(err, SessionError::NoProposedAction));
    assert_eq!(
        session.state().unwrap().record().approval_state(),
        ApprovalState::Pending
    );
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn approve_runs_the_plan_once() {
    let gateway = Arc::new(RecordingGateway::default());
    let mut session = session(Arc::new(ScriptedOracle::db_outage()), gateway.clone());
    session.trigger(DB_LOGS, Severity::Critical);
    session.advance().await.unwrap();

    let outcome = session.approve().await.unwrap();

    assert!(outcome.finished());
    assert_eq!(gateway.mutating_calls(), 1);
    let err = session.approve().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::NotAwaitingApproval(ApprovalState::Executed)
    ));
    session.advance().await.unwrap();
    assert_eq!(gateway.mutating_calls(), 1);
}

#[tokio::test]
async fn reject_is_terminal_and_logged() {
    let gateway = Arc::new(RecordingGateway::default());
    let mut session = session(Arc::new(ScriptedOracle::db_outage()), gateway.clone());
    session.trigger(DB_LOGS, Severity::Critical);
    session.advance().await.unwrap();

    session.reject().unwrap();

    let state = session.state().unwrap();
    assert_eq!(state.record().approval_state(), ApprovalState::Rejected);
    assert_eq!(state.log().last().unwrap().kind, LogEntryKind::Notice);
    assert!(matches!(session.advance().await, Err(SessionError::Rejected)));
    assert!(matches!(
        session.reject(),
        Err(SessionError::NotAwaitingApproval(ApprovalState::Rejected))
    ));
    assert_eq!(gateway.mutating_calls(), 0);
}

#[tokio::test]
async fn failed_advance_can_be_retried() {
    let oracle = Arc::new(
        ScriptedOracle::new(&[])
            .then_fail("timeout talking to provider"),
    );
    let mut session = session(oracle, Arc::new(RecordingGateway::default()));
    session.trigger(DB_LOGS, Severity::High);

    let err = session.advance().await.unwrap_err();

    assert!(matches!(err, SessionError::Engine(_)));
    let state = session.state().unwrap();
    assert_eq!(state.record().approval_state(), ApprovalState::Pending);
    assert!(state.log().is_empty());
}

#[tokio::test]
async fn failed_execution_is_retried_by_advance_without_reapproval() {
    let gateway = Arc::new(RecordingGateway::failing_mutations_once("connection reset by peer"));
    let mut session = session(Arc::new(ScriptedOracle::db_outage()), gateway.clone());
    session.trigger(DB_LOGS, Severity::Critical);
    session.advance().await.unwrap();

    let first = session.approve().await.unwrap();
    assert_eq!(first.approval_state, ApprovalState::Approved);
    assert_eq!(
        session.state().unwrap().log().last().unwrap().kind,
        LogEntryKind::ExecutionFailed
    );

    let retry = session.advance().await.unwrap();

    assert!(retry.finished());
    assert_eq!(retry.approval_state, ApprovalState::Executed);
    assert_eq!(gateway.mutating_calls(), 2);
    assert!(matches!(
        session.approve().await,
        Err(SessionError::NotAwaitingApproval(ApprovalState::Executed))
    ));
}

#[tokio::test]
async fn render_shows_plan_and_log() {
    let mut session = session(
        Arc::new(ScriptedOracle::db_outage()),
        Arc::new(RecordingGateway::default()),
    );
    session.trigger(DB_LOGS, Severity::Critical);
    session.advance().await.unwrap();

    let text = session.render();

    assert!(text.contains("Status:    PENDING"));
    assert!(text.contains("Proposed:  Action: restart_resource DB_SHARD_04"));
    assert!(text.contains("Live Status Check: STATUS: OFFLINE"));
    assert!(text.contains("Execution Blocked: Waiting for human approval."));
}
