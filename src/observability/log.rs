use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{info, warn};

/// Log-based observer: uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::StageStart { stage, incident_id } => {
                info!(stage = %stage, incident_id = %incident_id, "stage.start");
            }
            ObserverEvent::StageSkipped {
                stage,
                incident_id,
                reason,
            } => {
                info!(stage = %stage, incident_id = %incident_id, reason = %reason, "stage.skipped");
            }
            ObserverEvent::StageEnd {
                stage,
                incident_id,
                duration,
            } => {
                info!(
                    stage = %stage,
                    incident_id = %incident_id,
                    duration_ms = millis(*duration),
                    "stage.end"
                );
            }
            ObserverEvent::OracleCall {
                stage,
                duration,
                success,
            } => {
                info!(stage = %stage, duration_ms = millis(*duration), success = success, "oracle.call");
            }
            ObserverEvent::ToolCall {
                tool,
                duration,
                success,
            } => {
                info!(tool = %tool, duration_ms = millis(*duration), success = success, "tool.call");
            }
            ObserverEvent::ExecutionBlocked {
                incident_id,
                approval_state,
            } => {
                warn!(incident_id = %incident_id, approval_state = %approval_state, "execution.blocked");
            }
            ObserverEvent::ApprovalTransition {
                incident_id,
                from,
                to,
            } => {
                info!(incident_id = %incident_id, from = %from, to = %to, "approval.transition");
            }
            ObserverEvent::GuardVerdict { blocked, token } => {
                info!(blocked = blocked, token = ?token, "guard.verdict");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::RunLatency(d) => {
                info!(latency_ms = millis(*d), "metric.run_latency");
            }
            ObserverMetric::LogEntries(n) => {
                info!(entries = n, "metric.log_entries");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
