use std::time::Duration;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    StageStart {
        stage: &'static str,
        incident_id: String,
    },
    StageSkipped {
        stage: &'static str,
        incident_id: String,
        reason: String,
    },
    StageEnd {
        stage: &'static str,
        incident_id: String,
        duration: Duration,
    },
    OracleCall {
        stage: &'static str,
        duration: Duration,
        success: bool,
    },
    ToolCall {
        tool: String,
        duration: Duration,
        success: bool,
    },
    ExecutionBlocked {
        incident_id: String,
        approval_state: String,
    },
    ApprovalTransition {
        incident_id: String,
        from: String,
        to: String,
    },
    GuardVerdict {
        blocked: bool,
        token: Option<String>,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    RunLatency(Duration),
    LogEntries(u64),
}

/// Core observability trait: implement for any backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
