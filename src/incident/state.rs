use super::log::{LogEntryKind, OperationLog};
use super::record::IncidentRecord;
use serde::{Deserialize, Serialize};

/// The unit handed to the workflow engine on each invocation.
///
/// The driver owns it across approval pauses. `approval_requested` tells the
/// driver a pause is needed; `record.approval_state()` is what gates execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    record: IncidentRecord,
    #[serde(default)]
    log: OperationLog,
    #[serde(default)]
    approval_requested: bool,
}

impl WorkflowState {
    pub fn new(record: IncidentRecord) -> Self {
        Self {
            record,
            log: OperationLog::new(),
            approval_requested: false,
        }
    }

    pub fn record(&self) -> &IncidentRecord {
        &self.record
    }

    /// Mutable access for the trusted driver (approval / rejection).
    pub fn record_mut(&mut self) -> &mut IncidentRecord {
        &mut self.record
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn approval_requested(&self) -> bool {
        self.approval_requested
    }

    pub fn append(&mut self, kind: LogEntryKind, text: impl Into<String>) {
        self.log.push(kind, text);
    }

    pub(crate) fn log_mut(&mut self) -> &mut OperationLog {
        &mut self.log
    }

    pub(crate) fn request_approval(&mut self) {
        self.approval_requested = true;
    }
}
