pub mod log;
pub mod record;
pub mod state;

pub use log::{LogEntry, LogEntryKind, OperationLog};
pub use record::{ApprovalState, IncidentRecord, Severity};
pub use state::WorkflowState;
