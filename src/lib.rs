#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod incident;
#[doc(hidden)]
pub mod observability;
pub mod oracle;
pub mod security;
pub mod session;
pub mod ui;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use engine::{EngineSettings, RunOutcome, WorkflowEngine};
pub use error::{OpsError, Result};
pub use incident::{ApprovalState, IncidentRecord, Severity, WorkflowState};
pub use session::{Scenario, Session};
