pub mod dispatch;
pub mod report;

pub use dispatch::{RunOptions, dispatch, run_incident};
