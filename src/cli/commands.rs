use crate::incident::Severity;
use crate::session::Scenario;
use clap::{Parser, Subcommand};

/// `OpsSwarm` - approval-gated incident-response agent.
#[derive(Parser, Debug)]
#[command(name = "opsswarm")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Diagnose incidents, propose a fix, execute only after approval.", long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trigger an incident and walk it through diagnosis, approval and remediation
    Run {
        /// Built-in incident to simulate
        #[arg(short, long, value_enum, default_value_t = Scenario::DbConnectionFailure)]
        scenario: Scenario,

        /// Read incident logs from a file instead of a scenario
        #[arg(long)]
        logs_file: Option<String>,

        /// Incident severity (LOW, MEDIUM, HIGH, CRITICAL)
        #[arg(long)]
        severity: Option<Severity>,

        /// Approve the proposed action without prompting
        #[arg(long)]
        auto_approve: bool,

        /// Print the final workflow state as JSON
        #[arg(long)]
        json: bool,

        /// Use the rule-based oracle; no API key or network needed
        #[arg(long)]
        offline: bool,
    },

    /// Check operator text against the safety guard
    Guard {
        /// Text to classify
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List built-in incident scenarios
    Scenarios,

    /// Show the effective configuration
    Config,
}
