use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::engine::RunOutcome;
use crate::incident::{ApprovalState, LogEntryKind, Severity};
use crate::security::SafetyGuard;
use crate::session::{Scenario, Session};
use crate::ui::style as ui;
use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use strum::IntoEnumIterator;

use super::report::{render_config, render_incident, render_verdict};

pub struct RunOptions {
    pub scenario: Scenario,
    pub logs_file: Option<String>,
    pub severity: Option<Severity>,
    pub auto_approve: bool,
    pub json: bool,
    pub offline: bool,
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Run {
            scenario,
            logs_file,
            severity,
            auto_approve,
            json,
            offline,
        } => {
            run_incident(
                &config,
                RunOptions {
                    scenario,
                    logs_file,
                    severity,
                    auto_approve,
                    json,
                    offline,
                },
            )
            .await
        }
        Commands::Guard { text } => {
            let guard = SafetyGuard::new().with_extra_tokens(&config.guard.extra_denylist);
            println!("{}", render_verdict(&guard.classify(&text.join(" "))));
            Ok(())
        }
        Commands::Scenarios => {
            for scenario in Scenario::iter() {
                println!(
                    "{} {} {}",
                    ui::accent("•"),
                    ui::header(scenario),
                    ui::dim(format!("({})", scenario.severity()))
                );
                for line in scenario.logs().lines() {
                    println!("    {}", ui::dim(line.trim()));
                }
            }
            Ok(())
        }
        Commands::Config => {
            println!("{}", render_config(&config));
            Ok(())
        }
    }
}

async fn load_logs(options: &RunOptions) -> Result<(String, Severity)> {
    match &options.logs_file {
        Some(path) => {
            let expanded = shellexpand::tilde(path).into_owned();
            let logs = tokio::fs::read_to_string(&expanded)
                .await
                .with_context(|| format!("Failed to read logs file {expanded}"))?;
            anyhow::ensure!(!logs.trim().is_empty(), "Logs file {expanded} is empty");
            Ok((logs, options.severity.unwrap_or(Severity::High)))
        }
        None => Ok((
            options.scenario.logs().to_string(),
            options.severity.unwrap_or(options.scenario.severity()),
        )),
    }
}

enum Choice {
    Approve,
    Reject,
    Ask(String),
    Retry,
    Leave,
}

const APPROVAL_CHOICES: [&str; 4] = [
    "Approve & execute",
    "Reject plan",
    "Ask the agent",
    "Leave pending",
];
const RETRY_CHOICES: [&str; 3] = ["Retry execution", "Ask the agent", "Leave approved"];

fn prompt_choice(retry: bool) -> Result<Choice> {
    let (prompt, options): (&str, &[&str]) = if retry {
        ("  Execution failed", &RETRY_CHOICES[..])
    } else {
        ("  Human approval required", &APPROVAL_CHOICES[..])
    };
    let picked = options[Select::new()
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?];
    Ok(match picked {
        "Approve & execute" => Choice::Approve,
        "Reject plan" => Choice::Reject,
        "Retry execution" => Choice::Retry,
        "Ask the agent" => Choice::Ask(
            Input::new()
                .with_prompt("  Message to the agent")
                .interact_text()?,
        ),
        _ => Choice::Leave,
    })
}

/// An approved incident whose last execution attempt failed at the gateway.
fn awaiting_retry(session: &Session) -> bool {
    session.state().is_some_and(|s| {
        s.record().approval_state() == ApprovalState::Approved
            && s.log().last().is_some_and(|e| e.kind == LogEntryKind::ExecutionFailed)
    })
}

/// Apply one operator choice to the session. Returns `false` once the
/// approval loop should stop.
async fn apply_choice(
    session: &mut Session,
    choice: Choice,
    outcome: &mut RunOutcome,
) -> crate::Result<bool> {
    match choice {
        Choice::Approve => *outcome = session.approve().await?,
        Choice::Retry => *outcome = session.advance().await?,
        Choice::Reject => {
            session.reject()?;
            return Ok(false);
        }
        Choice::Ask(question) => {
            let verdict = session.operator_message(&question).await?;
            if verdict.is_blocked() {
                println!("  {}", render_verdict(&verdict));
            } else if let Some(reply) = session
                .state()
                .and_then(|s| s.log().last())
                .filter(|e| e.kind == LogEntryKind::OracleReply)
            {
                println!("  {} {}", ui::accent("Agent:"), reply.text);
            }
        }
        Choice::Leave => return Ok(false),
    }
    Ok(true)
}

pub async fn run_incident(config: &Config, options: RunOptions) -> Result<()> {
    let (logs, severity) = load_logs(&options).await?;
    let mut session = Session::from_config(config, options.offline);
    session.trigger(logs, severity);

    if !options.json {
        println!("{}", ui::dim("Agent is investigating..."));
    }
    let mut outcome = session.advance().await?;

    loop {
        let retry = awaiting_retry(&session);
        if !(outcome.awaiting_approval || retry) {
            break;
        }
        if !options.json {
            print_state(&session);
            if let Some(action) = session.state().and_then(|s| s.record().proposed_action()) {
                println!("\n  {} {}", ui::yellow("Proposed action:"), action);
            }
        }

        // Non-interactive runs approve at most once and never retry.
        let interactive = !(options.auto_approve || options.json);
        let choice = if interactive {
            prompt_choice(retry)?
        } else if options.auto_approve && !retry {
            Choice::Approve
        } else {
            Choice::Leave
        };

        if !apply_choice(&mut session, choice, &mut outcome).await? {
            break;
        }
    }

    if options.json {
        let state = session.state().context("No incident state to report")?;
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    print_state(&session);
    println!();
    match session.state().map(|s| s.record().approval_state()) {
        Some(ApprovalState::Executed) => {
            println!("{} Incident resolved.", ui::success("✓"));
        }
        Some(ApprovalState::Rejected) => {
            println!("{} Plan rejected. Escalated to the SRE team.", ui::failure("✗"));
        }
        Some(state) => {
            println!("{} Incident left in state {}.", ui::yellow("!"), state);
        }
        None => {}
    }
    Ok(())
}

fn print_state(session: &Session) {
    if let Some(state) = session.state() {
        println!("\n{}", render_incident(state));
    }
}
