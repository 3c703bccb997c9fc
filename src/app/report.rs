use crate::config::Config;
use crate::incident::{ApprovalState, WorkflowState};
use crate::security::GuardVerdict;
use crate::ui::style as ui;

pub fn render_incident(state: &WorkflowState) -> String {
    let record = state.record();
    let status = match record.approval_state() {
        ApprovalState::Pending => ui::yellow("PENDING"),
        ApprovalState::Approved => ui::accent("APPROVED"),
        ApprovalState::Executed => ui::success("EXECUTED"),
        ApprovalState::Rejected => ui::failure("REJECTED"),
    };

    let mut lines = vec![
        format!("◆ {}", ui::header("Incident")),
        format!("  {}  {}", ui::dim("id       "), ui::value(record.incident_id())),
        format!("  {}  {}", ui::dim("severity "), ui::failure(record.severity())),
        format!("  {}  {}", ui::dim("status   "), status),
        format!(
            "  {}  {}",
            ui::dim("opened   "),
            record.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        ),
        String::new(),
        format!("◆ {}", ui::header("Operations log")),
    ];

    if state.log().is_empty() {
        lines.push(format!("  {}", ui::dim("(empty)")));
    }
    for entry in state.log() {
        lines.push(format!("  {} {}", ui::entry_label(entry.kind), entry.text));
    }
    lines.join("\n")
}

pub fn render_verdict(verdict: &GuardVerdict) -> String {
    match verdict {
        GuardVerdict::Allowed => format!("{} allowed", ui::success("✓")),
        GuardVerdict::Blocked { token } => format!(
            "{} blocked (matched {})\n  {}",
            ui::failure("✗"),
            ui::yellow(format!("\"{token}\"")),
            verdict.message().unwrap_or_default()
        ),
    }
}

pub fn render_config(config: &Config) -> String {
    [
        format!("◆ {}", ui::header("OpsSwarm configuration")),
        String::new(),
        format!("  config        {}", config.config_path.display()),
        format!("  api key       {}", config.masked_api_key()),
        format!("  provider      {}", ui::value(&config.oracle.provider)),
        format!("  base url      {}", config.oracle.base_url),
        format!("  model         {}", ui::value(&config.oracle.model)),
        format!("  temperature   {:.2}", config.oracle.temperature),
        format!("  oracle limit  {}s", config.oracle.timeout_secs),
        format!("  tool limit    {}s", config.gateway.timeout_secs),
        format!("  status probe  {}", config.gateway.status_check_target),
        format!(
            "  extra deny    {}",
            if config.guard.extra_denylist.is_empty() {
                "(none)".to_string()
            } else {
                config.guard.extra_denylist.join(", ")
            }
        ),
        format!("  observability {}", config.observability.backend),
    ]
    .join("\n")
}
