//! Deterministic offline oracle.
//!
//! Reads the incident facts directly instead of calling a model, so the
//! agent can run end to end without network access or an API key.

use super::traits::{IncidentFacts, OraclePurpose, ReasoningOracle};
use crate::engine::action::{ProposedAction, find_resource_id};
use crate::error::OracleError;
use crate::gateway::ToolName;
use async_trait::async_trait;

const SEVERE_TAGS: [&str; 3] = ["[CRITICAL]", "[ERROR]", "[WARN]"];

pub struct RuleOracle;

impl RuleOracle {
    fn diagnose(raw_logs: &str) -> String {
        let worst_line = SEVERE_TAGS.iter().find_map(|tag| {
            raw_logs
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with(tag))
                .map(|line| strip_log_prefix(&line[tag.len()..]))
        });

        match (find_resource_id(raw_logs), worst_line) {
            (Some(resource), Some(line)) if line.contains(&resource) => line,
            (Some(resource), Some(line)) => format!("{resource}: {line}"),
            (None, Some(line)) => line,
            (Some(resource), None) => format!("{resource}: unspecified failure"),
            (None, None) => "No failure signature found in the supplied logs".to_string(),
        }
    }

    fn plan(facts: &IncidentFacts) -> String {
        let evidence = facts.diagnosis.as_deref().unwrap_or(&facts.raw_logs);
        let action = match find_resource_id(evidence).or_else(|| find_resource_id(&facts.raw_logs)) {
            Some(resource) => ProposedAction::new(ToolName::RestartResource, resource),
            None => ProposedAction::new(ToolName::FetchServiceLogs, guess_service(evidence)),
        };
        action.to_string()
    }

    fn answer(facts: &IncidentFacts) -> String {
        match facts.diagnosis.as_deref() {
            Some(diagnosis) => format!(
                "Incident {} ({}) is diagnosed as: {diagnosis}. Remediation runs only through the approval flow.",
                facts.incident_id, facts.severity
            ),
            None => format!(
                "Incident {} ({}) has not been diagnosed yet.",
                facts.incident_id, facts.severity
            ),
        }
    }
}

/// Drop a leading `YYYY-MM-DD HH:MM:SS` or `HH:MM:SS` stamp.
fn strip_log_prefix(line: &str) -> String {
    let words: Vec<&str> = line.split_whitespace().collect();
    let skip = words
        .iter()
        .take(2)
        .take_while(|w| w.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ':'))
        .count();
    words[skip..].join(" ")
}

fn guess_service(text: &str) -> &'static str {
    let lower = text.to_ascii_lowercase();
    if lower.contains("auth") {
        "auth_service"
    } else {
        "payment_gateway"
    }
}

#[async_trait]
impl ReasoningOracle for RuleOracle {
    fn name(&self) -> &str {
        "rules"
    }

    async fn ask(&self, _prompt: &str, facts: &IncidentFacts) -> Result<String, OracleError> {
        Ok(match facts.purpose {
            OraclePurpose::Diagnosis => Self::diagnose(&facts.raw_logs),
            OraclePurpose::Plan => Self::plan(facts),
            OraclePurpose::OperatorQuestion => Self::answer(facts),
        })
    }
}
