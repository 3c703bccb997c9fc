use crate::gateway::ToolName;
use crate::incident::IncidentRecord;

pub const SRE_SYSTEM_PROMPT: &str = "You are a Senior Site Reliability Engineer (SRE) \
responding to a production incident. Be concise and factual.";

/// Tools the planner may propose. The status check is run by the agent itself.
pub const PLANNABLE_TOOLS: [ToolName; 2] = [ToolName::RestartResource, ToolName::FetchServiceLogs];

pub fn diagnosis_prompt(raw_logs: &str) -> String {
    format!(
        "Analyze the following server logs and identify the specific service failure and error type.\n\n\
         LOGS:\n{raw_logs}\n\n\
         Output ONLY a concise diagnosis (e.g., 'Database Shard 04 Connection Refused').\n\
         Do not propose fixes yet."
    )
}

pub fn plan_prompt(diagnosis: &str, status: &str) -> String {
    let tools = PLANNABLE_TOOLS
        .iter()
        .map(|t| format!("'{}'", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Diagnosis: {diagnosis}\n\
         Current System Status: {status}\n\n\
         Propose a specific remediation action using available tools.\n\
         Available Tools: [{tools}]\n\n\
         Output ONLY the recommended action in this format:\n\
         \"Action: <ToolName> <Args>\"\n\
         Example: \"Action: restart_resource DB_SHARD_04\""
    )
}

pub fn operator_prompt(question: &str, record: &IncidentRecord) -> String {
    format!(
        "An operator asks about incident {id} (severity {severity}, approval state {state}).\n\
         Diagnosis: {diagnosis}\n\
         Proposed action: {action}\n\n\
         Operator question: {question}\n\n\
         Answer briefly. You cannot run tools from this channel; any remediation \
         must go through the proposed-action approval flow.",
        id = record.incident_id(),
        severity = record.severity(),
        state = record.approval_state(),
        diagnosis = record.diagnosis().unwrap_or("(not yet diagnosed)"),
        action = record.proposed_action().unwrap_or("(none proposed)"),
    )
}
