#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use opsswarm::engine::{EngineSettings, WorkflowEngine};
use opsswarm::error::{GatewayError, OracleError};
use opsswarm::gateway::{ToolArguments, ToolGateway, ToolName};
use opsswarm::incident::{IncidentRecord, Severity, WorkflowState};
use opsswarm::observability::NoopObserver;
use opsswarm::oracle::{IncidentFacts, OraclePurpose, ReasoningOracle};
use opsswarm::security::SafetyGuard;
use opsswarm::session::Session;

pub const DB_LOGS: &str = "[ERROR] Connection Refused: DB_SHARD_04";
pub const DIAGNOSIS: &str = "Database Shard 04 Connection Refused";
pub const RESTART_PLAN: &str = "Action: restart_resource DB_SHARD_04";

/// Oracle that replays canned replies in order and records what it was asked.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, String>>>,
    asked: Mutex<Vec<OraclePurpose>>,
}

impl ScriptedOracle {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok((*r).to_string())).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Diagnosis then restart plan, the usual two-call first run.
    pub fn db_outage() -> Self {
        Self::new(&[DIAGNOSIS, RESTART_PLAN])
    }

    /// Queue a provider failure after any earlier replies.
    pub fn then_fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(message.to_string()));
        self
    }

    pub fn asked(&self) -> Vec<OraclePurpose> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReasoningOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn ask(&self, _prompt: &str, facts: &IncidentFacts) -> Result<String, OracleError> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(facts.purpose);
        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(OracleError::Request {
                provider: "scripted".into(),
                message,
            }),
            None => Err(OracleError::EmptyResponse {
                provider: "scripted".into(),
            }),
        }
    }
}

/// Oracle that never answers within any reasonable limit.
pub struct StalledOracle;

#[async_trait]
impl ReasoningOracle for StalledOracle {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn ask(&self, _prompt: &str, _facts: &IncidentFacts) -> Result<String, OracleError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub tool: String,
    pub arguments: ToolArguments,
}

/// Gateway that records every call and answers like healthy infrastructure.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<ToolCall>>,
    fail_mutations: Option<String>,
    /// Mutating failures still to hand out; `None` means every call fails.
    failures_left: Mutex<Option<usize>>,
}

impl RecordingGateway {
    /// Mutating tools fail with a connectivity error; reads still succeed.
    pub fn failing_mutations(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_mutations: Some(message.to_string()),
            failures_left: Mutex::new(None),
        }
    }

    /// The first mutating call fails; later ones succeed.
    pub fn failing_mutations_once(message: &str) -> Self {
        Self {
            failures_left: Mutex::new(Some(1)),
            ..Self::failing_mutations(message)
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| ToolName::parse(&c.tool).is_some_and(ToolName::is_mutating))
            .count()
    }

    fn take_failure(&self) -> Option<String> {
        let message = self.fail_mutations.clone()?;
        let mut left = self.failures_left.lock().unwrap_or_else(PoisonError::into_inner);
        match left.as_mut() {
            None => Some(message),
            Some(0) => None,
            Some(n) => {
                *n -= 1;
                Some(message)
            }
        }
    }
}

#[async_trait]
impl ToolGateway for RecordingGateway {
    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &ToolArguments,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ToolCall {
                tool: tool_name.to_string(),
                arguments: arguments.clone(),
            });

        let tool = ToolName::parse(tool_name)
            .ok_or_else(|| GatewayError::UnknownTool(tool_name.to_string()))?;
        if tool.is_mutating() {
            if let Some(message) = self.take_failure() {
                return Err(GatewayError::Unavailable(message));
            }
        }
        match tool {
            ToolName::CheckDbStatus => Ok("STATUS: OFFLINE. CPU Load: 100%. Memory: 99%.".into()),
            ToolName::FetchServiceLogs => Ok("[INFO] Health Check: OK".into()),
            ToolName::RestartResource => Ok(format!(
                "SUCCESS: Resource {} has been restarted.",
                arguments.get("resource_id").map_or("?", String::as_str)
            )),
        }
    }
}

/// Gateway whose calls never complete within the test timeouts.
pub struct StalledGateway;

#[async_trait]
impl ToolGateway for StalledGateway {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn invoke(
        &self,
        _tool_name: &str,
        _arguments: &ToolArguments,
    ) -> Result<String, GatewayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".into())
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        oracle_timeout: Duration::from_millis(200),
        gateway_timeout: Duration::from_millis(200),
        ..EngineSettings::default()
    }
}

pub fn engine(oracle: Arc<dyn ReasoningOracle>, gateway: Arc<dyn ToolGateway>) -> WorkflowEngine {
    WorkflowEngine::new(oracle, gateway, Arc::new(NoopObserver), settings())
}

pub fn session(oracle: Arc<dyn ReasoningOracle>, gateway: Arc<dyn ToolGateway>) -> Session {
    Session::new(engine(oracle, gateway), SafetyGuard::new(), Arc::new(NoopObserver))
}

pub fn pending_state(logs: &str) -> WorkflowState {
    WorkflowState::new(IncidentRecord::with_id("INC-2024-001", logs, Severity::Critical))
}
