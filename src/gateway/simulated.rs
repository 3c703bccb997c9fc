//! In-process stand-in for the remote tool server.
//!
//! Answers the three allow-listed tools with canned infrastructure responses
//! so the agent can be exercised end to end without real infrastructure.

use super::traits::{ToolArguments, ToolGateway, ToolName};
use crate::error::GatewayError;
use async_trait::async_trait;
use std::time::Duration;

const PAYMENT_GATEWAY_LOGS: &str = "\
[INFO] 14:00:01 Transaction started
[INFO] 14:00:02 Processing payment
[ERROR] 14:00:05 Connection Refused: DB_SHARD_04 unreachable
[CRITICAL] 14:00:06 Transaction rolled back.";

pub struct SimulatedGateway {
    restart_delay: Duration,
    offline_shards: Vec<String>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self {
            restart_delay: Duration::from_secs(2),
            offline_shards: vec!["DB_SHARD_04".to_string()],
        }
    }

    /// Simulated time a restart takes.
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    fn required<'a>(tool: ToolName, arguments: &'a ToolArguments) -> Result<&'a str, GatewayError> {
        arguments
            .get(tool.argument_key())
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| GatewayError::Execution {
                tool: tool.as_str().to_string(),
                message: format!("missing argument '{}'", tool.argument_key()),
            })
    }

    fn fetch_service_logs(service_name: &str) -> String {
        match service_name {
            "payment_gateway" => PAYMENT_GATEWAY_LOGS.to_string(),
            "auth_service" => "[INFO] Health Check: OK".to_string(),
            other => format!("[ERROR] Service '{other}' not found."),
        }
    }

    fn check_db_status(&self, shard_id: &str) -> String {
        if self.offline_shards.iter().any(|s| s == shard_id) {
            "STATUS: OFFLINE. CPU Load: 100%. Memory: 99%.".to_string()
        } else {
            "STATUS: ONLINE. Load: Normal.".to_string()
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &ToolArguments,
    ) -> Result<String, GatewayError> {
        let tool =
            ToolName::parse(tool_name).ok_or_else(|| GatewayError::UnknownTool(tool_name.into()))?;
        let value = Self::required(tool, arguments)?;

        match tool {
            ToolName::FetchServiceLogs => Ok(Self::fetch_service_logs(value)),
            ToolName::CheckDbStatus => Ok(self.check_db_status(value)),
            ToolName::RestartResource => {
                if !self.restart_delay.is_zero() {
                    tokio::time::sleep(self.restart_delay).await;
                }
                Ok(format!("SUCCESS: Resource {value} has been restarted."))
            }
        }
    }
}
