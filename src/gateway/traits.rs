use crate::error::GatewayError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Arguments for one tool invocation, keyed by parameter name.
pub type ToolArguments = BTreeMap<String, String>;

/// The tool allow-list. Nothing outside this enum can be invoked by the
/// workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    CheckDbStatus,
    FetchServiceLogs,
    RestartResource,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckDbStatus => "check_db_status",
            Self::FetchServiceLogs => "fetch_service_logs",
            Self::RestartResource => "restart_resource",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "check_db_status" => Some(Self::CheckDbStatus),
            "fetch_service_logs" => Some(Self::FetchServiceLogs),
            "restart_resource" => Some(Self::RestartResource),
            _ => None,
        }
    }

    /// Name of the single parameter each tool takes.
    pub fn argument_key(self) -> &'static str {
        match self {
            Self::CheckDbStatus => "shard_id",
            Self::FetchServiceLogs => "service_name",
            Self::RestartResource => "resource_id",
        }
    }

    pub fn is_mutating(self) -> bool {
        matches!(self, Self::RestartResource)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CheckDbStatus => "Checks the health status of a database shard.",
            Self::FetchServiceLogs => "Fetches the last 50 lines of logs for a given service.",
            Self::RestartResource => "Restarts a specific resource (container/VM/DB).",
        }
    }

    pub fn arguments(self, value: impl Into<String>) -> ToolArguments {
        let mut args = ToolArguments::new();
        args.insert(self.argument_key().to_string(), value.into());
        args
    }
}

/// Tools that only read infrastructure state. Planning gets a view typed on
/// this enum, so it has no way to name a mutating tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOnlyTool {
    CheckDbStatus,
    FetchServiceLogs,
}

impl From<ReadOnlyTool> for ToolName {
    fn from(tool: ReadOnlyTool) -> Self {
        match tool {
            ReadOnlyTool::CheckDbStatus => Self::CheckDbStatus,
            ReadOnlyTool::FetchServiceLogs => Self::FetchServiceLogs,
        }
    }
}

/// Remote operation boundary: invoke a named tool, get text back.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Gateway identifier used in logs.
    fn name(&self) -> &str;

    async fn invoke(&self, tool_name: &str, arguments: &ToolArguments)
    -> Result<String, GatewayError>;
}
