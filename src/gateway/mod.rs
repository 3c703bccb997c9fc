pub mod simulated;
pub mod traits;

pub use simulated::SimulatedGateway;
pub use traits::{ReadOnlyTool, ToolArguments, ToolGateway, ToolName};

use crate::error::GatewayError;
use std::time::Duration;

/// Invoke `tool` with an upper bound on how long the gateway may take.
pub async fn invoke_bounded(
    gateway: &dyn ToolGateway,
    tool: ToolName,
    arguments: &ToolArguments,
    limit: Duration,
) -> Result<String, GatewayError> {
    match tokio::time::timeout(limit, gateway.invoke(tool.as_str(), arguments)).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout {
            tool: tool.as_str().to_string(),
            secs: limit.as_secs(),
        }),
    }
}

/// A view of a gateway that can only reach read-only tools.
pub struct ReadOnlyGateway<'a> {
    inner: &'a dyn ToolGateway,
    limit: Duration,
}

impl<'a> ReadOnlyGateway<'a> {
    pub fn new(inner: &'a dyn ToolGateway, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub async fn invoke(
        &self,
        tool: ReadOnlyTool,
        value: impl Into<String>,
    ) -> Result<String, GatewayError> {
        let tool = ToolName::from(tool);
        invoke_bounded(self.inner, tool, &tool.arguments(value), self.limit).await
    }
}
