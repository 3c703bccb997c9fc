pub mod compatible;
pub mod prompts;
pub mod rules;
pub mod traits;

pub use compatible::{CompatibleOracle, CompatibleOracleParams};
pub use rules::RuleOracle;
pub use traits::{IncidentFacts, OraclePurpose, ReasoningOracle};

use crate::config::Config;
use std::sync::Arc;
use std::time::Duration;

/// Build the oracle selected by config. `offline` forces the rule-based
/// backend regardless of provider settings.
pub fn create_oracle(config: &Config, offline: bool) -> Arc<dyn ReasoningOracle> {
    if offline || config.oracle.provider == "rules" {
        return Arc::new(RuleOracle);
    }

    Arc::new(CompatibleOracle::new(&CompatibleOracleParams {
        name: &config.oracle.provider,
        base_url: &config.oracle.base_url,
        api_key: config.api_key.as_deref(),
        model: &config.oracle.model,
        temperature: config.oracle.temperature,
        max_tokens: config.oracle.max_tokens,
        request_timeout: Duration::from_secs(config.oracle.timeout_secs),
    }))
}
