pub mod schema;

pub use schema::{Config, GatewayConfig, GuardConfig, ObservabilityConfig, OracleConfig};
