use crate::incident::Severity;

/// Canned outages for demos and drills.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display, strum::EnumIter,
)]
pub enum Scenario {
    #[strum(serialize = "DB Connection Failure")]
    DbConnectionFailure,
    #[strum(serialize = "High Latency (Auth)")]
    HighLatencyAuth,
    #[strum(serialize = "Disk Full (Logs)")]
    DiskFullLogs,
}

impl Scenario {
    pub fn logs(self) -> &'static str {
        match self {
            Self::DbConnectionFailure => {
                "[ERROR] 2024-05-20 14:02:01 ConnectionPool: Unable to connect to DB_SHARD_04.\n\
                 [CRITICAL] 2024-05-20 14:02:02 Service 'PaymentGateway' health check failed.\n\
                 [WARN] 2024-05-20 14:02:03 Retrying connection... (Attempt 3/5)\n\
                 [ERROR] 2024-05-20 14:02:04 Connection Refused."
            }
            Self::HighLatencyAuth => "[WARN] Auth Service response time > 2000ms.",
            Self::DiskFullLogs => {
                "[WARN] 2024-05-20 09:41:12 Volume /var/log on LOG_NODE_02 at 97% capacity.\n\
                 [CRITICAL] 2024-05-20 09:44:55 LOG_NODE_02 write failed: No space left on device."
            }
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::DbConnectionFailure | Self::DiskFullLogs => Severity::Critical,
            Self::HighLatencyAuth => Severity::Medium,
        }
    }
}
