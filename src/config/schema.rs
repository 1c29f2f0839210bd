use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,

    /// Snapshot endpoint, GET, JSON body.
    #[serde(default)]
    #[validate(url)]
    pub endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// When set, keep refetching at this interval instead of exiting after
    /// one snapshot. The newest snapshot simply replaces the previous one.
    #[serde(default)]
    pub refresh_secs: Option<u64>,

    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Optional path to a parent configuration file to inherit from
    #[serde(default)]
    pub extends: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    Console,
    Json {
        path: String,
    },
    Csv {
        path: String,
    },
    Sqlite {
        path: String,
        #[serde(default = "default_table_name")]
        table: String,
    },
}

fn default_timeout() -> u64 {
    10
}

fn default_table_name() -> String {
    "metrics_history".to_string()
}
