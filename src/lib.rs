pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod metrics;
pub mod output;
pub mod snapshot;

pub use engine::{DashboardEngine, EngineState};
pub use error::{Error, Result};
pub use fetcher::SnapshotFetcher;
pub use metrics::{derive_metrics, DerivedMetrics, MonthlyPoint};
pub use snapshot::RawSnapshot;
