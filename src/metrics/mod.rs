pub mod derive;
pub mod derived;

pub use derive::derive_metrics;
pub use derived::{DerivedMetrics, MonthlyPoint, MONTH_LABELS};
