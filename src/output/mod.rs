use crate::error::Result;
use crate::metrics::DerivedMetrics;
use async_trait::async_trait;

pub mod console;
pub mod csv;
pub mod json;
pub mod sqlite;

/// Sink for derived metrics. `write` is called once per snapshot; in watch
/// mode that means once per refresh.
#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn write(&mut self, metrics: &DerivedMetrics) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
