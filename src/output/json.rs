use super::OutputHandler;
use crate::error::Result;
use crate::metrics::DerivedMetrics;
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Writes the latest derived metrics as one pretty-printed JSON document.
/// Each refresh overwrites the previous one: the file always holds exactly
/// the current dashboard state.
pub struct JsonOutput {
    path: PathBuf,
}

impl JsonOutput {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl OutputHandler for JsonOutput {
    async fn write(&mut self, metrics: &DerivedMetrics) -> Result<()> {
        let mut file = File::create(&self.path)?;
        serde_json::to_writer_pretty(&mut file, metrics)?;
        writeln!(file)?;
        Ok(())
    }
}
