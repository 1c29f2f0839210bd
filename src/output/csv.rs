use super::OutputHandler;
use crate::error::Result;
use crate::metrics::DerivedMetrics;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

/// Appends one history row of scalar metrics per snapshot, timestamped.
pub struct CsvOutput {
    writer: csv::Writer<std::fs::File>,
    headers_written: bool,
}

impl CsvOutput {
    pub fn new(path: PathBuf) -> Result<Self> {
        let writer = csv::Writer::from_path(path)
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;

        Ok(Self {
            writer,
            headers_written: false,
        })
    }
}

const HEADERS: [&str; 12] = [
    "fetched_at",
    "imobiliarias",
    "corretores",
    "construtoras",
    "total_users",
    "total_subscribers",
    "properties_sold",
    "units_available_value",
    "properties_available_value",
    "total_property_value",
    "avg_new_properties_per_month",
    "avg_monthly_value",
];

#[async_trait]
impl OutputHandler for CsvOutput {
    async fn write(&mut self, metrics: &DerivedMetrics) -> Result<()> {
        if !self.headers_written {
            self.writer
                .write_record(HEADERS)
                .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
            self.headers_written = true;
        }

        let record = [
            Utc::now().to_rfc3339(),
            metrics.imobiliarias.to_string(),
            metrics.corretores.to_string(),
            metrics.construtoras.to_string(),
            metrics.total_users.to_string(),
            metrics.total_subscribers.to_string(),
            format!("{:.2}", metrics.properties_sold),
            format!("{:.2}", metrics.units_available_value),
            format!("{:.2}", metrics.properties_available_value),
            format!("{:.2}", metrics.total_property_value),
            metrics.avg_new_properties_per_month.to_string(),
            format!("{:.2}", metrics.avg_monthly_value),
        ];

        self.writer
            .write_record(record)
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
        Ok(())
    }
}
