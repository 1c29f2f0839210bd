use super::OutputHandler;
use crate::error::{Error, Result};
use crate::metrics::DerivedMetrics;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;

/// Appends one history row per snapshot to a fixed-schema table.
pub struct SqliteOutput {
    pool: SqlitePool,
    table_name: String,
    initialized: bool,
}

impl SqliteOutput {
    pub async fn new(path: PathBuf, table_name: String) -> Result<Self> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&conn_str).await
            .map_err(Error::Database)?;

        Ok(Self {
            pool,
            table_name,
            initialized: false,
        })
    }

    async fn ensure_table(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                fetched_at TEXT NOT NULL,
                imobiliarias INTEGER NOT NULL,
                corretores INTEGER NOT NULL,
                construtoras INTEGER NOT NULL,
                total_users INTEGER NOT NULL,
                total_subscribers INTEGER NOT NULL,
                properties_sold REAL NOT NULL,
                units_available_value REAL NOT NULL,
                properties_available_value REAL NOT NULL,
                total_property_value REAL NOT NULL,
                avg_new_properties_per_month INTEGER NOT NULL,
                avg_monthly_value REAL NOT NULL,
                monthly_series TEXT NOT NULL
            )",
            self.table_name
        );

        sqlx::query(&query).execute(&self.pool).await
            .map_err(Error::Database)?;

        self.initialized = true;
        Ok(())
    }
}

#[async_trait]
impl OutputHandler for SqliteOutput {
    async fn write(&mut self, metrics: &DerivedMetrics) -> Result<()> {
        self.ensure_table().await?;

        let query = format!(
            "INSERT INTO {} (
                fetched_at, imobiliarias, corretores, construtoras,
                total_users, total_subscribers, properties_sold,
                units_available_value, properties_available_value,
                total_property_value, avg_new_properties_per_month,
                avg_monthly_value, monthly_series
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            self.table_name
        );

        let monthly = serde_json::to_string(&metrics.monthly_series)?;

        sqlx::query(&query)
            .bind(Utc::now().to_rfc3339())
            .bind(metrics.imobiliarias as i64)
            .bind(metrics.corretores as i64)
            .bind(metrics.construtoras as i64)
            .bind(metrics.total_users as i64)
            .bind(metrics.total_subscribers as i64)
            .bind(metrics.properties_sold)
            .bind(metrics.units_available_value)
            .bind(metrics.properties_available_value)
            .bind(metrics.total_property_value)
            .bind(metrics.avg_new_properties_per_month as i64)
            .bind(metrics.avg_monthly_value)
            .bind(monthly)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
