use crate::config::schema::{DashboardConfig, OutputConfig};
use crate::error::{Error, Result};
use crate::fetcher::SnapshotFetcher;
use crate::output::{
    console::ConsoleOutput, csv::CsvOutput, json::JsonOutput, sqlite::SqliteOutput, OutputHandler,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DashboardConfig> {
        let path = path.as_ref();
        let mut visited = HashSet::new();
        Self::load_with_inheritance(path, &mut visited, false)
    }

    fn load_with_inheritance(
        path: &Path,
        visited: &mut HashSet<PathBuf>,
        is_parent_load: bool,
    ) -> Result<DashboardConfig> {
        let path = fs::canonicalize(path).map_err(|e| {
            Error::Config(format!("{}: {}", path.display(), e))
        })?;

        if visited.contains(&path) {
            return Err(Error::Config(format!(
                "Circular inheritance detected involving {}",
                path.display()
            )));
        }
        visited.insert(path.clone());

        let config = Self::load_file(&path)?;

        let final_config = if let Some(parent_path_str) = &config.extends {
            let parent_path = path.parent()
                .ok_or_else(|| Error::Config(format!(
                    "Cannot determine parent directory for {}",
                    path.display()
                )))?
                .join(parent_path_str);

            let parent_config = Self::load_with_inheritance(&parent_path, visited, true)?;
            Self::merge_configs(parent_config, config)
        } else {
            config
        };

        if !is_parent_load {
            final_config.validate()
                .map_err(Error::Validation)?;
        }

        Ok(final_config)
    }

    fn load_file(path: &Path) -> Result<DashboardConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: DashboardConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: DashboardConfig = serde_yaml::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                Ok(config)
            }
            Some("toml") => {
                let config: DashboardConfig = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    fn merge_configs(mut parent: DashboardConfig, child: DashboardConfig) -> DashboardConfig {
        if !child.name.is_empty() {
            parent.name = child.name;
        }
        if !child.endpoint.is_empty() {
            parent.endpoint = child.endpoint;
        }
        if child.timeout_secs != 10 {
            parent.timeout_secs = child.timeout_secs;
        }
        if child.refresh_secs.is_some() {
            parent.refresh_secs = child.refresh_secs;
        }
        if child.output.is_some() {
            parent.output = child.output;
        }

        parent.extends = None;
        parent
    }

    pub fn create_fetcher(config: &DashboardConfig) -> Result<SnapshotFetcher> {
        SnapshotFetcher::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub async fn create_output(
        config: &DashboardConfig,
        multi: Option<Arc<indicatif::MultiProgress>>,
    ) -> Result<Box<dyn OutputHandler>> {
        let handler: Box<dyn OutputHandler> = if let Some(out_config) = &config.output {
            match out_config {
                OutputConfig::Console => Box::new(ConsoleOutput::new(multi)),
                OutputConfig::Json { path } => Box::new(JsonOutput::new(PathBuf::from(path))),
                OutputConfig::Csv { path } => Box::new(CsvOutput::new(PathBuf::from(path))?),
                OutputConfig::Sqlite { path, table } => {
                    Box::new(SqliteOutput::new(PathBuf::from(path), table.clone()).await?)
                }
            }
        } else {
            Box::new(ConsoleOutput::new(multi))
        };

        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_json_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "dash.json",
            r#"{"name": "fastsale", "endpoint": "https://example.com/api/get-count-temp"}"#,
        );

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.name, "fastsale");
        assert_eq!(config.timeout_secs, 10);
        assert!(config.refresh_secs.is_none());
    }

    #[test]
    fn loads_yaml_and_toml_configs() {
        let dir = TempDir::new().unwrap();
        let yaml = write_config(
            &dir,
            "dash.yaml",
            "name: fastsale\nendpoint: https://example.com/api\ntimeout_secs: 5\n",
        );
        let toml = write_config(
            &dir,
            "dash.toml",
            "name = \"fastsale\"\nendpoint = \"https://example.com/api\"\nrefresh_secs = 60\n",
        );

        assert_eq!(ConfigLoader::load(&yaml).unwrap().timeout_secs, 5);
        assert_eq!(ConfigLoader::load(&toml).unwrap().refresh_secs, Some(60));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "dash.json",
            r#"{"name": "fastsale", "endpoint": "not a url"}"#,
        );

        assert!(matches!(
            ConfigLoader::load(&path),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn child_config_inherits_from_parent() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "base.json",
            r#"{"name": "fastsale", "endpoint": "https://example.com/api", "timeout_secs": 30}"#,
        );
        let child = write_config(
            &dir,
            "prod.json",
            r#"{"extends": "base.json", "endpoint": "https://prod.example.com/api"}"#,
        );

        let config = ConfigLoader::load(&child).unwrap();
        assert_eq!(config.name, "fastsale");
        assert_eq!(config.endpoint, "https://prod.example.com/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn detects_circular_inheritance() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "a.json", r#"{"extends": "b.json"}"#);
        let a = dir.path().join("a.json");
        write_config(&dir, "b.json", r#"{"extends": "a.json"}"#);

        match ConfigLoader::load(&a) {
            Err(Error::Config(msg)) => assert!(msg.contains("Circular")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
