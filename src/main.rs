use clap::{Parser, Subcommand};
use fastdash::config::ConfigLoader;
use fastdash::engine::DashboardEngine;
use fastdash::format::{format_brl, format_count};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fastdash")]
#[command(version = "0.1.0")]
#[command(about = "Fast Sale metrics dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the snapshot and render the dashboard
    Run {
        /// Path to the configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Show a fetch spinner (stderr)
        #[arg(short, long, default_value_t = true)]
        progress: bool,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = Arc::new(indicatif::MultiProgress::new());

    match cli.command {
        Commands::Run { config, progress } => {
            if progress {
                let multi_clone = multi.clone();
                indicatif_log_bridge::LogWrapper::new((*multi_clone).clone(), logger)
                    .try_init()
                    .unwrap();
            } else {
                log::set_boxed_logger(Box::new(logger)).unwrap();
                log::set_max_level(log::LevelFilter::Info);
            }

            log::info!("Loading config from {:?}", config);
            let config_data = ConfigLoader::load(&config)?;
            log::info!("Loaded dashboard: {}", config_data.name);

            let fetcher = ConfigLoader::create_fetcher(&config_data)?;
            let output = ConfigLoader::create_output(&config_data, Some(multi.clone())).await?;
            let engine = DashboardEngine::new(
                fetcher,
                config_data.refresh_secs.map(Duration::from_secs),
                output,
            );

            let mut spinner: Option<ProgressBar> = None;
            if progress {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?);
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_message(format!("Fetching snapshot from {}", config_data.endpoint));
                spinner = Some(pb);
            }

            log::info!("Starting dashboard...");
            let run_result = engine.run().await;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            run_result?;

            if let Some(metrics) = engine.get_metrics() {
                println!("\n✅ Snapshot processed:");
                println!("   Usuários: {}", format_count(metrics.total_users));
                println!("   Assinantes: {}", format_count(metrics.total_subscribers));
                println!("   Imóveis Vendidos: {}", format_brl(metrics.properties_sold));
                println!(
                    "   Valor Total de Imóveis: {}",
                    format_brl(metrics.total_property_value)
                );
            }
        }
        Commands::Check { config } => {
            match ConfigLoader::load(&config) {
                Ok(cfg) => {
                    println!("✅ Config is valid:");
                    println!("   Name: {}", cfg.name);
                    println!("   Endpoint: {}", cfg.endpoint);
                    println!("   Timeout: {}s", cfg.timeout_secs);
                    match cfg.refresh_secs {
                        Some(secs) => println!("   Refresh: every {}s", secs),
                        None => println!("   Refresh: one-shot"),
                    }
                }
                Err(e) => {
                    eprintln!("❌ Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
