use crate::error::Result;
use crate::fetcher::SnapshotFetcher;
use crate::metrics::{derive_metrics, DerivedMetrics};
use crate::output::OutputHandler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

/// Drives the fetch → derive → output cycle.
///
/// Without a refresh interval the engine fetches once and exits; any failure
/// is terminal for that run. With an interval it keeps refetching until
/// ctrl-c: each successful fetch atomically replaces the published metrics
/// (last write wins), and a failed refresh is logged while the previous
/// metrics stay published.
pub struct DashboardEngine {
    fetcher: SnapshotFetcher,
    refresh: Option<Duration>,
    output: Arc<Mutex<Box<dyn OutputHandler>>>,
    latest: watch::Sender<Option<DerivedMetrics>>,
    state: Arc<Mutex<EngineState>>,
    state_watcher: watch::Sender<EngineState>,
    shutdown: watch::Sender<bool>,
}

impl DashboardEngine {
    pub fn new(
        fetcher: SnapshotFetcher,
        refresh: Option<Duration>,
        output: Box<dyn OutputHandler>,
    ) -> Self {
        let (latest_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(EngineState::Idle);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            fetcher,
            refresh,
            output: Arc::new(Mutex::new(output)),
            latest: latest_tx,
            state: Arc::new(Mutex::new(EngineState::Idle)),
            state_watcher: state_tx,
            shutdown: shutdown_tx,
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.set_state(EngineState::Running).await;

        let result = match self.refresh {
            None => self.refresh_once().await,
            Some(interval) => {
                self.run_watch(interval).await;
                Ok(())
            }
        };

        let close_result = {
            let mut output = self.output.lock().await;
            output.close().await
        };

        self.set_state(EngineState::Stopped).await;
        result.and(close_result)
    }

    async fn run_watch(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Shutting down...");
                    break;
                }
                _ = shutdown_rx.changed() => {
                    log::info!("Shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        log::error!("Refresh failed, keeping previous snapshot: {}", e);
                    }
                }
            }
        }
    }

    /// Asks a watch-mode `run` to stop after its current refresh, same as
    /// ctrl-c. A no-op in one-shot mode.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    async fn refresh_once(&self) -> Result<()> {
        let raw = self.fetcher.fetch().await?;
        let metrics = derive_metrics(&raw)?;

        // Single assignment: the new snapshot fully replaces the old one.
        let _ = self.latest.send(Some(metrics.clone()));

        let mut output = self.output.lock().await;
        output.write(&metrics).await
    }

    pub fn get_metrics(&self) -> Option<DerivedMetrics> {
        self.latest.borrow().clone()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<Option<DerivedMetrics>> {
        self.latest.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<EngineState> {
        self.state_watcher.subscribe()
    }

    pub async fn set_state(&self, state: EngineState) {
        let mut state_guard = self.state.lock().await;
        *state_guard = state;
        let _ = self.state_watcher.send(state);
    }
}
