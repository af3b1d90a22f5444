//! Scheduled harvesting
//!
//! The scheduler runs one harvest per configured interval on a background
//! task. Runs are serialized through an async mutex: a scheduled tick that
//! fires while a run is in flight waits its turn, and a manual trigger
//! during a run is rejected rather than queued.

use crate::config::Config;
use crate::export::ExportFormat;
use crate::harvest::run_harvest;
use crate::model::MarketFilter;
use crate::storage::RunLog;
use crate::{HarvestError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

struct Shared {
    config: Config,
    config_hash: String,
    filter: MarketFilter,
    export_format: Option<ExportFormat>,

    /// Held for the duration of every run; serializes scheduled and
    /// manual runs
    run_gate: tokio::sync::Mutex<()>,

    last_run: std::sync::Mutex<Option<RunLog>>,
}

impl Shared {
    async fn run_once(&self) {
        let _gate = self.run_gate.lock().await;
        match run_harvest(
            &self.config,
            &self.config_hash,
            self.filter,
            None,
            self.export_format,
        )
        .await
        {
            Ok(run) => {
                if let Ok(mut last) = self.last_run.lock() {
                    *last = Some(run);
                }
            }
            Err(e) => error!("Scheduled harvest failed: {}", e),
        }
    }
}

/// Snapshot of the scheduler's state
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// Whether a harvest is currently in flight
    pub run_in_progress: bool,

    /// The most recent completed run, if any
    pub last_run: Option<RunLog>,
}

/// Periodic harvest driver
pub struct Scheduler {
    shared: Arc<Shared>,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Starts the scheduler, running one harvest immediately and then one
    /// per configured interval
    pub fn start(
        config: Config,
        config_hash: String,
        filter: MarketFilter,
        export_format: Option<ExportFormat>,
    ) -> Self {
        let interval = Duration::from_secs(config.schedule.interval_hours * 3600);
        let shared = Arc::new(Shared {
            config,
            config_hash,
            filter,
            export_format,
            run_gate: tokio::sync::Mutex::new(()),
            last_run: std::sync::Mutex::new(None),
        });

        let (stop, mut stop_rx) = watch::channel(false);
        let task_shared = Arc::clone(&shared);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        info!("Scheduled harvest starting");
                        task_shared.run_once().await;
                    }
                    _ = stop_rx.changed() => {
                        info!("Scheduler stopping");
                        break;
                    }
                }
            }
        });

        Self {
            shared,
            stop,
            handle,
        }
    }

    /// Runs a harvest immediately, outside the schedule
    ///
    /// # Returns
    ///
    /// * `Err(HarvestError::RunInProgress)` - A run is already in flight
    pub async fn trigger(&self) -> Result<RunLog> {
        let _gate = self
            .shared
            .run_gate
            .try_lock()
            .map_err(|_| HarvestError::RunInProgress)?;

        let run = run_harvest(
            &self.shared.config,
            &self.shared.config_hash,
            self.shared.filter,
            None,
            self.shared.export_format,
        )
        .await?;

        if let Ok(mut last) = self.shared.last_run.lock() {
            *last = Some(run.clone());
        }
        Ok(run)
    }

    /// Snapshot of the current state
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            run_in_progress: self.shared.run_gate.try_lock().is_err(),
            last_run: self
                .shared
                .last_run
                .lock()
                .ok()
                .and_then(|last| last.clone()),
        }
    }

    /// Stops the background task and waits for it to wind down
    ///
    /// A harvest already in flight when stop is requested runs to
    /// completion first.
    pub async fn stop(self) -> Result<()> {
        self.stop
            .send(true)
            .map_err(|_| HarvestError::SchedulerStopped)?;
        self.handle
            .await
            .map_err(|_| HarvestError::SchedulerStopped)?;
        Ok(())
    }
}
