//! Scheduled Jobs
//!
//! Background maintenance. Credentials self-invalidate via lazy expiry
//! checks; the sweep here only reclaims storage for slots whose credential
//! can never validate again.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::session::SessionAuthority;

// =========================================================================
// Credential Sweep Job
// =========================================================================

/// Clear consumed and expired credentials from the store.
pub async fn sweep_dead_credentials(sessions: &SessionAuthority) -> usize {
    let cleared = sessions.store().sweep_dead(Utc::now()).await;

    if cleared > 0 {
        tracing::info!(cleared = cleared, "Swept dead session credentials");
    }

    cleared
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the credential sweep (default: 1 minute)
    pub credential_sweep_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            credential_sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    sessions: Arc<SessionAuthority>,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(sessions: Arc<SessionAuthority>) -> Self {
        Self {
            sessions,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(sessions: Arc<SessionAuthority>, config: JobSchedulerConfig) -> Self {
        Self { sessions, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!("Job scheduler started");

        let mut sweep_interval = interval(self.config.credential_sweep_interval);

        loop {
            sweep_interval.tick().await;
            sweep_dead_credentials(&self.sessions).await;
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let credentials_swept = sweep_dead_credentials(&self.sessions).await;

        MaintenanceReport {
            credentials_swept,
            completed_at: Utc::now(),
        }
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone)]
pub struct MaintenanceReport {
    pub credentials_swept: usize,
    pub completed_at: DateTime<Utc>,
}
