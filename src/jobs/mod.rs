use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::session_sweep_job(Arc::clone(&self)));
        tokio::spawn(Self::refresh_token_sweep_job(Arc::clone(&self)));
        tokio::spawn(Self::health_check_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Hard-delete expired session rows (runs every hour). Safe alongside
    /// live traffic: only rows already invisible to the read path go away.
    async fn session_sweep_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;

            match tasks::sweep_expired_sessions(&scheduler.context).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Swept {} expired sessions", count);
                    }
                }
                Err(e) => error!("Failed to sweep expired sessions: {}", e),
            }
        }
    }

    /// Hard-delete revoked-and-expired refresh tokens (runs every hour).
    /// Expired-but-unrevoked tokens are retained until session sweep.
    async fn refresh_token_sweep_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;

            match tasks::sweep_refresh_tokens(&scheduler.context).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Swept {} revoked refresh tokens", count);
                    }
                }
                Err(e) => error!("Failed to sweep refresh tokens: {}", e),
            }
        }
    }

    /// Health check job (runs every 5 minutes)
    async fn health_check_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(300));

        loop {
            interval.tick().await;

            if let Err(e) = tasks::health_check(&scheduler.context).await {
                error!("Health check failed: {}", e);
            }
        }
    }
}
