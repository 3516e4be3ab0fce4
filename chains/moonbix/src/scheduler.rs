//! Multi-account scheduler
//!
//! One logical worker walks the account list in file order, runs a fresh
//! [`SessionDriver`] per account, pauses between accounts, and after the last
//! account waits out the cycle pause before starting over. Forever, until the
//! cancellation token fires.

use crate::client::{BrowserHeaders, TransportProvider};
use crate::config::MoonbixConfig;
use crate::session::{SessionDriver, SessionState, SessionStep};
use core_logic::{
    AccountCredential, Clock, ConfigError, CoreError, HttpTransport, ProxyConfig, ProxyManager,
    SESSION_TARGET, Sleeper, SystemClock, TokioSleeper,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

/// Outcome counts for one pass over the account list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    pub cycle: u64,
    pub completed: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl CycleStats {
    fn record(&mut self, state: &SessionState) {
        match state {
            SessionState::Completed { success: true } => self.completed += 1,
            SessionState::Completed { success: false } => self.rejected += 1,
            _ => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.completed + self.rejected + self.failed
    }
}

pub struct Scheduler {
    config: Arc<MoonbixConfig>,
    provider: Arc<dyn TransportProvider>,
    proxy: ProxyConfig,
    proxy_requested: bool,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    rng: StdRng,
    show_countdown: bool,
}

impl Scheduler {
    pub fn new(
        config: MoonbixConfig,
        provider: Arc<dyn TransportProvider>,
        proxy: ProxyConfig,
        proxy_requested: bool,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            proxy,
            proxy_requested,
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
            rng: StdRng::from_entropy(),
            show_countdown: true,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_countdown(mut self, show: bool) -> Self {
        self.show_countdown = show;
        self
    }

    /// Runs cycles until `token` is cancelled.
    ///
    /// Only returns an error for startup conditions: nothing to schedule, a
    /// requested proxy that is not configured, or a client that cannot be built.
    pub async fn run(
        &mut self,
        accounts: &[AccountCredential],
        token: CancellationToken,
    ) -> Result<(), CoreError> {
        self.run_cycles(accounts, token, None).await.map(|_| ())
    }

    /// Like [`Scheduler::run`], but stops after `max_cycles` passes when given.
    /// The cycle pause is skipped after the final pass, and `Some(0)` runs
    /// nothing once the startup checks pass.
    pub async fn run_cycles(
        &mut self,
        accounts: &[AccountCredential],
        token: CancellationToken,
        max_cycles: Option<u64>,
    ) -> Result<Vec<CycleStats>, CoreError> {
        if accounts.is_empty() {
            return Err(ConfigError::NoAccounts {
                path: "<account list>".to_string(),
            }
            .into());
        }

        let proxy = ProxyManager::resolve(self.proxy_requested, &self.proxy).inspect_err(|_| {
            warn!("Proxy is not configured. Update config/config.json.");
        })?;
        match &proxy {
            Some(p) => info!(target: SESSION_TARGET, "Routing through proxy {}", p.base_url()),
            None => info!(target: SESSION_TARGET, "Using direct connection"),
        }
        if max_cycles == Some(0) {
            return Ok(Vec::new());
        }

        // Without User-Agent rotation one client serves every account
        let shared = if self.config.randomize_user_agent {
            None
        } else {
            let headers = BrowserHeaders::new(self.config.pick_user_agent(&mut self.rng));
            Some(self.provider.provide(&headers, proxy.as_ref())?)
        };

        let mut history = Vec::new();
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            let stats = self
                .run_cycle(cycle, accounts, proxy.as_ref(), shared.as_ref(), &token)
                .await;
            info!(
                target: SESSION_TARGET,
                "Cycle {} complete | Completed: {} | Rejected: {} | Failed: {}",
                stats.cycle,
                stats.completed,
                stats.rejected,
                stats.failed
            );
            history.push(stats);

            if token.is_cancelled() || max_cycles.is_some_and(|max| cycle >= max) {
                break;
            }

            info!(
                target: SESSION_TARGET,
                "Cycle complete. Waiting {} seconds.",
                self.config.cycle_pause_secs
            );
            if self.countdown(self.config.cycle_pause(), &token).await {
                break;
            }
        }

        info!("🛑 Scheduler stopped after {} cycle(s).", history.len());
        Ok(history)
    }

    async fn run_cycle(
        &mut self,
        cycle: u64,
        accounts: &[AccountCredential],
        proxy: Option<&ProxyConfig>,
        shared: Option<&Arc<dyn HttpTransport>>,
        token: &CancellationToken,
    ) -> CycleStats {
        let mut stats = CycleStats {
            cycle,
            ..Default::default()
        };
        let started = Instant::now();

        for (i, credential) in accounts.iter().enumerate() {
            if token.is_cancelled() {
                break;
            }

            let idx = i + 1;
            let span = tracing::info_span!(
                target: SESSION_TARGET,
                "account",
                idx = %format!("{:03}", idx)
            );
            info!(target: SESSION_TARGET, parent: &span, "Processing account {}", idx);

            let state = match self.transport_for_account(shared, proxy) {
                Ok(transport) => {
                    let driver =
                        SessionDriver::new(transport.as_ref(), &self.config, self.clock.as_ref());
                    driver
                        .run(credential, &mut self.rng)
                        .instrument(span.clone())
                        .await
                }
                Err(e) => {
                    let step = SessionStep::BuildClient;
                    error!(
                        target: SESSION_TARGET,
                        parent: &span,
                        "{} ({} step): {}",
                        step.failure_message(),
                        step,
                        e
                    );
                    SessionState::Failed {
                        step,
                        reason: e.to_string(),
                    }
                }
            };
            stats.record(&state);

            let pause = self.config.inter_account_pause(&mut self.rng);
            if self.pause(pause, token).await {
                break;
            }
        }

        info!(
            "Cycle {} processed {} account(s) in {:.1}s",
            cycle,
            stats.total(),
            started.elapsed().as_secs_f64()
        );
        stats
    }

    fn transport_for_account(
        &mut self,
        shared: Option<&Arc<dyn HttpTransport>>,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Arc<dyn HttpTransport>, CoreError> {
        if let Some(transport) = shared {
            return Ok(Arc::clone(transport));
        }
        let headers = BrowserHeaders::new(self.config.pick_user_agent(&mut self.rng));
        Ok(self.provider.provide(&headers, proxy)?)
    }

    /// Sleeps for `duration`; returns `true` if cancelled first.
    async fn pause(&self, duration: Duration, token: &CancellationToken) -> bool {
        if duration.is_zero() {
            return token.is_cancelled();
        }
        tokio::select! {
            _ = token.cancelled() => true,
            _ = self.sleeper.sleep(duration) => false,
        }
    }

    /// Long wait with a one-line console countdown; returns `true` if cancelled.
    async fn countdown(&self, duration: Duration, token: &CancellationToken) -> bool {
        if !self.show_countdown {
            return self.pause(duration, token).await;
        }

        let mut remaining = duration.as_secs();
        let mut cancelled = false;
        while remaining > 0 {
            print!("\r\x1b[2KWaiting {} seconds...", remaining);
            let _ = std::io::stdout().flush();

            if self.pause(Duration::from_secs(1), token).await {
                cancelled = true;
                break;
            }
            remaining -= 1;
        }
        print!("\r\x1b[2K");
        let _ = std::io::stdout().flush();

        cancelled
    }
}
