use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};

use super::events::{StatusChangeSink, StatusNotifier};
use super::lookup::StatusLookup;
use super::types::{
    normalize_targets, LookupError, MonitorError, MonitorSnapshot, MonitorState,
    MonitorTarget, PollerConfig, PollerPhase, StatusChange, SweepReport, SweepTrigger,
    TargetSnapshot, TargetStatus,
};
use crate::services::metrics::MonitorMetricsCollector;

/// Adaptive status poller.
///
/// Sweeps every tracked target concurrently, reports transitions through a
/// [`StatusNotifier`] and picks the next interval from what it saw: the fast
/// interval while any target is transitional, the normal one otherwise.
///
/// Lock order is always `control` then `state`.
pub struct AdaptivePoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    config: PollerConfig,
    lookup: Arc<dyn StatusLookup>,
    notifier: StatusNotifier,
    metrics: Option<MonitorMetricsCollector>,
    control: Mutex<Control>,
    state: RwLock<MonitorState>,
    /// Scheduling loop; kept outside `control` so `Drop` can always reach it
    loop_task: std::sync::Mutex<Option<AbortHandle>>,
    /// Signalled on every start/stop so in-flight sweeps drop their lookups
    session_tx: watch::Sender<u64>,
    /// Lookups are numbered as they start; a result never replaces a newer one
    lookup_seq: AtomicU64,
}

struct Control {
    phase: PollerPhase,
    /// Bumped by every start/stop; sweeps from an older generation are discarded
    generation: u64,
}

enum Applied {
    Changed(StatusChange),
    Unchanged,
    Stale,
    SessionEnded,
}

impl AdaptivePoller {
    pub fn new(
        config: PollerConfig,
        lookup: Arc<dyn StatusLookup>,
        notifier: StatusNotifier,
        metrics: Option<MonitorMetricsCollector>,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                config,
                lookup,
                notifier,
                metrics,
                control: Mutex::new(Control {
                    phase: PollerPhase::Idle,
                    generation: 0,
                }),
                state: RwLock::new(MonitorState::default()),
                loop_task: std::sync::Mutex::new(None),
                session_tx: watch::channel(0).0,
                lookup_seq: AtomicU64::new(0),
            }),
        }
    }

    /// (Re)start monitoring `targets` with a fresh state.
    ///
    /// An empty target set, or a disabled poller, leaves it Idle. Only a
    /// stopped poller refuses to start.
    pub async fn start(
        &self,
        targets: impl IntoIterator<Item = MonitorTarget>,
    ) -> Result<PollerPhase, MonitorError> {
        let targets = normalize_targets(targets);
        let mut control = self.inner.control.lock().await;

        if control.phase == PollerPhase::Stopped {
            return Err(MonitorError::PollerStopped);
        }

        self.inner.replace_loop_task(None);
        self.inner.next_generation(&mut control);

        let target_count = targets.len();
        *self.inner.state.write().await = MonitorState::with_targets(targets);
        if let Some(metrics) = &self.inner.metrics {
            metrics.set_tracked_targets(target_count);
        }

        if !self.inner.config.enabled || target_count == 0 {
            control.phase = PollerPhase::Idle;
            tracing::info!(
                "Status poller idle (enabled={}, targets={})",
                self.inner.config.enabled,
                target_count
            );
            return Ok(PollerPhase::Idle);
        }

        control.phase = PollerPhase::Active;
        let task = tokio::spawn(Arc::clone(&self.inner).run_loop());
        self.inner.replace_loop_task(Some(task.abort_handle()));
        tracing::info!("Status poller active for {} target(s)", target_count);

        Ok(PollerPhase::Active)
    }

    /// Cancel any pending sweep and discard all state. Calling it again is a no-op.
    pub async fn stop(&self) {
        let mut control = self.inner.control.lock().await;
        if control.phase == PollerPhase::Stopped {
            return;
        }

        self.inner.replace_loop_task(None);
        self.inner.next_generation(&mut control);
        control.phase = PollerPhase::Stopped;

        *self.inner.state.write().await = MonitorState::default();
        if let Some(metrics) = &self.inner.metrics {
            metrics.set_tracked_targets(0);
        }

        tracing::info!("Status poller stopped");
    }

    /// Run an out-of-band sweep in the background.
    ///
    /// The scheduled timer is left untouched. Awaiting the handle is optional.
    pub fn force_check(&self) -> JoinHandle<Option<SweepReport>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.sweep(SweepTrigger::Forced).await })
    }

    /// Run one sweep now and wait for it.
    ///
    /// Returns `None` when the poller is not active or was restarted/stopped
    /// while the lookups were in flight.
    pub async fn run_sweep(&self) -> Option<SweepReport> {
        self.inner.sweep(SweepTrigger::Forced).await
    }

    pub async fn phase(&self) -> PollerPhase {
        self.inner.control.lock().await.phase
    }

    /// Interval the scheduler would wait after a sweep given the current state
    pub async fn next_interval(&self) -> Duration {
        let cadence = self.inner.state.read().await.cadence_for(&self.inner.config);
        self.inner.config.interval_for(cadence)
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let control = self.inner.control.lock().await;
        let state = self.inner.state.read().await;

        let targets = state
            .targets
            .iter()
            .map(|target| {
                let status = state.statuses.get(target);
                TargetSnapshot {
                    target: target.clone(),
                    last_known_status: status.map(|s| s.last_known_status.clone()),
                    last_polled_at: status.map(|s| s.last_polled_at),
                }
            })
            .collect();

        MonitorSnapshot {
            phase: control.phase,
            cadence: state.cadence,
            targets,
            last_sweep_at: state.last_sweep_at,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.inner.notifier.subscribe()
    }

    pub fn add_sink(&self, sink: Arc<dyn StatusChangeSink>) {
        self.inner.notifier.add_sink(sink);
    }
}

impl Drop for AdaptivePoller {
    fn drop(&mut self) {
        self.inner.replace_loop_task(None);
        self.inner.session_tx.send_modify(|session| *session += 1);
    }
}

impl PollerInner {
    fn replace_loop_task(&self, task: Option<AbortHandle>) {
        let mut slot = self.loop_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *slot, task) {
            previous.abort();
        }
    }

    fn next_generation(&self, control: &mut Control) {
        control.generation += 1;
        self.session_tx.send_replace(control.generation);
    }

    async fn run_loop(self: Arc<Self>) {
        tokio::time::sleep(self.config.initial_delay).await;

        loop {
            let Some(report) = self.sweep(SweepTrigger::Scheduled).await else {
                tracing::debug!("Poller no longer active, not rescheduling");
                break;
            };
            tokio::time::sleep(report.next_interval).await;
        }
    }

    async fn sweep(&self, trigger: SweepTrigger) -> Option<SweepReport> {
        let (generation, targets, mut session_rx) = {
            let control = self.control.lock().await;
            if control.phase != PollerPhase::Active {
                return None;
            }
            let state = self.state.read().await;
            (control.generation, state.targets.clone(), self.session_tx.subscribe())
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_sweep(trigger.as_str());
        }
        tracing::debug!("Starting {} sweep over {} target(s)", trigger.as_str(), targets.len());

        // Dropping the set aborts whatever is still in flight
        let mut lookups = JoinSet::new();
        for target in targets.iter().cloned() {
            let lookup = Arc::clone(&self.lookup);
            let sequence = self.lookup_seq.fetch_add(1, Ordering::Relaxed);
            lookups.spawn(async move {
                let result = AssertUnwindSafe(lookup.fetch_status(&target))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(LookupError::Aborted("lookup panicked".to_string())));
                (target, sequence, result)
            });
        }

        let mut changes = Vec::new();
        let mut succeeded = 0;
        let mut failed = 0;

        loop {
            let joined = tokio::select! {
                joined = lookups.join_next() => joined,
                _ = session_rx.changed() => {
                    tracing::debug!("Cancelling {} sweep, poller was restarted or stopped", trigger.as_str());
                    return None;
                }
            };
            let Some(joined) = joined else {
                break;
            };

            let (target, sequence, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Status lookup task failed: {}", e);
                    continue;
                }
            };

            match result {
                Ok(report) => {
                    succeeded += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_lookup(true);
                    }

                    match self.apply_status(generation, target, sequence, report.status).await {
                        Applied::Changed(change) => {
                            if let Some(metrics) = &self.metrics {
                                metrics.record_status_change(&change.new_status);
                            }
                            self.notifier.publish(&change);
                            changes.push(change);
                        }
                        Applied::Unchanged | Applied::Stale => {}
                        Applied::SessionEnded => {
                            tracing::debug!("Discarding {} sweep results from a previous session", trigger.as_str());
                            return None;
                        }
                    }
                }
                Err(e) => {
                    failed += 1;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_lookup(false);
                    }
                    tracing::warn!("Status lookup failed for {}: {} (keeping last known status)", target, e);
                }
            }
        }

        // Re-read the guard now that every lookup has resolved
        let control = self.control.lock().await;
        if control.phase != PollerPhase::Active || control.generation != generation {
            tracing::debug!("Discarding {} sweep results from a previous session", trigger.as_str());
            return None;
        }

        let mut state = self.state.write().await;
        let cadence = state.cadence_for(&self.config);
        if cadence != state.cadence {
            tracing::debug!("Poller cadence {:?} -> {:?}", state.cadence, cadence);
        }
        state.cadence = cadence;
        state.last_sweep_at = Some(Utc::now());
        let next_interval = self.config.interval_for(cadence);

        drop(state);
        drop(control);

        if let Some(metrics) = &self.metrics {
            metrics.set_poll_interval(next_interval);
        }

        Some(SweepReport {
            polled: targets.len(),
            succeeded,
            failed,
            changes,
            cadence,
            next_interval,
        })
    }

    /// Store one lookup result as soon as it arrives.
    ///
    /// A result is dropped when a lookup that started later has already been stored.
    async fn apply_status(
        &self,
        generation: u64,
        target: MonitorTarget,
        sequence: u64,
        status: String,
    ) -> Applied {
        let control = self.control.lock().await;
        if control.phase != PollerPhase::Active || control.generation != generation {
            return Applied::SessionEnded;
        }

        let mut state = self.state.write().await;
        if let Some(current) = state.statuses.get(&target) {
            if current.sequence > sequence {
                tracing::debug!(
                    "Ignoring stale status for {} (lookup {} superseded by {})",
                    target,
                    sequence,
                    current.sequence
                );
                return Applied::Stale;
            }
        }

        let observed_at = Utc::now();
        let previous = state.statuses.insert(
            target.clone(),
            TargetStatus {
                last_known_status: status.clone(),
                last_polled_at: observed_at,
                sequence,
            },
        );

        match previous {
            Some(previous) if previous.last_known_status != status => Applied::Changed(
                StatusChange::new(target, previous.last_known_status, status, observed_at),
            ),
            _ => Applied::Unchanged,
        }
    }
}
