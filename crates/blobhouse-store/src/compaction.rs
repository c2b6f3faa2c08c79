//! Compaction Scheduling
//!
//! One [`CompactionManager`] runs per storage mount point. It owns a single
//! dedicated scheduler thread that cycles through every store on that mount
//! point, decides which ones qualify for compaction, and invokes compaction
//! on them strictly one at a time — bounding I/O contention on the shared
//! physical volume.
//!
//! ## Lifecycle
//!
//! ```text
//!            enable()                 disable()
//! Disabled ───────────► Resuming ──► Running ◄──► Waiting ──► Terminated
//! (config off:          (finish       (cycle       (park for
//!  never starts          leftover      stores,      interval or
//!  a thread)             compactions)  compact)     early wake)
//! ```
//!
//! - **Resuming**: on start, every started store gets a chance to finish a
//!   compaction interrupted by a previous shutdown, before any steady-state
//!   eligibility check runs for it.
//! - **Running**: per pass, each started, non-skipped store is checked for
//!   eligibility and compacted if required. A store that fails — during
//!   resume or steady state — is added to a skip-set and excluded from all
//!   further automatic compaction for the lifetime of this scheduler; it
//!   keeps serving reads and writes. The scheduler thread itself never
//!   crashes over a store failure.
//! - **Waiting**: after a pass, the thread parks for the configured check
//!   frequency minus the time the pass took (clamped at zero), or until
//!   `disable()` signals it.
//!
//! ## Shutdown
//!
//! `disable()` flips the enabled flag and signals the wait condition under
//! the same mutex the run loop parks on, so a parked thread wakes
//! immediately instead of sleeping out the interval and a flip can never
//! race a park into a missed wakeup. An in-flight `compact()` call is not
//! interrupted; the loop observes the flag between stores and between
//! passes. `await_termination()` waits a bounded couple of seconds for the
//! thread to finish and logs rather than propagates if it times out.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::{Condvar, Mutex};
use tracing::{error, info, warn};

use crate::config::CompactionConfig;
use crate::error::{Result, StoreError};
use crate::store::{BlobStore, CompactionDetails};

/// Bound on how long `await_termination` waits for the scheduler thread.
const AWAIT_TERMINATION_TIMEOUT: Duration = Duration::from_secs(2);

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Schedules and executes compaction for all stores on one mount point.
pub struct CompactionManager {
    mount_path: String,
    config: CompactionConfig,
    /// None when compaction is disabled by configuration.
    executor: Option<Arc<CompactionExecutor>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl CompactionManager {
    pub fn new(
        mount_path: impl Into<String>,
        config: CompactionConfig,
        stores: Vec<Arc<dyn BlobStore>>,
    ) -> Self {
        let mount_path = mount_path.into();
        let executor = config.enabled.then(|| {
            Arc::new(CompactionExecutor {
                mount_path: mount_path.clone(),
                config: config.clone(),
                stores,
                state: Mutex::new(ExecutorState {
                    enabled: true,
                    running: false,
                }),
                wait_cond: Condvar::new(),
            })
        });
        Self {
            mount_path,
            config,
            executor,
            thread: Mutex::new(None),
        }
    }

    /// Start the scheduler thread. No-op when compaction is disabled by
    /// configuration or the thread is already running.
    pub fn enable(&self) {
        let Some(executor) = &self.executor else {
            return;
        };
        let mut slot = self.thread.lock();
        if slot.is_some() {
            warn!(mount_path = %self.mount_path, "compaction already enabled");
            return;
        }
        executor.state.lock().running = true;
        let exec = Arc::clone(executor);
        let spawned = thread::Builder::new()
            .name(format!("compaction-{}", self.mount_path))
            .spawn(move || exec.run());
        match spawned {
            Ok(handle) => {
                info!(mount_path = %self.mount_path, "compaction thread started");
                *slot = Some(handle);
            }
            Err(e) => {
                executor.state.lock().running = false;
                error!(mount_path = %self.mount_path, error = %e, "failed to spawn compaction thread");
            }
        }
    }

    /// Disallow any new compactions and wake the scheduler thread if it is
    /// parked between passes. Does not interrupt a compaction already in
    /// progress.
    pub fn disable(&self) {
        if let Some(executor) = &self.executor {
            let mut state = executor.state.lock();
            state.enabled = false;
            executor.wait_cond.notify_all();
        }
    }

    /// Wait a bounded period for the scheduler thread to finish. Logs and
    /// returns if the thread is still busy when the bound expires; this is
    /// a best-effort join, not a guarantee.
    pub fn await_termination(&self) {
        let Some(executor) = &self.executor else {
            return;
        };
        let deadline = Instant::now() + AWAIT_TERMINATION_TIMEOUT;
        let mut state = executor.state.lock();
        while state.running {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            executor.wait_cond.wait_for(&mut state, deadline - now);
        }
        let finished = !state.running;
        drop(state);

        if finished {
            if let Some(handle) = self.thread.lock().take() {
                if handle.join().is_err() {
                    error!(mount_path = %self.mount_path, "compaction thread panicked");
                }
            }
        } else {
            error!(
                mount_path = %self.mount_path,
                timeout = ?AWAIT_TERMINATION_TIMEOUT,
                "compaction thread did not stop within the termination timeout"
            );
        }
    }

    /// Eligibility query for one store: proposes compaction iff the store's
    /// used capacity meets the configured threshold and the store reports
    /// log segments outside the journal. `None` means no compaction this
    /// pass, which is not an error.
    pub fn compaction_details(&self, store: &dyn BlobStore) -> Result<Option<CompactionDetails>> {
        compaction_details(&self.config, store)
    }
}

struct ExecutorState {
    /// Cleared by `disable()`; observed by the run loop between stores and
    /// at every park.
    enabled: bool,
    /// Set while the scheduler thread is alive; cleared as its last act.
    running: bool,
}

/// The scheduler loop. Shared between the manager (for signaling) and the
/// thread that runs it.
struct CompactionExecutor {
    mount_path: String,
    config: CompactionConfig,
    stores: Vec<Arc<dyn BlobStore>>,
    state: Mutex<ExecutorState>,
    wait_cond: Condvar,
}

impl CompactionExecutor {
    /// Starts by resuming any compactions left halfway by a previous run,
    /// then cycles through the stores at the configured frequency.
    fn run(&self) {
        // The skip-set lives on the scheduler thread alone; a store that
        // enters it stays there for the lifetime of this scheduler.
        let mut stores_to_skip: HashSet<usize> = HashSet::new();

        for (idx, store) in self.stores.iter().enumerate() {
            if store.is_started() {
                if let Err(e) = store.maybe_resume_compaction() {
                    error!(
                        store = store.name(),
                        error = %e,
                        "compaction resume failed, continuing with the next store"
                    );
                    stores_to_skip.insert(idx);
                }
            }
        }

        while self.is_enabled() {
            let pass_start_ms = now_ms();
            for (idx, store) in self.stores.iter().enumerate() {
                if !self.is_enabled() {
                    break;
                }
                if !store.is_started() || stores_to_skip.contains(&idx) {
                    continue;
                }
                if let Err(e) = self.compact_if_required(store.as_ref()) {
                    error!(
                        store = store.name(),
                        error = %e,
                        "compaction failed, continuing with the next store"
                    );
                    stores_to_skip.insert(idx);
                }
            }

            // Park until the next cadence boundary; a pass that overran the
            // interval waits zero, not negative, time.
            let elapsed = now_ms().saturating_sub(pass_start_ms);
            let wait = self.config.check_frequency_ms().saturating_sub(elapsed);
            let mut state = self.state.lock();
            if !state.enabled {
                break;
            }
            self.wait_cond
                .wait_for(&mut state, Duration::from_millis(wait));
        }

        let mut state = self.state.lock();
        state.running = false;
        self.wait_cond.notify_all();
        drop(state);
        info!(mount_path = %self.mount_path, "compaction thread exiting");
    }

    fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    fn compact_if_required(&self, store: &dyn BlobStore) -> Result<()> {
        if let Some(details) = compaction_details(&self.config, store)? {
            info!(
                store = store.name(),
                segments = details.log_segments().len(),
                reference_time_ms = details.reference_time_ms(),
                "starting compaction"
            );
            store.compact(details)?;
        }
        Ok(())
    }
}

/// The V0 eligibility policy: entire log segments outside the journal, or
/// nothing. Segments overlapping the journal's recency window are never
/// partially compacted.
fn compaction_details(
    config: &CompactionConfig,
    store: &dyn BlobStore,
) -> Result<Option<CompactionDetails>> {
    if !store.is_started() {
        return Err(StoreError::NotStarted(store.name().to_string()));
    }
    let used = store.size_in_bytes();
    let total = store.capacity_in_bytes();
    let threshold = (config.min_used_capacity_percentage as f64 / 100.0) * total as f64;
    if (used as f64) < threshold {
        return Ok(None);
    }
    match store.log_segments_not_in_journal() {
        Some(segments) if !segments.is_empty() => Ok(Some(CompactionDetails::new(
            now_ms().saturating_sub(config.retention_time_ms()),
            segments,
        ))),
        _ => Ok(None),
    }
}
