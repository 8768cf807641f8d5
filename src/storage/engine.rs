//! Single-Owner Store Engine with Lazy and Active Expiry
//!
//! This module implements the core of FlashFS: a store engine that owns the
//! key → object mapping from exactly one Tokio task. Callers never touch the
//! mapping; they send requests into the engine's inbox and, for reads, wait on a
//! per-request reply slot.
//!
//! ## Concurrency Model
//!
//! ```text
//!   write()  ──┐
//!   write()  ──┤      bounded mpsc inbox (FIFO)       ┌──────────────────────┐
//!   read()   ──┼──────────────────────────────────────>│     Command Loop     │
//!   len()    ──┘                                       │                      │
//!      ▲                                               │  ObjectMap (owned)   │
//!      │              oneshot reply per request        │                      │
//!      └───────────────────────────────────────────────│  select! {           │
//!                                                      │    stop signal,      │
//!   stop()  ────────── watch channel ─────────────────>│    sweep tick,       │
//!                                                      │    inbox request,    │
//!                                                      │  }                   │
//!                                                      └──────────────────────┘
//! ```
//!
//! Because every mutation runs on the loop, a read that finds an expired object
//! and deletes it is atomic with respect to concurrent writers without any lock
//! on the mapping.
//!
//! ## Hand-off Semantics
//!
//! - `write` returns once the inbox has *accepted* the request, not once it is
//!   applied. A later read from any caller is processed after it.
//! - `read` is a full request/response rendezvous.
//! - Both fail fast with [`StoreError::Stopped`] after `stop()`, and both are
//!   bounded by [`StoreConfig::request_timeout`] when it is set.
//!
//! ## Lifecycle
//!
//! `Idle` → `Running` (after [`StoreEngine::start`]) → `Stopped` (after
//! [`StoreEngine::stop`] or drop). An engine never restarts.

use crate::storage::object::{Lookup, ObjectMap};
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest sweep interval the command loop will run with.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Default number of requests the inbox buffers before writers wait.
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

/// Default bound on how long a caller waits for the engine.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the store engine.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between active expiry sweeps (zero is raised to one millisecond)
    pub sweep_interval: Duration,

    /// Capacity of the request inbox (zero is raised to one)
    pub inbox_capacity: usize,

    /// Upper bound on each hand-off and reply wait (None = wait forever)
    pub request_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

/// Errors returned by the store engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The key was never stored, or its object has expired
    #[error("object not found: {0}")]
    NotFound(String),

    /// The engine has been stopped and no longer serves requests
    #[error("store engine is stopped")]
    Stopped,

    /// `start()` was called on an engine that is already running
    #[error("store engine is already running")]
    AlreadyStarted,

    /// The engine did not accept or answer a request in time
    #[error("store engine did not respond within {0:?}")]
    Timeout(Duration),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The lifecycle state of a store engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; requests queue up but are not processed
    Idle,
    /// The command loop is running
    Running,
    /// Stop was signalled; the engine will not restart
    Stopped,
}

/// A request sent to the command loop.
#[derive(Debug)]
enum Command {
    Write {
        key: String,
        payload: Bytes,
        ttl: Duration,
    },
    Read {
        key: String,
        reply: oneshot::Sender<Option<Bytes>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
}

#[derive(Debug)]
enum Lifecycle {
    Idle { inbox: mpsc::Receiver<Command> },
    Running { task: JoinHandle<()> },
    Stopped,
}

/// Counters updated by the command loop, readable from any thread.
#[derive(Debug, Default)]
struct StatsCounters {
    objects: AtomicU64,
    writes: AtomicU64,
    overwrites: AtomicU64,
    reads: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    expired_on_read: AtomicU64,
    expired_by_sweep: AtomicU64,
}

/// Store engine statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of objects currently held (including not-yet-evicted expired ones)
    pub objects: u64,
    /// Total writes applied
    pub writes: u64,
    /// Writes that replaced an existing object
    pub overwrites: u64,
    /// Total reads answered
    pub reads: u64,
    /// Reads that returned a payload
    pub hits: u64,
    /// Reads that returned not-found
    pub misses: u64,
    /// Objects evicted lazily by a read
    pub expired_on_read: u64,
    /// Objects evicted by the periodic sweep
    pub expired_by_sweep: u64,
}

/// The store engine.
///
/// Wrap it in an `Arc` to share it between request handlers. All methods take
/// `&self`; the object mapping itself lives inside the command loop task.
///
/// # Example
///
/// ```
/// use flashfs::storage::{StoreConfig, StoreEngine};
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), flashfs::storage::StoreError> {
/// let engine = StoreEngine::new(StoreConfig::default());
/// engine.start()?;
///
/// engine
///     .write("notes.txt", Bytes::from("hello"), Duration::from_secs(60))
///     .await?;
/// assert_eq!(engine.read("notes.txt").await?, Bytes::from("hello"));
///
/// engine.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct StoreEngine {
    config: StoreConfig,
    inbox: mpsc::Sender<Command>,
    shutdown_tx: watch::Sender<bool>,
    lifecycle: Mutex<Lifecycle>,
    stats: Arc<StatsCounters>,
}

impl std::fmt::Debug for StoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEngine")
            .field("state", &self.state())
            .field("objects", &self.stats.objects.load(Ordering::Relaxed))
            .field("sweep_interval", &self.config.sweep_interval)
            .finish()
    }
}

impl Default for StoreEngine {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl StoreEngine {
    /// Creates an idle engine. Call [`start`](Self::start) to begin processing.
    pub fn new(config: StoreConfig) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            inbox: inbox_tx,
            shutdown_tx,
            lifecycle: Mutex::new(Lifecycle::Idle { inbox: inbox_rx }),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> EngineState {
        match &*self.lifecycle() {
            Lifecycle::Idle { .. } => EngineState::Idle,
            Lifecycle::Running { .. } => EngineState::Running,
            Lifecycle::Stopped => EngineState::Stopped,
        }
    }

    /// Starts the command loop on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyStarted`] if the loop is already running
    /// - [`StoreError::Stopped`] if the engine has been stopped
    pub fn start(&self) -> StoreResult<()> {
        let mut lifecycle = self.lifecycle();

        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle { inbox } => {
                if *self.shutdown_tx.borrow() {
                    return Err(StoreError::Stopped);
                }

                let task = tokio::spawn(command_loop(
                    inbox,
                    self.shutdown_tx.subscribe(),
                    self.config.sweep_interval,
                    Arc::clone(&self.stats),
                ));
                *lifecycle = Lifecycle::Running { task };

                info!(
                    sweep_interval_ms = self.config.sweep_interval.as_millis(),
                    inbox_capacity = self.config.inbox_capacity,
                    "Store engine started"
                );
                Ok(())
            }
            running @ Lifecycle::Running { .. } => {
                *lifecycle = running;
                Err(StoreError::AlreadyStarted)
            }
            Lifecycle::Stopped => Err(StoreError::Stopped),
        }
    }

    /// Signals the command loop to exit and waits for it to finish.
    ///
    /// Requests still queued when the loop exits are dropped: their writers have
    /// already returned, and their readers receive [`StoreError::Stopped`].
    /// Calling `stop` again is a no-op.
    pub async fn stop(&self) {
        let task = {
            let mut lifecycle = self.lifecycle();
            self.shutdown_tx.send_replace(true);

            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running { task } => Some(task),
                Lifecycle::Idle { .. } | Lifecycle::Stopped => None,
            }
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Store command loop ended abnormally");
            }
            info!("Store engine stopped");
        }
    }

    /// Stores `payload` under `key` for `ttl`, replacing any existing object.
    ///
    /// Returns once the engine has accepted the request into its inbox. A zero
    /// TTL stores an object that is already expired.
    pub async fn write(
        &self,
        key: impl Into<String>,
        payload: Bytes,
        ttl: Duration,
    ) -> StoreResult<()> {
        self.ensure_accepting()?;

        self.submit(Command::Write {
            key: key.into(),
            payload,
            ttl,
        })
        .await
    }

    /// Returns the payload stored under `key`.
    ///
    /// An expired object is evicted as a side effect and reported as not found,
    /// exactly like a key that never existed.
    pub async fn read(&self, key: &str) -> StoreResult<Bytes> {
        self.ensure_accepting()?;

        let (reply, response) = oneshot::channel();
        self.submit(Command::Read {
            key: key.to_string(),
            reply,
        })
        .await?;

        self.await_reply(response)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Returns the number of objects the engine currently holds.
    ///
    /// The count is taken by the command loop itself, so it reflects every
    /// request accepted before this one. Expired objects that have not yet been
    /// observed by a read or a sweep are included.
    pub async fn len(&self) -> StoreResult<usize> {
        self.ensure_accepting()?;

        let (reply, response) = oneshot::channel();
        self.submit(Command::Len { reply }).await?;
        self.await_reply(response).await
    }

    /// Returns true if the engine currently holds no objects.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Returns a snapshot of the engine statistics.
    pub fn stats(&self) -> StoreStats {
        let counters = &self.stats;
        StoreStats {
            objects: counters.objects.load(Ordering::Relaxed),
            writes: counters.writes.load(Ordering::Relaxed),
            overwrites: counters.overwrites.load(Ordering::Relaxed),
            reads: counters.reads.load(Ordering::Relaxed),
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            expired_on_read: counters.expired_on_read.load(Ordering::Relaxed),
            expired_by_sweep: counters.expired_by_sweep.load(Ordering::Relaxed),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn ensure_accepting(&self) -> StoreResult<()> {
        if *self.shutdown_tx.borrow() {
            return Err(StoreError::Stopped);
        }
        Ok(())
    }

    /// Hands a request to the inbox.
    async fn submit(&self, command: Command) -> StoreResult<()> {
        let sent = match self.config.request_timeout {
            Some(limit) => timeout(limit, self.inbox.send(command))
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => self.inbox.send(command).await,
        };

        sent.map_err(|_| StoreError::Stopped)
    }

    /// Waits for the command loop to answer a request.
    async fn await_reply<T>(&self, response: oneshot::Receiver<T>) -> StoreResult<T> {
        let received = match self.config.request_timeout {
            Some(limit) => timeout(limit, response)
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => response.await,
        };

        // The reply slot is only dropped unanswered when the loop has exited
        received.map_err(|_| StoreError::Stopped)
    }
}

impl Drop for StoreEngine {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// The command loop: sole owner and mutator of the object map.
async fn command_loop(
    mut inbox: mpsc::Receiver<Command>,
    mut shutdown_rx: watch::Receiver<bool>,
    sweep_interval: Duration,
    stats: Arc<StatsCounters>,
) {
    let mut objects = ObjectMap::new();
    let period = sweep_interval.max(MIN_SWEEP_INTERVAL);
    let mut sweep = interval_at(Instant::now() + period, period);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if *shutdown_rx.borrow_and_update() {
        return;
    }

    loop {
        tokio::select! {
            biased;

            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Store command loop received shutdown signal");
                    break;
                }
            }
            // A due tick goes ahead of queued requests so a busy inbox cannot starve the sweep
            _ = sweep.tick() => sweep_expired(&mut objects, &stats),
            command = inbox.recv() => match command {
                Some(command) => apply(&mut objects, command, &stats),
                None => {
                    debug!("Store inbox closed");
                    break;
                }
            },
        }
    }

    inbox.close();
    debug!(objects = objects.len(), "Store command loop exited");
}

/// Applies one inbox request to the object map.
fn apply(objects: &mut ObjectMap, command: Command, stats: &StatsCounters) {
    let now = Instant::now();

    match command {
        Command::Write { key, payload, ttl } => {
            trace!(key = %key, bytes = payload.len(), ttl_ms = ttl.as_millis(), "Write");
            if !objects.insert(key, payload, ttl, now) {
                stats.overwrites.fetch_add(1, Ordering::Relaxed);
            }
            stats.writes.fetch_add(1, Ordering::Relaxed);
        }
        Command::Read { key, reply } => {
            stats.reads.fetch_add(1, Ordering::Relaxed);

            let payload = match objects.lookup(&key, now) {
                Lookup::Hit(payload) => {
                    stats.hits.fetch_add(1, Ordering::Relaxed);
                    Some(payload)
                }
                Lookup::Expired => {
                    debug!(key = %key, "Evicted expired object on read");
                    stats.expired_on_read.fetch_add(1, Ordering::Relaxed);
                    stats.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Lookup::Absent => {
                    stats.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            };

            // The caller may have timed out and gone away
            let _ = reply.send(payload);
        }
        Command::Len { reply } => {
            let _ = reply.send(objects.len());
        }
    }

    stats.objects.store(objects.len() as u64, Ordering::Relaxed);
}

/// Evicts every expired object.
fn sweep_expired(objects: &mut ObjectMap, stats: &StatsCounters) {
    let evicted = objects.sweep(Instant::now());

    if !evicted.is_empty() {
        for key in &evicted {
            debug!(key = %key, "Evicted expired object");
        }
        stats
            .expired_by_sweep
            .fetch_add(evicted.len() as u64, Ordering::Relaxed);
        stats.objects.store(objects.len() as u64, Ordering::Relaxed);
        debug!(
            expired = evicted.len(),
            objects_remaining = objects.len(),
            "Expired objects swept"
        );
    }
}
