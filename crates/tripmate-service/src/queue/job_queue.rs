//! Worker pool over priority lanes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use tripmate_config::QueueConfig;
use tripmate_core::{Result, TripmateError};

use super::executor::{JobContext, JobError, JobExecutor, ProgressReporter};
use super::job::{
    JobId, JobKind, JobPayload, JobProgress, JobReceipt, JobRequest, JobState, JobStatus, Priority,
};
use super::lanes::PriorityLanes;
use super::retry::RetryPolicy;
use crate::output::JobOutput;
use crate::store::ResultStore;

/// What a shutdown did to unfinished jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReport {
    /// Jobs still queued, never started.
    pub cancelled: usize,
    /// In-flight jobs that finished within the grace period.
    pub completed_in_grace: usize,
    /// In-flight jobs forcefully terminated after the grace period.
    pub aborted: usize,
}

struct JobRecord {
    payload: Arc<JobPayload>,
    kind: JobKind,
    priority: Priority,
    state: JobState,
    retry_count: u32,
    max_retries: u32,
    timeout: Duration,
    progress: Option<JobProgress>,
    result: Option<JobOutput>,
    error: Option<String>,
    finished_at: Option<Instant>,
}

#[derive(Default)]
struct QueueState {
    jobs: HashMap<JobId, JobRecord>,
    lanes: PriorityLanes,
    accepting: bool,
    completed_runs: u64,
    total_run_ms: u64,
}

impl QueueState {
    fn transition(&mut self, id: JobId, state: JobState) -> Option<&mut JobRecord> {
        let record = self.jobs.get_mut(&id)?;
        debug!(
            event = "job_state",
            job_id = %id,
            kind = %record.kind,
            from = %record.state,
            to = %state,
        );
        record.state = state;
        record.finished_at = state.is_terminal().then(Instant::now);
        Some(record)
    }

    fn busy(&self) -> usize {
        self.jobs
            .values()
            .filter(|r| r.state == JobState::Processing)
            .count()
    }

    /// Forgets finished jobs older than `retain`, then the oldest ones
    /// beyond `max_finished`.
    fn prune(&mut self, retain: Duration, max_finished: usize) {
        let now = Instant::now();
        self.jobs.retain(|_, r| {
            r.finished_at
                .map_or(true, |at| now.saturating_duration_since(at) < retain)
        });

        let mut finished: Vec<(Instant, JobId)> = self
            .jobs
            .iter()
            .filter_map(|(id, r)| r.finished_at.map(|at| (at, *id)))
            .collect();
        if finished.len() <= max_finished {
            return;
        }
        finished.sort_unstable_by_key(|(at, _)| *at);
        let excess = finished.len() - max_finished;
        for (_, id) in finished.into_iter().take(excess) {
            self.jobs.remove(&id);
        }
    }
}

struct Shared {
    state: Mutex<QueueState>,
    notify: Notify,
    executor: Arc<dyn JobExecutor>,
    store: Option<Arc<dyn ResultStore>>,
    config: QueueConfig,
    policy: RetryPolicy,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(&self, state: &mut QueueState) {
        state.prune(self.config.retain_finished(), self.config.max_finished_jobs);
    }

    fn average_run(&self, state: &QueueState) -> Duration {
        if state.completed_runs == 0 {
            Duration::from_millis(self.config.default_job_estimate_ms)
        } else {
            Duration::from_millis(state.total_run_ms / state.completed_runs)
        }
    }
}

/// Asynchronous job queue with a fixed worker pool.
///
/// Jobs wait in three FIFO lanes, one per [`Priority`]; a free worker takes
/// the head of the highest non-empty lane and running jobs are never
/// preempted. Failed attempts are retried with [`RetryPolicy`] backoff.
///
/// Dropping the queue aborts its workers; call [`JobQueue::shutdown`] for a
/// graceful stop.
pub struct JobQueue {
    shared: Arc<Shared>,
    workers: Mutex<Option<JoinSet<()>>>,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl JobQueue {
    /// Spawns `worker_pool_size` workers on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(
        config: QueueConfig,
        executor: Arc<dyn JobExecutor>,
        store: Option<Arc<dyn ResultStore>>,
    ) -> Self {
        let workers = config.worker_pool_size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                accepting: true,
                ..QueueState::default()
            }),
            notify: Notify::new(),
            executor,
            store,
            policy: RetryPolicy::from_config(&config),
            config,
        });

        let mut set = JoinSet::new();
        for worker in 0..workers {
            set.spawn(worker_loop(Arc::clone(&shared), worker));
        }
        info!(event = "queue_start", workers, "job queue started");

        Self {
            shared,
            workers: Mutex::new(Some(set)),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.shared.config
    }

    /// Adds a job to the lane of its priority.
    ///
    /// # Errors
    ///
    /// [`TripmateError::QueueClosed`] after [`JobQueue::shutdown`].
    pub fn enqueue(&self, request: JobRequest) -> Result<JobReceipt> {
        let id = JobId::new();
        let kind = request.payload.kind();
        let receipt = {
            let mut state = self.shared.lock();
            if !state.accepting {
                return Err(TripmateError::QueueClosed);
            }
            self.shared.prune(&mut state);
            state.jobs.insert(
                id,
                JobRecord {
                    payload: Arc::new(request.payload),
                    kind,
                    priority: request.priority,
                    state: JobState::Queued,
                    retry_count: 0,
                    max_retries: request.max_retries.unwrap_or(self.shared.policy.max_retries),
                    timeout: request
                        .timeout
                        .unwrap_or_else(|| kind.timeout(&self.shared.config.timeouts)),
                    progress: None,
                    result: None,
                    error: None,
                    finished_at: None,
                },
            );
            state.lanes.push(request.priority, id);
            let queue_position = state.lanes.position(id).unwrap_or(0);

            // Waves of work ahead: queued jobs plus those already running.
            let workers = self.shared.config.worker_pool_size.max(1);
            let waves = ((queue_position + state.busy() + 1).div_ceil(workers) - 1) as u32;
            JobReceipt {
                job_id: id,
                queue_position,
                estimated_start: self.shared.average_run(&state) * waves,
            }
        };

        info!(
            event = "job_enqueued",
            job_id = %id,
            kind = %kind,
            priority = ?request.priority,
            queue_position = receipt.queue_position,
        );
        self.shared.notify.notify_waiters();
        Ok(receipt)
    }

    /// Snapshot of a job, or `None` for an unknown id.
    ///
    /// Finished jobs are forgotten after `retain_finished_ms` or once more
    /// than `max_finished_jobs` have finished since.
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        let state = self.shared.lock();
        let record = state.jobs.get(&id)?;
        Some(JobStatus {
            job_id: id,
            state: record.state,
            kind: record.kind,
            priority: record.priority,
            retry_count: record.retry_count,
            max_retries: record.max_retries,
            progress: record.progress.clone(),
            result: record.result.clone(),
            error: record.error.clone(),
            queue_position: state.lanes.position(id),
        })
    }

    /// Cancels a queued job. Returns false for unknown, running or finished
    /// jobs.
    pub fn cancel(&self, id: JobId) -> bool {
        let mut state = self.shared.lock();
        if state.jobs.get(&id).map(|r| r.state) != Some(JobState::Queued) {
            return false;
        }
        state.lanes.remove(id);
        state.transition(id, JobState::Cancelled);
        info!(event = "job_cancelled", job_id = %id);
        true
    }

    /// Number of jobs waiting for a worker.
    pub fn queued_len(&self) -> usize {
        self.shared.lock().lanes.len()
    }

    /// Stops the queue.
    ///
    /// New jobs are refused and queued jobs are cancelled at once. In-flight
    /// jobs get `grace` to finish; the rest are aborted and marked
    /// cancelled. A second call reports nothing.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        let Some(mut workers) = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return ShutdownReport::default();
        };

        let (cancelled, in_flight) = {
            let mut state = self.shared.lock();
            state.accepting = false;
            state.lanes.drain();
            let mut cancelled = 0;
            let mut in_flight = Vec::new();
            let ids: Vec<JobId> = state.jobs.keys().copied().collect();
            for id in ids {
                match state.jobs.get(&id).map(|r| r.state) {
                    Some(JobState::Queued) => {
                        state.transition(id, JobState::Cancelled);
                        cancelled += 1;
                    }
                    Some(JobState::Processing) => in_flight.push(id),
                    _ => {}
                }
            }
            (cancelled, in_flight)
        };
        info!(
            event = "shutdown",
            phase = "draining",
            cancelled,
            in_flight = in_flight.len(),
            grace_ms = grace.as_millis() as u64,
        );
        self.shared.notify.notify_waiters();

        let drained = tokio::time::timeout(grace, async {
            while workers.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            workers.abort_all();
            while workers.join_next().await.is_some() {}
        }

        let mut report = ShutdownReport {
            cancelled,
            ..ShutdownReport::default()
        };
        let mut state = self.shared.lock();
        for id in in_flight {
            match state.jobs.get(&id).map(|r| r.state) {
                Some(JobState::Processing) => {
                    if let Some(record) = state.transition(id, JobState::Cancelled) {
                        record.error = Some("aborted at shutdown".to_string());
                    }
                    report.aborted += 1;
                }
                Some(_) => report.completed_in_grace += 1,
                None => {}
            }
        }
        info!(
            event = "shutdown",
            phase = "stopped",
            cancelled = report.cancelled,
            completed_in_grace = report.completed_in_grace,
            aborted = report.aborted,
        );
        report
    }
}

async fn worker_loop(shared: Arc<Shared>, worker: usize) {
    debug!(event = "worker_start", worker);
    loop {
        let notified = shared.notify.notified();
        let next = {
            let mut state = shared.lock();
            if !state.accepting {
                break;
            }
            shared.prune(&mut state);
            state.lanes.pop().and_then(|id| {
                let record = state.transition(id, JobState::Processing)?;
                Some(Attempt {
                    id,
                    payload: Arc::clone(&record.payload),
                    kind: record.kind,
                    retry_count: record.retry_count,
                    timeout: record.timeout,
                })
            })
        };
        match next {
            Some(attempt) => run_attempt(&shared, attempt).await,
            None => notified.await,
        }
    }
    debug!(event = "worker_stop", worker);
}

struct Attempt {
    id: JobId,
    payload: Arc<JobPayload>,
    kind: JobKind,
    retry_count: u32,
    timeout: Duration,
}

async fn run_attempt(shared: &Arc<Shared>, attempt: Attempt) {
    let ctx = JobContext {
        job_id: attempt.id,
        kind: attempt.kind,
        retry_count: attempt.retry_count,
        progress: progress_reporter(Arc::downgrade(shared), attempt.id),
    };

    let start = Instant::now();
    let outcome = match tokio::time::timeout(
        attempt.timeout,
        shared.executor.execute(&attempt.payload, ctx),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(JobError::TimedOut(attempt.timeout)),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(output) => {
            if let Some(store) = &shared.store {
                if let Err(e) = store.store_job_result(attempt.id, &output).await {
                    warn!(event = "store_error", job_id = %attempt.id, error = %e, "job result not persisted");
                }
            }
            let mut state = shared.lock();
            state.completed_runs += 1;
            state.total_run_ms += elapsed_ms;
            if let Some(record) = state.transition(attempt.id, JobState::Completed) {
                record.result = Some(output);
                record.progress = Some(JobProgress {
                    percentage: 100.0,
                    message: None,
                });
            }
            info!(event = "job_completed", job_id = %attempt.id, kind = %attempt.kind, elapsed_ms);
        }
        Err(e) => fail_attempt(shared, attempt, e),
    }
}

fn fail_attempt(shared: &Arc<Shared>, attempt: Attempt, error: JobError) {
    let retry_delay = {
        let mut state = shared.lock();
        let accepting = state.accepting;
        let Some(record) = state.jobs.get_mut(&attempt.id) else {
            return;
        };
        record.error = Some(error.to_string());
        let retry = accepting
            && error.is_retryable()
            && RetryPolicy::allows_retry(record.retry_count, record.max_retries);
        if retry {
            record.retry_count += 1;
            let delay = shared.policy.delay(record.retry_count);
            state.transition(attempt.id, JobState::Queued);
            Some(delay)
        } else {
            state.transition(attempt.id, JobState::Failed);
            None
        }
    };

    match retry_delay {
        Some(delay) => {
            warn!(
                event = "job_retry",
                job_id = %attempt.id,
                kind = %attempt.kind,
                retry = attempt.retry_count + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
            );
            let shared = Arc::clone(shared);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                requeue(&shared, attempt.id);
            });
        }
        None => {
            warn!(
                event = "job_failed",
                job_id = %attempt.id,
                kind = %attempt.kind,
                retries = attempt.retry_count,
                error = %error,
            );
        }
    }
}

/// Puts a job back in its lane after the backoff, unless it was cancelled
/// or the queue stopped in the meantime.
fn requeue(shared: &Shared, id: JobId) {
    {
        let mut state = shared.lock();
        if !state.accepting {
            return;
        }
        let Some(record) = state.jobs.get(&id) else {
            return;
        };
        if record.state != JobState::Queued {
            return;
        }
        let priority = record.priority;
        state.lanes.push(priority, id);
    }
    shared.notify.notify_waiters();
}

fn progress_reporter(shared: Weak<Shared>, id: JobId) -> ProgressReporter {
    ProgressReporter::new(move |progress| {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut state = shared.lock();
        if let Some(record) = state.jobs.get_mut(&id) {
            if record.state == JobState::Processing {
                record.progress = Some(progress);
            }
        }
    })
}
