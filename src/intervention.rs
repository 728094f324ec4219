//! Intervention worker
//!
//! Runs the slow, failure-prone part of an intervention (screen context
//! extraction followed by rescue-plan generation) on a dedicated thread so the
//! tick loop never waits on it.
//!
//! Architecture:
//! - Bounded job channel; a full channel drops the job with a counted warning
//! - Each collaborator call runs on a helper thread and is abandoned after its
//!   own timeout
//! - Outcomes flow back over a second channel that the tick loop drains
//! - Cancellation discards any result that completes afterwards

use crate::collaborators::{RescuePlanGenerator, ScreenContextExtractor};
use crate::error::{CollaboratorError, EngineError};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const JOB_CHANNEL_CAPACITY: usize = 4;

/// A reserved intervention waiting to run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionRequest {
    /// Sequence number assigned by the controller
    pub id: u64,
    /// Timestamp of the update that started the sequence
    pub timestamp: f64,
    /// Load score of that update
    pub trigger_score: f64,
}

/// Which step of the sequence failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStage {
    ScreenContext,
    RescuePlan,
}

/// Failure of one intervention sequence
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionFailure {
    pub stage: InterventionStage,
    pub error: CollaboratorError,
}

impl std::fmt::Display for InterventionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self.stage {
            InterventionStage::ScreenContext => "screen context",
            InterventionStage::RescuePlan => "rescue plan",
        };
        write!(f, "{} step failed: {}", stage, self.error)
    }
}

/// Finished intervention, delivered back to the tick loop
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionOutcome {
    pub request: InterventionRequest,
    pub result: Result<String, InterventionFailure>,
}

/// Why a request could not be handed to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// Too many queued jobs
    Backpressure,
    /// Worker has shut down
    Closed,
}

/// Worker counters tracked atomically
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    pub dispatched: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    pub timed_out: AtomicU64,
    pub dropped: AtomicU64,
    pub discarded: AtomicU64,
}

impl WorkerMetrics {
    pub fn snapshot(&self) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkerMetricsSnapshot {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub dropped: u64,
    pub discarded: u64,
}

enum WorkerCmd {
    Run(InterventionRequest),
    Shutdown,
}

/// Time limits for the two collaborator calls of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTimeouts {
    pub extractor: Duration,
    pub generator: Duration,
}

/// Handle to the background intervention thread
pub struct InterventionWorker {
    jobs: Sender<WorkerCmd>,
    outcomes: Receiver<InterventionOutcome>,
    cancelled: Arc<AtomicBool>,
    metrics: Arc<WorkerMetrics>,
    _thread: thread::JoinHandle<()>,
}

impl InterventionWorker {
    /// Start the worker thread
    pub fn spawn(
        extractor: Arc<dyn ScreenContextExtractor>,
        generator: Arc<dyn RescuePlanGenerator>,
        timeouts: WorkerTimeouts,
    ) -> Result<Self, EngineError> {
        let (jobs_tx, jobs_rx) = bounded(JOB_CHANNEL_CAPACITY);
        let (outcome_tx, outcome_rx) = unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let metrics = Arc::new(WorkerMetrics::default());

        let context = WorkerContext {
            extractor,
            generator,
            timeouts,
            cancelled: Arc::clone(&cancelled),
            metrics: Arc::clone(&metrics),
        };

        let handle = thread::Builder::new()
            .name("cogload-intervention".to_string())
            .spawn(move || context.run(jobs_rx, outcome_tx))
            .map_err(|e| EngineError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            jobs: jobs_tx,
            outcomes: outcome_rx,
            cancelled,
            metrics,
            _thread: handle,
        })
    }

    /// Queue an intervention without blocking
    pub fn dispatch(&self, request: InterventionRequest) -> Result<(), DispatchError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(DispatchError::Closed);
        }
        match self.jobs.try_send(WorkerCmd::Run(request)) {
            Ok(()) => {
                self.metrics.dispatched.fetch_add(1, Ordering::Relaxed);
                debug!(id = request.id, "intervention dispatched");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(id = request.id, "intervention dropped due to backpressure");
                Err(DispatchError::Backpressure)
            }
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::Closed),
        }
    }

    /// Collect all finished interventions without blocking
    pub fn try_outcomes(&self) -> Vec<InterventionOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Wait up to `timeout` for the next finished intervention
    pub fn wait_outcome(&self, timeout: Duration) -> Option<InterventionOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }

    /// Stop accepting work and discard anything still in flight.
    ///
    /// Does not wait for a running collaborator call to return.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            let _ = self.jobs.try_send(WorkerCmd::Shutdown);
            info!("intervention worker cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> WorkerMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Drop for InterventionWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct WorkerContext {
    extractor: Arc<dyn ScreenContextExtractor>,
    generator: Arc<dyn RescuePlanGenerator>,
    timeouts: WorkerTimeouts,
    cancelled: Arc<AtomicBool>,
    metrics: Arc<WorkerMetrics>,
}

impl WorkerContext {
    fn run(self, jobs: Receiver<WorkerCmd>, outcomes: Sender<InterventionOutcome>) {
        for cmd in jobs.iter() {
            let request = match cmd {
                WorkerCmd::Run(request) => request,
                WorkerCmd::Shutdown => break,
            };
            if self.cancelled.load(Ordering::Acquire) {
                self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let result = self.run_sequence();
            match &result {
                Ok(_) => {
                    self.metrics.succeeded.fetch_add(1, Ordering::Relaxed);
                }
                Err(failure) => {
                    if matches!(failure.error, CollaboratorError::Timeout(_)) {
                        self.metrics.timed_out.fetch_add(1, Ordering::Relaxed);
                    }
                    self.metrics.failed.fetch_add(1, Ordering::Relaxed);
                }
            }

            if self.cancelled.load(Ordering::Acquire) {
                self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(id = request.id, "discarding intervention result after cancellation");
                continue;
            }
            if outcomes.send(InterventionOutcome { request, result }).is_err() {
                break;
            }
        }
        debug!("intervention worker stopped");
    }

    fn run_sequence(&self) -> Result<String, InterventionFailure> {
        let extractor = Arc::clone(&self.extractor);
        let context = call_with_timeout("cogload-screen-context", self.timeouts.extractor, move || {
            extractor.extract()
        })
        .map_err(|error| InterventionFailure {
            stage: InterventionStage::ScreenContext,
            error,
        })?;

        let generator = Arc::clone(&self.generator);
        let timeout = self.timeouts.generator;
        let plan = call_with_timeout("cogload-rescue-plan", timeout, move || {
            generator.generate(&context, timeout)
        })
        .map_err(|error| InterventionFailure {
            stage: InterventionStage::RescuePlan,
            error,
        })?;

        if plan.trim().is_empty() {
            return Err(InterventionFailure {
                stage: InterventionStage::RescuePlan,
                error: CollaboratorError::Failed("generator returned an empty plan".to_string()),
            });
        }
        Ok(plan)
    }
}

/// Run a collaborator call on a named helper thread and stop waiting after
/// `timeout`. A late result lands in a dropped channel and is lost.
fn call_with_timeout<F>(name: &str, timeout: Duration, call: F) -> Result<String, CollaboratorError>
where
    F: FnOnce() -> Result<String, CollaboratorError> + Send + 'static,
{
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|e| CollaboratorError::Failed(format!("cannot start {} thread: {}", name, e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!(thread = name, timeout_ms = timeout.as_millis() as u64, "collaborator call timed out");
            Err(CollaboratorError::Timeout(timeout.as_millis() as u64))
        }
        Err(RecvTimeoutError::Disconnected) => Err(CollaboratorError::Failed(format!(
            "{} exited without a result",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CannedRescuePlan, NoScreenContext, StaticScreenContext};

    const WAIT: Duration = Duration::from_secs(5);

    struct SlowGenerator(Duration);

    impl RescuePlanGenerator for SlowGenerator {
        fn generate(&self, _context: &str, _timeout: Duration) -> Result<String, CollaboratorError> {
            thread::sleep(self.0);
            Ok("- too late".to_string())
        }
    }

    struct StuckExtractor(Duration);

    impl ScreenContextExtractor for StuckExtractor {
        fn extract(&self) -> Result<String, CollaboratorError> {
            thread::sleep(self.0);
            Ok("too late".to_string())
        }
    }

    struct PanickingGenerator;

    impl RescuePlanGenerator for PanickingGenerator {
        fn generate(&self, _context: &str, _timeout: Duration) -> Result<String, CollaboratorError> {
            panic!("generator crashed");
        }
    }

    fn request(id: u64) -> InterventionRequest {
        InterventionRequest {
            id,
            timestamp: id as f64,
            trigger_score: 85.0,
        }
    }

    fn worker(
        extractor: Arc<dyn ScreenContextExtractor>,
        generator: Arc<dyn RescuePlanGenerator>,
        timeout: Duration,
    ) -> InterventionWorker {
        let timeouts = WorkerTimeouts {
            extractor: timeout,
            generator: timeout,
        };
        InterventionWorker::spawn(extractor, generator, timeouts).unwrap()
    }

    #[test]
    fn test_successful_sequence() {
        let worker = worker(
            Arc::new(StaticScreenContext("editing quarterly report".to_string())),
            Arc::new(CannedRescuePlan("- Take a 2 minute break".to_string())),
            Duration::from_secs(1),
        );

        worker.dispatch(request(1)).unwrap();
        let outcome = worker.wait_outcome(WAIT).unwrap();
        assert_eq!(outcome.request.id, 1);
        assert_eq!(outcome.result.unwrap(), "- Take a 2 minute break");
        assert_eq!(worker.metrics().succeeded, 1);
    }

    #[test]
    fn test_extraction_failure() {
        let worker = worker(
            Arc::new(NoScreenContext),
            Arc::new(CannedRescuePlan("unused".to_string())),
            Duration::from_secs(1),
        );

        worker.dispatch(request(7)).unwrap();
        let outcome = worker.wait_outcome(WAIT).unwrap();
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.stage, InterventionStage::ScreenContext);
        assert!(matches!(failure.error, CollaboratorError::Unavailable(_)));
    }

    #[test]
    fn test_generator_timeout_is_a_failure() {
        let worker = worker(
            Arc::new(StaticScreenContext("ctx".to_string())),
            Arc::new(SlowGenerator(Duration::from_millis(500))),
            Duration::from_millis(50),
        );

        worker.dispatch(request(2)).unwrap();
        let outcome = worker.wait_outcome(WAIT).unwrap();
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.stage, InterventionStage::RescuePlan);
        assert_eq!(failure.error, CollaboratorError::Timeout(50));
        assert_eq!(worker.metrics().timed_out, 1);
    }

    #[test]
    fn test_extractor_timeout_is_a_failure() {
        let generator = Arc::new(CannedRescuePlan("unused".to_string()));
        let timeouts = WorkerTimeouts {
            extractor: Duration::from_millis(50),
            generator: Duration::from_secs(1),
        };
        let worker =
            InterventionWorker::spawn(Arc::new(StuckExtractor(Duration::from_secs(3))), generator, timeouts)
                .unwrap();

        worker.dispatch(request(8)).unwrap();
        let outcome = worker.wait_outcome(Duration::from_secs(1)).unwrap();
        let failure = outcome.result.unwrap_err();
        assert_eq!(failure.stage, InterventionStage::ScreenContext);
        assert_eq!(failure.error, CollaboratorError::Timeout(50));
        assert_eq!(worker.metrics().timed_out, 1);

        // The stuck call does not block the next sequence
        worker.dispatch(request(9)).unwrap();
        let next = worker.wait_outcome(Duration::from_secs(1)).unwrap();
        assert_eq!(next.request.id, 9);
    }

    #[test]
    fn test_generator_panic_is_a_failure() {
        let worker = worker(
            Arc::new(StaticScreenContext("ctx".to_string())),
            Arc::new(PanickingGenerator),
            Duration::from_secs(1),
        );

        worker.dispatch(request(3)).unwrap();
        let outcome = worker.wait_outcome(WAIT).unwrap();
        assert!(matches!(
            outcome.result.unwrap_err().error,
            CollaboratorError::Failed(_)
        ));
    }

    #[test]
    fn test_cancel_discards_in_flight_result() {
        let worker = worker(
            Arc::new(StaticScreenContext("ctx".to_string())),
            Arc::new(SlowGenerator(Duration::from_millis(100))),
            Duration::from_secs(1),
        );

        worker.dispatch(request(4)).unwrap();
        thread::sleep(Duration::from_millis(20));
        worker.cancel();

        assert!(worker.wait_outcome(Duration::from_millis(400)).is_none());
        assert_eq!(worker.dispatch(request(5)), Err(DispatchError::Closed));
        assert!(worker.is_cancelled());
    }

    #[test]
    fn test_try_outcomes_never_blocks() {
        let worker = worker(
            Arc::new(StaticScreenContext("ctx".to_string())),
            Arc::new(SlowGenerator(Duration::from_millis(300))),
            Duration::from_secs(1),
        );

        worker.dispatch(request(6)).unwrap();
        assert!(worker.try_outcomes().is_empty());
    }
}
