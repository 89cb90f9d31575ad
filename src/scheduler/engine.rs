//! The scheduler engine -- one timer loop per exam, fan-out cancellation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::history::{ExamResult, HistoryStore, Outcome};
use super::preflight::{preflight, PreflightError};
use crate::battery::{Battery, Exam};
use crate::checks::{Check, CheckRegistry};
use crate::notify::{Dispatcher, OutcomeChange};

/// Runs a battery of exams until cancelled.
///
/// Every exam gets its own timer loop; the only shared mutable state is
/// the history store, and the only way to stop the loops is the single
/// broadcast token handed to [`Scheduler::run`]. Individual exams cannot
/// be cancelled on their own.
#[derive(Clone)]
pub struct Scheduler {
    battery: Arc<Battery>,
    registry: Arc<CheckRegistry>,
    store: Arc<HistoryStore>,
    dispatcher: Arc<Dispatcher>,
}

impl Scheduler {
    pub fn new(
        battery: Arc<Battery>,
        registry: Arc<CheckRegistry>,
        store: Arc<HistoryStore>,
    ) -> Self {
        Self {
            battery,
            registry,
            store,
            dispatcher: Arc::new(Dispatcher::default()),
        }
    }

    /// Attach a notifier dispatcher, invoked when an exam's outcome
    /// changes between two recorded results.
    pub fn with_dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Validate the battery, then run every exam loop until `cancel`
    /// fires.
    ///
    /// Errors only when preflight fails, in which case no loop was
    /// started. Once the loops are running this does not return until
    /// cancellation has stopped all of them.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), PreflightError> {
        preflight(&self.battery, &self.registry)?;

        let tracker = TaskTracker::new();
        for exam in &self.battery.exams {
            // Preflight guarantees both of these resolve.
            let Some(check) = self.registry.get(&exam.name) else {
                continue;
            };
            let Ok(every) = exam.duration() else {
                continue;
            };

            info!(exam = %exam.name, interval = %exam.interval, "Scheduling exam");
            tracker.spawn(run_exam(
                exam.clone(),
                every,
                check,
                Arc::clone(&self.store),
                Arc::clone(&self.dispatcher),
                cancel.clone(),
            ));
        }
        tracker.close();
        tracker.wait().await;

        info!("All exam loops stopped");
        Ok(())
    }
}

/// One exam's timer loop.
///
/// The Unknown seed result is recorded before the timer is armed, so a
/// query never observes an accepted exam without history. The loop then
/// blocks between ticks, woken only by its own timer or by the broadcast
/// cancellation token; a check in flight finishes its tick before the
/// loop observes cancellation.
async fn run_exam(
    exam: Exam,
    every: Duration,
    check: Arc<dyn Check>,
    store: Arc<HistoryStore>,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
) {
    store.add(ExamResult::not_run_yet(&exam.name));

    let mut timer = tokio::time::interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() fires immediately; consume that so the first real run
    // lands one interval after the seed result.
    timer.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(exam = %exam.name, "Exam loop stopping");
                return;
            }
            _ = timer.tick() => {
                debug!(exam = %exam.name, "Running exam");
                let date = Utc::now();
                let result = match check.run().await {
                    Ok(()) => ExamResult::new(&exam.name, date, Outcome::Pass, ""),
                    Err(e) => {
                        warn!(exam = %exam.name, error = %e, "Exam failed");
                        ExamResult::new(&exam.name, date, Outcome::Fail, format!("{e:#}"))
                    }
                };

                let previous = store.last(&exam.name).map(|r| r.outcome);
                store.add(result.clone());

                if let Some(from) = previous {
                    if from != result.outcome && !exam.notify.is_empty() {
                        let change = OutcomeChange {
                            exam: exam.name.clone(),
                            from,
                            to: result.outcome,
                            message: result.message.clone(),
                            at: result.date,
                        };
                        dispatcher.dispatch(&exam.notify, &change).await;
                    }
                }
            }
        }
    }
}
