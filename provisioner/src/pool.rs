use crossbeam::channel;
use parking_lot::Mutex;
use tenancy::record::Record;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::{error::ProvisionError, summary::{Outcome, Summary}};

///
/// Something a worker can pick up from the queue.
///
pub trait Job: Send {
    /// Identifies the job in logs and in the run summary.
    fn label(&self) -> String;
}

impl Job for Record {
    fn label(&self) -> String {
        self.describe()
    }
}

impl Job for String {
    fn label(&self) -> String {
        self.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop handing out jobs after the first failure. Jobs already running are allowed to finish.
    FailFast,
    /// Record the failure and carry on with the remaining jobs.
    KeepGoing,
}

///
/// A fixed number of workers draining one FIFO queue. Jobs are queued in the order given, so with a
/// single worker they are also processed and completed in that order.
///
#[derive(Debug)]
pub struct WorkerPool {
    workers: usize,
    policy: FailurePolicy,
}

impl WorkerPool {
    pub fn new(workers: usize, policy: FailurePolicy) -> Result<Self, ProvisionError> {
        if workers == 0 {
            return Err(ProvisionError::InvalidConcurrency)
        }
        Ok(Self { workers, policy })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    ///
    /// Run every job through the work function and tally the outcomes.
    ///
    pub fn run<T, F>(&self, jobs: Vec<T>, work: F) -> Result<Summary, ProvisionError>
    where
        T: Job,
        F: Fn(&T) -> Outcome + Sync,
    {
        let summary = Mutex::new(Summary::new(jobs.len()));
        let abort = AtomicBool::new(false);

        let (sender, receiver) = channel::unbounded();
        for job in jobs {
            let _ignore = sender.send(job); // The receiver is held below so this can't fail.
        }
        drop(sender);

        crossbeam::scope(|scope| {
            for worker in 0..self.workers {
                let receiver = receiver.clone();
                let (work, abort, summary) = (&work, &abort, &summary);

                scope.spawn(move |_| {
                    log::trace!("Worker {} started", worker);

                    for job in receiver.iter() {
                        // Drain the rest of the queue without touching the API.
                        if abort.load(Ordering::SeqCst) {
                            summary.lock().mark_not_attempted();
                            continue
                        }

                        let outcome = work(&job);

                        if outcome.is_failure() && self.policy == FailurePolicy::FailFast {
                            abort.store(true, Ordering::SeqCst);
                        }

                        summary.lock().record(job.label(), outcome);
                    }

                    log::trace!("Worker {} finished", worker);
                });
            }
        })
        .map_err(|_| ProvisionError::WorkerPanicked)?;

        Ok(summary.into_inner())
    }
}
