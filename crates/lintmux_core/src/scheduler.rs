//! Bounded-concurrency execution of linter jobs.
//!
//! A fixed pool of worker threads pulls jobs from a shared queue. Each result
//! is delivered on one channel and each per-job failure additionally on a
//! diagnostics channel. Both channels close once every worker has exited, so
//! draining them to the end is how a caller knows the run is over.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::diagnostic::Diagnostic;
use crate::error::JobError;
use crate::job::Job;
use crate::process::{self, RawOutput};

/// Outcome of one job.
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub outcome: Result<RawOutput, JobError>,
}

/// Handles to a running batch.
///
/// Results arrive in completion order.
#[derive(Debug)]
pub struct Execution {
    pub results: Receiver<JobResult>,
    pub diagnostics: Receiver<Diagnostic>,
}

/// Runs jobs on a fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct Scheduler {
    concurrency: usize,
    deadline: Option<Duration>,
    dir: Option<PathBuf>,
}

impl Scheduler {
    /// `concurrency` is clamped to at least one worker.
    pub fn new(concurrency: usize, deadline: Option<Duration>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            deadline,
            dir: None,
        }
    }

    /// Runs every job in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Starts running `jobs` and returns immediately.
    ///
    /// Every job runs exactly once; at most `concurrency` run at a time.
    pub fn run(&self, jobs: Vec<Job>) -> Execution {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<JobResult>();
        let (diag_tx, diag_rx) = crossbeam_channel::unbounded::<Diagnostic>();

        let workers = self.concurrency.min(jobs.len());
        debug!(
            "scheduling {} jobs on {} workers (deadline {:?})",
            jobs.len(),
            workers,
            self.deadline
        );
        for job in jobs {
            // The receiver is alive, so this cannot fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        for _ in 0..workers {
            let worker = Worker {
                jobs: job_rx.clone(),
                results: result_tx.clone(),
                diagnostics: diag_tx.clone(),
                deadline: self.deadline,
                dir: self.dir.clone(),
            };
            thread::spawn(move || worker.run());
        }

        Execution {
            results: result_rx,
            diagnostics: diag_rx,
        }
    }
}

struct Worker {
    jobs: Receiver<Job>,
    results: Sender<JobResult>,
    diagnostics: Sender<Diagnostic>,
    deadline: Option<Duration>,
    dir: Option<PathBuf>,
}

impl Worker {
    fn run(self) {
        for job in self.jobs.iter() {
            let tag = format!("[{}.{}]", job.linter, job.id);
            debug!("{} executing {}", tag, job.command_line());

            let outcome = process::run(&job, self.dir.as_deref(), self.deadline);
            match &outcome {
                Ok(output) => debug!(
                    "{} finished in {:?} with status {:?}",
                    tag, output.elapsed, output.status
                ),
                Err(err) => {
                    warn!("{} {}", tag, err);
                    let _ = self.diagnostics.send(Diagnostic::from(err));
                }
            }

            if self.results.send(JobResult { job, outcome }).is_err() {
                debug!("{} result receiver dropped, stopping worker", tag);
                return;
            }
        }
    }
}
