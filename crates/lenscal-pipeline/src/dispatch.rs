//! Bounded fan-out of independent per-image jobs.
//!
//! Jobs share no mutable state; every one reads its own input and
//! writes its own artifacts. The pool therefore only bounds
//! concurrency. One job failing neither cancels nor blocks the rest,
//! and results carry no ordering guarantee beyond lining up with the
//! submitted slice.

use rayon::prelude::*;
use thiserror::Error;

use crate::tools::ToolError;

/// Outcome of a job that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Work was performed.
    Done,
    /// Every artifact already existed; nothing was invoked.
    Skipped,
    /// A required external tool is not installed; reported, non-fatal.
    ToolMissing,
}

/// A per-job hard error. Never crosses job boundaries.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tca(#[from] lenscal_tca::TcaParseError),
    #[error(transparent)]
    Raster(#[from] lenscal_vignetting::PgmError),
    #[error(transparent)]
    Fit(#[from] lenscal_vignetting::FitError),
    #[error(transparent)]
    Record(#[from] lenscal_profile::RecordError),
}

/// A worker pool sized for one workflow invocation.
pub struct Dispatcher {
    pool: rayon::ThreadPool,
}

impl Dispatcher {
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()?;
        Ok(Self { pool })
    }

    /// Run every job to completion (or individual failure) and collect
    /// all outcomes, index-aligned with `jobs`.
    pub fn run<J, F>(&self, jobs: &[J], work: F) -> Vec<Result<JobStatus, JobError>>
    where
        J: Sync,
        F: Fn(&J) -> Result<JobStatus, JobError> + Sync,
    {
        self.pool
            .install(|| jobs.par_iter().map(|job| work(job)).collect())
    }
}

/// Tallied outcomes of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub done: usize,
    pub skipped: usize,
    pub tool_missing: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn tally(results: &[Result<JobStatus, JobError>]) -> Self {
        let mut summary = RunSummary::default();
        for result in results {
            match result {
                Ok(JobStatus::Done) => summary.done += 1,
                Ok(JobStatus::Skipped) => summary.skipped += 1,
                Ok(JobStatus::ToolMissing) => summary.tool_missing += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} done, {} skipped, {} missing tools, {} failed",
            self.done, self.skipped, self.tool_missing, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn one_failure_leaves_other_results_intact() {
        let dispatcher = Dispatcher::new(4).unwrap();
        let jobs: Vec<usize> = (0..16).collect();
        let results = dispatcher.run(&jobs, |&n| {
            if n == 7 {
                Err(JobError::Io(std::io::Error::other("boom")))
            } else {
                Ok(JobStatus::Done)
            }
        });

        assert_eq!(results.len(), 16);
        assert!(results[7].is_err());
        let summary = RunSummary::tally(&results);
        assert_eq!(summary.done, 15);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn all_jobs_run_exactly_once() {
        let dispatcher = Dispatcher::new(2).unwrap();
        let jobs: Vec<usize> = (0..64).collect();
        let counter = AtomicUsize::new(0);
        let results = dispatcher.run(&jobs, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(JobStatus::Done)
        });
        assert_eq!(counter.load(Ordering::SeqCst), 64);
        assert_eq!(RunSummary::tally(&results).done, 64);
    }

    #[test]
    fn single_worker_pool_is_allowed() {
        let dispatcher = Dispatcher::new(0).unwrap();
        let results = dispatcher.run(&[1, 2, 3], |_| Ok(JobStatus::Skipped));
        assert_eq!(RunSummary::tally(&results).skipped, 3);
    }
}
