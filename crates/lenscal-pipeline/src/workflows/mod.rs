//! The calibration workflows, one module per CLI action.

pub mod distortion;
pub mod generate;
pub mod init;
pub mod ship;
pub mod tca;
pub mod vignetting;

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::dispatch::{JobError, JobStatus, RunSummary};
use crate::tools::ToolError;

/// Errors that abort a whole workflow invocation before or outside the
/// per-job fan-out. Job-level failures never become one of these.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("no {name} directory, you have to run init first")]
    MissingWorkflowDir { name: &'static str },
    #[error("'{0}' is a file, can't create directory")]
    NotADirectory(PathBuf),
    #[error("lenses.conf doesn't exist, run distortion first")]
    MissingConfig,
    #[error("lensfun.xml not found, please run the calibration steps first")]
    MissingDatabase,
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] lenscal_profile::ConfigError),
    #[error(transparent)]
    Emit(#[from] lenscal_profile::EmitError),
}

/// Precondition check shared by the conversion workflows: the input
/// directory must exist before anything is dispatched.
fn ensure_workflow_dir(dir: &Path, name: &'static str) -> Result<(), PipelineError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::MissingWorkflowDir { name })
    }
}

/// Run one external-tool step inside a job. A missing tool resolves to
/// `None` (the job reports [`JobStatus::ToolMissing`]); any other tool
/// failure is the job's hard error.
fn tool_step<T>(result: Result<T, ToolError>) -> Result<Option<T>, JobError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ToolError::Missing { tool }) => {
            warn!("Could not find {tool}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Log per-job failures with their input label and the tallied summary.
fn report_results(
    workflow: &str,
    labels: impl IntoIterator<Item = PathBuf>,
    results: &[Result<JobStatus, JobError>],
) -> RunSummary {
    for (label, result) in labels.into_iter().zip(results) {
        if let Err(err) = result {
            error!("{workflow}: {}: {err}", label.display());
        }
    }
    let summary = RunSummary::tally(results);
    info!("{workflow}: {summary}");
    summary
}
