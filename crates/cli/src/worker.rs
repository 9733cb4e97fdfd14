//! Background run of the check pipeline.
//!
//! The worker thread reads both inputs and runs the engine, sending
//! [`RunEvent`]s over an mpsc channel. Each run ends with exactly one
//! terminal event (`Finished` or `Failed`); a panic inside the worker is
//! reported as `Failed`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use slscheck_recon::{ReconConfig, ReconError, ReconResult};

use crate::exit_codes::{recon_exit_code, EXIT_CHECK_IO};

pub struct Job {
    pub config: ReconConfig,
    pub geometry: PathBuf,
    pub master: PathBuf,
}

#[derive(Debug)]
pub enum RunEvent {
    Progress(String),
    Finished(Box<ReconResult>),
    Failed(RunError),
}

#[derive(Debug)]
pub enum RunError {
    Recon(ReconError),
    /// The worker panicked or went away without reporting.
    Aborted(String),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Aborted(_) => EXIT_CHECK_IO,
            Self::Recon(e) => recon_exit_code(e),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recon(e) => write!(f, "{e}"),
            Self::Aborted(msg) => write!(f, "check aborted: {msg}"),
        }
    }
}

impl std::error::Error for RunError {}

/// Start the job on a new thread.
pub fn spawn(job: Job) -> Receiver<RunEvent> {
    let (tx, rx) = mpsc::channel();
    let progress_tx = tx.clone();
    thread::spawn(move || run_to_completion(move || execute(&job, &progress_tx), tx));
    rx
}

/// Run `work`, then send its single terminal event.
fn run_to_completion<F>(work: F, tx: Sender<RunEvent>)
where
    F: FnOnce() -> Result<ReconResult, RunError>,
{
    let terminal = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(result)) => RunEvent::Finished(Box::new(result)),
        Ok(Err(e)) => RunEvent::Failed(e),
        Err(payload) => RunEvent::Failed(RunError::Aborted(panic_message(payload.as_ref()))),
    };
    // Receiver gone means nobody is waiting for the outcome.
    let _ = tx.send(terminal);
}

fn execute(job: &Job, progress_tx: &Sender<RunEvent>) -> Result<ReconResult, RunError> {
    let mut progress = |event: slscheck_recon::ProgressEvent| {
        log::debug!("{}", event);
        let _ = progress_tx.send(RunEvent::Progress(event.to_string()));
    };

    let master = slscheck_io::read_master(&job.master, job.config.master.sheet.as_deref())
        .map_err(|e| RunError::Recon(ReconError::Io(e)))?;
    let geometry = slscheck_io::read_features(&job.geometry, job.config.geometry.layer.as_deref())
        .map_err(|e| RunError::Recon(ReconError::Io(e)))?;

    slscheck_recon::run(&job.config, &master, &geometry, &mut progress).map_err(RunError::Recon)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Drain events until the terminal one. Progress lines go to `on_progress`.
pub fn wait(rx: Receiver<RunEvent>, on_progress: &mut dyn FnMut(&str)) -> Result<ReconResult, RunError> {
    for event in rx {
        match event {
            RunEvent::Progress(line) => on_progress(&line),
            RunEvent::Finished(result) => return Ok(*result),
            RunEvent::Failed(e) => return Err(e),
        }
    }
    Err(RunError::Aborted("worker exited without a result".into()))
}
