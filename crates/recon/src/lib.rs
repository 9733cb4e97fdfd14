//! `slscheck-recon` — SLS master register vs. geometry dataset reconciliation.
//!
//! Pure engine crate: receives pre-loaded tables, returns classified rows,
//! digit-issue listings and an assembled report. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod registry;
pub mod report;
pub mod scanner;

pub use config::ReconConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{
    DigitAnomaly, FieldValue, ReconResult, ReconSummary, ReconciliationRow, ReportRow, RowStatus,
    SlsRow, Source, SourceTable,
};
pub use progress::ProgressEvent;
