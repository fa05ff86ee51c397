//! Batch pipeline drivers
//!
//! All drivers share the same scheduling model: single-threaded,
//! sequential, record-by-record. Each unit's writes go through one cube
//! store transaction; a failing unit is rolled back, recorded in the run
//! report and excluded from retry within the run, and the loop moves on.
//! Long passes are resumable through the explicit `resume_from` cursor.

pub mod cubes;
pub mod milestones;
pub mod register;
pub mod semds;

use crate::config::PipelineConfig;
use crate::cube::CubeStore;
use crate::error::Result;
use crate::utils::logging::{create_batch_progress_bar, create_hidden_progress_bar};
use indicatif::ProgressBar;

pub use cubes::fill_semd_cubes;
pub use milestones::fill_milestones;
pub use register::fill_register;
pub use semds::fill_patient_semds;

/// Outcome of one batch pass
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Units the pass looked at (after the resume cursor)
    pub processed: usize,
    /// Rows written
    pub written: usize,
    /// Ids of units whose transaction failed and was rolled back
    pub failed_units: Vec<String>,
}

pub(crate) fn progress_bar(config: &PipelineConfig, length: usize, pass: &str) -> ProgressBar {
    if config.show_progress {
        create_batch_progress_bar(length as u64, Some(pass))
    } else {
        create_hidden_progress_bar()
    }
}

pub(crate) fn before_cursor(config: &PipelineConfig, unit_id: &str) -> bool {
    config
        .resume_from
        .as_deref()
        .is_some_and(|cursor| unit_id < cursor)
}

/// Run one unit inside a store transaction: commit on success, roll back
/// and record the unit id on failure. Returns the number of rows written.
pub(crate) fn run_unit<S: CubeStore + ?Sized>(
    store: &mut S,
    unit_id: &str,
    report: &mut RunReport,
    unit: impl FnOnce(&mut S) -> Result<usize>,
) {
    store.begin_unit();
    match unit(store).and_then(|written| store.commit_unit().map(|()| written)) {
        Ok(written) => report.written += written,
        Err(error) => {
            store.rollback_unit();
            log::error!("unit {unit_id} failed and was rolled back: {error}");
            report.failed_units.push(unit_id.to_string());
        }
    }
}
