//! Register diagnosis ingest
//!
//! Normalizes raw register records (loose dates, over-long staging
//! attributes) into canonical `RegisterDiagnosis` rows. Records without a
//! diagnosis code carry no usable event and are skipped, not failed.

use crate::config::PipelineConfig;
use crate::cube::{CubeKind, CubeStore};
use crate::error::Result;
use crate::models::register::{RawRegisterRecord, RegisterDiagnosis};
use crate::pipeline::{RunReport, before_cursor, progress_bar, run_unit};

/// Ingest raw register records into the canonical register table.
pub fn fill_register<S: CubeStore>(
    records: Vec<RawRegisterRecord>,
    store: &mut S,
    config: &PipelineConfig,
) -> Result<RunReport> {
    if config.erase {
        store.erase(CubeKind::RegisterDiagnoses)?;
    }

    let mut report = RunReport::default();
    let progress = progress_bar(config, records.len(), "filling register diagnoses");

    for record in records {
        progress.inc(1);
        if before_cursor(config, &record.rc_id) {
            continue;
        }
        report.processed += 1;
        if report.processed % config.batch_size == 0 {
            log::info!("register: {} records processed", report.processed);
        }

        let Some(row) = RegisterDiagnosis::from_raw(record) else {
            continue;
        };
        let unit_id = row.rc_id.clone();
        run_unit(store, &unit_id, &mut report, move |store| {
            store.insert_register(row)?;
            Ok(1)
        });
    }

    progress.finish();
    log::info!(
        "register: wrote {} diagnoses ({} failed)",
        report.written,
        report.failed_units.len()
    );
    Ok(report)
}
