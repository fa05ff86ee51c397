//! Milestone cube fill
//!
//! Groups the diagnosis cube into patient-diagnosis timeline entries
//! (earliest date per patient-code pair) and evaluates the order-rule
//! catalog for each entry. With `only_fill_milestones` set, the existing
//! timeline entries are re-evaluated instead of regrouped.

use crate::algorithm::milestones::{MilestoneRule, evaluate};
use crate::config::PipelineConfig;
use crate::cube::{CubeKind, CubeStore};
use crate::error::Result;
use crate::models::semd::MilestoneRow;
use crate::pipeline::{RunReport, progress_bar, run_unit};

/// Fill the patient-diagnosis milestone cube.
pub fn fill_milestones<S: CubeStore>(
    store: &mut S,
    rules: &[MilestoneRule],
    config: &PipelineConfig,
) -> Result<RunReport> {
    let groups = if config.only_fill_milestones {
        store.milestone_groups()
    } else {
        store.diagnosis_groups()
    };

    if config.erase || config.only_fill_milestones {
        store.erase(CubeKind::Milestones)?;
    }

    let mut report = RunReport::default();
    let progress = progress_bar(config, groups.len(), "filling milestones");

    for group in groups {
        progress.inc(1);
        report.processed += 1;
        if report.processed % config.batch_size == 0 {
            log::info!("milestones: {} timeline entries processed", report.processed);
        }

        let milestones = evaluate(&group.ptn_id, &group.mkb10, group.min_date, rules, &*store);
        log::debug!(
            "{} {}: {} milestones",
            group.ptn_id,
            group.mkb10,
            milestones.len()
        );

        let unit_id = format!("{}:{}", group.ptn_id, group.mkb10);
        run_unit(store, &unit_id, &mut report, move |store| {
            store.insert_milestone(MilestoneRow {
                ptn_id: group.ptn_id,
                ptn_code: group.ptn_code,
                ptn_mo_oid: group.ptn_mo_oid,
                ptn_tags: group.ptn_tags,
                mkb10: group.mkb10,
                diagnosis_date: group.min_date,
                milestones,
            })?;
            Ok(1)
        });
    }

    progress.finish();
    log::info!(
        "milestones: wrote {} rows ({} failed)",
        report.written,
        report.failed_units.len()
    );
    Ok(report)
}
