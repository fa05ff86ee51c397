//! Per-document reconciliation pass
//!
//! Builds one verdict row per document: the candidate diagnosis set
//! (summary-provided or tree-extracted), its cancer/precancer
//! classification, the reconciliation against the patient's register
//! history and the content-completeness verdict. Ends with the
//! patient-level flag propagation over the whole cube.

use crate::algorithm::{content, extract, extract::code_systems, reconcile};
use crate::config::PipelineConfig;
use crate::cube::{CubeKind, CubeStore};
use crate::error::Result;
use crate::models::candidate::{CandidateSet, SummaryDiagnosis};
use crate::models::node::Element;
use crate::models::register::RegisterHistory;
use crate::models::semd::{PatientSemdRow, SemdDocument};
use crate::pipeline::{RunReport, before_cursor, progress_bar, run_unit};
use crate::utils::date::{parse_compact_date, parse_compact_datetime};

/// Fill the per-document verdict cube and propagate patient-level flags.
pub fn fill_patient_semds<S: CubeStore>(
    documents: &[SemdDocument],
    store: &mut S,
    config: &PipelineConfig,
) -> Result<RunReport> {
    if config.erase {
        store.erase(CubeKind::PatientSemds)?;
    }

    let mut report = RunReport::default();
    let progress = progress_bar(config, documents.len(), "filling patient SEMDs");

    for document in documents {
        progress.inc(1);
        if before_cursor(config, &document.envelope.rc_id) {
            continue;
        }
        report.processed += 1;
        if report.processed % config.batch_size == 0 {
            log::info!("patient SEMDs: {} documents processed", report.processed);
        }

        let history = store.register_history(&document.envelope.ptn_id);
        let row = build_row(document, &history);
        run_unit(store, &document.envelope.rc_id, &mut report, |store| {
            store.insert_patient_semd(row)?;
            Ok(1)
        });
    }

    progress.finish();
    store.propagate_patient_flags()?;
    log::info!(
        "patient SEMDs: wrote {} rows from {} documents ({} failed)",
        report.written,
        report.processed,
        report.failed_units.len()
    );
    Ok(report)
}

fn build_row(document: &SemdDocument, history: &RegisterHistory) -> PatientSemdRow {
    let document_type = document.envelope.document_type.as_deref().unwrap_or("");
    let effective_date = document
        .effective_date
        .or_else(|| document.envelope.time_rc.map(|time| time.date()));

    let candidates = candidate_set(document, document_type);

    let verdict = reconcile::reconcile(reconcile::ReconcileInput {
        effective_date,
        candidates: &candidates,
        history,
    });

    let content_verdict = content::check(document_type, document.content.clone());

    let summary = document.summary.as_ref();
    let selected = verdict.diagnosis.as_ref();

    PatientSemdRow {
        envelope: document.envelope.clone(),
        cda_sent_local_date: effective_date,
        cda_time: summary
            .and_then(|s| s.date_cda.as_deref())
            .and_then(parse_compact_datetime),
        sms_type: summary.and_then(|s| s.sms_type.clone()),
        diagnosis_mkb10: selected.map(|candidate| candidate.mkb10.clone()),
        diagnosis_date: selected.and_then(|candidate| candidate.date),
        diagnosis_code197: selected.and_then(|candidate| candidate.section_code.clone()),
        diagnosis_code1076: selected.and_then(|candidate| candidate.accuracy_code.clone()),
        diagnosis_code1077: selected.and_then(|candidate| candidate.kind_code.clone()),
        is_cancer_diagnosis: verdict.class.is_cancer,
        is_precancer_diagnosis: verdict.class.is_precancer,
        diagnoses: candidates.candidates().to_vec(),
        is_cancer_diagnoses: verdict.class_any.is_cancer,
        is_precancer_diagnoses: verdict.class_any.is_precancer,
        has_cancer_diagnosis: false,
        has_precancer_diagnosis: false,
        is_in_register: verdict.is_in_register,
        rc_diagnosis_mkb10: verdict.register_mkb10.clone(),
        rc_diagnosis_date: verdict.register_date,
        date_equals_semd_date: verdict.date_equals_semd_date,
        semd_content: content_verdict.content,
        content_error: content_verdict.content_error,
        diagnosis_error: verdict.diagnosis_error,
    }
}

/// Summary-provided diagnoses win over tree extraction; a type-37 report
/// additionally injects its summary-level primary diagnosis as a
/// kind-1/DGN candidate.
fn candidate_set(document: &SemdDocument, document_type: &str) -> CandidateSet {
    let mut summaries: Vec<SummaryDiagnosis> = document
        .summary
        .as_ref()
        .map(|summary| summary.diagnoses.clone())
        .unwrap_or_default();

    if document_type == "37" {
        if let Some(ds_code) = document
            .summary
            .as_ref()
            .and_then(|summary| summary.ds_code.clone())
            .filter(|code| !code.is_empty())
        {
            let summary = document.summary.as_ref();
            summaries.push(SummaryDiagnosis {
                mkb10: ds_code,
                date: summary
                    .and_then(|s| s.ds_date.as_deref())
                    .and_then(parse_compact_date)
                    .map(|date| date.format("%Y-%m-%d").to_string()),
                code1076: summary.and_then(|s| s.ds_prove.clone()),
                code1077: Some("1".to_string()),
                code197: Some("DGN".to_string()),
            });
        }
    }

    if !summaries.is_empty() {
        return CandidateSet::from_summaries(&summaries);
    }

    let Some(payload) = document.payload.as_deref() else {
        return CandidateSet::default();
    };
    match Element::parse(payload) {
        Ok(root) => CandidateSet::from_observations(
            extract::extract_document(&root, code_systems::MKB10).iter(),
        ),
        Err(error) => {
            log::warn!(
                "document {}: unparseable payload: {error}",
                document.envelope.rc_id
            );
            CandidateSet::default()
        }
    }
}
