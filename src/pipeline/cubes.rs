//! Diagnosis/service cube fill
//!
//! Walks every document payload, extracts the diagnosis and service
//! observation sets and writes one denormalized row per observation.
//! Documents whose payload carries no coded services fall back to
//! instrumental-diagnostics expansion through the reference directory,
//! and consultation protocols (type 20) fall back to the author-post
//! service map as a last resort.

use crate::algorithm::extract::{self, code_systems};
use crate::config::PipelineConfig;
use crate::cube::{CubeKind, CubeStore};
use crate::directory::DirectoryLookup;
use crate::error::Result;
use crate::models::node::Element;
use crate::models::observation::Observation;
use crate::models::semd::{SemdDiagnosisRow, SemdDocument, SemdServiceRow};
use crate::pipeline::{RunReport, before_cursor, progress_bar, run_unit};
use chrono::NaiveDate;

/// Fill the per-document diagnosis and service cubes.
pub fn fill_semd_cubes<S: CubeStore>(
    documents: &[SemdDocument],
    directory: &dyn DirectoryLookup,
    store: &mut S,
    config: &PipelineConfig,
) -> Result<RunReport> {
    if config.erase {
        store.erase(CubeKind::SemdDiagnoses)?;
        store.erase(CubeKind::SemdServices)?;
    }

    let mut report = RunReport::default();
    let progress = progress_bar(config, documents.len(), "filling SEMD cubes");

    for document in documents {
        progress.inc(1);
        if before_cursor(config, &document.envelope.rc_id) {
            continue;
        }
        report.processed += 1;
        if report.processed % config.batch_size == 0 {
            log::info!("SEMD cubes: {} documents processed", report.processed);
        }

        run_unit(store, &document.envelope.rc_id, &mut report, |store| {
            write_document_rows(document, directory, store, config)
        });
    }

    progress.finish();
    log::info!(
        "SEMD cubes: wrote {} rows from {} documents ({} failed)",
        report.written,
        report.processed,
        report.failed_units.len()
    );
    Ok(report)
}

fn write_document_rows<S: CubeStore>(
    document: &SemdDocument,
    directory: &dyn DirectoryLookup,
    store: &mut S,
    config: &PipelineConfig,
) -> Result<usize> {
    let Some(payload) = document.payload.as_deref() else {
        return Ok(0);
    };
    // a broken payload skips this document only, never the batch
    let root = match Element::parse(payload) {
        Ok(root) => root,
        Err(error) => {
            log::warn!(
                "document {}: unparseable payload: {error}",
                document.envelope.rc_id
            );
            return Ok(0);
        }
    };

    let mut written = 0;

    for observation in extract::extract_document(&root, code_systems::MKB10) {
        store.insert_diagnosis(SemdDiagnosisRow {
            envelope: document.envelope.clone(),
            mkb10: observation.code.clone(),
            date: observation.date,
            code1379: observation.section_code.clone(),
            code1076: observation.accuracy_code.clone(),
            code1077: observation.kind_code.clone(),
        })?;
        written += 1;
    }

    let service_observations = extract::extract_document(&root, code_systems::SERVICE);
    let mut service_rows: Vec<SemdServiceRow> = service_observations
        .iter()
        .map(|observation| SemdServiceRow {
            envelope: document.envelope.clone(),
            service_code: observation.code.clone(),
            service_date: service_date(document, observation),
            instrumental_diagnostics_code: None,
        })
        .collect();

    // no coded services: expand instrumental diagnostics through the
    // directory into their NMU service codes
    if service_rows.is_empty() {
        for observation in extract::extract_document(&root, code_systems::INSTRUMENTAL) {
            for service_code in directory.instrumental_services(&observation.code)? {
                service_rows.push(SemdServiceRow {
                    envelope: document.envelope.clone(),
                    service_code,
                    service_date: service_date(document, &observation),
                    instrumental_diagnostics_code: Some(observation.code.clone()),
                });
            }
        }
    }

    // consultation protocols may carry no coded service at all; fall back
    // to the author's post
    if service_rows.is_empty() && document.envelope.document_type.as_deref() == Some("20") {
        let fallback = document
            .envelope
            .author_post
            .as_deref()
            .and_then(|post| config.service_by_post.get(post));
        if let Some(service_code) = fallback {
            service_rows.push(SemdServiceRow {
                envelope: document.envelope.clone(),
                service_code: service_code.clone(),
                service_date: record_date(document),
                instrumental_diagnostics_code: None,
            });
        }
    }

    for row in service_rows {
        store.insert_service(row)?;
        written += 1;
    }

    Ok(written)
}

fn record_date(document: &SemdDocument) -> Option<NaiveDate> {
    document.envelope.time_rc.map(|time| time.date())
}

/// Undated services of a protocol document (type 5) take the record date.
fn service_date(document: &SemdDocument, observation: &Observation) -> Option<NaiveDate> {
    observation.date.or_else(|| {
        if document.envelope.document_type.as_deref() == Some("5") {
            record_date(document)
        } else {
            None
        }
    })
}
