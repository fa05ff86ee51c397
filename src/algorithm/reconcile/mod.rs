//! Diagnosis reconciliation against the cancer register
//!
//! Cross-references a document's candidate diagnoses with the register
//! diagnosis effective as of the document date and derives the
//! consistency narrative. Inconsistencies are business-data-quality
//! signals encoded in the verdict, never errors.

use crate::algorithm::classify::{self, DiagnosisClass};
use crate::models::candidate::CandidateSet;
use crate::models::register::RegisterHistory;
use crate::models::verdict::{OK, ReconciliationVerdict};
use crate::utils::date::within_days;
use chrono::NaiveDate;

/// Phrase: the document carries no diagnosis at all
pub const MISSING_DIAGNOSIS: &str = "Не указан диагноз. ";
/// Phrase: the selected diagnosis carries no date
pub const MISSING_DATE: &str = "Не указана дата установления диагноза. ";
/// Phrase: the diagnosis date coincides with the document date
pub const DATE_EQUALS_SEMD_DATE: &str = "Дата установления диагноза равна дате СЭМДа. ";
/// Phrase: the primary diagnosis differs from the register diagnosis
pub const REGISTER_MISMATCH: &str = "Основной диагноз СЭМДа не равен диагнозу в канцер-регистре. ";
/// Phrase: the primary diagnosis date differs from the register date
pub const REGISTER_DATE_MISMATCH: &str =
    "Дата установления диагноза СЭМДа не равна дате в канцер-регистре. ";

/// One document's reconciliation input
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    /// Local date the document was sent
    pub effective_date: Option<NaiveDate>,
    /// The document's candidate set
    pub candidates: &'a CandidateSet,
    /// The patient's register history
    pub history: &'a RegisterHistory,
}

/// Reconcile one document against the patient's register history.
#[must_use]
pub fn reconcile(input: ReconcileInput<'_>) -> ReconciliationVerdict {
    let register = input.history.as_of(input.effective_date);
    let is_in_register = register.is_some();
    let register_mkb10 = register.map(|row| row.normalized_mkb10());
    let register_date = register.and_then(|row| row.diagnosis_date);

    let selected = match &register_mkb10 {
        Some(code) => input.candidates.pick_for_register(code),
        None => input.candidates.pick(),
    }
    .cloned();

    let class = selected
        .as_ref()
        .map(|candidate| classify::classify(&candidate.mkb10))
        .unwrap_or_default();
    let class_any: DiagnosisClass = classify::classify_all(
        input
            .candidates
            .candidates()
            .iter()
            .map(|candidate| candidate.mkb10.as_str()),
    );

    let mut error = String::new();
    let mut date_equals_semd_date = false;

    if selected.is_none() {
        error.push_str(MISSING_DIAGNOSIS);
    }

    match selected.as_ref().and_then(|candidate| candidate.date) {
        Some(diagnosis_date) => {
            if let Some(effective) = input.effective_date {
                if within_days(diagnosis_date, effective, 1) {
                    date_equals_semd_date = true;
                    error.push_str(DATE_EQUALS_SEMD_DATE);
                }
            }
        }
        None => error.push_str(MISSING_DATE),
    }

    // register cross-check applies only to documents sent on or after the
    // register event, and only to a primary diagnosis
    if is_in_register {
        if let (Some(register_code), Some(register_day), Some(effective), Some(candidate)) = (
            register_mkb10.as_deref(),
            register_date,
            input.effective_date,
            selected.as_ref(),
        ) {
            if effective >= register_day && candidate.kind_code.as_deref() == Some("1") {
                if candidate.mkb10 != register_code {
                    error.push_str(REGISTER_MISMATCH);
                } else if let Some(diagnosis_date) = candidate.date {
                    if !within_days(diagnosis_date, register_day, 1) {
                        error.push_str(REGISTER_DATE_MISMATCH);
                    }
                }
            }
        }
    }

    if error.is_empty() {
        error.push_str(OK);
    }

    ReconciliationVerdict {
        diagnosis: selected,
        class,
        class_any,
        is_in_register,
        register_mkb10,
        register_date,
        date_equals_semd_date,
        diagnosis_error: error,
    }
}
