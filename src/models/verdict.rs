//! Reconciliation and content verdicts
//!
//! The verdict types carry the business-data-quality signal of a document:
//! narrative error strings that are always produced, never thrown. The
//! narratives are part of the reporting contract and must stay stable
//! byte for byte.

use crate::algorithm::classify::DiagnosisClass;
use crate::models::candidate::DiagnosisCandidate;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Narrative confirming a clean verdict
pub const OK: &str = "Ok!";

/// Diagnosis-consistency verdict of one document
#[derive(Debug, Clone, Default)]
pub struct ReconciliationVerdict {
    /// The selected representative diagnosis, when any candidate matched
    pub diagnosis: Option<DiagnosisCandidate>,
    /// Cancer/precancer classification of the selected diagnosis
    pub class: DiagnosisClass,
    /// Classification aggregated over the full candidate set
    pub class_any: DiagnosisClass,
    /// Whether a register diagnosis was found for the patient
    pub is_in_register: bool,
    /// Normalized register code effective as of the document date
    pub register_mkb10: Option<String>,
    /// Date of the register diagnosis
    pub register_date: Option<NaiveDate>,
    /// The diagnosis date lies within one day of the document date.
    /// Surfaced as a distinct flag; whether the coincidence is a defect
    /// or merely informational is a reporting-side decision.
    pub date_equals_semd_date: bool,
    /// Narrative: `Ok!` or a concatenation of defect phrases
    pub diagnosis_error: String,
}

/// Content-completeness verdict of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentVerdict {
    /// Extracted indicators with non-empty values only
    pub content: BTreeMap<String, String>,
    /// Narrative: `Ok!`, a scalar sentinel, or the missing-indicator list
    pub content_error: String,
}
