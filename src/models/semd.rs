//! SEMD document inputs and denormalized cube rows
//!
//! A `SemdDocument` is one unit of pipeline work: the record envelope, an
//! optional raw XML payload and the JSON-shaped message summary. The row
//! types mirror the reporting cube tables the pipeline writes.

use crate::algorithm::content::ExtractedContent;
use crate::models::candidate::{DiagnosisCandidate, SummaryDiagnosis};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Shared patient/document envelope of a cube row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemdEnvelope {
    /// Patient record id
    pub ptn_id: String,
    /// Patient short code
    pub ptn_code: Option<String>,
    /// Patient medical-organization OID
    pub ptn_mo_oid: Option<String>,
    /// Patient tags
    pub ptn_tags: Vec<String>,
    /// Document record id
    pub rc_id: String,
    /// Document record timestamp
    pub time_rc: Option<NaiveDateTime>,
    /// SEMD document type
    pub document_type: Option<String>,
    /// NSI document type
    pub nsi_doc_type: Option<String>,
    /// Message profile (`ONCO` for this pipeline)
    pub profile: Option<String>,
    /// Author medical-organization OID
    pub author_mo_oid: Option<String>,
    /// Author SNILS
    pub author_snils: Option<String>,
    /// Author post OID
    pub author_post: Option<String>,
    /// Transport message id
    pub internal_message_id: Option<String>,
}

/// JSON-shaped message summary attached to a record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsSummary {
    /// Author post OID
    #[serde(default)]
    pub author_post: Option<String>,
    /// Diagnoses already extracted upstream
    #[serde(default)]
    pub diagnoses: Vec<SummaryDiagnosis>,
    /// Services already extracted upstream
    #[serde(default)]
    pub services: Vec<serde_json::Value>,
    /// Compact CDA timestamp of the document
    #[serde(default)]
    pub date_cda: Option<String>,
    /// Message type
    #[serde(rename = "type", default)]
    pub sms_type: Option<String>,
    /// Primary diagnosis code of a type-37 report
    #[serde(default)]
    pub ds_code: Option<String>,
    /// Compact date of the type-37 primary diagnosis
    #[serde(default)]
    pub ds_date: Option<String>,
    /// Accuracy code of the type-37 primary diagnosis
    #[serde(default)]
    pub ds_prove: Option<String>,
}

/// One unit of pipeline work
#[derive(Debug, Clone, Default)]
pub struct SemdDocument {
    /// Patient/document envelope
    pub envelope: SemdEnvelope,
    /// Local date the document was sent
    pub effective_date: Option<NaiveDate>,
    /// Raw XML payload, when the record carries one
    pub payload: Option<String>,
    /// Message summary, when the record carries one
    pub summary: Option<SmsSummary>,
    /// Structured content extracted by the per-type catalog collaborator
    pub content: ExtractedContent,
}

/// One diagnosis observation of one document, denormalized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemdDiagnosisRow {
    /// Patient/document envelope
    pub envelope: SemdEnvelope,
    /// ICD-10 diagnosis code
    pub mkb10: String,
    /// Diagnosis date
    pub date: Option<NaiveDate>,
    /// Section code the diagnosis was found under
    pub code1379: Option<String>,
    /// Accuracy code
    pub code1076: Option<String>,
    /// Kind code
    pub code1077: Option<String>,
}

/// One service observation of one document, denormalized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemdServiceRow {
    /// Patient/document envelope
    pub envelope: SemdEnvelope,
    /// Service code
    pub service_code: String,
    /// Service date
    pub service_date: Option<NaiveDate>,
    /// Instrumental-diagnostics code the service was expanded from
    pub instrumental_diagnostics_code: Option<String>,
}

/// Per-document reconciliation/content verdict row
#[derive(Debug, Clone, Default)]
pub struct PatientSemdRow {
    /// Patient/document envelope
    pub envelope: SemdEnvelope,
    /// Local date the document was sent
    pub cda_sent_local_date: Option<NaiveDate>,
    /// Document timestamp recovered from the summary
    pub cda_time: Option<NaiveDateTime>,
    /// Message type from the summary
    pub sms_type: Option<String>,
    /// Selected diagnosis code
    pub diagnosis_mkb10: Option<String>,
    /// Selected diagnosis date
    pub diagnosis_date: Option<NaiveDate>,
    /// Selected diagnosis section code
    pub diagnosis_code197: Option<String>,
    /// Selected diagnosis accuracy code
    pub diagnosis_code1076: Option<String>,
    /// Selected diagnosis kind code
    pub diagnosis_code1077: Option<String>,
    /// Selected diagnosis is a cancer diagnosis
    pub is_cancer_diagnosis: bool,
    /// Selected diagnosis is a precancer diagnosis
    pub is_precancer_diagnosis: bool,
    /// Full candidate set of the document
    pub diagnoses: Vec<DiagnosisCandidate>,
    /// Any candidate is a cancer diagnosis
    pub is_cancer_diagnoses: bool,
    /// Any candidate is a precancer diagnosis
    pub is_precancer_diagnoses: bool,
    /// The patient has a cancer document anywhere in the cube;
    /// set by the post-pass flag propagation
    pub has_cancer_diagnosis: bool,
    /// The patient has a precancer document anywhere in the cube
    pub has_precancer_diagnosis: bool,
    /// A register diagnosis was found for the patient
    pub is_in_register: bool,
    /// Normalized register code
    pub rc_diagnosis_mkb10: Option<String>,
    /// Register diagnosis date
    pub rc_diagnosis_date: Option<NaiveDate>,
    /// The diagnosis date lies within one day of the document date
    pub date_equals_semd_date: bool,
    /// Extracted content indicators
    pub semd_content: BTreeMap<String, String>,
    /// Content narrative
    pub content_error: String,
    /// Diagnosis-consistency narrative
    pub diagnosis_error: String,
}

/// Milestone cube row: one patient-diagnosis timeline entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoneRow {
    /// Patient record id
    pub ptn_id: String,
    /// Patient short code
    pub ptn_code: Option<String>,
    /// Patient medical-organization OID
    pub ptn_mo_oid: Option<String>,
    /// Patient tags
    pub ptn_tags: Vec<String>,
    /// ICD-10 diagnosis code
    pub mkb10: String,
    /// Earliest diagnosis date of the patient-code pair
    pub diagnosis_date: NaiveDate,
    /// Day offsets keyed by `{rule_code}:referral` / `{rule_code}:performed`
    pub milestones: BTreeMap<String, i64>,
}
