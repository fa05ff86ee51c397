//! Cancer-register diagnosis history
//!
//! One `RegisterDiagnosis` per canonical diagnosis event of a patient,
//! written once by the register ingest and read-only afterwards. The
//! history is kept ordered by diagnosis date descending so that as-of
//! selection is a forward scan.

use crate::utils::date::{parse_loose_date, truncate_chars};
use chrono::NaiveDate;

const ATTRIBUTE_MAX_CHARS: usize = 64;
const MKB10_MAX_CHARS: usize = 10;

/// Normalize an ICD-10 code for register comparison: the fractional part
/// is parsed as an integer, dropped when zero and re-rendered without
/// leading zeros otherwise (`C50.0` → `C50`, `C50.05` → `C50.5`).
#[must_use]
pub fn normalize_mkb10(code: &str) -> String {
    match code.split_once('.') {
        Some((head, fraction)) => match fraction.parse::<u32>() {
            Ok(0) => head.to_string(),
            Ok(n) => format!("{head}.{n}"),
            Err(_) => code.to_string(),
        },
        None => code.to_string(),
    }
}

/// Top-level ICD-10 category of a code (`C50.1` → `C50`)
#[must_use]
pub fn top_level(code: &str) -> &str {
    code.split('.').next().unwrap_or(code)
}

/// A canonical register diagnosis event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterDiagnosis {
    /// Patient record id
    pub ptn_id: String,
    /// Register record id
    pub rc_id: String,
    /// Date the diagnosis was established
    pub diagnosis_date: Option<NaiveDate>,
    /// ICD-10 code as stored in the register
    pub mkb10: String,
    /// Diagnosis status
    pub status: Option<String>,
    /// Diagnosis primacy
    pub primacy: Option<String>,
    /// Morphological class attributes
    pub morph_class_disabled: Option<String>,
    /// Morphological class child count
    pub morph_class_child_count: Option<String>,
    /// Morphological class short name
    pub morph_class_sname: Option<String>,
    /// Main tumor marker
    pub tumor_main: Option<String>,
    /// Affected side
    pub tumor_side: Option<String>,
    /// Discovery circumstances
    pub how_discover: Option<String>,
    /// Confirmation method
    pub method: Option<String>,
    /// Multiple-tumor kind
    pub plural: Option<String>,
    /// Autopsy result
    pub res_autopsy: Option<String>,
    /// Late-diagnosis reason
    pub why_old: Option<String>,
    /// Metastasis localization
    pub loc_met: Option<String>,
    /// TNM: tumor
    pub tnm_t: Option<String>,
    /// TNM: nodes
    pub tnm_n: Option<String>,
    /// TNM: metastasis
    pub tnm_m: Option<String>,
    /// TNM: grade
    pub tnm_g: Option<String>,
    /// Clinical stage
    pub stage: Option<String>,
}

/// A raw register record as returned by the record source, before
/// normalization
#[derive(Debug, Clone, Default)]
pub struct RawRegisterRecord {
    /// Patient record id
    pub ptn_id: String,
    /// Register record id
    pub rc_id: String,
    /// Loosely formatted diagnosis date
    pub diagnosis_date: Option<String>,
    /// ICD-10 code, possibly over-long
    pub mkb10: Option<String>,
    /// Staging attributes, possibly over-long
    pub status: Option<String>,
    pub primacy: Option<String>,
    pub morph_class_disabled: Option<String>,
    pub morph_class_child_count: Option<String>,
    pub morph_class_sname: Option<String>,
    pub tumor_main: Option<String>,
    pub tumor_side: Option<String>,
    pub how_discover: Option<String>,
    pub method: Option<String>,
    pub plural: Option<String>,
    pub res_autopsy: Option<String>,
    pub why_old: Option<String>,
    pub loc_met: Option<String>,
    pub tnm_t: Option<String>,
    pub tnm_n: Option<String>,
    pub tnm_m: Option<String>,
    pub tnm_g: Option<String>,
    pub stage: Option<String>,
}

impl RegisterDiagnosis {
    /// Normalize a raw register record: repair the date, cap text
    /// attributes at 64 characters (the code at 10). Records without a
    /// diagnosis code carry no usable event and yield `None`.
    #[must_use]
    pub fn from_raw(raw: RawRegisterRecord) -> Option<Self> {
        let mkb10 = raw.mkb10.filter(|code| !code.is_empty())?;
        let cap = |value: Option<String>| value.map(|v| truncate_chars(&v, ATTRIBUTE_MAX_CHARS));
        Some(Self {
            ptn_id: raw.ptn_id,
            rc_id: raw.rc_id,
            diagnosis_date: raw.diagnosis_date.as_deref().and_then(parse_loose_date),
            mkb10: truncate_chars(&mkb10, MKB10_MAX_CHARS),
            status: cap(raw.status),
            primacy: cap(raw.primacy),
            morph_class_disabled: cap(raw.morph_class_disabled),
            morph_class_child_count: cap(raw.morph_class_child_count),
            morph_class_sname: cap(raw.morph_class_sname),
            tumor_main: cap(raw.tumor_main),
            tumor_side: cap(raw.tumor_side),
            how_discover: cap(raw.how_discover),
            method: cap(raw.method),
            plural: cap(raw.plural),
            res_autopsy: cap(raw.res_autopsy),
            why_old: cap(raw.why_old),
            loc_met: cap(raw.loc_met),
            tnm_t: cap(raw.tnm_t),
            tnm_n: cap(raw.tnm_n),
            tnm_m: cap(raw.tnm_m),
            tnm_g: cap(raw.tnm_g),
            stage: cap(raw.stage),
        })
    }

    /// Register code normalized for document comparison
    #[must_use]
    pub fn normalized_mkb10(&self) -> String {
        normalize_mkb10(&self.mkb10)
    }
}

/// A patient's register history, ordered by diagnosis date descending
#[derive(Debug, Clone, Default)]
pub struct RegisterHistory {
    rows: Vec<RegisterDiagnosis>,
}

impl RegisterHistory {
    /// Build a history from register rows; the rows are sorted by
    /// diagnosis date descending (undated rows last).
    #[must_use]
    pub fn new(mut rows: Vec<RegisterDiagnosis>) -> Self {
        rows.sort_by(|a, b| match (a.diagnosis_date, b.diagnosis_date) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Self { rows }
    }

    /// Whether the patient has any register event
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in descending date order
    #[must_use]
    pub fn rows(&self) -> &[RegisterDiagnosis] {
        &self.rows
    }

    /// The register diagnosis effective as of the given date: the most
    /// recent dated row on or before it. Without a reference date any
    /// dated row qualifies. When nothing qualifies the most recent row is
    /// returned; `None` only for an empty history.
    #[must_use]
    pub fn as_of(&self, date: Option<NaiveDate>) -> Option<&RegisterDiagnosis> {
        let found = self.rows.iter().find(|row| match (row.diagnosis_date, date) {
            (Some(row_date), Some(reference)) => row_date <= reference,
            (Some(_), None) => true,
            (None, _) => false,
        });
        found.or_else(|| self.rows.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_zero_fraction_and_leading_zeros() {
        assert_eq!(normalize_mkb10("C50.0"), "C50");
        assert_eq!(normalize_mkb10("C50.05"), "C50.5");
        assert_eq!(normalize_mkb10("C50.10"), "C50.10");
        assert_eq!(normalize_mkb10("C50"), "C50");
        assert_eq!(normalize_mkb10("C50.x"), "C50.x");
    }

    #[test]
    fn top_level_is_prefix_before_dot() {
        assert_eq!(top_level("C50.1"), "C50");
        assert_eq!(top_level("C50"), "C50");
    }
}
