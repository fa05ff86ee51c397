//! Diagnosis candidate set and best-candidate selection
//!
//! Every diagnosis observation of a document collapses into a candidate
//! tuple; two observations differing only in their traversal path collapse
//! to one candidate. A fixed waterfall of filter combinations, from most
//! specific to least, selects the representative diagnosis of a document.

use crate::models::observation::Observation;
use crate::utils::date::parse_iso_date;
use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use smallvec::SmallVec;

/// A deduplicated diagnosis candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosisCandidate {
    /// ICD-10 diagnosis code; always non-empty for a member of a set
    pub mkb10: String,
    /// Date the diagnosis was established
    pub date: Option<NaiveDate>,
    /// Accuracy code (code1076)
    pub accuracy_code: Option<String>,
    /// Kind code (code1077); `1` marks a primary diagnosis
    pub kind_code: Option<String>,
    /// Section code of the enclosing document section (code197)
    pub section_code: Option<String>,
}

/// Diagnosis entry of an inbound message summary, as shipped in the
/// JSON-shaped `sms_summary` column
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryDiagnosis {
    /// ICD-10 diagnosis code
    pub mkb10: String,
    /// `YYYY-MM-DD` date string, when present
    #[serde(default)]
    pub date: Option<String>,
    /// Accuracy code
    #[serde(default)]
    pub code1076: Option<String>,
    /// Kind code
    #[serde(default)]
    pub code1077: Option<String>,
    /// Section code
    #[serde(default)]
    pub code197: Option<String>,
}

impl From<&SummaryDiagnosis> for DiagnosisCandidate {
    fn from(summary: &SummaryDiagnosis) -> Self {
        Self {
            mkb10: summary.mkb10.clone(),
            date: summary.date.as_deref().and_then(parse_iso_date),
            accuracy_code: summary.code1076.clone(),
            kind_code: summary.code1077.clone(),
            section_code: summary.code197.clone(),
        }
    }
}

/// Filter over candidate fields; an unset field matches anything
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFilter<'a> {
    /// Required kind code (code1077)
    pub kind_code: Option<&'a str>,
    /// Required accuracy code (code1076)
    pub accuracy_code: Option<&'a str>,
    /// Required section code (code197)
    pub section_code: Option<&'a str>,
    /// Additionally demand a non-null date
    pub require_date: bool,
}

/// The fixed selection waterfall, most specific combination first.
/// The final unfiltered step relies on the set's frozen iteration order.
const WATERFALL: [CandidateFilter<'static>; 7] = [
    CandidateFilter {
        kind_code: Some("1"),
        accuracy_code: Some("3"),
        section_code: Some("DGN"),
        require_date: true,
    },
    CandidateFilter {
        kind_code: Some("1"),
        accuracy_code: Some("4"),
        section_code: Some("DGN"),
        require_date: true,
    },
    CandidateFilter {
        kind_code: Some("1"),
        accuracy_code: Some("3"),
        section_code: None,
        require_date: true,
    },
    CandidateFilter {
        kind_code: Some("1"),
        accuracy_code: Some("4"),
        section_code: None,
        require_date: true,
    },
    CandidateFilter {
        kind_code: Some("1"),
        accuracy_code: None,
        section_code: None,
        require_date: true,
    },
    CandidateFilter {
        kind_code: None,
        accuracy_code: None,
        section_code: None,
        require_date: true,
    },
    CandidateFilter {
        kind_code: None,
        accuracy_code: None,
        section_code: None,
        require_date: false,
    },
];

/// A deduplicated, deterministically ordered set of diagnosis candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: Vec<DiagnosisCandidate>,
}

impl CandidateSet {
    /// Build a set from raw candidates: dedup by full tuple identity,
    /// drop entries with an empty diagnosis code, freeze a stable order
    /// (code, then date, then accuracy/kind/section) so that the
    /// unfiltered waterfall step is reproducible across runs.
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = DiagnosisCandidate>) -> Self {
        let unique: FxHashSet<DiagnosisCandidate> = candidates
            .into_iter()
            .filter(|candidate| !candidate.mkb10.is_empty())
            .collect();
        let mut candidates: Vec<DiagnosisCandidate> = unique.into_iter().collect();
        candidates.sort_by(|a, b| {
            a.mkb10
                .cmp(&b.mkb10)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.accuracy_code.cmp(&b.accuracy_code))
                .then_with(|| a.kind_code.cmp(&b.kind_code))
                .then_with(|| a.section_code.cmp(&b.section_code))
        });
        Self { candidates }
    }

    /// Fold diagnosis observations into a candidate set
    #[must_use]
    pub fn from_observations<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Self {
        Self::new(observations.into_iter().map(|obs| DiagnosisCandidate {
            mkb10: obs.code.clone(),
            date: obs.date,
            accuracy_code: obs.accuracy_code.clone(),
            kind_code: obs.kind_code.clone(),
            section_code: obs.section_code.clone(),
        }))
    }

    /// Fold message-summary diagnoses into a candidate set
    #[must_use]
    pub fn from_summaries(summaries: &[SummaryDiagnosis]) -> Self {
        Self::new(summaries.iter().map(DiagnosisCandidate::from))
    }

    /// Whether the set has no candidates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Candidates in the frozen order
    #[must_use]
    pub fn candidates(&self) -> &[DiagnosisCandidate] {
        &self.candidates
    }

    /// First candidate matching all supplied filter fields
    #[must_use]
    pub fn select_best(&self, filter: &CandidateFilter<'_>) -> Option<&DiagnosisCandidate> {
        select_in(&self.candidates, filter)
    }

    /// Run the selection waterfall over the whole set
    #[must_use]
    pub fn pick(&self) -> Option<&DiagnosisCandidate> {
        pick_in(&self.candidates)
    }

    /// Run the waterfall over pools in priority order: candidates whose
    /// code equals the (normalized) register code, then candidates sharing
    /// its top-level ICD-10 category, then the full set. The first pool
    /// yielding a waterfall match wins.
    #[must_use]
    pub fn pick_for_register(&self, register_mkb10: &str) -> Option<&DiagnosisCandidate> {
        let top = register_mkb10
            .split('.')
            .next()
            .unwrap_or(register_mkb10);

        let same: SmallVec<[DiagnosisCandidate; 4]> = self
            .candidates
            .iter()
            .filter(|candidate| candidate.mkb10 == register_mkb10)
            .cloned()
            .collect();
        if let Some(found) = pick_in(&same) {
            // re-borrow from self so the reference outlives the pool
            return self.candidates.iter().find(|c| *c == found);
        }

        let similar: SmallVec<[DiagnosisCandidate; 4]> = self
            .candidates
            .iter()
            .filter(|candidate| candidate.mkb10.split('.').next().unwrap_or(&candidate.mkb10) == top)
            .cloned()
            .collect();
        if let Some(found) = pick_in(&similar) {
            return self.candidates.iter().find(|c| *c == found);
        }

        self.pick()
    }
}

fn matches(candidate: &DiagnosisCandidate, filter: &CandidateFilter<'_>) -> bool {
    filter
        .kind_code
        .is_none_or(|kind| candidate.kind_code.as_deref() == Some(kind))
        && filter
            .accuracy_code
            .is_none_or(|accuracy| candidate.accuracy_code.as_deref() == Some(accuracy))
        && filter
            .section_code
            .is_none_or(|section| candidate.section_code.as_deref() == Some(section))
        && (!filter.require_date || candidate.date.is_some())
}

fn select_in<'a>(
    pool: &'a [DiagnosisCandidate],
    filter: &CandidateFilter<'_>,
) -> Option<&'a DiagnosisCandidate> {
    pool.iter().find(|candidate| matches(candidate, filter))
}

fn pick_in(pool: &[DiagnosisCandidate]) -> Option<&DiagnosisCandidate> {
    WATERFALL
        .iter()
        .find_map(|filter| select_in(pool, filter))
}
