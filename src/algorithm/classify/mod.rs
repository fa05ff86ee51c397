//! Cancer / precancer classification of ICD-10 codes
//!
//! Static inclusion tables, loaded once and never mutated. A code is
//! checked by exact-set membership first, then by lexicographic half-open
//! range membership: a range closes at `hi.9` so that every subcode of the
//! right bound is included.

/// ICD-10 ranges counted as cancer; a `None` right bound closes the range
/// on the left code itself
const CANCER_RANGES: &[(&str, Option<&str>)] = &[
    ("C00", Some("C97")),
    ("D00", Some("D09")),
    ("D21", None),
    ("D31", Some("D33")),
    ("D35", Some("D48")),
];

/// Exact ICD-10 codes counted as precancer
const PRECANCER_CODES: &[&str] = &[
    "B18.0", "B18.1", "B18.2",
    "B20.0", "B20.1", "B20.2", "B20.3", "B20.4", "B20.5", "B20.6", "B20.7", "B20.8", "B20.9",
    "B21.0", "B21.1", "B21.2", "B21.3", "B21.7", "B21.8", "B21.9",
    "B22.0", "B22.1", "B22.2", "B22.7",
    "B23.0", "B23.1", "B23.2", "B23.8",
    "D10.0", "D10.1", "D10.2", "D10.3", "D10.4", "D10.5", "D10.6", "D10.7", "D10.9",
    "D11.0", "D11.7", "D11.9",
    "D12.6", "D12.8",
    "D13.1", "D13.4", "D13.7",
    "D14.0", "D14.1", "D14.2", "D14.3", "D14.4",
    "D16.0", "D16.1", "D16.2", "D16.3", "D16.4", "D16.5", "D16.6", "D16.7", "D16.8", "D16.9",
    "D22.0", "D22.1", "D22.2", "D22.3", "D22.4", "D22.5", "D22.6", "D22.7", "D22.9",
    "D23.0", "D23.1", "D23.2", "D23.3", "D23.4", "D23.5", "D23.6", "D23.7", "D23.9",
    "D29.1",
    "D30.0", "D30.3", "D30.4",
    "D81.0", "D81.1", "D81.2", "D81.3", "D81.4", "D81.5", "D81.6", "D81.7", "D81.8", "D81.9",
    "D82.0", "D82.1", "D82.2", "D82.3", "D82.4", "D82.8", "D82.9",
    "D83.0", "D83.1", "D83.2", "D83.8", "D83.9",
    "D84.0", "D84.1", "D84.8", "D84.9",
    "E04.1", "E04.2",
    "E05.0", "E05.1", "E05.2",
    "E06.3",
    "E21.0",
    "E22.0",
    "E28.2",
    "E34.5", "E34.8",
    "J31.0", "J31.1", "J31.2",
    "J33.0", "J33.1", "J33.8", "J33.9",
    "J37.0", "J37.1",
    "J38.1", "J38.3",
    "K13.0", "K13.2", "K13.7",
    "K21.0",
    "K22.0", "K22.1", "K22.2", "K22.7",
    "K25.0", "K25.1", "K25.2", "K25.3", "K25.4", "K25.5", "K25.6", "K25.7", "K25.9",
    "K29.4", "K29.5",
    "K31.7",
    "K50.0", "K50.1", "K50.8", "K50.9",
    "K51.0", "K51.1", "K51.2", "K51.3", "K51.4", "K51.5", "K51.8", "K51.9",
    "K62.1",
    "K74.3", "K74.4", "K74.5", "K74.6",
    "L43.0", "L43.1", "L43.3", "L43.8", "L43.9",
    "L57.0", "L57.1", "L57.2", "L57.3", "L57.4", "L57.5", "L57.8", "L57.9",
    "L85.8",
    "L93.0", "L93.1", "L93.2",
    "M85.0", "M85.1", "M85.2", "M85.3", "M85.4", "M85.5", "M85.6", "M85.8", "M85.9",
    "M88.0", "M88.8", "M88.9",
    "M96.0", "M96.1", "M96.2", "M96.3", "M96.4", "M96.5", "M96.6", "M96.8", "M96.9",
    "N48.0",
    "N60.0", "N60.1", "N60.2", "N60.3", "N60.4", "N60.8", "N60.9",
    "N84.0", "N84.1", "N84.2", "N84.3", "N84.8", "N84.9",
    "N85.0", "N85.1",
    "N87.0", "N87.1", "N87.2", "N87.9",
    "N88.0", "N89.2", "N90.2",
    "Q50.0", "Q50.1", "Q50.2", "Q50.3", "Q50.4", "Q50.5", "Q50.6",
    "Q56.0", "Q56.1", "Q56.2", "Q56.3", "Q56.4",
    "Q78.1", "Q78.4",
    "Q82.1", "Q82.5",
    "Q85.1",
    "Q96.0", "Q96.1", "Q96.2", "Q96.3", "Q96.4", "Q96.8", "Q96.9",
    "Q97.0", "Q97.1", "Q97.2", "Q97.3", "Q97.8", "Q97.9",
    "Q98.0", "Q98.1", "Q98.2", "Q98.3", "Q98.4", "Q98.5", "Q98.6", "Q98.7", "Q98.8", "Q98.9",
    "Q99.0", "Q99.1", "Q99.2", "Q99.8", "Q99.9",
];

/// ICD-10 single-code ranges counted as precancer (all subcodes included)
const PRECANCER_RANGES: &[(&str, Option<&str>)] = &[("B24", None), ("D24", None), ("L82", None)];

/// Cancer/precancer flags of one or more codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosisClass {
    /// Code falls into a cancer range
    pub is_cancer: bool,
    /// Code falls into the precancer catalog
    pub is_precancer: bool,
}

impl DiagnosisClass {
    /// Both flags already set; further codes cannot change the result
    #[must_use]
    pub fn is_saturated(self) -> bool {
        self.is_cancer && self.is_precancer
    }
}

fn in_range(code: &str, lo: &str, hi: Option<&str>) -> bool {
    let hi = format!("{}.9", hi.unwrap_or(lo));
    lo <= code && code <= hi.as_str()
}

/// Classify a single ICD-10 code. A code matching neither table is
/// neither cancer nor precancer.
#[must_use]
pub fn classify(code: &str) -> DiagnosisClass {
    if code.is_empty() {
        return DiagnosisClass::default();
    }

    for (lo, hi) in CANCER_RANGES {
        if in_range(code, lo, *hi) {
            return DiagnosisClass {
                is_cancer: true,
                is_precancer: false,
            };
        }
    }

    if PRECANCER_CODES.contains(&code)
        || PRECANCER_RANGES
            .iter()
            .any(|(lo, hi)| in_range(code, lo, *hi))
    {
        return DiagnosisClass {
            is_cancer: false,
            is_precancer: true,
        };
    }

    DiagnosisClass::default()
}

/// OR the per-code flags over a whole candidate set, short-circuiting once
/// both are set.
#[must_use]
pub fn classify_all<'a>(codes: impl IntoIterator<Item = &'a str>) -> DiagnosisClass {
    let mut class = DiagnosisClass::default();
    for code in codes {
        let item = classify(code);
        class.is_cancer |= item.is_cancer;
        class.is_precancer |= item.is_precancer;
        if class.is_saturated() {
            break;
        }
    }
    class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancer_ranges_cover_subcodes() {
        assert!(classify("C50.1").is_cancer);
        assert!(classify("C00").is_cancer);
        assert!(classify("C97.9").is_cancer);
        assert!(classify("D21.5").is_cancer);
        assert!(!classify("D30.0").is_cancer);
    }

    #[test]
    fn precancer_exact_and_range_membership() {
        assert!(classify("B18.0").is_precancer);
        assert!(classify("B24").is_precancer);
        assert!(classify("B24.5").is_precancer);
        assert!(classify("L82.1").is_precancer);
        assert!(!classify("B18.0").is_cancer);
    }

    #[test]
    fn unlisted_codes_are_neither() {
        let class = classify("Z00.0");
        assert!(!class.is_cancer);
        assert!(!class.is_precancer);
        assert_eq!(classify(""), DiagnosisClass::default());
    }

    #[test]
    fn aggregate_or_with_short_circuit() {
        let class = classify_all(["Z00.0", "B18.0", "C50.1", "Z99.9"]);
        assert!(class.is_cancer);
        assert!(class.is_precancer);
        assert_eq!(classify_all([]), DiagnosisClass::default());
    }
}
