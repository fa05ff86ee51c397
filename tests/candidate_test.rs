#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oncocube::models::candidate::{CandidateFilter, CandidateSet, DiagnosisCandidate};

    fn candidate(
        mkb10: &str,
        date: Option<(i32, u32, u32)>,
        accuracy: Option<&str>,
        kind: Option<&str>,
        section: Option<&str>,
    ) -> DiagnosisCandidate {
        DiagnosisCandidate {
            mkb10: mkb10.to_string(),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            accuracy_code: accuracy.map(ToString::to_string),
            kind_code: kind.map(ToString::to_string),
            section_code: section.map(ToString::to_string),
        }
    }

    #[test]
    fn full_tuple_duplicates_collapse() {
        let set = CandidateSet::new([
            candidate("C50.1", Some((2023, 4, 1)), Some("3"), Some("1"), Some("DGN")),
            candidate("C50.1", Some((2023, 4, 1)), Some("3"), Some("1"), Some("DGN")),
            candidate("C50.1", Some((2023, 4, 1)), Some("4"), Some("1"), Some("DGN")),
        ]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_codes_are_dropped_at_construction() {
        let set = CandidateSet::new([candidate("", Some((2023, 4, 1)), None, None, None)]);
        assert!(set.is_empty());
        assert_eq!(set.pick(), None);
    }

    #[test]
    fn waterfall_prefers_most_specific_combination() {
        let set = CandidateSet::new([
            candidate("C20", Some((2023, 1, 1)), None, None, None),
            candidate("C30", Some((2023, 1, 1)), None, Some("1"), None),
            candidate("C40", Some((2023, 1, 1)), Some("4"), Some("1"), None),
            candidate("C50", Some((2023, 1, 1)), Some("3"), Some("1"), None),
            candidate("C60", Some((2023, 1, 1)), Some("3"), Some("1"), Some("DGN")),
        ]);
        assert_eq!(set.pick().unwrap().mkb10, "C60");
    }

    #[test]
    fn waterfall_steps_down_when_specific_rungs_are_empty() {
        let set = CandidateSet::new([
            candidate("C20", Some((2023, 1, 1)), None, None, None),
            candidate("C30", Some((2023, 1, 1)), None, Some("1"), None),
        ]);
        assert_eq!(set.pick().unwrap().mkb10, "C30");

        let undated = CandidateSet::new([candidate("C20", None, None, Some("1"), None)]);
        // only the final unfiltered rung accepts an undated candidate
        assert_eq!(undated.pick().unwrap().mkb10, "C20");
    }

    #[test]
    fn select_best_honors_every_supplied_filter() {
        let set = CandidateSet::new([candidate(
            "C50.1",
            Some((2023, 4, 1)),
            Some("3"),
            Some("1"),
            Some("DGN"),
        )]);

        let exact = CandidateFilter {
            kind_code: Some("1"),
            accuracy_code: Some("3"),
            section_code: Some("DGN"),
            require_date: true,
        };
        assert!(set.select_best(&exact).is_some());

        let wrong_accuracy = CandidateFilter {
            accuracy_code: Some("4"),
            ..exact
        };
        assert_eq!(set.select_best(&wrong_accuracy), None);

        let wrong_kind = CandidateFilter {
            kind_code: Some("2"),
            ..exact
        };
        assert_eq!(set.select_best(&wrong_kind), None);
    }

    #[test]
    fn require_date_rejects_undated_candidates() {
        let set = CandidateSet::new([candidate("C50.1", None, Some("3"), Some("1"), Some("DGN"))]);
        let filter = CandidateFilter {
            require_date: true,
            ..CandidateFilter::default()
        };
        assert_eq!(set.select_best(&filter), None);
        assert!(set.select_best(&CandidateFilter::default()).is_some());
    }

    #[test]
    fn selection_is_deterministic_across_invocations() {
        let set = CandidateSet::new([
            candidate("C50.9", None, None, None, None),
            candidate("C50.2", None, None, None, None),
            candidate("C50.5", None, None, None, None),
        ]);
        let first = set.pick().unwrap().clone();
        for _ in 0..10 {
            assert_eq!(set.pick().unwrap(), &first);
        }
        // the frozen order makes the unfiltered rung pick the lowest code
        assert_eq!(first.mkb10, "C50.2");
    }

    #[test]
    fn register_pools_are_tried_in_priority_order() {
        let set = CandidateSet::new([
            candidate("C61", Some((2023, 1, 1)), None, Some("1"), None),
            candidate("C50.2", Some((2023, 1, 1)), None, None, None),
            candidate("C50.1", Some((2023, 1, 1)), None, None, None),
        ]);

        // exact register code wins over the better-qualified C61
        assert_eq!(set.pick_for_register("C50.1").unwrap().mkb10, "C50.1");
        // no exact match: same top-level category pool
        assert_eq!(set.pick_for_register("C50.7").unwrap().mkb10, "C50.1");
        // no category match either: the full set decides
        assert_eq!(set.pick_for_register("D10").unwrap().mkb10, "C61");
    }
}
