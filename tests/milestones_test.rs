#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oncocube::algorithm::extract::code_systems;
    use oncocube::algorithm::milestones::{build_rule_catalog, evaluate, parse_date_range};
    use oncocube::cube::{CubeStore, MemoryCube};
    use oncocube::directory::MemoryDirectory;
    use oncocube::models::semd::{SemdEnvelope, SemdServiceRow};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn directory() -> MemoryDirectory {
        let mut dir = MemoryDirectory::new();
        for (code, name) in [
            ("C50", "ЗНО молочной железы"),
            ("C50.1", "ЗНО центральной части молочной железы"),
            ("C50.2", "ЗНО верхневнутреннего квадранта"),
            ("C61", "ЗНО предстательной железы"),
        ] {
            dir.insert(code_systems::MKB10, code, name);
        }
        for (code, name) in [
            ("A01.01.001", "Осмотр"),
            ("A02.01.001", "УЗИ"),
            ("B01.027.001", "Прием онколога"),
        ] {
            dir.insert(code_systems::SERVICE, code, name);
        }
        dir
    }

    fn orders() -> serde_json::Value {
        json!([
            {
                "code": "915н",
                "order_valid": {"from": "2021-01-01"},
                "rules": [{
                    "code": "r1",
                    "diagnoses": "C50",
                    "mandatory_services": [
                        {"code": "s1", "services": ["A01.01.001", "A02.01.001"]}
                    ]
                }]
            },
            {
                "code": "916н",
                "order_valid": {"from": "01.06.2022"},
                "rules": [{
                    "code": "r1",
                    "diagnoses": "C50",
                    "mandatory_services": [
                        {"code": "s1", "services": ["A01.01.001", "A02.01.001"]}
                    ]
                }]
            },
            {
                "code": "expired",
                "order_valid": {"from": "2020-01-01", "to": "2020-12-31"},
                "rules": [{
                    "code": "r1",
                    "diagnoses": "C61",
                    "mandatory_services": [{"code": "s1", "services": ["B01.027.001"]}]
                }]
            },
            {
                "code": "future",
                "order_valid": {"from": "2099-01-01"},
                "rules": [{
                    "code": "r1",
                    "diagnoses": "C61",
                    "mandatory_services": [{"code": "s1", "services": ["B01.027.001"]}]
                }]
            },
            {
                "code": "no-window",
                "rules": [{
                    "code": "r1",
                    "diagnoses": "C61",
                    "mandatory_services": [{"code": "s1", "services": ["B01.027.001"]}]
                }]
            },
            {"code": "broken-rules", "order_valid": {"from": "2021-01-01"}, "rules": "not-a-list"},
            "not-an-order"
        ])
    }

    #[test]
    fn catalog_keeps_only_orders_valid_as_of_the_date() {
        let catalog = build_rule_catalog(&orders(), &directory(), date(2023, 1, 1));
        assert_eq!(catalog.len(), 1);
        // duplicate (diagnoses, services) pairs: the latest valid_from wins
        assert_eq!(catalog[0].code, "916н|r1|s1");
        assert_eq!(catalog[0].valid_from, date(2022, 6, 1));
        assert!(catalog[0].diagnoses.contains("C50.1"));
        assert!(catalog[0].diagnoses.contains("C50.2"));
        assert_eq!(catalog[0].services.len(), 2);
    }

    #[test]
    fn catalog_build_is_idempotent() {
        let first = build_rule_catalog(&orders(), &directory(), date(2023, 1, 1));
        let second = build_rule_catalog(&orders(), &directory(), date(2023, 1, 1));
        assert_eq!(first, second);
    }

    #[test]
    fn expired_window_admits_the_rule_within_it() {
        let catalog = build_rule_catalog(&orders(), &directory(), date(2020, 6, 1));
        let codes: Vec<&str> = catalog.iter().map(|rule| rule.code.as_str()).collect();
        assert!(codes.contains(&"expired|r1|s1"));
        assert!(!codes.contains(&"916н|r1|s1"));
    }

    fn service_row(
        ptn_id: &str,
        document_type: &str,
        service_code: &str,
        time_rc: NaiveDate,
        service_date: Option<NaiveDate>,
    ) -> SemdServiceRow {
        SemdServiceRow {
            envelope: SemdEnvelope {
                ptn_id: ptn_id.to_string(),
                rc_id: format!("rc-{service_code}-{time_rc}"),
                document_type: Some(document_type.to_string()),
                time_rc: time_rc.and_hms_opt(10, 0, 0),
                ..SemdEnvelope::default()
            },
            service_code: service_code.to_string(),
            service_date,
            instrumental_diagnostics_code: None,
        }
    }

    #[test]
    fn referral_and_performed_offsets_are_split_by_document_type() {
        let mut cube = MemoryCube::new();
        // referral eleven days after the diagnosis
        cube.insert_service(service_row(
            "p1",
            "1",
            "A01.01.001",
            date(2023, 1, 12),
            None,
        ))
        .unwrap();
        // performed on the diagnosis date itself
        cube.insert_service(service_row(
            "p1",
            "3",
            "A02.01.001",
            date(2023, 1, 20),
            Some(date(2023, 1, 1)),
        ))
        .unwrap();

        let catalog = build_rule_catalog(&orders(), &directory(), date(2023, 6, 1));
        let milestones = evaluate("p1", "C50.1", date(2023, 1, 1), &catalog, &cube);

        assert_eq!(milestones.get("916н|r1|s1:referral"), Some(&11));
        assert_eq!(milestones.get("916н|r1|s1:performed"), Some(&0));
    }

    #[test]
    fn services_before_the_diagnosis_date_never_qualify() {
        let mut cube = MemoryCube::new();
        cube.insert_service(service_row(
            "p1",
            "3",
            "A02.01.001",
            date(2022, 12, 31),
            Some(date(2022, 12, 31)),
        ))
        .unwrap();

        let catalog = build_rule_catalog(&orders(), &directory(), date(2023, 6, 1));
        let milestones = evaluate("p1", "C50.1", date(2023, 1, 1), &catalog, &cube);
        assert!(milestones.is_empty());
    }

    #[test]
    fn unrelated_diagnoses_and_patients_yield_nothing() {
        let mut cube = MemoryCube::new();
        cube.insert_service(service_row(
            "p2",
            "1",
            "A01.01.001",
            date(2023, 1, 10),
            None,
        ))
        .unwrap();

        let catalog = build_rule_catalog(&orders(), &directory(), date(2023, 6, 1));
        // C61 is not in the catalog at this date
        assert!(evaluate("p2", "C61", date(2023, 1, 1), &catalog, &cube).is_empty());
        // wrong patient
        assert!(evaluate("p1", "C50.1", date(2023, 1, 1), &catalog, &cube).is_empty());
    }

    #[test]
    fn date_range_parameters_fail_fast_by_name() {
        assert!(parse_date_range(Some("2023-01-01"), Some("31.12.2023")).is_ok());

        let error = parse_date_range(Some("not-a-date"), None).unwrap_err();
        assert!(error.to_string().contains("date_from"));

        let swapped = parse_date_range(Some("2023-12-31"), Some("2023-01-01")).unwrap_err();
        assert!(swapped.to_string().contains("date_from"));
    }
}
