#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oncocube::algorithm::extract::{code_systems, extract_document, extract_fragments};
    use oncocube::models::node::Element;

    const DOCUMENT: &str = r#"<ClinicalDocument xmlns="urn:hl7-org:v3">
        <component>
            <structuredBody>
                <component>
                    <section>
                        <code code="DGN" codeSystem="1.2.643.5.1.13.13.99.2.197"/>
                        <entry>
                            <act classCode="ACT">
                                <code code="3" codeSystem="1.2.643.5.1.13.13.11.1076"/>
                                <effectiveTime value="20230410"/>
                                <observation>
                                    <code code="1" codeSystem="1.2.643.5.1.13.13.11.1077"/>
                                    <effectiveTime value="20230401"/>
                                    <value code="C50.1" codeSystem="1.2.643.5.1.13.13.11.1005" displayName="ЗНО молочной железы"/>
                                </observation>
                            </act>
                        </entry>
                        <entry>
                            <observation>
                                <value code="C50.2" codeSystem="1.2.643.5.1.13.13.11.1005"/>
                            </observation>
                        </entry>
                    </section>
                </component>
                <component>
                    <section>
                        <code code="SUR" codeSystem="1.2.643.5.1.13.13.99.2.197"/>
                        <entry>
                            <procedure>
                                <effectiveTime>
                                    <low value="20230502"/>
                                </effectiveTime>
                                <code code="A16.20.043" codeSystem="1.2.643.5.1.13.13.11.1070"/>
                            </procedure>
                        </entry>
                    </section>
                </component>
            </structuredBody>
        </component>
    </ClinicalDocument>"#;

    #[test]
    fn context_is_inherited_from_nearest_ancestor() {
        let root = Element::parse(DOCUMENT).unwrap();
        let observations = extract_document(&root, code_systems::MKB10);
        assert_eq!(observations.len(), 2);

        let primary = observations
            .iter()
            .find(|obs| obs.code == "C50.1")
            .unwrap();
        assert_eq!(primary.section_code.as_deref(), Some("DGN"));
        assert_eq!(primary.accuracy_code.as_deref(), Some("3"));
        assert_eq!(primary.kind_code.as_deref(), Some("1"));
        // the observation's own effectiveTime shadows the act's
        assert_eq!(primary.date, NaiveDate::from_ymd_opt(2023, 4, 1));
        assert_eq!(primary.display_name.as_deref(), Some("ЗНО молочной железы"));
        assert_eq!(primary.parent_node_class_code.as_deref(), Some("ACT"));
    }

    #[test]
    fn siblings_do_not_see_each_others_context() {
        let root = Element::parse(DOCUMENT).unwrap();
        let observations = extract_document(&root, code_systems::MKB10);

        let secondary = observations
            .iter()
            .find(|obs| obs.code == "C50.2")
            .unwrap();
        assert_eq!(secondary.section_code.as_deref(), Some("DGN"));
        assert_eq!(secondary.accuracy_code, None);
        assert_eq!(secondary.kind_code, None);
        assert_eq!(secondary.date, None);
    }

    #[test]
    fn effective_time_period_falls_back_to_low_bound() {
        let root = Element::parse(DOCUMENT).unwrap();
        let services = extract_document(&root, code_systems::SERVICE);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].code, "A16.20.043");
        assert_eq!(services[0].date, NaiveDate::from_ymd_opt(2023, 5, 2));
        assert_eq!(services[0].section_code.as_deref(), Some("SUR"));
    }

    #[test]
    fn deepest_context_definition_wins() {
        let xml = r#"<section>
            <code code="3" codeSystem="1.2.643.5.1.13.13.11.1076"/>
            <entry>
                <observation>
                    <code code="4" codeSystem="1.2.643.5.1.13.13.99.2.795"/>
                    <value code="C61" codeSystem="1.2.643.5.1.13.13.11.1005"/>
                </observation>
            </entry>
            <entry>
                <observation>
                    <value code="C62" codeSystem="1.2.643.5.1.13.13.11.1005"/>
                </observation>
            </entry>
        </section>"#;
        let observations = extract_fragments([xml], code_systems::MKB10);
        let inner = observations.iter().find(|obs| obs.code == "C61").unwrap();
        assert_eq!(inner.accuracy_code.as_deref(), Some("4"));
        let outer = observations.iter().find(|obs| obs.code == "C62").unwrap();
        assert_eq!(outer.accuracy_code.as_deref(), Some("3"));
    }

    #[test]
    fn malformed_fragment_is_skipped_not_fatal() {
        let good = r#"<observation><value code="C50" codeSystem="1.2.643.5.1.13.13.11.1005"/></observation>"#;
        let broken = "<observation><value></observation>";
        let observations = extract_fragments([broken, good, ""], code_systems::MKB10);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].code, "C50");
    }

    #[test]
    fn redundant_paths_collapse_to_one_observation() {
        let xml = r#"<entry>
            <observation>
                <value code="C50" codeSystem="1.2.643.5.1.13.13.11.1005"/>
            </observation>
        </entry>"#;
        let observations = extract_fragments([xml, xml], code_systems::MKB10);
        assert_eq!(observations.len(), 1);
    }
}
