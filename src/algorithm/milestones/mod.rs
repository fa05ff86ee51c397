//! Milestone rule catalog and SLA day-offset evaluation
//!
//! Order rules pair a diagnosis code set with a mandatory service code set
//! inside a validity window. For every patient-diagnosis timeline entry
//! the evaluator finds the earliest qualifying referral and the earliest
//! qualifying performed service on or after the diagnosis date and records
//! the day offsets.

use crate::directory::{DirectoryLookup, expand_diagnoses, expand_services};
use crate::error::Result;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Document types counted as a referral
pub const REFERRAL_DOCUMENT_TYPES: &[&str] = &["1", "27"];

/// Document types counted as a performed service
pub const PERFORMED_DOCUMENT_TYPES: &[&str] = &["2", "3", "4", "9", "12", "20"];

/// Milestone key suffix for the earliest referral
pub const REFERRAL_SUFFIX: &str = "referral";

/// Milestone key suffix for the earliest performed service
pub const PERFORMED_SUFFIX: &str = "performed";

const ORDER_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// One expanded order rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneRule {
    /// Composite code: `{order_code}|{rule_code}|{services_code}`
    pub code: String,
    /// Expanded diagnosis code set
    pub diagnoses: BTreeSet<String>,
    /// Expanded service code set
    pub services: BTreeSet<String>,
    /// Start of the validity window the rule was taken from
    pub valid_from: NaiveDate,
}

/// Query side of the service cube consumed by the evaluator
pub trait ServiceStore {
    /// Earliest referral record (by record timestamp) for the patient with
    /// a service code in the set, dated on or after `not_before`.
    fn earliest_referral(
        &self,
        ptn_id: &str,
        services: &BTreeSet<String>,
        not_before: NaiveDate,
    ) -> Option<NaiveDate>;

    /// Earliest performed service (by service date) for the patient with a
    /// service code in the set, dated on or after `not_before`.
    fn earliest_performed(
        &self,
        ptn_id: &str,
        services: &BTreeSet<String>,
        not_before: NaiveDate,
    ) -> Option<NaiveDate>;
}

fn parse_order_date(value: &str) -> Option<NaiveDate> {
    ORDER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn string_field<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(serde_json::Value::as_str)
}

/// Build the rule catalog from the `orders_rules` settings document.
///
/// Orders whose validity window does not cover `as_of` are skipped, as are
/// structurally invalid orders/rules and rules whose expansion fails.
/// Among rules with identical `(diagnoses, services)` sets only the one
/// with the latest `valid_from` survives (last-writer-wins, not fan-out).
/// The build is idempotent: identical inputs yield an identical catalog.
#[must_use]
pub fn build_rule_catalog(
    orders: &serde_json::Value,
    lookup: &dyn DirectoryLookup,
    as_of: NaiveDate,
) -> Vec<MilestoneRule> {
    let mut catalog: Vec<MilestoneRule> = Vec::new();

    let Some(orders) = orders.as_array() else {
        return catalog;
    };

    for order in orders {
        let Some(order_code) = string_field(order, "code") else {
            continue;
        };

        let order_valid = order.get("order_valid");
        let valid_from = order_valid
            .and_then(|window| string_field(window, "from"))
            .and_then(parse_order_date);
        let valid_to = order_valid
            .and_then(|window| string_field(window, "to"))
            .and_then(parse_order_date);

        let Some(valid_from) = valid_from else {
            continue;
        };
        if valid_from > as_of {
            continue;
        }
        if valid_to.is_some_and(|to| to < as_of) {
            continue;
        }

        let Some(rules) = order.get("rules").and_then(serde_json::Value::as_array) else {
            continue;
        };

        for rule in rules {
            let Some(rule_code) = string_field(rule, "code") else {
                continue;
            };
            let Some(diagnoses_template) = string_field(rule, "diagnoses") else {
                continue;
            };
            let diagnoses = match expand_diagnoses(lookup, diagnoses_template) {
                Ok(diagnoses) => diagnoses,
                Err(error) => {
                    log::warn!("rule {order_code}|{rule_code}: diagnosis expansion failed: {error}");
                    continue;
                }
            };

            let Some(groups) = rule
                .get("mandatory_services")
                .and_then(serde_json::Value::as_array)
            else {
                continue;
            };

            for group in groups {
                let Some(services_code) = string_field(group, "code") else {
                    continue;
                };
                let Some(service_values) =
                    group.get("services").and_then(serde_json::Value::as_array)
                else {
                    continue;
                };
                let service_codes: Vec<String> = service_values
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(ToString::to_string)
                    .collect();
                let services = match expand_services(lookup, &service_codes) {
                    Ok(services) => services,
                    Err(error) => {
                        log::warn!(
                            "rule {order_code}|{rule_code}|{services_code}: service expansion failed: {error}"
                        );
                        continue;
                    }
                };

                let code = format!("{order_code}|{rule_code}|{services_code}");
                match catalog
                    .iter_mut()
                    .find(|existing| existing.diagnoses == diagnoses && existing.services == services)
                {
                    Some(existing) => {
                        if valid_from > existing.valid_from {
                            existing.valid_from = valid_from;
                            existing.code = code;
                        }
                    }
                    None => catalog.push(MilestoneRule {
                        code,
                        diagnoses: diagnoses.clone(),
                        services,
                        valid_from,
                    }),
                }
            }
        }
    }

    catalog
}

/// Compute the milestone day offsets of one patient-diagnosis entry.
///
/// For every rule whose diagnosis set contains the code, the earliest
/// qualifying referral yields `{rule_code}:referral` and the earliest
/// qualifying performed service yields `{rule_code}:performed`; a missing
/// qualifying service omits the key rather than recording zero.
#[must_use]
pub fn evaluate(
    ptn_id: &str,
    mkb10: &str,
    diagnosis_date: NaiveDate,
    rules: &[MilestoneRule],
    services: &impl ServiceStore,
) -> BTreeMap<String, i64> {
    let mut milestones = BTreeMap::new();

    for rule in rules {
        if !rule.diagnoses.contains(mkb10) {
            continue;
        }

        if let Some(referral_date) =
            services.earliest_referral(ptn_id, &rule.services, diagnosis_date)
        {
            milestones.insert(
                format!("{}:{REFERRAL_SUFFIX}", rule.code),
                (referral_date - diagnosis_date).num_days(),
            );
        }

        if let Some(performed_date) =
            services.earliest_performed(ptn_id, &rule.services, diagnosis_date)
        {
            milestones.insert(
                format!("{}:{PERFORMED_SUFFIX}", rule.code),
                (performed_date - diagnosis_date).num_days(),
            );
        }
    }

    milestones
}

/// Parse and validate a date-range pair of caller-supplied parameters.
/// Fails fast identifying the offending parameter by name.
pub fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    use crate::error::OncoCubeError;

    let parse = |name: &str, value: Option<&str>| -> Result<Option<NaiveDate>> {
        value
            .map(|v| {
                parse_order_date(v).ok_or_else(|| OncoCubeError::InvalidParameter {
                    name: name.to_string(),
                    message: format!("unparseable date '{v}'"),
                })
            })
            .transpose()
    };

    let from = parse("date_from", from)?;
    let to = parse("date_to", to)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(OncoCubeError::InvalidParameter {
                name: "date_from".to_string(),
                message: "date_from is after date_to".to_string(),
            });
        }
    }
    Ok((from, to))
}
