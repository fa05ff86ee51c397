//! Observation extraction from document trees
//!
//! SEMD documents nest coded observations at arbitrary depths and under
//! heterogeneous section schemas. The walker recurses depth-first over a
//! parsed `Element` tree, carrying an inherited context (section code,
//! accuracy, kind, observation date) that the nearest defining ancestor
//! wins: a `code` child with a context code system shadows the inherited
//! value for that subtree only, siblings above keep theirs.

pub mod code_systems;

use crate::models::node::Element;
use crate::models::observation::{Observation, ObservationContext};
use crate::utils::date::parse_compact_date;
use rustc_hash::FxHashSet;

/// Extract all observations of a target code system from a subtree,
/// starting from an empty inherited context.
#[must_use]
pub fn extract(root: &Element, target_code_system: &str) -> Vec<Observation> {
    extract_with_context(root, target_code_system, &ObservationContext::default())
}

/// Extract with an explicit starting context (used by the section driver
/// and by tests probing inheritance).
#[must_use]
pub fn extract_with_context(
    root: &Element,
    target_code_system: &str,
    context: &ObservationContext,
) -> Vec<Observation> {
    let mut found = FxHashSet::default();
    visit(root, context, target_code_system, &mut found);
    sorted(found)
}

/// Extract from a whole clinical document: walks
/// `ClinicalDocument/component/structuredBody/component/section`, seeds
/// each section subtree with the section's own code as the section
/// context, and unions the per-section results.
#[must_use]
pub fn extract_document(root: &Element, target_code_system: &str) -> Vec<Observation> {
    let mut found = FxHashSet::default();
    let components = root
        .path(&["component", "structuredBody"])
        .map(|body| body.children_named("component").collect::<Vec<_>>())
        .unwrap_or_default();

    for component in components {
        for section in component.children_named("section") {
            let context = ObservationContext {
                section_code: section
                    .child("code")
                    .and_then(|code| code.attr("code"))
                    .map(ToString::to_string),
                ..ObservationContext::default()
            };
            visit(section, &context, target_code_system, &mut found);
        }
    }

    sorted(found)
}

/// Extract from a batch of standalone XML fragments. A fragment that fails
/// to parse is logged and skipped; the rest of the batch continues.
#[must_use]
pub fn extract_fragments<'a>(
    fragments: impl IntoIterator<Item = &'a str>,
    target_code_system: &str,
) -> Vec<Observation> {
    let mut found = FxHashSet::default();
    for fragment in fragments {
        if fragment.trim().is_empty() {
            continue;
        }
        match Element::parse(fragment) {
            Ok(root) => {
                let context = ObservationContext {
                    section_code: root
                        .child("code")
                        .and_then(|code| code.attr("code"))
                        .map(ToString::to_string),
                    ..ObservationContext::default()
                };
                visit(&root, &context, target_code_system, &mut found);
            }
            Err(error) => {
                log::debug!("skipping unparseable fragment: {error}");
            }
        }
    }
    sorted(found)
}

fn visit(
    element: &Element,
    inherited: &ObservationContext,
    target: &str,
    found: &mut FxHashSet<Observation>,
) {
    let mut context = inherited.clone();

    // a `code` child carrying a context code system shadows the inherited
    // value for this subtree only
    if let Some(code_element) = element.child("code") {
        match code_element.attr("codeSystem") {
            Some(code_systems::ACCURACY) | Some(code_systems::ACCURACY_V2) => {
                if let Some(code) = code_element.attr("code") {
                    context.accuracy_code = Some(code.to_string());
                }
            }
            Some(code_systems::KIND) => {
                if let Some(code) = code_element.attr("code") {
                    context.kind_code = Some(code.to_string());
                }
            }
            _ => {}
        }
    }

    // nearest effectiveTime wins; a period without a point value falls
    // back to its low bound
    if let Some(effective_time) = element.child("effectiveTime") {
        let value = effective_time
            .attr("value")
            .or_else(|| effective_time.child("low").and_then(|low| low.attr("value")));
        if let Some(date) = value.and_then(parse_compact_date) {
            context.date = Some(date);
        }
    }

    if element.attr("codeSystem") == Some(target) {
        if let Some(code) = element.attr("code") {
            found.insert(Observation::from_context(
                target,
                code,
                element.attr("displayName"),
                &context,
            ));
        }
    }

    context.parent_node_name = Some(element.name.clone());
    if let Some(class_code) = element.attr("classCode") {
        context.parent_node_class_code = Some(class_code.to_string());
    }

    for child in element.elements() {
        visit(child, &context, target, found);
    }
}

fn sorted(found: FxHashSet<Observation>) -> Vec<Observation> {
    let mut observations: Vec<Observation> = found.into_iter().collect();
    observations.sort_by(|a, b| {
        a.code
            .cmp(&b.code)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.section_code.cmp(&b.section_code))
            .then_with(|| a.accuracy_code.cmp(&b.accuracy_code))
            .then_with(|| a.kind_code.cmp(&b.kind_code))
    });
    observations
}
