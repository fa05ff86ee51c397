//! Extracted observation model
//!
//! An observation is a leaf fact recovered from a document tree: a coded
//! value tagged by its code system, together with the context inherited
//! from its enclosing ancestors. Observations are transient — they exist
//! only between parsing a document and folding the result into a
//! candidate set or a cube row.

use chrono::NaiveDate;

/// Context inherited down a document subtree.
///
/// Fields are set by the nearest enclosing ancestor that defines them; a
/// descendant never clears an ancestor-set field, it can only shadow it
/// with its own value for its own subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationContext {
    /// Code of the enclosing document section (code197)
    pub section_code: Option<String>,
    /// Diagnosis accuracy code (code1076)
    pub accuracy_code: Option<String>,
    /// Diagnosis kind code (code1077); `1` marks a primary diagnosis
    pub kind_code: Option<String>,
    /// Date from the nearest ancestor `effectiveTime`
    pub date: Option<NaiveDate>,
    /// Local name of the immediate parent element
    pub parent_node_name: Option<String>,
    /// `classCode` of the nearest ancestor that carries one
    pub parent_node_class_code: Option<String>,
}

/// A single extracted observation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Observation {
    /// Code system OID the observation belongs to
    pub code_system: String,
    /// The coded value itself
    pub code: String,
    /// Human-readable display name, unescaped
    pub display_name: Option<String>,
    /// Date inherited from the nearest ancestor `effectiveTime`
    pub date: Option<NaiveDate>,
    /// Enclosing section code (code197)
    pub section_code: Option<String>,
    /// Inherited accuracy code (code1076)
    pub accuracy_code: Option<String>,
    /// Inherited kind code (code1077)
    pub kind_code: Option<String>,
    /// Local name of the immediate parent element
    pub parent_node_name: Option<String>,
    /// `classCode` of the nearest ancestor that carries one
    pub parent_node_class_code: Option<String>,
}

impl Observation {
    /// Build an observation from a coded element and the context in force
    /// at its position in the tree.
    #[must_use]
    pub fn from_context(
        code_system: &str,
        code: &str,
        display_name: Option<&str>,
        context: &ObservationContext,
    ) -> Self {
        Self {
            code_system: code_system.to_string(),
            code: code.to_string(),
            display_name: display_name.map(ToString::to_string),
            date: context.date,
            section_code: context.section_code.clone(),
            accuracy_code: context.accuracy_code.clone(),
            kind_code: context.kind_code.clone(),
            parent_node_name: context.parent_node_name.clone(),
            parent_node_class_code: context.parent_node_class_code.clone(),
        }
    }
}
