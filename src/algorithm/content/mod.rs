//! Content-completeness checking
//!
//! Scores a document's extracted structured content against the expected
//! indicator catalog of its type. Only indicators that were extracted but
//! came back empty count against completeness; keys absent from the
//! extraction are not evaluated.

pub mod indicators;

use crate::models::verdict::{ContentVerdict, OK};
use indicators::{INDICATOR_MIN_LENGTH, NOT_ANALYZED, VALIDATION_FAILED, indicators_for};
use std::collections::BTreeMap;

/// Outcome of the per-type content extraction collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Structured indicator values, possibly empty strings
    Values(BTreeMap<String, String>),
    /// No indicators are defined for the type; the sentinel text is
    /// reported verbatim
    NotAnalyzed(String),
    /// Extraction failed entirely
    Failed,
}

impl Default for ExtractedContent {
    fn default() -> Self {
        Self::NotAnalyzed(NOT_ANALYZED.to_string())
    }
}

/// Evaluate a document's extracted content against the expected-indicator
/// catalog of its type.
#[must_use]
pub fn check(document_type: &str, extracted: ExtractedContent) -> ContentVerdict {
    let mut values = match extracted {
        ExtractedContent::Values(values) => values,
        ExtractedContent::NotAnalyzed(sentinel) => {
            return ContentVerdict {
                content: BTreeMap::new(),
                content_error: sentinel,
            };
        }
        ExtractedContent::Failed => {
            return ContentVerdict {
                content: BTreeMap::new(),
                content_error: VALIDATION_FAILED.to_string(),
            };
        }
    };

    let catalog = indicators_for(document_type).unwrap_or(&[]);

    // free-text indicators below the minimum length count as empty
    for indicator in catalog.iter().filter(|indicator| indicator.free_text) {
        if let Some(value) = values.get_mut(indicator.key) {
            if value.chars().count() < INDICATOR_MIN_LENGTH {
                value.clear();
            }
        }
    }

    let mut missing_labels: Vec<&str> = Vec::new();
    for indicator in catalog {
        if values
            .get(indicator.key)
            .is_some_and(|value| value.is_empty())
        {
            missing_labels.push(indicator.label);
        }
    }

    values.retain(|_, value| !value.is_empty());

    let content_error = if missing_labels.is_empty() {
        OK.to_string()
    } else {
        format!(
            "Неполное заполнение -{}. Не указано: {}",
            missing_labels.len(),
            missing_labels.join(", ")
        )
    };

    ContentVerdict {
        content: values,
        content_error,
    }
}
