//! Reference-directory lookup
//!
//! The pipeline consumes a read-only reference directory keyed by passport
//! OID to resolve diagnosis/service short codes and `from-to` code ranges
//! to canonical entries. The backend is abstracted behind a trait; an
//! in-memory implementation backs tests and offline runs. A lookup miss is
//! not an error — it simply contributes nothing to the expanded set.

use crate::algorithm::extract::code_systems;
use crate::error::Result;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Upper-bound suffix turning a bare code into an inclusive prefix range:
/// `C50` expands as the half-open range `[C50, C50я)`
const RANGE_SUFFIX: char = 'я';

/// One resolved directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Canonical code
    pub code: String,
    /// Canonical name
    pub name: String,
}

/// Read-only reference-directory backend
pub trait DirectoryLookup {
    /// Entries of a passport with `from <= code < to`; composite range
    /// codes (containing a dash) are excluded.
    fn resolve_range(&self, passport_oid: &str, from: &str, to: &str)
    -> Result<Vec<DirectoryEntry>>;

    /// Entries of a passport matching the given codes exactly.
    fn resolve_codes(&self, passport_oid: &str, codes: &[String]) -> Result<Vec<DirectoryEntry>>;

    /// NMU service codes attached to an instrumental-diagnostics entry.
    fn instrumental_services(&self, code: &str) -> Result<Vec<String>>;
}

/// In-memory directory for tests and offline runs
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    passports: FxHashMap<String, BTreeMap<String, String>>,
    instrumental: FxHashMap<String, Vec<String>>,
}

impl MemoryDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under a passport
    pub fn insert(&mut self, passport_oid: &str, code: &str, name: &str) {
        self.passports
            .entry(passport_oid.to_string())
            .or_default()
            .insert(code.to_string(), name.to_string());
    }

    /// Attach NMU service codes to an instrumental-diagnostics entry
    pub fn insert_instrumental(&mut self, code: &str, services: &[&str]) {
        self.instrumental.insert(
            code.to_string(),
            services.iter().map(ToString::to_string).collect(),
        );
    }
}

impl DirectoryLookup for MemoryDirectory {
    fn resolve_range(
        &self,
        passport_oid: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<DirectoryEntry>> {
        let Some(passport) = self.passports.get(passport_oid) else {
            return Ok(Vec::new());
        };
        Ok(passport
            .range::<str, _>((Bound::Included(from), Bound::Excluded(to)))
            .filter(|(code, _)| !code.contains('-'))
            .map(|(code, name)| DirectoryEntry {
                code: code.clone(),
                name: name.clone(),
            })
            .collect())
    }

    fn resolve_codes(&self, passport_oid: &str, codes: &[String]) -> Result<Vec<DirectoryEntry>> {
        let Some(passport) = self.passports.get(passport_oid) else {
            return Ok(Vec::new());
        };
        Ok(codes
            .iter()
            .filter_map(|code| {
                passport.get(code.trim()).map(|name| DirectoryEntry {
                    code: code.trim().to_string(),
                    name: name.clone(),
                })
            })
            .collect())
    }

    fn instrumental_services(&self, code: &str) -> Result<Vec<String>> {
        Ok(self.instrumental.get(code).cloned().unwrap_or_default())
    }
}

/// Expand a comma-separated diagnosis template (`C50, C60-C63`) into the
/// canonical code set. A bare code covers all of its subcodes; a
/// `from-to` pair is half-open on the right.
pub fn expand_diagnoses(lookup: &dyn DirectoryLookup, template: &str) -> Result<BTreeSet<String>> {
    let mut result = BTreeSet::new();
    for part in template.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (from, to) = match part.split_once('-') {
            Some((from, to)) => (from.trim().to_string(), to.trim().to_string()),
            None => (part.to_string(), format!("{part}{RANGE_SUFFIX}")),
        };
        for entry in lookup.resolve_range(code_systems::MKB10, &from, &to)? {
            if !entry.code.is_empty() {
                result.insert(entry.code);
            }
        }
    }
    Ok(result)
}

/// Resolve an explicit service code list into the canonical code set.
pub fn expand_services(lookup: &dyn DirectoryLookup, services: &[String]) -> Result<BTreeSet<String>> {
    let entries = lookup.resolve_codes(code_systems::SERVICE, services)?;
    Ok(entries
        .into_iter()
        .filter(|entry| !entry.code.is_empty())
        .map(|entry| entry.code)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> MemoryDirectory {
        let mut dir = MemoryDirectory::new();
        for (code, name) in [
            ("C50", "ЗНО молочной железы"),
            ("C50.1", "ЗНО центральной части молочной железы"),
            ("C60", "ЗНО полового члена"),
            ("C61", "ЗНО предстательной железы"),
            ("C63", "ЗНО других мужских половых органов"),
            ("C60-C63", "ЗНО мужских половых органов"),
        ] {
            dir.insert(code_systems::MKB10, code, name);
        }
        dir
    }

    #[test]
    fn bare_code_covers_subcodes() {
        let codes = expand_diagnoses(&directory(), "C50").unwrap();
        assert_eq!(
            codes,
            BTreeSet::from(["C50".to_string(), "C50.1".to_string()])
        );
    }

    #[test]
    fn explicit_range_is_half_open_and_skips_composites() {
        let codes = expand_diagnoses(&directory(), "C60-C63").unwrap();
        // the composite C60-C63 entry is excluded, and so is the right bound
        assert_eq!(codes, BTreeSet::from(["C60".to_string(), "C61".to_string()]));
    }

    #[test]
    fn template_parts_are_unioned() {
        let codes = expand_diagnoses(&directory(), "C50, C60-C63,").unwrap();
        assert_eq!(codes.len(), 4);
    }
}
