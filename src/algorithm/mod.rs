//! Core algorithms: observation extraction, classification,
//! reconciliation, content completeness and milestone evaluation.

pub mod classify;
pub mod content;
pub mod extract;
pub mod milestones;
pub mod reconcile;
