//! Configuration for pipeline runs.

use rustc_hash::FxHashMap;

/// Configuration shared by the batch pipeline drivers
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of records per reported chunk of a batch pass
    pub batch_size: usize,
    /// Purge previously written rows of the target cube before the run
    pub erase: bool,
    /// Resume cursor: skip units with an id below this value.
    /// Resumption is explicit rather than checkpoint-based.
    pub resume_from: Option<String>,
    /// Skip the regrouping stage of the milestone cube and only
    /// recompute milestone values for existing rows
    pub only_fill_milestones: bool,
    /// Fallback mapping from author post OID to a service code, used for
    /// consultation protocols (document type 20) carrying no coded service
    pub service_by_post: FxHashMap<String, String>,
    /// Render an indicatif progress bar while the batch runs
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            erase: false,
            resume_from: None,
            only_fill_milestones: false,
            service_by_post: FxHashMap::default(),
            show_progress: false,
        }
    }
}
