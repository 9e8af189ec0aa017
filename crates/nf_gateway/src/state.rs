use std::sync::Arc;

use nf_core::KeywordSet;

use crate::convert::ScriptConverter;
use crate::upstream::UpstreamSearch;

pub struct AppState {
    pub upstream: Arc<dyn UpstreamSearch>,
    pub converter: Arc<dyn ScriptConverter>,
    /// Used whenever a request carries no keywords.
    pub fallback: KeywordSet,
}

impl AppState {
    pub fn new(upstream: Arc<dyn UpstreamSearch>, converter: Arc<dyn ScriptConverter>) -> Self {
        Self {
            upstream,
            converter,
            fallback: KeywordSet::fallback(),
        }
    }

    pub fn with_fallback(mut self, fallback: KeywordSet) -> Self {
        self.fallback = fallback;
        self
    }
}
