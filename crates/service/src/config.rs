//! Service tunables.

/// Knobs for [`SocialService`](crate::SocialService)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Shared likes a user needs before acting as a recommendation neighbor
    pub min_overlap: usize,

    /// Size of the popular list when the caller gives no count
    pub default_popular_limit: usize,

    /// Largest feed page handed out in one call
    pub max_feed_page: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_overlap: 0,
            default_popular_limit: 10,
            max_feed_page: 100,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    pub fn with_default_popular_limit(mut self, limit: usize) -> Self {
        self.default_popular_limit = limit;
        self
    }

    pub fn with_max_feed_page(mut self, max: usize) -> Self {
        self.max_feed_page = max;
        self
    }
}
