//! Media count models

use serde::{Deserialize, Serialize};

/// Counts reported by one backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCounts {
    pub movie_count: u64,
    pub tv_count: u64,
    pub episode_count: u64,
    #[serde(default)]
    pub user_count: u64,
}

/// Counts of one instance, tagged with its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    pub server: String,
    #[serde(flatten)]
    pub counts: MediaCounts,
}

impl Statistic {
    pub fn new(server: impl Into<String>, counts: MediaCounts) -> Self {
        Self {
            server: server.into(),
            counts,
        }
    }
}
