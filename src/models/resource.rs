//! Resolved resource data structures.

use serde::{Deserialize, Serialize};

/// A resource reference paired with its playable address.
///
/// `playable_url` equals `raw_url` when resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedResource {
    pub raw_url: String,
    pub playable_url: String,
}

impl ResolvedResource {
    /// An entry left as-is.
    pub fn unresolved(raw_url: impl Into<String>) -> Self {
        let raw_url = raw_url.into();
        Self {
            playable_url: raw_url.clone(),
            raw_url,
        }
    }

    /// Whether resolution produced a different address.
    pub fn is_resolved(&self) -> bool {
        self.raw_url != self.playable_url
    }
}

/// How a resource reference is turned into a stream address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Already a stream
    Direct,
    /// A wrapper whose query carries the target address
    Wrapped,
    /// Player page embedding a stream attribute
    Embed,
    /// Site page that leads to a player
    Landing,
    /// Needs a probing fetch to decide
    Unknown,
}
