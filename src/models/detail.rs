//! Item detail data structures.

use serde::{Deserialize, Serialize};

/// A named resource on a detail page, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub display_name: String,
    /// Absolute URL; may be an intermediate page or a direct stream
    pub raw_url: String,
    /// Opaque sort key within its group
    pub order: i64,
}

/// Full record of one catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub detail_url: String,
    pub title: String,
    pub cover_image_url: String,
    /// Unformatted, as shown on the page
    pub update_time_text: String,
    pub region: String,
    pub genre_text: String,
    pub status_text: String,
    pub synopsis: String,
    /// One group per mirror/kind in page order; entries sorted by `order`
    pub resource_groups: Vec<Vec<ResourceRef>>,
}
