//! Catalog listing data structures.

use serde::{Deserialize, Serialize};

/// One card of a listing or search result page.
///
/// Fields missing from a card are empty strings; the card is still kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub title: String,
    pub cover_image_url: String,
    pub status_text: String,
    pub genre_text: String,
    pub synopsis: String,
    /// Absolute URL of the detail page
    pub detail_url: String,
}
