//! Static metadata identifying this source to the host.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Source-identifying metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    /// Unique slug; a host replaces any source registered under the same key
    pub key: String,
    pub name: String,
    pub homepage_url: String,
    pub version: String,
    /// ISO-8601, no offset
    pub last_edit_date: NaiveDateTime,
    pub logo_url: String,
}

impl SourceDescriptor {
    /// Descriptor of the yhdmz catalog.
    pub fn yhdmz() -> Self {
        let last_edit_date = NaiveDateTime::parse_from_str(
            "2023-08-10T17:19:42.113727",
            "%Y-%m-%dT%H:%M:%S%.f",
        )
        .unwrap_or_default();

        Self {
            key: "yhdmz".to_string(),
            name: "樱花动漫".to_string(),
            homepage_url: "https://www.yhdmz.org".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            last_edit_date,
            logo_url: "https://www.yhdmz.org/tpsf/yh_pic/favicon.ico".to_string(),
        }
    }
}
