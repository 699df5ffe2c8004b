// src/models/selectors.rs

//! CSS selectors for every page shape the adapter reads.
//!
//! Keeping them as data means a markup change on the site is a config
//! edit rather than a code change.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Selector sets grouped by extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub schedule: ScheduleSelectors,

    #[serde(default)]
    pub catalog: CatalogSelectors,

    #[serde(default)]
    pub detail: DetailSelectors,

    #[serde(default)]
    pub resolver: ResolverSelectors,
}

impl Selectors {
    /// Check that every configured selector parses.
    pub fn validate(&self) -> Result<()> {
        let s = &self.schedule;
        let c = &self.catalog;
        let d = &self.detail;
        let mut all: Vec<&str> = vec![
            s.day_container.as_str(),
            s.entry.as_str(),
            s.anchor.as_str(),
            c.card.as_str(),
            c.cover.as_str(),
            c.title.as_str(),
            c.status.as_str(),
            c.genre.as_str(),
            c.synopsis.as_str(),
            d.root.as_str(),
            d.title.as_str(),
            d.cover.as_str(),
            d.info.as_str(),
            d.status.as_str(),
            d.synopsis.as_str(),
            d.resource_group.as_str(),
            d.resource_entry.as_str(),
            self.resolver.frame.selector.as_str(),
        ];
        all.extend(self.resolver.stream_attrs.iter().map(|a| a.selector.as_str()));

        for selector in all {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into the crate error.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Selectors for the weekly schedule block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSelectors {
    /// One container per weekday, Monday first
    pub day_container: String,

    /// Entry within a day container
    pub entry: String,

    /// Anchors within an entry: status first, title second
    pub anchor: String,
}

impl Default for ScheduleSelectors {
    fn default() -> Self {
        Self {
            day_container: "body > div.area > div.side.r > div.bg > div.tlist > ul".to_string(),
            entry: "li".to_string(),
            anchor: "a".to_string(),
        }
    }
}

/// Selectors for a catalog card grid (home listing and search).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSelectors {
    /// Each card in the grid
    pub card: String,

    /// Cover image within a card
    pub cover: String,

    /// Attribute holding the cover address
    #[serde(default = "default_src_attr")]
    pub cover_attr: String,

    /// Title anchor within a card (also carries the detail link)
    pub title: String,

    /// Status line within a card
    pub status: String,

    /// Genre line within a card
    pub genre: String,

    /// Synopsis within a card
    pub synopsis: String,
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        Self {
            card: "div.lpic > ul > li".to_string(),
            cover: "a > img".to_string(),
            cover_attr: default_src_attr(),
            title: "h2 > a".to_string(),
            status: "span:nth-of-type(1)".to_string(),
            genre: "span:nth-of-type(2)".to_string(),
            synopsis: "p".to_string(),
        }
    }
}

/// Selectors for an item's detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    /// Root metadata block; its absence means the item is gone
    pub root: String,

    /// Title within the root block
    pub title: String,

    /// Cover image within the root block
    pub cover: String,

    /// Attribute holding the cover address
    #[serde(default = "default_src_attr")]
    pub cover_attr: String,

    /// Labelled info spans ("地区：日本", ...)
    pub info: String,

    /// Label of the region span
    pub region_label: String,

    /// Label of the genre span
    pub genre_label: String,

    /// Label of the update-time span
    pub update_time_label: String,

    /// Status line within the root block
    pub status: String,

    /// Synopsis block (page-wide)
    pub synopsis: String,

    /// One block per resource group (mirror/kind)
    pub resource_group: String,

    /// Resource anchor within a group
    pub resource_entry: String,

    /// Attribute carrying an explicit order value
    #[serde(default = "default_order_attr")]
    pub order_attr: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            root: "div.fire.l".to_string(),
            title: "div.rate.r > h1".to_string(),
            cover: "div.thumb.l > img".to_string(),
            cover_attr: default_src_attr(),
            info: "div.sinfo > span".to_string(),
            region_label: "地区".to_string(),
            genre_label: "类型".to_string(),
            update_time_label: "上映".to_string(),
            status: "div.sinfo > p".to_string(),
            synopsis: "div.info".to_string(),
            resource_group: "div.movurl".to_string(),
            resource_entry: "ul > li > a".to_string(),
            order_attr: default_order_attr(),
        }
    }
}

/// An element/attribute pair that may carry a URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttrSelector {
    pub selector: String,
    pub attr: String,
}

impl AttrSelector {
    pub fn new(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attr: attr.into(),
        }
    }
}

/// Selectors used when scanning intermediate pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSelectors {
    /// Places a stream address is embedded, in priority order
    pub stream_attrs: Vec<AttrSelector>,

    /// Nested player frame on landing pages
    pub frame: AttrSelector,
}

impl Default for ResolverSelectors {
    fn default() -> Self {
        Self {
            stream_attrs: vec![
                AttrSelector::new("[data-vid]", "data-vid"),
                AttrSelector::new("video[src]", "src"),
                AttrSelector::new("video > source[src]", "src"),
                AttrSelector::new("[data-url]", "data-url"),
            ],
            frame: AttrSelector::new("iframe[src]", "src"),
        }
    }
}

fn default_src_attr() -> String {
    "src".to_string()
}

fn default_order_attr() -> String {
    "data-order".to_string()
}
