// src/services/catalog.rs

//! Catalog card extraction and listing/search query construction.
//!
//! The home listing and search results share one card layout, so both go
//! through [`CatalogExtractor::extract`].

use url::Url;

use crate::document::{Document, Node};
use crate::error::Result;
use crate::models::{
    CatalogSelectors, CatalogSummary, CleaningConfig, FilterFacet, FilterSelections, SourceConfig,
};

/// Maps a card grid into summaries, one per card.
pub struct CatalogExtractor<'c> {
    selectors: &'c CatalogSelectors,
    cleaning: &'c CleaningConfig,
}

impl<'c> CatalogExtractor<'c> {
    pub fn new(selectors: &'c CatalogSelectors, cleaning: &'c CleaningConfig) -> Self {
        Self {
            selectors,
            cleaning,
        }
    }

    /// Extract every card in display order. No cards means an empty page.
    pub fn extract(&self, document: &Document, base_url: &Url) -> Result<Vec<CatalogSummary>> {
        let cards = document.query(&self.selectors.card)?;
        let summaries = cards
            .iter()
            .map(|card| self.parse_card(card, base_url))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Extracted {} catalog cards", summaries.len());
        Ok(summaries)
    }

    fn parse_card(&self, card: &Node<'_>, base_url: &Url) -> Result<CatalogSummary> {
        let s = self.selectors;
        let title_anchor = card.first(&s.title)?;

        let title = title_anchor
            .map(|a| {
                let text = a.text();
                if text.is_empty() {
                    a.attribute("title").unwrap_or_default().trim().to_string()
                } else {
                    text
                }
            })
            .unwrap_or_default();
        let detail_url = title_anchor
            .and_then(|a| a.resolved_href(base_url))
            .unwrap_or_default();
        let cover_image_url = card
            .first(&s.cover)?
            .and_then(|img| img.resolved_attr(&s.cover_attr, base_url))
            .unwrap_or_default();

        Ok(CatalogSummary {
            title,
            cover_image_url,
            status_text: self.field_text(card, &s.status)?,
            genre_text: self.field_text(card, &s.genre)?,
            synopsis: self.field_text(card, &s.synopsis)?,
            detail_url,
        })
    }

    fn field_text(&self, card: &Node<'_>, selector: &str) -> Result<String> {
        Ok(card
            .first(selector)?
            .map(|n| self.cleaning.clean_field(&n.text()))
            .unwrap_or_default())
    }
}

/// Translate caller selections into query pairs, in facet-catalog order.
///
/// Unselected facets are omitted entirely. Unknown keys and values beyond
/// a facet's `max_selectable` are dropped. Values outside a facet's option
/// list are sent as given, with a warning.
pub fn encode_selections(
    facets: &[FilterFacet],
    selections: &FilterSelections,
) -> Vec<(String, String)> {
    for key in selections.keys() {
        if !facets.iter().any(|f| &f.key == key) {
            log::warn!("Ignoring unknown filter key '{}'", key);
        }
    }

    facets
        .iter()
        .filter_map(|facet| {
            let chosen: Vec<&str> = selections
                .get(&facet.key)?
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();
            if chosen.is_empty() {
                return None;
            }
            for value in chosen.iter().filter(|v| !facet.allows(v)) {
                log::warn!("Filter '{}' has no option '{}'", facet.key, value);
            }
            if chosen.len() > facet.max_selectable {
                log::warn!(
                    "Filter '{}' allows {} value(s), got {}; extra values dropped",
                    facet.key,
                    facet.max_selectable,
                    chosen.len()
                );
            }
            let value = chosen
                .iter()
                .take(facet.max_selectable.max(1))
                .copied()
                .collect::<Vec<_>>()
                .join(",");
            Some((facet.key.clone(), value))
        })
        .collect()
}

/// Site page index for a 1-based capability index.
fn site_page_index(page_index: usize) -> usize {
    page_index.max(1) - 1
}

/// URL of one page of the filtered catalog listing.
pub fn listing_url(
    source: &SourceConfig,
    facets: &[FilterFacet],
    page_index: usize,
    page_size: usize,
    selections: &FilterSelections,
) -> Result<Url> {
    let mut url = source.page_url(&source.list_path)?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in encode_selections(facets, selections) {
            query.append_pair(&key, &value);
        }
        query
            .append_pair("pagesize", &page_size.to_string())
            .append_pair("pageindex", &site_page_index(page_index).to_string());
    }
    Ok(url)
}

/// URL of one page of keyword search results.
pub fn search_url(
    source: &SourceConfig,
    page_index: usize,
    page_size: usize,
    keyword: &str,
) -> Result<Url> {
    let mut url = source.page_url(&source.search_path)?;
    url.query_pairs_mut()
        .append_pair("kw", keyword.trim())
        .append_pair("pagesize", &page_size.to_string())
        .append_pair("pageindex", &site_page_index(page_index).to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter_catalog;

    const CARDS: &str = r#"
        <div class="lpic"><ul>
          <li>
            <a href="/showp/20001.html"><img src="https://img.test/c1.jpg" alt="龙珠超"></a>
            <h2><a href="/showp/20001.html" title="龙珠超">龙珠超</a></h2>
            <span><font color="red">全131集</font></span>
            <span>类型：<a>热血</a> <a>战斗</a></span>
            <p>破坏神比鲁斯苏醒。</p>
          </li>
          <li>
            <h2><a href="showp/20002.html" title="只有标题"></a></h2>
          </li>
        </ul></div>"#;

    fn extract(html: &str) -> Vec<CatalogSummary> {
        let selectors = CatalogSelectors::default();
        let cleaning = CleaningConfig::default();
        let base = Url::parse("https://www.yhdmz.org/list/").unwrap();
        CatalogExtractor::new(&selectors, &cleaning)
            .extract(&Document::parse_str(html), &base)
            .unwrap()
    }

    #[test]
    fn test_extract_full_card() {
        let cards = extract(CARDS);
        assert_eq!(cards.len(), 2);
        let first = &cards[0];
        assert_eq!(first.title, "龙珠超");
        assert_eq!(first.cover_image_url, "https://img.test/c1.jpg");
        assert_eq!(first.status_text, "全131集");
        assert_eq!(first.genre_text, "热血 战斗");
        assert_eq!(first.synopsis, "破坏神比鲁斯苏醒。");
        assert_eq!(first.detail_url, "https://www.yhdmz.org/showp/20001.html");
    }

    #[test]
    fn test_sparse_card_kept_with_empty_fields() {
        let cards = extract(CARDS);
        let sparse = &cards[1];
        assert_eq!(sparse.title, "只有标题");
        assert_eq!(sparse.detail_url, "https://www.yhdmz.org/list/showp/20002.html");
        assert!(sparse.cover_image_url.is_empty());
        assert!(sparse.status_text.is_empty());
        assert!(sparse.genre_text.is_empty());
        assert!(sparse.synopsis.is_empty());
    }

    #[test]
    fn test_no_cards_is_empty() {
        assert!(extract("<div class='lpic'><ul></ul></div>").is_empty());
    }

    #[test]
    fn test_encode_omits_unselected_and_unknown() {
        let facets = filter_catalog();
        let mut selections = FilterSelections::new();
        selections.insert("genre".into(), vec!["热血".into()]);
        selections.insert("region".into(), vec![]);
        selections.insert("year".into(), vec!["  ".into()]);
        selections.insert("bogus".into(), vec!["x".into()]);

        let pairs = encode_selections(&facets, &selections);
        assert_eq!(pairs, vec![("genre".to_string(), "热血".to_string())]);
    }

    #[test]
    fn test_encode_truncates_to_max_selectable() {
        let facets = filter_catalog();
        let mut selections = FilterSelections::new();
        selections.insert("status".into(), vec!["连载".into(), "完结".into()]);
        selections.insert("region".into(), vec!["日本".into()]);

        let pairs = encode_selections(&facets, &selections);
        assert_eq!(
            pairs,
            vec![
                ("region".to_string(), "日本".to_string()),
                ("status".to_string(), "连载".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_passes_values_outside_vocabulary() {
        let facets = filter_catalog();
        let mut selections = FilterSelections::new();
        selections.insert("year".into(), vec!["2026".into()]);

        let pairs = encode_selections(&facets, &selections);
        assert_eq!(pairs, vec![("year".to_string(), "2026".to_string())]);
    }

    #[test]
    fn test_listing_url() {
        let source = SourceConfig::default();
        let facets = filter_catalog();
        let mut selections = FilterSelections::new();
        selections.insert("letter".into(), vec!["A".into()]);

        let url = listing_url(&source, &facets, 2, 24, &selections).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.yhdmz.org/list/?letter=A&pagesize=24&pageindex=1"
        );

        let url = listing_url(&source, &facets, 1, 24, &FilterSelections::new()).unwrap();
        assert_eq!(url.as_str(), "https://www.yhdmz.org/list/?pagesize=24&pageindex=0");
    }

    #[test]
    fn test_search_url_encodes_keyword() {
        let source = SourceConfig::default();
        let url = search_url(&source, 1, 20, " 龙珠 ").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.path(), "/s_all");
        assert_eq!(pairs[0], ("kw".to_string(), "龙珠".to_string()));
        assert_eq!(pairs[2], ("pageindex".to_string(), "0".to_string()));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        assert_eq!(site_page_index(0), 0);
        assert_eq!(site_page_index(1), 0);
        assert_eq!(site_page_index(5), 4);
    }
}
