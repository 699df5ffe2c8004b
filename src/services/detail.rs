// src/services/detail.rs

//! Item detail extraction.

use url::Url;

use crate::document::{Document, Node};
use crate::error::{ExtractionError, Result};
use crate::models::{CleaningConfig, DetailSelectors, ItemDetail, ResourceRef};

/// Maps a detail page into an [`ItemDetail`].
pub struct DetailExtractor<'c> {
    selectors: &'c DetailSelectors,
    cleaning: &'c CleaningConfig,
}

impl<'c> DetailExtractor<'c> {
    pub fn new(selectors: &'c DetailSelectors, cleaning: &'c CleaningConfig) -> Self {
        Self {
            selectors,
            cleaning,
        }
    }

    /// Extract metadata and resource groups.
    ///
    /// A page without the root metadata block is treated as a removed item.
    pub fn extract(&self, document: &Document, page_url: &Url) -> Result<ItemDetail> {
        let s = self.selectors;
        let root = document
            .first(&s.root)?
            .ok_or_else(|| ExtractionError::DetailNotFound {
                url: page_url.to_string(),
            })?;

        let info: Vec<String> = root.query(&s.info)?.iter().map(Node::text).collect();

        let detail = ItemDetail {
            detail_url: page_url.to_string(),
            title: self.text_of(&root, &s.title)?,
            cover_image_url: root
                .first(&s.cover)?
                .and_then(|img| img.resolved_attr(&s.cover_attr, page_url))
                .unwrap_or_default(),
            update_time_text: labelled_value(&info, &s.update_time_label),
            region: labelled_value(&info, &s.region_label),
            genre_text: labelled_value(&info, &s.genre_label),
            status_text: self.text_of(&root, &s.status)?,
            synopsis: document
                .first(&s.synopsis)?
                .map(|n| self.cleaning.clean_field(&n.text()))
                .unwrap_or_default(),
            resource_groups: self.resource_groups(document, page_url)?,
        };

        log::debug!(
            "Extracted detail '{}' with {} resource group(s)",
            detail.title,
            detail.resource_groups.len()
        );
        Ok(detail)
    }

    fn text_of(&self, root: &Node<'_>, selector: &str) -> Result<String> {
        Ok(root
            .first(selector)?
            .map(|n| self.cleaning.clean_field(&n.text()))
            .unwrap_or_default())
    }

    /// Groups in page order; entries sorted by `order` within each group.
    fn resource_groups(&self, document: &Document, page_url: &Url) -> Result<Vec<Vec<ResourceRef>>> {
        let s = self.selectors;
        let mut groups = Vec::new();

        for (group_index, group) in document.query(&s.resource_group)?.iter().enumerate() {
            let mut entries = Vec::new();
            for (position, anchor) in group.query(&s.resource_entry)?.iter().enumerate() {
                let Some(raw_url) = anchor.resolved_href(page_url) else {
                    log::debug!("Skipping resource '{}' without a link", anchor.text());
                    continue;
                };
                let order = anchor
                    .attribute(&s.order_attr)
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .unwrap_or_else(|| conventional_order(group_index, position));

                entries.push(ResourceRef {
                    display_name: anchor.text(),
                    raw_url,
                    order,
                });
            }
            entries.sort_by_key(|r| r.order);
            groups.push(entries);
        }

        Ok(groups)
    }
}

/// `10001, 10002, ...` for the first group, `20001, ...` for the second.
fn conventional_order(group_index: usize, position: usize) -> i64 {
    ((group_index as i64) + 1) * 10_000 + (position as i64) + 1
}

/// Value of the first info line starting with `label`, separator removed.
fn labelled_value(lines: &[String], label: &str) -> String {
    lines
        .iter()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(|rest| rest.trim_start_matches([':', '：', ' ']).trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const PAGE: &str = r#"
        <html><body>
        <div class="fire l">
          <div class="thumb l"><img src="//img.test/cover.jpg"></div>
          <div class="rate r">
            <h1>葬送的芙莉莲</h1>
            <div class="sinfo">
              <span>上映：<a>2023-09-29</a></span>
              <span>地区：<a>日本</a></span>
              <span>类型：<a>冒险</a> <a>奇幻</a></span>
              <p>更新至第28集</p>
            </div>
          </div>
        </div>
        <div class="info">  勇者一行人打倒魔王之后的故事。 </div>
        <div class="movurl"><ul>
          <li><a href="/vp/22598-1-1.html" data-order="10002">第02集</a></li>
          <li><a href="/vp/22598-1-0.html" data-order="10001">第01集</a></li>
        </ul></div>
        <div class="movurl"><ul>
          <li><a href="https://mirror.test/ep1.m3u8">第01集</a></li>
          <li><a>无链接</a></li>
          <li><a href="https://mirror.test/ep2.m3u8">第02集</a></li>
        </ul></div>
        <div class="movurl"><ul></ul></div>
        </body></html>"#;

    fn extract(html: &str) -> Result<ItemDetail> {
        let selectors = DetailSelectors::default();
        let cleaning = CleaningConfig::default();
        let url = Url::parse("https://www.yhdmz.org/showp/22598.html").unwrap();
        DetailExtractor::new(&selectors, &cleaning).extract(&Document::parse_str(html), &url)
    }

    #[test]
    fn test_metadata() {
        let detail = extract(PAGE).unwrap();
        assert_eq!(detail.detail_url, "https://www.yhdmz.org/showp/22598.html");
        assert_eq!(detail.title, "葬送的芙莉莲");
        assert_eq!(detail.cover_image_url, "https://img.test/cover.jpg");
        assert_eq!(detail.update_time_text, "2023-09-29");
        assert_eq!(detail.region, "日本");
        assert_eq!(detail.genre_text, "冒险 奇幻");
        assert_eq!(detail.status_text, "更新至第28集");
        assert_eq!(detail.synopsis, "勇者一行人打倒魔王之后的故事。");
    }

    #[test]
    fn test_groups_follow_document_order() {
        let detail = extract(PAGE).unwrap();
        assert_eq!(detail.resource_groups.len(), 3);

        let first = &detail.resource_groups[0];
        assert_eq!(first[0].display_name, "第01集");
        assert_eq!(first[0].order, 10001);
        assert_eq!(first[0].raw_url, "https://www.yhdmz.org/vp/22598-1-0.html");
        assert_eq!(first[1].order, 10002);

        let second = &detail.resource_groups[1];
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].order, 20001);
        assert_eq!(second[1].order, 20003);
        assert_eq!(second[1].raw_url, "https://mirror.test/ep2.m3u8");

        assert!(detail.resource_groups[2].is_empty());
        assert_eq!(detail.resource_groups.iter().map(Vec::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_missing_root_is_detail_not_found() {
        let err = extract("<html><body><h1>404</h1></body></html>").unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::DetailNotFound { .. })
        ));
    }

    #[test]
    fn test_labelled_value() {
        let lines = vec!["地区： 日本".to_string(), "类型:搞笑".to_string()];
        assert_eq!(labelled_value(&lines, "地区"), "日本");
        assert_eq!(labelled_value(&lines, "类型"), "搞笑");
        assert_eq!(labelled_value(&lines, "上映"), "");
    }
}
