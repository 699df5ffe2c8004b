// src/services/schedule.rs

//! Weekly schedule extraction.

use url::Url;

use crate::document::{Document, Node};
use crate::error::{ExtractionError, Result};
use crate::models::{CleaningConfig, Schedule, ScheduleEntry, ScheduleSelectors};

/// Maps the homepage schedule block into seven day buckets.
pub struct ScheduleExtractor<'c> {
    selectors: &'c ScheduleSelectors,
    cleaning: &'c CleaningConfig,
}

impl<'c> ScheduleExtractor<'c> {
    pub fn new(selectors: &'c ScheduleSelectors, cleaning: &'c CleaningConfig) -> Self {
        Self {
            selectors,
            cleaning,
        }
    }

    /// Extract the schedule. Fewer than seven day containers is an error.
    pub fn extract(&self, document: &Document, base_url: &Url) -> Result<Schedule> {
        let containers = document.query(&self.selectors.day_container)?;
        if containers.len() < 7 {
            return Err(ExtractionError::ScheduleShapeMismatch {
                found: containers.len(),
            }
            .into());
        }
        if containers.len() > 7 {
            log::debug!(
                "Schedule has {} day containers, using the first 7",
                containers.len()
            );
        }

        let mut days: [Vec<ScheduleEntry>; 7] = Default::default();
        for (day, container) in days.iter_mut().zip(&containers) {
            for item in container.query(&self.selectors.entry)? {
                if let Some(entry) = self.parse_entry(&item, base_url)? {
                    day.push(entry);
                }
            }
        }

        let schedule = Schedule::from_days(days);
        log::debug!("Extracted {} schedule entries", schedule.entry_count());
        Ok(schedule)
    }

    fn parse_entry(&self, item: &Node<'_>, base_url: &Url) -> Result<Option<ScheduleEntry>> {
        let anchors = item.query(&self.selectors.anchor)?;
        let [status_anchor, title_anchor, ..] = anchors.as_slice() else {
            log::debug!("Skipping schedule entry with {} anchors", anchors.len());
            return Ok(None);
        };

        let (status_text, is_currently_updating) =
            self.cleaning.clean_status(&status_anchor.text());

        Ok(Some(ScheduleEntry {
            title: title_anchor.text(),
            detail_url: title_anchor.resolved_href(base_url).unwrap_or_default(),
            status_text,
            is_currently_updating,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    use crate::error::AppError;

    fn day(entries: &[(&str, &str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(status, title, href)| {
                format!(r#"<li><a href="{href}">{status}</a><a href="{href}">{title}</a></li>"#)
            })
            .collect();
        format!("<ul>{items}</ul>")
    }

    fn page(days: &[String]) -> String {
        format!(
            r#"<html><body><div class="area"><div class="side r"><div class="bg">
               <div class="tlist">{}</div></div></div></div></body></html>"#,
            days.concat()
        )
    }

    fn extract(html: &str) -> Result<Schedule> {
        let selectors = ScheduleSelectors::default();
        let cleaning = CleaningConfig::default();
        let base = Url::parse("https://www.yhdmz.org").unwrap();
        ScheduleExtractor::new(&selectors, &cleaning).extract(&Document::parse_str(html), &base)
    }

    #[test]
    fn test_seven_days_in_order() {
        let mut days: Vec<String> = (0..7).map(|_| day(&[])).collect();
        days[0] = day(&[
            ("第5集new", "葬送的芙莉莲", "/showp/1.html"),
            ("第12集", "间谍过家家", "/showp/2.html"),
        ]);
        days[6] = day(&[("new 第3集", "药屋少女", "/showp/3.html")]);

        let schedule = extract(&page(&days)).unwrap();

        let monday = schedule.day(Weekday::Mon);
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].title, "葬送的芙莉莲");
        assert_eq!(monday[0].status_text, "第5集");
        assert!(monday[0].is_currently_updating);
        assert_eq!(monday[0].detail_url, "https://www.yhdmz.org/showp/1.html");
        assert_eq!(monday[1].title, "间谍过家家");
        assert!(!monday[1].is_currently_updating);

        let sunday = schedule.day(Weekday::Sun);
        assert_eq!(sunday[0].status_text, "第3集");
        assert!(sunday[0].is_currently_updating);

        for weekday in [Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat] {
            assert!(schedule.day(weekday).is_empty());
        }
    }

    #[test]
    fn test_fewer_than_seven_containers_fails() {
        let days: Vec<String> = (0..5).map(|_| day(&[])).collect();
        let err = extract(&page(&days)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::ScheduleShapeMismatch { found: 5 })
        ));
    }

    #[test]
    fn test_missing_block_fails() {
        let err = extract("<html><body><p>maintenance</p></body></html>").unwrap_err();
        assert_eq!(
            err.extraction(),
            Some(&ExtractionError::ScheduleShapeMismatch { found: 0 })
        );
    }

    #[test]
    fn test_entry_with_one_anchor_is_skipped() {
        let mut days: Vec<String> = (0..7).map(|_| day(&[])).collect();
        days[2] = format!(
            "<ul><li><a>broken</a></li>{}</ul>",
            r#"<li><a href="/showp/9.html">完结</a><a href="/showp/9.html">孤独摇滚</a></li>"#
        );
        let schedule = extract(&page(&days)).unwrap();
        let wednesday = schedule.day(Weekday::Wed);
        assert_eq!(wednesday.len(), 1);
        assert_eq!(wednesday[0].title, "孤独摇滚");
    }
}
