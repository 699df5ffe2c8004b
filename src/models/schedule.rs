//! Weekly schedule data structures.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One title airing on a given weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub title: String,
    /// Absolute URL of the item's detail page
    pub detail_url: String,
    /// Raw status text with the update marker removed
    pub status_text: String,
    pub is_currently_updating: bool,
}

/// Seven day buckets, Monday first. Every key is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub monday: Vec<ScheduleEntry>,
    pub tuesday: Vec<ScheduleEntry>,
    pub wednesday: Vec<ScheduleEntry>,
    pub thursday: Vec<ScheduleEntry>,
    pub friday: Vec<ScheduleEntry>,
    pub saturday: Vec<ScheduleEntry>,
    pub sunday: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build from exactly seven buckets in Monday-first order.
    pub fn from_days(days: [Vec<ScheduleEntry>; 7]) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = days;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }

    /// Entries for one weekday.
    pub fn day(&self, weekday: Weekday) -> &[ScheduleEntry] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// All days in fixed Monday-first order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[ScheduleEntry])> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .map(move |d| (d, self.day(d)))
    }

    /// Total entries across the week.
    pub fn entry_count(&self) -> usize {
        self.iter().map(|(_, entries)| entries.len()).sum()
    }
}
