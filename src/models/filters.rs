//! Filter vocabulary for the catalog listing.
//!
//! The facets are hand-authored from the listing page's filter bar; they are
//! not scraped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Caller's chosen values per facet key. Absent or empty means "any".
pub type FilterSelections = HashMap<String, Vec<String>>;

/// One selectable value of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub display_name: String,
    pub value: String,
}

/// A filter dimension and its allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacet {
    pub display_name: String,
    /// Query parameter name
    pub key: String,
    pub max_selectable: usize,
    pub options: Vec<FilterOption>,
}

impl FilterFacet {
    fn new(display_name: &str, key: &str, options: Vec<FilterOption>) -> Self {
        Self {
            display_name: display_name.to_string(),
            key: key.to_string(),
            max_selectable: 1,
            options,
        }
    }

    /// Whether `value` is one of this facet's options.
    pub fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// Options whose display name is also the query value.
fn same(values: &[&str]) -> Vec<FilterOption> {
    values
        .iter()
        .map(|v| FilterOption {
            display_name: v.to_string(),
            value: v.to_string(),
        })
        .collect()
}

/// Options with a distinct display name.
fn pairs(values: &[(&str, &str)]) -> Vec<FilterOption> {
    values
        .iter()
        .map(|(name, value)| FilterOption {
            display_name: name.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// Every facet the listing accepts, in query-parameter order.
pub fn filter_catalog() -> Vec<FilterFacet> {
    let letters: Vec<String> = ('A'..='Z').map(String::from).chain(["0-9".to_string()]).collect();
    let letters: Vec<&str> = letters.iter().map(String::as_str).collect();

    let years: Vec<String> = (2000..=2023).rev().map(|y| y.to_string()).collect();
    let mut years: Vec<&str> = years.iter().map(String::as_str).collect();
    years.push("2000以前");

    vec![
        FilterFacet::new("地区", "region", same(&["日本", "中国", "欧美"])),
        FilterFacet::new(
            "类型",
            "genre",
            same(&[
                "搞笑", "运动", "励志", "热血", "战斗", "竞技", "校园", "青春", "爱情", "冒险",
                "后宫", "百合", "治愈", "萝莉", "魔法", "悬疑", "推理", "奇幻", "科幻", "游戏",
                "神魔", "恐怖", "血腥", "机战", "战争", "犯罪", "历史", "社会", "职场", "剧情",
                "伪娘", "耽美", "童年", "教育", "亲子", "真人", "歌舞", "肉番", "美少女",
                "轻小说", "吸血鬼", "女性向", "泡面番", "欢乐向",
            ]),
        ),
        FilterFacet::new("字母", "letter", same(&letters)),
        FilterFacet::new("年份", "year", same(&years)),
        FilterFacet::new(
            "季度",
            "season",
            pairs(&[("1月", "1"), ("4月", "4"), ("7月", "7"), ("10月", "10")]),
        ),
        FilterFacet::new("状态", "status", same(&["连载", "完结", "未播放"])),
        FilterFacet::new(
            "排序",
            "order",
            pairs(&[("更新时间", "更新时间"), ("名称", "名称"), ("点击量", "点击量")]),
        ),
    ]
}
