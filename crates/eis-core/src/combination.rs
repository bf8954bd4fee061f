//! Test/channel index combinations: latest-entry reduction, filtering and
//! pagination for the listing view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::time::parse_iso8601_millis;

/// When a combination was last updated: an ISO-8601 string or epoch millis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdatedAt {
    Millis(f64),
    Text(String),
}

impl Default for UpdatedAt {
    fn default() -> Self {
        UpdatedAt::Text(String::new())
    }
}

impl UpdatedAt {
    /// Unix milliseconds, or None if the value cannot be read as a time.
    pub fn epoch_millis(&self) -> Option<f64> {
        match self {
            UpdatedAt::Millis(ms) if ms.is_finite() => Some(*ms),
            UpdatedAt::Millis(_) => None,
            UpdatedAt::Text(s) => parse_iso8601_millis(s).map(|ms| ms as f64),
        }
    }

    /// Strictly later than `other`. An unreadable time is never later than,
    /// nor earlier than, anything.
    pub fn is_after(&self, other: &UpdatedAt) -> bool {
        match (self.epoch_millis(), other.epoch_millis()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }
}

/// One row of the test/channel index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCombination {
    #[serde(alias = "PK")]
    pub primary_key: String,
    #[serde(alias = "SK", default)]
    pub sort_key: String,
    #[serde(alias = "GSI1PK", default)]
    pub group_primary_key: String,
    /// `testId#channelId`
    #[serde(alias = "GSI1SK")]
    pub group_sort_key: String,
    #[serde(alias = "UpdatedAt", default)]
    pub updated_at: UpdatedAt,
}

/// Identity fields extracted from a combination's group sort key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCombination {
    pub test_id: String,
    pub channel_id: String,
    pub full_key: String,
}

impl IndexCombination {
    pub fn new(group_sort_key: &str, updated_at: &str) -> Self {
        Self {
            primary_key: format!("TEST#{group_sort_key}"),
            sort_key: String::new(),
            group_primary_key: "TESTS".to_string(),
            group_sort_key: group_sort_key.to_string(),
            updated_at: UpdatedAt::Text(updated_at.to_string()),
        }
    }

    /// `(testId, channelId)`: the first two `#`-separated segments of the
    /// group sort key. A missing segment is empty.
    pub fn composite_key(&self) -> (&str, &str) {
        let mut parts = self.group_sort_key.split('#');
        let test_id = parts.next().unwrap_or_default();
        let channel_id = parts.next().unwrap_or_default();
        (test_id, channel_id)
    }

    pub fn parse(&self) -> ParsedCombination {
        let (test_id, channel_id) = self.composite_key();
        ParsedCombination {
            test_id: test_id.to_string(),
            channel_id: channel_id.to_string(),
            full_key: self.primary_key.clone(),
        }
    }
}

/// Keep the latest entry per `(testId, channelId)` and sort the survivors by
/// test id descending, then channel id descending (plain string order, so
/// `"10"` sorts before `"2"`).
///
/// Ties on `updatedAt` keep the first-seen entry.
pub fn reduce_to_latest(batch: &[IndexCombination]) -> Vec<IndexCombination> {
    let mut latest: HashMap<(&str, &str), &IndexCombination> = HashMap::new();

    for item in batch {
        latest
            .entry(item.composite_key())
            .and_modify(|best| {
                if item.updated_at.is_after(&best.updated_at) {
                    *best = item;
                }
            })
            .or_insert(item);
    }

    let mut out: Vec<IndexCombination> = latest.into_values().cloned().collect();
    out.sort_by(|a, b| {
        let (a_test, a_channel) = a.composite_key();
        let (b_test, b_channel) = b.composite_key();
        b_test.cmp(a_test).then_with(|| b_channel.cmp(a_channel))
    });
    out
}

/// Substring filters on the primary key. Empty filters match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinationFilter {
    pub test_id: Option<String>,
    pub channel_id: Option<String>,
}

impl CombinationFilter {
    pub fn is_empty(&self) -> bool {
        let blank = |f: &Option<String>| f.as_deref().is_none_or(str::is_empty);
        blank(&self.test_id) && blank(&self.channel_id)
    }

    pub fn matches(&self, item: &IndexCombination) -> bool {
        [&self.test_id, &self.channel_id]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .filter(|f| !f.is_empty())
            .all(|f| item.primary_key.contains(f))
    }

    pub fn apply(&self, batch: &[IndexCombination]) -> Vec<IndexCombination> {
        batch.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first item on this page (0 if the page is empty).
    pub first_index: usize,
    /// 1-based index of the last item on this page (0 if the page is empty).
    pub last_index: usize,
}

/// Slice `items` into 1-based pages of `per_page`. Page 0 is treated as
/// page 1; a page past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);
    let slice = &items[start..end];

    Page {
        items: slice.to_vec(),
        page,
        total_pages,
        total_items,
        first_index: if slice.is_empty() { 0 } else { start + 1 },
        last_index: if slice.is_empty() { 0 } else { end },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(items: &[IndexCombination]) -> Vec<&str> {
        items.iter().map(|c| c.group_sort_key.as_str()).collect()
    }

    #[test]
    fn test_parse_group_sort_key() {
        let c = IndexCombination::new("7#3", "2024-01-01");
        assert_eq!(
            c.parse(),
            ParsedCombination {
                test_id: "7".to_string(),
                channel_id: "3".to_string(),
                full_key: "TEST#7#3".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_missing_channel() {
        let c = IndexCombination::new("7", "2024-01-01");
        assert_eq!(c.composite_key(), ("7", ""));
    }

    #[test]
    fn test_latest_wins() {
        let batch = vec![
            IndexCombination::new("7#3", "2024-01-01"),
            IndexCombination::new("7#3", "2024-02-01"),
        ];
        let out = reduce_to_latest(&batch);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].updated_at, UpdatedAt::Text("2024-02-01".to_string()));
    }

    #[test]
    fn test_latest_independent_of_order() {
        let batch = vec![
            IndexCombination::new("7#3", "2024-02-01"),
            IndexCombination::new("7#3", "2024-01-01"),
        ];
        let out = reduce_to_latest(&batch);
        assert_eq!(out[0].updated_at, UpdatedAt::Text("2024-02-01".to_string()));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let mut first = IndexCombination::new("1#1", "2024-05-05");
        first.sort_key = "first".to_string();
        let mut second = IndexCombination::new("1#1", "2024-05-05");
        second.sort_key = "second".to_string();
        let out = reduce_to_latest(&[first, second]);
        assert_eq!(out[0].sort_key, "first");
    }

    #[test]
    fn test_unparseable_never_wins() {
        let good = IndexCombination::new("1#1", "2024-05-05");
        let bad = IndexCombination::new("1#1", "not a date");
        assert_eq!(reduce_to_latest(&[good.clone(), bad.clone()])[0], good);
        // and an unreadable first entry is never displaced either
        assert_eq!(reduce_to_latest(&[bad.clone(), good])[0], bad);
    }

    #[test]
    fn test_millis_and_text_compare() {
        let text = IndexCombination::new("1#1", "2024-01-01T00:00:00Z");
        let mut millis = IndexCombination::new("1#1", "");
        millis.updated_at = UpdatedAt::Millis(1_704_067_200_001.0);
        assert_eq!(reduce_to_latest(&[text, millis.clone()])[0], millis);
    }

    #[test]
    fn test_sort_descending_string_order() {
        let batch = vec![
            IndexCombination::new("2#1", "2024-01-01"),
            IndexCombination::new("10#1", "2024-01-01"),
            IndexCombination::new("2#9", "2024-01-01"),
            IndexCombination::new("2#10", "2024-01-01"),
        ];
        assert_eq!(
            keys(&reduce_to_latest(&batch)),
            vec!["2#9", "2#10", "2#1", "10#1"]
        );
    }

    #[test]
    fn test_empty_batch() {
        assert!(reduce_to_latest(&[]).is_empty());
    }

    #[test]
    fn test_deserialize_table_names() {
        let c: IndexCombination = serde_json::from_value(json!({
            "PK": "TEST#7#CHANNEL#3",
            "SK": "META",
            "GSI1PK": "TESTS",
            "GSI1SK": "7#3",
            "UpdatedAt": 1_700_000_000_000u64
        }))
        .unwrap();
        assert_eq!(c.composite_key(), ("7", "3"));
        assert_eq!(c.updated_at, UpdatedAt::Millis(1_700_000_000_000.0));
    }

    #[test]
    fn test_deserialize_missing_updated_at() {
        let c: IndexCombination =
            serde_json::from_value(json!({"primaryKey": "TEST#1", "groupSortKey": "1#2"}))
                .unwrap();
        assert_eq!(c.updated_at.epoch_millis(), None);
    }

    #[test]
    fn test_filter_substring_on_primary_key() {
        let batch = vec![
            IndexCombination::new("17#3", "2024-01-01"),
            IndexCombination::new("7#4", "2024-01-01"),
            IndexCombination::new("8#3", "2024-01-01"),
        ];
        let filter = CombinationFilter {
            test_id: Some("7".to_string()),
            channel_id: Some("3".to_string()),
        };
        assert_eq!(keys(&filter.apply(&batch)), vec!["17#3"]);

        let blank = CombinationFilter {
            test_id: Some(String::new()),
            channel_id: None,
        };
        assert!(blank.is_empty());
        assert_eq!(blank.apply(&batch).len(), 3);
    }

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<usize> = (1..=65).collect();
        let page = paginate(&items, 2, 30);
        assert_eq!(page.items.first(), Some(&31));
        assert_eq!(page.items.last(), Some(&60));
        assert_eq!(page.total_pages, 3);
        assert_eq!((page.first_index, page.last_index), (31, 60));
    }

    #[test]
    fn test_paginate_last_partial_and_out_of_range() {
        let items: Vec<usize> = (1..=65).collect();
        let last = paginate(&items, 3, 30);
        assert_eq!(last.items.len(), 5);
        assert_eq!((last.first_index, last.last_index), (61, 65));

        let past = paginate(&items, 9, 30);
        assert!(past.items.is_empty());
        assert_eq!((past.first_index, past.last_index), (0, 0));
        assert_eq!(past.total_items, 65);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u8>(&[], 1, 30);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
