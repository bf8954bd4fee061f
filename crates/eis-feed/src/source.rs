//! Record batches as handed over by the remote query layer.
//!
//! A batch file holds one of:
//! - a bare JSON array of records,
//! - a single query page `{ "Items": [...], "LastEvaluatedKey": ... }`,
//! - a stream of concatenated pages. Pages are followed until one arrives
//!   without a `LastEvaluatedKey`, the way a paged query is drained.

use std::fs;
use std::path::Path;

use eis_core::IndexCombination;
use serde_json::Value;

use crate::error::{FeedError, Result};

const ITEMS: &[&str] = &["Items", "items"];
const CONTINUATION: &[&str] = &["LastEvaluatedKey", "lastEvaluatedKey"];

/// Read and parse a batch file.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| FeedError::Io(path.to_path_buf(), e))?;
    let records = parse_records(&content)?;
    tracing::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse batch content. Empty input is an empty batch.
pub fn parse_records(content: &str) -> Result<Vec<Value>> {
    let values = serde_json::Deserializer::from_str(content)
        .into_iter::<Value>()
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    match values.as_slice() {
        [] => Ok(Vec::new()),
        [Value::Array(records)] => Ok(records.clone()),
        _ => drain_pages(values),
    }
}

fn field<'a>(page: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| page.get(*name))
        .filter(|v| !v.is_null())
}

fn drain_pages(pages: Vec<Value>) -> Result<Vec<Value>> {
    let total = pages.len();
    let mut records = Vec::new();

    for (i, page) in pages.into_iter().enumerate() {
        if !page.is_object() {
            return Err(FeedError::InvalidData(format!(
                "page {i} is not an object"
            )));
        }
        match field(&page, ITEMS) {
            Some(Value::Array(items)) => records.extend(items.iter().cloned()),
            Some(_) => {
                return Err(FeedError::InvalidData(format!(
                    "page {i}: Items is not an array"
                )));
            }
            None => tracing::debug!("page {i} has no Items"),
        }

        if field(&page, CONTINUATION).is_none() {
            if i + 1 < total {
                tracing::warn!(
                    "ignoring {} page(s) after final page {i}",
                    total - i - 1
                );
            }
            return Ok(records);
        }
    }

    Err(FeedError::InvalidData(
        "query stream ended with a pending LastEvaluatedKey".to_string(),
    ))
}

/// Decode combination records, skipping (and logging) malformed ones.
pub fn decode_combinations(records: &[Value]) -> Vec<IndexCombination> {
    records
        .iter()
        .enumerate()
        .filter_map(
            |(i, record)| match serde_json::from_value::<IndexCombination>(record.clone()) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!("skipping combination record {i}: {e}");
                    None
                }
            },
        )
        .collect()
}
