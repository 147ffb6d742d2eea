//! Storage layout of a counter.
//!
//! Every persisted counter occupies four keys:
//! - `block_<id>`: JSON `{id, title, date, formattedDate}`, the authoritative copy
//! - `<id>_userInputDate`: ISO-8601 instant
//! - `<id>_titleInput`: raw title
//! - `<id>_formattedDate`: display date
//!
//! The three shadow keys are only read when the blob is missing or unusable.

use crate::dates::{parse_date_input, to_iso_string};
use crate::errors::StoreError;
use crate::models::{CounterId, CounterRecord};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const BLOCK_PREFIX: &str = "block_";
const DATE_SUFFIX: &str = "_userInputDate";
const TITLE_SUFFIX: &str = "_titleInput";
const FORMATTED_SUFFIX: &str = "_formattedDate";

#[derive(Debug, Serialize)]
struct BlockOut<'a> {
    id: &'a str,
    title: &'a str,
    date: String,
    #[serde(rename = "formattedDate")]
    formatted_date: &'a str,
}

// Older pages wrote numeric ids and `null` for dates that failed to parse.
#[derive(Debug, Deserialize)]
struct BlockIn {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

pub fn blob_key(id: &CounterId) -> String {
    format!("{BLOCK_PREFIX}{id}")
}

pub fn date_key(id: &CounterId) -> String {
    format!("{id}{DATE_SUFFIX}")
}

pub fn title_key(id: &CounterId) -> String {
    format!("{id}{TITLE_SUFFIX}")
}

pub fn formatted_key(id: &CounterId) -> String {
    format!("{id}{FORMATTED_SUFFIX}")
}

/// Key/value writes for `record`, shadow keys first and blob last.
/// `None` when the record has no valid target instant.
pub fn encode(record: &CounterRecord) -> Option<Vec<(String, String)>> {
    let target = record.target_instant()?;
    let formatted = record.formatted_date()?;
    let iso = to_iso_string(target);
    let id = record.id();

    let blob = BlockOut {
        id: id.as_str(),
        title: record.title(),
        date: iso.clone(),
        formatted_date: formatted,
    };
    // Serializing plain strings cannot fail.
    let blob = serde_json::to_string(&blob).ok()?;

    Some(vec![
        (date_key(id), iso),
        (title_key(id), record.title().to_string()),
        (formatted_key(id), formatted.to_string()),
        (blob_key(id), blob),
    ])
}

/// Writes `record` through to the store. Returns `false` without touching the
/// store when the record is not persistable.
pub fn write<S: KeyValueStore + ?Sized>(record: &CounterRecord, store: &mut S) -> Result<bool, StoreError> {
    let Some(writes) = encode(record) else {
        debug!(id = %record.id(), "skipping write of counter without valid date");
        return Ok(false);
    };
    for (key, value) in writes {
        store.set(&key, &value)?;
    }
    Ok(true)
}

/// Rebuilds a counter from the store: blob first, shadow keys second.
/// Returns `None` when neither yields a title and a valid date.
pub fn decode<S: KeyValueStore + ?Sized>(id: &CounterId, store: &S) -> Option<CounterRecord> {
    if let Some(record) = decode_blob(id, store) {
        return Some(record);
    }

    let record = decode_shadow(id, store);
    match &record {
        Some(_) => warn!(id = %id, "recovered counter from shadow keys"),
        None => warn!(id = %id, "counter could not be decoded"),
    }
    record
}

fn decode_blob<S: KeyValueStore + ?Sized>(id: &CounterId, store: &S) -> Option<CounterRecord> {
    let key = blob_key(id);
    let raw = store.get(&key)?;

    let block: BlockIn = match serde_json::from_str(&raw) {
        Ok(block) => block,
        Err(err) => {
            warn!(key = %key, "failed to parse stored block: {err}");
            return None;
        }
    };

    if let Some(stored_id) = &block.id {
        let matches = match stored_id {
            serde_json::Value::String(s) => s == id.as_str(),
            serde_json::Value::Number(n) => n.to_string() == id.as_str(),
            _ => false,
        };
        if !matches {
            debug!(key = %key, stored_id = %stored_id, "block id differs from key, using key");
        }
    }

    let Some(title) = block.title else {
        warn!(key = %key, "stored block has no title");
        return None;
    };
    let Some(target) = block.date.as_deref().and_then(parse_date_input) else {
        warn!(key = %key, "stored block has no valid date");
        return None;
    };

    Some(CounterRecord::new(id.clone(), title, Some(target)))
}

fn decode_shadow<S: KeyValueStore + ?Sized>(id: &CounterId, store: &S) -> Option<CounterRecord> {
    let date = store.get(&date_key(id))?;
    let title = store.get(&title_key(id)).filter(|title| !title.is_empty())?;
    let target = parse_date_input(&date)?;
    Some(CounterRecord::new(id.clone(), title, Some(target)))
}

/// Deletes the blob and all shadow keys. Removing an unknown id is a no-op.
pub fn remove<S: KeyValueStore + ?Sized>(id: &CounterId, store: &mut S) -> Result<(), StoreError> {
    store.remove(&date_key(id))?;
    store.remove(&title_key(id))?;
    store.remove(&formatted_key(id))?;
    store.remove(&blob_key(id))?;
    Ok(())
}

/// Ids of every `block_` key, in store enumeration order.
pub fn list_ids<S: KeyValueStore + ?Sized>(store: &S) -> Vec<CounterId> {
    store
        .keys()
        .into_iter()
        .filter_map(|key| {
            key.strip_prefix(BLOCK_PREFIX)
                .filter(|id| !id.is_empty())
                .map(CounterId::new)
        })
        .collect()
}
