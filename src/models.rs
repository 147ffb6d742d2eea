use crate::dates::{format_display_date, parse_date_input, truncate_to_millis};
use crate::time_math::Elapsed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque counter identifier. Doubles as the storage key suffix, never as a
/// view element id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterId(String);

impl CounterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One "time since" counter.
///
/// `formatted_date` is derived from `target_instant` and only changes with it;
/// fields are private so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    id: CounterId,
    title: String,
    target_instant: Option<DateTime<Utc>>,
    formatted_date: Option<String>,
}

impl CounterRecord {
    pub fn new(id: CounterId, title: impl Into<String>, target_instant: Option<DateTime<Utc>>) -> Self {
        let mut record = Self {
            id,
            title: title.into(),
            target_instant: None,
            formatted_date: None,
        };
        record.set_target_instant(target_instant);
        record
    }

    pub fn id(&self) -> &CounterId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target_instant(&self) -> Option<DateTime<Utc>> {
        self.target_instant
    }

    pub fn formatted_date(&self) -> Option<&str> {
        self.formatted_date.as_deref()
    }

    /// Only records with a valid target instant are written to the store.
    pub fn is_persistable(&self) -> bool {
        self.target_instant.is_some()
    }

    pub(crate) fn apply(&mut self, patch: CounterPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(target) = patch.target_instant {
            self.set_target_instant(target);
        }
    }

    fn set_target_instant(&mut self, target: Option<DateTime<Utc>>) {
        self.target_instant = target.and_then(truncate_to_millis);
        self.formatted_date = self.target_instant.map(format_display_date);
    }
}

/// Partial update. `target_instant: Some(None)` means the user entered a date
/// that did not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPatch {
    pub title: Option<String>,
    pub target_instant: Option<Option<DateTime<Utc>>>,
}

impl CounterPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn target_instant(mut self, target: Option<DateTime<Utc>>) -> Self {
        self.target_instant = Some(target);
        self
    }

    /// Both fields as currently shown in the view; an unparsable date becomes
    /// an invalid target.
    pub fn from_fields(fields: &FieldValues) -> Self {
        Self {
            title: Some(fields.title.clone()),
            target_instant: Some(parse_date_input(&fields.date)),
        }
    }
}

/// Raw input values of one counter card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
}

/// What the page shows for one counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterView {
    pub id: CounterId,
    pub title: String,
    pub date: Option<String>,
    pub input_value: Option<String>,
    pub formatted_date: Option<String>,
    pub elapsed: Option<Elapsed>,
    pub message: Option<String>,
}
