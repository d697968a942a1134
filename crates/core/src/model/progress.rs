use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::model::ids::UnitId;

/// Per-learner completion state, persisted on every mutation.
///
/// The wire shape is the `{ "completedUnits": [...], "updatedAt": "..." }`
/// JSON document already present in stored LMS records, so decoding is
/// deliberately lenient: entries that cannot be read as unit ids are
/// dropped, and a document that does not parse at all is treated as absent
/// by the persistence layer rather than surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressDocument {
    #[serde(rename = "completedUnits")]
    completed: BTreeSet<UnitId>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl ProgressDocument {
    /// A document with nothing completed yet.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            completed: BTreeSet::new(),
            updated_at: now,
        }
    }

    /// Best-effort decode of a persisted progress value.
    ///
    /// Returns `None` unless `value` is an object whose `completedUnits`
    /// field is an array. Array entries are coerced to unit ids where
    /// possible (integers, or strings holding integers) and dropped
    /// otherwise. A missing or unparseable `updatedAt` falls back to the
    /// Unix epoch.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let entries = value.get("completedUnits")?.as_array()?;
        let completed = entries.iter().filter_map(coerce_unit_id).collect();
        let updated_at = value
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or(DateTime::UNIX_EPOCH, |t| t.with_timezone(&Utc));
        Some(Self {
            completed,
            updated_at,
        })
    }

    /// Mark a unit completed, stamping `updated_at` with the given time.
    ///
    /// Returns false (and leaves the timestamp alone) when the unit was
    /// already complete.
    pub fn mark_completed(&mut self, id: UnitId, now: DateTime<Utc>) -> bool {
        let inserted = self.completed.insert(id);
        if inserted {
            self.updated_at = now;
        }
        inserted
    }

    #[must_use]
    pub fn is_completed(&self, id: UnitId) -> bool {
        self.completed.contains(&id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<UnitId> {
        &self.completed
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn coerce_unit_id(value: &Value) -> Option<UnitId> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
    .map(UnitId::new)
}
