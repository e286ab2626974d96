//! Log record structure

use super::attribute::{names, AttributeSet, CombinedView, Value};
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ephemeral aggregate handed to frontends
///
/// A record is produced by `open_record` and consumed by `push`. An invalid
/// record means the logger was disabled or the filter rejected it; it carries
/// no attributes and is never passed to a frontend.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    internal: AttributeSet<'a>,
    external: AttributeSet<'a>,
    valid: bool,
}

impl<'a> Record<'a> {
    pub(crate) fn new(internal: AttributeSet<'a>, external: AttributeSet<'a>) -> Self {
        Self {
            internal,
            external,
            valid: true,
        }
    }

    #[must_use]
    pub fn invalid() -> Self {
        Self {
            internal: AttributeSet::new(),
            external: AttributeSet::new(),
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Attributes generated by the logger (timestamp, ids, severity)
    pub fn internal(&self) -> &AttributeSet<'a> {
        &self.internal
    }

    /// Caller-supplied attributes followed by the scoped ones active at open time
    pub fn external(&self) -> &AttributeSet<'a> {
        &self.external
    }

    /// Internal then external attributes
    pub fn attributes(&self) -> CombinedView<'_, 'a> {
        CombinedView::of_pair(&self.internal, &self.external)
    }

    /// First attribute with this name, internal set first
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.internal.get(name).or_else(|| self.external.get(name))
    }

    pub fn message(&self) -> Option<&str> {
        self.external.get(names::MESSAGE).and_then(Value::as_str)
    }

    /// Severity attached by a severity-aware logger, if any
    pub fn severity<L: Severity>(&self) -> Option<L> {
        self.internal
            .get(names::SEVERITY)
            .and_then(Value::as_i64)
            .and_then(L::from_raw)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.internal
            .get(names::TIMESTAMP)
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_micros)
    }

    /// Detach from caller memory so the record can be queued
    #[must_use]
    pub fn into_owned(self) -> Record<'static> {
        Record {
            internal: self.internal.into_owned(),
            external: self.external.into_owned(),
            valid: self.valid,
        }
    }

    #[must_use]
    pub fn to_owned_record(&self) -> Record<'static> {
        Record {
            internal: self.internal.to_owned_set(),
            external: self.external.to_owned_set(),
            valid: self.valid,
        }
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.internal.len() + self.external.len()))?;
        for attr in self.attributes().iter() {
            map.serialize_entry(&attr.name, &attr.value)?;
        }
        map.end()
    }
}
