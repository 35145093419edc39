//! Append-only event collections with replay-safe ingestion
//!
//! Audit-style elements (consent acceptances and their kin) are collected in
//! an [`EventList`]. Upstream ingestion may re-deliver the same event, so a
//! same-key `add` whose serialized content is identical to the stored one is
//! a silent no-op; a same-key `add` with differing content is a hard
//! duplicate error. There is no removal: the list is an audit trail.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::element::Element;
use crate::error::ElementError;
use crate::list::ElementList;
use crate::record::Record;

/// Unique identifier of an audit event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        EventId(Uuid::new_v4())
    }

    /// Parse an identifier from its canonical string form.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if `raw` is not a valid UUID.
    pub fn parse(raw: &str) -> Result<Self, ElementError> {
        Uuid::parse_str(raw)
            .map(EventId)
            .map_err(|err| ElementError::InvalidValue {
                field: "event_id",
                reason: format!("not a valid UUID: {err}"),
            })
    }
}

impl Default for EventId {
    fn default() -> Self {
        EventId::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        EventId(id)
    }
}

/// An append-only, replay-tolerant collection of one concrete event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventList<T> {
    inner: ElementList<T>,
}

impl<T: Element> EventList<T> {
    /// Build a list from existing events. Input goes through
    /// [`EventList::add`], so replayed duplicates collapse and conflicting
    /// duplicates are rejected.
    ///
    /// # Errors
    ///
    /// `Duplicate` for a same-key event with differing content.
    pub fn new(events: Vec<T>) -> Result<Self, ElementError> {
        let mut list = EventList {
            inner: ElementList::default(),
        };
        for event in events {
            list.add(event)?;
        }
        Ok(list)
    }

    /// Append an event.
    ///
    /// A same-key event whose serialized content is identical to the stored
    /// one is accepted silently without growing the list, so upstream
    /// retries can re-submit an event without special-casing. Differing
    /// content under the same key is a conflict.
    ///
    /// # Errors
    ///
    /// `Duplicate` for a same-key event with differing content.
    pub fn add(&mut self, event: T) -> Result<&mut Self, ElementError> {
        if let Some(existing) = self.inner.find(&event.key())? {
            if existing.to_record() == event.to_record() {
                debug!("Ignoring replay of event {}", event.key());
                return Ok(self);
            }
            return Err(ElementError::Duplicate {
                key: event.key().to_string(),
            });
        }
        self.inner.add(event);
        Ok(self)
    }

    /// Look up an event by key.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one event shares the key.
    pub fn find(&self, key: &T::Key) -> Result<Option<&T>, ElementError> {
        self.inner.find(key)
    }

    /// Number of events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Whether the list holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the events in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }

    /// The events as a slice, in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[T] {
        self.inner.elements()
    }

    /// Serialize every event, in insertion order.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.inner.to_records()
    }

    /// Reconstruct a list from a sequence of records, with the same replay
    /// tolerance as [`EventList::add`].
    ///
    /// # Errors
    ///
    /// Decoding errors in input order, then `Duplicate` for conflicting
    /// same-key events.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        let events = records
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        EventList::new(events)
    }
}

impl<T: Element> Default for EventList<T> {
    fn default() -> Self {
        EventList {
            inner: ElementList::default(),
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a EventList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
