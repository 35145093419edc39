//! Terms-of-use acceptance events
//!
//! Acceptances form an audit trail: every event carries a mandatory creation
//! timestamp and a unique [`EventId`], and the list is append-only. Replaying
//! an event that is already present byte-for-byte is a no-op, so syncing the
//! same acceptance from two sessions cannot fail.

use chrono::{DateTime, Utc};
use idem_core::record::{self, Record};
use idem_core::{Element, ElementError, EventId, EventList, Provenance, Timestamp};

/// One acceptance of a terms-of-use version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToUEvent {
    event_id: EventId,
    version: String,
    provenance: Provenance,
}

impl ToUEvent {
    /// Record an acceptance happening now, on behalf of `created_by`.
    #[must_use]
    pub fn new(version: &str, created_by: &str) -> Self {
        ToUEvent {
            event_id: EventId::new(),
            version: version.to_owned(),
            provenance: Provenance::new(Some(created_by.to_owned()), Timestamp::Now),
        }
    }

    /// Record an acceptance that happened at a known time.
    #[must_use]
    pub fn at(version: &str, created_by: &str, created_ts: DateTime<Utc>) -> Self {
        ToUEvent {
            event_id: EventId::new(),
            version: version.to_owned(),
            provenance: Provenance::new(Some(created_by.to_owned()), Timestamp::At(created_ts)),
        }
    }

    /// Replace the generated event id, for replays and tests.
    #[must_use]
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// The accepted terms-of-use version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    fn take(mut record: Record) -> Result<Self, ElementError> {
        let event_id = record::take_string(&mut record, "ToUEvent", "event_id")?;
        let event_id = EventId::parse(&event_id)?;
        let version = record::take_string(&mut record, "ToUEvent", "version")?;
        let provenance = Provenance::take_required(&mut record, "ToUEvent")?;
        record::finish(&record, "ToUEvent")?;
        Ok(ToUEvent {
            event_id,
            version,
            provenance,
        })
    }

    fn write(&self, record: &mut Record) {
        record.insert(
            "event_id".to_owned(),
            serde_json::Value::String(self.event_id.to_string()),
        );
        record.insert(
            "version".to_owned(),
            serde_json::Value::String(self.version.clone()),
        );
        self.provenance.write(record);
    }
}

impl Element for ToUEvent {
    type Key = EventId;
    const NAME: &'static str = "ToUEvent";

    fn key(&self) -> EventId {
        self.event_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(
            "event_type".to_owned(),
            serde_json::Value::String("tou_event".to_owned()),
        );
        self.write(&mut record);
        record
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        // Early acceptance records predate the event_type tag.
        let kind = record::take_string_or(&mut record, "event_type", "tou_event")?;
        if kind != "tou_event" {
            return Err(ElementError::InvalidValue {
                field: "event_type",
                reason: format!("expected \"tou_event\", got {kind:?}"),
            });
        }
        ToUEvent::take(record)
    }
}

/// The terms-of-use acceptances of one user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToUList {
    inner: EventList<ToUEvent>,
}

impl ToUList {
    /// Build a list from existing acceptances; conflicting ids are rejected.
    ///
    /// # Errors
    ///
    /// `Duplicate` if two differing inputs share an event id.
    pub fn new(events: Vec<ToUEvent>) -> Result<Self, ElementError> {
        Ok(ToUList {
            inner: EventList::new(events)?,
        })
    }

    /// Whether any recorded acceptance covers `version`.
    #[must_use]
    pub fn has_accepted(&self, version: &str) -> bool {
        self.inner.iter().any(|event| event.version() == version)
    }

    /// Record an acceptance. Replaying an identical event is a no-op.
    ///
    /// # Errors
    ///
    /// `Duplicate` if a differing event with the same id is present.
    pub fn add(&mut self, event: ToUEvent) -> Result<&mut Self, ElementError> {
        self.inner.add(event)?;
        Ok(self)
    }

    /// Look up an acceptance by event id.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one event shares the id.
    pub fn find(&self, key: &EventId) -> Result<Option<&ToUEvent>, ElementError> {
        self.inner.find(key)
    }

    /// Number of recorded acceptances.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Whether no acceptance has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the acceptances in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, ToUEvent> {
        self.inner.iter()
    }

    /// Serialize every acceptance, in recording order.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.inner.to_records()
    }

    /// Reconstruct a list from a sequence of records.
    ///
    /// # Errors
    ///
    /// Decoding errors in input order, then `Duplicate` for conflicting ids.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        Ok(ToUList {
            inner: EventList::from_records(records)?,
        })
    }
}

impl<'a> IntoIterator for &'a ToUList {
    type Item = &'a ToUEvent;
    type IntoIter = std::slice::Iter<'a, ToUEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Any event recorded on a user, decoded by its `event_type` tag.
///
/// Terms-of-use acceptance is the only kind today; adding a kind means
/// adding a variant and an arm to each match below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// A terms-of-use acceptance.
    Tou(ToUEvent),
}

impl Element for UserEvent {
    type Key = EventId;
    const NAME: &'static str = "UserEvent";

    fn key(&self) -> EventId {
        match self {
            UserEvent::Tou(event) => event.key(),
        }
    }

    fn provenance(&self) -> &Provenance {
        match self {
            UserEvent::Tou(event) => event.provenance(),
        }
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        match self {
            UserEvent::Tou(event) => event.provenance_mut(),
        }
    }

    fn to_record(&self) -> Record {
        match self {
            UserEvent::Tou(event) => event.to_record(),
        }
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        let kind = record::take_string_or(&mut record, "event_type", "tou_event")?;
        match kind.as_str() {
            "tou_event" => ToUEvent::take(record).map(UserEvent::Tou),
            other => Err(ElementError::InvalidValue {
                field: "event_type",
                reason: format!("unrecognized event kind {other:?}"),
            }),
        }
    }
}

/// Mixed events of one user, in recording order.
pub type UserEventList = EventList<UserEvent>;
