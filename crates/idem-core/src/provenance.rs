//! Element provenance: who created a piece of user data, and when
//!
//! Every element embeds a [`Provenance`] by value. `created_by` and
//! `created_ts` are write-once; `modified_ts` is the freely-updatable marker
//! the persistence collaborator compares for optimistic concurrency.

use chrono::{DateTime, Utc};

use crate::error::ElementError;
use crate::record::{self, Record};

/// A creation or verification instant supplied by a caller.
///
/// Callers that do not care about the exact instant pass [`Timestamp::Now`];
/// replay and import paths pass [`Timestamp::At`] with the stored instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Resolve to the current instant when applied.
    Now,
    /// Use the given instant as-is.
    At(DateTime<Utc>),
}

impl Timestamp {
    /// Resolve to a concrete instant.
    #[must_use]
    pub fn resolve(self) -> DateTime<Utc> {
        match self {
            Timestamp::Now => Utc::now(),
            Timestamp::At(ts) => ts,
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Now
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(ts: DateTime<Utc>) -> Self {
        Timestamp::At(ts)
    }
}

/// Creation metadata embedded by value in every element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    created_by: Option<String>,
    created_ts: DateTime<Utc>,
    modified_ts: DateTime<Utc>,
}

impl Provenance {
    /// Create provenance for a new element.
    ///
    /// `modified_ts` starts equal to the resolved creation instant.
    #[must_use]
    pub fn new(created_by: Option<String>, created_ts: Timestamp) -> Self {
        let created_ts = created_ts.resolve();
        Provenance {
            created_by,
            created_ts,
            modified_ts: created_ts,
        }
    }

    /// Application or process that created the element, when recorded.
    #[must_use]
    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Instant the element was created.
    #[must_use]
    pub fn created_ts(&self) -> DateTime<Utc> {
        self.created_ts
    }

    /// Instant of the last mutation, for stale-copy detection on save.
    #[must_use]
    pub fn modified_ts(&self) -> DateTime<Utc> {
        self.modified_ts
    }

    /// Stamp `modified_ts` with the current instant.
    pub fn touch(&mut self) {
        self.modified_ts = Utc::now();
    }

    /// Record who created the element.
    ///
    /// Write-once: a value may be stored exactly once. `None` is accepted
    /// and ignored, whether or not a value is stored.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a value is already stored and `value` is non-null,
    /// even when the two are equal.
    pub fn set_created_by(&mut self, value: Option<String>) -> Result<(), ElementError> {
        let Some(value) = value else {
            return Ok(());
        };
        if self.created_by.is_some() {
            return Err(ElementError::InvalidValue {
                field: "created_by",
                reason: "write-once field is already set".to_owned(),
            });
        }
        self.created_by = Some(value);
        Ok(())
    }

    /// Record when the element was created.
    ///
    /// `created_ts` is stored at construction, so any non-null assignment is
    /// refused. `None` is accepted and ignored, keeping the surface uniform
    /// with [`Provenance::set_created_by`].
    ///
    /// # Errors
    ///
    /// `InvalidValue` for any non-null `value`.
    pub fn set_created_ts(&mut self, value: Option<Timestamp>) -> Result<(), ElementError> {
        if value.is_none() {
            return Ok(());
        }
        Err(ElementError::InvalidValue {
            field: "created_ts",
            reason: "write-once field is already set".to_owned(),
        })
    }

    /// Read provenance fields out of `record`.
    ///
    /// An absent `created_ts` resolves to the current instant; an absent
    /// `modified_ts` starts equal to `created_ts`.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a present field has the wrong type or does not
    /// parse.
    pub fn take(record: &mut Record) -> Result<Self, ElementError> {
        let created_by = record::take_opt_string(record, "created_by")?;
        let created_ts =
            record::take_opt_datetime(record, "created_ts")?.unwrap_or_else(Utc::now);
        let modified_ts =
            record::take_opt_datetime(record, "modified_ts")?.unwrap_or(created_ts);
        Ok(Provenance {
            created_by,
            created_ts,
            modified_ts,
        })
    }

    /// Read provenance fields out of `record`, requiring `created_ts`.
    ///
    /// Audit-style elements use this: their creation instant is part of the
    /// record of what the user agreed to, and may not be invented.
    ///
    /// # Errors
    ///
    /// `MissingField` if `created_ts` is absent, plus anything
    /// [`Provenance::take`] reports.
    pub fn take_required(record: &mut Record, element: &'static str) -> Result<Self, ElementError> {
        let created_by = record::take_opt_string(record, "created_by")?;
        let created_ts = record::take_datetime(record, element, "created_ts")?;
        let modified_ts =
            record::take_opt_datetime(record, "modified_ts")?.unwrap_or(created_ts);
        Ok(Provenance {
            created_by,
            created_ts,
            modified_ts,
        })
    }

    /// Write provenance fields into `record`.
    pub fn write(&self, record: &mut Record) {
        record::put_opt_string(record, "created_by", self.created_by());
        record::put_datetime(record, "created_ts", self.created_ts);
        record::put_datetime(record, "modified_ts", self.modified_ts);
    }
}
