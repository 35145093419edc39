//! Verification and primary-selection state embedded in elements
//!
//! [`VerificationState`] records whether an element's value was confirmed by
//! an out-of-band proofing process, and by whom. [`PrimaryState`] adds the
//! primary flag and owns the per-instance rule that a primary element must
//! stay verified; the collection-wide rule lives in
//! [`crate::primary_list::PrimaryElementList`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ElementError, PrimaryViolation};
use crate::provenance::Timestamp;
use crate::record::{self, Record};

/// Whether, when, and by what process an element was verified.
///
/// Unlike creation provenance, the verifier fields are updatable: a
/// re-verification overwrites the previous proofing trail. `None` input is
/// still a no-op and never clears a stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationState {
    verified: bool,
    verified_by: Option<String>,
    verified_ts: Option<DateTime<Utc>>,
}

impl VerificationState {
    /// Assemble verification state from explicit fields.
    #[must_use]
    pub fn new(
        verified: bool,
        verified_by: Option<String>,
        verified_ts: Option<DateTime<Utc>>,
    ) -> Self {
        VerificationState {
            verified,
            verified_by,
            verified_ts,
        }
    }

    /// Whether the element's value has been confirmed.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Process that performed the most recent verification.
    #[must_use]
    pub fn verified_by(&self) -> Option<&str> {
        self.verified_by.as_deref()
    }

    /// Instant of the most recent verification.
    #[must_use]
    pub fn verified_ts(&self) -> Option<DateTime<Utc>> {
        self.verified_ts
    }

    /// Set the verified flag. Unconditional at this layer.
    pub fn set_verified(&mut self, value: bool) {
        self.verified = value;
    }

    /// Record the verifying process; a later verification may overwrite.
    pub fn set_verified_by(&mut self, value: Option<String>) {
        if let Some(value) = value {
            self.verified_by = Some(value);
        }
    }

    /// Record the verification instant; a later verification may overwrite.
    pub fn set_verified_ts(&mut self, value: Option<Timestamp>) {
        if let Some(value) = value {
            self.verified_ts = Some(value.resolve());
        }
    }

    /// Read verification fields out of `record`; absent flags default to
    /// unverified.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a present field has the wrong type or does not
    /// parse.
    pub fn take(record: &mut Record) -> Result<Self, ElementError> {
        Ok(VerificationState {
            verified: record::take_bool_or(record, "verified", false)?,
            verified_by: record::take_opt_string(record, "verified_by")?,
            verified_ts: record::take_opt_datetime(record, "verified_ts")?,
        })
    }

    /// Write verification fields into `record`.
    pub fn write(&self, record: &mut Record) {
        record.insert("verified".to_owned(), Value::Bool(self.verified));
        record::put_opt_string(record, "verified_by", self.verified_by());
        record::put_opt_datetime(record, "verified_ts", self.verified_ts);
    }
}

/// Verification state plus the primary flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryState {
    verification: VerificationState,
    primary: bool,
}

impl PrimaryState {
    /// Assemble primary state from explicit fields.
    #[must_use]
    pub fn new(verification: VerificationState, primary: bool) -> Self {
        PrimaryState {
            verification,
            primary,
        }
    }

    /// The embedded verification state.
    #[must_use]
    pub fn verification(&self) -> &VerificationState {
        &self.verification
    }

    /// Whether the element's value has been confirmed.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification.is_verified()
    }

    /// Process that performed the most recent verification.
    #[must_use]
    pub fn verified_by(&self) -> Option<&str> {
        self.verification.verified_by()
    }

    /// Instant of the most recent verification.
    #[must_use]
    pub fn verified_ts(&self) -> Option<DateTime<Utc>> {
        self.verification.verified_ts()
    }

    /// Whether this element is the user's current default of its type.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Set the verified flag.
    ///
    /// # Errors
    ///
    /// `PrimaryViolation` when clearing the flag while the element is
    /// primary; a primary element must stay verified.
    pub fn set_verified(&mut self, value: bool) -> Result<(), ElementError> {
        if !value && self.primary {
            return Err(PrimaryViolation::UnverifyPrimary.into());
        }
        self.verification.set_verified(value);
        Ok(())
    }

    /// Record the verifying process; a later verification may overwrite.
    pub fn set_verified_by(&mut self, value: Option<String>) {
        self.verification.set_verified_by(value);
    }

    /// Record the verification instant; a later verification may overwrite.
    pub fn set_verified_ts(&mut self, value: Option<Timestamp>) {
        self.verification.set_verified_ts(value);
    }

    /// Set the primary flag. No cross-field validation here: whether the
    /// flag is consistent with the rest of the list is the list's rule.
    pub fn set_primary(&mut self, value: bool) {
        self.primary = value;
    }

    /// Read verification and primary fields out of `record`.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a present field has the wrong type or does not
    /// parse.
    pub fn take(record: &mut Record) -> Result<Self, ElementError> {
        Ok(PrimaryState {
            verification: VerificationState::take(record)?,
            primary: record::take_bool_or(record, "primary", false)?,
        })
    }

    /// Write verification and primary fields into `record`.
    pub fn write(&self, record: &mut Record) {
        self.verification.write(record);
        record.insert("primary".to_owned(), Value::Bool(self.primary));
    }
}
