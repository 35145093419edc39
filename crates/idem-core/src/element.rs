//! Capability traits implemented by every concrete element type
//!
//! The hierarchy is compositional: a concrete type embeds [`Provenance`]
//! (and [`VerificationState`] / `PrimaryState` where capable) by value and
//! implements the matching trait, rather than inheriting partial state from
//! a base. [`Element`] is the floor, [`VerifiedElement`] adds proofing
//! state, [`PrimaryElement`] adds the primary flag.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::ElementError;
use crate::provenance::{Provenance, Timestamp};
use crate::record::Record;
use crate::verification::VerificationState;

/// The smallest unit of user data: a keyed record with creation provenance.
pub trait Element: Clone + fmt::Debug {
    /// Value identifying this element within its containing list, unique
    /// there and used for lookup and duplicate detection.
    type Key: PartialEq + fmt::Display;

    /// Type name used in decoding errors.
    const NAME: &'static str;

    /// This element's key.
    fn key(&self) -> Self::Key;

    /// Creation metadata.
    fn provenance(&self) -> &Provenance;

    /// Mutable creation metadata; writes go through its set-once guards.
    fn provenance_mut(&mut self) -> &mut Provenance;

    /// Produce the field map this element is stored as. Exact inverse of
    /// [`Element::from_record`] for every concrete type.
    fn to_record(&self) -> Record;

    /// Reconstruct an element from its field map.
    ///
    /// # Errors
    ///
    /// `UnknownFields` if the map contains keys outside the concrete type's
    /// field set, `MissingField` if a required key is absent, and
    /// `InvalidValue` if a field does not parse.
    fn from_record(record: Record) -> Result<Self, ElementError>;

    /// Application or process that created the element, when recorded.
    fn created_by(&self) -> Option<&str> {
        self.provenance().created_by()
    }

    /// Instant the element was created.
    fn created_ts(&self) -> DateTime<Utc> {
        self.provenance().created_ts()
    }

    /// Instant of the last mutation, compared by the persistence layer to
    /// detect a stale in-memory copy.
    fn modified_ts(&self) -> DateTime<Utc> {
        self.provenance().modified_ts()
    }

    /// Stamp `modified_ts` with the current instant.
    fn touch(&mut self) {
        self.provenance_mut().touch();
    }

    /// Record who created the element. Write-once; see
    /// [`Provenance::set_created_by`].
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a value is already stored and `value` is non-null.
    fn set_created_by(&mut self, value: Option<String>) -> Result<(), ElementError> {
        self.provenance_mut().set_created_by(value)
    }

    /// Record when the element was created. Write-once; see
    /// [`Provenance::set_created_ts`].
    ///
    /// # Errors
    ///
    /// `InvalidValue` for any non-null `value`.
    fn set_created_ts(&mut self, value: Option<Timestamp>) -> Result<(), ElementError> {
        self.provenance_mut().set_created_ts(value)
    }
}

/// An element whose value can be confirmed by an out-of-band proofing
/// process.
pub trait VerifiedElement: Element {
    /// Proofing state.
    fn verification(&self) -> &VerificationState;

    /// Set the verified flag.
    ///
    /// # Errors
    ///
    /// Primary-capable implementations refuse to clear the flag while the
    /// element is primary; plain verified elements never fail.
    fn set_verified(&mut self, value: bool) -> Result<(), ElementError>;

    /// Record the verifying process; a later verification may overwrite.
    fn set_verified_by(&mut self, value: Option<String>);

    /// Record the verification instant; a later verification may overwrite.
    fn set_verified_ts(&mut self, value: Option<Timestamp>);

    /// Whether the element's value has been confirmed.
    fn is_verified(&self) -> bool {
        self.verification().is_verified()
    }

    /// Process that performed the most recent verification.
    fn verified_by(&self) -> Option<&str> {
        self.verification().verified_by()
    }

    /// Instant of the most recent verification.
    fn verified_ts(&self) -> Option<DateTime<Utc>> {
        self.verification().verified_ts()
    }
}

/// A verified element that can additionally be the user's current default
/// of its type (the primary email, the primary phone number).
///
/// Which element may carry the flag is governed by
/// [`crate::primary_list::PrimaryElementList`]; the per-instance coupling to
/// verification lives in [`crate::verification::PrimaryState`].
pub trait PrimaryElement: VerifiedElement {
    /// Whether this element is the current default of its type.
    fn is_primary(&self) -> bool;

    /// Set the primary flag on this element alone. No cross-field
    /// validation; list-level consistency is the list's rule.
    fn set_primary(&mut self, value: bool);
}
