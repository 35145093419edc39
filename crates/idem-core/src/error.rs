//! Error taxonomy for element and list operations
//!
//! Every violation is reported synchronously at the mutating call site and
//! propagates as a `Result`; nothing in this crate logs-and-swallows. Callers
//! decide whether to surface, retry with different input, or abort.

use thiserror::Error;

/// Errors from element construction, field assignment, and list mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// A field was assigned a value of the wrong type or outside its domain.
    ///
    /// Also covers write-once refusals (`created_by` / `created_ts`) and
    /// unrecognized tags in tagged records.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The field that rejected the value
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A record passed to a factory contains keys outside the closed field
    /// set of the concrete type.
    #[error("{element} record contains unrecognized fields {fields:?}")]
    UnknownFields {
        /// The concrete element type being decoded
        element: &'static str,
        /// The offending keys, in sorted order
        fields: Vec<String>,
    },

    /// A required key is absent from a record.
    #[error("{element} record is missing required field {field}")]
    MissingField {
        /// The concrete element type being decoded
        element: &'static str,
        /// The absent key
        field: &'static str,
    },

    /// An `add` would create two elements with the same key, or an event
    /// list received a same-key event with differing content.
    #[error("duplicate element {key}")]
    Duplicate {
        /// Key of the element already present
        key: String,
    },

    /// The single-primary-among-verified invariant would be (or already is)
    /// violated.
    #[error(transparent)]
    Primary(#[from] PrimaryViolation),

    /// Lookup or removal by key found no match.
    #[error("element {key} not found")]
    NotFound {
        /// The key that was looked up
        key: String,
    },

    /// Lookup by key found more than one match. Should be unreachable given
    /// duplicate rejection on `add`, but is checked rather than silently
    /// picking one.
    #[error("multiple elements share key {key}")]
    MultipleFound {
        /// The ambiguous key
        key: String,
    },

    /// Removal was attempted on an element of a set-once registry.
    #[error("element {key} is permanent and cannot be removed")]
    Permanent {
        /// Key of the element that must stay
        key: String,
    },
}

/// Violations of the primary/verified coupling, at either the per-instance
/// or the collection level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimaryViolation {
    /// `set_verified(false)` was called on an element that is primary.
    #[error("a primary element cannot be marked unverified")]
    UnverifyPrimary,

    /// The element chosen as primary is not verified.
    #[error("element {key} is not verified and cannot be primary")]
    NotVerified {
        /// Key of the unverified element
        key: String,
    },

    /// A list with no verified elements contains one marked primary.
    #[error("unverified element {key} is marked primary")]
    StrayPrimary {
        /// Key of the stray primary element
        key: String,
    },

    /// The verified subset of a list does not contain exactly one primary
    /// element.
    #[error("list contains {observed}/{elements} primary elements, expected exactly one")]
    PrimaryCount {
        /// Primary elements observed among the verified subset
        observed: usize,
        /// Total elements in the list
        elements: usize,
    },
}
