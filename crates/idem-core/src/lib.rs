//! Idem Core - Element and List Invariant Framework
//!
//! This crate provides the invariant-bearing layer of the Idem user-identity
//! data model. Every piece of user data (an email address, a phone number, a
//! credential, a consent record) is an *element*: a keyed record carrying
//! creation provenance, grouped into typed lists whose mutations re-validate
//! the collection rules.
//!
//! What the framework enforces:
//!
//! - Write-once provenance: `created_by` / `created_ts` can be stored once
//!   and never changed; null assignments are no-ops
//! - Verification coupling: a primary element must stay verified
//! - One primary among verified: a list with verified members has exactly
//!   one primary element; mutations that would break this are rejected with
//!   nothing committed
//! - Duplicate detection: same-key `add` is refused, except for the
//!   replay-tolerant [`EventList`]
//!
//! # Architecture
//!
//! Capability is composition, not inheritance: concrete types embed
//! [`Provenance`] (and [`VerificationState`] / [`PrimaryState`] where
//! capable) by value and implement the [`Element`] / [`VerifiedElement`] /
//! [`PrimaryElement`] traits. Lists are generic over those traits:
//!
//! - [`ElementList`] - ordered, no uniqueness rule of its own
//! - [`PrimaryElementList`] - validates one-primary-among-verified before
//!   committing any mutation
//! - [`EventList`] - append-only, idempotent under replay
//!
//! Elements cross the persistence boundary as flat field maps ([`Record`]);
//! decoding enforces a closed field set per concrete type. This crate owns
//! no storage, no wire protocol, and no concurrency: one logical operation
//! owns a list exclusively, mutates it, and hands the records back to the
//! persistence collaborator.
//!
//! # Example
//!
//! ```ignore
//! use idem_core::{PrimaryElementList, Element, PrimaryElement};
//!
//! let mut addresses = PrimaryElementList::new(stored)?;
//!
//! // The one verified primary address, if any member is verified.
//! if let Some(primary) = addresses.primary()? {
//!     println!("primary address: {}", primary.key());
//! }
//!
//! // Promote another verified address; every flag flips in one operation.
//! addresses.set_primary(&candidate)?;
//! ```

pub mod element;
pub mod error;
pub mod events;
pub mod list;
pub mod primary_list;
pub mod provenance;
pub mod record;
pub mod verification;

// Re-export primary types
pub use element::{Element, PrimaryElement, VerifiedElement};
pub use error::{ElementError, PrimaryViolation};
pub use events::{EventId, EventList};
pub use list::ElementList;
pub use primary_list::PrimaryElementList;
pub use provenance::{Provenance, Timestamp};
pub use record::Record;
pub use verification::{PrimaryState, VerificationState};
