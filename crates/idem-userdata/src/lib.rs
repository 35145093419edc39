//! Idem Userdata - Typed Elements of a User Account
//!
//! The concrete account data kept for every user, built on the element and
//! list framework of `idem-core`:
//!
//! - **Mail addresses, phone numbers, identity numbers**: verifiable,
//!   exactly one primary among the verified members
//! - **Credentials**: passwords and hardware security keys, unique by key
//! - **Consent**: append-only terms-of-use acceptance events
//! - **Locked identities**: verified identity numbers that can never be
//!   removed from the account
//!
//! # Architecture
//!
//! Each element type owns its wire format: `to_record` emits a field map
//! and `from_record` consumes one, rejecting unknown fields. Sum types
//! (credentials, events, locked identities) are tagged in their records and
//! decoded by exhaustive matching. List wrappers validate before they
//! commit, so a failed operation leaves the list untouched.
//!
//! # Example
//!
//! ```ignore
//! use idem_core::{ElementError, PrimaryViolation};
//! use idem_userdata::{MailAddress, MailAddressList};
//!
//! let mut addresses = MailAddressList::new(vec![verified_primary])?;
//! addresses.add(MailAddress::new("new@example.com"))?;
//!
//! // Refused until the new address is verified.
//! let err = addresses.set_primary(&"new@example.com".to_owned()).unwrap_err();
//! assert_eq!(
//!     err,
//!     ElementError::Primary(PrimaryViolation::NotVerified {
//!         key: "new@example.com".to_owned(),
//!     })
//! );
//! ```

pub mod consent;
pub mod credentials;
pub mod locked;
pub mod mail;
pub mod nin;
pub mod phone;

// Re-export primary types
pub use consent::{ToUEvent, ToUList, UserEvent, UserEventList};
pub use credentials::{Credential, CredentialList, Password, U2fToken, WebauthnToken};
pub use locked::{LockedIdentity, LockedIdentityList, LockedNin};
pub use mail::{MailAddress, MailAddressList};
pub use nin::{Nin, NinList};
pub use phone::{PhoneNumber, PhoneNumberList};
