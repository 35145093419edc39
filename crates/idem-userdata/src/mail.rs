//! Mail address elements
//!
//! A user's email addresses form a [`MailAddressList`]: at most one primary
//! address, and only a verified address can be primary. Addresses are
//! normalized to lowercase on the way in, so lookups and duplicate detection
//! are effectively case-insensitive.

use idem_core::record::{self, Record};
use idem_core::{
    Element, ElementError, PrimaryElement, PrimaryElementList, PrimaryState, Provenance,
    Timestamp, VerificationState, VerifiedElement,
};

/// An email address belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    email: String,
    provenance: Provenance,
    state: PrimaryState,
}

impl MailAddress {
    /// A new, unverified, non-primary address created now.
    #[must_use]
    pub fn new(email: &str) -> Self {
        MailAddress::with_state(
            email,
            Provenance::new(None, Timestamp::Now),
            PrimaryState::default(),
        )
    }

    /// Assemble an address from explicit provenance and state.
    #[must_use]
    pub fn with_state(email: &str, provenance: Provenance, state: PrimaryState) -> Self {
        MailAddress {
            email: email.to_lowercase(),
            provenance,
            state,
        }
    }

    /// The address, lowercased.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Element for MailAddress {
    type Key = String;
    const NAME: &'static str = "MailAddress";

    fn key(&self) -> String {
        self.email.clone()
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
            "email".to_owned(),
            serde_json::Value::String(self.email.clone()),
        );
        self.provenance.write(&mut record);
        self.state.write(&mut record);
        record
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        let email = record::take_string(&mut record, Self::NAME, "email")?;
        let provenance = Provenance::take(&mut record)?;
        let state = PrimaryState::take(&mut record)?;
        record::finish(&record, Self::NAME)?;
        Ok(MailAddress {
            email: email.to_lowercase(),
            provenance,
            state,
        })
    }
}

impl VerifiedElement for MailAddress {
    fn verification(&self) -> &VerificationState {
        self.state.verification()
    }

    fn set_verified(&mut self, value: bool) -> Result<(), ElementError> {
        self.state.set_verified(value)
    }

    fn set_verified_by(&mut self, value: Option<String>) {
        self.state.set_verified_by(value);
    }

    fn set_verified_ts(&mut self, value: Option<Timestamp>) {
        self.state.set_verified_ts(value);
    }
}

impl PrimaryElement for MailAddress {
    fn is_primary(&self) -> bool {
        self.state.is_primary()
    }

    fn set_primary(&mut self, value: bool) {
        self.state.set_primary(value);
    }
}

/// A user's mail addresses, one primary among the verified ones.
pub type MailAddressList = PrimaryElementList<MailAddress>;
