//! Phone number elements
//!
//! Numbers are stored as given (E.164 formatting is the caller's concern)
//! and collected in a [`PhoneNumberList`] with the usual primary rule.

use idem_core::record::{self, Record};
use idem_core::{
    Element, ElementError, PrimaryElement, PrimaryElementList, PrimaryState, Provenance,
    Timestamp, VerificationState, VerifiedElement,
};

/// A phone number belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    number: String,
    provenance: Provenance,
    state: PrimaryState,
}

impl PhoneNumber {
    /// A new, unverified, non-primary number created now.
    #[must_use]
    pub fn new(number: &str) -> Self {
        PhoneNumber::with_state(
            number,
            Provenance::new(None, Timestamp::Now),
            PrimaryState::default(),
        )
    }

    /// Assemble a number from explicit provenance and state.
    #[must_use]
    pub fn with_state(number: &str, provenance: Provenance, state: PrimaryState) -> Self {
        PhoneNumber {
            number: number.to_owned(),
            provenance,
            state,
        }
    }

    /// The number as given at construction.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl Element for PhoneNumber {
    type Key = String;
    const NAME: &'static str = "PhoneNumber";

    fn key(&self) -> String {
        self.number.clone()
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
            "number".to_owned(),
            serde_json::Value::String(self.number.clone()),
        );
        self.provenance.write(&mut record);
        self.state.write(&mut record);
        record
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        let number = record::take_string(&mut record, Self::NAME, "number")?;
        let provenance = Provenance::take(&mut record)?;
        let state = PrimaryState::take(&mut record)?;
        record::finish(&record, Self::NAME)?;
        Ok(PhoneNumber {
            number,
            provenance,
            state,
        })
    }
}

impl VerifiedElement for PhoneNumber {
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

impl PrimaryElement for PhoneNumber {
    fn is_primary(&self) -> bool {
        self.state.is_primary()
    }

    fn set_primary(&mut self, value: bool) {
        self.state.set_primary(value);
    }
}

/// A user's phone numbers, one primary among the verified ones.
pub type PhoneNumberList = PrimaryElementList<PhoneNumber>;
