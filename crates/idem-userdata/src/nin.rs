//! National identity number elements

use idem_core::record::{self, Record};
use idem_core::{
    Element, ElementError, PrimaryElement, PrimaryElementList, PrimaryState, Provenance,
    Timestamp, VerificationState, VerifiedElement,
};

/// A national identity number belonging to a user.
///
/// The number is opaque to this layer; format checks belong to the proofing
/// workflows that verify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nin {
    number: String,
    provenance: Provenance,
    state: PrimaryState,
}

impl Nin {
    /// A new, unverified, non-primary number created now.
    #[must_use]
    pub fn new(number: &str) -> Self {
        Nin::with_state(
            number,
            Provenance::new(None, Timestamp::Now),
            PrimaryState::default(),
        )
    }

    /// Assemble a number from explicit provenance and state.
    #[must_use]
    pub fn with_state(number: &str, provenance: Provenance, state: PrimaryState) -> Self {
        Nin {
            number: number.to_owned(),
            provenance,
            state,
        }
    }

    /// The identity number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }
}

impl Element for Nin {
    type Key = String;
    const NAME: &'static str = "Nin";

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
        Ok(Nin {
            number,
            provenance,
            state,
        })
    }
}

impl VerifiedElement for Nin {
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

impl PrimaryElement for Nin {
    fn is_primary(&self) -> bool {
        self.state.is_primary()
    }

    fn set_primary(&mut self, value: bool) {
        self.state.set_primary(value);
    }
}

/// A user's identity numbers, one primary among the verified ones.
pub type NinList = PrimaryElementList<Nin>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn verified_nin(number: &str, primary: bool) -> Nin {
        Nin::with_state(
            number,
            Provenance::new(Some("letter-proofing".to_owned()), Timestamp::Now),
            PrimaryState::new(
                VerificationState::new(
                    true,
                    Some("letter-proofing".to_owned()),
                    Some(Utc::now()),
                ),
                primary,
            ),
        )
    }

    #[test]
    fn test_record_round_trip() {
        let nin = verified_nin("197801011234", true);
        let back = Nin::from_record(nin.to_record()).unwrap();
        assert_eq!(back, nin);
    }

    #[test]
    fn test_unverify_primary_refused() {
        let mut nin = verified_nin("197801011234", true);
        assert_matches!(nin.set_verified(false), Err(ElementError::Primary(_)));
        assert!(nin.is_verified());
    }

    #[test]
    fn test_list_keeps_single_primary() {
        let mut list =
            NinList::new(vec![verified_nin("197801011234", true)]).unwrap();
        list.add(Nin::new("200001019876")).unwrap();

        assert_eq!(list.count(), 2);
        assert_eq!(list.primary().unwrap().unwrap().number(), "197801011234");
    }
}
