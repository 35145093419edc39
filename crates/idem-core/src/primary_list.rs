//! Element collections enforcing one primary among the verified members
//!
//! [`PrimaryElementList`] layers a collection-wide rule on top of
//! [`ElementList`]: a list with no verified elements has no primary, and a
//! list with verified elements has exactly one, which is itself verified.
//! Mutations validate the candidate state before committing, so a rejected
//! `add` or `remove` leaves the list exactly as it was.

use tracing::debug;

use crate::element::PrimaryElement;
use crate::error::{ElementError, PrimaryViolation};
use crate::list::ElementList;
use crate::record::Record;

/// Locate the primary element of a candidate collection, enforcing the
/// primary-consistency rule along the way.
///
/// No verified elements: `None`, unless one of the unverified members is
/// marked primary, which is a violation in its own right. At least one
/// verified element: exactly one primary among the verified subset.
fn find_primary<'a, T, I>(candidate: I) -> Result<Option<&'a T>, ElementError>
where
    T: PrimaryElement + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let elements: Vec<&'a T> = candidate.into_iter().collect();
    let verified: Vec<&'a T> = elements
        .iter()
        .copied()
        .filter(|element| element.is_verified())
        .collect();

    if verified.is_empty() {
        if let Some(stray) = elements.iter().find(|element| element.is_primary()) {
            return Err(PrimaryViolation::StrayPrimary {
                key: stray.key().to_string(),
            }
            .into());
        }
        return Ok(None);
    }

    let mut primaries = verified.iter().copied().filter(|element| element.is_primary());
    match (primaries.next(), primaries.next()) {
        (Some(primary), None) => Ok(Some(primary)),
        _ => {
            let observed = verified
                .iter()
                .filter(|element| element.is_primary())
                .count();
            Err(PrimaryViolation::PrimaryCount {
                observed,
                elements: elements.len(),
            }
            .into())
        }
    }
}

fn check_primary<'a, T, I>(candidate: I) -> Result<(), ElementError>
where
    T: PrimaryElement + 'a,
    I: IntoIterator<Item = &'a T>,
{
    find_primary(candidate).map(|_| ())
}

/// An ordered collection of primary-capable elements upholding the
/// one-primary-among-verified rule across every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryElementList<T> {
    inner: ElementList<T>,
}

impl<T: PrimaryElement> PrimaryElementList<T> {
    /// Build a list from existing elements, validating the collection rule
    /// up front; a bad input set fails here, before any operation runs.
    ///
    /// # Errors
    ///
    /// `PrimaryViolation` describing the inconsistency.
    pub fn new(elements: Vec<T>) -> Result<Self, ElementError> {
        check_primary(elements.iter())?;
        Ok(PrimaryElementList {
            inner: ElementList::new(elements),
        })
    }

    /// Look up an element by key.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one element shares the key.
    pub fn find(&self, key: &T::Key) -> Result<Option<&T>, ElementError> {
        self.inner.find(key)
    }

    /// Look up an element by key for in-place mutation, as verification
    /// workflows do when they confirm an address.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one element shares the key.
    pub fn find_mut(&mut self, key: &T::Key) -> Result<Option<&mut T>, ElementError> {
        self.inner.find_mut(key)
    }

    /// Append an element if the result still satisfies the collection rule.
    /// The candidate state is validated before anything is committed; on
    /// rejection the list is untouched.
    ///
    /// # Errors
    ///
    /// `Duplicate` if an element with the same key is present,
    /// `PrimaryViolation` if the appended result would break the rule.
    pub fn add(&mut self, element: T) -> Result<&mut Self, ElementError> {
        if self.inner.find(&element.key())?.is_some() {
            return Err(ElementError::Duplicate {
                key: element.key().to_string(),
            });
        }
        check_primary(self.inner.iter().chain(std::iter::once(&element)))?;
        self.inner.add(element);
        Ok(self)
    }

    /// Remove the element with the given key if the remainder still
    /// satisfies the collection rule; same validate-before-commit
    /// discipline as [`PrimaryElementList::add`].
    ///
    /// # Errors
    ///
    /// `NotFound` if no element has the key, `PrimaryViolation` if the
    /// remainder would break the rule.
    pub fn remove(&mut self, key: &T::Key) -> Result<(), ElementError> {
        if self.inner.find(key)?.is_none() {
            return Err(ElementError::NotFound {
                key: key.to_string(),
            });
        }
        check_primary(self.inner.iter().filter(|element| element.key() != *key))?;
        self.inner.remove(key)
    }

    /// The primary element, or `None` for a list with no verified members.
    ///
    /// # Errors
    ///
    /// `PrimaryViolation` if the stored state is inconsistent: a primary
    /// flag among unverified-only members, or a primary count other than
    /// one among the verified subset. In-place element edits through
    /// [`PrimaryElementList::find_mut`] can produce such a state; it is
    /// reported here rather than silently resolved.
    pub fn primary(&self) -> Result<Option<&T>, ElementError> {
        find_primary(self.inner.iter())
    }

    /// Make the element with the given key the primary one.
    ///
    /// Every element's primary flag is reassigned to `element.key == key` in
    /// one logical operation; the precondition checks guarantee the result
    /// satisfies the collection rule, so the caller never observes a partial
    /// reassignment.
    ///
    /// # Errors
    ///
    /// `NotFound` if no element has the key, `PrimaryViolation` if the
    /// chosen element is not verified.
    pub fn set_primary(&mut self, key: &T::Key) -> Result<(), ElementError> {
        match self.inner.find(key)? {
            None => {
                return Err(ElementError::NotFound {
                    key: key.to_string(),
                });
            }
            Some(element) if !element.is_verified() => {
                return Err(PrimaryViolation::NotVerified {
                    key: key.to_string(),
                }
                .into());
            }
            Some(_) => {}
        }
        for element in self.inner.iter_mut() {
            let make_primary = element.key() == *key;
            element.set_primary(make_primary);
        }
        debug!("Primary element set to {}", key);
        Ok(())
    }

    /// A new list holding clones of the verified members only.
    ///
    /// The members come from a list that satisfies the collection rule, so
    /// the result does too and is built without re-validation.
    #[must_use]
    pub fn verified(&self) -> Self {
        PrimaryElementList {
            inner: self.inner.filter(|element| element.is_verified()),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Whether the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.iter()
    }

    /// The elements as a slice, in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[T] {
        self.inner.elements()
    }

    /// Serialize every element, in insertion order.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.inner.to_records()
    }

    /// Reconstruct a list from a sequence of records, then validate it.
    ///
    /// # Errors
    ///
    /// Decoding errors in input order, then `PrimaryViolation` if the
    /// decoded collection is inconsistent.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        let elements = records
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        PrimaryElementList::new(elements)
    }
}

impl<T: PrimaryElement> Default for PrimaryElementList<T> {
    fn default() -> Self {
        PrimaryElementList {
            inner: ElementList::default(),
        }
    }
}

impl<'a, T: PrimaryElement> IntoIterator for &'a PrimaryElementList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, VerifiedElement};
    use crate::provenance::{Provenance, Timestamp};
    use crate::record;
    use crate::verification::{PrimaryState, VerificationState};
    use assert_matches::assert_matches;
    use chrono::Utc;

    /// Primary-capable fixture: a contact address.
    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        address: String,
        provenance: Provenance,
        state: PrimaryState,
    }

    impl Element for Contact {
        type Key = String;
        const NAME: &'static str = "Contact";

        fn key(&self) -> String {
            self.address.clone()
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
                "address".to_owned(),
                serde_json::Value::String(self.address.clone()),
            );
            self.provenance.write(&mut record);
            self.state.write(&mut record);
            record
        }

        fn from_record(mut record: Record) -> Result<Self, ElementError> {
            let address = record::take_string(&mut record, Self::NAME, "address")?;
            let provenance = Provenance::take(&mut record)?;
            let state = PrimaryState::take(&mut record)?;
            record::finish(&record, Self::NAME)?;
            Ok(Contact {
                address,
                provenance,
                state,
            })
        }
    }

    impl VerifiedElement for Contact {
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

    impl PrimaryElement for Contact {
        fn is_primary(&self) -> bool {
            self.state.is_primary()
        }

        fn set_primary(&mut self, value: bool) {
            self.state.set_primary(value);
        }
    }

    fn contact(address: &str, verified: bool, primary: bool) -> Contact {
        let verification = if verified {
            VerificationState::new(true, Some("test".to_owned()), Some(Utc::now()))
        } else {
            VerificationState::default()
        };
        Contact {
            address: address.to_owned(),
            provenance: Provenance::new(Some("test".to_owned()), Timestamp::Now),
            state: PrimaryState::new(verification, primary),
        }
    }

    fn key(address: &str) -> String {
        address.to_owned()
    }

    #[test]
    fn test_empty_list_has_no_primary() {
        let list = PrimaryElementList::<Contact>::default();
        assert!(list.primary().unwrap().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_unverified_only_has_no_primary() {
        let list =
            PrimaryElementList::new(vec![contact("a", false, false), contact("b", false, false)])
                .unwrap();
        assert!(list.primary().unwrap().is_none());
    }

    #[test]
    fn test_stray_primary_rejected_at_construction() {
        let result = PrimaryElementList::new(vec![contact("a", false, true)]);
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::StrayPrimary { .. }))
        );
    }

    #[test]
    fn test_single_verified_primary() {
        let list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        let primary = list.primary().unwrap().unwrap();
        assert_eq!(primary.address, "a");
    }

    #[test]
    fn test_verified_without_primary_rejected() {
        let result = PrimaryElementList::new(vec![contact("a", true, false)]);
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::PrimaryCount {
                observed: 0,
                elements: 1,
            }))
        );
    }

    #[test]
    fn test_two_primaries_rejected() {
        let result =
            PrimaryElementList::new(vec![contact("a", true, true), contact("b", true, true)]);
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::PrimaryCount {
                observed: 2,
                elements: 2,
            }))
        );
    }

    #[test]
    fn test_add_unverified_keeps_primary() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        list.add(contact("b", false, false)).unwrap();
        assert_eq!(list.count(), 2);
        assert_eq!(list.primary().unwrap().unwrap().address, "a");
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        let result = list.add(contact("a", false, false));
        assert_matches!(result, Err(ElementError::Duplicate { .. }));
        assert_eq!(list.count(), 1);
    }

    #[test]
    fn test_add_second_primary_rejected() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        let result = list.add(contact("b", true, true));
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::PrimaryCount {
                observed: 2,
                elements: 2,
            }))
        );
        assert_eq!(list.count(), 1);
        assert!(list.find(&key("b")).unwrap().is_none());
    }

    #[test]
    fn test_remove_leaving_no_primary_rejected() {
        let mut list =
            PrimaryElementList::new(vec![contact("a", true, true), contact("b", true, false)])
                .unwrap();

        let result = list.remove(&key("a"));
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::PrimaryCount {
                observed: 0,
                elements: 1,
            }))
        );

        // Nothing was mutated: both elements still present, flags intact.
        assert_eq!(list.count(), 2);
        assert!(list.find(&key("a")).unwrap().unwrap().is_primary());
        assert!(!list.find(&key("b")).unwrap().unwrap().is_primary());
    }

    #[test]
    fn test_remove_unverified_preserves_order() {
        let mut list = PrimaryElementList::new(vec![
            contact("a", true, true),
            contact("b", false, false),
            contact("c", false, false),
        ])
        .unwrap();

        list.remove(&key("b")).unwrap();
        let addresses: Vec<_> = list.iter().map(|c| c.address.clone()).collect();
        assert_eq!(addresses, ["a", "c"]);
    }

    #[test]
    fn test_remove_only_element() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        list.remove(&key("a")).unwrap();
        assert!(list.is_empty());
        assert!(list.primary().unwrap().is_none());
    }

    #[test]
    fn test_remove_unknown_key() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        assert_matches!(
            list.remove(&key("nope")),
            Err(ElementError::NotFound { .. })
        );
    }

    #[test]
    fn test_set_primary_reassigns() {
        let mut list =
            PrimaryElementList::new(vec![contact("a", true, true), contact("b", true, false)])
                .unwrap();

        list.set_primary(&key("b")).unwrap();
        assert!(!list.find(&key("a")).unwrap().unwrap().is_primary());
        assert!(list.find(&key("b")).unwrap().unwrap().is_primary());
        assert_eq!(list.primary().unwrap().unwrap().address, "b");
    }

    #[test]
    fn test_set_primary_to_same() {
        let mut list =
            PrimaryElementList::new(vec![contact("a", true, true), contact("b", true, false)])
                .unwrap();
        list.set_primary(&key("a")).unwrap();
        assert_eq!(list.primary().unwrap().unwrap().address, "a");
    }

    #[test]
    fn test_set_primary_unknown_key() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        assert_matches!(
            list.set_primary(&key("nope")),
            Err(ElementError::NotFound { .. })
        );
    }

    #[test]
    fn test_set_primary_on_unverified() {
        let mut list =
            PrimaryElementList::new(vec![contact("a", true, true), contact("b", false, false)])
                .unwrap();

        let result = list.set_primary(&key("b"));
        assert_matches!(
            result,
            Err(ElementError::Primary(PrimaryViolation::NotVerified { .. }))
        );
        assert_eq!(list.primary().unwrap().unwrap().address, "a");
    }

    #[test]
    fn test_verified_view() {
        let list = PrimaryElementList::new(vec![
            contact("a", true, true),
            contact("b", false, false),
            contact("c", true, false),
        ])
        .unwrap();

        let verified = list.verified();
        assert_eq!(verified.count(), 2);
        assert_eq!(verified.primary().unwrap().unwrap().address, "a");
        assert!(verified.find(&key("b")).unwrap().is_none());
    }

    #[test]
    fn test_unverify_primary_in_place_is_refused() {
        let mut list = PrimaryElementList::new(vec![contact("a", true, true)]).unwrap();
        let element = list.find_mut(&key("a")).unwrap().unwrap();
        assert_matches!(
            element.set_verified(false),
            Err(ElementError::Primary(PrimaryViolation::UnverifyPrimary))
        );
        assert_eq!(list.primary().unwrap().unwrap().address, "a");
    }

    #[test]
    fn test_records_round_trip() {
        let list = PrimaryElementList::new(vec![
            contact("a", true, true),
            contact("b", false, false),
        ])
        .unwrap();

        let back = PrimaryElementList::<Contact>::from_records(list.to_records()).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn test_from_records_validates() {
        let records = vec![contact("a", false, true).to_record()];
        assert_matches!(
            PrimaryElementList::<Contact>::from_records(records),
            Err(ElementError::Primary(PrimaryViolation::StrayPrimary { .. }))
        );
    }
}
