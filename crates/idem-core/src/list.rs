//! Ordered element collections with find/add/remove by key
//!
//! [`ElementList`] preserves insertion order and enforces nothing about key
//! uniqueness on its own; specializations add duplicate rejection and the
//! primary invariant on top. `find` still refuses to silently pick one of
//! several same-key matches.

use crate::element::Element;
use crate::error::ElementError;
use crate::record::Record;

/// An ordered collection of one concrete element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementList<T> {
    elements: Vec<T>,
}

impl<T: Element> ElementList<T> {
    /// Wrap an already-built vector of elements.
    #[must_use]
    pub fn new(elements: Vec<T>) -> Self {
        ElementList { elements }
    }

    /// Look up an element by key.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one element shares the key.
    pub fn find(&self, key: &T::Key) -> Result<Option<&T>, ElementError> {
        let mut matches = self.elements.iter().filter(|element| element.key() == *key);
        let first = matches.next();
        if matches.next().is_some() {
            return Err(ElementError::MultipleFound {
                key: key.to_string(),
            });
        }
        Ok(first)
    }

    /// Look up an element by key for in-place mutation.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one element shares the key.
    pub fn find_mut(&mut self, key: &T::Key) -> Result<Option<&mut T>, ElementError> {
        let mut indices = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.key() == *key)
            .map(|(index, _)| index);
        let first = indices.next();
        if indices.next().is_some() {
            return Err(ElementError::MultipleFound {
                key: key.to_string(),
            });
        }
        Ok(first.and_then(|index| self.elements.get_mut(index)))
    }

    /// Append an element. Returns the list for chaining.
    pub fn add(&mut self, element: T) -> &mut Self {
        self.elements.push(element);
        self
    }

    /// Remove every element with the given key, preserving the relative
    /// order of the rest.
    ///
    /// # Errors
    ///
    /// `NotFound` if no element has the key.
    pub fn remove(&mut self, key: &T::Key) -> Result<(), ElementError> {
        if !self.elements.iter().any(|element| element.key() == *key) {
            return Err(ElementError::NotFound {
                key: key.to_string(),
            });
        }
        self.elements.retain(|element| element.key() != *key);
        Ok(())
    }

    /// A new list holding clones of the elements matching `predicate`.
    /// Mutating the result leaves this list untouched.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Self {
        ElementList::new(
            self.elements
                .iter()
                .filter(|element| predicate(element))
                .cloned()
                .collect(),
        )
    }

    /// Number of elements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    /// Whether the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Iterate mutably over the elements in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    /// The elements as a slice, in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Serialize every element, in insertion order.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.elements.iter().map(Element::to_record).collect()
    }

    /// Reconstruct a list from a sequence of records.
    ///
    /// # Errors
    ///
    /// The first decoding error encountered, in input order.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        let elements = records
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ElementList::new(elements))
    }
}

impl<T: Element> Default for ElementList<T> {
    fn default() -> Self {
        ElementList::new(Vec::new())
    }
}

impl<'a, T: Element> IntoIterator for &'a ElementList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::{Provenance, Timestamp};
    use assert_matches::assert_matches;

    /// Minimal concrete element: a display alias for the account.
    #[derive(Debug, Clone, PartialEq)]
    struct Alias {
        name: String,
        provenance: Provenance,
    }

    impl Alias {
        fn new(name: &str) -> Self {
            Alias {
                name: name.to_owned(),
                provenance: Provenance::new(Some("test".to_owned()), Timestamp::Now),
            }
        }
    }

    impl Element for Alias {
        type Key = String;
        const NAME: &'static str = "Alias";

        fn key(&self) -> String {
            self.name.clone()
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
                "name".to_owned(),
                serde_json::Value::String(self.name.clone()),
            );
            self.provenance.write(&mut record);
            record
        }

        fn from_record(mut record: Record) -> Result<Self, ElementError> {
            let name = crate::record::take_string(&mut record, Self::NAME, "name")?;
            let provenance = Provenance::take(&mut record)?;
            crate::record::finish(&record, Self::NAME)?;
            Ok(Alias { name, provenance })
        }
    }

    fn sample() -> ElementList<Alias> {
        ElementList::new(vec![Alias::new("kim"), Alias::new("kaj"), Alias::new("bo")])
    }

    #[test]
    fn test_find() {
        let list = sample();
        let hit = list.find(&"kaj".to_owned()).unwrap();
        assert_eq!(hit.map(|alias| alias.name.as_str()), Some("kaj"));
        assert!(list.find(&"nobody".to_owned()).unwrap().is_none());
    }

    #[test]
    fn test_find_refuses_ambiguity() {
        let mut list = sample();
        list.add(Alias::new("kim"));
        assert_matches!(
            list.find(&"kim".to_owned()),
            Err(ElementError::MultipleFound { .. })
        );
    }

    #[test]
    fn test_add_preserves_order() {
        let mut list = ElementList::default();
        list.add(Alias::new("a")).add(Alias::new("b"));
        let names: Vec<_> = list.iter().map(|alias| alias.name.clone()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut list = sample();
        list.remove(&"kaj".to_owned()).unwrap();
        let names: Vec<_> = list.iter().map(|alias| alias.name.clone()).collect();
        assert_eq!(names, ["kim", "bo"]);

        assert_matches!(
            list.remove(&"kaj".to_owned()),
            Err(ElementError::NotFound { .. })
        );
    }

    #[test]
    fn test_filter_does_not_share_mutation() {
        let list = sample();
        let mut short = list.filter(|alias| alias.name.len() == 2);
        assert_eq!(short.count(), 1);

        short.add(Alias::new("extra"));
        assert_eq!(list.count(), 3);
    }

    #[test]
    fn test_find_mut_edits_in_place() {
        let mut list = sample();
        let alias = list.find_mut(&"bo".to_owned()).unwrap().unwrap();
        alias.set_created_by(None).unwrap();
        alias.touch();
        assert!(list.find(&"bo".to_owned()).unwrap().is_some());
    }

    #[test]
    fn test_records_round_trip() {
        let list = sample();
        let records = list.to_records();
        let back = ElementList::<Alias>::from_records(records).unwrap();
        assert_eq!(back, list);
    }
}
