//! Locked identities
//!
//! When an identity number is verified it is also locked to the account.
//! The removable element can be thrown away later, but the locked copy
//! stays forever: a re-registration of the same account must present the
//! same number. The list therefore refuses removal outright.
//!
//! Locked identities are keyed by kind, not by number, so an account holds
//! at most one locked identity per kind.

use idem_core::record::{self, Record};
use idem_core::{Element, ElementError, ElementList, Provenance, Timestamp};

/// A national identity number locked to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedNin {
    number: String,
    provenance: Provenance,
}

impl LockedNin {
    /// Lock a verified number to the account, on behalf of `created_by`.
    #[must_use]
    pub fn new(number: &str, created_by: &str) -> Self {
        LockedNin {
            number: number.to_owned(),
            provenance: Provenance::new(Some(created_by.to_owned()), Timestamp::Now),
        }
    }

    /// The locked national identity number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    fn take(mut record: Record) -> Result<Self, ElementError> {
        let number = record::take_string(&mut record, "LockedNin", "number")?;
        let provenance = Provenance::take(&mut record)?;
        record::finish(&record, "LockedNin")?;
        Ok(LockedNin { number, provenance })
    }

    fn write(&self, record: &mut Record) {
        record.insert(
            "number".to_owned(),
            serde_json::Value::String(self.number.clone()),
        );
        self.provenance.write(record);
    }
}

/// Any identity locked to an account, decoded by its `identity_type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockedIdentity {
    /// A locked national identity number.
    Nin(LockedNin),
}

impl Element for LockedIdentity {
    type Key = String;
    const NAME: &'static str = "LockedIdentity";

    fn key(&self) -> String {
        match self {
            LockedIdentity::Nin(_) => "nin".to_owned(),
        }
    }

    fn provenance(&self) -> &Provenance {
        match self {
            LockedIdentity::Nin(identity) => &identity.provenance,
        }
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        match self {
            LockedIdentity::Nin(identity) => &mut identity.provenance,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(
            "identity_type".to_owned(),
            serde_json::Value::String(self.key()),
        );
        match self {
            LockedIdentity::Nin(identity) => identity.write(&mut record),
        }
        record
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        let kind = record::take_string(&mut record, Self::NAME, "identity_type")?;
        match kind.as_str() {
            "nin" => LockedNin::take(record).map(LockedIdentity::Nin),
            other => Err(ElementError::InvalidValue {
                field: "identity_type",
                reason: format!("unrecognized identity kind {other:?}"),
            }),
        }
    }
}

/// The identities locked to one account, unique by kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockedIdentityList {
    inner: ElementList<LockedIdentity>,
}

impl LockedIdentityList {
    /// Build a list from existing locked identities; duplicates are rejected.
    ///
    /// # Errors
    ///
    /// `Duplicate` if two inputs share a kind.
    pub fn new(identities: Vec<LockedIdentity>) -> Result<Self, ElementError> {
        let mut list = LockedIdentityList::default();
        for identity in identities {
            list.add(identity)?;
        }
        Ok(list)
    }

    /// Look up a locked identity by kind.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one identity shares the kind.
    pub fn find(&self, key: &str) -> Result<Option<&LockedIdentity>, ElementError> {
        self.inner.find(&key.to_owned())
    }

    /// Lock another identity to the account.
    ///
    /// # Errors
    ///
    /// `Duplicate` if an identity of the same kind is already locked.
    pub fn add(&mut self, identity: LockedIdentity) -> Result<&mut Self, ElementError> {
        if self.inner.find(&identity.key())?.is_some() {
            return Err(ElementError::Duplicate {
                key: identity.key(),
            });
        }
        self.inner.add(identity);
        Ok(self)
    }

    /// Refuse to remove a locked identity. Always fails, whether or not
    /// the key is present.
    ///
    /// # Errors
    ///
    /// `Permanent`, unconditionally.
    pub fn remove(&mut self, key: &str) -> Result<(), ElementError> {
        Err(ElementError::Permanent {
            key: key.to_owned(),
        })
    }

    /// Number of locked identities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Whether no identity is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the locked identities.
    pub fn iter(&self) -> std::slice::Iter<'_, LockedIdentity> {
        self.inner.iter()
    }

    /// Serialize every locked identity.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.inner.to_records()
    }

    /// Reconstruct a list from a sequence of records.
    ///
    /// # Errors
    ///
    /// Decoding errors in input order, then `Duplicate` for repeated kinds.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        let identities = records
            .into_iter()
            .map(LockedIdentity::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        LockedIdentityList::new(identities)
    }
}

impl<'a> IntoIterator for &'a LockedIdentityList {
    type Item = &'a LockedIdentity;
    type IntoIter = std::slice::Iter<'a, LockedIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
