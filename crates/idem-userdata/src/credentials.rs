//! Authentication credentials: passwords and hardware security keys
//!
//! Credentials are one closed sum type, [`Credential`], tagged in records by
//! `credential_type` and decoded by exhaustive matching, so a new kind is a
//! compile-time enumeration change. Credentials are verifiable (a proofing
//! workflow can confirm who registered them) but never primary; the
//! [`CredentialList`] only enforces key uniqueness.
//!
//! Passwords are keyed by their credential id. Security keys have no stored
//! id: their key is derived from the registration material, prefixed
//! `sha256:`, so two registrations of the same physical token collide.

use idem_core::record::{self, Record};
use idem_core::{
    Element, ElementError, ElementList, Provenance, Timestamp, VerificationState, VerifiedElement,
};
use sha2::{Digest, Sha256};

/// A salted password hash reference.
///
/// The actual hash lives in the authentication backend; this element carries
/// the id and salt the backend needs, plus provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Password {
    credential_id: String,
    salt: String,
    is_generated: bool,
    proofing_method: Option<String>,
    proofing_version: Option<String>,
    provenance: Provenance,
    verification: VerificationState,
}

impl Password {
    /// A new, user-chosen password credential created now.
    #[must_use]
    pub fn new(credential_id: &str, salt: &str) -> Self {
        Password {
            credential_id: credential_id.to_owned(),
            salt: salt.to_owned(),
            is_generated: false,
            proofing_method: None,
            proofing_version: None,
            provenance: Provenance::new(None, Timestamp::Now),
            verification: VerificationState::default(),
        }
    }

    /// Mark whether the password was generated for the user.
    #[must_use]
    pub fn with_generated(mut self, is_generated: bool) -> Self {
        self.is_generated = is_generated;
        self
    }

    /// Attach the proofing trail that vouches for this credential.
    #[must_use]
    pub fn with_proofing(mut self, method: &str, version: &str) -> Self {
        self.proofing_method = Some(method.to_owned());
        self.proofing_version = Some(version.to_owned());
        self
    }

    /// Replace the default provenance, for imports and replays.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Replace the default verification state.
    #[must_use]
    pub fn with_verification(mut self, verification: VerificationState) -> Self {
        self.verification = verification;
        self
    }

    /// Identifier of the stored hash in the authentication backend.
    #[must_use]
    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }

    /// Per-credential salt.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Whether the password was generated rather than user-chosen.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    fn take(mut record: Record) -> Result<Self, ElementError> {
        let credential_id = record::take_string(&mut record, "Password", "credential_id")?;
        let salt = record::take_string(&mut record, "Password", "salt")?;
        let is_generated = record::take_bool_or(&mut record, "is_generated", false)?;
        let proofing_method = record::take_opt_string(&mut record, "proofing_method")?;
        let proofing_version = record::take_opt_string(&mut record, "proofing_version")?;
        let provenance = Provenance::take(&mut record)?;
        let verification = VerificationState::take(&mut record)?;
        record::finish(&record, "Password")?;
        Ok(Password {
            credential_id,
            salt,
            is_generated,
            proofing_method,
            proofing_version,
            provenance,
            verification,
        })
    }

    fn write(&self, record: &mut Record) {
        record.insert(
            "credential_id".to_owned(),
            serde_json::Value::String(self.credential_id.clone()),
        );
        record.insert(
            "salt".to_owned(),
            serde_json::Value::String(self.salt.clone()),
        );
        record.insert(
            "is_generated".to_owned(),
            serde_json::Value::Bool(self.is_generated),
        );
        record::put_opt_string(record, "proofing_method", self.proofing_method.as_deref());
        record::put_opt_string(record, "proofing_version", self.proofing_version.as_deref());
        self.provenance.write(record);
        self.verification.write(record);
    }
}

/// A registered U2F security key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct U2fToken {
    keyhandle: String,
    app_id: String,
    description: String,
    version: String,
    public_key: String,
    attest_cert: Option<String>,
    proofing_method: Option<String>,
    proofing_version: Option<String>,
    provenance: Provenance,
    verification: VerificationState,
}

impl U2fToken {
    /// A new token from U2F registration material, created now.
    #[must_use]
    pub fn new(keyhandle: &str, app_id: &str, version: &str, public_key: &str) -> Self {
        U2fToken {
            keyhandle: keyhandle.to_owned(),
            app_id: app_id.to_owned(),
            description: String::new(),
            version: version.to_owned(),
            public_key: public_key.to_owned(),
            attest_cert: None,
            proofing_method: None,
            proofing_version: None,
            provenance: Provenance::new(None, Timestamp::Now),
            verification: VerificationState::default(),
        }
    }

    /// Attach the user's label for the token.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Attach the attestation certificate captured at registration.
    #[must_use]
    pub fn with_attest_cert(mut self, attest_cert: &str) -> Self {
        self.attest_cert = Some(attest_cert.to_owned());
        self
    }

    /// Attach the proofing trail that vouches for this credential.
    #[must_use]
    pub fn with_proofing(mut self, method: &str, version: &str) -> Self {
        self.proofing_method = Some(method.to_owned());
        self.proofing_version = Some(version.to_owned());
        self
    }

    /// Replace the default provenance, for imports and replays.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Replace the default verification state.
    #[must_use]
    pub fn with_verification(mut self, verification: VerificationState) -> Self {
        self.verification = verification;
        self
    }

    /// The key handle issued by the token.
    #[must_use]
    pub fn keyhandle(&self) -> &str {
        &self.keyhandle
    }

    /// The user's label for the token.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identifier derived from the registration material.
    #[must_use]
    pub fn derived_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.keyhandle.as_bytes());
        hasher.update(self.public_key.as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    fn take(mut record: Record) -> Result<Self, ElementError> {
        let keyhandle = record::take_string(&mut record, "U2fToken", "keyhandle")?;
        let app_id = record::take_string_or(&mut record, "app_id", "")?;
        let description = record::take_string_or(&mut record, "description", "")?;
        let version = record::take_string(&mut record, "U2fToken", "version")?;
        let public_key = record::take_string(&mut record, "U2fToken", "public_key")?;
        let attest_cert = record::take_opt_string(&mut record, "attest_cert")?;
        let proofing_method = record::take_opt_string(&mut record, "proofing_method")?;
        let proofing_version = record::take_opt_string(&mut record, "proofing_version")?;
        let provenance = Provenance::take(&mut record)?;
        let verification = VerificationState::take(&mut record)?;
        record::finish(&record, "U2fToken")?;
        Ok(U2fToken {
            keyhandle,
            app_id,
            description,
            version,
            public_key,
            attest_cert,
            proofing_method,
            proofing_version,
            provenance,
            verification,
        })
    }

    fn write(&self, record: &mut Record) {
        record.insert(
            "keyhandle".to_owned(),
            serde_json::Value::String(self.keyhandle.clone()),
        );
        record.insert(
            "app_id".to_owned(),
            serde_json::Value::String(self.app_id.clone()),
        );
        record.insert(
            "description".to_owned(),
            serde_json::Value::String(self.description.clone()),
        );
        record.insert(
            "version".to_owned(),
            serde_json::Value::String(self.version.clone()),
        );
        record.insert(
            "public_key".to_owned(),
            serde_json::Value::String(self.public_key.clone()),
        );
        record::put_opt_string(record, "attest_cert", self.attest_cert.as_deref());
        record::put_opt_string(record, "proofing_method", self.proofing_method.as_deref());
        record::put_opt_string(record, "proofing_version", self.proofing_version.as_deref());
        self.provenance.write(record);
        self.verification.write(record);
    }
}

/// A registered WebAuthn authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebauthnToken {
    keyhandle: String,
    app_id: String,
    description: String,
    credential_data: String,
    attest_obj: Option<String>,
    proofing_method: Option<String>,
    proofing_version: Option<String>,
    provenance: Provenance,
    verification: VerificationState,
}

impl WebauthnToken {
    /// A new authenticator from WebAuthn registration material, created now.
    #[must_use]
    pub fn new(keyhandle: &str, app_id: &str, credential_data: &str) -> Self {
        WebauthnToken {
            keyhandle: keyhandle.to_owned(),
            app_id: app_id.to_owned(),
            description: String::new(),
            credential_data: credential_data.to_owned(),
            attest_obj: None,
            proofing_method: None,
            proofing_version: None,
            provenance: Provenance::new(None, Timestamp::Now),
            verification: VerificationState::default(),
        }
    }

    /// Attach the user's label for the authenticator.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Attach the attestation object captured at registration.
    #[must_use]
    pub fn with_attest_obj(mut self, attest_obj: &str) -> Self {
        self.attest_obj = Some(attest_obj.to_owned());
        self
    }

    /// Attach the proofing trail that vouches for this credential.
    #[must_use]
    pub fn with_proofing(mut self, method: &str, version: &str) -> Self {
        self.proofing_method = Some(method.to_owned());
        self.proofing_version = Some(version.to_owned());
        self
    }

    /// Replace the default provenance, for imports and replays.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Replace the default verification state.
    #[must_use]
    pub fn with_verification(mut self, verification: VerificationState) -> Self {
        self.verification = verification;
        self
    }

    /// The credential id issued by the authenticator.
    #[must_use]
    pub fn keyhandle(&self) -> &str {
        &self.keyhandle
    }

    /// The user's label for the authenticator.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identifier derived from the registration material.
    #[must_use]
    pub fn derived_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.keyhandle.as_bytes());
        hasher.update(self.credential_data.as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    fn take(mut record: Record) -> Result<Self, ElementError> {
        let keyhandle = record::take_string(&mut record, "WebauthnToken", "keyhandle")?;
        let app_id = record::take_string_or(&mut record, "app_id", "")?;
        let description = record::take_string_or(&mut record, "description", "")?;
        let credential_data =
            record::take_string(&mut record, "WebauthnToken", "credential_data")?;
        let attest_obj = record::take_opt_string(&mut record, "attest_obj")?;
        let proofing_method = record::take_opt_string(&mut record, "proofing_method")?;
        let proofing_version = record::take_opt_string(&mut record, "proofing_version")?;
        let provenance = Provenance::take(&mut record)?;
        let verification = VerificationState::take(&mut record)?;
        record::finish(&record, "WebauthnToken")?;
        Ok(WebauthnToken {
            keyhandle,
            app_id,
            description,
            credential_data,
            attest_obj,
            proofing_method,
            proofing_version,
            provenance,
            verification,
        })
    }

    fn write(&self, record: &mut Record) {
        record.insert(
            "keyhandle".to_owned(),
            serde_json::Value::String(self.keyhandle.clone()),
        );
        record.insert(
            "app_id".to_owned(),
            serde_json::Value::String(self.app_id.clone()),
        );
        record.insert(
            "description".to_owned(),
            serde_json::Value::String(self.description.clone()),
        );
        record.insert(
            "credential_data".to_owned(),
            serde_json::Value::String(self.credential_data.clone()),
        );
        record::put_opt_string(record, "attest_obj", self.attest_obj.as_deref());
        record::put_opt_string(record, "proofing_method", self.proofing_method.as_deref());
        record::put_opt_string(record, "proofing_version", self.proofing_version.as_deref());
        self.provenance.write(record);
        self.verification.write(record);
    }
}

/// Any credential a user can authenticate with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A salted password hash reference.
    Password(Password),
    /// A U2F security key.
    U2f(U2fToken),
    /// A WebAuthn authenticator.
    Webauthn(WebauthnToken),
}

impl Credential {
    /// Proofing method recorded for this credential, if any.
    #[must_use]
    pub fn proofing_method(&self) -> Option<&str> {
        match self {
            Credential::Password(password) => password.proofing_method.as_deref(),
            Credential::U2f(token) => token.proofing_method.as_deref(),
            Credential::Webauthn(token) => token.proofing_method.as_deref(),
        }
    }

    /// Proofing method version recorded for this credential, if any.
    #[must_use]
    pub fn proofing_version(&self) -> Option<&str> {
        match self {
            Credential::Password(password) => password.proofing_version.as_deref(),
            Credential::U2f(token) => token.proofing_version.as_deref(),
            Credential::Webauthn(token) => token.proofing_version.as_deref(),
        }
    }

    fn credential_type(&self) -> &'static str {
        match self {
            Credential::Password(_) => "password",
            Credential::U2f(_) => "u2f",
            Credential::Webauthn(_) => "webauthn",
        }
    }

    fn verification_mut(&mut self) -> &mut VerificationState {
        match self {
            Credential::Password(password) => &mut password.verification,
            Credential::U2f(token) => &mut token.verification,
            Credential::Webauthn(token) => &mut token.verification,
        }
    }
}

impl Element for Credential {
    type Key = String;
    const NAME: &'static str = "Credential";

    fn key(&self) -> String {
        match self {
            Credential::Password(password) => password.credential_id.clone(),
            Credential::U2f(token) => token.derived_key(),
            Credential::Webauthn(token) => token.derived_key(),
        }
    }

    fn provenance(&self) -> &Provenance {
        match self {
            Credential::Password(password) => &password.provenance,
            Credential::U2f(token) => &token.provenance,
            Credential::Webauthn(token) => &token.provenance,
        }
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        match self {
            Credential::Password(password) => &mut password.provenance,
            Credential::U2f(token) => &mut token.provenance,
            Credential::Webauthn(token) => &mut token.provenance,
        }
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(
            "credential_type".to_owned(),
            serde_json::Value::String(self.credential_type().to_owned()),
        );
        match self {
            Credential::Password(password) => password.write(&mut record),
            Credential::U2f(token) => token.write(&mut record),
            Credential::Webauthn(token) => token.write(&mut record),
        }
        record
    }

    fn from_record(mut record: Record) -> Result<Self, ElementError> {
        let kind = record::take_string(&mut record, Self::NAME, "credential_type")?;
        match kind.as_str() {
            "password" => Password::take(record).map(Credential::Password),
            "u2f" => U2fToken::take(record).map(Credential::U2f),
            "webauthn" => WebauthnToken::take(record).map(Credential::Webauthn),
            other => Err(ElementError::InvalidValue {
                field: "credential_type",
                reason: format!("unrecognized credential kind {other:?}"),
            }),
        }
    }
}

impl VerifiedElement for Credential {
    fn verification(&self) -> &VerificationState {
        match self {
            Credential::Password(password) => &password.verification,
            Credential::U2f(token) => &token.verification,
            Credential::Webauthn(token) => &token.verification,
        }
    }

    fn set_verified(&mut self, value: bool) -> Result<(), ElementError> {
        self.verification_mut().set_verified(value);
        Ok(())
    }

    fn set_verified_by(&mut self, value: Option<String>) {
        self.verification_mut().set_verified_by(value);
    }

    fn set_verified_ts(&mut self, value: Option<Timestamp>) {
        self.verification_mut().set_verified_ts(value);
    }
}

/// A user's credentials, unique by key, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialList {
    inner: ElementList<Credential>,
}

impl CredentialList {
    /// Build a list from existing credentials; duplicates are rejected.
    ///
    /// # Errors
    ///
    /// `Duplicate` if two inputs share a key.
    pub fn new(credentials: Vec<Credential>) -> Result<Self, ElementError> {
        let mut list = CredentialList::default();
        for credential in credentials {
            list.add(credential)?;
        }
        Ok(list)
    }

    /// Look up a credential by key.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one credential shares the key.
    pub fn find(&self, key: &str) -> Result<Option<&Credential>, ElementError> {
        self.inner.find(&key.to_owned())
    }

    /// Look up a credential by key for in-place mutation, as proofing
    /// workflows do when they confirm a registration.
    ///
    /// # Errors
    ///
    /// `MultipleFound` if more than one credential shares the key.
    pub fn find_mut(&mut self, key: &str) -> Result<Option<&mut Credential>, ElementError> {
        self.inner.find_mut(&key.to_owned())
    }

    /// Append a credential.
    ///
    /// # Errors
    ///
    /// `Duplicate` if a credential with the same key is present.
    pub fn add(&mut self, credential: Credential) -> Result<&mut Self, ElementError> {
        if self.inner.find(&credential.key())?.is_some() {
            return Err(ElementError::Duplicate {
                key: credential.key(),
            });
        }
        self.inner.add(credential);
        Ok(self)
    }

    /// Remove the credential with the given key.
    ///
    /// # Errors
    ///
    /// `NotFound` if no credential has the key.
    pub fn remove(&mut self, key: &str) -> Result<(), ElementError> {
        self.inner.remove(&key.to_owned())
    }

    /// Number of credentials.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Whether the list holds no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the credentials in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Credential> {
        self.inner.iter()
    }

    /// The password credentials, in registration order.
    #[must_use]
    pub fn passwords(&self) -> Vec<&Password> {
        self.inner
            .iter()
            .filter_map(|credential| match credential {
                Credential::Password(password) => Some(password),
                _ => None,
            })
            .collect()
    }

    /// The hardware security keys (U2F and WebAuthn), in registration order.
    #[must_use]
    pub fn security_keys(&self) -> Vec<&Credential> {
        self.inner
            .iter()
            .filter(|credential| !matches!(credential, Credential::Password(_)))
            .collect()
    }

    /// Serialize every credential, in registration order.
    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.inner.to_records()
    }

    /// Reconstruct a list from a sequence of records.
    ///
    /// # Errors
    ///
    /// Decoding errors in input order, then `Duplicate` for repeated keys.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ElementError> {
        let credentials = records
            .into_iter()
            .map(Credential::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        CredentialList::new(credentials)
    }
}

impl<'a> IntoIterator for &'a CredentialList {
    type Item = &'a Credential;
    type IntoIter = std::slice::Iter<'a, Credential>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
