//! # Identifier Newtypes
//!
//! `CredentialId` and `RecipientIdentity` keep the two identifier namespaces
//! of a batch apart: the credential's own `urn:uuid` and the recipient key the
//! finished batch is indexed by.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::temporal::Timestamp;

/// Namespace for credential ids derived with UUID v5.
const CREDENTIAL_NAMESPACE: Uuid = Uuid::from_u128(0x6b1c_0f4e_93d2_5a7e_8c11_2f9a_d0e4_b7c3);

/// Identifier of one issued credential, rendered as `urn:uuid:<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CredentialId(Uuid);

impl CredentialId {
    /// Derive the id of a credential from the inputs that make it unique
    /// within an issuer's history.
    ///
    /// The same issuer, assertion, recipient and issuance time always give
    /// the same id.
    pub fn derive(
        issuer_id: &str,
        assertion_id: &str,
        recipient: &RecipientIdentity,
        issued_on: &Timestamp,
    ) -> Self {
        let name = format!(
            "{issuer_id}\n{assertion_id}\n{}\n{}",
            recipient.as_str(),
            issued_on.to_iso8601()
        );
        Self(Uuid::new_v5(&CREDENTIAL_NAMESPACE, name.as_bytes()))
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse `urn:uuid:<uuid>` or a bare UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        let bare = s.strip_prefix("urn:uuid:").unwrap_or(s);
        Uuid::parse_str(bare).map(Self)
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "urn:uuid:{}", self.0)
    }
}

impl Serialize for CredentialId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CredentialId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// The identity a recipient is addressed by (usually an email address).
///
/// Finalized credentials are keyed by this value, so it must be unique
/// within a batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientIdentity(String);

impl RecipientIdentity {
    /// Wrap a recipient identity string.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Access the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
