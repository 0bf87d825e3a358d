//! # Blockcerts v2 Credential Documents
//!
//! Input records, their validated forms, and the two document states of a
//! credential.
//!
//! ## Input records
//!
//! `IssuerRecord`, `AssertionRecord` and `RecipientRecord` are what callers
//! deserialize from configuration. Every field is optional at that level.
//! `TryFrom` converts each into its validated counterpart and fails with
//! [`ValidationError::MissingField`] naming the first absent required field
//! and the record kind. A blank string counts as absent.
//!
//! ## Documents
//!
//! - [`UnsignedCredential`]: the Open Badges v2 / Blockcerts v2 assertion.
//!   Its canonical bytes are the Merkle leaf payload.
//! - [`FinalizedCredential`]: the same document plus a `signature` member
//!   holding the [`MerkleProof2017`] record.

use bcert_core::{CanonicalBytes, CanonicalizationError, CredentialId, RecipientIdentity, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{RecordKind, ValidationError};
use crate::proof::MerkleProof2017;

/// JSON-LD contexts of a Blockcerts v2 assertion.
pub const BLOCKCERTS_V2_CONTEXT: [&str; 2] = [
    "https://w3id.org/openbadges/v2",
    "https://w3id.org/blockcerts/v2",
];

/// Return a required field's value, or a `MissingField` error.
fn required(
    value: Option<String>,
    kind: RecordKind,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { kind, field }),
    }
}

/// Pass an optional value through unchanged. Present but blank is an
/// `InvalidField` error; absent means the member is omitted.
fn optional(
    value: Option<String>,
    kind: RecordKind,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::InvalidField {
            kind,
            field,
            reason: "present but blank".to_string(),
        }),
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// Issuer
// ---------------------------------------------------------------------------

/// Raw issuer fields as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    /// Issuing key, e.g. `ecdsa-koblitz-pubkey:0x...`.
    pub public_key: Option<String>,
    pub image: Option<String>,
    pub revocation_list: Option<String>,
}

/// A validated issuer profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub url: String,
    pub public_key: String,
    pub image: Option<String>,
    pub revocation_list: Option<String>,
}

impl TryFrom<IssuerRecord> for Issuer {
    type Error = ValidationError;

    fn try_from(r: IssuerRecord) -> Result<Self, Self::Error> {
        let kind = RecordKind::Issuer;
        Ok(Self {
            id: required(r.id, kind, "id")?,
            name: required(r.name, kind, "name")?,
            email: required(r.email, kind, "email")?,
            url: required(r.url, kind, "url")?,
            public_key: required(r.public_key, kind, "public_key")?,
            image: optional(r.image, kind, "image")?,
            revocation_list: optional(r.revocation_list, kind, "revocation_list")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Assertion
// ---------------------------------------------------------------------------

/// Raw assertion (badge) fields as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssertionRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub criteria_narrative: Option<String>,
    pub image: Option<String>,
    pub display_html: Option<String>,
    /// RFC 3339 expiration time. Copied into credentials exactly as given.
    pub expires: Option<String>,
}

/// A validated assertion: what every credential in the batch attests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub criteria_narrative: String,
    pub image: Option<String>,
    pub display_html: Option<String>,
    /// Validated as RFC 3339, stored as written.
    pub expires: Option<String>,
}

impl TryFrom<AssertionRecord> for Assertion {
    type Error = ValidationError;

    fn try_from(r: AssertionRecord) -> Result<Self, Self::Error> {
        let kind = RecordKind::Assertion;
        let id = required(r.id, kind, "id")?;
        let name = required(r.name, kind, "name")?;
        let description = required(r.description, kind, "description")?;
        let criteria_narrative = required(r.criteria_narrative, kind, "criteria_narrative")?;
        let expires = optional(r.expires, kind, "expires")?;
        if let Some(value) = &expires {
            Timestamp::parse_lenient(value).map_err(|e| ValidationError::InvalidField {
                kind,
                field: "expires",
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            id,
            name,
            description,
            criteria_narrative,
            image: optional(r.image, kind, "image")?,
            display_html: optional(r.display_html, kind, "display_html")?,
            expires,
        })
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Raw recipient fields as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipientRecord {
    pub name: Option<String>,
    /// Email address (or other identity of `identity_type`).
    pub identity: Option<String>,
    /// Defaults to `email`.
    pub identity_type: Option<String>,
    /// Recipient key the credential is bound to.
    pub public_key: Option<String>,
}

/// A validated recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub identity: RecipientIdentity,
    pub identity_type: String,
    pub public_key: String,
}

impl TryFrom<RecipientRecord> for Recipient {
    type Error = ValidationError;

    fn try_from(r: RecipientRecord) -> Result<Self, Self::Error> {
        let kind = RecordKind::Recipient;
        Ok(Self {
            name: required(r.name, kind, "name")?,
            identity: RecipientIdentity::new(required(r.identity, kind, "identity")?),
            identity_type: optional(r.identity_type, kind, "identity_type")?
                .unwrap_or_else(|| "email".to_string()),
            public_key: required(r.public_key, kind, "public_key")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Document sections
// ---------------------------------------------------------------------------

/// `recipient` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityObject {
    #[serde(rename = "type")]
    pub identity_type: String,
    pub identity: RecipientIdentity,
    pub hashed: bool,
}

/// `recipientProfile` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientProfile {
    #[serde(rename = "type")]
    pub profile_type: Vec<String>,
    pub name: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// `badge.issuer` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub id: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub name: String,
    pub url: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    #[serde(rename = "revocationList", skip_serializing_if = "Option::is_none", default)]
    pub revocation_list: Option<String>,
}

/// `badge.criteria` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub narrative: String,
}

/// `badge` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeClass {
    pub id: String,
    #[serde(rename = "type")]
    pub badge_type: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub criteria: Criteria,
    pub issuer: IssuerProfile,
}

/// `verification` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(rename = "type")]
    pub verification_type: Vec<String>,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A Blockcerts v2 assertion before its proof is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub id: CredentialId,
    #[serde(rename = "issuedOn")]
    pub issued_on: Timestamp,
    pub recipient: IdentityObject,
    #[serde(rename = "recipientProfile")]
    pub recipient_profile: RecipientProfile,
    pub badge: BadgeClass,
    pub verification: Verification,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires: Option<String>,
    #[serde(rename = "displayHtml", skip_serializing_if = "Option::is_none", default)]
    pub display_html: Option<String>,
}

impl UnsignedCredential {
    /// Assemble the credential for one recipient.
    ///
    /// Issuer and assertion fields are copied verbatim; nothing here depends
    /// on other recipients or on Merkle processing.
    pub fn assemble(
        issuer: &Issuer,
        assertion: &Assertion,
        recipient: &Recipient,
        issued_on: Timestamp,
    ) -> Self {
        Self {
            context: BLOCKCERTS_V2_CONTEXT.iter().map(|s| s.to_string()).collect(),
            credential_type: "Assertion".to_string(),
            id: CredentialId::derive(&issuer.id, &assertion.id, &recipient.identity, &issued_on),
            issued_on,
            recipient: IdentityObject {
                identity_type: recipient.identity_type.clone(),
                identity: recipient.identity.clone(),
                hashed: false,
            },
            recipient_profile: RecipientProfile {
                profile_type: vec!["RecipientProfile".to_string(), "Extension".to_string()],
                name: recipient.name.clone(),
                public_key: recipient.public_key.clone(),
            },
            badge: BadgeClass {
                id: assertion.id.clone(),
                badge_type: "BadgeClass".to_string(),
                name: assertion.name.clone(),
                description: assertion.description.clone(),
                image: assertion.image.clone(),
                criteria: Criteria {
                    narrative: assertion.criteria_narrative.clone(),
                },
                issuer: IssuerProfile {
                    id: issuer.id.clone(),
                    profile_type: "Profile".to_string(),
                    name: issuer.name.clone(),
                    url: issuer.url.clone(),
                    email: issuer.email.clone(),
                    image: issuer.image.clone(),
                    revocation_list: issuer.revocation_list.clone(),
                },
            },
            verification: Verification {
                verification_type: vec![
                    "MerkleProofVerification2017".to_string(),
                    "Extension".to_string(),
                ],
                public_key: issuer.public_key.clone(),
            },
            expires: assertion.expires.clone(),
            display_html: assertion.display_html.clone(),
        }
    }

    /// Canonical bytes of this document: the Merkle leaf payload.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Attach a proof, producing the finalized credential.
    pub fn finalize(self, signature: MerkleProof2017) -> FinalizedCredential {
        FinalizedCredential {
            credential: self,
            signature,
        }
    }
}

/// An unsigned credential with its Merkle proof attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedCredential {
    #[serde(flatten)]
    pub credential: UnsignedCredential,
    pub signature: MerkleProof2017,
}

impl FinalizedCredential {
    /// The proof record.
    pub fn proof(&self) -> &MerkleProof2017 {
        &self.signature
    }

    /// The credential body the proof commits to.
    pub fn unsigned(&self) -> &UnsignedCredential {
        &self.credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_record() -> IssuerRecord {
        IssuerRecord {
            id: Some("https://issuer.example.org/profile.json".into()),
            name: Some("Example University".into()),
            email: Some("registrar@example.org".into()),
            url: Some("https://issuer.example.org".into()),
            public_key: Some("ecdsa-koblitz-pubkey:0x7e30a37763e6ba1ffede1750bbefb4c60b17a1b3".into()),
            image: None,
            revocation_list: Some("https://issuer.example.org/revocations.json".into()),
        }
    }

    fn assertion_record() -> AssertionRecord {
        AssertionRecord {
            id: Some("urn:uuid:0b6d5a0e-7c1a-4b3f-9e53-1c2d3e4f5a6b".into()),
            name: Some("Master of Rust".into()),
            description: Some("Awarded for ownership and borrowing.".into()),
            criteria_narrative: Some("Complete the systems curriculum.".into()),
            image: Some("data:image/png;base64,iVBORw0KGgo=".into()),
            display_html: Some("<h1>Master of Rust</h1>".into()),
            expires: Some("2030-01-01T00:00:00Z".into()),
        }
    }

    fn recipient_record() -> RecipientRecord {
        RecipientRecord {
            name: Some("Ada Lovelace".into()),
            identity: Some("ada@example.org".into()),
            identity_type: None,
            public_key: Some("ecdsa-koblitz-pubkey:0x11aa".into()),
        }
    }

    fn issued_on() -> Timestamp {
        Timestamp::parse("2026-03-01T09:00:00Z").unwrap()
    }

    #[test]
    fn test_issuer_missing_email() {
        let mut r = issuer_record();
        r.email = None;
        assert_eq!(
            Issuer::try_from(r).unwrap_err(),
            ValidationError::MissingField { kind: RecordKind::Issuer, field: "email" }
        );
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let mut r = recipient_record();
        r.identity = Some("   ".into());
        assert_eq!(
            Recipient::try_from(r).unwrap_err(),
            ValidationError::MissingField { kind: RecordKind::Recipient, field: "identity" }
        );
    }

    #[test]
    fn test_assertion_missing_criteria() {
        let mut r = assertion_record();
        r.criteria_narrative = None;
        assert_eq!(
            Assertion::try_from(r).unwrap_err(),
            ValidationError::MissingField {
                kind: RecordKind::Assertion,
                field: "criteria_narrative"
            }
        );
    }

    #[test]
    fn test_assertion_bad_expires() {
        let mut r = assertion_record();
        r.expires = Some("next tuesday".into());
        assert!(matches!(
            Assertion::try_from(r).unwrap_err(),
            ValidationError::InvalidField { field: "expires", .. }
        ));
    }

    #[test]
    fn test_expires_with_offset_kept_as_written() {
        let mut r = assertion_record();
        r.expires = Some("2030-01-01T00:00:00.750+02:00".into());
        let assertion = Assertion::try_from(r).unwrap();
        assert_eq!(assertion.expires.as_deref(), Some("2030-01-01T00:00:00.750+02:00"));

        let issuer = Issuer::try_from(issuer_record()).unwrap();
        let recipient = Recipient::try_from(recipient_record()).unwrap();
        let doc = UnsignedCredential::assemble(&issuer, &assertion, &recipient, issued_on());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["expires"], "2030-01-01T00:00:00.750+02:00");
    }

    #[test]
    fn test_blank_optional_field_rejected() {
        let mut r = issuer_record();
        r.image = Some("".into());
        assert_eq!(
            Issuer::try_from(r).unwrap_err(),
            ValidationError::InvalidField {
                kind: RecordKind::Issuer,
                field: "image",
                reason: "present but blank".into()
            }
        );

        let mut r = assertion_record();
        r.display_html = Some("  ".into());
        assert!(matches!(
            Assertion::try_from(r).unwrap_err(),
            ValidationError::InvalidField { field: "display_html", .. }
        ));
    }

    #[test]
    fn test_optional_values_not_trimmed() {
        let mut r = assertion_record();
        r.display_html = Some("  <p>indented</p>\n".into());
        let assertion = Assertion::try_from(r).unwrap();
        assert_eq!(assertion.display_html.as_deref(), Some("  <p>indented</p>\n"));
    }

    #[test]
    fn test_identity_type_defaults_to_email() {
        let recipient = Recipient::try_from(recipient_record()).unwrap();
        assert_eq!(recipient.identity_type, "email");
    }

    #[test]
    fn test_assembled_document_shape() {
        let issuer = Issuer::try_from(issuer_record()).unwrap();
        let assertion = Assertion::try_from(assertion_record()).unwrap();
        let recipient = Recipient::try_from(recipient_record()).unwrap();
        let doc = UnsignedCredential::assemble(&issuer, &assertion, &recipient, issued_on());
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["@context"][0], "https://w3id.org/openbadges/v2");
        assert_eq!(json["type"], "Assertion");
        assert_eq!(json["issuedOn"], "2026-03-01T09:00:00Z");
        assert_eq!(json["recipient"]["identity"], "ada@example.org");
        assert_eq!(json["recipient"]["hashed"], false);
        assert_eq!(json["recipientProfile"]["publicKey"], "ecdsa-koblitz-pubkey:0x11aa");
        assert_eq!(json["badge"]["issuer"]["name"], "Example University");
        assert_eq!(
            json["badge"]["issuer"]["revocationList"],
            "https://issuer.example.org/revocations.json"
        );
        assert_eq!(json["verification"]["publicKey"], issuer.public_key.as_str());
        assert_eq!(json["expires"], "2030-01-01T00:00:00Z");
        assert_eq!(json["displayHtml"], "<h1>Master of Rust</h1>");
        assert!(json["id"].as_str().unwrap().starts_with("urn:uuid:"));
        // Absent optional fields are omitted, not null.
        assert!(json["badge"]["issuer"].get("image").is_none());
    }

    #[test]
    fn test_canonical_bytes_stable() {
        let issuer = Issuer::try_from(issuer_record()).unwrap();
        let assertion = Assertion::try_from(assertion_record()).unwrap();
        let recipient = Recipient::try_from(recipient_record()).unwrap();
        let a = UnsignedCredential::assemble(&issuer, &assertion, &recipient, issued_on());
        let b = UnsignedCredential::assemble(&issuer, &assertion, &recipient, issued_on());
        assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn test_unsigned_document_roundtrips_through_json() {
        let issuer = Issuer::try_from(issuer_record()).unwrap();
        let assertion = Assertion::try_from(assertion_record()).unwrap();
        let recipient = Recipient::try_from(recipient_record()).unwrap();
        let doc = UnsignedCredential::assemble(&issuer, &assertion, &recipient, issued_on());
        let json = serde_json::to_string(&doc).unwrap();
        let back: UnsignedCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.canonical_bytes().unwrap(), doc.canonical_bytes().unwrap());
    }

    #[test]
    fn test_records_deserialize_from_yaml() {
        let yaml = "name: Ada Lovelace\nidentity: ada@example.org\npublic_key: ecdsa-koblitz-pubkey:0x11aa\n";
        let record: RecipientRecord = serde_yaml::from_str(yaml).unwrap();
        let recipient = Recipient::try_from(record).unwrap();
        assert_eq!(recipient.identity.as_str(), "ada@example.org");
    }
}
