use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Discriminator stored on every record, used by selector queries
pub const DOC_TYPE_CERTIFICATE: &str = "certificate";

/// Ledger key for a certificate record
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertId(String);

impl CertId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument("certId is empty".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Certificate category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertType {
    Academic,
    Legal,
    Government,
    Corporate,
}

impl CertType {
    /// Parse caller input; matching is case-insensitive
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACADEMIC" => Ok(Self::Academic),
            "LEGAL" => Ok(Self::Legal),
            "GOVERNMENT" => Ok(Self::Government),
            "CORPORATE" => Ok(Self::Corporate),
            other => Err(Error::InvalidArgument(format!(
                "unknown certType: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "ACADEMIC",
            Self::Legal => "LEGAL",
            Self::Government => "GOVERNMENT",
            Self::Corporate => "CORPORATE",
        }
    }
}

impl std::fmt::Display for CertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate lifecycle state; the only transition is ACTIVE to REVOKED
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertStatus {
    Active,
    Revoked,
}

/// Caller roles recognized by the contract and its calling layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Issuer,
    Admin,
    Recipient,
}

/// The persisted certificate record, the sole entity the contract owns.
///
/// `certHash` and `fingerprintRoot` are write-once at creation; `status`
/// only ever moves ACTIVE to REVOKED.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CertificateRecord {
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    pub cert_id: CertId,
    pub cert_hash: String,
    pub fingerprint_root: String,
    pub tx_id: String,
    pub doc_ref: String,
    pub issuer_org: String,
    pub recipient_id: String,
    pub cert_type: CertType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub status: CertStatus,
    pub issued_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke_reason: Option<String>,
}

fn default_doc_type() -> String {
    DOC_TYPE_CERTIFICATE.to_string()
}

/// One committed version of a ledger key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub tx_id: String,
    pub timestamp: String,
    pub is_delete: bool,
    /// Best-effort JSON decode of the committed value; non-JSON bytes keep
    /// a string rendering
    pub value: serde_json::Value,
}
