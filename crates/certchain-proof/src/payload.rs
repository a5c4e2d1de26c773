use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The verification payload embedded in an issued document.
///
/// Wire form is a JSON object with exactly the keys `certId`, `hash`,
/// `issuer`, `recipient`; no other keys are defined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProofPayload {
    pub cert_id: String,
    pub hash: String,
    pub issuer: String,
    pub recipient: String,
}

impl ProofPayload {
    pub fn new(
        cert_id: impl Into<String>,
        hash: impl Into<String>,
        issuer: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            cert_id: cert_id.into(),
            hash: hash.into(),
            issuer: issuer.into(),
            recipient: recipient.into(),
        }
    }

    /// Check the fields a token is allowed to carry: non-empty strings and
    /// an unprefixed lowercase 256-bit hex digest.
    pub fn validate(&self) -> Result<()> {
        if self.cert_id.trim().is_empty() {
            return Err(Error::InvalidPayload("certId is empty".to_string()));
        }
        if self.issuer.trim().is_empty() {
            return Err(Error::InvalidPayload("issuer is empty".to_string()));
        }
        if self.recipient.trim().is_empty() {
            return Err(Error::InvalidPayload("recipient is empty".to_string()));
        }
        if self.hash.starts_with("0x") || self.hash != self.hash.to_ascii_lowercase() {
            return Err(Error::InvalidPayload(
                "hash must be unprefixed lowercase hex".to_string(),
            ));
        }
        certchain_core::Hash::from_hex(&self.hash)
            .map_err(|e| Error::InvalidPayload(format!("hash: {e}")))?;
        Ok(())
    }
}
