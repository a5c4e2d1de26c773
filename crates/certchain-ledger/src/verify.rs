//! Verification protocol: compare presented evidence against the ledger
//! record and render a verdict.
//!
//! A mismatch is a verdict, never an error; only a missing record or a
//! failed proof extraction aborts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use certchain_proof::ProofPayload;

use crate::contract::CertificateContract;
use crate::error::Result;
use crate::events::EventSink;
use crate::store::LedgerStore;
use crate::types::{CertId, CertStatus, CertType, CertificateRecord};

/// Outcome of a verification check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Verified,
    Revoked,
    Tampered,
}

/// Full verification answer, echoing the ledger record's identity fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub status: VerdictStatus,
    pub valid: bool,
    pub cert_id: CertId,
    pub issuer_org: String,
    pub recipient_id: String,
    pub cert_type: CertType,
    pub issued_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke_reason: Option<String>,
    pub message: String,
    /// Proof payload recovered from a scanned document, when one was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_certificate: Option<ProofPayload>,
}

impl Verdict {
    fn from_record(record: &CertificateRecord, status: VerdictStatus, message: String) -> Self {
        Self {
            status,
            valid: status == VerdictStatus::Verified,
            cert_id: record.cert_id.clone(),
            issuer_org: record.issuer_org.clone(),
            recipient_id: record.recipient_id.clone(),
            cert_type: record.cert_type,
            issued_at: record.issued_at.clone(),
            revoked_at: record.revoked_at.clone(),
            revoke_reason: record.revoke_reason.clone(),
            message,
            scanned_certificate: None,
        }
    }
}

impl<S: LedgerStore, E: EventSink> CertificateContract<S, E> {
    /// Check a presented content hash against the ledger record
    pub fn verify_by_hash(&self, cert_id: &str, presented_hash: &str) -> Result<Verdict> {
        let record = self.read(cert_id)?;
        let matches = record.cert_hash == presented_hash;
        Ok(verdict_for(&record, matches, "certificate hash"))
    }

    /// Check a presented fingerprint root against the ledger record
    pub fn verify_by_fingerprint_root(&self, cert_id: &str, presented_root: &str) -> Result<Verdict> {
        let record = self.read(cert_id)?;
        let matches = record.fingerprint_root == presented_root;
        Ok(verdict_for(&record, matches, "fingerprint root"))
    }

    /// Extract the embedded proof from a document and verify its hash.
    ///
    /// Extraction runs before any ledger read; a document with no
    /// recoverable proof never touches the store.
    pub fn verify_by_document(&self, document: &[u8]) -> Result<Verdict> {
        let payload = certchain_proof::extract(document)?;
        debug!(cert_id = %payload.cert_id, "proof extracted from document");
        let mut verdict = self.verify_by_hash(&payload.cert_id, &payload.hash)?;
        verdict.scanned_certificate = Some(payload);
        Ok(verdict)
    }
}

/// Revocation dominates: a revoked certificate reports REVOKED even when
/// the presented evidence matches the record
fn verdict_for(record: &CertificateRecord, matches: bool, subject: &str) -> Verdict {
    if record.status == CertStatus::Revoked {
        let reason = record
            .revoke_reason
            .as_deref()
            .unwrap_or(crate::contract::DEFAULT_REVOKE_REASON);
        return Verdict::from_record(
            record,
            VerdictStatus::Revoked,
            format!("Certificate has been revoked: {reason}"),
        );
    }
    if !matches {
        return Verdict::from_record(
            record,
            VerdictStatus::Tampered,
            format!("Presented {subject} does not match the ledger record"),
        );
    }
    Verdict::from_record(
        record,
        VerdictStatus::Verified,
        "Certificate is valid".to_string(),
    )
}
