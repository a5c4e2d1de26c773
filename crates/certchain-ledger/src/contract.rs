//! Certificate registry state machine: issuance, revocation, reads and
//! selector queries over the injected ledger store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use certchain_core::fingerprint_root;

use crate::context::TxContext;
use crate::error::{Error, Result};
use crate::events::{CertificateIssued, EventSink, NullEventSink};
use crate::store::{LedgerStore, Selector, WriteMeta};
use crate::types::{
    CertId, CertStatus, CertType, CertificateRecord, HistoryEntry, Role, DOC_TYPE_CERTIFICATE,
};

/// Reason recorded when a revoker supplies none
pub const DEFAULT_REVOKE_REASON: &str = "No reason provided";

const STATUS_SUCCESS: &str = "SUCCESS";

/// Caller input for certificate issuance
#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub cert_id: String,
    pub cert_hash: String,
    pub doc_ref: String,
    pub issuer_org: String,
    pub recipient_id: String,
    pub cert_type: String,
    /// JSON object of flat string-to-string pairs; empty string means none
    pub metadata_json: String,
}

/// Issuance acknowledgement returned to the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceipt {
    pub status: String,
    pub cert_id: CertId,
    pub fingerprint_root: String,
    pub tx_id: String,
    pub issued_at: String,
}

/// Revocation acknowledgement returned to the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeReceipt {
    pub status: String,
    pub cert_id: CertId,
    pub revoked_at: String,
}

/// The registry contract, generic over its storage and event seams
pub struct CertificateContract<S: LedgerStore, E: EventSink = NullEventSink> {
    store: S,
    events: E,
}

impl<S: LedgerStore> CertificateContract<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            events: NullEventSink,
        }
    }
}

impl<S: LedgerStore, E: EventSink> CertificateContract<S, E> {
    pub fn with_events(store: S, events: E) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issue a certificate under a new, unused id.
    ///
    /// The fingerprint root is always recomputed here from the record's own
    /// fields; caller-supplied roots are never trusted.
    pub fn create(&self, ctx: &TxContext<'_>, request: &CreateRequest) -> Result<CreateReceipt> {
        if !ctx.has_role(Role::Issuer) {
            return Err(Error::Unauthorized(
                "only issuers may create certificates".to_string(),
            ));
        }

        let cert_id = CertId::new(request.cert_id.as_str())?;
        require_non_empty("certHash", &request.cert_hash)?;
        require_non_empty("docRef", &request.doc_ref)?;
        require_non_empty("issuerOrg", &request.issuer_org)?;
        require_non_empty("recipientId", &request.recipient_id)?;
        let cert_type = CertType::parse(&request.cert_type)?;
        let metadata = parse_metadata(&request.metadata_json)?;

        if self.store.get(cert_id.as_str())?.is_some() {
            return Err(Error::AlreadyExists(cert_id.to_string()));
        }

        let tx_id = ctx.tx_id().to_string();
        let issued_at = ctx.tx_timestamp();
        let root = fingerprint_root(&[
            request.cert_hash.as_str(),
            cert_id.as_str(),
            request.issuer_org.as_str(),
            request.recipient_id.as_str(),
            tx_id.as_str(),
        ])?;

        let record = CertificateRecord {
            doc_type: DOC_TYPE_CERTIFICATE.to_string(),
            cert_id: cert_id.clone(),
            cert_hash: request.cert_hash.clone(),
            fingerprint_root: root.to_string(),
            tx_id: tx_id.clone(),
            doc_ref: request.doc_ref.clone(),
            issuer_org: request.issuer_org.clone(),
            recipient_id: request.recipient_id.clone(),
            cert_type,
            metadata,
            status: CertStatus::Active,
            issued_at: issued_at.clone(),
            revoked_at: None,
            revoke_reason: None,
        };
        self.put_record(ctx, &record)?;

        self.events.emit(CertificateIssued {
            cert_id: cert_id.clone(),
            cert_type,
            issuer_org: record.issuer_org.clone(),
            recipient_id: record.recipient_id.clone(),
            issued_at: issued_at.clone(),
        });
        info!(
            cert_id = %cert_id,
            tx_id = %tx_id,
            cert_type = %cert_type,
            "certificate issued"
        );

        Ok(CreateReceipt {
            status: STATUS_SUCCESS.to_string(),
            cert_id,
            fingerprint_root: record.fingerprint_root,
            tx_id,
            issued_at,
        })
    }

    /// Revoke an active certificate; the record stays on the ledger with
    /// its status flipped
    pub fn revoke(
        &self,
        ctx: &TxContext<'_>,
        cert_id: &str,
        reason: Option<&str>,
    ) -> Result<RevokeReceipt> {
        if !ctx.has_role(Role::Issuer) && !ctx.has_role(Role::Admin) {
            return Err(Error::Unauthorized(
                "only issuers or admins may revoke certificates".to_string(),
            ));
        }

        let mut record = self.read(cert_id)?;
        if record.status == CertStatus::Revoked {
            return Err(Error::AlreadyRevoked(cert_id.to_string()));
        }

        let revoked_at = ctx.tx_timestamp();
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REVOKE_REASON);
        record.status = CertStatus::Revoked;
        record.revoked_at = Some(revoked_at.clone());
        record.revoke_reason = Some(reason.to_string());
        self.put_record(ctx, &record)?;

        info!(cert_id = %record.cert_id, tx_id = ctx.tx_id(), reason, "certificate revoked");

        Ok(RevokeReceipt {
            status: STATUS_SUCCESS.to_string(),
            cert_id: record.cert_id,
            revoked_at,
        })
    }

    /// Fetch the current record for a certificate id
    pub fn read(&self, cert_id: &str) -> Result<CertificateRecord> {
        let cert_id = CertId::new(cert_id)?;
        let bytes = self
            .store
            .get(cert_id.as_str())?
            .ok_or_else(|| Error::NotFound(cert_id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Every committed version of a certificate's key, oldest first.
    ///
    /// Unknown ids yield an empty list rather than an error; absence of
    /// history is itself an answer.
    pub fn history(&self, cert_id: &str) -> Result<Vec<HistoryEntry>> {
        let cert_id = CertId::new(cert_id)?;
        self.store.history(cert_id.as_str())
    }

    /// All certificates issued to a recipient
    pub fn query_by_recipient(&self, recipient_id: &str) -> Result<Vec<CertificateRecord>> {
        require_non_empty("recipientId", recipient_id)?;
        self.query_field("recipientId", recipient_id)
    }

    /// All certificates issued by an organization
    pub fn query_by_issuer(&self, issuer_org: &str) -> Result<Vec<CertificateRecord>> {
        require_non_empty("issuerOrg", issuer_org)?;
        self.query_field("issuerOrg", issuer_org)
    }

    /// All certificates of a category; the argument parses like Create's
    pub fn query_by_type(&self, cert_type: &str) -> Result<Vec<CertificateRecord>> {
        let cert_type = CertType::parse(cert_type)?;
        self.query_field("certType", cert_type.as_str())
    }

    fn query_field(&self, field: &str, value: &str) -> Result<Vec<CertificateRecord>> {
        let selector = Selector::new()
            .field("docType", DOC_TYPE_CERTIFICATE)
            .field(field, value);
        let raw = self.store.query(&selector)?;
        debug!(field, value, matched = raw.len(), "selector query");
        raw.iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(Error::from))
            .collect()
    }

    pub(crate) fn put_record(&self, ctx: &TxContext<'_>, record: &CertificateRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        let meta = WriteMeta::new(ctx.tx_id(), ctx.tx_timestamp());
        self.store.put(record.cert_id.as_str(), &bytes, &meta)
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{name} is empty")));
    }
    Ok(())
}

/// Parse caller metadata: a JSON object whose values are all strings.
///
/// Empty input means no metadata. Nested objects, arrays, and non-string
/// scalars are rejected rather than coerced.
fn parse_metadata(metadata_json: &str) -> Result<BTreeMap<String, String>> {
    if metadata_json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: serde_json::Value = serde_json::from_str(metadata_json)
        .map_err(|e| Error::InvalidArgument(format!("metadata is not valid JSON: {e}")))?;
    let Some(obj) = value.as_object() else {
        return Err(Error::InvalidArgument(
            "metadata must be a JSON object".to_string(),
        ));
    };
    let mut metadata = BTreeMap::new();
    for (key, value) in obj {
        let Some(s) = value.as_str() else {
            return Err(Error::InvalidArgument(format!(
                "metadata value for {key} must be a string"
            )));
        };
        metadata.insert(key.clone(), s.to_string());
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FixedClock, StaticIdentity};
    use crate::events::MemoryEventSink;
    use crate::store::InMemoryLedgerStore;
    use chrono::{TimeZone, Utc};

    fn request(cert_id: &str) -> CreateRequest {
        CreateRequest {
            cert_id: cert_id.to_string(),
            cert_hash: "ab12cd34".to_string(),
            doc_ref: "QmDocRef123".to_string(),
            issuer_org: "Acme University".to_string(),
            recipient_id: "ID-999".to_string(),
            cert_type: "ACADEMIC".to_string(),
            metadata_json: r#"{"degree":"BSc","year":"2024"}"#.to_string(),
        }
    }

    fn contract() -> CertificateContract<InMemoryLedgerStore> {
        CertificateContract::new(InMemoryLedgerStore::new())
    }

    #[test]
    fn create_persists_active_record_with_recomputed_root() {
        let contract = contract();
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);

        let receipt = contract.create(&ctx, &request("CERT-001")).unwrap();
        assert_eq!(receipt.status, "SUCCESS");
        assert_eq!(receipt.tx_id, "tx-1");
        assert_eq!(receipt.issued_at, "2024-01-02T03:04:05.000Z");

        let record = contract.read("CERT-001").unwrap();
        assert_eq!(record.status, CertStatus::Active);
        assert_eq!(record.doc_type, DOC_TYPE_CERTIFICATE);
        assert_eq!(record.metadata["degree"], "BSc");

        let expected = fingerprint_root(&[
            "ab12cd34",
            "CERT-001",
            "Acme University",
            "ID-999",
            "tx-1",
        ])
        .unwrap();
        assert_eq!(record.fingerprint_root, expected.to_string());
        assert_eq!(receipt.fingerprint_root, expected.to_string());
    }

    #[test]
    fn create_requires_issuer_role() {
        let contract = contract();
        let clock = FixedClock::unavailable();

        let admin = StaticIdentity::admin();
        let ctx = TxContext::new("tx-1", &clock, &admin);
        let err = contract.create(&ctx, &request("CERT-001")).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        let nobody = StaticIdentity::anonymous();
        let ctx = TxContext::new("tx-2", &clock, &nobody);
        assert!(contract.create(&ctx, &request("CERT-001")).is_err());
        assert!(contract.read("CERT-001").is_err());
    }

    #[test]
    fn duplicate_create_leaves_first_record_intact() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();

        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let mut second = request("CERT-001");
        second.cert_hash = "ffff0000".to_string();
        let ctx = TxContext::new("tx-2", &clock, &issuer);
        let err = contract.create(&ctx, &second).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        let record = contract.read("CERT-001").unwrap();
        assert_eq!(record.cert_hash, "ab12cd34");
        assert_eq!(record.tx_id, "tx-1");
        assert_eq!(contract.history("CERT-001").unwrap().len(), 1);
    }

    #[test]
    fn create_rejects_bad_arguments() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);

        let mut bad = request("  ");
        assert!(matches!(
            contract.create(&ctx, &bad).unwrap_err(),
            Error::InvalidArgument(_)
        ));

        bad = request("CERT-001");
        bad.cert_hash = String::new();
        assert!(contract.create(&ctx, &bad).is_err());

        bad = request("CERT-001");
        bad.cert_type = "DIPLOMA".to_string();
        assert!(contract.create(&ctx, &bad).is_err());

        bad = request("CERT-001");
        bad.metadata_json = r#"{"depth":{"nested":"no"}}"#.to_string();
        assert!(matches!(
            contract.create(&ctx, &bad).unwrap_err(),
            Error::InvalidArgument(_)
        ));

        bad = request("CERT-001");
        bad.metadata_json = r#"["a","b"]"#.to_string();
        assert!(contract.create(&ctx, &bad).is_err());

        bad = request("CERT-001");
        bad.metadata_json = r#"{"count":3}"#.to_string();
        assert!(contract.create(&ctx, &bad).is_err());
    }

    #[test]
    fn empty_metadata_is_allowed() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);

        let mut req = request("CERT-001");
        req.metadata_json = String::new();
        contract.create(&ctx, &req).unwrap();
        assert!(contract.read("CERT-001").unwrap().metadata.is_empty());
    }

    #[test]
    fn revoke_flips_status_and_records_reason() {
        let contract = contract();
        let issuer = StaticIdentity::issuer();
        let create_clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let ctx = TxContext::new("tx-1", &create_clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let revoke_clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let ctx = TxContext::new("tx-2", &revoke_clock, &issuer);
        let receipt = contract
            .revoke(&ctx, "CERT-001", Some("Degree rescinded"))
            .unwrap();
        assert_eq!(receipt.status, "SUCCESS");
        assert_eq!(receipt.revoked_at, "2024-06-01T12:00:00.000Z");

        let record = contract.read("CERT-001").unwrap();
        assert_eq!(record.status, CertStatus::Revoked);
        assert_eq!(record.revoked_at.as_deref(), Some("2024-06-01T12:00:00.000Z"));
        assert_eq!(record.revoke_reason.as_deref(), Some("Degree rescinded"));
        assert_eq!(record.cert_hash, "ab12cd34");
        assert_eq!(record.issued_at, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn revoke_defaults_reason_when_missing_or_blank() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();

        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();
        let ctx = TxContext::new("tx-2", &clock, &issuer);
        contract.create(&ctx, &request("CERT-002")).unwrap();

        let ctx = TxContext::new("tx-3", &clock, &issuer);
        contract.revoke(&ctx, "CERT-001", None).unwrap();
        let ctx = TxContext::new("tx-4", &clock, &issuer);
        contract.revoke(&ctx, "CERT-002", Some("   ")).unwrap();

        for id in ["CERT-001", "CERT-002"] {
            let record = contract.read(id).unwrap();
            assert_eq!(record.revoke_reason.as_deref(), Some(DEFAULT_REVOKE_REASON));
        }
    }

    #[test]
    fn revoke_allows_admin_and_rejects_others() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let nobody = StaticIdentity::anonymous();
        let ctx = TxContext::new("tx-2", &clock, &nobody);
        assert!(matches!(
            contract.revoke(&ctx, "CERT-001", None).unwrap_err(),
            Error::Unauthorized(_)
        ));

        let admin = StaticIdentity::admin();
        let ctx = TxContext::new("tx-3", &clock, &admin);
        contract.revoke(&ctx, "CERT-001", None).unwrap();
    }

    #[test]
    fn double_revoke_is_rejected() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let ctx = TxContext::new("tx-2", &clock, &issuer);
        contract.revoke(&ctx, "CERT-001", None).unwrap();

        let ctx = TxContext::new("tx-3", &clock, &issuer);
        let err = contract.revoke(&ctx, "CERT-001", None).unwrap_err();
        assert!(matches!(err, Error::AlreadyRevoked(_)));
        assert_eq!(contract.history("CERT-001").unwrap().len(), 2);
    }

    #[test]
    fn revoke_unknown_certificate_is_not_found() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);

        let err = contract.revoke(&ctx, "CERT-404", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn history_orders_versions_and_is_empty_for_unknown() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();

        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();
        let ctx = TxContext::new("tx-2", &clock, &issuer);
        contract.revoke(&ctx, "CERT-001", None).unwrap();

        let history = contract.history("CERT-001").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].tx_id, "tx-1");
        assert_eq!(history[0].value["status"], "ACTIVE");
        assert_eq!(history[1].tx_id, "tx-2");
        assert_eq!(history[1].value["status"], "REVOKED");

        assert!(contract.history("CERT-404").unwrap().is_empty());
    }

    #[test]
    fn queries_filter_by_field() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();

        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let mut other = request("CERT-002");
        other.recipient_id = "ID-111".to_string();
        other.issuer_org = "Globex Corp".to_string();
        other.cert_type = "CORPORATE".to_string();
        let ctx = TxContext::new("tx-2", &clock, &issuer);
        contract.create(&ctx, &other).unwrap();

        let by_recipient = contract.query_by_recipient("ID-999").unwrap();
        assert_eq!(by_recipient.len(), 1);
        assert_eq!(by_recipient[0].cert_id.as_str(), "CERT-001");

        let by_issuer = contract.query_by_issuer("Globex Corp").unwrap();
        assert_eq!(by_issuer.len(), 1);
        assert_eq!(by_issuer[0].cert_id.as_str(), "CERT-002");

        let by_type = contract.query_by_type("corporate").unwrap();
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].cert_type, CertType::Corporate);

        assert!(contract.query_by_recipient("ID-404").unwrap().is_empty());
        assert!(contract.query_by_type("DIPLOMA").is_err());
    }

    #[test]
    fn create_emits_exactly_one_event() {
        let contract = CertificateContract::with_events(
            InMemoryLedgerStore::new(),
            MemoryEventSink::new(),
        );
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap();

        let ctx = TxContext::new("tx-2", &clock, &issuer);
        contract.create(&ctx, &request("CERT-001")).unwrap_err();

        let events = contract.events.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].cert_id.as_str(), "CERT-001");
        assert_eq!(events[0].cert_type, CertType::Academic);
    }

    #[test]
    fn unavailable_clock_stamps_epoch() {
        let contract = contract();
        let clock = FixedClock::unavailable();
        let issuer = StaticIdentity::issuer();
        let ctx = TxContext::new("tx-1", &clock, &issuer);

        let receipt = contract.create(&ctx, &request("CERT-001")).unwrap();
        assert_eq!(receipt.issued_at, "1970-01-01T00:00:00.000Z");
    }
}
