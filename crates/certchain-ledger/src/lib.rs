//! Certificate registry state machine and verification protocol.
//!
//! The contract owns one entity, the certificate record, keyed by its
//! certificate id in an injected [`LedgerStore`]. Issuance computes a
//! fingerprint root over the record's identity fields and anchors it in
//! the record; verification compares presented evidence (a content hash,
//! a fingerprint root, or a proof extracted from a rendered document)
//! against the committed record and renders a verdict.
//!
//! All timing comes from the transaction context so replicated executions
//! derive identical records.
//!
//! # Quick Start
//!
//! ```
//! use certchain_ledger::{
//!     CertificateContract, CreateRequest, FixedClock, InMemoryLedgerStore,
//!     StaticIdentity, TxContext,
//! };
//!
//! # fn main() -> certchain_ledger::Result<()> {
//! let contract = CertificateContract::new(InMemoryLedgerStore::new());
//! let clock = FixedClock::unavailable();
//! let issuer = StaticIdentity::issuer();
//! let ctx = TxContext::new("tx-1", &clock, &issuer);
//!
//! let receipt = contract.create(&ctx, &CreateRequest {
//!     cert_id: "CERT-001".into(),
//!     cert_hash: "ab12cd34".into(),
//!     doc_ref: "QmDocRef123".into(),
//!     issuer_org: "Acme University".into(),
//!     recipient_id: "ID-999".into(),
//!     cert_type: "ACADEMIC".into(),
//!     metadata_json: String::new(),
//! })?;
//! assert_eq!(receipt.status, "SUCCESS");
//!
//! let verdict = contract.verify_by_hash("CERT-001", "ab12cd34")?;
//! assert!(verdict.valid);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod context;
pub mod contract;
pub mod error;
pub mod events;
pub mod store;
pub mod surface;
pub mod types;
pub mod verify;

pub use context::{ClientIdentity, DeterministicClock, FixedClock, StaticIdentity, TxContext};
pub use contract::{
    CertificateContract, CreateReceipt, CreateRequest, RevokeReceipt, DEFAULT_REVOKE_REASON,
};
pub use error::{Error, Result};
pub use events::{CertificateIssued, EventSink, MemoryEventSink, NullEventSink};
pub use store::{InMemoryLedgerStore, LedgerStore, Selector, WriteMeta};
pub use surface::invoke;
pub use types::{
    CertId, CertStatus, CertType, CertificateRecord, HistoryEntry, Role, DOC_TYPE_CERTIFICATE,
};
pub use verify::{Verdict, VerdictStatus};

#[cfg(feature = "sqlite")]
pub use store::SqliteLedgerStore;
