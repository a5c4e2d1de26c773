#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! # certchain-proof
//!
//! Document proof codec for the certchain registry.
//!
//! Issued documents carry a machine-readable payload identifying the
//! certificate they belong to. This crate owns that encode/decode
//! boundary: framing a [`ProofPayload`] into a token, embedding it into
//! rendered document bytes, and recovering it later. The codec holds no
//! ledger state; verification lives with the ledger contract.
//!
//! ## Quick Start
//!
//! ```rust
//! use certchain_proof::{extract, ProofPayload, ProofToken};
//!
//! let payload = ProofPayload::new(
//!     "CERT-001",
//!     certchain_core::sha256_hex(b"certificate content"),
//!     "Acme U",
//!     "ID-999",
//! );
//!
//! let mut document = b"rendered certificate".to_vec();
//! ProofToken::encode(&payload).unwrap().embed_into(&mut document);
//!
//! assert_eq!(extract(&document).unwrap(), payload);
//! ```

pub mod codec;
pub mod error;
pub mod payload;

pub use codec::{extract, ProofToken, FRAME_END, FRAME_START};
pub use error::{Error, Result};
pub use payload::ProofPayload;
