#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! # certchain-core
//!
//! Integrity primitives for the certchain certificate registry.
//!
//! This crate provides:
//! - SHA-256 hashing and the [`Hash`] digest type
//! - The certificate content digest ([`content_hash`])
//! - The per-certificate fingerprint tree ([`fingerprint_root`])
//!
//! Everything here is pure and deterministic: no randomness, no I/O, no
//! clock reads.
//!
//! ## Quick Start
//!
//! ```rust
//! use certchain_core::{fingerprint_root, sha256};
//!
//! let digest = sha256(b"hello world");
//! assert_eq!(digest.as_bytes().len(), 32);
//!
//! let root = fingerprint_root(&["certHash", "CERT-1", "Acme U", "ID-1", "tx-1"]).unwrap();
//! assert_eq!(root.to_hex().len(), 64);
//! ```

pub mod error;
pub mod fingerprint;
pub mod hashing;

pub use error::{Error, Result};
pub use fingerprint::{fingerprint_root, leaf_digest, pair_digest};
pub use hashing::{content_hash, sha256, sha256_hex, Hash};
