//! Per-certificate fingerprint tree.
//!
//! The tree is built bottom-up over an ordered leaf set:
//! - each leaf string is hashed individually;
//! - a parent is the SHA-256 of the UTF-8 concatenation of its children's
//!   lowercase hex renderings (hex-string concatenation, not raw bytes);
//! - an odd node at a level is paired with itself.
//!
//! Roots already recorded on the ledger were produced with exactly these
//! rules, so they are load-bearing for verification.

use crate::error::{Error, Result};
use crate::hashing::{sha256, Hash};

/// Hash a single leaf string
pub fn leaf_digest(leaf: &str) -> Hash {
    sha256(leaf.as_bytes())
}

/// Combine two digests into their parent node
pub fn pair_digest(left: &Hash, right: &Hash) -> Hash {
    let mut combined = String::with_capacity(128);
    combined.push_str(&left.to_hex());
    combined.push_str(&right.to_hex());
    sha256(combined.as_bytes())
}

/// Compute the fingerprint root over an ordered leaf set.
///
/// A single leaf is its own root. The leaf set is always the fixed 5-tuple
/// of one certificate's fields, so an empty input is a caller bug.
///
/// # Examples
///
/// ```rust
/// use certchain_core::fingerprint_root;
///
/// let root = fingerprint_root(&["certHash", "CERT-1", "Acme U", "ID-1", "tx-1"]).unwrap();
/// assert_eq!(root.to_hex().len(), 64);
/// ```
pub fn fingerprint_root<T: AsRef<str>>(leaves: &[T]) -> Result<Hash> {
    if leaves.is_empty() {
        return Err(Error::EmptyLeafSet);
    }

    let mut current: Vec<Hash> = leaves.iter().map(|l| leaf_digest(l.as_ref())).collect();

    while current.len() > 1 {
        let mut next: Vec<Hash> = Vec::with_capacity(current.len().div_ceil(2));
        let mut i = 0;
        while i < current.len() {
            if i + 1 < current.len() {
                next.push(pair_digest(&current[i], &current[i + 1]));
            } else {
                // Odd node pairs with itself.
                next.push(pair_digest(&current[i], &current[i]));
            }
            i += 2;
        }
        current = next;
    }

    Ok(current[0])
}
