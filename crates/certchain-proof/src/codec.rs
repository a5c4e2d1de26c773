//! Sentinel-framed proof token encode/decode.
//!
//! Token text form: `-----CERTCHAIN PROOF v1:<base64 payload>-----`. The
//! base64 body is the STANDARD-alphabet encoding of the payload JSON. The
//! codec treats the rendered document as opaque bytes: embedding appends
//! the token to the byte stream and extraction scans for the frame.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::payload::ProofPayload;

/// Opens a proof frame; the base64 body runs until [`FRAME_END`]
pub const FRAME_START: &str = "-----CERTCHAIN PROOF v1:";
/// Closes a proof frame
pub const FRAME_END: &str = "-----";

/// A rendered proof token, ready to embed into a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofToken {
    text: String,
}

impl ProofToken {
    /// Encode a payload into its framed token form.
    ///
    /// The payload is validated first so a malformed digest never reaches
    /// an issued document.
    pub fn encode(payload: &ProofPayload) -> Result<Self> {
        payload.validate()?;
        let json =
            serde_json::to_string(payload).map_err(|e| Error::InvalidPayload(e.to_string()))?;
        let body = STANDARD.encode(json.as_bytes());
        Ok(Self {
            text: format!("{FRAME_START}{body}{FRAME_END}"),
        })
    }

    /// The token text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Append the token to a rendered document's byte stream
    pub fn embed_into(&self, document: &mut Vec<u8>) {
        if !document.is_empty() && document.last() != Some(&b'\n') {
            document.push(b'\n');
        }
        document.extend_from_slice(self.text.as_bytes());
        document.push(b'\n');
    }
}

impl std::fmt::Display for ProofToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Extract a proof payload from a rendered document.
///
/// Scans for the last proof frame in the byte stream. Every failure mode
/// (no frame, truncated frame, bad base64, malformed or wrong-shaped JSON)
/// reports as [`Error::NoProofFound`].
pub fn extract(document: &[u8]) -> Result<ProofPayload> {
    let start = find_last(document, FRAME_START.as_bytes())
        .ok_or_else(|| Error::NoProofFound("no proof frame in document".to_string()))?;

    let rest = &document[start + FRAME_START.len()..];
    // The base64 alphabet has no '-', so the first FRAME_END match closes
    // the frame.
    let body_len = find_first(rest, FRAME_END.as_bytes())
        .ok_or_else(|| Error::NoProofFound("unterminated proof frame".to_string()))?;

    let body = std::str::from_utf8(&rest[..body_len])
        .map_err(|_| Error::NoProofFound("proof frame is not UTF-8".to_string()))?;
    let json = STANDARD
        .decode(body.trim())
        .map_err(|e| Error::NoProofFound(format!("bad base64 body: {e}")))?;
    serde_json::from_slice(&json).map_err(|e| Error::NoProofFound(format!("bad payload JSON: {e}")))
}

fn find_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
