//! Issuance notifications surfaced to the hosting platform.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::{CertId, CertType};

/// Payload published when a certificate is committed to the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CertificateIssued {
    pub cert_id: CertId,
    pub cert_type: CertType,
    pub issuer_org: String,
    pub recipient_id: String,
    pub issued_at: String,
}

/// Event delivery seam; the hosting platform decides transport and fan-out
pub trait EventSink: Send + Sync {
    fn emit(&self, event: CertificateIssued);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: CertificateIssued) {
        (**self).emit(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn emit(&self, event: CertificateIssued) {
        (**self).emit(event);
    }
}

/// Sink that drops every event, for callers without an event bus
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: CertificateIssued) {}
}

/// Sink that buffers events in memory, for tests and embedded harnesses
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<CertificateIssued>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered event, leaving the sink empty
    pub fn drain(&self) -> Vec<CertificateIssued> {
        let mut events = self.lock();
        std::mem::take(&mut *events)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CertificateIssued>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: CertificateIssued) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> CertificateIssued {
        CertificateIssued {
            cert_id: CertId::new(id).unwrap(),
            cert_type: CertType::Academic,
            issuer_org: "Acme U".to_string(),
            recipient_id: "ID-999".to_string(),
            issued_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn memory_sink_buffers_and_drains() {
        let sink = MemoryEventSink::new();
        assert!(sink.is_empty());

        sink.emit(sample("CERT-1"));
        sink.emit(sample("CERT-2"));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].cert_id.as_str(), "CERT-1");
        assert!(sink.is_empty());
    }

    #[test]
    fn event_serializes_camel_case() {
        let json = serde_json::to_string(&sample("CERT-1")).unwrap();
        assert!(json.contains("\"certId\":\"CERT-1\""));
        assert!(json.contains("\"certType\":\"ACADEMIC\""));
        assert!(json.contains("\"issuerOrg\""));
        assert!(json.contains("\"issuedAt\""));
    }

    #[test]
    fn null_sink_accepts_events() {
        NullEventSink.emit(sample("CERT-1"));
    }
}
