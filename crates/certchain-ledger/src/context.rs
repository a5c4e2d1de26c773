//! Per-transaction seams: caller identity and the deterministic clock.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::Role;

/// Caller identity seam; the contract only asks role membership questions
pub trait ClientIdentity: Send + Sync {
    fn has_role(&self, role: Role) -> bool;
}

/// Fixed role set, for callers that resolve identity upstream and for tests
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity {
    roles: Vec<Role>,
}

impl StaticIdentity {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn issuer() -> Self {
        Self::new([Role::Issuer])
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }

    /// An identity holding no roles at all
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl ClientIdentity for StaticIdentity {
    fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Deterministic transaction time seam.
///
/// Ledger execution may be replayed on independent nodes, and every
/// replica must derive the same timestamp for the same transaction, so the
/// contract never reads wall-clock time.
pub trait DeterministicClock: Send + Sync {
    /// The transaction's agreed time, if the platform supplied one
    fn tx_time(&self) -> Option<DateTime<Utc>>;
}

/// Clock pinned to a known instant, or to "unavailable"
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedClock {
    time: Option<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self { time: Some(time) }
    }

    /// A clock with no platform timestamp; operations fall back to epoch
    pub fn unavailable() -> Self {
        Self { time: None }
    }
}

impl DeterministicClock for FixedClock {
    fn tx_time(&self) -> Option<DateTime<Utc>> {
        self.time
    }
}

/// Context for one ledger transaction: the platform-assigned id, the
/// transaction clock, and the caller identity
pub struct TxContext<'a> {
    tx_id: String,
    clock: &'a dyn DeterministicClock,
    identity: &'a dyn ClientIdentity,
}

impl<'a> TxContext<'a> {
    pub fn new(
        tx_id: impl Into<String>,
        clock: &'a dyn DeterministicClock,
        identity: &'a dyn ClientIdentity,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            clock,
            identity,
        }
    }

    /// Context with a freshly minted transaction id, for harnesses not
    /// driven by a real ledger platform
    pub fn generate(clock: &'a dyn DeterministicClock, identity: &'a dyn ClientIdentity) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), clock, identity)
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.identity.has_role(role)
    }

    /// RFC 3339 UTC transaction timestamp with millisecond precision.
    ///
    /// A missing, zero, or pre-epoch platform value degrades to the Unix
    /// epoch so that every replica renders the identical string.
    pub fn tx_timestamp(&self) -> String {
        let time = self
            .clock
            .tx_time()
            .filter(|t| t.timestamp_millis() > 0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
