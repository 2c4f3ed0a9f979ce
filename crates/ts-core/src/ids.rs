//! Agent identity.
//!
//! The authoritative engine owns entity identity and reports it as opaque
//! strings (`"CAV"`, `"BV_3"`, `"tls_main"`, …).  `AgentId` wraps those
//! strings in a shared, immutable handle so registries, ID-set diffs, and
//! command journals can clone and compare them without re-allocating.

use std::fmt;
use std::sync::Arc;

/// Opaque identifier of one agent, unique within one population's registry.
///
/// Backed by `Arc<str>`: cloning is a reference-count bump, equality and
/// hashing look at the string content.  Construct via [`AgentId::new`] or
/// the `From` impls:
///
/// ```rust
/// use ts_core::AgentId;
///
/// let a = AgentId::new("BV_12");
/// let b: AgentId = "BV_12".into();
/// assert_eq!(a, b);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(Arc<str>);

impl AgentId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        AgentId(id.into())
    }

    /// The underlying string as reported by the authoritative engine.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId::new(s)
    }
}

impl AsRef<str> for AgentId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
