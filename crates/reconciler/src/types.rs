//! Core types for a single reconcile pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use xfn_proto::{Resource, State};

/// Typed view of the observed composite resource.
///
/// Only the fields the function reads are kept; both are validated to be
/// non-empty before synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeView {
    /// `metadata.name` of the composite.
    pub name: String,
    /// `spec.protectionLevel`, forwarded verbatim to the generated key.
    pub protection_level: String,
}

/// Children the host currently observes, keyed by logical name.
///
/// Borrows the request's observed state; the function only asks whether a
/// child exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedChildSet<'a> {
    children: Option<&'a BTreeMap<String, Resource>>,
}

impl<'a> ObservedChildSet<'a> {
    /// Create an empty observed set.
    pub fn new() -> Self {
        Self::default()
    }

    /// View the request's observed state.
    pub fn from_state(state: Option<&'a State>) -> Self {
        Self {
            children: state.map(|s| &s.resources),
        }
    }

    /// Whether a child with this logical name has been observed.
    pub fn contains(&self, key: &str) -> bool {
        self.children.is_some_and(|children| children.contains_key(key))
    }

    /// Number of observed children.
    pub fn len(&self) -> usize {
        self.children.map_or(0, BTreeMap::len)
    }

    /// Whether nothing has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deletion policy of the generated resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeletionPolicy {
    /// Delete the external resource when the child is removed.
    #[default]
    Delete,
    /// Leave the external resource behind.
    Orphan,
}

impl DeletionPolicy {
    /// Wire name of the policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Orphan => "Orphan",
        }
    }
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Management policy of the generated resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ManagementPolicy {
    /// Fully managed.
    #[default]
    #[serde(rename = "*")]
    All,
    Observe,
    Create,
    Update,
    Delete,
    LateInitialize,
}

impl ManagementPolicy {
    /// Wire name of the policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "*",
            Self::Observe => "Observe",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::LateInitialize => "LateInitialize",
        }
    }
}

/// The child resource synthesized from a composite.
///
/// Derived deterministically from [`CompositeView`] and the synthesis
/// configuration; it has no identity beyond `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedChildSpec {
    /// Logical name of the child in the observed/desired maps.
    pub key: String,
    pub api_version: String,
    pub kind: String,
    /// `metadata.name` of the generated resource.
    pub name: String,
    pub deletion_policy: DeletionPolicy,
    pub management_policies: Vec<ManagementPolicy>,
    pub algorithm: String,
    pub protection_level: String,
}

/// Who a status signal is shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only the composite resource.
    Composite,
    /// The composite and, if one exists, its claim.
    CompositeAndClaim,
}

/// Outcome of an invocation as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSignal {
    /// The child has been requested but not observed yet.
    Waiting { message: String, audience: Audience },
    /// The child exists.
    Success { message: String, audience: Audience },
    /// The invocation failed; desired state must not be acted on.
    Fatal { message: String },
}

impl StatusSignal {
    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Waiting { message, .. }
            | Self::Success { message, .. }
            | Self::Fatal { message } => message,
        }
    }

    /// Who the signal targets. Fatal signals target the composite only.
    pub const fn audience(&self) -> Audience {
        match self {
            Self::Waiting { audience, .. } | Self::Success { audience, .. } => *audience,
            Self::Fatal { .. } => Audience::Composite,
        }
    }

    /// Whether the signal reports a realized child.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the signal asks the host to call again later.
    pub const fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting { .. })
    }
}

/// Status derived for the composite on every non-fatal pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeStatus {
    /// Name of the generated key.
    pub key_name: String,
    /// Whether the generated key has been observed.
    pub ready: bool,
}

/// Stages of a single invocation.
///
/// `Start -> Decoded -> Synthesized -> Gated -> Assembled`; decode failures
/// jump straight to assembly with a fatal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    Decoded,
    Synthesized,
    Gated,
    Assembled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Decoded => "decoded",
            Self::Synthesized => "synthesized",
            Self::Gated => "gated",
            Self::Assembled => "assembled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_from_state() {
        let mut state = State::default();
        state
            .resources
            .insert("cryptokey".to_string(), Resource::default());

        let observed = ObservedChildSet::from_state(Some(&state));
        assert_eq!(observed.len(), 1);
        assert!(observed.contains("cryptokey"));
        assert!(!observed.contains("keyring"));
        assert!(ObservedChildSet::from_state(None).is_empty());
        assert!(ObservedChildSet::new().is_empty());
    }

    #[test]
    fn test_observed_views_state_without_copying() {
        let mut state = State::default();
        state
            .resources
            .insert("cryptokey".to_string(), Resource::default());

        let observed = ObservedChildSet::from_state(Some(&state));
        let view = observed.children.map(std::ptr::from_ref);
        assert_eq!(view, Some(std::ptr::from_ref(&state.resources)));
    }

    #[test]
    fn test_policy_wire_names() {
        assert_eq!(DeletionPolicy::Delete.as_str(), "Delete");
        assert_eq!(ManagementPolicy::All.as_str(), "*");
        assert_eq!(ManagementPolicy::LateInitialize.as_str(), "LateInitialize");
    }

    #[test]
    fn test_fatal_targets_composite_only() {
        let fatal = StatusSignal::Fatal {
            message: "boom".to_string(),
        };
        assert_eq!(fatal.audience(), Audience::Composite);
        assert_eq!(fatal.message(), "boom");
        assert!(!fatal.is_success());
        assert!(!fatal.is_waiting());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Start.to_string(), "start");
        assert_eq!(Stage::Assembled.to_string(), "assembled");
    }
}
