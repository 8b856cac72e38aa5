//! Convergence gate: has the requested child been realized yet?
//!
//! Desired state is asserted on every pass; the gate only decides which
//! signal accompanies it, so success is never reported before the host has
//! observed the child.

use crate::types::{Audience, ObservedChildSet, StatusSignal};

/// Message reported once the child has been observed.
pub const SUCCESS_MESSAGE: &str = "Function completed successfully";

/// Classify the invocation by whether `key` is in the observed set.
pub fn classify(key: &str, observed: &ObservedChildSet<'_>) -> StatusSignal {
    if observed.contains(key) {
        StatusSignal::Success {
            message: SUCCESS_MESSAGE.to_string(),
            audience: Audience::CompositeAndClaim,
        }
    } else {
        StatusSignal::Waiting {
            message: format!("waiting for {key} to be created"),
            audience: Audience::CompositeAndClaim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfn_proto::{Resource, State};

    fn observed(keys: &[&str]) -> State {
        State {
            resources: keys
                .iter()
                .map(|key| ((*key).to_string(), Resource::default()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_child_waits() {
        let signal = classify("cryptokey", &ObservedChildSet::new());
        assert!(signal.is_waiting());
        assert_eq!(signal.message(), "waiting for cryptokey to be created");
        assert_eq!(signal.audience(), Audience::CompositeAndClaim);
    }

    #[test]
    fn test_observed_child_succeeds() {
        let state = observed(&["cryptokey"]);
        let signal = classify("cryptokey", &ObservedChildSet::from_state(Some(&state)));
        assert!(signal.is_success());
        assert_eq!(signal.message(), SUCCESS_MESSAGE);
    }

    #[test]
    fn test_other_children_do_not_count() {
        let state = observed(&["keyring"]);
        assert!(classify("cryptokey", &ObservedChildSet::from_state(Some(&state))).is_waiting());
    }
}
