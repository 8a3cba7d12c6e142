//! Lock-rule observations.
//!
//! The controller does not yet deliver lock-rule changes as webhook events,
//! so the reconciler polls the rule and translates it into this two-state
//! observation. The observation table starts with no entry per door; the
//! first observation after startup therefore always differs and produces
//! exactly one hub assertion.

/// Observed lock-rule state of a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockRuleState {
    /// Default access rules apply; the door behaves as locked.
    Locked,
    /// A `keep_unlock` rule holds the door unlocked.
    Unlocked,
}

impl LockRuleState {
    /// Translate a wire rule type into an observation.
    ///
    /// An empty (default) rule means locked, `keep_unlock` means unlocked,
    /// and anything else is unknown — the caller logs and skips it.
    #[must_use]
    pub fn from_rule_type(rule_type: &str) -> Option<Self> {
        match rule_type {
            "" => Some(Self::Locked),
            "keep_unlock" => Some(Self::Unlocked),
            _ => None,
        }
    }
}

impl std::fmt::Display for LockRuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => f.write_str("locked"),
            Self::Unlocked => f.write_str("unlocked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_translate_empty_rule_to_locked() {
        assert_eq!(LockRuleState::from_rule_type(""), Some(LockRuleState::Locked));
    }

    #[test]
    fn should_translate_keep_unlock_to_unlocked() {
        assert_eq!(
            LockRuleState::from_rule_type("keep_unlock"),
            Some(LockRuleState::Unlocked)
        );
    }

    #[test]
    fn should_report_unknown_rule_types() {
        assert_eq!(LockRuleState::from_rule_type("schedule"), None);
        assert_eq!(LockRuleState::from_rule_type("lock_early"), None);
    }
}
