//! Actions representing side effects to be executed by the filter service.
//!
//! The event handler returns a `Vec<Action>` after processing each event.
//! Actions bridge pure state transitions and effectful operations: loading
//! or writing the policy, and writing display directives to the host.

use super::applier::Directive;
use super::observer::PassKind;
use crate::domain::{ItemId, PolicyRecord};

/// Commands executed by [`crate::service::FilterService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load the policy asynchronously, then run a pass of the given kind.
    ///
    /// The service answers with [`super::Event::PolicyLoaded`].
    LoadPolicy(PassKind),

    /// Read-modify-write the stored policy, then reload it for a full pass.
    ///
    /// The service answers with [`super::Event::PolicyPersisted`].
    PersistPolicy(PolicyChange),

    /// Write a display directive for one item.
    Apply {
        item: ItemId,
        directive: Directive,
    },

    /// Remove every directive from every item (filtering disabled).
    ClearAll,

    /// Publish the running filtered counter.
    PublishCounter {
        filtered: usize,
        /// `None` hides the counter.
        label: Option<String>,
    },
}

/// A single-field change to the stored policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyChange {
    ToggleHideMode,
    SetEnabled(bool),
}

impl PolicyChange {
    pub fn apply_to(self, record: &mut PolicyRecord) {
        match self {
            Self::ToggleHideMode => record.hide_filtered = !record.hide_filtered,
            Self::SetEnabled(enabled) => record.enabled = enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_changes_touch_one_field() {
        let mut record = PolicyRecord {
            blocked_keywords: vec!["x".into()],
            ..PolicyRecord::default()
        };

        PolicyChange::ToggleHideMode.apply_to(&mut record);
        assert!(record.hide_filtered);
        PolicyChange::ToggleHideMode.apply_to(&mut record);
        assert!(!record.hide_filtered);

        PolicyChange::SetEnabled(false).apply_to(&mut record);
        assert!(!record.enabled);
        assert_eq!(record.blocked_keywords, vec!["x".to_string()]);
    }
}
