use std::collections::{HashMap, HashSet};

/// Lifecycle of one observed region. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RegionState {
    #[default]
    Unseen,
    Tagged,
    /// Inline bookmark affordance attached
    Starred,
}

/// Per-tag region states
#[derive(Debug, Default)]
pub struct RegionLedger {
    states: HashMap<String, RegionState>,
}

impl RegionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, tag: &str) -> RegionState {
        self.states.get(tag).copied().unwrap_or_default()
    }

    /// Move `tag` forward to `to`. Returns false if it was already there or beyond.
    pub fn advance(&mut self, tag: &str, to: RegionState) -> bool {
        let current = self.state(tag);
        if to <= current {
            return false;
        }
        self.states.insert(tag.to_string(), to);
        true
    }

    /// Carry a region's state over to the tag it was re-tagged with.
    /// Whatever `to` recorded before belonged to a node that no longer exists.
    pub fn migrate(&mut self, from: &str, to: &str) {
        match self.states.remove(from) {
            Some(state) => {
                self.states.insert(to.to_string(), state);
            }
            None => self.forget(to),
        }
    }

    /// Drop a tag whose node was rebuilt; the new node starts over
    pub fn forget(&mut self, tag: &str) {
        self.states.remove(tag);
    }

    /// Forget tags that are no longer on the page
    pub fn retain_live(&mut self, live: &HashSet<String>) {
        self.states.retain(|tag, _| live.contains(tag));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_never_regress() {
        let mut ledger = RegionLedger::new();
        assert_eq!(ledger.state("a"), RegionState::Unseen);

        assert!(ledger.advance("a", RegionState::Starred));
        assert!(!ledger.advance("a", RegionState::Tagged));
        assert!(!ledger.advance("a", RegionState::Starred));
        assert_eq!(ledger.state("a"), RegionState::Starred);
    }

    #[test]
    fn test_migrate_moves_state_to_new_tag() {
        let mut ledger = RegionLedger::new();
        ledger.advance("current", RegionState::Tagged);
        ledger.advance("stale", RegionState::Starred);

        ledger.migrate("current", "stale");
        assert_eq!(ledger.state("stale"), RegionState::Tagged);
        assert_eq!(ledger.state("current"), RegionState::Unseen);
        assert_eq!(ledger.len(), 1);
    }
}
