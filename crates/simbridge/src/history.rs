//! Bounded ring of retained states.

use std::collections::VecDeque;

use simbridge_engine::State;

/// The most recent states of a lineage, oldest first.
///
/// Pushing past the depth drops the oldest state.
#[derive(Debug, Clone)]
pub struct StateHistory {
    depth: usize,
    states: VecDeque<State>,
}

impl StateHistory {
    /// Creates a history that keeps at most `depth` states (minimum one).
    #[must_use]
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            states: VecDeque::with_capacity(depth),
        }
    }

    /// Retains `state`, evicting the oldest when full.
    pub fn push(&mut self, state: State) {
        if self.states.len() == self.depth {
            self.states.pop_front();
        }
        self.states.push_back(state);
    }

    /// Most recent state.
    #[must_use]
    pub fn latest(&self) -> Option<&State> {
        self.states.back()
    }

    /// Number of retained states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Maximum number of retained states.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(step: u64) -> State {
        State::new(step, vec![step as u8])
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut history = StateHistory::new(3);
        for step in 0..5 {
            history.push(state(step));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().map(State::step), Some(4));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn test_zero_depth_keeps_one() {
        let mut history = StateHistory::new(0);
        history.push(state(0));
        history.push(state(1));
        assert_eq!(history.depth(), 1);
        assert_eq!(history.len(), 1);
    }
}
