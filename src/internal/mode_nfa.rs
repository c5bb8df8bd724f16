//! This module contains the union NFA of one scanner state.
//!
//! Every rule of the state contributes one Thompson fragment; the fragments
//! are renumbered into a single state space and connected to a common ε-start
//! (state 0). The exit state of each fragment is tagged with the rule's id,
//! which is its insertion index and thereby its priority.

use crate::{Pattern, Result};

use super::{CharPartition, CharSetRegistry, ClassID, Nfa, RuleID, StateID};

/// The combined NFA of all rules of one scanner state.
#[derive(Debug)]
pub(crate) struct ModeNfa {
    nfa: Nfa,
    /// Accept tag per state; `accepts[s]` is the rule whose fragment ends in
    /// `s`. At most one rule ends in any given state by construction.
    accepts: Vec<Option<RuleID>>,
}

impl ModeNfa {
    /// Builds the union NFA from the patterns of one scanner state, in
    /// priority order.
    pub(crate) fn try_from_patterns(
        patterns: &[Pattern],
        registry: &mut CharSetRegistry,
    ) -> Result<Self> {
        // State 0 is the common start state.
        let mut combined = Nfa::with_start_only();
        let mut ends = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let mut fragment = Nfa::try_from_pattern(pattern, registry)?;
            fragment.shift_ids(combined.states().len());
            let (start, end) = (fragment.start_state(), fragment.end_state());
            combined.append(fragment);
            combined.connect_start(start);
            ends.push(end);
        }
        let mut accepts = vec![None; combined.states().len()];
        for (index, end) in ends.into_iter().enumerate() {
            accepts[end] = Some(RuleID::new(index as u32));
        }
        Ok(Self {
            nfa: combined,
            accepts,
        })
    }

    /// The common start state.
    pub(crate) fn start_state(&self) -> StateID {
        StateID::new(0)
    }

    /// The number of states.
    pub(crate) fn state_count(&self) -> usize {
        self.nfa.states().len()
    }

    /// Delegates to [Nfa::epsilon_closure].
    pub(crate) fn epsilon_closure(&self, state: StateID) -> Vec<StateID> {
        self.nfa.epsilon_closure(state)
    }

    /// Calculate the ε-closure of a set of states.
    pub(crate) fn epsilon_closure_set<I>(&self, states: I) -> Vec<StateID>
    where
        I: IntoIterator<Item = StateID>,
    {
        let mut result = Vec::new();
        for state in states {
            for closure_state in self.nfa.epsilon_closure(state) {
                if !result.contains(&closure_state) {
                    result.push(closure_state);
                }
            }
        }
        result.sort_unstable();
        result
    }

    /// Delegates to [Nfa::move_set].
    pub(crate) fn move_set(
        &self,
        states: &[StateID],
        class: ClassID,
        partition: &CharPartition,
    ) -> Vec<StateID> {
        self.nfa.move_set(states, class, partition)
    }

    /// The accept tag of a subset of states: the highest-priority (lowest-id)
    /// rule whose exit state is in the subset.
    pub(crate) fn accept_of(&self, states: &[StateID]) -> Option<RuleID> {
        states
            .iter()
            .filter_map(|&state| self.accepts[state])
            .min()
    }
}
