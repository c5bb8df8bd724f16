//! This module contains the compiled DFA representation used at scan time.
//!
//! The map-based [Dfa](super::Dfa) is flattened into a dense row-major
//! transition table keyed on `(state, class)`. The character partition keeps
//! the class count small, so the table stays compact and a transition is a
//! single indexed load.

use super::{ClassID, Dfa, RuleID, StateID};

const DEAD: u32 = u32::MAX;

/// A compiled DFA with a dense transition table.
#[derive(Debug, Clone)]
pub(crate) struct CompiledDfa {
    class_count: usize,
    /// Row-major table: `table[state * class_count + class]` is the target
    /// state or [DEAD].
    table: Vec<u32>,
    /// The accept tag per state.
    accepts: Vec<Option<RuleID>>,
    start_state: StateID,
}

impl CompiledDfa {
    /// Flattens a DFA into dense-table form.
    pub(crate) fn compile(dfa: &Dfa, class_count: usize) -> Self {
        let state_count = dfa.states().len();
        let mut table = vec![DEAD; state_count * class_count];
        for (state, transitions) in dfa.transitions() {
            for (class, target) in transitions {
                table[state.as_usize() * class_count + class.as_usize()] = target.id();
            }
        }
        let accepts = (0..state_count)
            .map(|state| dfa.accept(StateID::new(state as u32)))
            .collect();
        Self {
            class_count,
            table,
            accepts,
            start_state: dfa.start_state(),
        }
    }

    /// The start state.
    #[inline]
    pub(crate) fn start_state(&self) -> StateID {
        self.start_state
    }

    /// The target of the transition, or `None` if it is dead.
    #[inline]
    pub(crate) fn next(&self, state: StateID, class: ClassID) -> Option<StateID> {
        let target = self.table[state.as_usize() * self.class_count + class.as_usize()];
        (target != DEAD).then(|| StateID::new(target))
    }

    /// The accept tag of a state.
    #[inline]
    pub(crate) fn accept(&self, state: StateID) -> Option<RuleID> {
        self.accepts[state]
    }
}
