//! This module contains the DFA implementation.
//! The DFA is generated from the union NFA of one scanner state with the
//! subset construction algorithm and then minimized with partition
//! refinement. Accept tags carry the rule id (= priority) of the
//! highest-priority rule accepting in each subset, so longest-match and
//! priority tie-breaks both fall out of a plain table walk at scan time.

use std::collections::{BTreeMap, BTreeSet};

use log::trace;
use rustc_hash::FxHashMap;

use super::{CharPartition, ClassID, ModeNfa, RuleID, StateID};

// The type definitions for the partition refinement algorithm.
type StateGroup = BTreeSet<StateID>;
type Partition = Vec<StateGroup>;

/// A state of the DFA.
#[derive(Debug, Clone)]
pub(crate) struct DfaState {
    /// The NFA states that constitute this DFA state. Emptied by
    /// minimization, which does not need them anymore.
    nfa_states: Vec<StateID>,
    /// The highest-priority rule accepting in this state, if any.
    accept: Option<RuleID>,
}

/// The DFA of one scanner state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dfa {
    states: Vec<DfaState>,
    start_state: StateID,
    transitions: BTreeMap<StateID, BTreeMap<ClassID, StateID>>,
}

impl Dfa {
    /// Get the states of the DFA.
    pub(crate) fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Get the start state of the DFA.
    pub(crate) fn start_state(&self) -> StateID {
        self.start_state
    }

    /// Get the accept tag of a state.
    pub(crate) fn accept(&self, state: StateID) -> Option<RuleID> {
        self.states[state].accept
    }

    /// Get the transitions of the DFA.
    pub(crate) fn transitions(&self) -> &BTreeMap<StateID, BTreeMap<ClassID, StateID>> {
        &self.transitions
    }

    /// Create a DFA from the union NFA of one scanner state using the subset
    /// construction algorithm, then minimize it.
    pub(crate) fn from_mode_nfa(nfa: &ModeNfa, partition: &CharPartition) -> Self {
        let mut dfa = Dfa::default();
        let mut subsets: FxHashMap<Vec<StateID>, StateID> = FxHashMap::default();

        let start_subset = nfa.epsilon_closure(nfa.start_state());
        let start_state = dfa.add_state(start_subset.clone(), nfa);
        subsets.insert(start_subset, start_state);
        dfa.start_state = start_state;

        let mut work_list = vec![start_state];
        while let Some(state_id) = work_list.pop() {
            let nfa_states = dfa.states[state_id].nfa_states.clone();
            for class in (0..partition.class_count() as u32).map(ClassID::new) {
                let target_subset =
                    nfa.epsilon_closure_set(nfa.move_set(&nfa_states, class, partition));
                if target_subset.is_empty() {
                    continue;
                }
                let target_state = match subsets.get(&target_subset) {
                    Some(&known) => known,
                    None => {
                        let new_state = dfa.add_state(target_subset.clone(), nfa);
                        subsets.insert(target_subset, new_state);
                        work_list.push(new_state);
                        new_state
                    }
                };
                dfa.transitions
                    .entry(state_id)
                    .or_default()
                    .insert(class, target_state);
            }
        }

        trace!(
            "subset construction: {} NFA states -> {} DFA states",
            nfa.state_count(),
            dfa.states.len()
        );
        dfa.minimize()
    }

    /// Add a state for the given subset of NFA states. The accept tag of the
    /// state is the highest-priority rule accepting anywhere in the subset.
    fn add_state(&mut self, nfa_states: Vec<StateID>, nfa: &ModeNfa) -> StateID {
        let state_id = StateID::new(self.states.len() as u32);
        let accept = nfa.accept_of(&nfa_states);
        self.states.push(DfaState { nfa_states, accept });
        state_id
    }

    /// Minimize the DFA with partition refinement. The initial partition
    /// groups states by accept tag, which preserves accept identity per
    /// equivalence class.
    fn minimize(&self) -> Self {
        let mut partition_old = self.initial_partition();
        loop {
            let partition_new = self.refine_partition(&partition_old);
            if partition_new == partition_old {
                break;
            }
            partition_old = partition_new;
        }
        let minimized = self.from_partition(&partition_old);
        trace!(
            "minimization: {} -> {} DFA states",
            self.states.len(),
            minimized.states.len()
        );
        minimized
    }

    fn initial_partition(&self) -> Partition {
        let mut groups: BTreeMap<Option<RuleID>, StateGroup> = BTreeMap::new();
        for (index, state) in self.states.iter().enumerate() {
            groups
                .entry(state.accept)
                .or_default()
                .insert(StateID::new(index as u32));
        }
        groups.into_values().collect()
    }

    fn refine_partition(&self, partition: &[StateGroup]) -> Partition {
        let mut new_partition = Partition::new();
        for group in partition {
            for new_group in self.split_group(group, partition) {
                new_partition.push(new_group);
            }
        }
        new_partition
    }

    /// Split a group into subgroups of states that agree, for every input
    /// class, on the partition group they transition to.
    fn split_group(&self, group: &StateGroup, partition: &[StateGroup]) -> Partition {
        if group.len() == 1 {
            return vec![group.clone()];
        }
        let mut split: BTreeMap<Vec<(ClassID, usize)>, StateGroup> = BTreeMap::new();
        for &state_id in group {
            let signature = self.transition_signature(state_id, partition);
            split.entry(signature).or_default().insert(state_id);
        }
        split.into_values().collect()
    }

    /// The transitions of a state expressed as target partition-group
    /// indices. Two states with equal signatures are indistinguishable under
    /// the current partition.
    fn transition_signature(
        &self,
        state_id: StateID,
        partition: &[StateGroup],
    ) -> Vec<(ClassID, usize)> {
        let Some(transitions) = self.transitions.get(&state_id) else {
            return Vec::new();
        };
        transitions
            .iter()
            .map(|(&class, target)| (class, Self::group_of(*target, partition)))
            .collect()
    }

    fn group_of(state_id: StateID, partition: &[StateGroup]) -> usize {
        partition
            .iter()
            .position(|group| group.contains(&state_id))
            .expect("state must be in some partition group")
    }

    /// Create the minimized DFA from a stable partition. Each group becomes
    /// one state whose transitions are those of an arbitrary representative,
    /// remapped onto group indices.
    fn from_partition(&self, partition: &[StateGroup]) -> Dfa {
        let mut dfa = Dfa::default();
        for group in partition {
            let representative = *group.first().expect("groups are never empty");
            dfa.states.push(DfaState {
                nfa_states: Vec::new(),
                accept: self.states[representative].accept,
            });
        }
        for (group_index, group) in partition.iter().enumerate() {
            let representative = *group.first().expect("groups are never empty");
            if let Some(transitions) = self.transitions.get(&representative) {
                let remapped: BTreeMap<ClassID, StateID> = transitions
                    .iter()
                    .map(|(&class, &target)| {
                        (class, StateID::new(Self::group_of(target, partition) as u32))
                    })
                    .collect();
                dfa.transitions
                    .insert(StateID::new(group_index as u32), remapped);
            }
        }
        dfa.start_state = StateID::new(Self::group_of(self.start_state, partition) as u32);
        dfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::CharSetRegistry;
    use crate::Pattern;

    fn compile(patterns: &[Pattern]) -> (Dfa, CharPartition) {
        let mut registry = CharSetRegistry::new();
        let nfa = ModeNfa::try_from_patterns(patterns, &mut registry).unwrap();
        let partition = CharPartition::from_registry(&registry);
        (Dfa::from_mode_nfa(&nfa, &partition), partition)
    }

    fn walk(dfa: &Dfa, partition: &CharPartition, input: &str) -> Option<StateID> {
        let mut state = dfa.start_state();
        for c in input.chars() {
            state = *dfa
                .transitions()
                .get(&state)?
                .get(&partition.class_of(c))?;
        }
        Some(state)
    }

    #[test]
    fn test_single_character() {
        let (dfa, partition) = compile(&[Pattern::ch('a')]);
        assert_eq!(dfa.states().len(), 2);
        let end = walk(&dfa, &partition, "a").unwrap();
        assert_eq!(dfa.accept(end), Some(RuleID::new(0)));
        assert_eq!(dfa.accept(dfa.start_state()), None);
        assert!(walk(&dfa, &partition, "b").is_none());
    }

    #[test]
    fn test_classic_subset_construction() {
        let pattern = (Pattern::ch('a') | Pattern::ch('b')).rep() + Pattern::lit("abb");
        let (dfa, partition) = compile(&[pattern]);
        // The textbook (a|b)*abb automaton minimizes to four states.
        assert_eq!(dfa.states().len(), 4);
        for (input, accepted) in [
            ("abb", true),
            ("aabb", true),
            ("babb", true),
            ("ab", false),
            ("abba", false),
        ] {
            let end = walk(&dfa, &partition, input).unwrap();
            assert_eq!(dfa.accept(end).is_some(), accepted, "input {input}");
        }
    }

    #[test]
    fn test_priority_preserving_accepts() {
        let keyword = Pattern::lit("if");
        let identifier = Pattern::range("az").unwrap().rep1();
        let (dfa, partition) = compile(&[keyword, identifier]);
        // "i" only matches the identifier rule, "if" both; the keyword rule
        // has the lower index and wins the tie.
        let after_i = walk(&dfa, &partition, "i").unwrap();
        assert_eq!(dfa.accept(after_i), Some(RuleID::new(1)));
        let after_if = walk(&dfa, &partition, "if").unwrap();
        assert_eq!(dfa.accept(after_if), Some(RuleID::new(0)));
        let after_ifx = walk(&dfa, &partition, "ifx").unwrap();
        assert_eq!(dfa.accept(after_ifx), Some(RuleID::new(1)));
    }

    #[test]
    fn test_minimization_preserves_accept_identity() {
        // Two distinct keywords that a naive state merge would conflate.
        let (dfa, partition) = compile(&[Pattern::lit("ab"), Pattern::lit("cb")]);
        let after_ab = walk(&dfa, &partition, "ab").unwrap();
        let after_cb = walk(&dfa, &partition, "cb").unwrap();
        assert_eq!(dfa.accept(after_ab), Some(RuleID::new(0)));
        assert_eq!(dfa.accept(after_cb), Some(RuleID::new(1)));
    }

    #[test]
    fn test_kleene_star_accepting_start() {
        let (dfa, _) = compile(&[Pattern::ch('a').rep()]);
        // ε is in the language, so the start state itself accepts.
        assert_eq!(dfa.accept(dfa.start_state()), Some(RuleID::new(0)));
    }
}
