//! This module contains the NFA (Non-deterministic Finite Automaton)
//! implementation. The NFA is the Thompson-style translation of a pattern
//! tree; transitions consume either a registered character set or one of the
//! virtual anchor symbols, plus ε-transitions for the fragment plumbing.

use crate::pattern::{Pattern, PatternKind};
use crate::{LexrError, LexrErrorKind, Result};

use super::{Anchor, CharPartition, CharSetRegistry, ClassID, SetID, StateID};

/// The input consumed by a non-ε NFA transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NfaInput {
    /// Any character of the registered set.
    Set(SetID),
    /// A virtual anchor symbol.
    Anchor(Anchor),
}

impl NfaInput {
    /// Returns true if the transition consumes the given partition class.
    fn matches_class(&self, class: ClassID, partition: &CharPartition) -> bool {
        match self {
            NfaInput::Set(set) => partition.set_contains_class(*set, class),
            NfaInput::Anchor(anchor) => super::partition::anchor_class(*anchor) == class,
        }
    }
}

/// A transition in the NFA.
#[derive(Debug, Clone)]
pub(crate) struct NfaTransition {
    input: NfaInput,
    target_state: StateID,
}

/// A state of the NFA with its outgoing transitions.
#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
    state: StateID,
    epsilon_transitions: Vec<StateID>,
    transitions: Vec<NfaTransition>,
}

impl NfaState {
    fn new(state: StateID) -> Self {
        Self {
            state,
            epsilon_transitions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> StateID {
        self.state
    }

    pub(crate) fn transitions(&self) -> &[NfaTransition] {
        &self.transitions
    }

    pub(crate) fn epsilon_transitions(&self) -> &[StateID] {
        &self.epsilon_transitions
    }

    /// Apply an offset to every state number.
    fn offset(&mut self, offset: u32) {
        self.state = StateID::new(self.state.id() + offset);
        for transition in self.transitions.iter_mut() {
            transition.target_state = StateID::new(transition.target_state.id() + offset);
        }
        for target in self.epsilon_transitions.iter_mut() {
            *target = StateID::new(target.id() + offset);
        }
    }
}

/// A Thompson NFA fragment with one entry and one exit state.
#[derive(Debug, Clone)]
pub(crate) struct Nfa {
    states: Vec<NfaState>,
    start_state: StateID,
    end_state: StateID,
}

impl Nfa {
    /// A fragment with a single state that is both entry and exit. Matches ε.
    fn single_state() -> Self {
        Self {
            states: vec![NfaState::new(StateID::new(0))],
            start_state: StateID::new(0),
            end_state: StateID::new(0),
        }
    }

    /// A fragment with one transition consuming the given input.
    fn for_input(input: NfaInput) -> Self {
        let mut nfa = Self::single_state();
        let end_state = nfa.new_state();
        nfa.states[nfa.start_state].transitions.push(NfaTransition {
            input,
            target_state: end_state,
        });
        nfa.end_state = end_state;
        nfa
    }

    /// Translates a pattern tree into an NFA fragment, registering every
    /// character set it mentions. Case-insensitive scopes are resolved here
    /// by doubling the alphabetic members of the sets they contain.
    pub(crate) fn try_from_pattern(
        pattern: &Pattern,
        registry: &mut CharSetRegistry,
    ) -> Result<Self> {
        Self::build(pattern, false, registry)
    }

    fn build(
        pattern: &Pattern,
        insensitive: bool,
        registry: &mut CharSetRegistry,
    ) -> Result<Self> {
        match &pattern.kind {
            PatternKind::Empty => Ok(Self::single_state()),
            PatternKind::Set(set) => {
                if set.is_empty() {
                    return Err(LexrError::new(LexrErrorKind::InvalidPattern(
                        "empty character set".to_string(),
                    )));
                }
                let set = if insensitive {
                    set.case_doubled()
                } else {
                    set.clone()
                };
                let set_id = registry.add_set(set);
                Ok(Self::for_input(NfaInput::Set(set_id)))
            }
            PatternKind::Anchor(anchor) => Ok(Self::for_input(NfaInput::Anchor(*anchor))),
            PatternKind::Concat(parts) => {
                let mut nfa = Self::single_state();
                for part in parts {
                    nfa.concat(Self::build(part, insensitive, registry)?);
                }
                Ok(nfa)
            }
            PatternKind::Alt(parts) => {
                let mut alternatives = parts.iter();
                // An Alt node has at least one alternative.
                let Some(first) = alternatives.next() else {
                    return Ok(Self::single_state());
                };
                let mut nfa = Self::build(first, insensitive, registry)?;
                for part in alternatives {
                    nfa.alternation(Self::build(part, insensitive, registry)?);
                }
                Ok(nfa)
            }
            PatternKind::Rep(inner) => {
                let mut nfa = Self::build(inner, insensitive, registry)?;
                nfa.zero_or_more();
                Ok(nfa)
            }
            PatternKind::CaseMode { insensitive, inner } => {
                Self::build(inner, *insensitive, registry)
            }
        }
    }

    /// A fragment holding only the shared start state (id 0) that a union NFA
    /// grows from.
    pub(crate) fn with_start_only() -> Self {
        Self::single_state()
    }

    /// Adds an ε-transition from the shared start state to the given target.
    pub(crate) fn connect_start(&mut self, target: StateID) {
        self.add_epsilon_transition(StateID::new(0), target);
    }

    pub(crate) fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub(crate) fn start_state(&self) -> StateID {
        self.start_state
    }

    pub(crate) fn end_state(&self) -> StateID {
        self.end_state
    }

    fn new_state(&mut self) -> StateID {
        let state = StateID::new(self.states.len() as u32);
        self.states.push(NfaState::new(state));
        state
    }

    fn add_epsilon_transition(&mut self, from: StateID, target_state: StateID) {
        self.states[from].epsilon_transitions.push(target_state);
    }

    /// Apply an offset to every state number.
    pub(crate) fn shift_ids(&mut self, offset: usize) -> (StateID, StateID) {
        for state in self.states.iter_mut() {
            state.offset(offset as u32);
        }
        self.start_state = StateID::new(self.start_state.id() + offset as u32);
        self.end_state = StateID::new(self.end_state.id() + offset as u32);
        (self.start_state, self.end_state)
    }

    /// Move the states of the given NFA into this one, consuming it.
    pub(crate) fn append(&mut self, mut nfa: Nfa) {
        self.states.append(nfa.states.as_mut());
        debug_assert!(self
            .states
            .iter()
            .enumerate()
            .all(|(i, s)| s.id().as_usize() == i));
    }

    /// Concatenates another fragment onto this one.
    fn concat(&mut self, mut nfa: Nfa) {
        let (nfa_start_state, nfa_end_state) = nfa.shift_ids(self.states.len());
        self.append(nfa);
        self.add_epsilon_transition(self.end_state, nfa_start_state);
        self.end_state = nfa_end_state;
    }

    /// Builds the union of this fragment and another one with a new ε-split
    /// entry and ε-join exit.
    fn alternation(&mut self, mut nfa: Nfa) {
        let (nfa_start_state, nfa_end_state) = nfa.shift_ids(self.states.len());
        self.append(nfa);

        let start_state = self.new_state();
        self.add_epsilon_transition(start_state, self.start_state);
        self.add_epsilon_transition(start_state, nfa_start_state);

        let end_state = self.new_state();
        self.add_epsilon_transition(self.end_state, end_state);
        self.add_epsilon_transition(nfa_end_state, end_state);

        self.start_state = start_state;
        self.end_state = end_state;
    }

    /// Wraps this fragment in the standard Kleene-star construction.
    fn zero_or_more(&mut self) {
        let start_state = self.new_state();
        let end_state = self.new_state();
        self.add_epsilon_transition(start_state, self.start_state);
        self.add_epsilon_transition(start_state, end_state);
        self.add_epsilon_transition(self.end_state, self.start_state);
        self.add_epsilon_transition(self.end_state, end_state);
        self.start_state = start_state;
        self.end_state = end_state;
    }

    /// Calculate the ε-closure of a state.
    pub(crate) fn epsilon_closure(&self, state: StateID) -> Vec<StateID> {
        // The state itself is always part of the ε-closure.
        let mut closure = vec![state];
        let mut i = 0;
        while i < closure.len() {
            let current_state = closure[i];
            for &target in self.states[current_state].epsilon_transitions() {
                if !closure.contains(&target) {
                    closure.push(target);
                }
            }
            i += 1;
        }
        closure.sort_unstable();
        closure
    }

    /// Calculate move(T, a) for a set of states T and a partition class a:
    /// the set of states reachable from T by consuming a.
    ///
    /// Anchor classes are transparent to states that do not mention them: a
    /// state whose transitions all consume something other than the pending
    /// anchor stays in the set, as if it had an implicit self-loop on that
    /// anchor. States without any transition (the tagged fragment exits) drop
    /// out, so a finished match never swallows an anchor that the next token
    /// may need.
    pub(crate) fn move_set(
        &self,
        states: &[StateID],
        class: ClassID,
        partition: &CharPartition,
    ) -> Vec<StateID> {
        let transparent_anchor = super::partition::anchor_of_class(class).is_some();
        let mut move_set = Vec::new();
        for &state in states {
            let mut survives = false;
            for transition in self.states[state].transitions() {
                if transition.input.matches_class(class, partition) {
                    move_set.push(transition.target_state);
                } else if transparent_anchor {
                    survives = true;
                }
            }
            if survives {
                move_set.push(state);
            }
        }
        move_set.sort_unstable();
        move_set.dedup();
        move_set
    }
}
