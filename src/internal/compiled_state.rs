//! This module compiles the scanner states of a lexicon.
//!
//! All states are compiled against one shared charset registry so that a
//! single character partition serves every DFA; each state then gets its own
//! independent automaton, which is how the runtime restricts matching to the
//! patterns of the active state.

use log::debug;

use crate::{Pattern, Result};

use super::{CharPartition, CharSetRegistry, CompiledDfa, Dfa, ModeNfa};

/// One compiled scanner state: its name and its dense DFA.
#[derive(Debug, Clone)]
pub(crate) struct CompiledState {
    pub(crate) name: String,
    pub(crate) dfa: CompiledDfa,
}

/// Compiles every scanner state of a lexicon.
pub(crate) fn compile_states(
    modes: &[(String, Vec<Pattern>)],
) -> Result<(Vec<CompiledState>, CharPartition)> {
    let mut registry = CharSetRegistry::new();
    let mut mode_nfas = Vec::with_capacity(modes.len());
    for (_, patterns) in modes {
        mode_nfas.push(ModeNfa::try_from_patterns(patterns, &mut registry)?);
    }

    let partition = CharPartition::from_registry(&registry);

    let mut states = Vec::with_capacity(modes.len());
    for ((name, _), nfa) in modes.iter().zip(mode_nfas.iter()) {
        let dfa = Dfa::from_mode_nfa(nfa, &partition);
        debug!(
            "compiled scanner state '{}': {} DFA states, {} classes",
            name,
            dfa.states().len(),
            partition.class_count()
        );
        states.push(CompiledState {
            name: name.clone(),
            dfa: CompiledDfa::compile(&dfa, partition.class_count()),
        });
    }
    Ok((states, partition))
}
