/// Module that provides functions and types related to character sets.
mod charset;
pub(crate) use charset::CharSet;

/// Module that provides the type CharSetRegistry.
mod charset_registry;
pub(crate) use charset_registry::CharSetRegistry;

/// Module that provides the compiled dense-table DFA.
mod compiled_dfa;
pub(crate) use compiled_dfa::CompiledDfa;

/// Module that compiles the scanner states of a lexicon.
mod compiled_state;
pub(crate) use compiled_state::{compile_states, CompiledState};

/// Module that provides the DFA and its subset construction.
mod dfa;
pub(crate) use dfa::Dfa;

/// Module for several ID types.
mod ids;
pub(crate) use ids::{ClassID, ModeID, RuleID, SetID, StateID};

/// Module that provides the stream adapter feeding the scanner.
mod input;
pub(crate) use input::{Anchor, InputStream, Symbol};

/// Module that provides the union NFA of one scanner state.
mod mode_nfa;
pub(crate) use mode_nfa::ModeNfa;

/// The nfa module contains the NFA implementation.
mod nfa;
pub(crate) use nfa::Nfa;

/// Module that derives the input equivalence classes.
pub(crate) mod partition;
pub(crate) use partition::CharPartition;
