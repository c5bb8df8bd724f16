//! Module with the lexicon builder and the compiled lexicon.

use crate::internal::{compile_states, CharPartition, CompiledDfa, CompiledState, ModeID, RuleID};
use crate::{Action, LexrError, LexrErrorKind, Pattern, Result};

/// The name of the default scanner state.
pub const DEFAULT_STATE: &str = "";

/// A builder for a [Lexicon].
///
/// Rules added with [rule](LexiconBuilder::rule) go into the default scanner
/// state `""`; [state](LexiconBuilder::state) opens a named sublexicon. The
/// insertion order of the rules within a state defines their priority: the
/// lower the index, the higher the priority on equal-length matches.
pub struct LexiconBuilder<T, U = ()> {
    states: Vec<(String, Vec<(Pattern, Action<T, U>)>)>,
}

impl<T, U> LexiconBuilder<T, U> {
    /// Creates a new builder with an empty default state.
    pub fn new() -> Self {
        Self {
            states: vec![(DEFAULT_STATE.to_string(), Vec::new())],
        }
    }

    /// Adds a rule to the default scanner state.
    pub fn rule(mut self, pattern: Pattern, action: Action<T, U>) -> Self {
        self.states[0].1.push((pattern, action));
        self
    }

    /// Adds a named scanner state with its rules. The rules are plain
    /// `(pattern, action)` pairs, so state definitions cannot nest.
    pub fn state<N, I>(mut self, name: N, rules: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (Pattern, Action<T, U>)>,
    {
        self.states.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Compiles the lexicon. Fails on an inconsistent specification or an
    /// invalid pattern.
    pub fn build(self) -> Result<Lexicon<T, U>> {
        for (index, (name, _)) in self.states.iter().enumerate() {
            if index > 0 && name == DEFAULT_STATE {
                return Err(invalid_lexicon(
                    "the default state name \"\" is reserved; use rule() for default-state rules",
                ));
            }
            if self.states[..index].iter().any(|(other, _)| other == name) {
                return Err(invalid_lexicon(format!(
                    "duplicate scanner state name '{name}'"
                )));
            }
        }
        if self.states.iter().all(|(_, rules)| rules.is_empty()) {
            return Err(invalid_lexicon("lexicon has no rules"));
        }
        for (_, rules) in self.states.iter() {
            for (_, action) in rules {
                if let Action::Begin(target) = action {
                    if !self.states.iter().any(|(name, _)| name == target) {
                        return Err(invalid_lexicon(format!(
                            "Begin target '{target}' is not a defined scanner state"
                        )));
                    }
                }
            }
        }

        let mut modes = Vec::with_capacity(self.states.len());
        let mut actions = Vec::with_capacity(self.states.len());
        for (name, rules) in self.states {
            let (patterns, state_actions): (Vec<Pattern>, Vec<Action<T, U>>) =
                rules.into_iter().unzip();
            modes.push((name, patterns));
            actions.push(state_actions);
        }
        let (states, partition) = compile_states(&modes)?;
        Ok(Lexicon {
            states,
            actions,
            partition,
        })
    }
}

impl<T, U> Default for LexiconBuilder<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_lexicon<M>(message: M) -> LexrError
where
    M: Into<String>,
{
    LexrError::new(LexrErrorKind::InvalidLexicon(message.into()))
}

/// A compiled lexicon.
///
/// The lexicon is immutable once built. Scanners hold it behind an
/// `std::sync::Arc`, so one lexicon can drive any number of concurrent
/// scanners.
pub struct Lexicon<T, U = ()> {
    states: Vec<CompiledState>,
    actions: Vec<Vec<Action<T, U>>>,
    partition: CharPartition,
}

impl<T, U> Lexicon<T, U> {
    /// Creates a builder.
    pub fn builder() -> LexiconBuilder<T, U> {
        LexiconBuilder::new()
    }

    /// The names of the scanner states, default state first.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|state| state.name.as_str())
    }

    pub(crate) fn mode_index(&self, name: &str) -> Option<ModeID> {
        self.states
            .iter()
            .position(|state| state.name == name)
            .map(|index| ModeID::new(index as u32))
    }

    pub(crate) fn mode_name(&self, mode: ModeID) -> &str {
        &self.states[mode.as_usize()].name
    }

    pub(crate) fn dfa(&self, mode: ModeID) -> &CompiledDfa {
        &self.states[mode.as_usize()].dfa
    }

    pub(crate) fn action(&self, mode: ModeID, rule: RuleID) -> &Action<T, U> {
        &self.actions[mode.as_usize()][rule.as_usize()]
    }

    pub(crate) fn partition(&self) -> &CharPartition {
        &self.partition
    }
}

impl<T, U> std::fmt::Debug for Lexicon<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("states", &self.states.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type StrLexicon = Lexicon<&'static str>;

    #[test]
    fn test_duplicate_state_name_is_rejected() {
        let result = StrLexicon::builder()
            .rule(Pattern::ch('a'), Action::Text)
            .state("STRING", [(Pattern::ch('"'), Action::Text)])
            .state("STRING", [(Pattern::ch('\''), Action::Text)])
            .build();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("duplicate scanner state name"));
    }

    #[test]
    fn test_reserved_default_name_is_rejected() {
        let result = StrLexicon::builder()
            .state("", [(Pattern::ch('a'), Action::Text)])
            .build();
        assert!(result.unwrap_err().to_string().contains("reserved"));
    }

    #[test]
    fn test_unknown_begin_target_is_rejected() {
        let result = StrLexicon::builder()
            .rule(Pattern::lit("(*"), Action::begin("COMMENT"))
            .build();
        assert!(result.unwrap_err().to_string().contains("Begin target"));
    }

    #[test]
    fn test_empty_lexicon_is_rejected() {
        let result = StrLexicon::builder().build();
        assert!(result.unwrap_err().to_string().contains("no rules"));
    }

    #[test]
    fn test_state_names_in_insertion_order() {
        let lexicon = StrLexicon::builder()
            .rule(Pattern::ch('a'), Action::Text)
            .state("ONE", [(Pattern::ch('b'), Action::Text)])
            .state("TWO", [(Pattern::ch('c'), Action::Text)])
            .build()
            .unwrap();
        let names: Vec<&str> = lexicon.state_names().collect();
        assert_eq!(names, vec!["", "ONE", "TWO"]);
    }
}
