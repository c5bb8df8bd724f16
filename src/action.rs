//! Module with the action type dispatched on a pattern match.

use std::sync::Arc;

use crate::{Result, Scanner};

/// The closure type of [Action::Call]. It receives the running scanner and
/// the matched text; returning `Ok(None)` discards the match like
/// [Action::Ignore], returning `Ok(Some(value))` yields a token with the
/// matched text.
pub type ActionFn<T, U> =
    Arc<dyn Fn(&mut Scanner<T, U>, &str) -> Result<Option<T>> + Send + Sync>;

/// What the scanner does when a pattern matches.
pub enum Action<T, U = ()> {
    /// Discard the match and resume scanning.
    Ignore,
    /// Yield the matched text as the token value.
    Text,
    /// Yield the given value together with the matched text.
    Return(T),
    /// Switch to the named scanner state; yields nothing.
    Begin(String),
    /// Run a user closure. The closure may inspect and mutate the scanner
    /// (switch states, queue tokens with `produce`, touch the user state) and
    /// decides itself whether the match yields a token.
    Call(ActionFn<T, U>),
}

impl<T, U> Action<T, U> {
    /// Creates a [Action::Begin] action.
    pub fn begin<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Action::Begin(name.into())
    }

    /// Creates a [Action::Call] action from a closure.
    pub fn call<F>(f: F) -> Self
    where
        F: Fn(&mut Scanner<T, U>, &str) -> Result<Option<T>> + Send + Sync + 'static,
    {
        Action::Call(Arc::new(f))
    }
}

impl<T, U> Clone for Action<T, U>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Action::Ignore => Action::Ignore,
            Action::Text => Action::Text,
            Action::Return(value) => Action::Return(value.clone()),
            Action::Begin(name) => Action::Begin(name.clone()),
            Action::Call(f) => Action::Call(f.clone()),
        }
    }
}

impl<T, U> std::fmt::Debug for Action<T, U>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Ignore => write!(f, "Ignore"),
            Action::Text => write!(f, "Text"),
            Action::Return(value) => f.debug_tuple("Return").field(value).finish(),
            Action::Begin(name) => f.debug_tuple("Begin").field(name).finish(),
            Action::Call(_) => write!(f, "Call(..)"),
        }
    }
}
