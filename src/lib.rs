#![forbid(missing_docs)]
//! # `lexr`
//! The `lexr` crate is a library for building lexical scanners.
//! Instead of parsing a scanner description from a DSL, the user declares
//! regular patterns with combinator calls (or the [re] convenience front
//! end), pairs each pattern with an [Action] and groups the pairs into named
//! scanner states. The [LexiconBuilder] compiles the declaration through a
//! pattern-tree → ε-NFA → character-partition → DFA pipeline; the resulting
//! [Lexicon] is immutable and can drive any number of [Scanner]s.
//! A scanner reads tokens from a streaming input with longest-match
//! semantics, breaking ties by rule order, and supports the beginning-of-line,
//! end-of-line and end-of-file anchors, state switching from actions and a
//! queue of action-produced tokens. Scanning time is linear in the input
//! length, independent of the number and complexity of the patterns.
//!
//! ```
//! use lexr::{Action, Lexicon, Pattern, Token};
//! use std::sync::Arc;
//!
//! let lexicon: Lexicon<&str> = Lexicon::builder()
//!     .rule(Pattern::lits(["if", "then", "else"]), Action::Text)
//!     .rule(
//!         Pattern::range("AZaz").unwrap() + Pattern::range("AZaz09").unwrap().rep(),
//!         Action::Return("ident"),
//!     )
//!     .rule(Pattern::any_of(" \t\n").rep1(), Action::Ignore)
//!     .build()
//!     .unwrap();
//!
//! let mut scanner = lexr::Scanner::from_str(Arc::new(lexicon), "if x1");
//! assert_eq!(scanner.read().unwrap(), Some(Token::Text("if".into())));
//! assert_eq!(
//!     scanner.read().unwrap(),
//!     Some(Token::Value("ident", "x1".into()))
//! );
//! assert_eq!(scanner.read().unwrap(), None);
//! ```

/// Module with the action type.
mod action;
pub use action::{Action, ActionFn};

/// Module with error definitions.
mod errors;
pub use errors::{LexrError, LexrErrorKind, Result};

/// The module with internal implementation details.
mod internal;

/// Module with the lexicon builder and the compiled lexicon.
mod lexicon;
pub use lexicon::{Lexicon, LexiconBuilder, DEFAULT_STATE};

/// Module with the pattern algebra.
mod pattern;
pub use pattern::Pattern;

/// Module that provides a position type.
mod position;
pub use position::Position;

/// Module with the traditional regex front end.
mod re;
pub use re::re;

/// The module with the scanner runtime.
mod scanner;
pub use scanner::{EofHook, Scanner};

/// Module that provides the token type.
mod token;
pub use token::Token;
