use thiserror::Error;

use crate::Position;

/// The result type for the `lexr` crate.
pub type Result<T> = std::result::Result<T, LexrError>;

/// The error type for the `lexr` crate.
#[derive(Error, Debug)]
pub struct LexrError {
    /// The source of the error.
    pub source: Box<LexrErrorKind>,
}

impl LexrError {
    /// Create a new `LexrError`.
    pub fn new(kind: LexrErrorKind) -> Self {
        LexrError {
            source: Box::new(kind),
        }
    }

    /// Create an action error from an arbitrary message.
    /// Intended for use inside `Action::Call` closures and EOF hooks.
    pub fn action<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        LexrError::new(LexrErrorKind::Action(message.into().into()))
    }

    /// Returns true if the error already carries position information.
    pub(crate) fn has_position(&self) -> bool {
        matches!(
            *self.source,
            LexrErrorKind::UnrecognizedInput { .. } | LexrErrorKind::Positioned { .. }
        )
    }
}

impl std::fmt::Display for LexrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum LexrErrorKind {
    /// A pattern could not be constructed, e.g. a malformed character range
    /// or a syntax error reported by [crate::re].
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The lexicon specification is inconsistent, e.g. a duplicate scanner
    /// state name or a `Begin` action referencing an unknown state.
    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),

    /// `begin` was called with a state name the lexicon does not define.
    #[error("unknown scanner state '{0}'")]
    UnknownState(String),

    /// No pattern of the current scanner state matches the input.
    #[error("{name}: {position}: unrecognized input '{sym}'", sym = .symbol.escape_default())]
    UnrecognizedInput {
        /// The name of the scanner that failed.
        name: String,
        /// The position of the offending symbol.
        position: Position,
        /// The offending symbol.
        symbol: char,
    },

    /// A std::io error occurred while reading the input stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error raised by a user action, annotated with the position the
    /// scanner was at when the action ran.
    #[error("{name}: {position}: {source}")]
    Positioned {
        /// The name of the scanner the action ran in.
        name: String,
        /// The position of the match that triggered the action.
        position: Position,
        /// The underlying error.
        source: Box<LexrError>,
    },

    /// An error raised by a user action.
    #[error("action failed: {0}")]
    Action(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LexrError {
    fn from(error: std::io::Error) -> Self {
        LexrError::new(LexrErrorKind::Io(error))
    }
}
