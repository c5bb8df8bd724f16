//! Module with the pattern algebra.
//!
//! A [Pattern] is an immutable expression tree describing a regular language.
//! Patterns are assembled with combinator calls (or with the [crate::re]
//! front end) and handed to a [crate::LexiconBuilder] together with the
//! action to run when they match.

use crate::internal::{Anchor, CharSet};
use crate::{LexrError, LexrErrorKind, Result};

/// A regular pattern.
///
/// Patterns are built from the constructors on this type and combined with
/// [then](Pattern::then)/[or](Pattern::or) or the `+` and `|` operators:
///
/// ```
/// use lexr::Pattern;
///
/// let ident = Pattern::range("AZaz").unwrap()
///     + (Pattern::range("AZaz09").unwrap() | Pattern::ch('_')).rep();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub(crate) kind: PatternKind,
}

/// The variants of the pattern tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternKind {
    /// Matches the empty string.
    Empty,
    /// Matches any single character of the set.
    Set(CharSet),
    /// Matches the concatenation of the sub-patterns.
    Concat(Vec<Pattern>),
    /// Matches any one of the sub-patterns.
    Alt(Vec<Pattern>),
    /// Matches zero or more repetitions of the sub-pattern.
    Rep(Box<Pattern>),
    /// Case-sensitivity modifier; the innermost wrapper wins.
    CaseMode {
        /// True inside a `nocase` scope.
        insensitive: bool,
        /// The wrapped pattern.
        inner: Box<Pattern>,
    },
    /// Matches a virtual anchor symbol.
    Anchor(Anchor),
}

impl Pattern {
    fn from_kind(kind: PatternKind) -> Self {
        Self { kind }
    }

    pub(crate) fn from_set(set: CharSet) -> Self {
        Self::from_kind(PatternKind::Set(set))
    }

    /// Matches the empty string.
    pub fn empty() -> Pattern {
        Self::from_kind(PatternKind::Empty)
    }

    /// Matches exactly the given character.
    pub fn ch(c: char) -> Pattern {
        Self::from_set(CharSet::single(c))
    }

    /// Matches any one of the characters in the string.
    pub fn any_of(chars: &str) -> Pattern {
        Self::from_set(CharSet::from_chars(chars))
    }

    /// Matches any character that is not in the string.
    pub fn any_but(chars: &str) -> Pattern {
        Self::from_set(CharSet::from_chars(chars).complement())
    }

    /// Matches any single character.
    pub fn any_char() -> Pattern {
        Self::from_set(CharSet::universal())
    }

    /// Matches any character of the given ranges. The string is consumed as
    /// pairs of range endpoints, so `"AZaz"` matches `A..Z` and `a..z`.
    /// An odd trailing character or a reversed pair is an error.
    pub fn range(pairs: &str) -> Result<Pattern> {
        let chars: Vec<char> = pairs.chars().collect();
        if chars.len() % 2 != 0 {
            return Err(LexrError::new(LexrErrorKind::InvalidPattern(format!(
                "range '{}' has an odd number of characters",
                pairs.escape_default()
            ))));
        }
        let mut set = CharSet::new();
        for pair in chars.chunks(2) {
            if pair[0] > pair[1] {
                return Err(LexrError::new(LexrErrorKind::InvalidPattern(format!(
                    "range '{}-{}' is reversed",
                    pair[0].escape_default(),
                    pair[1].escape_default()
                ))));
            }
            set.add_range(pair[0], pair[1]);
        }
        set.normalize();
        Ok(Self::from_set(set))
    }

    /// Matches the given string literally. The empty string matches ε.
    pub fn lit(s: &str) -> Pattern {
        if s.is_empty() {
            return Self::empty();
        }
        Self::from_kind(PatternKind::Concat(s.chars().map(Pattern::ch).collect()))
    }

    /// Matches any one of the given strings.
    pub fn lits<I>(strings: I) -> Pattern
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let alternatives: Vec<Pattern> = strings
            .into_iter()
            .map(|s| Pattern::lit(s.as_ref()))
            .collect();
        match alternatives.len() {
            0 => Self::empty(),
            1 => alternatives.into_iter().next().unwrap(),
            _ => Self::from_kind(PatternKind::Alt(alternatives)),
        }
    }

    /// Matches the concatenation of all given patterns.
    pub fn seq<I>(patterns: I) -> Pattern
    where
        I: IntoIterator<Item = Pattern>,
    {
        patterns
            .into_iter()
            .fold(Pattern::empty(), |acc, p| acc.then(p))
    }

    /// Matches `self` followed by `other`. Also available as the `+` operator.
    pub fn then(self, other: Pattern) -> Pattern {
        match (self.kind, other.kind) {
            (PatternKind::Empty, kind) | (kind, PatternKind::Empty) => Self::from_kind(kind),
            (PatternKind::Concat(mut left), PatternKind::Concat(right)) => {
                left.extend(right);
                Self::from_kind(PatternKind::Concat(left))
            }
            (PatternKind::Concat(mut left), kind) => {
                left.push(Self::from_kind(kind));
                Self::from_kind(PatternKind::Concat(left))
            }
            (kind, PatternKind::Concat(right)) => {
                let mut parts = vec![Self::from_kind(kind)];
                parts.extend(right);
                Self::from_kind(PatternKind::Concat(parts))
            }
            (left, right) => Self::from_kind(PatternKind::Concat(vec![
                Self::from_kind(left),
                Self::from_kind(right),
            ])),
        }
    }

    /// Matches either `self` or `other`. Also available as the `|` operator.
    pub fn or(self, other: Pattern) -> Pattern {
        match (self.kind, other.kind) {
            (PatternKind::Alt(mut left), PatternKind::Alt(right)) => {
                left.extend(right);
                Self::from_kind(PatternKind::Alt(left))
            }
            (PatternKind::Alt(mut left), kind) => {
                left.push(Self::from_kind(kind));
                Self::from_kind(PatternKind::Alt(left))
            }
            (left, right) => Self::from_kind(PatternKind::Alt(vec![
                Self::from_kind(left),
                Self::from_kind(right),
            ])),
        }
    }

    /// Matches zero or more repetitions of `self`.
    pub fn rep(self) -> Pattern {
        Self::from_kind(PatternKind::Rep(Box::new(self)))
    }

    /// Matches one or more repetitions of `self`.
    pub fn rep1(self) -> Pattern {
        self.clone().then(self.rep())
    }

    /// Matches `self` or the empty string.
    pub fn opt(self) -> Pattern {
        self.or(Pattern::empty())
    }

    /// Makes the wrapped pattern match case-insensitively. ASCII alphabetic
    /// characters accept their case-flipped counterparts as well.
    pub fn nocase(self) -> Pattern {
        Self::from_kind(PatternKind::CaseMode {
            insensitive: true,
            inner: Box::new(self),
        })
    }

    /// Makes the wrapped pattern match case-sensitively again inside an
    /// enclosing [nocase](Pattern::nocase) scope.
    pub fn case(self) -> Pattern {
        Self::from_kind(PatternKind::CaseMode {
            insensitive: false,
            inner: Box::new(self),
        })
    }

    /// Matches at the beginning of a line without consuming text.
    pub fn bol() -> Pattern {
        Self::from_kind(PatternKind::Anchor(Anchor::Bol))
    }

    /// Matches at the end of a line without consuming text.
    pub fn eol() -> Pattern {
        Self::from_kind(PatternKind::Anchor(Anchor::Eol))
    }

    /// Matches at the end of the input without consuming text.
    pub fn eof() -> Pattern {
        Self::from_kind(PatternKind::Anchor(Anchor::Eof))
    }
}

impl std::ops::Add for Pattern {
    type Output = Pattern;

    fn add(self, rhs: Pattern) -> Self::Output {
        self.then(rhs)
    }
}

impl std::ops::BitOr for Pattern {
    type Output = Pattern;

    fn bitor(self, rhs: Pattern) -> Self::Output {
        self.or(rhs)
    }
}
