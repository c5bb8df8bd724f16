//! Module with the traditional regular-expression front end.
//!
//! [re] translates a textual regex into the same [Pattern] values the
//! combinator constructors build, so both styles mix freely in one lexicon.

use crate::internal::CharSet;
use crate::{LexrError, LexrErrorKind, Pattern, Result};

/// Parses a traditional regular expression into a [Pattern].
///
/// Supported syntax, loosest binding first: alternation `|`, concatenation,
/// the postfix repetitions `*`, `+` and `?`. `\c` escapes any single
/// character, `.` matches anything but a newline, `^` and `$` are the
/// beginning-of-line and end-of-line anchors, `[...]` is a character class
/// with ranges (a literal `-` goes at an edge, a leading `^` negates) and
/// parentheses group only.
///
/// ```
/// use lexr::{re, Pattern};
///
/// let number = re("[0-9]+").unwrap();
/// assert_eq!(number, Pattern::range("09").unwrap().rep1());
/// ```
pub fn re(pattern: &str) -> Result<Pattern> {
    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
    };
    let result = parser.alternation()?;
    if parser.pos != parser.chars.len() {
        return Err(parser.error("unexpected ')'"));
    }
    Ok(result)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: &str) -> LexrError {
        LexrError::new(LexrErrorKind::InvalidPattern(format!(
            "{message} at offset {}",
            self.pos
        )))
    }

    fn alternation(&mut self) -> Result<Pattern> {
        let mut result = self.concatenation()?;
        while self.peek() == Some('|') {
            self.bump();
            result = result.or(self.concatenation()?);
        }
        Ok(result)
    }

    fn concatenation(&mut self) -> Result<Pattern> {
        let mut result = Pattern::empty();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            result = result.then(self.postfix()?);
        }
        Ok(result)
    }

    fn postfix(&mut self) -> Result<Pattern> {
        let mut result = self.atom()?;
        while let Some(op) = self.peek() {
            result = match op {
                '*' => result.rep(),
                '+' => result.rep1(),
                '?' => result.opt(),
                _ => break,
            };
            self.bump();
        }
        Ok(result)
    }

    fn atom(&mut self) -> Result<Pattern> {
        match self.peek() {
            None => Err(self.error("unexpected end of pattern")),
            Some('*') | Some('+') | Some('?') => Err(self.error("nothing to repeat")),
            Some('(') => {
                self.bump();
                let inner = self.alternation()?;
                if self.bump() != Some(')') {
                    return Err(self.error("unclosed group"));
                }
                Ok(inner)
            }
            Some('[') => {
                self.bump();
                self.class()
            }
            Some('.') => {
                self.bump();
                Ok(Pattern::any_but("\n"))
            }
            Some('^') => {
                self.bump();
                Ok(Pattern::bol())
            }
            Some('$') => {
                self.bump();
                Ok(Pattern::eol())
            }
            Some('\\') => {
                self.bump();
                match self.bump() {
                    Some(c) => Ok(Pattern::ch(c)),
                    None => Err(self.error("trailing escape")),
                }
            }
            Some(c) => {
                self.bump();
                Ok(Pattern::ch(c))
            }
        }
    }

    fn class(&mut self) -> Result<Pattern> {
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut set = CharSet::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated character class")),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let start = self.class_char()?;
                    // A '-' is a range operator only between two class
                    // members; at either edge it is literal.
                    let lookahead = self.chars.get(self.pos + 1).copied();
                    if self.peek() == Some('-') && !matches!(lookahead, None | Some(']')) {
                        self.bump();
                        let end = self.class_char()?;
                        if start > end {
                            return Err(self.error("reversed character range"));
                        }
                        set.add_range(start, end);
                    } else {
                        set.add_range(start, start);
                    }
                }
            }
        }
        set.normalize();
        if set.is_empty() {
            return Err(self.error("empty character class"));
        }
        if negated {
            set = set.complement();
            if set.is_empty() {
                return Err(self.error("empty character class complement"));
            }
        }
        Ok(Pattern::from_set(set))
    }

    fn class_char(&mut self) -> Result<char> {
        match self.bump() {
            Some('\\') => self
                .bump()
                .ok_or_else(|| self.error("trailing escape")),
            Some(c) => Ok(c),
            None => Err(self.error("unterminated character class")),
        }
    }
}
