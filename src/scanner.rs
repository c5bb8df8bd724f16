//! Module with the scanner runtime.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;

use log::trace;

use crate::internal::{partition, InputStream, ModeID, RuleID, Symbol};
use crate::{Action, Lexicon, LexrError, LexrErrorKind, Position, Result, Token};

/// The hook invoked exactly once when the input is exhausted, just before the
/// scanner emits the terminal sentinel. The hook may still queue tokens with
/// [Scanner::produce_with]; they are drained before the sentinel.
pub type EofHook<T, U> = Box<dyn FnOnce(&mut Scanner<T, U>) -> Result<()> + Send + Sync>;

/// A scanner drives the DFAs of a compiled [Lexicon] over one input stream.
///
/// The scanner is in exactly one scanner state at a time and reads the
/// longest match starting at the current cursor, breaking ties in favor of
/// the rule with the lowest index. A scanner instance is single-threaded; the
/// lexicon behind it is shared and immutable, so any number of scanners can
/// run against the same lexicon concurrently.
pub struct Scanner<T, U = ()> {
    lexicon: Arc<Lexicon<T, U>>,
    stream: InputStream,
    mode: ModeID,
    queue: VecDeque<Token<T>>,
    name: String,
    token_position: Position,
    user: U,
    eof_hook: Option<EofHook<T, U>>,
    eof_emitted: bool,
    /// The text of the match whose action is currently being dispatched.
    /// [Scanner::produce] copies it as the default token text.
    dispatch_text: String,
}

/// The outcome of one longest-match attempt.
enum Scan {
    Match { rule: RuleID, text: String },
    EndOfInput,
}

impl<T, U> Scanner<T, U> {
    /// Creates a scanner over a readable input.
    pub fn new<R>(lexicon: Arc<Lexicon<T, U>>, input: R) -> Self
    where
        R: Read + 'static,
        U: Default,
    {
        Self::with_user_state(lexicon, input, U::default())
    }

    /// Creates a scanner with an explicit initial user state.
    pub fn with_user_state<R>(lexicon: Arc<Lexicon<T, U>>, input: R, user: U) -> Self
    where
        R: Read + 'static,
    {
        Self::from_stream(lexicon, InputStream::new(Box::new(input)), user)
    }

    /// Creates a scanner over an in-memory string.
    pub fn from_str(lexicon: Arc<Lexicon<T, U>>, input: &str) -> Self
    where
        U: Default,
    {
        Self::from_stream(lexicon, InputStream::from_str(input), U::default())
    }

    fn from_stream(lexicon: Arc<Lexicon<T, U>>, stream: InputStream, user: U) -> Self {
        Self {
            lexicon,
            stream,
            mode: ModeID::new(0),
            queue: VecDeque::new(),
            name: String::new(),
            token_position: Position::new(1, 0),
            user,
            eof_hook: None,
            eof_emitted: false,
            dispatch_text: String::new(),
        }
    }

    /// Sets the name reported by [position](Scanner::position) and carried by
    /// runtime errors, typically the file name of the input.
    pub fn with_name<N>(mut self, name: N) -> Self
    where
        N: Into<String>,
    {
        self.name = name.into();
        self
    }

    /// Installs the end-of-input hook.
    pub fn on_eof<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut Scanner<T, U>) -> Result<()> + Send + Sync + 'static,
    {
        self.eof_hook = Some(Box::new(hook));
        self
    }

    /// The name of the active scanner state.
    pub fn state_name(&self) -> &str {
        self.lexicon.mode_name(self.mode)
    }

    /// The user state attached to the scanner.
    pub fn user(&self) -> &U {
        &self.user
    }

    /// The user state attached to the scanner, mutably. Actions use this for
    /// stateful scanning, e.g. a comment nesting depth or an indentation
    /// stack.
    pub fn user_mut(&mut self) -> &mut U {
        &mut self.user
    }

    /// The scanner name and the position of the first character of the most
    /// recently returned token.
    pub fn position(&self) -> (&str, Position) {
        (&self.name, self.token_position)
    }

    /// Switches to the named scanner state. Switching to the active state is
    /// a no-op. No match is in progress when this is legal to call: either
    /// from within an action or between two `read` calls.
    pub fn begin(&mut self, name: &str) -> Result<()> {
        match self.lexicon.mode_index(name) {
            Some(mode) => {
                self.mode = mode;
                Ok(())
            }
            None => Err(LexrError::new(LexrErrorKind::UnknownState(
                name.to_string(),
            ))),
        }
    }

    /// Queues a token with the text of the match being dispatched (the empty
    /// string within the EOF hook). Queued tokens are returned by subsequent
    /// `read` calls, in insertion order, before the automaton takes another
    /// step.
    pub fn produce(&mut self, value: T) {
        let text = self.dispatch_text.clone();
        self.queue.push_back(Token::Value(value, text));
    }

    /// Queues a token with an explicit text.
    pub fn produce_with(&mut self, value: T, text: &str) {
        self.queue.push_back(Token::Value(value, text.to_string()));
    }

    /// Wraps an action error with the current token position unless it
    /// already carries one.
    fn attach_position(&self, error: LexrError) -> LexrError {
        if error.has_position() {
            return error;
        }
        LexrError::new(LexrErrorKind::Positioned {
            name: self.name.clone(),
            position: self.token_position,
            source: Box::new(error),
        })
    }
}

impl<T, U> Scanner<T, U>
where
    T: Clone,
{
    /// Returns the next token, or `Ok(None)` once the input is exhausted.
    ///
    /// Queued tokens are drained first. Otherwise the scanner runs the DFA of
    /// the active state from the current cursor, consumes the longest match
    /// and dispatches its action; actions that yield nothing make the scanner
    /// resume at the character after the match. At the end of the input the
    /// EOF hook runs once, remaining queued tokens are drained, and every
    /// further call returns `Ok(None)`.
    pub fn read(&mut self) -> Result<Option<Token<T>>> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Ok(Some(token));
            }
            if self.eof_emitted {
                return Ok(None);
            }
            let start = self.stream.position();
            match self.scan_one()? {
                Scan::Match { rule, text } => {
                    self.token_position = start;
                    if let Some(token) = self.dispatch(rule, text)? {
                        return Ok(Some(token));
                    }
                }
                Scan::EndOfInput => {
                    self.token_position = start;
                    self.run_eof_hook()?;
                    self.eof_emitted = true;
                }
            }
        }
    }

    /// One longest-match attempt starting at the current cursor.
    fn scan_one(&mut self) -> Result<Scan> {
        let lexicon = Arc::clone(&self.lexicon);
        let dfa = lexicon.dfa(self.mode);
        let char_partition = lexicon.partition();

        let mut state = dfa.start_state();
        let mut consumed: Vec<(Symbol, Position)> = Vec::new();
        let mut text = String::new();
        let mut last_accept: Option<(usize, usize, RuleID)> = None;

        loop {
            let Some((symbol, position)) = self.stream.peek()? else {
                break;
            };
            let class = match symbol {
                Symbol::Ch(c) => char_partition.class_of(c),
                Symbol::Anchor(anchor) => partition::anchor_class(anchor),
            };
            match dfa.next(state, class) {
                Some(next) => {
                    self.stream.advance();
                    if let Symbol::Ch(c) = symbol {
                        text.push(c);
                    }
                    consumed.push((symbol, position));
                    state = next;
                    if let Some(rule) = dfa.accept(state) {
                        last_accept = Some((consumed.len(), text.len(), rule));
                    }
                }
                None if symbol.is_anchor() => {
                    // The anchor is transparent here: consume it, hold the
                    // automaton state and re-read.
                    self.stream.advance();
                    consumed.push((symbol, position));
                }
                None => break,
            }
        }

        if let Some((consumed_len, text_len, rule)) = last_accept {
            // Cut the match back to the last accept and return the
            // over-consumed symbols, anchors included.
            self.stream.push_back(&consumed[consumed_len..]);
            text.truncate(text_len);
            trace!(
                "matched rule {} in state '{}': {:?}",
                rule,
                self.state_name(),
                text
            );
            return Ok(Scan::Match { rule, text });
        }

        match self.stream.peek()? {
            None if text.is_empty() => Ok(Scan::EndOfInput),
            next => {
                let offending = consumed
                    .iter()
                    .find_map(|&(symbol, position)| symbol.char().map(|c| (c, position)))
                    .or_else(|| {
                        next.and_then(|(symbol, position)| symbol.char().map(|c| (c, position)))
                    });
                self.stream.push_back(&consumed);
                match offending {
                    Some((symbol, position)) => {
                        Err(LexrError::new(LexrErrorKind::UnrecognizedInput {
                            name: self.name.clone(),
                            position,
                            symbol,
                        }))
                    }
                    // Only anchors remained; treat as exhausted input.
                    None => Ok(Scan::EndOfInput),
                }
            }
        }
    }

    /// Dispatches the action of a matched rule. Returns the token to yield,
    /// or `None` when scanning resumes (the caller also drains the queue, so
    /// tokens produced by a `Call` action come out first).
    fn dispatch(&mut self, rule: RuleID, text: String) -> Result<Option<Token<T>>> {
        let lexicon = Arc::clone(&self.lexicon);
        match lexicon.action(self.mode, rule) {
            Action::Ignore => Ok(None),
            Action::Text => Ok(Some(Token::Text(text))),
            Action::Return(value) => Ok(Some(Token::Value(value.clone(), text))),
            Action::Begin(state) => {
                // The target was validated when the lexicon was built.
                self.begin(state)?;
                Ok(None)
            }
            Action::Call(action) => {
                self.dispatch_text = text.clone();
                let result = action.as_ref()(self, &text);
                self.dispatch_text.clear();
                match result {
                    Err(error) => Err(self.attach_position(error)),
                    Ok(Some(value)) => {
                        if self.queue.is_empty() {
                            Ok(Some(Token::Value(value, text)))
                        } else {
                            // Produced tokens are drained first; the returned
                            // value lines up behind them.
                            self.queue.push_back(Token::Value(value, text));
                            Ok(None)
                        }
                    }
                    Ok(None) => Ok(None),
                }
            }
        }
    }

    fn run_eof_hook(&mut self) -> Result<()> {
        if let Some(hook) = self.eof_hook.take() {
            self.dispatch_text.clear();
            if let Err(error) = hook(self) {
                return Err(self.attach_position(error));
            }
        }
        Ok(())
    }
}

impl<T, U> std::fmt::Debug for Scanner<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("name", &self.name)
            .field("state", &self.state_name())
            .field("position", &self.token_position)
            .field("queued", &self.queue.len())
            .finish()
    }
}
