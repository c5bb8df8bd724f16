use std::sync::Arc;

use lexr::{re, Action, Lexicon, LexrErrorKind, Pattern, Position, Scanner, Token};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collects all tokens until the sentinel.
fn collect_tokens<T, U>(scanner: &mut Scanner<T, U>) -> Vec<Token<T>>
where
    T: Clone,
{
    let mut tokens = Vec::new();
    while let Some(token) = scanner.read().unwrap() {
        tokens.push(token);
    }
    tokens
}

fn whitespace() -> Pattern {
    Pattern::any_of(" \t\n").rep1()
}

fn identifier() -> Pattern {
    Pattern::range("AZaz").unwrap() + Pattern::range("AZaz09").unwrap().rep()
}

#[test]
fn test_keywords_and_whitespace() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::lit("Python"), Action::Return("A"))
        .rule(Pattern::lit("Perl"), Action::Return("B"))
        .rule(Pattern::lit("rocks"), Action::Return("C"))
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "Python rocks");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("A", "Python".into()))
    );
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("C", "rocks".into()))
    );
    assert_eq!(scanner.read().unwrap(), None);
    // The sentinel is idempotent.
    assert_eq!(scanner.read().unwrap(), None);
}

#[test]
fn test_reserved_words_beat_identifiers() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::lits(["if", "then", "else", "end"]), Action::Text)
        .rule(identifier(), Action::Return("ident"))
        .rule(Pattern::range("09").unwrap().rep1(), Action::Return("int"))
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "if x1 42");
    assert_eq!(
        collect_tokens(&mut scanner),
        vec![
            Token::Text("if".into()),
            Token::Value("ident", "x1".into()),
            Token::Value("int", "42".into()),
        ]
    );
}

#[test]
fn test_longest_match_and_priority_tie_break() {
    init();
    let lexicon = || {
        let lexicon: Lexicon<&str> = Lexicon::builder()
            .rule(Pattern::lit("if"), Action::Return("K"))
            .rule(Pattern::lit("ident"), Action::Return("I"))
            .rule(
                Pattern::range("az").unwrap() + Pattern::range("az").unwrap().rep(),
                Action::Return("id"),
            )
            .build()
            .unwrap();
        Arc::new(lexicon)
    };
    // The identifier match is longer and wins.
    let mut scanner = Scanner::from_str(lexicon(), "ifx");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("id", "ifx".into()))
    );
    // Equal lengths: the lower rule index wins.
    let mut scanner = Scanner::from_str(lexicon(), "if");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("K", "if".into()))
    );
}

/// A longest-match attempt that overshoots must hand the over-consumed
/// characters back in order.
#[test]
fn test_backtracking_after_overshoot() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::lit("ifxy"), Action::Return("K4"))
        .rule(Pattern::lit("if"), Action::Return("K2"))
        .rule(Pattern::ch('x'), Action::Return("X"))
        .rule(Pattern::ch('z'), Action::Return("Z"))
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "ifxz");
    assert_eq!(
        collect_tokens(&mut scanner),
        vec![
            Token::Value("K2", "if".into()),
            Token::Value("X", "x".into()),
            Token::Value("Z", "z".into()),
        ]
    );
}

#[test]
fn test_nested_comments_with_scanner_states() {
    init();
    let lexicon: Lexicon<&str, usize> = Lexicon::builder()
        .rule(identifier(), Action::Return("ident"))
        .rule(whitespace(), Action::Ignore)
        .rule(
            Pattern::lit("(*"),
            Action::call(|scanner, _| {
                *scanner.user_mut() += 1;
                scanner.begin("COMMENT")?;
                Ok(None)
            }),
        )
        .state(
            "COMMENT",
            [
                (
                    Pattern::lit("(*"),
                    Action::call(|scanner: &mut Scanner<&str, usize>, _: &str| {
                        *scanner.user_mut() += 1;
                        Ok(None)
                    }),
                ),
                (
                    Pattern::lit("*)"),
                    Action::call(|scanner: &mut Scanner<&str, usize>, _: &str| {
                        *scanner.user_mut() -= 1;
                        if *scanner.user() == 0 {
                            scanner.begin("")?;
                        }
                        Ok(None)
                    }),
                ),
                (Pattern::any_char(), Action::Ignore),
            ],
        )
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "a (* b (* c *) d *) e");
    assert_eq!(
        collect_tokens(&mut scanner),
        vec![
            Token::Value("ident", "a".into()),
            Token::Value("ident", "e".into()),
        ]
    );
    assert_eq!(scanner.state_name(), "");
}

/// While a state is active, only its own patterns can match.
#[test]
fn test_state_restriction() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::ch('>'), Action::begin("NUM"))
        .rule(identifier(), Action::Text)
        .state(
            "NUM",
            [
                (Pattern::range("09").unwrap().rep1(), Action::Return("int")),
                (Pattern::ch('<'), Action::begin("")),
            ],
        )
        .build()
        .unwrap();
    // Identifiers are not recognized inside NUM.
    let mut scanner = Scanner::from_str(Arc::new(lexicon), ">12ab");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("int", "12".into()))
    );
    let error = scanner.read().unwrap_err();
    assert!(matches!(
        *error.source,
        LexrErrorKind::UnrecognizedInput { symbol: 'a', .. }
    ));
}

/// The indent scanner of the classic offside-rule shape: an action measures
/// the leading whitespace of every line against an indentation stack in the
/// user state and queues NEWLINE/INDENT/DEDENT tokens.
fn indent_lexicon() -> Arc<Lexicon<&'static str, Vec<usize>>> {
    let lexicon = Lexicon::builder()
        .rule(identifier(), Action::Text)
        .rule(Pattern::ch(' ').rep1(), Action::Ignore)
        .rule(
            Pattern::ch('\n') + Pattern::ch(' ').rep(),
            Action::call(|scanner: &mut Scanner<&str, Vec<usize>>, text: &str| {
                let width = text.len() - 1;
                scanner.produce_with("NEWLINE", "\n");
                let mut top = *scanner.user().last().unwrap();
                if width > top {
                    scanner.user_mut().push(width);
                    scanner.produce_with("INDENT", "");
                } else {
                    while width < top {
                        scanner.user_mut().pop();
                        top = *scanner.user().last().unwrap();
                        scanner.produce_with("DEDENT", "");
                    }
                }
                Ok(None)
            }),
        )
        .build()
        .unwrap();
    Arc::new(lexicon)
}

fn token_labels(tokens: &[Token<&str>]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Value(value, _) => value.to_string(),
            Token::Text(text) => format!("name({text})"),
        })
        .collect()
}

#[test]
fn test_indent_scanner() {
    init();
    let mut scanner = Scanner::with_user_state(
        indent_lexicon(),
        std::io::Cursor::new(b"a\n  b\n  c\nd\n".to_vec()),
        vec![0],
    );
    let tokens = collect_tokens(&mut scanner);
    assert_eq!(
        token_labels(&tokens),
        vec![
            "name(a)", "NEWLINE", "INDENT", "name(b)", "NEWLINE", "name(c)", "NEWLINE", "DEDENT",
            "name(d)", "NEWLINE",
        ]
    );
}

#[test]
fn test_indent_scanner_eof_hook_closes_open_blocks() {
    init();
    let mut scanner = Scanner::with_user_state(
        indent_lexicon(),
        std::io::Cursor::new(b"a\n  b".to_vec()),
        vec![0],
    )
    .on_eof(|scanner| {
        while *scanner.user().last().unwrap() > 0 {
            scanner.user_mut().pop();
            scanner.produce("DEDENT");
        }
        Ok(())
    });
    let tokens = collect_tokens(&mut scanner);
    assert_eq!(
        token_labels(&tokens),
        vec!["name(a)", "NEWLINE", "INDENT", "name(b)", "DEDENT"]
    );
    // Hook-produced tokens come before the sentinel, which stays idempotent.
    assert_eq!(scanner.read().unwrap(), None);
}

#[test]
fn test_bol_anchor() {
    init();
    let lexicon = || {
        let lexicon: Lexicon<&str> = Lexicon::builder()
            .rule(Pattern::bol() + Pattern::lit("From:"), Action::Return("FROM"))
            .rule(Pattern::any_char(), Action::Ignore)
            .build()
            .unwrap();
        Arc::new(lexicon)
    };
    let mut scanner = Scanner::from_str(lexicon(), "From: a\nFrom: b");
    let tokens = collect_tokens(&mut scanner);
    assert_eq!(
        tokens,
        vec![
            Token::Value("FROM", "From:".into()),
            Token::Value("FROM", "From:".into()),
        ]
    );
    // Not at the beginning of a line: no match.
    let mut scanner = Scanner::from_str(lexicon(), "xFrom:");
    assert_eq!(collect_tokens(&mut scanner), vec![]);
}

#[test]
fn test_eol_anchor() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::ch('a') + Pattern::eol(), Action::Return("AEOL"))
        .rule(Pattern::any_char(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "ba\nab");
    let tokens = collect_tokens(&mut scanner);
    // Only the 'a' directly before the newline matches; the anchor is not
    // part of the token text.
    assert_eq!(tokens, vec![Token::Value("AEOL", "a".into())]);
}

#[test]
fn test_eof_anchor() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(identifier(), Action::Text)
        .rule(whitespace(), Action::Ignore)
        .rule(Pattern::eof(), Action::Return("EOF"))
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "hello");
    let tokens = collect_tokens(&mut scanner);
    assert_eq!(
        tokens,
        vec![
            Token::Text("hello".into()),
            Token::Value("EOF", "".into()),
        ]
    );
    assert_eq!(scanner.read().unwrap(), None);
}

#[test]
fn test_positions_track_token_starts() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(identifier(), Action::Text)
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "ab cd\nef").with_name("input.txt");
    let mut positions = Vec::new();
    while let Some(token) = scanner.read().unwrap() {
        let (name, position) = scanner.position();
        assert_eq!(name, "input.txt");
        positions.push((token.into_text(), position));
    }
    assert_eq!(
        positions,
        vec![
            ("ab".to_string(), Position::new(1, 0)),
            ("cd".to_string(), Position::new(1, 3)),
            ("ef".to_string(), Position::new(2, 0)),
        ]
    );
}

#[test]
fn test_unrecognized_input_carries_position() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(identifier(), Action::Text)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "ab!").with_name("bad.txt");
    assert_eq!(scanner.read().unwrap(), Some(Token::Text("ab".into())));
    let error = scanner.read().unwrap_err();
    match *error.source {
        LexrErrorKind::UnrecognizedInput {
            ref name,
            position,
            symbol,
        } => {
            assert_eq!(name, "bad.txt");
            assert_eq!(position, Position::new(1, 2));
            assert_eq!(symbol, '!');
        }
        ref other => panic!("unexpected error kind: {other}"),
    }
}

#[test]
fn test_produced_tokens_come_before_the_returned_value() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(
            identifier(),
            Action::call(|scanner: &mut Scanner<&str>, _: &str| {
                scanner.produce("FIRST");
                scanner.produce("SECOND");
                Ok(Some("LAST"))
            }),
        )
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "abc");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("FIRST", "abc".into()))
    );
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("SECOND", "abc".into()))
    );
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("LAST", "abc".into()))
    );
    assert_eq!(scanner.read().unwrap(), None);
}

#[test]
fn test_call_returning_none_resumes_scanning() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(
            Pattern::lit("skip"),
            Action::call(|_: &mut Scanner<&str>, _: &str| Ok(None)),
        )
        .rule(identifier(), Action::Return("ident"))
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "skip rest");
    assert_eq!(
        scanner.read().unwrap(),
        Some(Token::Value("ident", "rest".into()))
    );
}

#[test]
fn test_action_errors_are_annotated_with_the_position() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(
            identifier(),
            Action::call(|_: &mut Scanner<&str>, _: &str| {
                Err(lexr::LexrError::action("rejected"))
            }),
        )
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "\nboom").with_name("act.txt");
    let error = scanner.read().unwrap_err();
    match *error.source {
        LexrErrorKind::Positioned {
            ref name, position, ..
        } => {
            assert_eq!(name, "act.txt");
            assert_eq!(position, Position::new(2, 0));
        }
        ref other => panic!("unexpected error kind: {other}"),
    }
    assert!(error.to_string().contains("rejected"));
}

#[test]
fn test_begin_to_unknown_state_fails() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(identifier(), Action::Text)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "x");
    let error = scanner.begin("NOPE").unwrap_err();
    assert!(matches!(*error.source, LexrErrorKind::UnknownState(_)));
    // Switching to the active state is a no-op.
    scanner.begin("").unwrap();
    assert_eq!(scanner.read().unwrap(), Some(Token::Text("x".into())));
}

#[test]
fn test_nocase_matching() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(Pattern::lit("select").nocase(), Action::Return("SELECT"))
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "SeLeCt select");
    assert_eq!(
        collect_tokens(&mut scanner),
        vec![
            Token::Value("SELECT", "SeLeCt".into()),
            Token::Value("SELECT", "select".into()),
        ]
    );
}

#[test]
fn test_traditional_regex_front_end() {
    init();
    let lexicon: Lexicon<&str> = Lexicon::builder()
        .rule(re("[0-9]+\\.[0-9]+").unwrap(), Action::Return("float"))
        .rule(re("[0-9]+").unwrap(), Action::Return("int"))
        .rule(re("[ \t\n]+").unwrap(), Action::Ignore)
        .build()
        .unwrap();
    let mut scanner = Scanner::from_str(Arc::new(lexicon), "3.14 42");
    assert_eq!(
        collect_tokens(&mut scanner),
        vec![
            Token::Value("float", "3.14".into()),
            Token::Value("int", "42".into()),
        ]
    );
}

/// One lexicon, many scanners: the compiled artifact is immutable and shared.
#[test]
fn test_lexicon_is_shareable_across_threads() {
    init();
    let lexicon: Lexicon<String> = Lexicon::builder()
        .rule(identifier(), Action::Return("ident".to_string()))
        .rule(whitespace(), Action::Ignore)
        .build()
        .unwrap();
    let lexicon = Arc::new(lexicon);
    let handles: Vec<_> = (0..4)
        .map(|index| {
            let lexicon = Arc::clone(&lexicon);
            std::thread::spawn(move || {
                let input = format!("word{index} more");
                let mut scanner = Scanner::from_str(lexicon, &input);
                collect_tokens(&mut scanner).len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
