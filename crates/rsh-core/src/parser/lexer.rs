//! Turns one line of input into a sequence of [`Token`]s.
//!
//! The lexer tracks three states — unquoted, single-quoted, double-quoted —
//! and fuses redirection operators (`>`, `>>`, `<`) with an optional leading
//! file-descriptor digit (`1>`, `2>>`) the same way a real shell does.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::LexError;
use crate::parser::span::Position;
use crate::parser::tokens::{RedirectMode, RedirectOp, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Single,
    Double,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            pos: Position::new(),
        }
    }

    /// Lex an entire line in one pass.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(input).run()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(c) = ch {
            self.pos.advance(c);
        }
        ch
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut word_open = false;
        let mut state = State::Normal;
        let mut escape = false;
        // Byte offset of the quote character that opened the current
        // quoted region, so an unclosed quote can be reported precisely.
        let mut quote_start: Option<Position> = None;

        while let Some(ch) = self.peek() {
            match state {
                State::Normal if escape => {
                    self.bump();
                    word.push(ch);
                    word_open = true;
                    escape = false;
                }
                State::Normal => match ch {
                    '\\' => {
                        self.bump();
                        escape = true;
                    }
                    '\'' => {
                        quote_start = Some(self.pos);
                        self.bump();
                        state = State::Single;
                        word_open = true;
                    }
                    '"' => {
                        quote_start = Some(self.pos);
                        self.bump();
                        state = State::Double;
                        word_open = true;
                    }
                    '|' => {
                        self.bump();
                        flush(&mut word, &mut word_open, &mut tokens);
                        tokens.push(Token::Pipe);
                    }
                    '>' | '<' => {
                        flush(&mut word, &mut word_open, &mut tokens);
                        let op = self.lex_redirect(None);
                        tokens.push(Token::Redirect(op));
                    }
                    '1' | '2' if !word_open => {
                        self.bump();
                        if self.peek() == Some('>') {
                            let fd = ch.to_digit(10).unwrap() as i32;
                            let op = self.lex_redirect(Some(fd));
                            tokens.push(Token::Redirect(op));
                        } else {
                            word.push(ch);
                            word_open = true;
                        }
                    }
                    c if c.is_whitespace() => {
                        self.bump();
                        flush(&mut word, &mut word_open, &mut tokens);
                    }
                    c => {
                        self.bump();
                        word.push(c);
                        word_open = true;
                    }
                },
                State::Single => match ch {
                    '\'' => {
                        self.bump();
                        state = State::Normal;
                        quote_start = None;
                    }
                    c => {
                        self.bump();
                        word.push(c);
                    }
                },
                State::Double => match ch {
                    '"' => {
                        self.bump();
                        state = State::Normal;
                        quote_start = None;
                    }
                    '\\' => {
                        self.bump();
                        match self.peek() {
                            Some('"') => {
                                self.bump();
                                word.push('"');
                            }
                            Some('\\') => {
                                self.bump();
                                word.push('\\');
                            }
                            _ => word.push('\\'),
                        }
                    }
                    c => {
                        self.bump();
                        word.push(c);
                    }
                },
            }
        }

        if escape {
            word.push('\\');
            word_open = true;
        }
        if state != State::Normal {
            let at = quote_start.unwrap_or(self.pos).0;
            return Err(LexError::UnclosedQuotes { at });
        }
        flush(&mut word, &mut word_open, &mut tokens);
        Ok(tokens)
    }

    /// Consume the operator character(s) starting at the current position.
    /// `fd_prefix` is `Some(n)` when a digit immediately preceding this
    /// operator was already consumed and fused onto it.
    fn lex_redirect(&mut self, fd_prefix: Option<i32>) -> RedirectOp {
        let first = self.bump().expect("caller peeked a redirect char");
        match first {
            '>' => {
                let fd = fd_prefix.unwrap_or(1);
                if self.peek() == Some('>') {
                    self.bump();
                    RedirectOp {
                        fd,
                        mode: RedirectMode::Append,
                    }
                } else {
                    RedirectOp {
                        fd,
                        mode: RedirectMode::Trunc,
                    }
                }
            }
            '<' => RedirectOp {
                fd: 0,
                mode: RedirectMode::Read,
            },
            other => unreachable!("lex_redirect called on non-operator char {other:?}"),
        }
    }
}

fn flush(word: &mut String, word_open: &mut bool, tokens: &mut Vec<Token>) {
    if *word_open {
        tokens.push(Token::Word(std::mem::take(word)));
        *word_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_words_round_trip() {
        let tokens = Lexer::tokenize("echo hello world").unwrap();
        assert_eq!(words(&tokens), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn single_quotes_are_fully_literal() {
        let tokens = Lexer::tokenize(r#"echo 'a b'"#).unwrap();
        assert_eq!(words(&tokens), vec!["echo", "a b"]);
    }

    #[test]
    fn double_quotes_only_escape_quote_and_backslash() {
        let tokens = Lexer::tokenize(r#"echo "a\nb""#).unwrap();
        assert_eq!(words(&tokens), vec!["echo", r"a\nb"]);

        let tokens = Lexer::tokenize(r#"echo "a\"b""#).unwrap();
        assert_eq!(words(&tokens), vec!["echo", r#"a"b"#]);

        let tokens = Lexer::tokenize(r#"echo "a\\b""#).unwrap();
        assert_eq!(words(&tokens), vec!["echo", r"a\b"]);
    }

    #[test]
    fn backslash_escapes_a_space_outside_quotes() {
        let tokens = Lexer::tokenize(r"echo a\ b").unwrap();
        assert_eq!(words(&tokens), vec!["echo", "a b"]);
    }

    #[test]
    fn unclosed_quote_is_rejected() {
        let err = Lexer::tokenize(r#"echo "abc"#).unwrap_err();
        assert_eq!(err, LexError::UnclosedQuotes { at: 5 });
    }

    #[test]
    fn unclosed_quote_reports_the_offset_of_the_opening_quote() {
        let err = Lexer::tokenize(r#"one 'two"#).unwrap_err();
        assert_eq!(err, LexError::UnclosedQuotes { at: 4 });
    }

    #[test]
    fn redirection_operators_are_recognized() {
        let tokens = Lexer::tokenize("cmd > out.txt 2>> err.txt < in.txt").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("cmd".into()),
                Token::Redirect(RedirectOp {
                    fd: 1,
                    mode: RedirectMode::Trunc
                }),
                Token::Word("out.txt".into()),
                Token::Redirect(RedirectOp {
                    fd: 2,
                    mode: RedirectMode::Append
                }),
                Token::Word("err.txt".into()),
                Token::Redirect(RedirectOp {
                    fd: 0,
                    mode: RedirectMode::Read
                }),
                Token::Word("in.txt".into()),
            ]
        );
    }

    #[test]
    fn digit_only_fuses_when_it_starts_a_fresh_word() {
        // `foo2>bar` is the word `foo2` followed by `>bar`? No: `2` is not at
        // the start of a fresh word here, so it stays part of `foo2`.
        let tokens = Lexer::tokenize("echo foo2>bar").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("foo2".into()),
                Token::Redirect(RedirectOp {
                    fd: 1,
                    mode: RedirectMode::Trunc
                }),
                Token::Word("bar".into()),
            ]
        );
    }

    #[test]
    fn pipe_splits_words() {
        let tokens = Lexer::tokenize("echo one | wc -l").unwrap();
        assert_eq!(
            words(&tokens),
            vec!["echo", "one", "wc", "-l"]
        );
        assert!(tokens.contains(&Token::Pipe));
    }

    proptest::proptest! {
        /// Any whitespace-joined sequence of alphanumeric words lexes back
        /// into exactly those words — none of quoting, escaping, or
        /// redirection fusion can trigger on a purely alphanumeric alphabet.
        #[test]
        fn round_trips_alphanumeric_words(
            words_in in proptest::collection::vec("[a-zA-Z0-9]+", 1..8)
        ) {
            let line = words_in.join(" ");
            let tokens = Lexer::tokenize(&line).unwrap();
            proptest::prop_assert_eq!(words(&tokens), words_in.iter().map(String::as_str).collect::<Vec<_>>());
        }

        /// `1`/`2` only fuse with a following `>` when they start a fresh
        /// word; prefixed onto a longer word they stay literal characters.
        #[test]
        fn digit_fusion_only_at_word_start(
            prefix in "[a-zA-Z]+",
            fd in proptest::sample::select(vec![1u8, 2]),
        ) {
            let line = format!("{prefix}{fd}>out");
            let tokens = Lexer::tokenize(&line).unwrap();
            let got: Vec<String> = words(&tokens).into_iter().map(String::from).collect();
            proptest::prop_assert_eq!(got, vec![format!("{prefix}{fd}"), "out".to_string()]);
            proptest::prop_assert!(matches!(tokens[1], Token::Redirect(_)));
        }
    }
}
