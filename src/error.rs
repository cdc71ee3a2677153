// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Error types shared across the shell's components.
//!
//! Mirrors the error-kind table in the design: most errors are local (print a
//! message, keep looping) and only terminal/IO failures during raw-mode are
//! fatal.

use std::path::PathBuf;

pub type ShellResult<T> = Result<T, ShellError>;

/// Errors produced while turning a line of input into tokens.
///
/// These are "sticky": once one is returned, whatever tokens were collected so
/// far are discarded and the whole line is rejected.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("bash: syntax error near unexpected token 'newline'")]
    UnexpectedTokenNewline,

    #[error("bash: syntax error near unexpected token '|'")]
    UnexpectedTokenPipe,

    #[error("bash: unclosed quote")]
    UnclosedQuotes,

    #[error("bash: backslash at end of input")]
    BackslashAtEnd,
}

/// Errors raised while planning redirections for a single command.
#[derive(Debug, thiserror::Error)]
pub enum RedirectionError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("{path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors: the kind of failure the design says must restore the
/// terminal and then abort the process rather than be recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("failed to read terminal attributes: {0}")]
    GetAttr(rustix::io::Errno),

    #[error("failed to set terminal attributes: {0}")]
    SetAttr(rustix::io::Errno),

    #[error("short write while rendering line: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type a caller of the crate's public API may see.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Redirection(#[from] RedirectionError),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}
