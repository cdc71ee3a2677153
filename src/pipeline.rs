// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Splits a token list into pipeline stages, wires their standard streams —
//! anonymous pipes between adjacent stages, files or inherited streams where
//! the user redirected — and runs the stages, the last one in the foreground
//! so its exit status becomes the pipeline's.

use std::fs::File;
use std::io::Write;
use std::process::Stdio;
use std::thread;

use crate::error::{RedirectionError, TokenizeError};
use crate::redirect::{self, Plan};
use crate::registry::{self, Outcome};
use crate::tokenizer::Token;

/// One end of a command's stdin/stdout/stderr.
enum Stream {
    Inherit,
    File(File),
    PipeRead(os_pipe::PipeReader),
    PipeWrite(os_pipe::PipeWriter),
}

impl Stream {
    fn from_plan_file(f: Option<File>) -> Self {
        match f {
            Some(f) => Stream::File(f),
            None => Stream::Inherit,
        }
    }

    fn is_inherit(&self) -> bool {
        matches!(self, Stream::Inherit)
    }

    fn into_stdio(self) -> Stdio {
        match self {
            Stream::Inherit => Stdio::inherit(),
            Stream::File(f) => Stdio::from(f),
            Stream::PipeRead(r) => Stdio::from(r),
            Stream::PipeWrite(w) => Stdio::from(w),
        }
    }

    fn into_writer(self, default: fn() -> Box<dyn Write + Send>) -> Box<dyn Write + Send> {
        match self {
            Stream::Inherit => default(),
            Stream::File(f) => Box::new(f),
            Stream::PipeWrite(w) => Box::new(w),
            Stream::PipeRead(_) => unreachable!("an output stream cannot be a pipe read end"),
        }
    }
}

struct Stage {
    name: String,
    args: Vec<String>,
    stdin: Stream,
    stdout: Stream,
    stderr: Stream,
}

/// The outcome of running a whole pipeline: whether the shell loop should
/// terminate, and the exit code to use if so (or to report, regardless).
pub struct PipelineOutcome {
    pub should_exit: bool,
    pub code: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Redirection(#[from] RedirectionError),
    #[error("failed to create pipe: {0}")]
    Pipe(#[from] std::io::Error),
}

/// Splits `tokens` on `Pipe`, rejecting empty stages (consecutive pipes,
/// leading/trailing pipe) the way the tokenizer rejects `||` and a leading
/// `|` — same error kind, just discovered one layer later, after a trailing
/// pipe's emptiness can only be seen once the whole line has been split.
fn split_on_pipes(tokens: &[Token]) -> Result<Vec<&[Token]>, TokenizeError> {
    let mut stages = Vec::new();
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        if matches!(tok, Token::Pipe) {
            stages.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    stages.push(&tokens[start..]);

    if stages.iter().any(|s| s.is_empty()) {
        return Err(TokenizeError::UnexpectedTokenPipe);
    }
    Ok(stages)
}

fn build_stage(tail: &[Token]) -> Result<Stage, RedirectionError> {
    let name = match tail.first() {
        Some(Token::Word(w)) => w.clone(),
        _ => String::new(),
    };
    let rest = if matches!(tail.first(), Some(Token::Word(_))) { &tail[1..] } else { tail };

    let Plan { argv, stdin, stdout, stderr } = redirect::plan(rest)?;
    Ok(Stage {
        name,
        args: argv,
        stdin: Stream::from_plan_file(stdin),
        stdout: Stream::from_plan_file(stdout),
        stderr: Stream::from_plan_file(stderr),
    })
}

/// Only creates a pipe between adjacent stages when at least one side is
/// still `Inherit`; the unused side of a created pipe is dropped immediately
/// so it doesn't linger as a phantom writer/reader that would otherwise
/// block the other end from seeing EOF.
fn wire_pipes(stages: &mut [Stage]) -> std::io::Result<()> {
    for i in 0..stages.len().saturating_sub(1) {
        let left_inherit = stages[i].stdout.is_inherit();
        let right_inherit = stages[i + 1].stdin.is_inherit();
        if !left_inherit && !right_inherit {
            continue;
        }
        let (reader, writer) = os_pipe::pipe()?;
        if left_inherit {
            stages[i].stdout = Stream::PipeWrite(writer);
        }
        if right_inherit {
            stages[i + 1].stdin = Stream::PipeRead(reader);
        }
    }
    Ok(())
}

/// Runs one stage to completion, returning its exit signal. Every stream the
/// stage owns is dropped (closed) when this function returns, regardless of
/// which branch ran.
fn run_stage(stage: Stage) -> Outcome {
    if stage.name.is_empty() {
        return Outcome { should_exit: false, code: 0 };
    }

    if registry::is_builtin(&stage.name) {
        let mut stdout = stage.stdout.into_writer(|| Box::new(std::io::stdout()));
        let mut stderr = stage.stderr.into_writer(|| Box::new(std::io::stderr()));
        drop(stage.stdin);
        registry::run_builtin(&stage.name, &stage.args, &mut *stdout, &mut *stderr)
            .unwrap_or(Outcome { should_exit: false, code: 0 })
    } else if let Some(path) = registry::search_path(&stage.name) {
        let status = std::process::Command::new(path)
            .args(&stage.args)
            .stdin(stage.stdin.into_stdio())
            .stdout(stage.stdout.into_stdio())
            .stderr(stage.stderr.into_stdio())
            .status();
        match status {
            Ok(status) => Outcome { should_exit: false, code: status.code().unwrap_or(1) },
            Err(e) => {
                // `search_path` already confirmed this entry; a spawn failure
                // here is a system error (e.g. the file's permissions changed
                // between the stat and the exec), not a lookup miss, so it
                // gets the system error message rather than "not found".
                eprintln!("{}: {e}", stage.name);
                Outcome { should_exit: false, code: 126 }
            }
        }
    } else {
        drop(stage.stdin);
        drop(stage.stdout);
        let mut stderr = stage.stderr.into_writer(|| Box::new(std::io::stderr()));
        report_not_found_to(&stage.name, &stage.args, &mut *stderr);
        Outcome { should_exit: false, code: 127 }
    }
}

fn report_not_found_to(name: &str, args: &[String], w: &mut dyn Write) {
    let cmdline = if args.is_empty() { name.to_string() } else { format!("{name} {}", args.join(" ")) };
    let _ = writeln!(w, "{cmdline}: command not found");
}

/// Tokenizes a line's tokens into stages, wires them, runs the pipeline, and
/// reports the last stage's exit signal.
pub fn run(tokens: &[Token]) -> Result<PipelineOutcome, PipelineError> {
    let stage_tails = split_on_pipes(tokens)?;
    let mut stages: Vec<Stage> = stage_tails.into_iter().map(build_stage).collect::<Result<_, _>>()?;
    wire_pipes(&mut stages)?;

    let last = stages.pop().expect("split_on_pipes always yields at least one stage");

    let handles: Vec<_> = stages
        .into_iter()
        .map(|stage| thread::spawn(move || run_stage(stage)))
        .collect();

    let outcome = run_stage(last);

    for handle in handles {
        let _ = handle.join();
    }

    Ok(PipelineOutcome { should_exit: outcome.should_exit, code: outcome.code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_echo_stage() {
        let tokens = tokenize("echo hello world\n").unwrap();
        let outcome = run(&tokens).unwrap();
        assert!(!outcome.should_exit);
        assert_eq!(outcome.code, 0);
    }

    #[test]
    fn exit_signals_termination() {
        let tokens = tokenize("exit 3\n").unwrap();
        let outcome = run(&tokens).unwrap();
        assert!(outcome.should_exit);
        assert_eq!(outcome.code, 3);
    }

    #[test]
    fn trailing_pipe_is_rejected() {
        let tokens = vec![Token::Word("echo".into()), Token::Word("x".into()), Token::Pipe];
        assert!(matches!(run(&tokens), Err(PipelineError::Tokenize(TokenizeError::UnexpectedTokenPipe))));
    }
}
