// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Built-in dispatch table and `PATH` lookup for external programs.

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const BUILTIN_NAMES: [&str; 5] = ["exit", "echo", "type", "pwd", "cd"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Outcome of running a built-in: whether the shell loop should terminate,
/// and with which exit code. Only `exit` ever asks for termination; every
/// other built-in reports `(false, 0)` regardless of whether it printed a
/// diagnostic, matching the design's "no-exit status 0" policy for built-in
/// argument errors.
pub struct Outcome {
    pub should_exit: bool,
    pub code: i32,
}

impl Outcome {
    fn continue_loop() -> Self {
        Self { should_exit: false, code: 0 }
    }
}

/// Splits `PATH` on `:` and returns the first `dir/name` that exists, is not
/// a directory, and has any execute bit set.
pub fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var("PATH").ok()?;
    for dir in path_var.split(':') {
        let candidate = Path::new(dir).join(name);
        if let Ok(meta) = std::fs::metadata(&candidate) {
            if !meta.is_dir() && meta.permissions().mode() & 0o111 != 0 {
                return Some(candidate);
            }
        }
    }
    None
}

/// Runs a built-in. `stdout`/`stderr` are the command's wired streams (a
/// file, a pipe end, or the process's own, per the caller's choice) so
/// built-ins behave correctly as pipeline stages and under redirection.
pub fn run_builtin(
    name: &str,
    args: &[String],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> std::io::Result<Outcome> {
    match name {
        "exit" => Ok(exit(args, stderr)),
        "echo" => {
            writeln!(stdout, "{}", args.join(" "))?;
            Ok(Outcome::continue_loop())
        }
        "type" => {
            type_cmd(args, stdout, stderr)?;
            Ok(Outcome::continue_loop())
        }
        "pwd" => {
            pwd(stdout, stderr)?;
            Ok(Outcome::continue_loop())
        }
        "cd" => {
            cd(args, stderr)?;
            Ok(Outcome::continue_loop())
        }
        _ => unreachable!("run_builtin called with non-builtin name {name:?}"),
    }
}

fn exit(args: &[String], stderr: &mut dyn Write) -> Outcome {
    match args.first().map(|s| s.parse::<i32>()) {
        Some(Ok(code)) if args.len() == 1 => Outcome { should_exit: true, code },
        _ => {
            let _ = writeln!(stderr, "Invalid exit code");
            Outcome::continue_loop()
        }
    }
}

fn type_cmd(args: &[String], stdout: &mut dyn Write, stderr: &mut dyn Write) -> std::io::Result<()> {
    let Some(name) = args.first() else { return Ok(()) };
    if is_builtin(name) {
        writeln!(stdout, "{name} is a shell builtin")
    } else if let Some(path) = search_path(name) {
        writeln!(stdout, "{name} is {}", path.display())
    } else {
        writeln!(stderr, "{name}: not found")
    }
}

fn pwd(stdout: &mut dyn Write, stderr: &mut dyn Write) -> std::io::Result<()> {
    match std::env::current_dir() {
        Ok(dir) => writeln!(stdout, "{}", dir.display()),
        Err(e) => writeln!(stderr, "{e}"),
    }
}

fn cd(args: &[String], stderr: &mut dyn Write) -> std::io::Result<()> {
    match args {
        [] => Ok(()),
        [path] => {
            if std::env::set_current_dir(path).is_err() {
                writeln!(stderr, "bash: cd: {path}: No such file or directory")
            } else {
                Ok(())
            }
        }
        _ => writeln!(stderr, "bash: cd: too many arguments"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn echo_joins_with_single_spaces() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_builtin("echo", &["hello".into(), "world".into()], &mut out, &mut err).unwrap();
        assert_eq!(out, b"hello world\n");
    }

    #[test]
    fn exit_with_bad_argument_reports_and_continues() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = run_builtin("exit", &[], &mut out, &mut err).unwrap();
        assert!(!outcome.should_exit);
        assert_eq!(err, b"Invalid exit code\n");
    }

    #[test]
    fn exit_with_numeric_argument_signals_exit() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = run_builtin("exit", &["7".into()], &mut out, &mut err).unwrap();
        assert!(outcome.should_exit);
        assert_eq!(outcome.code, 7);
    }

    #[test]
    fn type_reports_builtin() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_builtin("type", &["echo".into()], &mut out, &mut err).unwrap();
        assert_eq!(out, b"echo is a shell builtin\n");
    }

    #[test]
    fn cd_too_many_arguments() {
        let mut err = Vec::new();
        cd(&["a".into(), "b".into()], &mut err).unwrap();
        assert_eq!(err, b"bash: cd: too many arguments\n");
    }

    #[test]
    fn cd_nonexistent_path() {
        let mut err = Vec::new();
        cd(&["/nonexistent-path-xyz".into()], &mut err).unwrap();
        assert_eq!(err, b"bash: cd: /nonexistent-path-xyz: No such file or directory\n");
    }
}
