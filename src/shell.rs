// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The REPL: editor → tokenizer → pipeline runner, looping until a command
//! asks the shell to exit.

use tracing::{debug, info, warn};

use crate::editor::LineEditor;
use crate::error::FatalError;
use crate::pipeline;
use crate::tokenizer;

/// Runs the shell to completion and returns the process exit code.
pub fn run() -> Result<i32, FatalError> {
    info!("acquiring raw mode and starting the REPL");
    let mut editor = LineEditor::new()?;

    let code = loop {
        let line = editor.take_input()?;
        let line = String::from_utf8_lossy(&line).into_owned();

        let tokens = match tokenizer::tokenize(&line) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "tokenize failed");
                eprintln!("{e}");
                continue;
            }
        };
        if tokens.is_empty() {
            continue;
        }

        debug!(token_count = tokens.len(), "dispatching pipeline");
        match pipeline::run(&tokens) {
            Ok(outcome) if outcome.should_exit => break outcome.code,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "pipeline failed");
                eprintln!("{e}");
                continue;
            }
        }
    };

    info!(code, "shell loop exiting");
    Ok(code)
}
