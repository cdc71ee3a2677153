// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Scoped acquisition of raw-mode termios on the controlling tty.
//!
//! Unlike the rest of the stack (which stashes the saved termios behind a
//! `LazyLock<Mutex<Option<Termios>>>` and exposes free `enable_raw_mode` /
//! `disable_raw_mode` functions) this ties restoration to a guard's `Drop`
//! impl. A process that panics mid-edit still restores the terminal as long
//! as the guard was on the stack, and there's no global mutable state to
//! poison.

use rustix::termios::{
    self, ControlModes, InputModes, LocalModes, OptionalActions, SpecialCodeIndex, Termios,
};
use std::io;
use std::os::fd::AsFd;

use crate::error::FatalError;

/// Holds the terminal's prior termios and restores it on drop.
///
/// `enable()` is the only way to construct one; there is no public
/// constructor, so a `RawModeGuard` in scope is a statically-checkable
/// witness that the tty is currently in raw mode.
pub struct RawModeGuard {
    original: Termios,
    restored: bool,
}

impl RawModeGuard {
    /// Captures the controlling tty's current termios and installs the raw
    /// variant described in the design: no CR/LF translation or
    /// flow-control (`ICRNL`, `IXON`), no echo/canonical-mode/extended-input/
    /// signal generation (`ECHO`, `ICANON`, `IEXTEN`, `ISIG`), plus `BRKINT`,
    /// `INPCK`, `ISTRIP` cleared; 8-bit characters (`CS8`); reads return
    /// after the first available byte with no timeout (`VMIN=1`, `VTIME=0`).
    ///
    /// Output processing (`OPOST`) is deliberately left untouched — the
    /// editor's own renderer writes `\r\n` explicitly where it needs a new
    /// line, and disabling `OPOST` gives nothing in return.
    pub fn enable() -> Result<Self, FatalError> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(stdin.as_fd()).map_err(FatalError::GetAttr)?;

        let mut raw = original.clone();
        raw.input_modes.remove(
            InputModes::ICRNL | InputModes::IXON | InputModes::BRKINT | InputModes::INPCK | InputModes::ISTRIP,
        );
        raw.local_modes
            .remove(LocalModes::ECHO | LocalModes::ICANON | LocalModes::IEXTEN | LocalModes::ISIG);
        raw.control_modes.remove(ControlModes::CSIZE);
        raw.control_modes.insert(ControlModes::CS8);
        raw.special_codes[SpecialCodeIndex::VMIN] = 1;
        raw.special_codes[SpecialCodeIndex::VTIME] = 0;

        termios::tcsetattr(stdin.as_fd(), OptionalActions::Now, &raw)
            .map_err(FatalError::SetAttr)?;

        Ok(Self { original, restored: false })
    }

    /// Restores the captured termios. Idempotent; `Drop` calls this too, so
    /// callers only need it when they want restoration to happen before some
    /// other action (e.g. printing `^Interrupt` on the now-cooked terminal).
    pub fn disable(&mut self) -> Result<(), FatalError> {
        if self.restored {
            return Ok(());
        }
        let stdin = io::stdin();
        termios::tcsetattr(stdin.as_fd(), OptionalActions::Now, &self.original)
            .map_err(FatalError::SetAttr)?;
        self.restored = true;
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}
