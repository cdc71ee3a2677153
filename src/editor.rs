// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw-mode line editor: owns the terminal, decodes keystrokes byte by byte,
//! maintains an in-place edit buffer, renders the prompt line via ANSI
//! control codes, and drives tab-completion from a [`Trie`].

use std::io::{self, Read, Write};

use crate::error::FatalError;
use crate::raw_mode::RawModeGuard;
use crate::trie::{Completion, Trie};

const PROMPT: &str = "$ ";

/// A decoded keystroke. Multi-byte ANSI sequences collapse to one variant;
/// anything that doesn't match a known sequence (including a lone, dangling
/// `ESC`) comes back as `Escape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Enter,
    Tab,
    ClearScreen,
    Backspace,
    Delete,
    Interrupt,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
    Printable(u8),
}

/// `{ bytes, cursor }` from the design: `cursor` is a column offset on the
/// visible line, including the prompt prefix, so it's always in
/// `[PROMPT.len(), PROMPT.len() + bytes.len()]`.
struct EditBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl EditBuffer {
    fn new() -> Self {
        Self { bytes: Vec::new(), cursor: PROMPT.len() }
    }

    fn insert_pos(&self) -> usize {
        self.cursor - PROMPT.len()
    }
}

pub struct LineEditor {
    raw_mode: RawModeGuard,
    trie: Trie,
}

impl LineEditor {
    /// Acquires raw mode and builds the completion trie from the built-in
    /// names plus every executable filename found on `PATH` right now. The
    /// corpus is captured once; later `PATH` changes aren't observed (see
    /// design notes on the completion corpus).
    pub fn new() -> Result<Self, FatalError> {
        let raw_mode = RawModeGuard::enable()?;
        Ok(Self { raw_mode, trie: build_completion_trie() })
    }

    /// Reads and edits one line. Returns the committed buffer including the
    /// trailing `\n` sentinel the tokenizer expects.
    pub fn take_input(&mut self) -> Result<Vec<u8>, FatalError> {
        let mut buf = EditBuffer::new();
        let stdin = io::stdin();
        let mut reader = stdin.lock();

        self.render(&buf)?;
        loop {
            let key = read_key(&mut reader)?;
            match key {
                Key::Enter => {
                    buf.bytes.push(b'\n');
                    self.render(&buf)?;
                    return Ok(buf.bytes);
                }
                Key::Tab => self.complete(&mut buf)?,
                Key::ClearScreen => {
                    self.write_all(b"\x1b[2J\x1b[H")?;
                    self.render(&buf)?;
                }
                Key::Backspace => {
                    if buf.insert_pos() > 0 {
                        let pos = buf.insert_pos();
                        buf.bytes.remove(pos - 1);
                        buf.cursor -= 1;
                    }
                    self.render(&buf)?;
                }
                Key::Delete => {
                    let pos = buf.insert_pos();
                    if pos < buf.bytes.len() {
                        buf.bytes.remove(pos);
                    }
                    self.render(&buf)?;
                }
                Key::Interrupt => {
                    self.write_all(b"^Interrupt\r\n")?;
                    let _ = self.raw_mode.disable();
                    std::process::exit(0);
                }
                Key::Left => {
                    if buf.cursor > PROMPT.len() {
                        buf.cursor -= 1;
                    }
                    self.render(&buf)?;
                }
                Key::Right => {
                    if buf.cursor < PROMPT.len() + buf.bytes.len() {
                        buf.cursor += 1;
                    }
                    self.render(&buf)?;
                }
                Key::Up | Key::Down => self.write_all(b"\x07")?,
                Key::Home | Key::End | Key::PageUp | Key::PageDown => {
                    // Reserved; no-op is acceptable per the design.
                }
                Key::Escape => {}
                Key::Printable(b) => {
                    let pos = buf.insert_pos();
                    buf.bytes.insert(pos, b);
                    buf.cursor += 1;
                    self.render(&buf)?;
                }
            }
        }
    }

    fn complete(&mut self, buf: &mut EditBuffer) -> Result<(), FatalError> {
        if buf.bytes.is_empty() {
            self.write_all(b"\x07")?;
            return self.render(buf);
        }
        let word = String::from_utf8_lossy(&buf.bytes).into_owned();
        match self.trie.complete(&word) {
            Completion::One { suffix } => {
                buf.bytes.extend_from_slice(suffix.as_bytes());
                buf.bytes.push(b' ');
                buf.cursor += suffix.len() + 1;
            }
            Completion::Many | Completion::None => {
                self.write_all(b"\x07")?;
            }
        }
        self.render(buf)
    }

    /// `ESC[?25l` hide cursor, `ESC[G` column 1, `ESC[K` erase to EOL, the
    /// prompt and buffer, `ESC[<cursor>G` absolute column, `ESC[?25h` show
    /// cursor — issued as a single write; a short write is fatal.
    fn render(&self, buf: &EditBuffer) -> Result<(), FatalError> {
        let mut out = Vec::with_capacity(32 + buf.bytes.len());
        out.extend_from_slice(b"\x1b[?25l");
        out.extend_from_slice(b"\x1b[G");
        out.extend_from_slice(b"\x1b[K");
        out.extend_from_slice(PROMPT.as_bytes());
        out.extend_from_slice(&buf.bytes);
        out.extend_from_slice(format!("\x1b[{}G", buf.cursor + 1).as_bytes());
        out.extend_from_slice(b"\x1b[?25h");
        self.write_all(&out)
    }

    fn write_all(&self, bytes: &[u8]) -> Result<(), FatalError> {
        let mut stdout = io::stdout();
        let written = stdout.write(bytes)?;
        if written != bytes.len() {
            return Err(FatalError::ShortWrite { written, expected: bytes.len() });
        }
        stdout.flush()?;
        Ok(())
    }
}

fn build_completion_trie() -> Trie {
    let mut trie = Trie::new();
    for name in crate::registry::BUILTIN_NAMES {
        trie.insert(name);
    }
    if let Ok(path_var) = std::env::var("PATH") {
        for dir in path_var.split(':') {
            let Ok(entries) = std::fs::read_dir(dir) else { continue };
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    trie.insert(name);
                }
            }
        }
    }
    trie
}

/// Byte reinterpreted as a Unicode code point is "printable" for editing
/// purposes when it's ASCII printable or in the Latin-1 printable range;
/// this mirrors the original's `unicode.IsPrint(rune(byte))` check rather
/// than decoding UTF-8 multi-byte sequences.
fn is_printable_byte(b: u8) -> bool {
    matches!(b, 0x20..=0x7E | 0xA0..=0xFF)
}

fn read_key(reader: &mut impl Read) -> Result<Key, FatalError> {
    let mut one = [0u8; 1];
    reader.read_exact(&mut one)?;
    let c = one[0];

    Ok(match c {
        b'\r' | b'\n' => Key::Enter,
        b'\t' => Key::Tab,
        0x0C => Key::ClearScreen,
        0x7F | 0x08 => Key::Backspace,
        0x03 | 0x04 | 0x1A => Key::Interrupt, // CTRL-C, CTRL-D, CTRL-Z
        0x1B => decode_escape(reader),
        b if is_printable_byte(b) => Key::Printable(b),
        _ => Key::Escape,
    })
}

/// Reads up to three follow-on bytes for an ANSI escape sequence. Any read
/// error or short read along the way falls back to a literal `Escape`, per
/// the design's "partial reads return the literal ESC byte" rule.
fn decode_escape(reader: &mut impl Read) -> Key {
    let mut next = [0u8; 1];
    if reader.read_exact(&mut next).is_err() {
        return Key::Escape;
    }
    match next[0] {
        b'[' => decode_csi(reader),
        b'O' => {
            let mut b = [0u8; 1];
            if reader.read_exact(&mut b).is_err() {
                return Key::Escape;
            }
            match b[0] {
                b'H' => Key::Home,
                b'F' => Key::End,
                _ => Key::Escape,
            }
        }
        _ => Key::Escape,
    }
}

fn decode_csi(reader: &mut impl Read) -> Key {
    let mut b = [0u8; 1];
    if reader.read_exact(&mut b).is_err() {
        return Key::Escape;
    }
    match b[0] {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        digit @ b'1'..=b'9' => {
            let mut tilde = [0u8; 1];
            if reader.read_exact(&mut tilde).is_err() || tilde[0] != b'~' {
                return Key::Escape;
            }
            match digit {
                b'1' | b'7' => Key::Home,
                b'3' => Key::Delete,
                b'4' | b'8' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Escape,
            }
        }
        _ => Key::Escape,
    }
}
