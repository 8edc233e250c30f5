//! AT escape-sequence detector and command-line collector.
//!
//! Sits between the raw UART and the data queue.  In data mode every
//! byte passes through except a `+++` run, which is held back; if the
//! line then stays quiet for [`GUARD_TIME_MS`] the detector enters
//! command mode, otherwise the held pluses are released as data.
//!
//! ```text
//!  Disabled ─'+'─▶ Plus1 ─'+'─▶ Plus2 ─'+'─▶ Plus3 ─guard─▶ Enabled
//!     ▲              │            │            │              │
//!     └──── other byte: release held '+' ──────┘      ATCN ───┘
//! ```
//!
//! In command mode, lines of the form `AT<mn><args>\r` are collected.
//! Backspace (0x08 / 0x7F) edits the line.  A bare `AT` or an unknown
//! mnemonic polls as [`NULL_OPCODE`].

use heapless::{Deque, Vec};
use log::{debug, info, warn};

use crate::app::commands::NULL_OPCODE;
use crate::app::ports::{ArgumentSource, AtState};

/// Silence required after `+++` before command mode is entered.
pub const GUARD_TIME_MS: u32 = 1000;

/// Longest accepted command line (`ATEK` + 32 key digits fits).
pub const LINE_CAPACITY: usize = 48;

/// Argument bytes retained for the command being executed.
pub const ARG_CAPACITY: usize = LINE_CAPACITY;

/// Completed lines waiting to be polled.
const LINE_QUEUE: usize = 4;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const CR: u8 = b'\r';
const LF: u8 = b'\n';

pub struct AtEscapeDetector {
    state: AtState,
    plus3_at_ms: u32,
    line: Vec<u8, LINE_CAPACITY>,
    completed: Deque<Vec<u8, LINE_CAPACITY>, LINE_QUEUE>,
    args: Deque<u8, ARG_CAPACITY>,
    commands: &'static [&'static str],
}

impl AtEscapeDetector {
    pub fn new() -> Self {
        Self {
            state: AtState::Disabled,
            plus3_at_ms: 0,
            line: Vec::new(),
            completed: Deque::new(),
            args: Deque::new(),
            commands: &[],
        }
    }

    pub fn state(&self) -> AtState {
        self.state
    }

    pub fn register(&mut self, commands: &'static [&'static str]) {
        self.commands = commands;
        info!("AtEscape: {} commands registered", commands.len());
    }

    /// Process one received byte.  Data-mode bytes (including released
    /// pluses) are appended to `data`; overflow drops the byte.
    pub fn feed<const N: usize>(&mut self, byte: u8, now_ms: u32, data: &mut Deque<u8, N>) {
        match self.state {
            AtState::Enabled => self.collect(byte),
            AtState::Disabled => {
                if byte == b'+' {
                    self.state = AtState::Plus1;
                } else {
                    push_data(data, byte);
                }
            }
            AtState::Plus1 | AtState::Plus2 => {
                if byte == b'+' {
                    self.state = if self.state == AtState::Plus1 {
                        AtState::Plus2
                    } else {
                        self.plus3_at_ms = now_ms;
                        AtState::Plus3
                    };
                } else {
                    self.release(data);
                    self.feed(byte, now_ms, data);
                }
            }
            AtState::Plus3 => {
                // Traffic inside the guard window breaks the escape.
                self.release(data);
                self.feed(byte, now_ms, data);
            }
        }
    }

    /// Check the guard timer; call once per loop after feeding.
    pub fn tick(&mut self, now_ms: u32) {
        if self.state == AtState::Plus3 && now_ms.wrapping_sub(self.plus3_at_ms) > GUARD_TIME_MS {
            self.state = AtState::Enabled;
            self.line.clear();
            self.completed.clear();
            self.args.clear();
            info!("AtEscape: command mode");
        }
    }

    pub fn exit_command_mode(&mut self) {
        self.state = AtState::Disabled;
        self.line.clear();
        self.completed.clear();
        info!("AtEscape: data mode");
    }

    /// Pop the next completed line, load its arguments, and return its opcode.
    pub fn poll_command(&mut self) -> Option<u8> {
        let line = self.completed.pop_front()?;
        self.args.clear();

        let body = match line.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case(b"AT") => &line[2..],
            _ => {
                debug!("AtEscape: ignoring line without AT prefix");
                return None;
            }
        };

        let Some(mnemonic) = body.get(..2) else {
            return Some(NULL_OPCODE);
        };
        let Some(opcode) = self
            .commands
            .iter()
            .position(|m| m.as_bytes().eq_ignore_ascii_case(mnemonic))
        else {
            debug!("AtEscape: unknown mnemonic");
            return Some(NULL_OPCODE);
        };

        for &b in &body[2..] {
            if self.args.push_back(b).is_err() {
                warn!("AtEscape: argument overflow, truncating");
                break;
            }
        }
        Some(opcode as u8)
    }

    // ── Internal helpers ──────────────────────────────────────

    fn release<const N: usize>(&mut self, data: &mut Deque<u8, N>) {
        let held = match self.state {
            AtState::Plus1 => 1,
            AtState::Plus2 => 2,
            AtState::Plus3 => 3,
            AtState::Disabled | AtState::Enabled => 0,
        };
        for _ in 0..held {
            push_data(data, b'+');
        }
        self.state = AtState::Disabled;
    }

    fn collect(&mut self, byte: u8) {
        match byte {
            BACKSPACE | DELETE => {
                self.line.pop();
            }
            CR => {
                if !self.line.is_empty() {
                    let line = core::mem::take(&mut self.line);
                    if self.completed.push_back(line).is_err() {
                        warn!("AtEscape: command queue full, line dropped");
                    }
                }
            }
            LF => {}
            _ => {
                if self.line.push(byte).is_err() {
                    warn!("AtEscape: line too long, byte dropped");
                }
            }
        }
    }
}

impl Default for AtEscapeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentSource for AtEscapeDetector {
    fn has_pending(&self) -> bool {
        !self.args.is_empty()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.args.pop_front()
    }
}

fn push_data<const N: usize>(data: &mut Deque<u8, N>, byte: u8) {
    if data.push_back(byte).is_err() {
        warn!("AtEscape: data queue full, byte dropped");
    }
}
