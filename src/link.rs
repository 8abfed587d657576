//! Companion serial link — framing, mailbox, and command decoding.
//!
//! The vision companion sends fixed 9-byte frames: one type byte followed
//! by an 8-byte payload.  The UART receive path deposits each completed
//! frame into a single-record mailbox ([`SerialLink`]); a frame that
//! arrives before the previous one is consumed simply overwrites it
//! (last-write-wins, by design of the companion protocol — stale commands
//! are worthless).
//!
//! Decoding is separate from transport so that tests and future transports
//! (BLE, RPC) can feed [`decode`] directly.

use log::debug;
use serde::Serialize;

/// One type byte plus eight payload bytes.
pub const FRAME_LEN: usize = 9;

/// Maximum pattern codes carried by a single `P` frame.
pub const PATTERNS_PER_FRAME: usize = 7;

// ───────────────────────────────────────────────────────────────
// Wire frame + mailbox
// ───────────────────────────────────────────────────────────────

/// A raw received frame.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SerialFrame {
    pub tag: u8,
    pub payload: [u8; FRAME_LEN - 1],
}

/// Single-record receive mailbox.
///
/// `on_rx_complete` runs in receive context (UART ISR on hardware, test
/// injection on the host); `take` runs in the foreground.  The record is
/// plain data, so the worst interleaving is a torn read of a frame that
/// was about to be replaced anyway.
pub struct SerialLink {
    frame: SerialFrame,
    available: bool,
}

impl SerialLink {
    pub fn new() -> Self {
        Self {
            frame: SerialFrame {
                tag: 0,
                payload: [0; FRAME_LEN - 1],
            },
            available: false,
        }
    }

    /// Deposit a completed 9-byte frame, replacing any unconsumed one.
    pub fn on_rx_complete(&mut self, raw: &[u8; FRAME_LEN]) {
        self.frame.tag = raw[0];
        self.frame.payload.copy_from_slice(&raw[1..]);
        self.available = true;
    }

    /// True while an unconsumed frame is waiting.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Consume the buffered frame, if any.
    pub fn take(&mut self) -> Option<SerialFrame> {
        if !self.available {
            return None;
        }
        self.available = false;
        Some(self.frame)
    }
}

// ───────────────────────────────────────────────────────────────
// Decoded commands
// ───────────────────────────────────────────────────────────────

/// Manual drive directions (payload digit after `M0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDirection {
    Stop,
    Forward,
    Reverse,
    Left,
    Right,
}

/// System-level commands (`!` frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCommand {
    /// Enter the manual-drive loop.
    EnterManual,
    /// Leave the manual-drive loop.
    LeaveManual,
    /// Reserved: full system reset.
    Reset,
}

/// Commands valid only inside the manual-drive loop (`M` frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualCommand {
    Drive(DriveDirection),
    /// Run a single motion pattern at manual speed.
    Pattern(u8),
}

/// Every command the companion can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialCommand {
    /// `<` — begin a schedule record bracket.
    ScheduleStart,
    /// `>` — end the bracket and arm the schedule.
    ScheduleEnd,
    /// `T` — seconds until autonomous play starts (ASCII integer).
    WaitTime(i32),
    /// `D` — total play duration in seconds (ASCII integer).
    Duration(i32),
    /// `P` — up to seven pattern codes for the play queue.
    Patterns(heapless::Vec<u8, PATTERNS_PER_FRAME>),
    /// `N` — give a snack every N patterns (raw byte, 0 = never).
    SnackInterval(u8),
    /// `V` — play speed level (raw byte, clamped to 0-2 at ingestion).
    Speed(u8),
    /// `!` — mode switching and reset.
    Sys(SysCommand),
    /// `M` — manual-drive loop commands.
    Manual(ManualCommand),
}

/// Decode a frame into a command.  Unknown tags and malformed payloads
/// yield `None` and are dropped by the caller.
pub fn decode(frame: &SerialFrame) -> Option<SerialCommand> {
    let p = &frame.payload;
    let cmd = match frame.tag {
        b'<' => SerialCommand::ScheduleStart,
        b'>' => SerialCommand::ScheduleEnd,
        b'T' => SerialCommand::WaitTime(parse_i32(p)),
        b'D' => SerialCommand::Duration(parse_i32(p)),
        b'P' => {
            let mut codes = heapless::Vec::new();
            for &b in &p[..PATTERNS_PER_FRAME] {
                match b {
                    0 => break,          // NUL terminates the list early
                    b'.' => {}           // explicit skip marker
                    b'0'..=b'9' => {
                        if codes.push(b - b'0').is_err() {
                            break;
                        }
                    }
                    _ => {}              // line noise — ignore the byte
                }
            }
            SerialCommand::Patterns(codes)
        }
        b'N' => SerialCommand::SnackInterval(p[0]),
        b'V' => SerialCommand::Speed(p[0]),
        b'!' => match p[0] {
            b'1' => SerialCommand::Sys(SysCommand::EnterManual),
            b'2' => SerialCommand::Sys(SysCommand::LeaveManual),
            b'9' => SerialCommand::Sys(SysCommand::Reset),
            other => {
                debug!("link: unknown sys command {:#04x}", other);
                return None;
            }
        },
        b'M' => match p[0] {
            b'0' => {
                let dir = match p[1] {
                    b'0' => DriveDirection::Stop,
                    b'1' => DriveDirection::Forward,
                    b'2' => DriveDirection::Reverse,
                    b'3' => DriveDirection::Left,
                    b'4' => DriveDirection::Right,
                    other => {
                        debug!("link: unknown drive direction {:#04x}", other);
                        return None;
                    }
                };
                SerialCommand::Manual(ManualCommand::Drive(dir))
            }
            b'P' => match p[1] {
                d @ b'0'..=b'9' => SerialCommand::Manual(ManualCommand::Pattern(d - b'0')),
                other => {
                    debug!("link: bad manual pattern code {:#04x}", other);
                    return None;
                }
            },
            other => {
                debug!("link: unknown manual selector {:#04x}", other);
                return None;
            }
        },
        other => {
            debug!("link: unknown frame tag {:#04x}", other);
            return None;
        }
    };
    Some(cmd)
}

/// Minimal ASCII→i32 parser for `T`/`D` payloads.
///
/// Skips leading control characters (0x09-0x0D) and spaces, accepts an
/// optional sign, then consumes digits until the first non-digit.  No
/// overflow handling — schedule times fit comfortably in 31 bits.
pub fn parse_i32(bytes: &[u8]) -> i32 {
    let mut i = 0;
    while i < bytes.len() && (matches!(bytes[i], 0x09..=0x0D) || bytes[i] == b' ') {
        i += 1;
    }

    let mut sign = 1i32;
    if i < bytes.len() {
        match bytes[i] {
            b'-' => {
                sign = -1;
                i += 1;
            }
            b'+' => i += 1,
            _ => {}
        }
    }

    let mut value = 0i32;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10 + sign * i32::from(bytes[i] - b'0');
        i += 1;
    }
    value
}
