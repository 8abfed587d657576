//! Unified error types for the CareBot firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! dispatch loop's error handling uniform.  All variants are `Copy` so they
//! pass through the kernel's callback plumbing without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A kernel registry operation was rejected.
    Registry(RegistryError),
    /// A fixed-capacity container is full.
    Capacity(&'static str),
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Capacity(what) => write!(f, "capacity: {what}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Kernel registry errors
// ---------------------------------------------------------------------------

/// Rejections from the pending-op and 1-second callback registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// All callback slots are occupied.
    TableFull,
    /// The opcode does not correspond to a registered slot.
    NotRegistered,
    /// The opcode is zero or has more than one bit set.
    BadOpcode,
    /// The op already has a countdown running.
    AlreadyArmed,
    /// The op has no countdown running.
    NotArmed,
    /// The handler is already present in the registry.
    DuplicateHandler,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull => write!(f, "slot table full"),
            Self::NotRegistered => write!(f, "opcode not registered"),
            Self::BadOpcode => write!(f, "malformed opcode"),
            Self::AlreadyArmed => write!(f, "op already armed"),
            Self::NotArmed => write!(f, "op not armed"),
            Self::DuplicateHandler => write!(f, "handler already registered"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience aliases
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Status returned by kernel-invoked callbacks (pending ops, 1-second
/// handlers).  Failures are reported to the kernel, which asserts in debug
/// builds and drops the status in release builds.
pub type OpResult = core::result::Result<(), Error>;
