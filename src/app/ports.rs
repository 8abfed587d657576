//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (motor bridge, servos, buzzer, rangefinder, companion
//! link) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly — and the whole
//! behaviour tree runs on the host against mocks.

use crate::link::SerialCommand;

// ───────────────────────────────────────────────────────────────
// Drive motors
// ───────────────────────────────────────────────────────────────

/// The two wheels.  A is the right wheel, B the left; forward motion is
/// A counter-clockwise plus B clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Stop,
    Cw,
    Ccw,
}

/// Write-side port for the H-bridge.
///
/// Contract (mirrors the bridge hardware): speed writes are ignored while
/// the bridge is disabled or when the duty exceeds 100, and setting a
/// rotation zeroes that wheel's speed — callers always re-command speed
/// after direction.
pub trait MotorPort {
    fn motors_enable(&mut self);
    fn motors_disable(&mut self);
    fn set_rotation(&mut self, motor: Motor, rotation: Rotation);
    fn set_speed(&mut self, motor: Motor, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Servos
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Servo {
    /// Teaser toy arm.
    Toy,
    /// Snack dispenser flap.
    Snack,
}

pub trait ServoPort {
    /// Power the servo channel and move it to `angle` degrees.
    fn servo_enable(&mut self, servo: Servo, angle: u8);
    fn servo_disable(&mut self, servo: Servo);
    /// Ignored while the channel is disabled.
    fn servo_angle(&mut self, servo: Servo, angle: u8);
}

// ───────────────────────────────────────────────────────────────
// Buzzer
// ───────────────────────────────────────────────────────────────

/// Tones the piezo can produce.  Values are the PWM period in
/// microseconds at the 1 MHz tone timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    A4,
    C5,
    E5,
    G5,
    A5,
    C6,
    E6,
    G6,
}

impl Tone {
    pub fn period_us(self) -> u32 {
        match self {
            Self::A4 => 2273,
            Self::C5 => 1912,
            Self::E5 => 1517,
            Self::G5 => 1276,
            Self::A5 => 1136,
            Self::C6 => 956,
            Self::E6 => 758,
            Self::G6 => 638,
        }
    }
}

pub trait BuzzerPort {
    fn tone_on(&mut self, tone: Tone);
    fn tone_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// IR rangefinder
// ───────────────────────────────────────────────────────────────

/// Which trigger distance a proximity check is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Obstacle reaction while driving patterns.
    Op,
    /// Cat detection during the search rotation.
    Find,
    /// Cat-at-the-bowl check for snack dispensing.
    Snack,
    /// Wall detection for end-of-session parking.
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    Near,
    Far,
    /// The rangefinder could not be read.
    Err,
}

pub trait ProximityPort {
    fn proximity(&mut self, mode: RangeMode) -> RangeCheck;
}

// ───────────────────────────────────────────────────────────────
// Vision companion (serial link + handshake lines)
// ───────────────────────────────────────────────────────────────

pub trait CompanionPort {
    /// Consume the next decoded command from the link mailbox, if any.
    fn take_command(&mut self) -> Option<SerialCommand>;

    /// Drive the find-request line to the companion.
    fn set_find_signal(&mut self, level: bool);

    /// Companion's cat-in-frame line.
    fn cat_found(&self) -> bool;

    /// Chassis vibration line (the cat pawing at the robot).
    fn vibration(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Blocking delay
// ───────────────────────────────────────────────────────────────

/// Wall-clock wait.  The service wraps every call in a kernel pump, so
/// implementations only sleep — they never tick anything.
pub trait DelayPort {
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, BLE
/// characteristic, telemetry uplink, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Aggregate bound
// ───────────────────────────────────────────────────────────────

/// Everything the behaviour tree needs from the chassis, as one bound.
pub trait RobotHw:
    MotorPort + ServoPort + BuzzerPort + ProximityPort + CompanionPort + DelayPort
{
}

impl<T> RobotHw for T where
    T: MotorPort + ServoPort + BuzzerPort + ProximityPort + CompanionPort + DelayPort
{
}
