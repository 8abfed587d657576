//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the tick kernel and the shared blackboard and runs
//! the cooperative dispatch loop.  All I/O flows through port traits
//! injected at call sites, so the whole behaviour tree runs against mock
//! adapters on the host.
//!
//! ```text
//!  CompanionPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  ProximityPort ──▶ │        AppService         │
//!     MotorPort  ◀── │  Kernel · Schedule · Play │
//!     ServoPort  ◀── │                           │
//!    BuzzerPort  ◀── └──────────────────────────┘
//! ```
//!
//! ## Suspension points
//!
//! The foreground blocks freely (pattern choreography is written as
//! straight-line code with waits), but every wait goes through
//! [`dwell`](AppService::dwell), which pumps the kernel for the elapsed
//! time and then applies any actuator requests the tick handlers queued.
//! That keeps countdowns, pending ops and the 1-second housekeeping
//! running exactly as they would under a hardware tick interrupt.

use log::{info, warn};

use crate::config::RobotConfig;
use crate::error::OpResult;
use crate::kernel::Kernel;
use crate::link::{DriveDirection, ManualCommand, SerialCommand, SysCommand};
use crate::patterns::{self, PatternMode};

use super::ctx::RobotCtx;
use super::events::AppEvent;
use super::ports::{EventSink, Motor, RangeCheck, RangeMode, RobotHw, Rotation, Servo, Tone};

// ───────────────────────────────────────────────────────────────
// Tick-context handlers
// ───────────────────────────────────────────────────────────────

/// Pending op: swing the snack servo back to ready (deferred to the
/// foreground — tick context never touches hardware).
fn snack_return_op(ctx: &mut RobotCtx) -> OpResult {
    ctx.requests.snack_servo_ready = true;
    Ok(())
}

/// Pending op: end the find-request pulse to the companion.
fn find_release_op(ctx: &mut RobotCtx) -> OpResult {
    ctx.requests.release_find_signal = true;
    Ok(())
}

/// 1-second housekeeping: schedule countdown plus session countdowns.
fn housekeeping_second(ctx: &mut RobotCtx) -> OpResult {
    ctx.schedule.second_tick();
    ctx.autoplay.second_tick();
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    pub(crate) kernel: Kernel<RobotCtx>,
    pub(crate) ctx: RobotCtx,
    started: bool,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** wire up the kernel — call [`start`](Self::start) next.
    pub fn new(config: RobotConfig) -> Self {
        Self {
            kernel: Kernel::new(),
            ctx: RobotCtx::new(config),
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Register the kernel callbacks.  Must be called exactly once.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        if self.started {
            debug_assert!(false, "AppService::start called twice");
            warn!("AppService already started");
            return;
        }
        self.started = true;

        // Slot registrations cannot fail on a fresh kernel.
        if let Ok(op) = self.kernel.pending.register(snack_return_op) {
            self.ctx.op_snack_return = op;
        }
        if let Ok(op) = self.kernel.pending.register(find_release_op) {
            self.ctx.op_find_release = op;
        }
        if let Err(e) = self.kernel.ticker.register(housekeeping_second) {
            warn!("housekeeping registration failed: {e}");
        }

        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    /// The foreground dispatch loop.  Never returns.
    pub fn run<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink) -> ! {
        loop {
            self.poll_once(hw, sink);
            let idle = self.ctx.config.idle_poll_interval_ms;
            self.dwell(hw, idle);
        }
    }

    /// One pass of the dispatch loop: consume at most one command, then
    /// check the two autonomous triggers (schedule due, vibration resume).
    pub fn poll_once<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink) {
        if let Some(cmd) = hw.take_command() {
            self.dispatch(cmd, hw, sink);
        }

        if self.ctx.schedule.take_due() {
            self.auto_drive(hw, sink, false);
        } else if self.ctx.autoplay.cancelled && hw.vibration() {
            self.ctx.autoplay.cancelled = false;
            self.auto_drive(hw, sink, true);
        }
    }

    /// Blocking wait plus kernel pump — the one true suspension point.
    pub fn dwell<H: RobotHw>(&mut self, hw: &mut H, ms: u32) {
        hw.delay_ms(ms);
        self.kernel.advance_ms(ms, &mut self.ctx);
        self.apply_requests(hw);
    }

    /// Apply actuator work queued by tick-context handlers.
    fn apply_requests<H: RobotHw>(&mut self, hw: &mut H) {
        if core::mem::take(&mut self.ctx.requests.snack_servo_ready) {
            hw.servo_angle(Servo::Snack, self.ctx.config.snack_ready_angle);
        }
        if core::mem::take(&mut self.ctx.requests.release_find_signal) {
            hw.set_find_signal(false);
        }
    }

    // ── Command handling ──────────────────────────────────────

    fn dispatch<H: RobotHw>(&mut self, cmd: SerialCommand, hw: &mut H, sink: &mut impl EventSink) {
        match cmd {
            SerialCommand::ScheduleStart => {
                // A fresh schedule supersedes any interrupted session.
                self.ctx.autoplay.cancelled = false;
                self.ctx.schedule.begin_receive();
            }
            SerialCommand::ScheduleEnd => {
                if self.ctx.schedule.end_receive() {
                    sink.emit(&AppEvent::ScheduleArmed {
                        wait_secs: self.ctx.schedule.wait_time_secs(),
                        queued: self.ctx.patterns.len(),
                    });
                }
            }
            SerialCommand::WaitTime(secs) => self.ctx.schedule.set_wait_time(secs),
            SerialCommand::Duration(secs) => self.ctx.schedule.set_duration(secs),
            SerialCommand::Speed(level) => self.ctx.schedule.set_speed(level),
            SerialCommand::SnackInterval(n) => self.ctx.schedule.set_snack_interval(n),
            SerialCommand::Patterns(codes) => {
                if self.ctx.schedule.is_receiving() {
                    for code in codes {
                        if let Err(e) = self.ctx.patterns.enqueue(code) {
                            warn!("pattern {code} dropped: {e}");
                        }
                    }
                }
            }
            SerialCommand::Sys(SysCommand::EnterManual) => self.manual_drive(hw, sink),
            SerialCommand::Sys(SysCommand::LeaveManual) => {
                // Only meaningful inside the manual loop.
            }
            SerialCommand::Sys(SysCommand::Reset) => {
                warn!("system reset requested — reserved, ignored");
            }
            SerialCommand::Manual(_) => {
                // Manual commands outside the manual loop are stale.
            }
        }
    }

    // ── Manual drive ──────────────────────────────────────────

    /// Nested loop: the robot is a remote-control car until `!2` arrives.
    fn manual_drive<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink) {
        info!("manual drive: entered");
        sink.emit(&AppEvent::ManualEntered);

        hw.motors_enable();
        hw.servo_enable(Servo::Snack, self.ctx.config.snack_ready_angle);

        loop {
            if let Some(cmd) = hw.take_command() {
                match cmd {
                    SerialCommand::Sys(SysCommand::LeaveManual) => {
                        self.halt_wheels(hw);
                        hw.motors_disable();
                        hw.servo_disable(Servo::Snack);
                        sink.emit(&AppEvent::ManualExited);
                        info!("manual drive: exited");
                        return;
                    }
                    SerialCommand::Manual(ManualCommand::Drive(dir)) => {
                        self.manual_steer(hw, dir);
                    }
                    SerialCommand::Manual(ManualCommand::Pattern(code)) => {
                        patterns::execute(self, hw, code, PatternMode::Manual, 1);
                        sink.emit(&AppEvent::PatternExecuted {
                            code,
                            mode: PatternMode::Manual,
                        });
                    }
                    other => {
                        // Schedule traffic is not serviced in this mode.
                        warn!("manual drive: ignoring {other:?}");
                    }
                }
            }
            let poll = self.ctx.config.manual_poll_interval_ms;
            self.dwell(hw, poll);
        }
    }

    fn manual_steer<H: RobotHw>(&mut self, hw: &mut H, dir: DriveDirection) {
        let rotate = self.ctx.config.manual_rotate_speed;
        let drive = self.ctx.config.manual_drive_speed;
        match dir {
            DriveDirection::Stop => self.halt_wheels(hw),
            DriveDirection::Forward => self.steer(hw, Rotation::Ccw, Rotation::Cw, drive),
            DriveDirection::Reverse => self.steer(hw, Rotation::Cw, Rotation::Ccw, drive),
            DriveDirection::Left => self.steer(hw, Rotation::Cw, Rotation::Cw, rotate),
            DriveDirection::Right => self.steer(hw, Rotation::Ccw, Rotation::Ccw, rotate),
        }
    }

    // ── Wheel helpers (shared with the pattern library) ───────

    /// Command both wheels: direction first (which zeroes speed in the
    /// bridge), then duty.
    pub(crate) fn steer<H: RobotHw>(&mut self, hw: &mut H, a: Rotation, b: Rotation, duty: u8) {
        hw.set_rotation(Motor::A, a);
        hw.set_rotation(Motor::B, b);
        hw.set_speed(Motor::A, duty);
        hw.set_speed(Motor::B, duty);
    }

    pub(crate) fn halt_wheels<H: RobotHw>(&mut self, hw: &mut H) {
        hw.set_rotation(Motor::A, Rotation::Stop);
        hw.set_rotation(Motor::B, Rotation::Stop);
    }

    // ── Autonomous play session ───────────────────────────────

    /// BEGIN → DO → END.  `resumed` skips BEGIN's cat search: a vibration
    /// wake-up means the cat is already at the chassis.
    fn auto_drive<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink, resumed: bool) {
        self.ctx.autoplay.running = true;

        hw.motors_enable();
        hw.servo_enable(Servo::Snack, self.ctx.config.snack_ready_angle);

        if !resumed && !self.find_cat(hw, sink) {
            // Nobody came.  Fold the session and keep the queue for a
            // vibration resume.
            hw.servo_disable(Servo::Snack);
            hw.motors_disable();
            self.ctx.autoplay.running = false;
            self.ctx.autoplay.cancelled = true;
            sink.emit(&AppEvent::AutoplayCancelled);
            info!("autoplay: cancelled (no cat, no vibration)");
            return;
        }

        sink.emit(&AppEvent::AutoplayStarted { resumed });
        info!("autoplay: session started (resumed={resumed})");
        self.play_queue(hw, sink);
        self.park(hw);

        hw.servo_disable(Servo::Snack);
        hw.motors_disable();
        self.ctx.autoplay.running = false;
        sink.emit(&AppEvent::AutoplayFinished);
        info!("autoplay: session finished");
    }

    /// BEGIN phase: pulse the companion, rotate in place watching the
    /// cat-found line, fall back to calling and waiting for a vibration.
    /// Returns false when the session should be abandoned.
    fn find_cat<H: RobotHw>(&mut self, hw: &mut H, _sink: &mut impl EventSink) -> bool {
        // Ask the vision companion to start looking; the pulse is ended
        // by a pending op so the search can begin immediately.
        hw.set_find_signal(true);
        let pulse = self.ctx.config.find_signal_pulse_ms;
        if let Err(e) = self.kernel.pending.add(self.ctx.op_find_release, pulse) {
            warn!("find pulse arm failed: {e}");
            hw.set_find_signal(false);
        }

        let timeout = self.ctx.config.cat_search_timeout_secs;
        self.ctx.autoplay.arm_search(timeout);

        let search_duty = self.ctx.config.min_rotate_speed();
        self.steer(hw, Rotation::Cw, Rotation::Cw, search_duty);

        let mut found = false;
        loop {
            if hw.cat_found() {
                found = true;
                break;
            }
            if self.ctx.autoplay.search_timed_out {
                break;
            }
            self.dwell(hw, 100);
        }
        self.halt_wheels(hw);

        if found {
            info!("autoplay: cat spotted during search");
            self.play_tones(hw, &[(Tone::C6, 120), (Tone::E6, 120), (Tone::G6, 180)]);
            return true;
        }

        // No cat in sight: call for it and listen for pawing.
        info!("autoplay: search timed out, calling");
        let wait = self.ctx.config.vibration_wait_secs;
        self.ctx.autoplay.arm_vibration_wait(wait);

        loop {
            if hw.vibration() {
                hw.tone_off();
                info!("autoplay: vibration response, cat is here");
                return true;
            }
            if self.ctx.autoplay.vibration_timed_out {
                hw.tone_off();
                return false;
            }
            // The housekeeping tick toggles the blink flag once a second,
            // giving an on/off chirp cadence.
            if self.ctx.autoplay.call_blink {
                hw.tone_on(Tone::A5);
            } else {
                hw.tone_off();
            }
            self.dwell(hw, 100);
        }
    }

    /// DO phase: drain the pattern queue, resolving auto-decide codes and
    /// dispensing snacks every N patterns.
    fn play_queue<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink) {
        // The total play time is spread evenly over the queue as it
        // stands at session start.
        let share = {
            let len = self.ctx.patterns.len().max(1) as i32;
            (self.ctx.schedule.duration_secs() / len).max(1)
        };
        let snack_every = self.ctx.schedule.snack_interval();

        let mut previous = 0u8;
        let mut executed = 0u32;
        while let Some(raw) = self.ctx.patterns.dequeue() {
            let code = if raw == 0 {
                patterns::auto_successor(previous)
            } else {
                raw
            };

            patterns::execute(self, hw, code, PatternMode::Auto, share);
            sink.emit(&AppEvent::PatternExecuted {
                code,
                mode: PatternMode::Auto,
            });
            previous = code;
            executed += 1;

            if snack_every > 0 && executed % u32::from(snack_every) == 0 {
                self.give_snack(hw, sink);
            }
        }
    }

    /// Dispense one snack: lurch forward to the cat, tip the flap, and
    /// let a pending op swing it back while play continues.
    fn give_snack<H: RobotHw>(&mut self, hw: &mut H, sink: &mut impl EventSink) {
        // Nose up to the bowl if the cat is close enough to see it.
        if matches!(hw.proximity(RangeMode::Snack), RangeCheck::Near) {
            let duty = self.ctx.config.auto_drive_speed();
            self.steer(hw, Rotation::Ccw, Rotation::Cw, duty);
            self.dwell(hw, 300);
            self.halt_wheels(hw);
        }

        hw.servo_angle(Servo::Snack, self.ctx.config.snack_give_angle());
        let wait = self.ctx.config.snack_return_wait_ms;
        let op = self.ctx.op_snack_return;
        if self.kernel.pending.is_armed(op) {
            let _ = self.kernel.pending.time_reset(op, wait);
        } else if let Err(e) = self.kernel.pending.add(op, wait) {
            warn!("snack return arm failed: {e}");
        }

        sink.emit(&AppEvent::SnackGiven);
        info!("autoplay: snack dispensed");

        // Hold the pose briefly; the return swing happens mid-pattern
        // when the op fires.
        self.dwell(hw, 200);
    }

    /// END phase: creep forward until a wall is close, then shut down with
    /// a closing jingle.
    fn park<H: RobotHw>(&mut self, hw: &mut H) {
        info!("autoplay: parking");
        // The fishing routine may have left the toy powered.
        hw.servo_disable(Servo::Toy);
        let duty = self.ctx.config.min_drive_speed();
        self.steer(hw, Rotation::Ccw, Rotation::Cw, duty);

        let limit = self.ctx.config.park_poll_limit;
        let interval = self.ctx.config.park_poll_interval_ms;
        for _ in 0..limit {
            if matches!(hw.proximity(RangeMode::Long), RangeCheck::Near) {
                break;
            }
            self.dwell(hw, interval);
        }
        self.halt_wheels(hw);

        self.play_tones(hw, &[(Tone::G5, 150), (Tone::E5, 150), (Tone::C5, 250)]);
    }

    // ── Small helpers ─────────────────────────────────────────

    pub(crate) fn play_tones<H: RobotHw>(&mut self, hw: &mut H, notes: &[(Tone, u32)]) {
        for &(tone, ms) in notes {
            hw.tone_on(tone);
            self.dwell(hw, ms);
            hw.tone_off();
            self.dwell(hw, 40);
        }
    }

    /// Read-only view of the blackboard for adapters and tests.
    pub fn ctx(&self) -> &RobotCtx {
        &self.ctx
    }
}
