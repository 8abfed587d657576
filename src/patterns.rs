//! Motion pattern library — the nine choreographed play routines.
//!
//! Each routine is straight-line choreography: command the wheels (and
//! servos), wait, command again.  Every wait goes through the service's
//! [`dwell`](crate::app::service::AppService::dwell) so the kernel keeps
//! ticking underneath; a snack-servo return or find-pulse release lands in
//! the middle of a routine without the routine knowing.
//!
//! Pattern speeds derive from the schedule's speed level in auto mode and
//! are pinned to level 2 in manual mode.  The per-pattern repeat count
//! stretches each routine to roughly its share of the session duration;
//! the result is deliberately approximate — cats do not audit schedules.

use crate::app::ports::{Motor, RangeCheck, RangeMode, RobotHw, Rotation, Servo};
use crate::app::service::AppService;
use log::debug;

/// Who asked for the pattern — decides pacing and speed shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// Part of an autonomous play session.
    Auto,
    /// Single-shot from the manual-drive loop.
    Manual,
}

/// Successor table for auto-decide entries (code 0 in the queue): each
/// pattern hands off to a fixed, deliberately non-obvious next pattern so
/// back-to-back sessions don't look scripted.
pub fn auto_successor(previous: u8) -> u8 {
    match previous {
        1 => 4,
        2 => 7,
        3 => 2,
        4 => 9,
        5 => 6,
        6 => 1,
        7 => 5,
        8 => 3,
        9 => 8,
        // Auto-decide as the very first pattern: open with the shake.
        _ => 5,
    }
}

/// Wheel duties for one pattern execution.
#[derive(Debug, Clone, Copy)]
struct Pace {
    rot: u8,
    drv: u8,
    /// Full-throttle accent addend.
    over: u8,
}

impl Pace {
    fn rot_burst(self) -> u8 {
        self.rot.saturating_add(self.over)
    }

    fn drv_burst(self) -> u8 {
        self.drv.saturating_add(self.over)
    }

    fn rot_half_burst(self) -> u8 {
        self.rot.saturating_add(self.over / 2)
    }

    fn drv_half_burst(self) -> u8 {
        self.drv.saturating_add(self.over / 2)
    }
}

/// Run one pattern to completion.  `share_secs` is this pattern's slice of
/// the session duration; manual callers pass 1.
pub fn execute<H: RobotHw>(
    svc: &mut AppService,
    hw: &mut H,
    code: u8,
    mode: PatternMode,
    share_secs: i32,
) {
    let cfg = &svc.ctx.config;
    let (pace, interval) = match mode {
        PatternMode::Auto => {
            let level = svc.ctx.schedule.speed_level();
            let pace = if level > 0 {
                Pace {
                    rot: cfg.auto_rotate_speed().saturating_mul(level),
                    drv: cfg.auto_drive_speed().saturating_mul(level),
                    over: cfg.overshoot_addend(),
                }
            } else {
                Pace {
                    rot: cfg.min_rotate_speed(),
                    drv: cfg.min_drive_speed(),
                    over: cfg.overshoot_addend(),
                }
            };
            (pace, share_secs)
        }
        PatternMode::Manual => (
            Pace {
                rot: cfg.auto_rotate_speed().saturating_mul(2),
                drv: cfg.auto_drive_speed().saturating_mul(2),
                over: cfg.overshoot_addend(),
            },
            1,
        ),
    };

    debug!("pattern {code}: mode {mode:?}, interval {interval}s");

    if mode == PatternMode::Auto {
        // Beat between patterns so the session breathes.
        svc.dwell(hw, 300);
    }

    match code {
        1 => waltz(svc, hw, pace, interval),
        2 => lunge_and_freeze(svc, hw, pace, interval),
        3 => crawl(svc, hw, pace, interval),
        4 => fast_circle(svc, hw, pace, interval),
        5 => shake(svc, hw, pace, interval),
        6 => rove(svc, hw, pace, interval),
        7 => ambush_flee(svc, hw, pace),
        8 => shake_and_dart(svc, hw, pace, interval),
        9 => fish(svc, hw, interval),
        other => debug!("pattern {other}: no routine, skipped"),
    }

    // Every routine ends dead in the water.
    svc.halt_wheels(hw);
}

/// Repeat count with a floor of one execution.
fn repeats(interval: i32, divisor: i32) -> i32 {
    let n = interval / divisor;
    if n < 2 { 1 } else { n }
}

// ── 1: Waltz — S-shaped zig-zag route ─────────────────────────

fn waltz<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let lean = svc.ctx.config.auto_rotate_speed();
    let drift = svc.ctx.config.min_rotate_speed();
    let rpt = repeats(interval, 3);

    // Lean into the first curve; the sway speeds ignore the multiplier so
    // the S stays wide at every level.
    hw.set_rotation(Motor::A, Rotation::Ccw);
    hw.set_rotation(Motor::B, Rotation::Cw);
    hw.set_speed(Motor::A, lean);
    hw.set_speed(Motor::B, drift);
    svc.dwell(hw, 500);

    for _ in 0..rpt {
        hw.set_speed(Motor::A, pace.drv);
        hw.set_speed(Motor::B, pace.drv);
        svc.dwell(hw, 300);
        hw.set_speed(Motor::A, drift);
        hw.set_speed(Motor::B, lean);
        svc.dwell(hw, 1000);
        hw.set_speed(Motor::A, pace.drv);
        hw.set_speed(Motor::B, pace.drv);
        svc.dwell(hw, 300);
        hw.set_speed(Motor::A, lean);
        hw.set_speed(Motor::B, drift);
        svc.dwell(hw, 1000);
    }
}

// ── 2: Lunge-and-freeze — sudden accel / decel loops ──────────

fn lunge_and_freeze<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let rpt = repeats(interval, 20);
    for _ in 0..rpt {
        for (a, b) in [(Rotation::Ccw, Rotation::Cw), (Rotation::Cw, Rotation::Ccw)] {
            hw.set_rotation(Motor::A, a);
            hw.set_rotation(Motor::B, b);
            for _ in 0..4 {
                hw.set_speed(Motor::A, pace.drv_burst());
                hw.set_speed(Motor::B, pace.drv_burst());
                svc.dwell(hw, 800);
                hw.set_speed(Motor::A, pace.drv);
                hw.set_speed(Motor::B, pace.drv);
                svc.dwell(hw, 700);
                hw.set_speed(Motor::A, 0);
                hw.set_speed(Motor::B, 0);
                svc.dwell(hw, 1000);
            }
        }
    }
}

// ── 3: Crawl — wheels alternate in little shuffles ────────────

fn crawl<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let rpt = repeats(interval, 10);
    for _ in 0..rpt {
        for (a, b) in [(Rotation::Ccw, Rotation::Cw), (Rotation::Cw, Rotation::Ccw)] {
            for _ in 0..5 {
                hw.set_rotation(Motor::A, a);
                hw.set_rotation(Motor::B, Rotation::Stop);
                hw.set_speed(Motor::A, pace.rot);
                svc.dwell(hw, 500);
                hw.set_rotation(Motor::A, Rotation::Stop);
                hw.set_rotation(Motor::B, b);
                hw.set_speed(Motor::B, pace.rot);
                svc.dwell(hw, 500);
            }
        }
    }
}

// ── 4: Fast circle ────────────────────────────────────────────

fn fast_circle<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let cfg = &svc.ctx.config;
    let outer = pace.drv.saturating_add(cfg.speed_addend);
    let inner = pace.drv.saturating_sub(cfg.speed_subtrahend);
    let secs = if interval < 2 { 10 } else { interval };

    hw.set_rotation(Motor::A, Rotation::Ccw);
    hw.set_rotation(Motor::B, Rotation::Ccw);
    hw.set_speed(Motor::A, outer);
    hw.set_speed(Motor::B, inner);
    svc.dwell(hw, secs as u32 * 1000);
}

// ── 5: Shake — whip the tail toy left and right in place ──────

fn shake<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let rpt = repeats(interval, 1);
    for _ in 0..rpt {
        for (a, b) in [(Rotation::Ccw, Rotation::Ccw), (Rotation::Cw, Rotation::Cw)] {
            hw.set_rotation(Motor::A, a);
            hw.set_rotation(Motor::B, b);
            hw.set_speed(Motor::A, pace.rot_burst());
            hw.set_speed(Motor::B, pace.rot_burst());
            svc.dwell(hw, 150);
            hw.set_speed(Motor::A, pace.rot);
            hw.set_speed(Motor::B, pace.rot);
            svc.dwell(hw, 150);
            hw.set_speed(Motor::A, 0);
            hw.set_speed(Motor::B, 0);
            svc.dwell(hw, 100);
        }
    }
}

// ── 6: Rove — spin, relocate, spin again ──────────────────────

fn rove<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let rpt = repeats(interval, 6);
    for _ in 0..rpt {
        svc.steer(hw, Rotation::Ccw, Rotation::Ccw, pace.rot);
        svc.dwell(hw, 2000);
        svc.steer(hw, Rotation::Ccw, Rotation::Cw, pace.drv);
        svc.dwell(hw, 1000);
        svc.steer(hw, Rotation::Cw, Rotation::Cw, pace.rot);
        svc.dwell(hw, 2000);
        svc.steer(hw, Rotation::Cw, Rotation::Ccw, pace.drv);
        svc.dwell(hw, 1000);
    }
}

// ── 7: Ambush-flee — wait for a nose, then bolt backwards ─────

/// Runs once regardless of interval; gives up quietly when the ambush
/// budget expires with no visitor.
fn ambush_flee<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace) {
    let mut budget_secs = svc.ctx.config.ambush_wait_secs;
    let mut polls = 0;
    loop {
        if polls == 10 {
            if budget_secs <= 0 {
                break;
            }
            polls = 0;
            budget_secs -= 1;
        }
        if matches!(hw.proximity(RangeMode::Op), RangeCheck::Near) {
            hw.set_rotation(Motor::A, Rotation::Cw);
            hw.set_rotation(Motor::B, Rotation::Ccw);
            hw.set_speed(Motor::A, pace.drv_burst());
            hw.set_speed(Motor::B, pace.drv_burst());
            svc.dwell(hw, 500);
            hw.set_speed(Motor::A, pace.drv);
            hw.set_speed(Motor::B, pace.drv);
            svc.dwell(hw, 1000);
            hw.set_speed(Motor::A, 0);
            hw.set_speed(Motor::B, 0);
            break;
        }
        svc.dwell(hw, 100);
        polls += 1;
    }
}

// ── 8: Shake-and-dart — shake, dash off, shake again ──────────

fn shake_and_dart<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace, interval: i32) {
    let rpt = repeats(interval, 2);
    for _ in 0..rpt {
        half_shake(svc, hw, pace);
        // The dart: a short forward burst.
        hw.set_rotation(Motor::A, Rotation::Ccw);
        hw.set_rotation(Motor::B, Rotation::Cw);
        hw.set_speed(Motor::A, pace.drv_half_burst());
        hw.set_speed(Motor::B, pace.drv_half_burst());
        svc.dwell(hw, 200);
        hw.set_speed(Motor::A, pace.drv);
        hw.set_speed(Motor::B, pace.drv);
        svc.dwell(hw, 300);
        hw.set_speed(Motor::A, 0);
        hw.set_speed(Motor::B, 0);
        svc.dwell(hw, 200);
        half_shake(svc, hw, pace);
    }
}

/// Five gentler left/right whips, shared by the two halves of pattern 8.
fn half_shake<H: RobotHw>(svc: &mut AppService, hw: &mut H, pace: Pace) {
    for _ in 0..5 {
        for (a, b) in [(Rotation::Cw, Rotation::Cw), (Rotation::Ccw, Rotation::Ccw)] {
            hw.set_rotation(Motor::A, a);
            hw.set_rotation(Motor::B, b);
            hw.set_speed(Motor::A, pace.rot_half_burst());
            hw.set_speed(Motor::B, pace.rot_half_burst());
            svc.dwell(hw, 150);
            hw.set_speed(Motor::A, pace.rot);
            hw.set_speed(Motor::B, pace.rot);
            svc.dwell(hw, 150);
            hw.set_speed(Motor::A, 0);
            hw.set_speed(Motor::B, 0);
            svc.dwell(hw, 100);
        }
    }
}

// ── 9: Fish — stand still and wag the teaser toy ──────────────

fn fish<H: RobotHw>(svc: &mut AppService, hw: &mut H, interval: i32) {
    let rest = svc.ctx.config.toy_rest_angle;
    let swing = rest.saturating_add(60).min(180);
    let rpt = {
        let n = interval / 2;
        if n < 4 { 3 } else { n }
    };

    hw.servo_enable(Servo::Toy, rest);
    svc.dwell(hw, 400);
    for _ in 0..rpt {
        hw.servo_angle(Servo::Toy, swing);
        svc.dwell(hw, 350);
        hw.servo_angle(Servo::Toy, rest);
        svc.dwell(hw, 350);
    }
    hw.servo_disable(Servo::Toy);
}
