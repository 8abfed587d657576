//! Integration tests: AppService → kernel → ports, end to end on mocks.

use std::collections::VecDeque;

use carebot::app::events::AppEvent;
use carebot::app::ports::{
    BuzzerPort, CompanionPort, DelayPort, EventSink, Motor, MotorPort, ProximityPort, RangeCheck,
    RangeMode, Rotation, Servo, ServoPort, Tone,
};
use carebot::app::service::AppService;
use carebot::config::RobotConfig;
use carebot::link::{DriveDirection, ManualCommand, SerialCommand, SysCommand};
use carebot::patterns::PatternMode;

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotorCall {
    Enable,
    Disable,
    Rotation(Motor, Rotation),
    Speed(Motor, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServoCall {
    Enable(Servo, u8),
    Disable(Servo),
    Angle(Servo, u8),
}

/// Scripted chassis: commands are a queue, input lines flip at a scripted
/// simulated time, and delays advance the simulated clock instead of
/// sleeping.
struct MockHw {
    commands: VecDeque<SerialCommand>,
    elapsed_ms: u32,

    /// Simulated-time thresholds for the input lines (`None` = never).
    cat_found_from_ms: Option<u32>,
    vibration_from_ms: Option<u32>,

    /// Per-mode proximity answers.
    op_near: bool,
    snack_near: bool,
    long_near: bool,

    motor_calls: Vec<MotorCall>,
    servo_calls: Vec<ServoCall>,
    tones: Vec<Tone>,
    find_signals: Vec<bool>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            commands: VecDeque::new(),
            elapsed_ms: 0,
            cat_found_from_ms: None,
            vibration_from_ms: None,
            op_near: false,
            snack_near: false,
            long_near: false,
            motor_calls: Vec::new(),
            servo_calls: Vec::new(),
            tones: Vec::new(),
            find_signals: Vec::new(),
        }
    }

    fn push(&mut self, cmd: SerialCommand) {
        self.commands.push_back(cmd);
    }

    fn push_schedule(&mut self, wait: i32, duration: i32, patterns: &[u8], snack: u8, speed: u8) {
        self.push(SerialCommand::ScheduleStart);
        self.push(SerialCommand::WaitTime(wait));
        self.push(SerialCommand::Duration(duration));
        self.push(SerialCommand::Patterns(
            heapless::Vec::from_slice(patterns).unwrap(),
        ));
        self.push(SerialCommand::SnackInterval(snack));
        self.push(SerialCommand::Speed(speed));
        self.push(SerialCommand::ScheduleEnd);
    }
}

impl MotorPort for MockHw {
    fn motors_enable(&mut self) {
        self.motor_calls.push(MotorCall::Enable);
    }
    fn motors_disable(&mut self) {
        self.motor_calls.push(MotorCall::Disable);
    }
    fn set_rotation(&mut self, motor: Motor, rotation: Rotation) {
        self.motor_calls.push(MotorCall::Rotation(motor, rotation));
    }
    fn set_speed(&mut self, motor: Motor, duty: u8) {
        self.motor_calls.push(MotorCall::Speed(motor, duty));
    }
}

impl ServoPort for MockHw {
    fn servo_enable(&mut self, servo: Servo, angle: u8) {
        self.servo_calls.push(ServoCall::Enable(servo, angle));
    }
    fn servo_disable(&mut self, servo: Servo) {
        self.servo_calls.push(ServoCall::Disable(servo));
    }
    fn servo_angle(&mut self, servo: Servo, angle: u8) {
        self.servo_calls.push(ServoCall::Angle(servo, angle));
    }
}

impl BuzzerPort for MockHw {
    fn tone_on(&mut self, tone: Tone) {
        self.tones.push(tone);
    }
    fn tone_off(&mut self) {}
}

impl ProximityPort for MockHw {
    fn proximity(&mut self, mode: RangeMode) -> RangeCheck {
        let near = match mode {
            RangeMode::Op => self.op_near,
            RangeMode::Snack => self.snack_near,
            RangeMode::Long => self.long_near,
            RangeMode::Find => false,
        };
        if near { RangeCheck::Near } else { RangeCheck::Far }
    }
}

impl CompanionPort for MockHw {
    fn take_command(&mut self) -> Option<SerialCommand> {
        self.commands.pop_front()
    }
    fn set_find_signal(&mut self, level: bool) {
        self.find_signals.push(level);
    }
    fn cat_found(&self) -> bool {
        self.cat_found_from_ms
            .is_some_and(|from| self.elapsed_ms >= from)
    }
    fn vibration(&self) -> bool {
        self.vibration_from_ms
            .is_some_and(|from| self.elapsed_ms >= from)
    }
}

impl DelayPort for MockHw {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += ms;
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

impl RecordingSink {
    fn has(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    fn position(&self, event: &AppEvent) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn service() -> (AppService, RecordingSink) {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(RobotConfig::default());
    svc.start(&mut sink);
    (svc, sink)
}

/// Run dispatch iterations until `done` or the iteration cap trips.
fn run_until(
    svc: &mut AppService,
    hw: &mut MockHw,
    sink: &mut RecordingSink,
    done: impl Fn(&RecordingSink) -> bool,
) {
    for _ in 0..10_000 {
        svc.poll_once(hw, sink);
        if done(sink) {
            return;
        }
        svc.dwell(hw, 50);
    }
    panic!("dispatch loop did not reach the expected state");
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn armed_schedule_counts_down_and_runs_a_full_session() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();
    hw.cat_found_from_ms = Some(0); // cat is waiting right there
    hw.long_near = true; // wall right ahead for parking

    hw.push_schedule(2, 4, &[5], 0, 1);
    for _ in 0..7 {
        svc.poll_once(&mut hw, &mut sink);
    }
    assert!(svc.ctx().schedule.is_armed());
    assert!(sink.has(&AppEvent::ScheduleArmed {
        wait_secs: 2,
        queued: 1
    }));

    run_until(&mut svc, &mut hw, &mut sink, |s| {
        s.has(&AppEvent::AutoplayFinished)
    });

    // BEGIN found the cat without a call phase.
    let started = sink
        .position(&AppEvent::AutoplayStarted { resumed: false })
        .unwrap();
    let played = sink
        .position(&AppEvent::PatternExecuted {
            code: 5,
            mode: PatternMode::Auto,
        })
        .unwrap();
    let finished = sink.position(&AppEvent::AutoplayFinished).unwrap();
    assert!(started < played && played < finished);

    // The find pulse was raised once and released by the pending op.
    assert_eq!(hw.find_signals, vec![true, false]);

    // Hello jingle on sighting, goodbye jingle after parking.
    assert!(hw.tones.starts_with(&[Tone::C6, Tone::E6, Tone::G6]));
    assert!(hw.tones.ends_with(&[Tone::G5, Tone::E5, Tone::C5]));

    // The chassis ends shut down.
    assert_eq!(hw.motor_calls.last(), Some(&MotorCall::Disable));
    assert!(svc.ctx().patterns.is_empty());
}

#[test]
fn missed_session_is_cancelled_and_resumes_on_vibration() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();
    hw.long_near = true;
    // No cat, no vibration: the session must fold.

    hw.push_schedule(1, 2, &[1], 0, 1);
    for _ in 0..7 {
        svc.poll_once(&mut hw, &mut sink);
    }

    run_until(&mut svc, &mut hw, &mut sink, |s| {
        s.has(&AppEvent::AutoplayCancelled)
    });
    assert!(!sink.has(&AppEvent::AutoplayStarted { resumed: false }));

    // The queue survives the cancellation for a later resume.
    assert_eq!(svc.ctx().patterns.len(), 1);

    // The cat finally paws at the chassis.
    hw.vibration_from_ms = Some(hw.elapsed_ms);
    run_until(&mut svc, &mut hw, &mut sink, |s| {
        s.has(&AppEvent::AutoplayFinished)
    });

    assert!(sink.has(&AppEvent::AutoplayStarted { resumed: true }));
    assert!(sink.has(&AppEvent::PatternExecuted {
        code: 1,
        mode: PatternMode::Auto,
    }));
    assert!(svc.ctx().patterns.is_empty());
}

#[test]
fn manual_drive_loop_steers_and_exits() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();

    hw.push(SerialCommand::Sys(SysCommand::EnterManual));
    hw.push(SerialCommand::Manual(ManualCommand::Drive(
        DriveDirection::Forward,
    )));
    hw.push(SerialCommand::Manual(ManualCommand::Drive(
        DriveDirection::Stop,
    )));
    hw.push(SerialCommand::Sys(SysCommand::LeaveManual));

    // The first poll enters the nested loop, which drains the rest.
    svc.poll_once(&mut hw, &mut sink);

    assert!(sink.has(&AppEvent::ManualEntered));
    assert!(sink.has(&AppEvent::ManualExited));

    // Forward at full manual duty: A counter-clockwise, B clockwise.
    let fwd = hw
        .motor_calls
        .iter()
        .position(|c| *c == MotorCall::Rotation(Motor::A, Rotation::Ccw))
        .unwrap();
    assert!(hw.motor_calls[fwd..].contains(&MotorCall::Rotation(Motor::B, Rotation::Cw)));
    assert!(hw.motor_calls[fwd..].contains(&MotorCall::Speed(Motor::A, 100)));

    // Stop then shut down on exit.
    assert_eq!(hw.motor_calls.last(), Some(&MotorCall::Disable));
    assert!(hw.servo_calls.contains(&ServoCall::Disable(Servo::Snack)));
}

#[test]
fn manual_pattern_runs_at_doubled_speed() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();

    hw.push(SerialCommand::Sys(SysCommand::EnterManual));
    hw.push(SerialCommand::Manual(ManualCommand::Pattern(4)));
    hw.push(SerialCommand::Sys(SysCommand::LeaveManual));
    svc.poll_once(&mut hw, &mut sink);

    assert!(sink.has(&AppEvent::PatternExecuted {
        code: 4,
        mode: PatternMode::Manual,
    }));

    // Fast circle at manual pace: base duty 2×50 = 100, outer +40 (the
    // bridge drops over-range writes on real hardware), inner −10.
    assert!(hw.motor_calls.contains(&MotorCall::Speed(Motor::A, 140)));
    assert!(hw.motor_calls.contains(&MotorCall::Speed(Motor::B, 90)));
}

#[test]
fn snack_is_dispensed_and_the_flap_swings_back() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();
    hw.cat_found_from_ms = Some(0);
    hw.snack_near = true; // cat close enough for the bowl lurch
    hw.long_near = true;

    // One pattern, snack after every pattern.
    hw.push_schedule(1, 2, &[9], 1, 0);
    for _ in 0..7 {
        svc.poll_once(&mut hw, &mut sink);
    }

    run_until(&mut svc, &mut hw, &mut sink, |s| {
        s.has(&AppEvent::AutoplayFinished)
    });
    assert!(sink.has(&AppEvent::SnackGiven));

    // The flap tipped to the give angle, then the pending op swung it
    // back to ready while the foreground was parking.
    let cfg = RobotConfig::default();
    let give = hw
        .servo_calls
        .iter()
        .position(|c| *c == ServoCall::Angle(Servo::Snack, cfg.snack_give_angle()))
        .unwrap();
    assert!(
        hw.servo_calls[give..].contains(&ServoCall::Angle(Servo::Snack, cfg.snack_ready_angle))
    );

    // Pattern 9 is the fishing routine: the toy servo wagged and was
    // released afterwards.
    assert!(hw.servo_calls.contains(&ServoCall::Disable(Servo::Toy)));
}

#[test]
fn pattern_records_append_across_frames() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();

    hw.push(SerialCommand::ScheduleStart);
    hw.push(SerialCommand::Patterns(
        heapless::Vec::from_slice(&[1, 2]).unwrap(),
    ));
    hw.push(SerialCommand::Patterns(
        heapless::Vec::from_slice(&[4, 5]).unwrap(),
    ));
    for _ in 0..3 {
        svc.poll_once(&mut hw, &mut sink);
    }

    assert_eq!(svc.ctx().patterns.len(), 4);
}

#[test]
fn schedule_fields_outside_a_bracket_are_ignored() {
    let (mut svc, mut sink) = service();
    let mut hw = MockHw::new();

    hw.push(SerialCommand::WaitTime(300));
    hw.push(SerialCommand::Patterns(
        heapless::Vec::from_slice(&[1, 2, 3]).unwrap(),
    ));
    hw.push(SerialCommand::ScheduleEnd);
    for _ in 0..3 {
        svc.poll_once(&mut hw, &mut sink);
    }

    assert!(!svc.ctx().schedule.is_armed());
    assert!(svc.ctx().patterns.is_empty());
    assert!(!sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ScheduleArmed { .. }
    )));
}
