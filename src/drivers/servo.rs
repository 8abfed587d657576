//! SG90 hobby servo driver (two channels: teaser toy, snack flap).
//!
//! Angle writes are gated by a per-channel enable so an idle servo holds
//! no torque (and draws no current) between play sessions.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the 50 Hz LEDC channels set up by hw_init.
//! On host/test: tracks state in-memory only.

use crate::app::ports::Servo;
use crate::drivers::hw_init;
use crate::pins;
use log::debug;

/// SG90 pulse range: 0.5 ms (0°) to 2.4 ms (180°) in a 20 ms frame,
/// expressed as 14-bit LEDC duty counts.
const DUTY_MIN: u32 = 410; // 0.5ms / 20ms * 16384
const DUTY_MAX: u32 = 1966; // 2.4ms / 20ms * 16384
const ANGLE_MAX: u8 = 180;

#[derive(Debug, Clone, Copy)]
struct Channel {
    enabled: bool,
    angle: u8,
}

pub struct ServoDriver {
    channels: [Channel; 2],
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            channels: [Channel {
                enabled: false,
                angle: 0,
            }; 2],
        }
    }

    /// Power the channel and move to `angle`.
    pub fn enable(&mut self, servo: Servo, angle: u8) {
        self.channels[Self::index(servo)].enabled = true;
        self.set_angle(servo, angle);
    }

    /// Stop driving the channel (the horn goes limp).
    pub fn disable(&mut self, servo: Servo) {
        let idx = Self::index(servo);
        self.channels[idx].enabled = false;
        hw_init::pwm_set_duty(Self::pwm_channel(servo), 0);
    }

    pub fn set_angle(&mut self, servo: Servo, angle: u8) {
        let idx = Self::index(servo);
        if !self.channels[idx].enabled {
            debug!("servo: angle write while disabled, dropped");
            return;
        }
        let angle = angle.min(ANGLE_MAX);
        self.channels[idx].angle = angle;
        hw_init::pwm_set_duty(Self::pwm_channel(servo), Self::angle_to_duty(angle));
    }

    pub fn is_enabled(&self, servo: Servo) -> bool {
        self.channels[Self::index(servo)].enabled
    }

    pub fn angle(&self, servo: Servo) -> u8 {
        self.channels[Self::index(servo)].angle
    }

    fn index(servo: Servo) -> usize {
        match servo {
            Servo::Toy => 0,
            Servo::Snack => 1,
        }
    }

    fn pwm_channel(servo: Servo) -> u32 {
        match servo {
            Servo::Toy => pins::PWM_CH_SERVO_TOY,
            Servo::Snack => pins::PWM_CH_SERVO_SNACK,
        }
    }

    fn angle_to_duty(angle: u8) -> u32 {
        DUTY_MIN + (DUTY_MAX - DUTY_MIN) * u32::from(angle) / u32::from(ANGLE_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_is_gated_by_enable() {
        let mut s = ServoDriver::new();
        s.set_angle(Servo::Snack, 90);
        assert_eq!(s.angle(Servo::Snack), 0);

        s.enable(Servo::Snack, 30);
        assert_eq!(s.angle(Servo::Snack), 30);
        s.set_angle(Servo::Snack, 120);
        assert_eq!(s.angle(Servo::Snack), 120);
    }

    #[test]
    fn channels_are_independent() {
        let mut s = ServoDriver::new();
        s.enable(Servo::Toy, 45);
        assert!(s.is_enabled(Servo::Toy));
        assert!(!s.is_enabled(Servo::Snack));
        s.set_angle(Servo::Snack, 90);
        assert_eq!(s.angle(Servo::Snack), 0);
    }

    #[test]
    fn angle_clamps_to_mechanical_limit() {
        let mut s = ServoDriver::new();
        s.enable(Servo::Toy, 200);
        assert_eq!(s.angle(Servo::Toy), 180);
    }

    #[test]
    fn duty_mapping_spans_the_pulse_range() {
        assert_eq!(ServoDriver::angle_to_duty(0), DUTY_MIN);
        assert_eq!(ServoDriver::angle_to_duty(180), DUTY_MAX);
        let mid = ServoDriver::angle_to_duty(90);
        assert!(mid > DUTY_MIN && mid < DUTY_MAX);
    }
}
