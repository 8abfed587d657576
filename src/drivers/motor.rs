//! L298N dual H-bridge drive motor driver.
//!
//! Variable-speed control of both wheels via LEDC PWM plus two direction
//! pins per bridge half.
//!
//! ## Hardware contract
//!
//! * Speed writes are dropped while the bridge is disabled and when the
//!   requested duty exceeds 100 — over-range bursts from the pattern
//!   library simply saturate into silence, matching the bridge limits.
//! * Setting a rotation zeroes that wheel's speed.  Callers always
//!   command direction first, then duty.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM and GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::app::ports::{Motor, Rotation};
use crate::drivers::hw_init;
use crate::pins;
use log::debug;

#[derive(Debug, Clone, Copy)]
struct Wheel {
    rotation: Rotation,
    duty: u8,
}

pub struct MotorDriver {
    enabled: bool,
    wheels: [Wheel; 2],
}

impl MotorDriver {
    pub fn new() -> Self {
        Self {
            enabled: false,
            wheels: [Wheel {
                rotation: Rotation::Stop,
                duty: 0,
            }; 2],
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable the bridge: both wheels stop and further speed writes are
    /// dropped until re-enabled.
    pub fn disable(&mut self) {
        self.set_rotation(Motor::A, Rotation::Stop);
        self.set_rotation(Motor::B, Rotation::Stop);
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_rotation(&mut self, motor: Motor, rotation: Rotation) {
        let idx = Self::index(motor);
        self.wheels[idx].rotation = rotation;
        // A direction change always passes through zero speed.
        self.wheels[idx].duty = 0;
        self.write_direction(motor, rotation);
        self.write_duty(motor, 0);
    }

    pub fn set_speed(&mut self, motor: Motor, duty: u8) {
        if !self.enabled {
            debug!("motor: speed write while disabled, dropped");
            return;
        }
        if duty > 100 {
            debug!("motor: duty {duty} out of range, dropped");
            return;
        }
        let idx = Self::index(motor);
        self.wheels[idx].duty = duty;
        self.write_duty(motor, duty);
    }

    pub fn rotation(&self, motor: Motor) -> Rotation {
        self.wheels[Self::index(motor)].rotation
    }

    pub fn duty(&self, motor: Motor) -> u8 {
        self.wheels[Self::index(motor)].duty
    }

    fn index(motor: Motor) -> usize {
        match motor {
            Motor::A => 0,
            Motor::B => 1,
        }
    }

    fn write_direction(&self, motor: Motor, rotation: Rotation) {
        let (p1, p2) = match motor {
            Motor::A => (pins::MOTOR_A_IN1_GPIO, pins::MOTOR_A_IN2_GPIO),
            Motor::B => (pins::MOTOR_B_IN3_GPIO, pins::MOTOR_B_IN4_GPIO),
        };
        let (l1, l2) = match rotation {
            Rotation::Stop => (false, false),
            Rotation::Cw => (true, false),
            Rotation::Ccw => (false, true),
        };
        hw_init::gpio_write(p1, l1);
        hw_init::gpio_write(p2, l2);
    }

    fn write_duty(&self, motor: Motor, duty: u8) {
        let ch = match motor {
            Motor::A => pins::PWM_CH_MOTOR_A,
            Motor::B => pins::PWM_CH_MOTOR_B,
        };
        let duty_8bit = u32::from(duty) * 255 / 100;
        hw_init::pwm_set_duty(ch, duty_8bit);
    }
}
