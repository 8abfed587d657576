//! Actuator drivers.
//!
//! Dumb, stateful shims over the PWM/GPIO layer.  Policy (who may move
//! when) lives in the application core; these only enforce local hardware
//! contracts such as duty limits and enable gating.

pub mod buzzer;
pub mod hw_init;
pub mod motor;
pub mod servo;
