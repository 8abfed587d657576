//! GPIO / peripheral pin assignments for the CareBot main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

#![allow(dead_code)] // several assignments are referenced only by the espidf build

// ---------------------------------------------------------------------------
// Drive motors (L298N dual H-bridge)
// ---------------------------------------------------------------------------

/// LEDC PWM output for motor A (right wheel) speed.
pub const MOTOR_A_PWM_GPIO: i32 = 1;
/// Direction pair for motor A: IN1/IN2.
pub const MOTOR_A_IN1_GPIO: i32 = 2;
pub const MOTOR_A_IN2_GPIO: i32 = 3;

/// LEDC PWM output for motor B (left wheel) speed.
pub const MOTOR_B_PWM_GPIO: i32 = 4;
/// Direction pair for motor B: IN3/IN4.
pub const MOTOR_B_IN3_GPIO: i32 = 5;
pub const MOTOR_B_IN4_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Servos (SG90, 50 Hz PWM)
// ---------------------------------------------------------------------------

/// Teaser toy arm.
pub const SERVO_TOY_GPIO: i32 = 7;
/// Snack dispenser flap.
pub const SERVO_SNACK_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Buzzer (passive piezo, tone = PWM period)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// IR rangefinder (Sharp GP2Y0A21, analog)
// ---------------------------------------------------------------------------

/// ADC1 channel for the rangefinder voltage.
pub const IR_ADC_CH: u32 = 4;

// ---------------------------------------------------------------------------
// Vision companion handshake lines
// ---------------------------------------------------------------------------

/// Output: pulsed HIGH to ask the companion to start looking for the cat.
pub const FIND_REQUEST_GPIO: i32 = 10;
/// Input: companion drives HIGH while the cat is in frame.
pub const CAT_FOUND_GPIO: i32 = 11;
/// Input: vibration module, HIGH when the chassis is being pawed at.
pub const VIBRATION_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Companion serial link (UART1)
// ---------------------------------------------------------------------------

pub const LINK_UART_TX_GPIO: i32 = 17;
pub const LINK_UART_RX_GPIO: i32 = 18;
pub const LINK_UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// PWM channel map (LEDC)
// ---------------------------------------------------------------------------

pub const PWM_CH_MOTOR_A: u32 = 0;
pub const PWM_CH_MOTOR_B: u32 = 1;
pub const PWM_CH_SERVO_TOY: u32 = 2;
pub const PWM_CH_SERVO_SNACK: u32 = 3;
pub const PWM_CH_BUZZER: u32 = 4;

/// LEDC base frequency for the drive motors (25 kHz — inaudible).
pub const MOTOR_PWM_FREQ_HZ: u32 = 25_000;
/// Servo frame rate (SG90 expects 50 Hz).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
