//! System configuration parameters
//!
//! All tunable parameters for the CareBot robot.  Drive speeds are percent
//! duty (0-100), angles are servo degrees, times are in the unit their name
//! says.  Values can be overridden at build time or via a provisioning
//! channel later; the defaults match the production chassis.

use serde::{Deserialize, Serialize};

/// Core robot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    // --- Manual drive ---
    /// Wheel duty while rotating in place under manual control (0-100%)
    pub manual_rotate_speed: u8,
    /// Wheel duty while driving straight under manual control (0-100%)
    pub manual_drive_speed: u8,

    // --- Pattern speed shaping ---
    /// Duty added for "lunge" accents inside motion patterns
    pub speed_addend: u8,
    /// Duty removed for "creep" accents inside motion patterns
    pub speed_subtrahend: u8,

    // --- Servos ---
    /// Snack dispenser rest/ready angle (degrees)
    pub snack_ready_angle: u8,
    /// Degrees added to the ready angle to tip a snack out
    pub snack_give_swing: u8,
    /// Teaser toy rest angle (degrees)
    pub toy_rest_angle: u8,
    /// Delay before the snack servo swings back to ready (milliseconds)
    pub snack_return_wait_ms: u32,

    // --- Autonomous play ---
    /// Budget for the wait-and-flee pattern's ambush phase (seconds)
    pub ambush_wait_secs: i32,
    /// How long to rotate looking for the cat before giving up (seconds)
    pub cat_search_timeout_secs: i32,
    /// How long to call and wait for a vibration response (seconds)
    pub vibration_wait_secs: i32,
    /// Width of the find-request pulse to the vision companion (milliseconds)
    pub find_signal_pulse_ms: u32,

    // --- Parking ---
    /// Proximity polls before the wall-park search gives up
    pub park_poll_limit: u32,
    /// Pause between wall-park proximity polls (milliseconds)
    pub park_poll_interval_ms: u32,

    // --- IR rangefinder trigger distances (centimetres) ---
    /// Obstacle reaction distance during normal pattern driving
    pub ir_trigger_op_cm: f32,
    /// Cat detection distance during the search rotation
    pub ir_trigger_find_cm: f32,
    /// Cat-at-the-bowl distance for snack dispensing
    pub ir_trigger_snack_cm: f32,
    /// Wall detection distance for end-of-session parking
    pub ir_trigger_long_cm: f32,

    // --- Timing ---
    /// Idle poll interval of the foreground dispatch loop (milliseconds)
    pub idle_poll_interval_ms: u32,
    /// Poll interval inside the manual-drive loop (milliseconds)
    pub manual_poll_interval_ms: u32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            // Manual drive
            manual_rotate_speed: 60,
            manual_drive_speed: 100,

            // Pattern accents
            speed_addend: 40,
            speed_subtrahend: 10,

            // Servos
            snack_ready_angle: 30,
            snack_give_swing: 90,
            toy_rest_angle: 45,
            snack_return_wait_ms: 500,

            // Autonomous play
            ambush_wait_secs: 20,
            cat_search_timeout_secs: 30,
            vibration_wait_secs: 60,
            find_signal_pulse_ms: 200,

            // Parking
            park_poll_limit: 150,
            park_poll_interval_ms: 100,

            // IR trigger distances
            ir_trigger_op_cm: 20.0,
            ir_trigger_find_cm: 40.0,
            ir_trigger_snack_cm: 15.0,
            ir_trigger_long_cm: 60.0,

            // Timing
            idle_poll_interval_ms: 50,
            manual_poll_interval_ms: 10,
        }
    }
}

impl RobotConfig {
    /// Default autonomous rotate duty — half of the manual rotate duty.
    pub fn auto_rotate_speed(&self) -> u8 {
        self.manual_rotate_speed / 2
    }

    /// Default autonomous drive duty — half of the manual drive duty.
    pub fn auto_drive_speed(&self) -> u8 {
        self.manual_drive_speed / 2
    }

    /// Minimum autonomous rotate duty, used at speed level 0.
    pub fn min_rotate_speed(&self) -> u8 {
        self.auto_rotate_speed() / 2
    }

    /// Minimum autonomous drive duty, used at speed level 0.
    pub fn min_drive_speed(&self) -> u8 {
        self.auto_drive_speed() / 2
    }

    /// Duty addend for full-throttle "flee" bursts.  Derived so the burst
    /// saturates the drive range from whichever base duty is lower.
    pub fn overshoot_addend(&self) -> u8 {
        let base = self.auto_rotate_speed().min(self.auto_drive_speed());
        254u8.saturating_sub(base.saturating_mul(4))
    }

    /// Snack dispense angle (ready angle plus the give swing, capped at
    /// the servo's mechanical limit).
    pub fn snack_give_angle(&self) -> u8 {
        (self.snack_ready_angle + self.snack_give_swing).min(180)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = RobotConfig::default();
        assert!(c.manual_rotate_speed > 0 && c.manual_rotate_speed <= 100);
        assert!(c.manual_drive_speed > 0 && c.manual_drive_speed <= 100);
        assert!(c.snack_give_angle() <= 180);
        assert!(c.ambush_wait_secs > 0);
        assert!(c.cat_search_timeout_secs > 0);
        assert!(c.vibration_wait_secs > 0);
        assert!(c.park_poll_limit > 0);
        assert!(c.idle_poll_interval_ms > 0);
    }

    #[test]
    fn derived_speeds_stay_in_duty_range() {
        let c = RobotConfig::default();
        assert!(c.auto_rotate_speed() <= 100);
        assert!(c.auto_drive_speed() <= 100);
        assert!(c.min_rotate_speed() < c.auto_rotate_speed());
        assert!(c.min_drive_speed() < c.auto_drive_speed());
        // Doubled for level-2 play must still be a valid duty.
        assert!(c.auto_drive_speed() * 2 <= 100);
    }

    #[test]
    fn trigger_distances_are_ordered() {
        let c = RobotConfig::default();
        assert!(c.ir_trigger_snack_cm < c.ir_trigger_op_cm);
        assert!(c.ir_trigger_op_cm < c.ir_trigger_find_cm);
        assert!(c.ir_trigger_find_cm < c.ir_trigger_long_cm);
    }

    #[test]
    fn serde_roundtrip() {
        let c = RobotConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: RobotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.manual_drive_speed, c2.manual_drive_speed);
        assert_eq!(c.snack_return_wait_ms, c2.snack_return_wait_ms);
        assert!((c.ir_trigger_find_cm - c2.ir_trigger_find_cm).abs() < 0.001);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = RobotConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: RobotConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.snack_ready_angle, c2.snack_ready_angle);
        assert_eq!(c.park_poll_limit, c2.park_poll_limit);
    }
}
