//! Sharp GP2Y0A21 IR rangefinder driver.
//!
//! Reads the sensor's analog output through an ADC channel and converts
//! it to centimetres with the datasheet power-curve fit.  Checks are made
//! against one of four trigger distances, picked by [`RangeMode`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::app::ports::{ProximityPort, RangeCheck, RangeMode};
use crate::config::RobotConfig;

#[cfg(not(target_os = "espidf"))]
static SIM_IR_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ir_adc(raw: u16) {
    SIM_IR_ADC.store(raw, Ordering::Relaxed);
}

/// ADC reference voltage and full-scale count (12-bit).
const ADC_VREF: f32 = 3.3;
const ADC_FULL_SCALE: f32 = 4095.0;

/// Power-curve fit of the GP2Y0A21 voltage/distance characteristic.
const CURVE_SCALE: f32 = 59.886_765;
const CURVE_EXPONENT: f32 = 1.175_917_2;

/// Convert a raw ADC count to volts.
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_VREF / ADC_FULL_SCALE
}

/// Convert sensor volts to centimetres.
pub fn volts_to_cm(volts: f32) -> f32 {
    CURVE_SCALE / volts.powf(CURVE_EXPONENT)
}

pub struct IrRangefinder {
    trig_op_cm: f32,
    trig_find_cm: f32,
    trig_snack_cm: f32,
    trig_long_cm: f32,
}

impl IrRangefinder {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            trig_op_cm: config.ir_trigger_op_cm,
            trig_find_cm: config.ir_trigger_find_cm,
            trig_snack_cm: config.ir_trigger_snack_cm,
            trig_long_cm: config.ir_trigger_long_cm,
        }
    }

    fn trigger_cm(&self, mode: RangeMode) -> f32 {
        match mode {
            RangeMode::Op => self.trig_op_cm,
            RangeMode::Find => self.trig_find_cm,
            RangeMode::Snack => self.trig_snack_cm,
            RangeMode::Long => self.trig_long_cm,
        }
    }

    /// Classify a raw ADC count against the mode's trigger distance.
    /// A zero count means the ADC read failed.
    pub fn evaluate(&self, raw: u16, mode: RangeMode) -> RangeCheck {
        if raw == 0 {
            return RangeCheck::Err;
        }
        let volts = adc_to_volts(raw);
        if volts <= 0.0 {
            return RangeCheck::Err;
        }
        if volts_to_cm(volts) <= self.trigger_cm(mode) {
            RangeCheck::Near
        } else {
            RangeCheck::Far
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        crate::drivers::hw_init::adc1_read(crate::pins::IR_ADC_CH)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_IR_ADC.load(Ordering::Relaxed)
    }
}

impl ProximityPort for IrRangefinder {
    fn proximity(&mut self, mode: RangeMode) -> RangeCheck {
        let raw = self.read_adc();
        self.evaluate(raw, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raw ADC count that reads back as roughly `cm` centimetres.
    fn raw_for_cm(cm: f32) -> u16 {
        let volts = (CURVE_SCALE / cm).powf(1.0 / CURVE_EXPONENT);
        (volts * ADC_FULL_SCALE / ADC_VREF) as u16
    }

    #[test]
    fn curve_is_monotonic_in_voltage() {
        // Closer objects produce more volts.
        assert!(volts_to_cm(2.0) < volts_to_cm(1.0));
        assert!(volts_to_cm(1.0) < volts_to_cm(0.5));
    }

    #[test]
    fn conversion_roundtrips_through_the_fit() {
        for cm in [12.0f32, 25.0, 45.0, 70.0] {
            let raw = raw_for_cm(cm);
            let back = volts_to_cm(adc_to_volts(raw));
            assert!((back - cm).abs() < 1.0, "{cm}cm → {back}cm");
        }
    }

    #[test]
    fn op_mode_triggers_at_twenty_centimetres() {
        let ir = IrRangefinder::new(&RobotConfig::default());
        assert_eq!(ir.evaluate(raw_for_cm(18.0), RangeMode::Op), RangeCheck::Near);
        assert_eq!(ir.evaluate(raw_for_cm(30.0), RangeMode::Op), RangeCheck::Far);
    }

    #[test]
    fn modes_use_their_own_trigger_distance() {
        let ir = IrRangefinder::new(&RobotConfig::default());
        let raw_30 = raw_for_cm(30.0);
        // 30 cm: beyond Op (20) and Snack (15), within Find (40) and Long (60).
        assert_eq!(ir.evaluate(raw_30, RangeMode::Op), RangeCheck::Far);
        assert_eq!(ir.evaluate(raw_30, RangeMode::Snack), RangeCheck::Far);
        assert_eq!(ir.evaluate(raw_30, RangeMode::Find), RangeCheck::Near);
        assert_eq!(ir.evaluate(raw_30, RangeMode::Long), RangeCheck::Near);
    }

    #[test]
    fn failed_read_reports_err() {
        let ir = IrRangefinder::new(&RobotConfig::default());
        assert_eq!(ir.evaluate(0, RangeMode::Op), RangeCheck::Err);
    }

    #[test]
    fn injection_drives_the_port() {
        let mut ir = IrRangefinder::new(&RobotConfig::default());
        sim_set_ir_adc(raw_for_cm(10.0));
        assert_eq!(ir.proximity(RangeMode::Op), RangeCheck::Near);
        sim_set_ir_adc(0);
        assert_eq!(ir.proximity(RangeMode::Op), RangeCheck::Err);
    }
}
