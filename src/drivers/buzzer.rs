//! Passive piezo buzzer driver.
//!
//! Tones are produced by retuning the buzzer's LEDC timer to the note
//! frequency at a fixed 50% duty.  Muting drops the duty to zero rather
//! than stopping the timer, so tone changes while muted are cheap.

use crate::app::ports::Tone;
use crate::drivers::hw_init;
use crate::pins;

pub struct Buzzer {
    sounding: bool,
    tone: Option<Tone>,
}

impl Buzzer {
    pub fn new() -> Self {
        Self {
            sounding: false,
            tone: None,
        }
    }

    pub fn tone_on(&mut self, tone: Tone) {
        if self.sounding && self.tone == Some(tone) {
            return; // already sounding this note
        }
        self.tone = Some(tone);
        self.sounding = true;
        hw_init::pwm_set_freq(hw_init::BUZZER_TIMER, 1_000_000 / tone.period_us());
        // 50% of the 8-bit range.
        hw_init::pwm_set_duty(pins::PWM_CH_BUZZER, 128);
    }

    pub fn tone_off(&mut self) {
        self.sounding = false;
        hw_init::pwm_set_duty(pins::PWM_CH_BUZZER, 0);
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn current_tone(&self) -> Option<Tone> {
        self.tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_state_tracks_on_off() {
        let mut b = Buzzer::new();
        assert!(!b.is_sounding());

        b.tone_on(Tone::A5);
        assert!(b.is_sounding());
        assert_eq!(b.current_tone(), Some(Tone::A5));

        b.tone_off();
        assert!(!b.is_sounding());
        // The last tone is remembered for cheap re-starts.
        assert_eq!(b.current_tone(), Some(Tone::A5));
    }

    #[test]
    fn repeated_tone_on_is_idempotent() {
        let mut b = Buzzer::new();
        b.tone_on(Tone::C6);
        b.tone_on(Tone::C6);
        assert_eq!(b.current_tone(), Some(Tone::C6));
        b.tone_on(Tone::G5);
        assert_eq!(b.current_tone(), Some(Tone::G5));
    }

    #[test]
    fn tone_periods_descend_with_pitch() {
        assert!(Tone::A4.period_us() > Tone::C5.period_us());
        assert!(Tone::C5.period_us() > Tone::C6.period_us());
        assert!(Tone::C6.period_us() > Tone::G6.period_us());
    }
}
