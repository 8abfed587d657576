//! The real-chassis adapter: implements every port over the drivers.
//!
//! One struct owns every actuator/sensor driver plus the serial link
//! mailbox, and satisfies the whole [`RobotHw`](crate::app::ports::RobotHw)
//! bound.  On the host, input lines and the link mailbox are injectable so
//! the same adapter runs in simulation.

use crate::app::ports::{
    BuzzerPort, CompanionPort, DelayPort, MotorPort, ProximityPort, RangeCheck, RangeMode,
    ServoPort, Tone,
};
use crate::app::ports::{Motor, Rotation, Servo};
use crate::config::RobotConfig;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::hw_init;
use crate::drivers::motor::MotorDriver;
use crate::drivers::servo::ServoDriver;
use crate::link::{decode, SerialCommand, SerialLink, FRAME_LEN};
use crate::pins;
use crate::sensors::proximity::IrRangefinder;

pub struct RobotHardware {
    motors: MotorDriver,
    servos: ServoDriver,
    buzzer: Buzzer,
    rangefinder: IrRangefinder,
    link: SerialLink,
    #[cfg(target_os = "espidf")]
    rx_accum: [u8; FRAME_LEN],
    #[cfg(target_os = "espidf")]
    rx_len: usize,
}

impl RobotHardware {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            motors: MotorDriver::new(),
            servos: ServoDriver::new(),
            buzzer: Buzzer::new(),
            rangefinder: IrRangefinder::new(config),
            link: SerialLink::new(),
            #[cfg(target_os = "espidf")]
            rx_accum: [0; FRAME_LEN],
            #[cfg(target_os = "espidf")]
            rx_len: 0,
        }
    }

    /// Host/test injection: deliver a raw 9-byte frame as if the UART
    /// receive path had completed it.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject_frame(&mut self, raw: &[u8; FRAME_LEN]) {
        self.link.on_rx_complete(raw);
    }

    /// Drain whatever the UART has buffered into the frame accumulator.
    /// Non-blocking; called from every `take_command` so the mailbox is
    /// fresh at each poll point.
    #[cfg(target_os = "espidf")]
    fn pump_uart(&mut self) {
        use esp_idf_svc::sys::{uart_read_bytes, uart_port_t_UART_NUM_1};
        loop {
            let mut byte = 0u8;
            // SAFETY: UART1 was installed during init; a zero timeout makes
            // this a non-blocking FIFO read.
            let n = unsafe {
                uart_read_bytes(
                    uart_port_t_UART_NUM_1,
                    (&raw mut byte).cast(),
                    1,
                    0,
                )
            };
            if n != 1 {
                break;
            }
            self.rx_accum[self.rx_len] = byte;
            self.rx_len += 1;
            if self.rx_len == FRAME_LEN {
                self.link.on_rx_complete(&self.rx_accum);
                self.rx_len = 0;
            }
        }
    }
}

impl MotorPort for RobotHardware {
    fn motors_enable(&mut self) {
        self.motors.enable();
    }

    fn motors_disable(&mut self) {
        self.motors.disable();
    }

    fn set_rotation(&mut self, motor: Motor, rotation: Rotation) {
        self.motors.set_rotation(motor, rotation);
    }

    fn set_speed(&mut self, motor: Motor, duty: u8) {
        self.motors.set_speed(motor, duty);
    }
}

impl ServoPort for RobotHardware {
    fn servo_enable(&mut self, servo: Servo, angle: u8) {
        self.servos.enable(servo, angle);
    }

    fn servo_disable(&mut self, servo: Servo) {
        self.servos.disable(servo);
    }

    fn servo_angle(&mut self, servo: Servo, angle: u8) {
        self.servos.set_angle(servo, angle);
    }
}

impl BuzzerPort for RobotHardware {
    fn tone_on(&mut self, tone: Tone) {
        self.buzzer.tone_on(tone);
    }

    fn tone_off(&mut self) {
        self.buzzer.tone_off();
    }
}

impl ProximityPort for RobotHardware {
    fn proximity(&mut self, mode: RangeMode) -> RangeCheck {
        self.rangefinder.proximity(mode)
    }
}

impl CompanionPort for RobotHardware {
    fn take_command(&mut self) -> Option<SerialCommand> {
        #[cfg(target_os = "espidf")]
        self.pump_uart();
        let frame = self.link.take()?;
        decode(&frame)
    }

    fn set_find_signal(&mut self, level: bool) {
        hw_init::gpio_write(pins::FIND_REQUEST_GPIO, level);
    }

    fn cat_found(&self) -> bool {
        hw_init::gpio_read(pins::CAT_FOUND_GPIO)
    }

    fn vibration(&self) -> bool {
        hw_init::gpio_read(pins::VIBRATION_GPIO)
    }
}

impl DelayPort for RobotHardware {
    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn injected_frames_come_back_as_commands() {
        let mut hw = RobotHardware::new(&RobotConfig::default());
        assert!(hw.take_command().is_none());

        hw.inject_frame(b"T60\0\0\0\0\0\0");
        assert_eq!(hw.take_command(), Some(SerialCommand::WaitTime(60)));
        assert!(hw.take_command().is_none());
    }

    #[test]
    fn handshake_lines_read_the_sim_gpio() {
        let hw = RobotHardware::new(&RobotConfig::default());
        hw_init::sim_set_gpio(pins::CAT_FOUND_GPIO, true);
        assert!(hw.cat_found());
        hw_init::sim_set_gpio(pins::CAT_FOUND_GPIO, false);
        assert!(!hw.cat_found());
    }
}
