//! Sensor drivers.
//!
//! Each sensor is host-testable: on ESP-IDF it reads real peripherals via
//! `hw_init`, on the host it reads injectable atomics.

pub mod proximity;
