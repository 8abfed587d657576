//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the CareBot robot:
//! command dispatch, the manual-drive loop, and the autonomous play
//! session.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod ctx;
pub mod events;
pub mod ports;
pub mod service;
