//! CareBot firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod kernel;
pub mod link;
pub mod patterns;
pub mod schedule;

mod pins;

// ESP-IDF-backed layers; host builds compile the simulation paths inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
