//! Driven adapters — implementations of the port traits.

pub mod hardware;
pub mod log_sink;
