//! CareBot Firmware — Main Entry Point
//!
//! Hexagonal architecture around a cooperative tick kernel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  RobotHardware                LogEventSink               │
//! │  (motors · servos · buzzer ·  (EventSink)                │
//! │   rangefinder · companion link)                          │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)             │      │
//! │  │  Kernel · Schedule · Pattern library           │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use carebot::adapters::hardware::RobotHardware;
use carebot::adapters::log_sink::LogEventSink;
use carebot::app::service::AppService;
use carebot::config::RobotConfig;
use carebot::drivers;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CareBot v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Configuration ──────────────────────────────────────
    let config = RobotConfig::default();

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = RobotHardware::new(&config);
    let mut log_sink = LogEventSink::new();

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut log_sink);

    info!("System ready. Entering dispatch loop.");

    // ── 6. Dispatch loop ──────────────────────────────────────
    app.run(&mut hw, &mut log_sink)
}
