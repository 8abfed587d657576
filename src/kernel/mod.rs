//! Cooperative tick kernel.
//!
//! Two fixed-table registries driven from one millisecond time base:
//!
//! * [`PendingOps`] — one-shot callbacks with a millisecond countdown,
//!   addressed by single-bit [`Opcode`]s.
//! * [`SecondTicker`] — a once-per-second fan-out for housekeeping
//!   handlers.
//!
//! On hardware the time base is the SysTick-style periodic interrupt; on
//! the host it is advanced explicitly by [`Kernel::advance_ms`], which the
//! application calls from every blocking wait so that countdowns keep
//! running while the foreground sits in a delay.

pub mod pending;
pub mod ticker;

pub use pending::{OpHandler, Opcode, PendingOps};
pub use ticker::SecondTicker;

/// The kernel: both registries plus the ms→s accumulator.
pub struct Kernel<C> {
    pub pending: PendingOps<C>,
    pub ticker: SecondTicker<C>,
    ms_accum: u32,
}

impl<C> Kernel<C> {
    pub fn new() -> Self {
        Self {
            pending: PendingOps::new(),
            ticker: SecondTicker::new(),
            ms_accum: 0,
        }
    }

    /// Advance the time base by `ms` milliseconds.
    ///
    /// Pending-op countdowns are serviced every millisecond; the 1-second
    /// fan-out runs on every accumulated full second.  The accumulator
    /// carries remainders across calls, so second ticks stay on a stable
    /// cadence regardless of how the wait is chopped up.
    pub fn advance_ms(&mut self, ms: u32, ctx: &mut C) {
        for _ in 0..ms {
            if self.pending.tick_wanted() {
                self.pending.tick_1ms(ctx);
            }
            self.ms_accum += 1;
            if self.ms_accum >= 1000 {
                self.ms_accum = 0;
                self.ticker.tick(ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpResult;

    #[derive(Default)]
    struct Ctx {
        op_fires: u32,
        sec_ticks: u32,
    }

    fn op_fire(c: &mut Ctx) -> OpResult {
        c.op_fires += 1;
        Ok(())
    }

    fn sec_tick(c: &mut Ctx) -> OpResult {
        c.sec_ticks += 1;
        Ok(())
    }

    #[test]
    fn second_ticks_accumulate_across_chopped_waits() {
        let mut kernel = Kernel::new();
        let mut ctx = Ctx::default();
        kernel.ticker.register(sec_tick).unwrap();

        // 2500 ms delivered as uneven chunks: exactly two second ticks.
        for chunk in [300, 700, 499, 1, 1000] {
            kernel.advance_ms(chunk, &mut ctx);
        }
        assert_eq!(ctx.sec_ticks, 2);

        // The leftover 500 ms completes the third second.
        kernel.advance_ms(500, &mut ctx);
        assert_eq!(ctx.sec_ticks, 3);
    }

    #[test]
    fn pending_and_second_paths_share_the_time_base() {
        let mut kernel = Kernel::new();
        let mut ctx = Ctx::default();
        kernel.ticker.register(sec_tick).unwrap();
        let op = kernel.pending.register(op_fire).unwrap();
        kernel.pending.add(op, 1500).unwrap();

        kernel.advance_ms(1499, &mut ctx);
        assert_eq!((ctx.op_fires, ctx.sec_ticks), (0, 1));
        kernel.advance_ms(1, &mut ctx);
        assert_eq!((ctx.op_fires, ctx.sec_ticks), (1, 1));
        kernel.advance_ms(500, &mut ctx);
        assert_eq!((ctx.op_fires, ctx.sec_ticks), (1, 2));
    }

    #[test]
    fn pending_scan_is_skipped_until_first_arm() {
        let mut kernel = Kernel::new();
        let mut ctx = Ctx::default();
        // No arm yet: advancing must not touch pending state.
        kernel.advance_ms(5000, &mut ctx);
        assert!(!kernel.pending.tick_wanted());
        assert_eq!(ctx.op_fires, 0);
    }
}
