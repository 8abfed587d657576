//! 1-second callback registry.
//!
//! Subsystems that need a once-per-second heartbeat (schedule countdown,
//! search timeouts, call-tone blinking) register a handler here; the kernel
//! fans the second tick out to every registered handler in slot order.
//!
//! Handlers are identified by function-pointer identity: registering the
//! same function twice is rejected, and unregistration takes the same
//! pointer that was registered.

use super::pending::OpHandler;
use crate::error::{OpResult, RegistryError};

/// Number of 1-second handler slots.
pub const SLOT_COUNT: usize = 8;

/// Fixed-table fan-out of once-per-second callbacks.
pub struct SecondTicker<C> {
    slots: [Option<OpHandler<C>>; SLOT_COUNT],
}

impl<C> SecondTicker<C> {
    const EMPTY: Option<OpHandler<C>> = None;

    pub fn new() -> Self {
        Self {
            slots: [Self::EMPTY; SLOT_COUNT],
        }
    }

    /// Add a handler to the first free slot.
    pub fn register(&mut self, handler: OpHandler<C>) -> Result<(), RegistryError> {
        if self.slots.iter().flatten().any(|&h| ptr_eq(h, handler)) {
            return Err(RegistryError::DuplicateHandler);
        }
        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(handler);
                return Ok(());
            }
        }
        Err(RegistryError::TableFull)
    }

    /// Remove a handler by identity.
    pub fn unregister(&mut self, handler: OpHandler<C>) -> Result<(), RegistryError> {
        for slot in &mut self.slots {
            if slot.is_some_and(|h| ptr_eq(h, handler)) {
                *slot = None;
                return Ok(());
            }
        }
        Err(RegistryError::NotRegistered)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered handler once, in slot order.
    pub fn tick(&mut self, ctx: &mut C) {
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(handler) = slot {
                report(handler(ctx), i);
            }
        }
    }
}

fn ptr_eq<C>(a: OpHandler<C>, b: OpHandler<C>) -> bool {
    a as usize == b as usize
}

// Same failure policy as the pending-op registry: loud in debug, ignored
// in release.
fn report(status: OpResult, slot: usize) {
    if let Err(e) = status {
        debug_assert!(false, "1-second handler in slot {slot} failed: {e}");
        let _ = slot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        a: u32,
        b: u32,
        order: Vec<char>,
    }

    fn tick_a(c: &mut Counter) -> OpResult {
        c.a += 1;
        c.order.push('a');
        Ok(())
    }

    fn tick_b(c: &mut Counter) -> OpResult {
        c.b += 1;
        c.order.push('b');
        Ok(())
    }

    #[test]
    fn fan_out_hits_every_handler() {
        let mut ticker = SecondTicker::new();
        let mut ctx = Counter::default();
        ticker.register(tick_a).unwrap();
        ticker.register(tick_b).unwrap();

        for _ in 0..3 {
            ticker.tick(&mut ctx);
        }
        assert_eq!(ctx.a, 3);
        assert_eq!(ctx.b, 3);
    }

    #[test]
    fn invocation_follows_slot_order() {
        let mut ticker = SecondTicker::new();
        let mut ctx = Counter::default();
        ticker.register(tick_a).unwrap();
        ticker.register(tick_b).unwrap();
        ticker.tick(&mut ctx);
        assert_eq!(ctx.order, vec!['a', 'b']);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut ticker: SecondTicker<Counter> = SecondTicker::new();
        ticker.register(tick_a).unwrap();
        assert_eq!(ticker.register(tick_a), Err(RegistryError::DuplicateHandler));
        assert_eq!(ticker.len(), 1);
    }

    #[test]
    fn unregister_stops_invocation() {
        let mut ticker = SecondTicker::new();
        let mut ctx = Counter::default();
        ticker.register(tick_a).unwrap();
        ticker.register(tick_b).unwrap();

        ticker.unregister(tick_a).unwrap();
        ticker.tick(&mut ctx);
        assert_eq!(ctx.a, 0);
        assert_eq!(ctx.b, 1);

        assert_eq!(ticker.unregister(tick_a), Err(RegistryError::NotRegistered));
    }

    #[test]
    fn table_full_after_eight_handlers() {
        // Eight distinct fns, then one more.
        fn h0(_: &mut Counter) -> OpResult { Ok(()) }
        fn h1(_: &mut Counter) -> OpResult { Ok(()) }
        fn h2(_: &mut Counter) -> OpResult { Ok(()) }
        fn h3(_: &mut Counter) -> OpResult { Ok(()) }
        fn h4(_: &mut Counter) -> OpResult { Ok(()) }
        fn h5(_: &mut Counter) -> OpResult { Ok(()) }
        fn h6(_: &mut Counter) -> OpResult { Ok(()) }
        fn h7(_: &mut Counter) -> OpResult { Ok(()) }
        fn h8(_: &mut Counter) -> OpResult { Ok(()) }

        let mut ticker: SecondTicker<Counter> = SecondTicker::new();
        for h in [h0, h1, h2, h3, h4, h5, h6, h7] {
            ticker.register(h).unwrap();
        }
        assert_eq!(ticker.register(h8), Err(RegistryError::TableFull));
    }

    #[test]
    fn freed_slot_is_reused() {
        let mut ticker = SecondTicker::new();
        let mut ctx = Counter::default();
        ticker.register(tick_a).unwrap();
        ticker.register(tick_b).unwrap();
        ticker.unregister(tick_a).unwrap();
        ticker.register(tick_a).unwrap();

        // tick_a landed back in slot 0, so it still runs first.
        ticker.tick(&mut ctx);
        assert_eq!(ctx.order, vec!['a', 'b']);
    }
}
