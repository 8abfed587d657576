//! Pending-op registry — millisecond-countdown one-shot callbacks.
//!
//! Foreground code registers a handler once and receives an [`Opcode`] (a
//! single-bit token).  It can then arm the op with a delay; the 1 ms tick
//! decrements the countdown and invokes the handler exactly once when it
//! expires.  The registry is generic over the blackboard context `C` so it
//! can be exercised without the rest of the firmware.
//!
//! Handlers run in tick context: they must be short and must not block.
//! Anything that touches hardware goes through a deferred-request field on
//! the context instead.

use crate::error::{OpResult, RegistryError};

/// Number of pending-op slots.  One bit of the opcode byte per slot.
pub const SLOT_COUNT: usize = 8;

/// Callback signature shared by pending ops and 1-second handlers.
pub type OpHandler<C> = fn(&mut C) -> OpResult;

/// Single-bit token identifying a registered pending op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u8);

impl Opcode {
    /// The null opcode — never corresponds to a slot.
    pub const NONE: Opcode = Opcode(0);

    pub(crate) fn from_slot(slot: usize) -> Self {
        debug_assert!(slot < SLOT_COUNT);
        Opcode(1 << slot)
    }

    /// Raw bitmask value.
    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Slot index, or `None` if the opcode is zero or multi-bit.
    fn slot(self) -> Option<usize> {
        if self.0.count_ones() == 1 {
            Some(self.0.trailing_zeros() as usize)
        } else {
            None
        }
    }
}

struct Slot<C> {
    handler: OpHandler<C>,
    /// Milliseconds until the handler fires.  Zero means unarmed.
    remaining_ms: u32,
}

/// Fixed-table registry of delayed one-shot callbacks.
pub struct PendingOps<C> {
    slots: [Option<Slot<C>>; SLOT_COUNT],
    /// Set on the first arm; the kernel skips the ms scan until then.
    tick_wanted: bool,
}

impl<C> PendingOps<C> {
    const EMPTY: Option<Slot<C>> = None;

    pub fn new() -> Self {
        Self {
            slots: [Self::EMPTY; SLOT_COUNT],
            tick_wanted: false,
        }
    }

    /// Bind a handler to the first free slot and return its opcode.
    pub fn register(&mut self, handler: OpHandler<C>) -> Result<Opcode, RegistryError> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(Slot {
                    handler,
                    remaining_ms: 0,
                });
                return Ok(Opcode::from_slot(i));
            }
        }
        Err(RegistryError::TableFull)
    }

    /// Release a slot.  Any running countdown is discarded.
    pub fn unregister(&mut self, op: Opcode) -> Result<(), RegistryError> {
        let i = op.slot().ok_or(RegistryError::BadOpcode)?;
        if self.slots[i].is_none() {
            return Err(RegistryError::NotRegistered);
        }
        self.slots[i] = None;
        Ok(())
    }

    /// Arm the op: its handler fires once after `delay_ms` milliseconds.
    ///
    /// Rejected while a countdown is already running — use
    /// [`time_reset`](Self::time_reset) to move an armed deadline.
    pub fn add(&mut self, op: Opcode, delay_ms: u32) -> Result<(), RegistryError> {
        let i = op.slot().ok_or(RegistryError::BadOpcode)?;
        let slot = self.slots[i].as_mut().ok_or(RegistryError::NotRegistered)?;
        if slot.remaining_ms > 0 {
            return Err(RegistryError::AlreadyArmed);
        }
        slot.remaining_ms = delay_ms;
        self.tick_wanted = true;
        Ok(())
    }

    /// Replace the countdown of an already-armed op.
    pub fn time_reset(&mut self, op: Opcode, delay_ms: u32) -> Result<(), RegistryError> {
        let i = op.slot().ok_or(RegistryError::BadOpcode)?;
        let slot = self.slots[i].as_mut().ok_or(RegistryError::NotRegistered)?;
        if slot.remaining_ms == 0 {
            return Err(RegistryError::NotArmed);
        }
        slot.remaining_ms = delay_ms;
        Ok(())
    }

    /// Disarm an armed op and run its handler right now, in the caller's
    /// context.
    pub fn exec_immediate(&mut self, op: Opcode, ctx: &mut C) -> Result<(), RegistryError> {
        let i = op.slot().ok_or(RegistryError::BadOpcode)?;
        let slot = self.slots[i].as_mut().ok_or(RegistryError::NotRegistered)?;
        if slot.remaining_ms == 0 {
            return Err(RegistryError::NotArmed);
        }
        slot.remaining_ms = 0;
        let handler = slot.handler;
        Self::report(handler(ctx), i);
        Ok(())
    }

    /// Disarm an op without running it.  A no-op if the op is not armed;
    /// tolerant of unregistered opcodes so teardown paths can cancel
    /// unconditionally.
    pub fn cancel(&mut self, op: Opcode) {
        if let Some(i) = op.slot() {
            if let Some(slot) = self.slots[i].as_mut() {
                slot.remaining_ms = 0;
            }
        }
    }

    /// True once any op has ever been armed.
    pub fn tick_wanted(&self) -> bool {
        self.tick_wanted
    }

    /// True while the op has a countdown running.
    pub fn is_armed(&self, op: Opcode) -> bool {
        op.slot()
            .and_then(|i| self.slots[i].as_ref())
            .is_some_and(|s| s.remaining_ms > 0)
    }

    /// Advance every armed countdown by one millisecond, firing handlers
    /// whose deadline is reached.
    pub fn tick_1ms(&mut self, ctx: &mut C) {
        for i in 0..SLOT_COUNT {
            let handler = match self.slots[i].as_mut() {
                Some(slot) if slot.remaining_ms > 0 => {
                    slot.remaining_ms -= 1;
                    if slot.remaining_ms > 0 {
                        continue;
                    }
                    slot.handler
                }
                _ => continue,
            };
            Self::report(handler(ctx), i);
        }
    }

    // Handler failure policy: halt loudly in debug builds, ignore in
    // release builds.
    fn report(status: OpResult, slot: usize) {
        if let Err(e) = status {
            debug_assert!(false, "pending op in slot {slot} failed: {e}");
            let _ = slot;
        }
    }
}
