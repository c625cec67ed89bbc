/// Proof of a started load, carrying the generation it was started under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    slot: SlotKind,
    generation: u64,
}

impl LoadTicket {
    /// Generation counter captured when the load started.
    pub fn generation(self) -> u64 {
        self.generation
    }

    /// Which slot the ticket belongs to.
    pub fn slot(self) -> SlotKind {
        self.slot
    }
}

/// Identifies the asset slot a [`LoadTicket`] was issued by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The source photo drawn under the watermark.
    Background,
    /// The raster used by image watermarks.
    Watermark,
}

/// Result of handing a finished load back to its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The value became the slot's current handle.
    Applied,
    /// A newer load (or a release) superseded the ticket; the value was dropped.
    Stale,
}

/// Holds at most one decoded handle and discards results of superseded loads.
///
/// Every [`AssetSlot::begin`] or [`AssetSlot::release`] bumps the generation, so any ticket issued
/// before it can no longer apply. Held handles are dropped on replacement, release, or when the
/// slot itself is dropped.
#[derive(Debug)]
pub struct AssetSlot<T> {
    kind: SlotKind,
    generation: u64,
    pending: bool,
    current: Option<T>,
}

impl<T> AssetSlot<T> {
    /// Empty slot.
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            generation: 0,
            pending: false,
            current: None,
        }
    }

    /// Start a new load. The previous handle stays visible until the new one applies.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.pending = true;
        LoadTicket {
            slot: self.kind,
            generation: self.generation,
        }
    }

    /// `true` when `ticket` is the slot's latest outstanding load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.slot == self.kind && ticket.generation == self.generation && self.pending
    }

    /// Apply `value` if `ticket` is still current; otherwise drop it.
    pub fn finish(&mut self, ticket: LoadTicket, value: T) -> LoadOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                slot = ?self.kind,
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale load result"
            );
            return LoadOutcome::Stale;
        }
        self.pending = false;
        self.current = Some(value);
        LoadOutcome::Applied
    }

    /// Mark a current load as failed. The previous handle is cleared so it is never shown as if
    /// it belonged to the failed input. Returns `false` for stale tickets.
    pub fn fail(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = false;
        self.current = None;
        true
    }

    /// Drop the held handle and invalidate all outstanding tickets.
    pub fn release(&mut self) {
        self.generation += 1;
        self.pending = false;
        self.current = None;
    }

    /// The held handle, if any.
    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// `true` while a load is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/slot.rs"]
mod tests;
