//! Open-time configuration, scoped to the one knob an embedded, synchronously
//! durable queue actually has: whether to force a flush to the backing store
//! after every mutating operation.

/// Options recognized at open time (see §6 of the design doc).
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// When `true` (the default), every mutating operation (`enqueue`,
    /// `dequeue`, `update`, ...) forces a synchronous flush of the backing
    /// store before returning, so a successful return is durable across a
    /// crash. Setting this to `false` leaves flushing to the backing store's
    /// own background thread, trading durability-on-return for throughput;
    /// a deliberate opt-in, not the default.
    pub sync: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { sync: true }
    }
}
