//! Saturating execution counters.

use crate::memory::CacheAccess;
use crate::{FaultClass, FaultCode};

/// Counters maintained by the engine while stepping.
///
/// Every counter saturates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Diagnostics {
    /// Subcycles executed.
    pub subcycles: u64,
    /// Microinstructions fetched into `MIR`.
    pub microinstructions: u64,
    /// Successful `DECODE` dispatches.
    pub instructions: u64,
    /// Cache reads served from a resident line.
    pub cache_read_hits: u64,
    /// Cache reads that refilled a line.
    pub cache_read_misses: u64,
    /// Cache writes that patched a resident line.
    pub cache_write_hits: u64,
    /// Cache writes that only reached memory.
    pub cache_write_misses: u64,
    /// Fetches from empty control-store slots.
    pub fault_count_control_store: u64,
    /// Dispatches of unmapped opcodes.
    pub fault_count_dispatch: u64,
    /// Most recent fault, if any.
    pub last_fault: Option<FaultCode>,
    /// `MPC` at the most recent fault.
    pub last_fault_mpc: u16,
}

impl Diagnostics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one executed subcycle.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_subcycle(&mut self) {
        self.subcycles = self.subcycles.saturating_add(1);
    }

    /// Records one `MIR` load.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_microinstruction(&mut self) {
        self.microinstructions = self.microinstructions.saturating_add(1);
    }

    /// Records one successful opcode dispatch.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_dispatch(&mut self) {
        self.instructions = self.instructions.saturating_add(1);
    }

    /// Records the outcome of one cache access.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_cache_access(&mut self, access: CacheAccess) {
        let counter = match access {
            CacheAccess::Idle => return,
            CacheAccess::ReadHit => &mut self.cache_read_hits,
            CacheAccess::ReadMiss => &mut self.cache_read_misses,
            CacheAccess::WriteHit => &mut self.cache_write_hits,
            CacheAccess::WriteMiss => &mut self.cache_write_misses,
        };
        *counter = counter.saturating_add(1);
    }

    /// Records a fault and bumps its class counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_fault(&mut self, code: FaultCode, mpc: u16) {
        self.last_fault = Some(code);
        self.last_fault_mpc = mpc;
        match code.class() {
            FaultClass::ControlStore => {
                self.fault_count_control_store = self.fault_count_control_store.saturating_add(1);
            }
            FaultClass::Dispatch => {
                self.fault_count_dispatch = self.fault_count_dispatch.saturating_add(1);
            }
        }
    }

    /// Total faults across all classes.
    #[must_use]
    pub const fn fault_count(&self) -> u64 {
        self.fault_count_control_store
            .saturating_add(self.fault_count_dispatch)
    }

    /// Fraction of cache accesses that hit, or `None` before any access.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let hits = self.cache_read_hits.saturating_add(self.cache_write_hits);
        let total = hits
            .saturating_add(self.cache_read_misses)
            .saturating_add(self.cache_write_misses);
        (total != 0).then(|| hits as f64 / total as f64)
    }

    /// Resets every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
