//! Public host-facing API contracts for embedding the simulator core.

use thiserror::Error;

use crate::memory::{
    CacheAccess, CacheGeometry, BLOCK_SIZE, CACHE_SIZE, MAX_MEMORY_SIZE, MEMORY_SIZE,
};
use crate::microinstruction::Microinstruction;
use crate::state::Subcycle;
use crate::FaultCode;

/// Default micro-step bound for [`crate::Cpu::step_instruction`].
pub const DEFAULT_INSTRUCTION_STEP_LIMIT: u32 = 64;

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoreConfig {
    /// Main-memory size in words.
    pub memory_size: usize,
    /// Number of cache lines.
    pub cache_lines: usize,
    /// Words per cache block.
    pub block_size: usize,
    /// Microinstructions [`crate::Cpu::step_instruction`] may execute before
    /// giving up on reaching the fetch entry again.
    pub instruction_step_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
            cache_lines: CACHE_SIZE,
            block_size: BLOCK_SIZE,
            instruction_step_limit: DEFAULT_INSTRUCTION_STEP_LIMIT,
        }
    }
}

/// Rejected [`CoreConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Main memory must hold at least one word.
    #[error("memory size must be non-zero")]
    ZeroMemory,
    /// Memory cannot exceed what a 16-bit `MAR` can address.
    #[error("memory size {0} exceeds the 16-bit address space")]
    MemoryTooLarge(usize),
    /// The cache needs at least one line.
    #[error("cache must have at least one line")]
    ZeroCacheLines,
    /// More lines than the address space has words can never be filled.
    #[error("cache line count {0} exceeds the 16-bit address space")]
    TooManyCacheLines(usize),
    /// Blocks need at least one word.
    #[error("cache block size must be non-zero")]
    ZeroBlockSize,
    /// A block cannot be larger than the address space.
    #[error("cache block size {0} exceeds the 16-bit address space")]
    BlockTooLarge(usize),
    /// The instruction stepper needs a non-zero bound.
    #[error("instruction step limit must be non-zero")]
    ZeroStepLimit,
}

impl CoreConfig {
    /// Checks every size is usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size == 0 {
            return Err(ConfigError::ZeroMemory);
        }
        if self.memory_size > MAX_MEMORY_SIZE {
            return Err(ConfigError::MemoryTooLarge(self.memory_size));
        }
        if self.cache_lines == 0 {
            return Err(ConfigError::ZeroCacheLines);
        }
        if self.cache_lines > MAX_MEMORY_SIZE {
            return Err(ConfigError::TooManyCacheLines(self.cache_lines));
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.block_size > MAX_MEMORY_SIZE {
            return Err(ConfigError::BlockTooLarge(self.block_size));
        }
        if self.instruction_step_limit == 0 {
            return Err(ConfigError::ZeroStepLimit);
        }
        Ok(())
    }

    /// Cache dimensions selected by this configuration.
    #[must_use]
    pub const fn cache_geometry(&self) -> CacheGeometry {
        CacheGeometry {
            lines: self.cache_lines,
            block_size: self.block_size,
        }
    }
}

/// Output status from one subcycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The subcycle ran normally.
    Completed,
    /// A recoverable fault was raised and handled; stepping may continue.
    Fault(FaultCode),
}

impl StepOutcome {
    /// Returns the raised fault, if any.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        match self {
            Self::Completed => None,
            Self::Fault(code) => Some(code),
        }
    }
}

/// Aggregated outcome from a batched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunOutcome {
    /// Subcycles executed during the call.
    pub subcycles: u64,
    /// Faults raised during the call.
    pub faults: u64,
    /// Most recent fault raised during the call.
    pub last_fault: Option<FaultCode>,
    /// The engine stopped about to fetch the first microinstruction of the
    /// instruction fetch sequence.
    pub at_fetch_boundary: bool,
}

impl RunOutcome {
    pub(crate) fn record(&mut self, outcome: StepOutcome) {
        self.subcycles += 1;
        if let StepOutcome::Fault(code) = outcome {
            self.faults += 1;
            self.last_fault = Some(code);
        }
    }
}

/// Deterministic trace events emitted while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// A subcycle finished.
    Subcycle {
        /// Phase that ran.
        phase: Subcycle,
        /// `MPC` after the phase.
        mpc: u16,
    },
    /// `MIR` was loaded from the control store.
    MicroFetch {
        /// Control-store address fetched.
        mpc: u16,
        /// Microinstruction latched into `MIR`.
        mir: Microinstruction,
    },
    /// The ALU and shifter produced a result.
    AluResult {
        /// Post-shift result word.
        value: u16,
        /// N flag.
        negative: bool,
        /// Z flag.
        zero: bool,
    },
    /// The cache serviced a read or write.
    CacheAccess {
        /// Word address from `MAR`.
        addr: u16,
        /// Word read into or written from `MBR`.
        value: u16,
        /// Hit/miss classification.
        access: CacheAccess,
    },
    /// `DECODE` routed the opcode in `IR` to a micro-routine.
    Dispatch {
        /// `IR` value decoded.
        ir: u16,
        /// Micro-routine entry address.
        entry: u16,
    },
    /// A recoverable fault was raised.
    FaultRaised {
        /// Fault raised.
        cause: FaultCode,
        /// `MPC` when the fault was observed.
        mpc: u16,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Trace sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}
