//! Microsequencer and datapath engine.
//!
//! Each microinstruction runs in four subcycles:
//! 1. `FETCH_MICRO` loads `MIR` from the control store at `MPC`.
//! 2. `DECODE_READ` latches the A and B bus registers.
//! 3. `ALU_EXEC` runs the ALU and shifter and updates N/Z.
//! 4. `WRITEBACK_NEXT` commits results in a fixed order (`MAR`, `MBR`, C bus,
//!    memory read, memory write) and selects the next `MPC`.
//!
//! Faults never stop the engine: they are reported from the step that raised
//! them, counted in [`Diagnostics`], and stepping continues.

mod flags;

pub use flags::AluFlags;

use crate::alu;
use crate::api::{NullTraceSink, RunOutcome, StepOutcome, TraceEvent, TraceSink};
use crate::control_store::{entry, ControlStore};
use crate::diag::Diagnostics;
use crate::encoding::OpcodeMap;
use crate::memory::{CacheAccess, DirectMappedCache, MainMemory};
use crate::microinstruction::{Condition, Microinstruction, JAM_BIT, NEXT_ADDRESS_MASK};
use crate::state::{Register, RegisterFile, Subcycle};
use crate::{ConfigError, CoreConfig, FaultCode};

/// A MIC-1 processor: datapath, microsequencer, control store and memory.
#[derive(Debug, Clone)]
pub struct Cpu {
    config: CoreConfig,
    registers: RegisterFile,
    cache: DirectMappedCache,
    control_store: ControlStore,
    opcode_map: OpcodeMap,
    mpc: u16,
    mir: Microinstruction,
    subcycle: Subcycle,
    latch_a: u16,
    latch_b: u16,
    alu_out: u16,
    flags: AluFlags,
    diagnostics: Diagnostics,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::assemble_parts(
            CoreConfig::default(),
            ControlStore::mac1(),
            OpcodeMap::mac1(),
        )
    }
}

impl Cpu {
    /// Builds a processor running the built-in MAC-1 microprogram.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        Self::with_microprogram(config, ControlStore::mac1(), OpcodeMap::mac1())
    }

    /// Builds a processor running a custom microprogram.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn with_microprogram(
        config: CoreConfig,
        control_store: ControlStore,
        opcode_map: OpcodeMap,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble_parts(config, control_store, opcode_map))
    }

    fn assemble_parts(config: CoreConfig, control_store: ControlStore, opcode_map: OpcodeMap) -> Self {
        let cache = DirectMappedCache::new(
            config.cache_geometry(),
            MainMemory::new(config.memory_size),
        );
        Self {
            config,
            registers: RegisterFile::default(),
            cache,
            control_store,
            opcode_map,
            mpc: entry::FETCH,
            mir: Microinstruction::NOOP,
            subcycle: Subcycle::FetchMicro,
            latch_a: 0,
            latch_b: 0,
            alu_out: 0,
            flags: AluFlags::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Copies a program image into memory from address 0 and drops any
    /// cached lines.
    ///
    /// Returns the number of words stored.
    pub fn load_image(&mut self, image: &[u16]) -> usize {
        let stored = self.cache.memory_mut().load_image(image);
        self.cache.invalidate();
        tracing::debug!(words = stored, "program image loaded");
        stored
    }

    /// Restores power-on datapath state. Memory contents are preserved.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.cache.invalidate();
        self.mpc = entry::FETCH;
        self.mir = Microinstruction::NOOP;
        self.subcycle = Subcycle::FetchMicro;
        self.latch_a = 0;
        self.latch_b = 0;
        self.alu_out = 0;
        self.flags = AluFlags::default();
        self.diagnostics.reset();
    }

    /// Advances one subcycle.
    pub fn step(&mut self) -> StepOutcome {
        self.step_with_trace(&mut NullTraceSink)
    }

    /// Advances one subcycle, reporting what happened to `sink`.
    pub fn step_with_trace(&mut self, sink: &mut dyn TraceSink) -> StepOutcome {
        let phase = self.subcycle;
        let outcome = match phase {
            Subcycle::FetchMicro => self.fetch_micro(sink),
            Subcycle::DecodeRead => {
                self.decode_read();
                StepOutcome::Completed
            }
            Subcycle::AluExec => {
                self.alu_exec(sink);
                StepOutcome::Completed
            }
            Subcycle::WritebackNext => self.writeback_next(sink),
        };

        self.subcycle = phase.next();
        self.diagnostics.record_subcycle();
        tracing::trace!(phase = phase.number(), mpc = self.mpc, "subcycle");
        sink.on_event(TraceEvent::Subcycle {
            phase,
            mpc: self.mpc,
        });
        outcome
    }

    /// Runs subcycles until the next `FETCH_MICRO` boundary.
    ///
    /// From a boundary this executes exactly one microinstruction; from the
    /// middle of a cycle it finishes the current one.
    pub fn step_microinstruction(&mut self) -> RunOutcome {
        let mut run = RunOutcome::default();
        loop {
            run.record(self.step());
            if self.subcycle == Subcycle::FetchMicro {
                break;
            }
        }
        run.at_fetch_boundary = self.at_fetch_boundary();
        run
    }

    /// Runs microinstructions until the sequencer returns to the fetch entry.
    ///
    /// Stops early after [`CoreConfig::instruction_step_limit`]
    /// microinstructions; `at_fetch_boundary` in the result tells the two
    /// apart.
    pub fn step_instruction(&mut self) -> RunOutcome {
        let mut run = RunOutcome::default();
        for _ in 0..self.config.instruction_step_limit {
            let micro = self.step_microinstruction();
            run.subcycles += micro.subcycles;
            run.faults += micro.faults;
            run.last_fault = micro.last_fault.or(run.last_fault);
            if micro.at_fetch_boundary {
                run.at_fetch_boundary = true;
                return run;
            }
        }
        tracing::warn!(
            limit = self.config.instruction_step_limit,
            mpc = self.mpc,
            "instruction did not return to fetch"
        );
        run
    }

    /// Runs `subcycles` subcycles.
    pub fn run(&mut self, subcycles: u64) -> RunOutcome {
        let mut run = RunOutcome::default();
        for _ in 0..subcycles {
            run.record(self.step());
        }
        run.at_fetch_boundary = self.at_fetch_boundary();
        run
    }

    fn at_fetch_boundary(&self) -> bool {
        self.subcycle == Subcycle::FetchMicro && self.mpc == entry::FETCH
    }

    fn fetch_micro(&mut self, sink: &mut dyn TraceSink) -> StepOutcome {
        self.diagnostics.record_microinstruction();
        if let Some(mir) = self.control_store.get(self.mpc) {
            self.mir = mir;
            sink.on_event(TraceEvent::MicroFetch { mpc: self.mpc, mir });
            StepOutcome::Completed
        } else {
            self.mir = Microinstruction::NOOP;
            sink.on_event(TraceEvent::MicroFetch {
                mpc: self.mpc,
                mir: self.mir,
            });
            self.raise(FaultCode::UnpopulatedControlStore, sink)
        }
    }

    fn decode_read(&mut self) {
        self.latch_a = self.registers.get(self.mir.a);
        self.latch_b = self.registers.get(self.mir.b);
    }

    fn alu_exec(&mut self, sink: &mut dyn TraceSink) {
        let a = if self.mir.amux {
            self.registers.get(Register::Mbr)
        } else {
            self.latch_a
        };
        let output = alu::compute(a, self.latch_b, self.mir.alu, self.mir.shift);
        self.alu_out = output.value;
        self.flags = AluFlags::from(output);
        sink.on_event(TraceEvent::AluResult {
            value: output.value,
            negative: output.negative,
            zero: output.zero,
        });
    }

    fn writeback_next(&mut self, sink: &mut dyn TraceSink) -> StepOutcome {
        let mir = self.mir;

        if mir.mar {
            self.registers.set(Register::Mar, self.alu_out);
        }
        if mir.mbr {
            self.registers.set(Register::Mbr, self.alu_out);
        }
        if mir.enc {
            self.registers.set(mir.c, self.alu_out);
        }
        if mir.rd {
            let addr = self.registers.get(Register::Mar);
            let value = self.cache.read(addr);
            self.registers.set(Register::Mbr, value);
            self.record_cache_access(addr, value, sink);
        }
        if mir.wr {
            let addr = self.registers.get(Register::Mar);
            let value = self.registers.get(Register::Mbr);
            self.cache.write(addr, value);
            self.record_cache_access(addr, value, sink);
        }

        self.select_next(mir, sink)
    }

    fn select_next(&mut self, mir: Microinstruction, sink: &mut dyn TraceSink) -> StepOutcome {
        let jam_target = (mir.next_address | JAM_BIT) & NEXT_ADDRESS_MASK;
        match mir.cond {
            Condition::Next => self.mpc = mir.next_address,
            Condition::JamN if self.flags.negative => self.mpc = jam_target,
            Condition::JamZ if self.flags.zero => self.mpc = jam_target,
            Condition::JamN | Condition::JamZ => self.mpc = mir.next_address,
            Condition::Decode => return self.dispatch(sink),
        }
        StepOutcome::Completed
    }

    fn dispatch(&mut self, sink: &mut dyn TraceSink) -> StepOutcome {
        let ir = self.registers.get(Register::Ir);
        if let Some(routine) = self.opcode_map.dispatch(ir) {
            tracing::debug!(ir, entry = routine, "dispatch");
            sink.on_event(TraceEvent::Dispatch { ir, entry: routine });
            self.diagnostics.record_dispatch();
            self.mpc = routine & NEXT_ADDRESS_MASK;
            StepOutcome::Completed
        } else {
            let outcome = self.raise(FaultCode::UnmappedOpcode, sink);
            self.mpc = entry::FETCH;
            outcome
        }
    }

    fn raise(&mut self, cause: FaultCode, sink: &mut dyn TraceSink) -> StepOutcome {
        tracing::warn!(
            mpc = self.mpc,
            ir = self.registers.get(Register::Ir),
            %cause,
            "recoverable fault"
        );
        self.diagnostics.record_fault(cause, self.mpc);
        sink.on_event(TraceEvent::FaultRaised {
            cause,
            mpc: self.mpc,
        });
        StepOutcome::Fault(cause)
    }

    fn record_cache_access(&mut self, addr: u16, value: u16, sink: &mut dyn TraceSink) {
        let access = self.cache.last_access();
        self.diagnostics.record_cache_access(access);
        sink.on_event(TraceEvent::CacheAccess {
            addr,
            value,
            access,
        });
    }

    /// Configuration the processor was built with.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Mutable register file, for seeding state before a run.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Current value of one register.
    #[must_use]
    pub const fn register(&self, reg: Register) -> u16 {
        self.registers.get(reg)
    }

    /// Cache and its backing memory.
    #[must_use]
    pub const fn cache(&self) -> &DirectMappedCache {
        &self.cache
    }

    /// Backing main memory.
    #[must_use]
    pub const fn memory(&self) -> &MainMemory {
        self.cache.memory()
    }

    /// Word a memory read of `addr` would observe, without side effects.
    #[must_use]
    pub fn read_word(&self, addr: u16) -> u16 {
        self.cache.peek(addr)
    }

    /// Outcome of the most recent cache access.
    #[must_use]
    pub const fn last_cache_access(&self) -> CacheAccess {
        self.cache.last_access()
    }

    /// Microprogram counter.
    #[must_use]
    pub const fn mpc(&self) -> u16 {
        self.mpc
    }

    /// Microinstruction register.
    #[must_use]
    pub const fn mir(&self) -> Microinstruction {
        self.mir
    }

    /// Phase the next call to [`Self::step`] will run.
    #[must_use]
    pub const fn subcycle(&self) -> Subcycle {
        self.subcycle
    }

    /// N/Z flags from the most recent ALU pass.
    #[must_use]
    pub const fn flags(&self) -> AluFlags {
        self.flags
    }

    /// A and B bus latches.
    #[must_use]
    pub const fn latches(&self) -> (u16, u16) {
        (self.latch_a, self.latch_b)
    }

    /// Most recent ALU/shifter result.
    #[must_use]
    pub const fn alu_output(&self) -> u16 {
        self.alu_out
    }

    /// Execution counters.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Installed control store.
    #[must_use]
    pub const fn control_store(&self) -> &ControlStore {
        &self.control_store
    }

    /// Installed decode dispatch table.
    #[must_use]
    pub const fn opcode_map(&self) -> &OpcodeMap {
        &self.opcode_map
    }
}
