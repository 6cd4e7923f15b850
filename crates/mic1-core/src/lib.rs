//! Core simulator crate for the MIC-1 microarchitecture running MAC-1 code.

/// Combinational ALU and shifter.
pub mod alu;
pub use alu::{compute, AluOp, AluOutput, ShiftOp};

/// Microinstruction format and bit-level codec.
pub mod microinstruction;
pub use microinstruction::{
    Condition, Microinstruction, CONTROL_STORE_SIZE, JAM_BIT, MICROINSTRUCTION_BITS,
    NEXT_ADDRESS_MASK,
};

/// Control store and the built-in MAC-1 microprogram.
pub mod control_store;
pub use control_store::{entry, ControlStore, ControlStoreError, MAC1_MICROPROGRAM};

/// MAC-1 instruction table and opcode dispatch map.
pub mod encoding;
pub use encoding::{
    canonical_opcode, classify_word, find_mnemonic, InstructionEncoding, OpcodeMap, OperandKind,
    ADDRESS_OPERAND_MASK, BYTE_OPERAND_MASK, EXTENDED_OPCODE_ESCAPE, INSTRUCTION_TABLE,
};

/// Main memory and direct-mapped cache.
pub mod memory;
pub use memory::{
    CacheAccess, CacheGeometry, CacheLine, DirectMappedCache, MainMemory, SplitAddress, BLOCK_SIZE,
    CACHE_SIZE, MAX_MEMORY_SIZE, MEMORY_SIZE,
};

/// Register file and microsequencer phases.
pub mod state;
pub use state::{Register, RegisterFile, Subcycle, AMASK_VALUE, REGISTER_COUNT, SMASK_VALUE, WORD_MASK};

/// Recoverable fault taxonomy.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Execution counters.
pub mod diag;
pub use diag::Diagnostics;

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ConfigError, CoreConfig, NullTraceSink, RunOutcome, StepOutcome, TraceEvent, TraceSink,
    DEFAULT_INSTRUCTION_STEP_LIMIT,
};

/// Microsequencer and datapath engine.
pub mod execute;
pub use execute::{AluFlags, Cpu};

/// MAC-1 and microinstruction disassembly.
pub mod disasm;
pub use disasm::{disassemble_range, disassemble_row, disassemble_word, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
