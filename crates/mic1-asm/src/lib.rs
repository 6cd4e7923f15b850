//! Two-pass MAC-1 assembler for the MIC-1 simulator.

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;
use tracing_subscriber as _;

/// Top-level two-pass assembler pipeline.
pub mod assembler;
/// Instruction and directive encoding.
pub mod encoder;
/// Structured assembly error types.
pub mod errors;
/// Mnemonic resolution against the core instruction table.
pub mod mnemonic;
/// Source line parser for labels, mnemonics and operands.
pub mod parser;
/// Symbol table and pass-1 address assignment.
pub mod symbols;

pub use assembler::{assemble_file, assemble_source, Program};
pub use errors::AssembleError;
pub use parser::parse_literal;
pub use symbols::{Symbol, SymbolTable};
