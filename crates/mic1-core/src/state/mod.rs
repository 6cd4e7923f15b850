//! Datapath register file and microsequencer phase primitives.

/// Register roles and the sixteen-slot register file.
pub mod registers;
/// Per-cycle phase state machine.
pub mod subcycle;

pub use registers::{
    Register, RegisterFile, AMASK_VALUE, REGISTER_COUNT, SMASK_VALUE, WORD_MASK,
};
pub use subcycle::Subcycle;
