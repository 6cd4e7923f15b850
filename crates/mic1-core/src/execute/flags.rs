//! N/Z condition flags latched by the ALU.

use crate::alu::AluOutput;

/// Flags produced by the most recent ALU pass.
///
/// They persist across microinstructions until the next `ALU_EXEC` phase
/// overwrites them, so a `JAM` condition always sees the result of its own
/// microinstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AluFlags {
    /// Bit 15 of the last result.
    pub negative: bool,
    /// Last result was zero.
    pub zero: bool,
}

impl From<AluOutput> for AluFlags {
    fn from(output: AluOutput) -> Self {
        Self {
            negative: output.negative,
            zero: output.zero,
        }
    }
}
