/// The four phases of one microinstruction cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Subcycle {
    /// Latch `MIR` from the control store at `MPC`.
    #[default]
    FetchMicro = 1,
    /// Decode `MIR` and latch the A and B bus registers.
    DecodeRead = 2,
    /// Run the ALU and shifter, updating the N/Z flags.
    AluExec = 3,
    /// Write back results, access memory, and select the next `MPC`.
    WritebackNext = 4,
}

impl Subcycle {
    /// Returns the phase number (`1..=4`).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Returns the phase that follows this one; the cycle never terminates.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::FetchMicro => Self::DecodeRead,
            Self::DecodeRead => Self::AluExec,
            Self::AluExec => Self::WritebackNext,
            Self::WritebackNext => Self::FetchMicro,
        }
    }
}
