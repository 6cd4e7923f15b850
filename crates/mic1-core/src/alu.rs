//! Combinational ALU and shifter.

/// Two-bit ALU function select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AluOp {
    /// `a + b`, wrapping at 16 bits.
    #[default]
    Add = 0,
    /// `a AND b`.
    And = 1,
    /// Pass `a` through unchanged.
    PassA = 2,
    /// Bitwise `NOT a`.
    NotA = 3,
}

impl AluOp {
    /// Decodes the low two bits of a field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Add,
            1 => Self::And,
            2 => Self::PassA,
            _ => Self::NotA,
        }
    }

    /// Returns the two-bit encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Two-bit shifter function select, applied to the ALU output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ShiftOp {
    /// No shift.
    #[default]
    None = 0,
    /// Arithmetic shift right by one.
    Sra1 = 1,
    /// Logical shift left by eight.
    Sll8 = 2,
    /// Unassigned encoding; behaves as no shift.
    Reserved = 3,
}

impl ShiftOp {
    /// Decodes the low two bits of a field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::None,
            1 => Self::Sra1,
            2 => Self::Sll8,
            _ => Self::Reserved,
        }
    }

    /// Returns the two-bit encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Result word and condition flags produced by one ALU/shifter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AluOutput {
    /// Post-shift 16-bit result.
    pub value: u16,
    /// Bit 15 of `value`.
    pub negative: bool,
    /// `value == 0`.
    pub zero: bool,
}

/// Runs the ALU function on `a`/`b`, then the shifter, then derives N/Z.
///
/// The arithmetic right shift copies the sign bit of the ALU output into the
/// vacated bit 15.
#[must_use]
pub const fn compute(a: u16, b: u16, alu: AluOp, shift: ShiftOp) -> AluOutput {
    let alu_out = match alu {
        AluOp::Add => a.wrapping_add(b),
        AluOp::And => a & b,
        AluOp::PassA => a,
        AluOp::NotA => !a,
    };

    let value = match shift {
        ShiftOp::None | ShiftOp::Reserved => alu_out,
        ShiftOp::Sra1 => {
            let sign = alu_out & 0x8000;
            (alu_out >> 1) | sign
        }
        ShiftOp::Sll8 => alu_out << 8,
    };

    AluOutput {
        value,
        negative: value & 0x8000 != 0,
        zero: value == 0,
    }
}
