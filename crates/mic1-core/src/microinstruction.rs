//! Horizontal microinstruction format and its bit-level codec.
//!
//! A microinstruction packs into the low 33 bits of a `u64`:
//!
//! ```text
//!  32   31..30 29..28 27..26  25  24  23  22  21  20..17 16..13 12..9  8..0
//! AMUX   COND   ALU    SH    MBR MAR  RD  WR  ENC    C      B      A   ADDR
//! ```
//!
//! All shifting and masking lives in [`Microinstruction::encode`] and
//! [`Microinstruction::decode`]; the rest of the core only sees named fields.

use crate::alu::{AluOp, ShiftOp};
use crate::state::Register;

/// Number of addressable control-store slots (9-bit `ADDR`).
pub const CONTROL_STORE_SIZE: usize = 512;
/// Mask for the 9-bit next-address field.
pub const NEXT_ADDRESS_MASK: u16 = 0x01FF;
/// Bit OR-ed into the next address when a JAM condition holds.
pub const JAM_BIT: u16 = 0x0100;
/// Total width of an encoded microinstruction.
pub const MICROINSTRUCTION_BITS: u32 = 33;

const ADDR_SHIFT: u32 = 0;
const A_SHIFT: u32 = 9;
const B_SHIFT: u32 = 13;
const C_SHIFT: u32 = 17;
const ENC_SHIFT: u32 = 21;
const WR_SHIFT: u32 = 22;
const RD_SHIFT: u32 = 23;
const MAR_SHIFT: u32 = 24;
const MBR_SHIFT: u32 = 25;
const SH_SHIFT: u32 = 26;
const ALU_SHIFT: u32 = 28;
const COND_SHIFT: u32 = 30;
const AMUX_SHIFT: u32 = 32;

/// Next-address selection mode (`COND` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Condition {
    /// Continue at `ADDR`.
    #[default]
    Next = 0,
    /// Continue at `ADDR | 0x100` when the N flag is set.
    JamN = 1,
    /// Continue at `ADDR | 0x100` when the Z flag is set.
    JamZ = 2,
    /// Dispatch on the opcode held in `IR`.
    Decode = 3,
}

impl Condition {
    /// Decodes the low two bits of a field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Next,
            1 => Self::JamN,
            2 => Self::JamZ,
            _ => Self::Decode,
        }
    }

    /// Returns the two-bit encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// A decoded microinstruction.
///
/// The builder methods are `const` so whole microprograms can be authored as
/// constant tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Microinstruction {
    /// Next microprogram address (9 bits).
    pub next_address: u16,
    /// A-bus source register.
    pub a: Register,
    /// B-bus source register.
    pub b: Register,
    /// C-bus destination register, written when `enc` is set.
    pub c: Register,
    /// Enable the C-bus write.
    pub enc: bool,
    /// Start a memory write of `MBR` to `MAR`.
    pub wr: bool,
    /// Start a memory read of `MAR` into `MBR`.
    pub rd: bool,
    /// Latch the result into `MAR`.
    pub mar: bool,
    /// Latch the result into `MBR`.
    pub mbr: bool,
    /// Shifter function.
    pub shift: ShiftOp,
    /// ALU function.
    pub alu: AluOp,
    /// Next-address condition.
    pub cond: Condition,
    /// Feed `MBR` instead of the A-bus register into the ALU.
    pub amux: bool,
}

impl Microinstruction {
    /// The all-zero microinstruction: adds `None + None`, writes nothing and
    /// continues at address 0.
    pub const NOOP: Self = Self::decode(0);

    /// Starts a microinstruction that continues at `next_address`.
    #[must_use]
    pub const fn goto(next_address: u16) -> Self {
        Self {
            next_address,
            a: Register::None,
            b: Register::None,
            c: Register::None,
            enc: false,
            wr: false,
            rd: false,
            mar: false,
            mbr: false,
            shift: ShiftOp::None,
            alu: AluOp::Add,
            cond: Condition::Next,
            amux: false,
        }
    }

    /// Selects the A-bus source.
    #[must_use]
    pub const fn a(mut self, reg: Register) -> Self {
        self.a = reg;
        self
    }

    /// Selects the B-bus source.
    #[must_use]
    pub const fn b(mut self, reg: Register) -> Self {
        self.b = reg;
        self
    }

    /// Writes the result to `reg` over the C bus.
    #[must_use]
    pub const fn to(mut self, reg: Register) -> Self {
        self.c = reg;
        self.enc = true;
        self
    }

    /// Feeds `MBR` into the ALU's A input.
    #[must_use]
    pub const fn amux_mbr(mut self) -> Self {
        self.amux = true;
        self
    }

    /// Selects the ALU function.
    #[must_use]
    pub const fn alu(mut self, op: AluOp) -> Self {
        self.alu = op;
        self
    }

    /// Selects the shifter function.
    #[must_use]
    pub const fn shift(mut self, op: ShiftOp) -> Self {
        self.shift = op;
        self
    }

    /// Latches the result into `MAR`.
    #[must_use]
    pub const fn mar(mut self) -> Self {
        self.mar = true;
        self
    }

    /// Latches the result into `MBR`.
    #[must_use]
    pub const fn mbr(mut self) -> Self {
        self.mbr = true;
        self
    }

    /// Issues a memory read.
    #[must_use]
    pub const fn rd(mut self) -> Self {
        self.rd = true;
        self
    }

    /// Issues a memory write.
    #[must_use]
    pub const fn wr(mut self) -> Self {
        self.wr = true;
        self
    }

    /// Selects the next-address condition.
    #[must_use]
    pub const fn cond(mut self, cond: Condition) -> Self {
        self.cond = cond;
        self
    }

    /// Packs the fields into their bit positions.
    ///
    /// Each field is masked to its width; an over-wide `next_address` is
    /// truncated rather than rejected.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn encode(self) -> u64 {
        ((self.next_address & NEXT_ADDRESS_MASK) as u64) << ADDR_SHIFT
            | ((self.a.index() & 0xF) as u64) << A_SHIFT
            | ((self.b.index() & 0xF) as u64) << B_SHIFT
            | ((self.c.index() & 0xF) as u64) << C_SHIFT
            | (self.enc as u64) << ENC_SHIFT
            | (self.wr as u64) << WR_SHIFT
            | (self.rd as u64) << RD_SHIFT
            | (self.mar as u64) << MAR_SHIFT
            | (self.mbr as u64) << MBR_SHIFT
            | ((self.shift.bits() & 0b11) as u64) << SH_SHIFT
            | ((self.alu.bits() & 0b11) as u64) << ALU_SHIFT
            | ((self.cond.bits() & 0b11) as u64) << COND_SHIFT
            | (self.amux as u64) << AMUX_SHIFT
    }

    /// Unpacks a raw control word. Bits above bit 32 are ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(word: u64) -> Self {
        Self {
            next_address: ((word >> ADDR_SHIFT) as u16) & NEXT_ADDRESS_MASK,
            a: Register::from_u4((word >> A_SHIFT) as u8),
            b: Register::from_u4((word >> B_SHIFT) as u8),
            c: Register::from_u4((word >> C_SHIFT) as u8),
            enc: (word >> ENC_SHIFT) & 1 != 0,
            wr: (word >> WR_SHIFT) & 1 != 0,
            rd: (word >> RD_SHIFT) & 1 != 0,
            mar: (word >> MAR_SHIFT) & 1 != 0,
            mbr: (word >> MBR_SHIFT) & 1 != 0,
            shift: ShiftOp::from_u2((word >> SH_SHIFT) as u8),
            alu: AluOp::from_u2((word >> ALU_SHIFT) as u8),
            cond: Condition::from_u2((word >> COND_SHIFT) as u8),
            amux: (word >> AMUX_SHIFT) & 1 != 0,
        }
    }
}
