//! MAC-1 macro-instruction encodings and the decode dispatch table.

use std::collections::BTreeMap;

use crate::control_store::entry;

/// Top-nibble value that escapes to an eight-bit extended opcode.
pub const EXTENDED_OPCODE_ESCAPE: u16 = 0xF;
/// Mask for the twelve-bit address/constant operand.
pub const ADDRESS_OPERAND_MASK: u16 = 0x0FFF;
/// Mask for the eight-bit stack-adjust operand.
pub const BYTE_OPERAND_MASK: u16 = 0x00FF;

/// Operand field carried by an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// No operand.
    None,
    /// Twelve-bit absolute memory address.
    Address,
    /// Twelve-bit unsigned constant.
    Constant,
    /// Twelve-bit offset from `SP`.
    StackOffset,
    /// Eight-bit stack adjustment.
    Byte,
}

impl OperandKind {
    /// Mask selecting the operand bits from an instruction word.
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Address | Self::Constant | Self::StackOffset => ADDRESS_OPERAND_MASK,
            Self::Byte => BYTE_OPERAND_MASK,
        }
    }
}

/// One assigned MAC-1 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionEncoding {
    /// Assembly mnemonic (upper case).
    pub mnemonic: &'static str,
    /// Canonical opcode: the instruction word with its operand bits cleared.
    pub opcode: u16,
    /// Operand field carried in the low bits.
    pub operand: OperandKind,
    /// Control-store address of the implementing micro-routine.
    pub entry: u16,
}

const fn instr(
    mnemonic: &'static str,
    opcode: u16,
    operand: OperandKind,
    entry: u16,
) -> InstructionEncoding {
    InstructionEncoding {
        mnemonic,
        opcode,
        operand,
        entry,
    }
}

/// Single source-of-truth instruction table.
///
/// Any canonical opcode not present here has no micro-routine.
pub const INSTRUCTION_TABLE: &[InstructionEncoding] = &[
    instr("LODD", 0x0000, OperandKind::Address, entry::LODD),
    instr("STOD", 0x1000, OperandKind::Address, entry::STOD),
    instr("ADDD", 0x2000, OperandKind::Address, entry::ADDD),
    instr("SUBD", 0x3000, OperandKind::Address, entry::SUBD),
    instr("JPOS", 0x4000, OperandKind::Address, entry::JPOS),
    instr("JZER", 0x5000, OperandKind::Address, entry::JZER),
    instr("JUMP", 0x6000, OperandKind::Address, entry::JUMP),
    instr("LOCO", 0x7000, OperandKind::Constant, entry::LOCO),
    instr("LODL", 0x8000, OperandKind::StackOffset, entry::LODL),
    instr("STOL", 0x9000, OperandKind::StackOffset, entry::STOL),
    instr("ADDL", 0xA000, OperandKind::StackOffset, entry::ADDL),
    instr("SUBL", 0xB000, OperandKind::StackOffset, entry::SUBL),
    instr("JNEG", 0xC000, OperandKind::Address, entry::JNEG),
    instr("JNZE", 0xD000, OperandKind::Address, entry::JNZE),
    instr("CALL", 0xE000, OperandKind::Address, entry::CALL),
    instr("PSHI", 0xF000, OperandKind::None, entry::PSHI),
    instr("POPI", 0xF200, OperandKind::None, entry::POPI),
    instr("PUSH", 0xF400, OperandKind::None, entry::PUSH),
    instr("POP", 0xF600, OperandKind::None, entry::POP),
    instr("RETN", 0xF800, OperandKind::None, entry::RETN),
    instr("SWAP", 0xFA00, OperandKind::None, entry::SWAP),
    instr("INSP", 0xFC00, OperandKind::Byte, entry::INSP),
    instr("DESP", 0xFE00, OperandKind::Byte, entry::DESP),
];

/// Extracts the canonical opcode from an instruction word.
///
/// The top four bits select the opcode unless they are all ones, in which case
/// the top eight bits do.
#[must_use]
pub const fn canonical_opcode(word: u16) -> u16 {
    if word >> 12 == EXTENDED_OPCODE_ESCAPE {
        word & 0xFF00
    } else {
        word & 0xF000
    }
}

/// Looks up the instruction table entry for an instruction word.
#[must_use]
pub fn classify_word(word: u16) -> Option<&'static InstructionEncoding> {
    let opcode = canonical_opcode(word);
    INSTRUCTION_TABLE.iter().find(|enc| enc.opcode == opcode)
}

/// Looks up an instruction by mnemonic, ignoring ASCII case.
#[must_use]
pub fn find_mnemonic(mnemonic: &str) -> Option<&'static InstructionEncoding> {
    INSTRUCTION_TABLE
        .iter()
        .find(|enc| enc.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Decode dispatch table: canonical opcode to micro-routine entry address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpcodeMap {
    routes: BTreeMap<u16, u16>,
}

impl OpcodeMap {
    /// Returns an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Builds the dispatch table for [`INSTRUCTION_TABLE`].
    #[must_use]
    pub fn mac1() -> Self {
        INSTRUCTION_TABLE
            .iter()
            .map(|enc| (enc.opcode, enc.entry))
            .collect()
    }

    /// Routes a canonical opcode to a micro-routine, replacing any prior route.
    pub fn insert(&mut self, opcode: u16, entry: u16) -> Option<u16> {
        self.routes.insert(opcode, entry)
    }

    /// Returns the micro-routine for a canonical opcode.
    #[must_use]
    pub fn get(&self, opcode: u16) -> Option<u16> {
        self.routes.get(&opcode).copied()
    }

    /// Returns the micro-routine for the opcode held in an `IR` value.
    #[must_use]
    pub fn dispatch(&self, ir: u16) -> Option<u16> {
        self.get(canonical_opcode(ir))
    }

    /// Number of routed opcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when no opcode is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(opcode, entry)` routes in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.routes.iter().map(|(opcode, entry)| (*opcode, *entry))
    }
}

impl FromIterator<(u16, u16)> for OpcodeMap {
    fn from_iter<I: IntoIterator<Item = (u16, u16)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
