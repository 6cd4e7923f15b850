//! MAC-1 word disassembly and register-transfer rendering of microinstructions.
//!
//! Words that do not decode to an assigned opcode, or that carry bits outside
//! their instruction's operand field, render as `.DATA 0xNNNN`. The assembler
//! accepts that form, so a listing assembles back to the same image.

use std::fmt;

use crate::alu::{AluOp, ShiftOp};
use crate::encoding::{classify_word, OperandKind};
use crate::microinstruction::{Condition, Microinstruction, JAM_BIT, NEXT_ADDRESS_MASK};
use crate::state::Register;

/// A single disassembled memory word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassemblyRow {
    /// Word address.
    pub addr: u16,
    /// Raw word.
    pub word: u16,
    /// Mnemonic, or `.DATA` for an unassigned opcode.
    pub mnemonic: &'static str,
    /// Formatted operand; empty when the instruction takes none.
    pub operand: String,
    /// The word does not decode to an instruction.
    pub is_data: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operand.is_empty() {
            f.write_str(self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operand)
        }
    }
}

/// Disassembles one word at `addr`.
#[must_use]
pub fn disassemble_row(addr: u16, word: u16) -> DisassemblyRow {
    classify_word(word)
        .filter(|enc| word & !(enc.opcode | enc.operand.mask()) == 0)
        .map_or_else(
            || DisassemblyRow {
                addr,
                word,
                mnemonic: ".DATA",
                operand: format!("{word:#06X}"),
                is_data: true,
            },
            |enc| DisassemblyRow {
                addr,
                word,
                mnemonic: enc.mnemonic,
                operand: match enc.operand {
                    OperandKind::None => String::new(),
                    kind => (word & kind.mask()).to_string(),
                },
                is_data: false,
            },
        )
}

/// Renders one word as assembly text, e.g. `LODD 5` or `PUSH`.
#[must_use]
pub fn disassemble_word(word: u16) -> String {
    disassemble_row(0, word).to_string()
}

/// Disassembles `len` words of `memory` starting at `start`.
///
/// The range is clipped to the slice; addresses past its end are omitted.
#[must_use]
pub fn disassemble_range(memory: &[u16], start: u16, len: usize) -> Vec<DisassemblyRow> {
    (usize::from(start)..)
        .take(len)
        .map_while(|addr| {
            let word = *memory.get(addr)?;
            let addr = u16::try_from(addr).ok()?;
            Some(disassemble_row(addr, word))
        })
        .collect()
}

fn reg_name(reg: Register) -> String {
    reg.name().to_ascii_lowercase()
}

/// Register-transfer notation in the style of the MAL microassembly language.
///
/// `MAR := PC; rd; goto 1` renders as `mar:=pc; rd; goto 1`.
impl fmt::Display for Microinstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = if self.amux {
            "mbr".to_owned()
        } else {
            reg_name(self.a)
        };
        let b = reg_name(self.b);
        let alu = match self.alu {
            AluOp::Add => format!("{a} + {b}"),
            AluOp::And => format!("band({a}, {b})"),
            AluOp::PassA => a,
            AluOp::NotA => format!("inv({a})"),
        };
        let expr = match self.shift {
            ShiftOp::None | ShiftOp::Reserved => alu,
            ShiftOp::Sra1 => format!("rshift({alu})"),
            ShiftOp::Sll8 => format!("lshift({alu})"),
        };

        let mut targets = Vec::new();
        if self.mar {
            targets.push("mar".to_owned());
        }
        if self.mbr {
            targets.push("mbr".to_owned());
        }
        if self.enc {
            targets.push(reg_name(self.c));
        }
        if targets.is_empty() && matches!(self.cond, Condition::JamN | Condition::JamZ) {
            targets.push("alu".to_owned());
        }

        let mut parts = Vec::new();
        if !targets.is_empty() {
            parts.push(format!("{}:={expr}", targets.join(":=")));
        }
        if self.rd {
            parts.push("rd".to_owned());
        }
        if self.wr {
            parts.push("wr".to_owned());
        }
        let jam = (self.next_address | JAM_BIT) & NEXT_ADDRESS_MASK;
        parts.push(match self.cond {
            Condition::Next => format!("goto {}", self.next_address),
            Condition::JamN => format!("if n then goto {jam}"),
            Condition::JamZ => format!("if z then goto {jam}"),
            Condition::Decode => "decode".to_owned(),
        });

        f.write_str(&parts.join("; "))
    }
}
