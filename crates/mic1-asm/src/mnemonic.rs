//! Mnemonic resolution derived from the core instruction table.

use mic1_core::{find_mnemonic, InstructionEncoding};

/// Directive that emits its operand verbatim as one word.
pub const DATA_DIRECTIVE: &str = ".DATA";

/// What a mnemonic assembles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    /// A MAC-1 instruction.
    Instruction(&'static InstructionEncoding),
    /// The `.DATA` directive.
    Data,
}

/// Resolves a mnemonic, ignoring ASCII case.
#[must_use]
pub fn resolve_mnemonic(text: &str) -> Option<Mnemonic> {
    if text.eq_ignore_ascii_case(DATA_DIRECTIVE) {
        return Some(Mnemonic::Data);
    }
    find_mnemonic(text).map(Mnemonic::Instruction)
}

#[cfg(test)]
mod tests {
    use mic1_core::{OperandKind, INSTRUCTION_TABLE};

    use super::{resolve_mnemonic, Mnemonic};

    #[test]
    fn every_table_mnemonic_resolves_in_any_case() {
        for enc in INSTRUCTION_TABLE {
            assert_eq!(
                resolve_mnemonic(enc.mnemonic),
                Some(Mnemonic::Instruction(enc))
            );
            assert_eq!(
                resolve_mnemonic(&enc.mnemonic.to_ascii_lowercase()),
                Some(Mnemonic::Instruction(enc))
            );
        }
    }

    #[test]
    fn data_directive_resolves() {
        assert_eq!(resolve_mnemonic(".DATA"), Some(Mnemonic::Data));
        assert_eq!(resolve_mnemonic(".data"), Some(Mnemonic::Data));
    }

    #[test]
    fn unknown_mnemonics_do_not_resolve() {
        assert_eq!(resolve_mnemonic("FOO"), None);
        assert_eq!(resolve_mnemonic("DATA"), None);
        assert_eq!(resolve_mnemonic(""), None);
    }

    #[test]
    fn operand_kinds_match_the_instruction_family() {
        let Some(Mnemonic::Instruction(lodd)) = resolve_mnemonic("LODD") else {
            panic!("LODD missing");
        };
        assert_eq!(lodd.opcode, 0x0000);
        assert_eq!(lodd.operand, OperandKind::Address);

        let Some(Mnemonic::Instruction(insp)) = resolve_mnemonic("INSP") else {
            panic!("INSP missing");
        };
        assert_eq!(insp.opcode, 0xFC00);
        assert_eq!(insp.operand, OperandKind::Byte);

        let Some(Mnemonic::Instruction(push)) = resolve_mnemonic("PUSH") else {
            panic!("PUSH missing");
        };
        assert_eq!(push.operand, OperandKind::None);
    }
}
