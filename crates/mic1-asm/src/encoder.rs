//! Instruction and directive encoding (pass 2).
//!
//! An instruction word is its canonical opcode ORed with the operand masked to
//! twelve bits. Operands name a label first and fall back to a numeric literal.

use mic1_core::{InstructionEncoding, ADDRESS_OPERAND_MASK};

use crate::errors::AssembleError;
use crate::mnemonic::{resolve_mnemonic, Mnemonic, DATA_DIRECTIVE};
use crate::parser::{parse_literal, Statement};
use crate::symbols::SymbolTable;

/// Resolves an operand token to a word: a label address, else a literal.
///
/// # Errors
///
/// Returns [`AssembleError::InvalidOperand`] when the token is neither.
pub fn resolve_operand(
    operand: &str,
    symbols: &SymbolTable,
    line: usize,
) -> Result<u16, AssembleError> {
    if let Some(symbol) = symbols.get(operand) {
        return Ok(symbol.address);
    }
    parse_literal(operand).ok_or_else(|| AssembleError::InvalidOperand {
        line,
        operand: operand.to_string(),
    })
}

fn encode_instruction(
    encoding: &InstructionEncoding,
    operand: u16,
    line: usize,
) -> u16 {
    let field = operand & ADDRESS_OPERAND_MASK;
    if field != operand || field & !encoding.operand.mask() != 0 {
        tracing::warn!(
            line,
            mnemonic = encoding.mnemonic,
            operand,
            "operand does not fit the instruction's operand field"
        );
    }
    encoding.opcode | field
}

/// Encodes one statement to its machine word.
///
/// # Errors
///
/// Returns [`AssembleError::UnknownMnemonic`] for an unrecognised mnemonic,
/// [`AssembleError::MissingOperand`] for `.DATA` without a value and
/// [`AssembleError::InvalidOperand`] for an unresolvable operand.
pub fn encode_statement(
    statement: &Statement,
    symbols: &SymbolTable,
    line: usize,
) -> Result<u16, AssembleError> {
    let mnemonic =
        resolve_mnemonic(&statement.mnemonic).ok_or_else(|| AssembleError::UnknownMnemonic {
            line,
            mnemonic: statement.mnemonic.clone(),
        })?;
    let operand = statement
        .operand
        .as_deref()
        .map(|text| resolve_operand(text, symbols, line))
        .transpose()?;

    match mnemonic {
        Mnemonic::Data => operand.ok_or_else(|| AssembleError::MissingOperand {
            line,
            directive: DATA_DIRECTIVE.to_string(),
        }),
        Mnemonic::Instruction(encoding) => {
            Ok(encode_instruction(encoding, operand.unwrap_or(0), line))
        }
    }
}
