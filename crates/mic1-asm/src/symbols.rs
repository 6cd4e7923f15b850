//! Symbol table and pass-1 address assignment.
//!
//! Every statement, instruction or `.DATA`, occupies exactly one word, so a
//! label's address is the count of statements before it.

use std::collections::HashMap;

use crate::errors::AssembleError;
use crate::parser::ParsedLine;

/// Number of addressable words in the MAC-1 address space.
pub const ADDRESS_SPACE_WORDS: u32 = 0x1_0000;

/// A label with its assigned address and definition location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Word address the label names.
    pub address: u16,
    /// Source line where the label was defined.
    pub defined_at: usize,
}

/// Label name to definition. Names are case-sensitive.
pub type SymbolTable = HashMap<String, Symbol>;

/// Result of pass 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Every defined label.
    pub symbols: SymbolTable,
    /// Address one past the last emitted word.
    pub end_address: u32,
}

/// Assigns an address to every statement and collects label definitions.
///
/// # Errors
///
/// Returns [`AssembleError::DuplicateLabel`] when a label is defined twice and
/// [`AssembleError::AddressOverflow`] when the program needs more than
/// 65536 words.
pub fn assign_addresses(lines: &[ParsedLine]) -> Result<Assignment, AssembleError> {
    let mut symbols = SymbolTable::new();
    let mut address: u32 = 0;

    for parsed in lines {
        for name in &parsed.labels {
            let Ok(word_address) = u16::try_from(address) else {
                return Err(AssembleError::AddressOverflow { line: parsed.line });
            };
            if let Some(existing) = symbols.get(name) {
                return Err(AssembleError::DuplicateLabel {
                    line: parsed.line,
                    name: name.clone(),
                    first_definition: existing.defined_at,
                });
            }
            symbols.insert(
                name.clone(),
                Symbol {
                    address: word_address,
                    defined_at: parsed.line,
                },
            );
        }

        if parsed.statement.is_some() {
            if address >= ADDRESS_SPACE_WORDS {
                return Err(AssembleError::AddressOverflow { line: parsed.line });
            }
            address += 1;
        }
    }

    Ok(Assignment {
        symbols,
        end_address: address,
    })
}
