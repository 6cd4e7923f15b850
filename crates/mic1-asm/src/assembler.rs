//! Top-level assembler pipeline.
//!
//! 1. **Parse**: comments stripped, labels split off each line.
//! 2. **Pass 1**: addresses assigned, symbol table built.
//! 3. **Pass 2**: every statement encoded to one word.
//!
//! Any error aborts the whole run; no partial program is returned.

use std::fs;
use std::path::Path;

use mic1_core::{disassemble_range, DisassemblyRow};

use crate::encoder::encode_statement;
use crate::errors::AssembleError;
use crate::parser::parse_source;
use crate::symbols::{assign_addresses, SymbolTable};

/// An assembled program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Machine words in address order, starting at 0.
    pub words: Vec<u16>,
    /// Label definitions.
    pub symbols: SymbolTable,
    /// Source line of each word.
    pub source_lines: Vec<usize>,
}

impl Program {
    /// Number of words in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when the source produced no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Image as big-endian bytes, two per word.
    #[must_use]
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_be_bytes()).collect()
    }

    /// Labels defined at `addr`, sorted by name.
    #[must_use]
    pub fn labels_at(&self, addr: u16) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .symbols
            .iter()
            .filter(|(_, symbol)| symbol.address == addr)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Disassembly of every word in the image.
    #[must_use]
    pub fn listing(&self) -> Vec<DisassemblyRow> {
        disassemble_range(&self.words, 0, self.words.len())
    }
}

/// Assembles source text.
///
/// # Errors
///
/// Returns the first [`AssembleError`] found in any pass.
pub fn assemble_source(source: &str) -> Result<Program, AssembleError> {
    let lines = parse_source(source)?;
    let assignment = assign_addresses(&lines)?;

    let mut words = Vec::with_capacity(lines.len());
    let mut source_lines = Vec::with_capacity(lines.len());
    for parsed in &lines {
        if let Some(statement) = &parsed.statement {
            words.push(encode_statement(statement, &assignment.symbols, parsed.line)?);
            source_lines.push(parsed.line);
        }
    }

    tracing::debug!(
        words = words.len(),
        labels = assignment.symbols.len(),
        "assembled program"
    );

    Ok(Program {
        words,
        symbols: assignment.symbols,
        source_lines,
    })
}

/// Reads and assembles a source file.
///
/// # Errors
///
/// Returns [`AssembleError::Io`] when the file cannot be read, otherwise as
/// [`assemble_source`].
pub fn assemble_file(path: &Path) -> Result<Program, AssembleError> {
    let source = fs::read_to_string(path).map_err(|source| AssembleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "assembling");
    assemble_source(&source)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use proptest::prelude::*;

    use super::{assemble_file, assemble_source, Program};
    use crate::errors::AssembleError;

    fn listing_text(program: &Program) -> String {
        program
            .listing()
            .iter()
            .map(|row| format!("{row}\n"))
            .collect()
    }

    fn data_source(words: &[u16]) -> String {
        words.iter().map(|word| format!(".DATA {word:#06X}\n")).collect()
    }

    #[test]
    fn forward_label_resolves_to_its_address() {
        let program = assemble_source("JUMP end\nLOCO 1\nend: LOCO 2\n").expect("assembles");
        assert_eq!(program.words, [0x6002, 0x7001, 0x7002]);
        assert_eq!(program.source_lines, [1, 2, 3]);
    }

    #[test]
    fn unknown_mnemonic_fails_the_whole_run() {
        let err = assemble_source("LOCO 1\nFOO 1\nLOCO 2\n").expect_err("unknown");
        assert!(matches!(err, AssembleError::UnknownMnemonic { line: 2, .. }));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn duplicate_label_fails() {
        let err = assemble_source("x: PUSH\nx: POP\n").expect_err("duplicate");
        assert!(matches!(err, AssembleError::DuplicateLabel { line: 2, .. }));
    }

    #[test]
    fn negative_data_is_twos_complement() {
        let program = assemble_source("n: .DATA -10\n").expect("assembles");
        assert_eq!(program.words, [0xFFF6]);
    }

    #[test]
    fn empty_source_produces_an_empty_program() {
        let program = assemble_source("# nothing here\n\n").expect("assembles");
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert!(program.to_be_bytes().is_empty());
    }

    #[test]
    fn bytes_are_big_endian() {
        let program = assemble_source("LODD 0x123\n.DATA 0xABCD\n").expect("assembles");
        assert_eq!(program.to_be_bytes(), [0x01, 0x23, 0xAB, 0xCD]);
    }

    #[test]
    fn listing_disassembles_each_word() {
        let program = assemble_source("start: LODD 4\nPUSH\n.DATA 0xFF00\n").expect("assembles");
        let rendered: Vec<String> = program.listing().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["LODD 4", "PUSH", ".DATA 0xFF00"]);
        assert_eq!(program.labels_at(0), ["start"]);
        assert!(program.labels_at(1).is_empty());
    }

    #[test]
    fn listing_reassembles_to_the_same_image() {
        let program = assemble_source(
            "LODD 4\nADDD 5\nSTOD 6\nINSP 3\nRETN\n.DATA 0xFF00\n.DATA 7\n",
        )
        .expect("assembles");
        let again = assemble_source(&listing_text(&program)).expect("reassembles");
        assert_eq!(again.words, program.words);
    }

    #[test]
    fn stray_bits_below_operandless_opcodes_survive_the_listing() {
        let program = assemble_source(".DATA 0xF00A\n.DATA 0xF4FF\n").expect("assembles");
        assert_eq!(listing_text(&program), ".DATA 0xF00A\n.DATA 0xF4FF\n");

        let again = assemble_source(&listing_text(&program)).expect("reassembles");
        assert_eq!(again.words, [0xF00A, 0xF4FF]);
    }

    proptest! {
        #[test]
        fn any_image_survives_a_listing_round_trip(
            words in proptest::collection::vec(any::<u16>(), 0..64),
        ) {
            let program = assemble_source(&data_source(&words)).expect("data assembles");
            prop_assert_eq!(&program.words, &words);

            let again = assemble_source(&listing_text(&program)).expect("listing reassembles");
            prop_assert_eq!(again.words, words);
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = assemble_file(Path::new("definitely/not/here.asm")).expect_err("missing");
        assert!(matches!(err, AssembleError::Io { .. }));
        assert_eq!(err.line(), None);
    }
}
