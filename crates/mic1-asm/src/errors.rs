//! Structured error reporting for assembler phases.
//!
//! Every source-level error carries the 1-based line it was found on and
//! formats as `line N: message`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole assembly run. No partial output is produced.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The mnemonic is neither a MAC-1 instruction nor a directive.
    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic {
        /// Source line.
        line: usize,
        /// Mnemonic as written.
        mnemonic: String,
    },
    /// The operand is neither a defined label nor a number in range.
    #[error("line {line}: invalid operand '{operand}'")]
    InvalidOperand {
        /// Source line.
        line: usize,
        /// Operand as written.
        operand: String,
    },
    /// A directive that needs a value was given none.
    #[error("line {line}: {directive} requires an operand")]
    MissingOperand {
        /// Source line.
        line: usize,
        /// Directive name.
        directive: String,
    },
    /// A label was defined twice.
    #[error("line {line}: duplicate label '{name}' (first defined at line {first_definition})")]
    DuplicateLabel {
        /// Line of the second definition.
        line: usize,
        /// Label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// A label name is empty or contains whitespace.
    #[error("line {line}: invalid label '{name}'")]
    InvalidLabel {
        /// Source line.
        line: usize,
        /// Label as written.
        name: String,
    },
    /// The program does not fit in the 16-bit address space.
    #[error("line {line}: program exceeds the 16-bit address space")]
    AddressOverflow {
        /// Line of the first word that does not fit.
        line: usize,
    },
    /// The source file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl AssembleError {
    /// Source line of the error; `None` for I/O failures.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownMnemonic { line, .. }
            | Self::InvalidOperand { line, .. }
            | Self::MissingOperand { line, .. }
            | Self::DuplicateLabel { line, .. }
            | Self::InvalidLabel { line, .. }
            | Self::AddressOverflow { line } => Some(*line),
            Self::Io { .. } => None,
        }
    }
}
