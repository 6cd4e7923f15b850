use thiserror::Error;

/// Fault classes used for diagnostics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// The microsequencer fetched from an empty control-store slot.
    ControlStore,
    /// Opcode dispatch found no micro-routine for the instruction register.
    Dispatch,
}

/// Recoverable faults raised by the microsequencer.
///
/// Neither fault stops the engine: an empty control-store slot executes as a
/// datapath no-op, and an unmapped opcode sends the sequencer back to the
/// fetch entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u8)]
pub enum FaultCode {
    /// `MPC` addressed a control-store slot with no microinstruction.
    #[error("control store address is not populated")]
    UnpopulatedControlStore = 0x01,
    /// The `IR` opcode has no entry in the opcode map.
    #[error("instruction opcode has no micro-routine")]
    UnmappedOpcode = 0x02,
}

impl FaultCode {
    /// Converts a fault code to its stable numeric value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable numeric value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnpopulatedControlStore),
            0x02 => Some(Self::UnmappedOpcode),
            _ => None,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnpopulatedControlStore => FaultClass::ControlStore,
            Self::UnmappedOpcode => FaultClass::Dispatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultClass, FaultCode};

    #[test]
    fn stable_code_roundtrip_is_bijective_for_defined_values() {
        for code in 0x01u8..=0x02 {
            let fault = FaultCode::from_u8(code).expect("defined fault code");
            assert_eq!(fault.as_u8(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(FaultCode::from_u8(0x00).is_none());
        assert!(FaultCode::from_u8(0xFF).is_none());
    }

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(
            FaultCode::UnpopulatedControlStore.class(),
            FaultClass::ControlStore
        );
        assert_eq!(FaultCode::UnmappedOpcode.class(), FaultClass::Dispatch);
    }

    #[test]
    fn display_messages_are_lowercase_and_stable() {
        assert_eq!(
            FaultCode::UnmappedOpcode.to_string(),
            "instruction opcode has no micro-routine"
        );
    }
}
