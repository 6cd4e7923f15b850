/// Number of addressable register slots on the A/B/C buses.
pub const REGISTER_COUNT: usize = 16;
/// Mask applied to every value stored in a register.
pub const WORD_MASK: u16 = 0xFFFF;
/// Address mask constant held in `AMASK`.
pub const AMASK_VALUE: u16 = 0x0FFF;
/// Stack-offset mask constant held in `SMASK`.
pub const SMASK_VALUE: u16 = 0x00FF;

/// Fixed register roles, indexed by their 4-bit bus selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Register {
    /// Unused selector; reads as zero and ignores writes.
    #[default]
    None = 0,
    /// Program counter.
    Pc = 1,
    /// Instruction register.
    Ir = 2,
    /// Stack pointer.
    Sp = 3,
    /// Accumulator.
    Ac = 4,
    /// Memory address register.
    Mar = 5,
    /// Memory buffer register.
    Mbr = 6,
    /// Temporary instruction register.
    Tir = 7,
    /// Constant `0`.
    Zero = 8,
    /// Constant `+1`.
    PlusOne = 9,
    /// Constant `-1` (`0xFFFF`).
    MinusOne = 10,
    /// Constant address mask `0x0FFF`.
    AMask = 11,
    /// Constant byte mask `0x00FF`.
    SMask = 12,
    /// Scratch register A.
    A = 13,
    /// Scratch register B.
    B = 14,
    /// Scratch register C.
    C = 15,
}

impl Register {
    /// All register roles in selector order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::None,
        Self::Pc,
        Self::Ir,
        Self::Sp,
        Self::Ac,
        Self::Mar,
        Self::Mbr,
        Self::Tir,
        Self::Zero,
        Self::PlusOne,
        Self::MinusOne,
        Self::AMask,
        Self::SMask,
        Self::A,
        Self::B,
        Self::C,
    ];

    /// Returns the bus selector for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Decodes a bus selector; `None` for anything outside `0..=15`.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Decodes the low four bits of a field into a register.
    #[must_use]
    pub const fn from_u4(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }

    /// Conventional register name used in listings and dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Pc => "PC",
            Self::Ir => "IR",
            Self::Sp => "SP",
            Self::Ac => "AC",
            Self::Mar => "MAR",
            Self::Mbr => "MBR",
            Self::Tir => "TIR",
            Self::Zero => "0",
            Self::PlusOne => "+1",
            Self::MinusOne => "-1",
            Self::AMask => "AMASK",
            Self::SMask => "SMASK",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    /// Power-on value and writability of this slot.
    const fn initial_slot(self) -> RegisterSlot {
        match self {
            Self::None | Self::Zero => RegisterSlot::constant(0),
            Self::PlusOne => RegisterSlot::constant(1),
            Self::MinusOne => RegisterSlot::constant(WORD_MASK),
            Self::AMask => RegisterSlot::constant(AMASK_VALUE),
            Self::SMask => RegisterSlot::constant(SMASK_VALUE),
            _ => RegisterSlot::mutable(),
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegisterSlot {
    value: u16,
    writable: bool,
}

impl RegisterSlot {
    const fn constant(value: u16) -> Self {
        Self {
            value,
            writable: false,
        }
    }

    const fn mutable() -> Self {
        Self {
            value: 0,
            writable: true,
        }
    }
}

/// The sixteen-slot datapath register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    slots: [RegisterSlot; REGISTER_COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut slots = [RegisterSlot::mutable(); REGISTER_COUNT];
        let mut index = 0;
        while index < REGISTER_COUNT {
            slots[index] = Register::ALL[index].initial_slot();
            index += 1;
        }
        Self { slots }
    }
}

impl RegisterFile {
    /// Reads a slot by bus selector; unmapped selectors read as zero.
    #[must_use]
    pub fn read(&self, index: u8) -> u16 {
        self.slots
            .get(usize::from(index))
            .map_or(0, |slot| slot.value)
    }

    /// Writes a slot by bus selector.
    ///
    /// Writes to read-only slots and to unmapped selectors are dropped.
    pub fn write(&mut self, index: u8, value: u16) {
        if let Some(slot) = self.slots.get_mut(usize::from(index)) {
            if slot.writable {
                slot.value = value & WORD_MASK;
            }
        }
    }

    /// Reads a register by role.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u16 {
        self.slots[reg as usize].value
    }

    /// Writes a register by role, honouring read-only slots.
    pub fn set(&mut self, reg: Register, value: u16) {
        self.write(reg.index(), value);
    }

    /// Reads a register as a two's-complement signed value.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn get_signed(&self, reg: Register) -> i16 {
        self.get(reg) as i16
    }

    /// Returns `true` when writes to this register take effect.
    #[must_use]
    pub const fn is_writable(&self, reg: Register) -> bool {
        self.slots[reg as usize].writable
    }

    /// Iterates over every register role with its current value.
    pub fn iter(&self) -> impl Iterator<Item = (Register, u16)> + '_ {
        Register::ALL.iter().map(|reg| (*reg, self.get(*reg)))
    }
}
