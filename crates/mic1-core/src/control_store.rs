//! Control store and the built-in MAC-1 microprogram.
//!
//! The store is a fixed array of 512 slots holding encoded control words.
//! Empty slots are legal; fetching one is reported as
//! [`FaultCode::UnpopulatedControlStore`](crate::FaultCode) by the engine.

use thiserror::Error;

use crate::alu::AluOp;
use crate::microinstruction::{
    Condition, Microinstruction, CONTROL_STORE_SIZE, JAM_BIT, NEXT_ADDRESS_MASK,
};
use crate::state::Register::{self, A, AMask, Ac, Ir, MinusOne, Pc, PlusOne, SMask, Sp};

/// Micro-routine entry addresses of the built-in microprogram.
pub mod entry {
    /// Shared instruction fetch sequence.
    pub const FETCH: u16 = 0;
    /// `LODD x`.
    pub const LODD: u16 = 3;
    /// `STOD x`.
    pub const STOD: u16 = 5;
    /// `ADDD x`.
    pub const ADDD: u16 = 7;
    /// `SUBD x`.
    pub const SUBD: u16 = 9;
    /// `JPOS x`.
    pub const JPOS: u16 = 13;
    /// `JZER x`.
    pub const JZER: u16 = 15;
    /// `JUMP x`.
    pub const JUMP: u16 = 17;
    /// `LOCO x`.
    pub const LOCO: u16 = 18;
    /// `LODL x`.
    pub const LODL: u16 = 19;
    /// `STOL x`.
    pub const STOL: u16 = 22;
    /// `ADDL x`.
    pub const ADDL: u16 = 25;
    /// `SUBL x`.
    pub const SUBL: u16 = 28;
    /// `JNEG x`.
    pub const JNEG: u16 = 33;
    /// `JNZE x`.
    pub const JNZE: u16 = 35;
    /// `CALL x`.
    pub const CALL: u16 = 37;
    /// `PSHI`.
    pub const PSHI: u16 = 40;
    /// `POPI`.
    pub const POPI: u16 = 43;
    /// `PUSH`.
    pub const PUSH: u16 = 46;
    /// `POP`.
    pub const POP: u16 = 48;
    /// `RETN`.
    pub const RETN: u16 = 51;
    /// `SWAP`.
    pub const SWAP: u16 = 54;
    /// `INSP y`.
    pub const INSP: u16 = 57;
    /// `DESP y`.
    pub const DESP: u16 = 59;
}

type U = Microinstruction;

/// `reg := IR & AMASK`.
const fn operand_to(next: u16, reg: Register) -> U {
    U::goto(next).a(AMask).b(Ir).alu(AluOp::And).to(reg)
}

/// `MAR := IR & AMASK`.
const fn operand_to_mar(next: u16) -> U {
    U::goto(next).a(AMask).b(Ir).alu(AluOp::And).mar()
}

/// The MAC-1 microprogram as `(address, microinstruction)` pairs.
pub const MAC1_MICROPROGRAM: &[(u16, Microinstruction)] = &[
    // fetch
    (0, U::goto(1).a(Pc).alu(AluOp::PassA).mar().rd()),
    (1, U::goto(2).a(PlusOne).b(Pc).to(Pc)),
    (2, U::goto(0).amux_mbr().alu(AluOp::PassA).to(Ir).cond(Condition::Decode)),
    // LODD: ac := m[x]
    (3, operand_to_mar(4).rd()),
    (4, U::goto(0).amux_mbr().alu(AluOp::PassA).to(Ac)),
    // STOD: m[x] := ac
    (5, operand_to_mar(6)),
    (6, U::goto(0).a(Ac).alu(AluOp::PassA).mbr().wr()),
    // ADDD: ac := ac + m[x]
    (7, operand_to_mar(8).rd()),
    (8, U::goto(0).amux_mbr().b(Ac).to(Ac)),
    // SUBD: ac := ac + (~m[x] + 1)
    (9, operand_to_mar(10).rd()),
    (10, U::goto(11).amux_mbr().alu(AluOp::NotA).to(A)),
    (11, U::goto(12).a(A).b(PlusOne).to(A)),
    (12, U::goto(0).a(A).b(Ac).to(Ac)),
    // JPOS: if ac >= 0 then pc := x
    (13, U::goto(14).a(Ac).alu(AluOp::PassA).cond(Condition::JamN)),
    (14, operand_to(0, Pc)),
    (14 | JAM_BIT, U::goto(0)),
    // JZER: if ac = 0 then pc := x
    (15, U::goto(16).a(Ac).alu(AluOp::PassA).cond(Condition::JamZ)),
    (16, U::goto(0)),
    (16 | JAM_BIT, operand_to(0, Pc)),
    // JUMP
    (17, operand_to(0, Pc)),
    // LOCO: ac := x
    (18, operand_to(0, Ac)),
    // LODL: ac := m[sp + x]
    (19, operand_to(20, A)),
    (20, U::goto(21).a(A).b(Sp).mar().rd()),
    (21, U::goto(0).amux_mbr().alu(AluOp::PassA).to(Ac)),
    // STOL: m[sp + x] := ac
    (22, operand_to(23, A)),
    (23, U::goto(24).a(A).b(Sp).mar()),
    (24, U::goto(0).a(Ac).alu(AluOp::PassA).mbr().wr()),
    // ADDL: ac := ac + m[sp + x]
    (25, operand_to(26, A)),
    (26, U::goto(27).a(A).b(Sp).mar().rd()),
    (27, U::goto(0).amux_mbr().b(Ac).to(Ac)),
    // SUBL: ac := ac - m[sp + x]
    (28, operand_to(29, A)),
    (29, U::goto(30).a(A).b(Sp).mar().rd()),
    (30, U::goto(31).amux_mbr().alu(AluOp::NotA).to(A)),
    (31, U::goto(32).a(A).b(PlusOne).to(A)),
    (32, U::goto(0).a(A).b(Ac).to(Ac)),
    // JNEG: if ac < 0 then pc := x
    (33, U::goto(34).a(Ac).alu(AluOp::PassA).cond(Condition::JamN)),
    (34, U::goto(0)),
    (34 | JAM_BIT, operand_to(0, Pc)),
    // JNZE: if ac != 0 then pc := x
    (35, U::goto(36).a(Ac).alu(AluOp::PassA).cond(Condition::JamZ)),
    (36, operand_to(0, Pc)),
    (36 | JAM_BIT, U::goto(0)),
    // CALL: sp := sp - 1; m[sp] := pc; pc := x
    (37, U::goto(38).a(MinusOne).b(Sp).to(Sp).mar()),
    (38, U::goto(39).a(Pc).alu(AluOp::PassA).mbr().wr()),
    (39, operand_to(0, Pc)),
    // PSHI: sp := sp - 1; m[sp] := m[ac]
    (40, U::goto(41).a(Ac).alu(AluOp::PassA).mar().rd()),
    (41, U::goto(42).a(MinusOne).b(Sp).to(Sp).mar()),
    (42, U::goto(0).wr()),
    // POPI: m[ac] := m[sp]; sp := sp + 1
    (43, U::goto(44).a(Sp).alu(AluOp::PassA).mar().rd()),
    (44, U::goto(45).a(PlusOne).b(Sp).to(Sp)),
    (45, U::goto(0).a(Ac).alu(AluOp::PassA).mar().wr()),
    // PUSH: sp := sp - 1; m[sp] := ac
    (46, U::goto(47).a(MinusOne).b(Sp).to(Sp).mar()),
    (47, U::goto(0).a(Ac).alu(AluOp::PassA).mbr().wr()),
    // POP: ac := m[sp]; sp := sp + 1
    (48, U::goto(49).a(Sp).alu(AluOp::PassA).mar().rd()),
    (49, U::goto(50).a(PlusOne).b(Sp).to(Sp)),
    (50, U::goto(0).amux_mbr().alu(AluOp::PassA).to(Ac)),
    // RETN: pc := m[sp]; sp := sp + 1
    (51, U::goto(52).a(Sp).alu(AluOp::PassA).mar().rd()),
    (52, U::goto(53).a(PlusOne).b(Sp).to(Sp)),
    (53, U::goto(0).amux_mbr().alu(AluOp::PassA).to(Pc)),
    // SWAP: ac :=: sp
    (54, U::goto(55).a(Ac).alu(AluOp::PassA).to(A)),
    (55, U::goto(56).a(Sp).alu(AluOp::PassA).to(Ac)),
    (56, U::goto(0).a(A).alu(AluOp::PassA).to(Sp)),
    // INSP: sp := sp + y
    (57, U::goto(58).a(SMask).b(Ir).alu(AluOp::And).to(A)),
    (58, U::goto(0).a(A).b(Sp).to(Sp)),
    // DESP: sp := sp - y
    (59, U::goto(60).a(SMask).b(Ir).alu(AluOp::And).to(A)),
    (60, U::goto(61).a(A).alu(AluOp::NotA).to(A)),
    (61, U::goto(62).a(A).b(PlusOne).to(A)),
    (62, U::goto(0).a(A).b(Sp).to(Sp)),
];

/// Error returned when authoring a control store from explicit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ControlStoreError {
    /// The slot address does not fit in the 9-bit address space.
    #[error("control store address {0:#05x} is out of range")]
    AddressOutOfRange(u16),
    /// The same slot was authored twice.
    #[error("control store address {0:#05x} is defined more than once")]
    DuplicateAddress(u16),
}

/// Immutable microprogram storage indexed by `MPC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStore {
    slots: Box<[Option<u64>; CONTROL_STORE_SIZE]>,
}

impl Default for ControlStore {
    fn default() -> Self {
        Self::mac1()
    }
}

impl ControlStore {
    /// Returns a store with every slot empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slots: Box::new([None; CONTROL_STORE_SIZE]),
        }
    }

    /// Builds the store holding the MAC-1 microprogram.
    #[must_use]
    pub fn mac1() -> Self {
        let mut store = Self::empty();
        for (addr, uinst) in MAC1_MICROPROGRAM {
            store.slots[usize::from(*addr & NEXT_ADDRESS_MASK)] = Some(uinst.encode());
        }
        store
    }

    /// Builds a store from explicit `(address, microinstruction)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ControlStoreError::AddressOutOfRange`] for an address above
    /// `0x1FF` and [`ControlStoreError::DuplicateAddress`] when an address
    /// appears twice.
    pub fn from_entries(entries: &[(u16, Microinstruction)]) -> Result<Self, ControlStoreError> {
        let mut store = Self::empty();
        for (addr, uinst) in entries {
            let slot = store
                .slots
                .get_mut(usize::from(*addr))
                .ok_or(ControlStoreError::AddressOutOfRange(*addr))?;
            if slot.is_some() {
                return Err(ControlStoreError::DuplicateAddress(*addr));
            }
            *slot = Some(uinst.encode());
        }
        Ok(store)
    }

    /// Returns the encoded control word at `addr`, if populated.
    #[must_use]
    pub fn word(&self, addr: u16) -> Option<u64> {
        self.slots.get(usize::from(addr)).copied().flatten()
    }

    /// Returns the decoded microinstruction at `addr`, if populated.
    #[must_use]
    pub fn get(&self, addr: u16) -> Option<Microinstruction> {
        self.word(addr).map(Microinstruction::decode)
    }

    /// Returns `true` when `addr` holds a microinstruction.
    #[must_use]
    pub fn is_populated(&self, addr: u16) -> bool {
        self.word(addr).is_some()
    }

    /// Number of populated slots.
    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterates over populated slots in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, Microinstruction)> + '_ {
        (0_u16..)
            .zip(self.slots.iter())
            .filter_map(|(addr, slot)| slot.map(|word| (addr, Microinstruction::decode(word))))
    }
}
