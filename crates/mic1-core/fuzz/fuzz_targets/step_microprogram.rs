#![no_main]

use libfuzzer_sys::fuzz_target;
use mic1_core::{
    ControlStore, CoreConfig, Cpu, Microinstruction, OpcodeMap, Register, CONTROL_STORE_SIZE,
};

// Input layout: [sp_hi, sp_lo, n_micro, n_micro * 5 bytes of control words, image words...]
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let sp = u16::from_be_bytes([data[0], data[1]]);
    let micro_count = usize::from(data[2]);
    let micro_bytes = micro_count * 5;
    let Some(micro) = data.get(3..3 + micro_bytes) else {
        return;
    };

    let entries: Vec<(u16, Microinstruction)> = micro
        .chunks_exact(5)
        .enumerate()
        .map(|(addr, chunk)| {
            let mut word = [0_u8; 8];
            word[3..].copy_from_slice(chunk);
            let addr = u16::try_from(addr % CONTROL_STORE_SIZE).unwrap_or(0);
            (addr, Microinstruction::decode(u64::from_be_bytes(word)))
        })
        .collect();
    let store = if entries.is_empty() {
        ControlStore::mac1()
    } else {
        ControlStore::from_entries(&entries).unwrap_or_else(|_| ControlStore::mac1())
    };
    let map = if entries.is_empty() {
        OpcodeMap::mac1()
    } else {
        OpcodeMap::new()
    };

    let image: Vec<u16> = data[3 + micro_bytes..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    let Ok(mut cpu) = Cpu::with_microprogram(CoreConfig::default(), store, map) else {
        return;
    };
    cpu.load_image(&image);
    cpu.registers_mut().set(Register::Sp, sp);
    let run = cpu.run(4_096);
    assert_eq!(run.subcycles, 4_096);
    assert!(cpu.mpc() < 512);
});
