//! Deterministic execution fingerprint used for cross-host comparison.

use mic1_core::{Cpu, Register};
use proptest as _;
use rstest as _;
use thiserror as _;
use tracing as _;

/// Sums 1..=10 with a countdown loop, exercising stack, jumps and the cache.
const PROGRAM: &[u16] = &[
    0x7000, // 0: LOCO 0
    0x1014, // 1: STOD 20      sum := 0
    0x0015, // 2: LODD 21      AC := n
    0x500A, // 3: JZER 10
    0xF400, // 4: PUSH
    0x2014, // 5: ADDD 20
    0x1014, // 6: STOD 20      sum := sum + n
    0xF600, // 7: POP
    0x3016, // 8: SUBD 22
    0x6011, // 9: JUMP 17
    0x600A, // 10: JUMP 10      done
    0, 0, 0, 0, 0, 0,
    0x1015, // 17: STOD 21
    0x6002, // 18: JUMP 2
    0,
    0,  // 20: sum
    10, // 21: n
    1,  // 22: one
];

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut cpu = Cpu::default();
    cpu.load_image(PROGRAM);
    cpu.registers_mut().set(Register::Sp, 0x0F00);
    let run = cpu.run(4_000);

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &run.subcycles.to_le_bytes());
    hash_bytes(&mut hash, &run.faults.to_le_bytes());
    for (_, value) in cpu.registers().iter() {
        hash_bytes(&mut hash, &value.to_le_bytes());
    }
    hash_bytes(&mut hash, &cpu.mpc().to_le_bytes());
    hash_bytes(&mut hash, &[cpu.subcycle().number()]);
    hash_bytes(
        &mut hash,
        &[u8::from(cpu.flags().negative), u8::from(cpu.flags().zero)],
    );
    let diag = cpu.diagnostics();
    for counter in [
        diag.instructions,
        diag.cache_read_hits,
        diag.cache_read_misses,
        diag.cache_write_hits,
        diag.cache_write_misses,
    ] {
        hash_bytes(&mut hash, &counter.to_le_bytes());
    }
    for word in cpu.memory().as_slice() {
        hash_bytes(&mut hash, &word.to_le_bytes());
    }

    format!("{hash:016x} sum={}", cpu.memory().read(20))
}

fn main() {
    println!("{}", fingerprint());
}
