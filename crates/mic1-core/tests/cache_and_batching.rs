//! Cache behaviour observed through the engine, and step-batching invariance.

use mic1_core::{CacheAccess, CoreConfig, Cpu, Register, TraceEvent};
use proptest::prelude::*;
use rstest as _;
use thiserror as _;
use tracing as _;

fn cpu_with(image: &[u16]) -> Cpu {
    let mut cpu = Cpu::default();
    cpu.load_image(image);
    cpu
}

#[test]
fn sequential_fetches_hit_after_the_first_word_of_each_block() {
    // Eight LOCO instructions span two 4-word blocks.
    let mut cpu = cpu_with(&[0x7001; 8]);
    for _ in 0..8 {
        cpu.step_instruction();
    }
    let diag = cpu.diagnostics();
    assert_eq!(diag.cache_read_misses, 2);
    assert_eq!(diag.cache_read_hits, 6);
    assert_eq!(diag.cache_hit_ratio(), Some(0.75));
}

#[test]
fn store_to_a_resident_block_is_a_write_hit() {
    // STOD 1 writes into the block the fetch just brought in.
    let mut cpu = cpu_with(&[0x1001, 0x7000]);
    cpu.step_instruction();
    assert_eq!(cpu.last_cache_access(), CacheAccess::WriteHit);
    assert_eq!(cpu.memory().read(1), 0);
    assert_eq!(cpu.read_word(1), 0);
    assert_eq!(cpu.diagnostics().cache_write_hits, 1);
}

#[test]
fn store_to_a_cold_block_is_a_write_miss_without_allocation() {
    // LOCO 7; STOD 100; LODD 100
    let mut cpu = cpu_with(&[0x7007, 0x1064, 0x0064]);
    cpu.step_instruction();
    cpu.step_instruction();
    assert_eq!(cpu.last_cache_access(), CacheAccess::WriteMiss);
    assert!(!cpu.cache().is_resident(100));
    assert_eq!(cpu.memory().read(100), 7);

    cpu.step_instruction();
    assert_eq!(cpu.register(Register::Ac), 7);
    assert_eq!(cpu.diagnostics().cache_read_misses, 2);
}

#[test]
fn conflicting_blocks_evict_each_other() {
    // LODD 0x40 maps to the same line as the program block at 0.
    let mut image = vec![0; 0x41];
    image[0] = 0x0040;
    image[1] = 0x0040;
    image[0x40] = 0x0AAA;
    let mut cpu = cpu_with(&image);

    cpu.step_instruction();
    cpu.step_instruction();
    assert_eq!(cpu.register(Register::Ac), 0x0AAA);
    // fetch 0 miss, operand miss (evicts), fetch 1 miss (evicts), operand miss
    assert_eq!(cpu.diagnostics().cache_read_misses, 4);
    assert_eq!(cpu.diagnostics().cache_read_hits, 0);
}

#[test]
fn trace_reports_cache_outcomes() {
    let mut cpu = cpu_with(&[0x7001, 0x7002]);
    let mut events: Vec<TraceEvent> = Vec::new();
    for _ in 0..24 {
        cpu.step_with_trace(&mut events);
    }
    let accesses: Vec<(u16, CacheAccess)> = events
        .iter()
        .filter_map(|event| match event {
            TraceEvent::CacheAccess { addr, access, .. } => Some((*addr, *access)),
            _ => None,
        })
        .collect();
    assert_eq!(
        accesses,
        [(0, CacheAccess::ReadMiss), (1, CacheAccess::ReadHit)]
    );
}

#[test]
fn custom_geometry_changes_miss_pattern() {
    let config = CoreConfig {
        cache_lines: 2,
        block_size: 1,
        ..CoreConfig::default()
    };
    let mut cpu = Cpu::new(config).expect("valid config");
    cpu.load_image(&[0x7001; 4]);
    for _ in 0..4 {
        cpu.step_instruction();
    }
    assert_eq!(cpu.diagnostics().cache_read_misses, 4);
    assert_eq!(cpu.diagnostics().cache_read_hits, 0);
}

fn snapshot(cpu: &Cpu) -> (Vec<u16>, Vec<u16>, u16, u8, bool, bool, u16, u64) {
    (
        cpu.registers().iter().map(|(_, value)| value).collect(),
        cpu.memory().as_slice().to_vec(),
        cpu.mpc(),
        cpu.subcycle().number(),
        cpu.flags().negative,
        cpu.flags().zero,
        cpu.alu_output(),
        cpu.diagnostics().subcycles,
    )
}

proptest! {
    #[test]
    fn batching_does_not_change_state(
        program in proptest::collection::vec(any::<u16>(), 1..32),
        chunks in proptest::collection::vec(1_u64..40, 1..12),
    ) {
        let total: u64 = chunks.iter().sum();

        let mut whole = cpu_with(&program);
        whole.run(total);

        let mut batched = cpu_with(&program);
        for chunk in &chunks {
            batched.run(*chunk);
        }

        let mut single = cpu_with(&program);
        for _ in 0..total {
            single.step();
        }

        prop_assert_eq!(snapshot(&whole), snapshot(&batched));
        prop_assert_eq!(snapshot(&whole), snapshot(&single));
    }

    #[test]
    fn stepping_arbitrary_images_never_panics(
        program in proptest::collection::vec(any::<u16>(), 0..64),
        sp in any::<u16>(),
    ) {
        let mut cpu = cpu_with(&program);
        cpu.registers_mut().set(Register::Sp, sp);
        let run = cpu.run(2_000);
        prop_assert_eq!(run.subcycles, 2_000);
        prop_assert_eq!(cpu.diagnostics().subcycles, 2_000);
    }
}
