//! Assembled programs executed on the simulator.

use mic1_asm::{assemble_source, AssembleError};
use mic1_core::{Cpu, Register};
use proptest as _;
use tempfile as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

const STRESS_PROGRAM: &str = "\
# Subtraction, store and conditional branch.
        JUMP start
a:      .DATA 5
b:      .DATA 15
res:    .DATA 0
status: .DATA 0
one:    .DATA 1

start:  LODD a          # AC := 5
        SUBD b          # AC := 5 - 15
        STOD res
        JNEG ok
        JUMP done
ok:     LODD one
        STOD status
done:   JUMP done
";

fn run_source(source: &str, subcycles: u64) -> Cpu {
    let program = assemble_source(source).expect("program assembles");
    let mut cpu = Cpu::default();
    cpu.load_image(&program.words);
    cpu.run(subcycles);
    cpu
}

#[test]
fn stress_program_stores_negative_result_and_success_flag() {
    let program = assemble_source(STRESS_PROGRAM).expect("program assembles");
    assert_eq!(program.symbols["res"].address, 3);
    assert_eq!(program.symbols["status"].address, 4);

    let cpu = run_source(STRESS_PROGRAM, 1000);
    assert_eq!(cpu.read_word(3), 0xFFF6);
    assert_eq!(cpu.read_word(4), 1);
    assert_eq!(cpu.diagnostics().fault_count(), 0);
    // spinning on `done: JUMP done`; PC may already be incremented mid-fetch
    assert!(matches!(cpu.register(Register::Pc), 13 | 14));
}

#[test]
fn subroutine_call_through_labels() {
    let source = "\
        LOCO 0x300
        SWAP            # SP := 0x300
        LOCO 20
        CALL double
        STOD out
end:    JUMP end
double: PUSH
        ADDL 0          # AC := AC + m[SP]
        INSP 1
        RETN
out:    .DATA 0
";
    let program = assemble_source(source).expect("program assembles");
    let out = program.symbols["out"].address;

    let cpu = run_source(source, 2000);
    assert_eq!(cpu.read_word(out), 40);
    assert_eq!(cpu.register(Register::Sp), 0x300);
}

#[test]
fn unknown_mnemonic_reports_its_line() {
    let err = assemble_source("LOCO 1\n\n  HALT\n").expect_err("HALT is not MAC-1");
    assert!(matches!(
        err,
        AssembleError::UnknownMnemonic { line: 3, ref mnemonic } if mnemonic == "HALT"
    ));
}

#[test]
fn undefined_label_is_an_invalid_operand() {
    let err = assemble_source("JUMP nowhere\n").expect_err("undefined label");
    assert!(matches!(err, AssembleError::InvalidOperand { line: 1, .. }));
}
