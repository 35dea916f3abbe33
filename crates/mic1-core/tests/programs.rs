//! Mac-1 programs executed end to end on the built-in microprogram.

use mic1_core::{Cpu, HaltReason, Instruction, Register, RunOutcome};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use tempfile as _;
use thiserror as _;
use tracing as _;

use Instruction::{
    Addd, Addl, Call, Desp, Halt, Insp, Jneg, Jnze, Jpos, Jump, Jzer, Lodd, Lodl, Loco, Pop, Popi,
    Pshi, Push, Retn, Stod, Stol, Subd, Subl, Swap,
};

const BUDGET: u64 = 10_000;

fn image(program: &[Instruction], data: &[(u16, u16)]) -> Vec<u16> {
    let mut words: Vec<u16> = program.iter().map(|i| i.encode()).collect();
    for &(addr, value) in data {
        let index = usize::from(addr);
        if words.len() <= index {
            words.resize(index + 1, 0);
        }
        words[index] = value;
    }
    words
}

fn run(program: &[Instruction], data: &[(u16, u16)]) -> (Cpu, RunOutcome) {
    let mut cpu = Cpu::with_mac1();
    cpu.load_program_words(&image(program, data))
        .expect("program fits in memory");
    let outcome = cpu.run(BUDGET);
    (cpu, outcome)
}

fn ac(cpu: &Cpu) -> i16 {
    mic1_core::bits::word_to_int(cpu.register(Register::Ac))
}

#[test]
fn loco_then_halt_leaves_the_constant_in_ac() {
    let (cpu, outcome) = run(&[Loco(5), Halt], &[]);
    assert_eq!(ac(&cpu), 5);
    assert_eq!(outcome.reason, HaltReason::HaltInstruction);
    assert_eq!(outcome.instructions, 2);
    assert_eq!(outcome.cycles, 14);
    assert_eq!(cpu.register(Register::Pc), 1);
    assert_eq!(cpu.last_fault(), None);
}

#[test]
fn jump_to_self_stops_the_run() {
    let (cpu, outcome) = run(&[Loco(5), Jump(1)], &[]);
    assert_eq!(outcome.reason, HaltReason::SelfJump);
    assert_eq!(outcome.cycles, 8);
    assert_eq!(cpu.register(Register::Pc), 1);
    assert_eq!(ac(&cpu), 5);
}

#[test]
fn addd_adds_a_memory_operand() {
    let (cpu, outcome) = run(&[Loco(3), Addd(100), Halt], &[(100, 7)]);
    assert_eq!(outcome.reason, HaltReason::HaltInstruction);
    assert_eq!(ac(&cpu), 10);
}

#[test]
fn subd_goes_negative_in_twos_complement() {
    let (cpu, _) = run(&[Loco(3), Subd(100), Halt], &[(100, 7)]);
    assert_eq!(ac(&cpu), -4);
    assert_eq!(cpu.register(Register::Ac), 0xFFFC);
}

#[test]
fn stod_then_lodd_round_trips_through_memory() {
    let (cpu, _) = run(&[Loco(42), Stod(200), Loco(0), Lodd(200), Halt], &[]);
    assert_eq!(ac(&cpu), 42);
    assert_eq!(cpu.read_memory(200), Ok(42));
}

#[test]
fn counting_loop_sums_one_to_five() {
    let program = [
        Lodd(100),
        Jzer(8),
        Addd(101),
        Stod(101),
        Lodd(100),
        Subd(102),
        Stod(100),
        Jump(0),
        Lodd(101),
        Halt,
    ];
    let (cpu, outcome) = run(&program, &[(100, 5), (101, 0), (102, 1)]);
    assert_eq!(ac(&cpu), 15);
    assert_eq!(cpu.read_memory(101), Ok(15));
    assert_eq!(cpu.read_memory(100), Ok(0));
    assert_eq!(outcome.reason, HaltReason::HaltInstruction);
    assert_eq!(outcome.cycles, 220);
    assert_eq!(cpu.register(Register::Pc), 9);
    let stats = cpu.cache().stats();
    assert_eq!((stats.hits, stats.misses), (33, 33));
    assert!((cpu.cache().hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn call_and_return_with_local_addressing() {
    let program = [
        Loco(9),
        Push,
        Call(6),
        Pop,
        Halt,
        Lodd(0),
        Lodl(1),
        Addl(1),
        Stol(1),
        Retn,
    ];
    let (cpu, outcome) = run(&program, &[]);
    assert_eq!(outcome.reason, HaltReason::HaltInstruction);
    assert_eq!(ac(&cpu), 18);
    assert_eq!(cpu.register(Register::Sp), 0x0FFF);
    assert_eq!(cpu.read_memory(4094), Ok(18));
}

#[test]
fn subl_subtracts_a_stack_operand() {
    let (cpu, _) = run(&[Loco(10), Push, Loco(4), Subl(0), Halt], &[]);
    assert_eq!(ac(&cpu), -6);
}

#[test]
fn jneg_branches_on_a_negative_accumulator() {
    let program = [Loco(3), Subd(100), Jneg(4), Halt, Loco(77), Halt];
    let (cpu, _) = run(&program, &[(100, 5)]);
    assert_eq!(ac(&cpu), 77);
}

#[test]
fn conditional_jumps_chain() {
    let program = [
        Loco(3),
        Jpos(3),
        Halt,
        Loco(11),
        Jnze(6),
        Halt,
        Loco(0),
        Jzer(9),
        Halt,
        Loco(99),
        Halt,
    ];
    let (cpu, _) = run(&program, &[]);
    assert_eq!(ac(&cpu), 99);
}

#[rstest]
#[case(Insp(5), 4100)]
#[case(Desp(0x10), 4079)]
fn stack_pointer_adjustment(#[case] adjust: Instruction, #[case] expected_sp: u16) {
    let (cpu, outcome) = run(&[adjust, Swap, Halt], &[]);
    assert_eq!(outcome.reason, HaltReason::HaltInstruction);
    assert_eq!(cpu.register(Register::Ac), expected_sp);
    assert_eq!(cpu.register(Register::Sp), 0);
}

#[test]
fn pshi_pushes_through_the_accumulator_address() {
    let (cpu, _) = run(&[Loco(50), Pshi, Pop, Halt], &[(50, 1234)]);
    assert_eq!(ac(&cpu), 1234);
    assert_eq!(cpu.register(Register::Sp), 0x0FFF);
}

#[test]
fn popi_pops_through_the_accumulator_address() {
    let (cpu, _) = run(&[Loco(321), Push, Loco(60), Popi, Halt], &[]);
    assert_eq!(cpu.read_memory(60), Ok(321));
    assert_eq!(cpu.register(Register::Sp), 0x0FFF);
}

#[test]
fn runaway_program_exhausts_the_budget() {
    let mut cpu = Cpu::with_mac1();
    cpu.load_program_words(&[Jump(1).encode(), Jump(0).encode()])
        .expect("fits");
    let outcome = cpu.run(1_000);
    assert_eq!(outcome.reason, HaltReason::BudgetExhausted);
    assert_eq!(outcome.cycles, 1_000);
    assert_eq!(outcome.instructions, 250);
    assert!(!cpu.is_running());
}
