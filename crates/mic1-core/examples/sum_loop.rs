//! Runs a counting loop on the built-in microprogram and prints the machine
//! statistics, with and without the cache.

use mic1_core::{bits, Cpu, Instruction, Register, TraceEvent};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use tempfile as _;
use thiserror as _;
use tracing as _;

use Instruction::{Addd, Halt, Jump, Jzer, Lodd, Stod, Subd};

const COUNTER: u16 = 100;
const TOTAL: u16 = 101;
const ONE: u16 = 102;

fn image(limit: u16) -> Vec<u16> {
    let program = [
        Lodd(COUNTER),
        Jzer(8),
        Addd(TOTAL),
        Stod(TOTAL),
        Lodd(COUNTER),
        Subd(ONE),
        Stod(COUNTER),
        Jump(0),
        Lodd(TOTAL),
        Halt,
    ];
    let mut words = vec![0; usize::from(ONE) + 1];
    for (slot, instruction) in words.iter_mut().zip(program) {
        *slot = instruction.encode();
    }
    words[usize::from(COUNTER)] = limit;
    words[usize::from(ONE)] = 1;
    words
}

fn report(label: &str, cache_enabled: bool) {
    let mut cpu = Cpu::with_mac1();
    cpu.set_cache_enabled(cache_enabled);
    if let Err(err) = cpu.load_program_words(&image(10)) {
        eprintln!("{label}: {err}");
        return;
    }

    let mut events: Vec<TraceEvent> = Vec::new();
    let outcome = cpu.run_traced(cpu.config().cycle_budget, &mut events);
    let reads = events
        .iter()
        .filter(|event| matches!(event, TraceEvent::MemoryRead { .. }))
        .count();

    println!(
        "{label}: ac={} cycles={} instructions={} reads={reads} halt={:?}",
        bits::word_to_int(cpu.register(Register::Ac)),
        outcome.cycles,
        outcome.instructions,
        outcome.reason,
    );
    if cache_enabled {
        let stats = cpu.cache().stats();
        println!(
            "{label}: hits={} misses={} hit_rate={:.3}",
            stats.hits,
            stats.misses,
            stats.hit_rate()
        );
    }
}

fn main() {
    report("cached", true);
    report("uncached", false);
}
