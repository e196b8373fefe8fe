/// Benchmark runner for the binding core.
///
/// Times CPU boots, name resolution through bound slots, provider ticks and
/// persisted-node round trips.

extern crate kos;

use kos::persistence::{parse_document, write_document, ConfigNode};
use kos::runner::binding::registry::ProviderRegistry;
use kos::runner::config::RuntimeConfig;
use kos::runner::cpu::Cpu;
use kos::runner::ds::value::Value;
use kos::runner::ds::volume::Volume;
use std::time::{Duration, Instant};

type Bench = fn(u32) -> Duration;

fn booted_cpu(registry: &ProviderRegistry) -> Cpu {
    let mut cpu = Cpu::new(1, &RuntimeConfig::default());
    cpu.attach_hard_disk(Volume::harddisk(100_000).into_shared());
    cpu.boot(registry);
    cpu
}

fn time<F: FnMut()>(iterations: u32, mut f: F) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed()
}

// ============================================================================
// Benchmark definitions
// ============================================================================

fn bench_boot(iterations: u32) -> Duration {
    let registry = ProviderRegistry::with_builtins();
    time(iterations, || {
        booted_cpu(&registry);
    })
}

fn bench_bound_reads(iterations: u32) -> Duration {
    let cpu = booted_cpu(&ProviderRegistry::with_builtins());
    time(iterations, || {
        let _ = cpu.get_value("ship:control:mainthrottle");
        let _ = cpu.get_value("config:ipu");
        let _ = cpu.get_value("core:unitid");
    })
}

fn bench_bound_writes(iterations: u32) -> Duration {
    let cpu = booted_cpu(&ProviderRegistry::with_builtins());
    let mut n = 0.0;
    time(iterations, || {
        n += 0.001;
        cpu.set_value("THROTTLE", Value::Number(n % 1.0));
    })
}

fn bench_plain_variables(iterations: u32) -> Duration {
    let cpu = booted_cpu(&ProviderRegistry::new());
    let mut i = 0u32;
    time(iterations, || {
        i += 1;
        cpu.set_value(&format!("var{}", i % 64), Value::Number(i as f64));
    })
}

fn bench_ticks(iterations: u32) -> Duration {
    let mut cpu = booted_cpu(&ProviderRegistry::with_builtins());
    cpu.set_value("throttle", Value::Number(1.0));
    time(iterations, || cpu.update(0.02))
}

fn sample_document() -> String {
    let mut disk = Volume::harddisk(100_000);
    for i in 0..50 {
        let body = format!("// program {}\nprint \"step {}\".\n\twait 0.5.\n", i, i);
        let _ = disk.save_file(&format!("prog{}.ks", i), &body);
    }
    let mut root = ConfigNode::new("");
    root.add_node(ConfigNode::new("MODULE")).add_node(disk.save("harddisk"));
    write_document(&root)
}

fn bench_persist(iterations: u32) -> Duration {
    let text = sample_document();
    time(iterations, || {
        if let Ok(root) = parse_document(&text) {
            let _ = write_document(&root);
        }
    })
}

fn main() {
    println!("=======================================================");
    println!("  kos Binding Core - Performance Benchmarks");
    println!("=======================================================\n");

    let benchmarks: Vec<(&str, Bench, u32)> = vec![
        ("Boot (builtins)", bench_boot as Bench, 10_000),
        ("Bound reads (x3)", bench_bound_reads as Bench, 100_000),
        ("Bound writes", bench_bound_writes as Bench, 100_000),
        ("Plain variables", bench_plain_variables as Bench, 100_000),
        ("Provider ticks", bench_ticks as Bench, 100_000),
        ("Persist round trip (50 files)", bench_persist as Bench, 500),
    ];

    println!("{:<32} {:>12} {:>12} {:>14}", "Benchmark", "Iterations", "Total", "Per iteration");
    println!("{}", "-".repeat(74));

    let mut total = Duration::ZERO;
    for (name, bench, iterations) in &benchmarks {
        let elapsed = bench(*iterations);
        total += elapsed;
        println!(
            "{:<32} {:>12} {:>12.2?} {:>14.2?}",
            name,
            iterations,
            elapsed,
            elapsed / *iterations
        );
    }

    println!("{}", "-".repeat(74));
    println!("{:<32} {:>12} {:>12.2?}", "TOTAL", "", total);

    // Verify correctness
    println!("\n=======================================================");
    println!("  Correctness Verification");
    println!("=======================================================\n");

    let mut cpu = booted_cpu(&ProviderRegistry::with_builtins());
    cpu.set_value("throttle", Value::Number(1.0));
    for _ in 0..50 {
        cpu.update(0.02);
    }
    let main_throttle = cpu.get_value("ship:control:mainthrottle");
    let status = if main_throttle.as_ref().ok() == Some(&Value::Number(1.0)) { "✓" } else { "✗" };
    println!("{:<32} {:>4} {:?}", "Throttle ramp", status, main_throttle);

    let text = sample_document();
    let reparsed = parse_document(&text).map(|root| write_document(&root));
    let status = if reparsed.as_ref().ok() == Some(&text) { "✓" } else { "✗" };
    println!("{:<32} {:>4} {} bytes", "Persisted text is stable", status, text.len());
}
