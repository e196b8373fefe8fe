//! Console for driving a single processor unit outside the simulation.
//!
//! Usage:
//!   kos                          # Start a fresh unit
//!   kos <save.cfg>               # Load a unit from a saved MODULE node
//!   kos -c <kos.cfg> [save.cfg]  # Use a runtime configuration file
//!
//! The unit sits alone on a headless part with unlimited electric charge.

use kos::module::host::{HostPart, PartId, PartRef, StartState};
use kos::module::processor::ProcessorUnit;
use kos::persistence::{parse_document, write_document, ConfigNode, MemoryStore};
use kos::runner::config::RuntimeConfig;
use kos::runner::ds::value::Value;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::rc::Rc;

const MODULE_NODE: &str = "MODULE";
const TICK: f64 = 0.02;

struct ConsolePart;

impl HostPart for ConsolePart {
    fn id(&self) -> PartId {
        1
    }

    fn is_destroyed(&self) -> bool {
        false
    }

    fn vessel(&self) -> Option<Vec<PartRef>> {
        Some(vec![PartRef::new(1)])
    }

    fn delta_time(&self) -> f64 {
        TICK
    }

    fn fixed_delta_time(&self) -> f64 {
        TICK
    }

    fn request_resource(&self, _resource: &str, amount: f64) -> f64 {
        amount
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (config_path, save_path) = match args.as_slice() {
        [] => (None, None),
        [flag] if flag == "-h" || flag == "--help" => {
            print_usage();
            process::exit(0);
        }
        [save] => (None, Some(save.as_str())),
        [flag, config] if flag == "-c" => (Some(config.as_str()), None),
        [flag, config, save] if flag == "-c" => (Some(config.as_str()), Some(save.as_str())),
        _ => {
            print_usage();
            process::exit(1);
        }
    };

    let config = match config_path {
        Some(path) => RuntimeConfig::load(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error reading config '{}': {}", path, e);
            process::exit(1);
        }),
        None => RuntimeConfig::default(),
    };

    let mut unit =
        ProcessorUnit::new(Rc::new(ConsolePart), MemoryStore::new().into_shared()).with_config(config);

    match save_path {
        Some(path) => {
            if let Err(e) = load_unit(&mut unit, path) {
                eprintln!("Error loading '{}': {}", path, e);
                process::exit(1);
            }
        }
        None => {
            if let Err(e) = unit.on_start(StartState::PreLaunch) {
                eprintln!("Error starting unit: {}", e);
                process::exit(1);
            }
        }
    }

    run_console(&mut unit);
}

fn print_usage() {
    eprintln!("kos - processor unit console");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  kos                          Start a fresh unit");
    eprintln!("  kos <save.cfg>               Load a unit from a saved MODULE node");
    eprintln!("  kos -c <kos.cfg> [save.cfg]  Use a runtime configuration file");
}

fn load_unit(unit: &mut ProcessorUnit, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let root = parse_document(&text)?;
    let node = root.get_node(MODULE_NODE).unwrap_or(&root);
    unit.on_load(node)?;
    Ok(())
}

fn save_unit(unit: &ProcessorUnit) -> String {
    let mut root = ConfigNode::new("");
    let module = root.add_node(ConfigNode::new(MODULE_NODE));
    unit.on_save(module);
    write_document(&root)
}

fn print_help() {
    println!("  name                 Print a variable");
    println!("  name = value         Set a variable");
    println!("  .call name [args]    Call a function");
    println!("  .tick [n]            Run n updates (default 1)");
    println!("  .power               Toggle power");
    println!("  .vars                List variables");
    println!("  .volumes             List mounted volumes");
    println!("  .write file text     Write a file to the local volume");
    println!("  .save [path]         Save the unit, to stdout by default");
    println!("  .exit                Quit");
}

fn run_console(unit: &mut ProcessorUnit) {
    println!("kos v{} - unit {}", env!("CARGO_PKG_VERSION"), unit.unit_id());
    println!("Type .help for commands.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == ".exit" || input == ".quit" {
            break;
        }
        if let Err(e) = run_command(unit, input) {
            eprintln!("Error: {}", e);
        }
    }
}

fn run_command(unit: &mut ProcessorUnit, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut words = input.split_whitespace();
    match words.next() {
        Some(".help") => print_help(),
        Some(".tick") => {
            let n = match words.next() {
                Some(n) => n.parse::<u32>()?,
                None => 1,
            };
            for _ in 0..n {
                unit.update();
            }
        }
        Some(".power") => {
            unit.toggle_power();
            if let Some(cpu) = unit.cpu() {
                println!("{}", cpu.mode());
            }
        }
        Some(".vars") => {
            if let Some(cpu) = unit.cpu() {
                let table = cpu.variables();
                for name in table.borrow().names() {
                    println!("{}", name);
                }
            }
        }
        Some(".volumes") => {
            if let Some(cpu) = unit.cpu() {
                for (index, volume) in cpu.mounted_volumes().iter().enumerate() {
                    let volume = volume.borrow();
                    let free = match volume.free_space() {
                        Some(free) => free.to_string(),
                        None => "unbounded".to_string(),
                    };
                    println!("{}: {} ({} files, {} free)", index, volume.label(), volume.file_count(), free);
                }
            }
        }
        Some(".write") => {
            let name = words.next().ok_or("missing file name")?;
            let text = words.collect::<Vec<_>>().join(" ");
            let disk = unit.hard_disk().ok_or("unit has no volume")?;
            disk.borrow_mut().save_file(name, &text)?;
        }
        Some(".save") => {
            let text = save_unit(unit);
            match words.next() {
                Some(path) => fs::write(path, text)?,
                None => print!("{}", text),
            }
        }
        Some(".call") => {
            let name = words.next().ok_or("missing function name")?;
            let args = words.map(Value::parse_literal).collect();
            let cpu = unit.cpu().ok_or("unit is not booted")?;
            println!("{}", cpu.call_function(name, args)?);
        }
        _ => {
            let cpu = unit.cpu().ok_or("unit is not booted")?;
            match input.find('=') {
                Some(at) => cpu.set_value(input[..at].trim(), Value::parse_literal(&input[at + 1..])),
                None => println!("{}", cpu.get_value(input)?),
            }
        }
    }
    Ok(())
}
