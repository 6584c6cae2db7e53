//! Headless console and port listing
//!
//! The REPL drives the same coordinator as the window, which is handy on
//! machines without a display or when checking a new `controls.json`.

use anyhow::{bail, Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::coordinator::{Coordinator, DeviceSelection, PortChoice};
use crate::transport::{MidiTransport, MidirBackend, PortBackend};

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ports,
    Refresh,
    Select(usize),
    Channel(i32),
    Show,
    Set { id: String, value: i32 },
    Help,
    Quit,
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };

        let command = match verb.to_lowercase().as_str() {
            "ports" | "devices" | "ls" => Command::Ports,
            "refresh" => Command::Refresh,
            "select" | "use" => Command::Select(
                next_arg(&mut words, "select <n>")?
                    .parse()
                    .context("port number must be a non-negative integer")?,
            ),
            "channel" | "ch" => Command::Channel(
                next_arg(&mut words, "channel <1-16>")?
                    .parse()
                    .context("channel must be an integer")?,
            ),
            "show" => Command::Show,
            "set" => {
                let id = next_arg(&mut words, "set <id> <value>")?.to_string();
                let value = next_arg(&mut words, "set <id> <value>")?
                    .parse()
                    .context("value must be an integer")?;
                Command::Set { id, value }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };

        if words.next().is_some() {
            bail!("too many arguments for '{}'", verb);
        }
        Ok(command)
    }
}

fn next_arg<'a>(words: &mut impl Iterator<Item = &'a str>, usage: &str) -> Result<&'a str> {
    words
        .next()
        .with_context(|| format!("missing argument, usage: {}", usage))
}

/// Apply a command to the coordinator. Returns false when the console should exit.
pub fn execute<B: PortBackend>(coordinator: &mut Coordinator<B>, command: Command) -> bool {
    match command {
        Command::Ports => print_choices(coordinator),
        Command::Refresh => {
            coordinator.refresh_ports();
            print_choices(coordinator);
        }
        Command::Select(index) => {
            let selectable = coordinator
                .choices()
                .get(index)
                .is_some_and(PortChoice::is_selectable);
            if selectable {
                coordinator.select_port(index);
                print_grid(coordinator);
            } else {
                println!("{}", format!("No selectable port {}", index).red());
            }
        }
        Command::Channel(channel) => {
            coordinator.set_channel(channel);
            println!("Channel: {}", coordinator.channel().to_string().green());
        }
        Command::Show => print_grid(coordinator),
        Command::Set { id, value } => {
            coordinator.set_control_value(&id, value);
            print_grid(coordinator);
        }
        Command::Help => print_help(),
        Command::Quit => return false,
    }
    true
}

/// Run the console until `quit` or end of input, then shut the coordinator down
pub fn run_repl<B: PortBackend>(mut coordinator: Coordinator<B>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    coordinator.refresh_ports();
    for notice in coordinator.take_notices() {
        println!("{} {}", format!("{}:", notice.title).yellow().bold(), notice.message);
    }
    print_choices(&coordinator);

    loop {
        match rl.readline("uafx> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match Command::parse(&line) {
                    Ok(command) => {
                        if !execute(&mut coordinator, command) {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                coordinator.shutdown();
                return Err(e.into());
            }
        }
    }

    coordinator.shutdown();
    Ok(())
}

fn print_choices<B: PortBackend>(coordinator: &Coordinator<B>) {
    println!("\n{}", "Devices:".bold());
    for (index, choice) in coordinator.choices().iter().enumerate() {
        let marker = if coordinator.selected() == Some(index) {
            "*".green()
        } else {
            " ".normal()
        };
        match choice {
            PortChoice::Device { port, device } => {
                println!("  {} {}: {} [{}]", marker, index, port.name, device.cyan());
            }
            PortChoice::NoMatchingDevices => {
                println!("    {}", choice.label().dimmed());
            }
        }
    }
}

fn print_grid<B: PortBackend>(coordinator: &Coordinator<B>) {
    let DeviceSelection::DeviceActive(active) = coordinator.selection() else {
        println!("{}", "No device selected".yellow());
        return;
    };

    println!(
        "\n{} on {} (channel {})",
        active.name.bold().cyan(),
        active.port,
        coordinator.channel()
    );
    for row in active.grid.rows() {
        if row.separator_before {
            println!("  {}", "─".repeat(40).dimmed());
        }
        for control in &row.controls {
            println!(
                "  {:<12} {:<16} cc:{:<3} {:>4}  {}",
                control.id.yellow(),
                control.name,
                control.cc,
                control.value(),
                control.label().green()
            );
        }
    }
}

fn print_help() {
    println!("\n{}", "Commands:".bold());
    println!("  ports             list matching devices");
    println!("  refresh           rescan MIDI ports");
    println!("  select <n>        switch to device <n>");
    println!("  channel <1-16>    set the MIDI channel");
    println!("  show              show the controls of the active device");
    println!("  set <id> <value>  change a control and send it");
    println!("  quit              save and exit");
}

/// Print all MIDI output ports
pub fn list_ports_formatted() {
    println!("\n{}", "=== Available MIDI Output Ports ===".bold().cyan());

    let ports = MidiTransport::new(MidirBackend::new()).list_ports();
    if ports.is_empty() {
        println!("  {}", "No output ports found".dimmed());
    }
    for port in ports {
        println!("  {}: {}", port.index, port.name);
    }
    println!();
}
