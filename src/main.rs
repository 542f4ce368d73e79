mod accel;
mod app;
mod config;
mod machine;
mod ui;
mod wizard;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use accel::{Accelerator, Platform};
use app::App;
use config::Config;
use machine::Machine;
use wizard::AcceleratorPage;

#[derive(Parser)]
#[command(name = "vm-accel")]
#[command(version)]
#[command(about = "Choose the QEMU accelerators for a new virtual machine")]
struct Cli {
    /// Platform whose accelerators are offered (linux, windows, macos, freebsd, other)
    #[arg(short, long, global = true)]
    platform: Option<Platform>,

    /// Name of the new machine
    #[arg(short, long, global = true, default_value = "New Machine")]
    name: String,

    /// Where to write the machine definition
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the accelerator tabs offered on the platform
    Panels,

    /// Print the accelerators a new machine starts with
    Defaults {
        /// Check an accelerator tab (repeatable)
        #[arg(short, long)]
        enable: Vec<Accelerator>,
        /// Uncheck an accelerator tab (repeatable)
        #[arg(short, long)]
        disable: Vec<Accelerator>,
        /// Also write the machine definition
        #[arg(short, long)]
        save: bool,
    },

    /// Show a saved machine definition
    Show {
        /// Machine definition file
        file: PathBuf,
    },

    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let platform = cli.platform.unwrap_or_else(|| config.platform());
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.machine_file(&cli.name));

    match cli.command {
        Some(Commands::Panels) => {
            init_logging(None)?;
            cmd_panels(platform)
        }
        Some(Commands::Defaults { enable, disable, save }) => {
            init_logging(None)?;
            let save_to = save.then_some(output.as_path());
            cmd_defaults(platform, &cli.name, &enable, &disable, save_to)
        }
        Some(Commands::Show { file }) => {
            init_logging(None)?;
            cmd_show(&file)
        }
        Some(Commands::InitConfig) => {
            init_logging(None)?;
            cmd_init_config(&config)
        }
        None => {
            init_logging(Some(&config.log_file))?;
            run_tui(platform, &cli.name, output)
        }
    }
}

/// Set up env_logger. With a log file, output goes there instead of stderr
/// so the TUI is left alone.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Guard that ensures terminal is restored on drop (even on panic)
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored, we may be unwinding
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

fn run_tui(platform: Platform, name: &str, output: PathBuf) -> Result<()> {
    log::info!("Starting accelerator page for {} on {}", name, platform);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Created after setup so it only cleans up if setup succeeded
    let guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(platform, name, output);
    let result = ui::run(&mut terminal, &mut app);

    drop(guard);

    if app.saved {
        println!(
            "Saved {} ({}) to {}",
            app.machine.name,
            app.machine.accelerator_summary(),
            app.output_path.display()
        );
    }

    result
}

fn cmd_panels(platform: Platform) -> Result<()> {
    println!("Accelerators offered on {}:", platform);
    println!();

    for spec in platform.panel_table() {
        let accel = spec.accelerator;
        let default = if spec.default_enabled { "[x]" } else { "[ ]" };
        let host = match accel.host_support() {
            Some(true) => "available",
            Some(false) => "not detected",
            None => "unknown",
        };
        println!(
            "  {} {:5} {:46} host: {}",
            default,
            accel.tab_label(),
            accel.title(),
            host
        );
        println!("        {}", accel.doc_link().url);
    }

    let defaults: Vec<&str> = platform.default_accelerators().iter().map(|a| a.id()).collect();
    let missing: Vec<&str> = Accelerator::ALL
        .iter()
        .filter(|a| !platform.offers(**a))
        .map(|a| a.id())
        .collect();

    println!();
    println!("Enabled by default: {}", if defaults.is_empty() { "none".to_string() } else { defaults.join(", ") });
    if !missing.is_empty() {
        println!("Not offered: {}", missing.join(", "));
    }

    Ok(())
}

fn cmd_defaults(
    platform: Platform,
    name: &str,
    enable: &[Accelerator],
    disable: &[Accelerator],
    save_to: Option<&Path>,
) -> Result<()> {
    let mut machine = Machine::new(name);
    let mut page = AcceleratorPage::new(platform, &mut machine);

    // Same effect as clicking the checkboxes, in order
    let toggles = enable.iter().map(|a| (*a, true)).chain(disable.iter().map(|a| (*a, false)));
    for (accel, enabled) in toggles {
        if !page.set_checked(accel, enabled, &mut machine) {
            anyhow::bail!("{} is not offered on {}", accel.tab_label(), platform);
        }
    }
    drop(page);

    println!("Platform: {}", platform);
    println!("Accelerators: {}", machine.accelerator_summary());
    println!("QEMU arguments: {}", machine.qemu_accel_args().join(" "));

    if let Some(path) = save_to {
        machine.save(path)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

fn cmd_show(file: &Path) -> Result<()> {
    let machine = Machine::load(file)?;

    println!("Machine: {}", machine.name);
    println!("Created: {}", machine.created.format("%Y-%m-%d %H:%M"));
    println!("Accelerators: {}", machine.accelerator_summary());
    println!("QEMU arguments: {}", machine.qemu_accel_args().join(" "));

    Ok(())
}

fn cmd_init_config(config: &Config) -> Result<()> {
    let path = Config::config_file_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}
