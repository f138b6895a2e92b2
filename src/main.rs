use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use log::debug;
use serde_json::Value;

use swaymon::apply::{ApplyOptions, apply};
use swaymon::backend::{Connection, DryRunBackend, SwaymsgBackend};
use swaymon::config::read_config_file;
use swaymon::{Monitor, MonitorRegistry};

#[derive(Parser, Debug)]
#[clap(
    name = "swaymon",
    version,
    about = "Arrange sway outputs according to configured setups"
)]
pub struct Cli {
    /// swaymsg executable used to talk to sway
    #[clap(long)]
    executable: Option<String>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/swaymon.toml)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print commands instead of sending them
    #[clap(long)]
    dry_run: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display information on connected outputs
    Info,

    /// Show which configured setups are connected
    Check,

    /// Apply a configured setup
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Setup to apply instead of the first connected one
    #[clap(long)]
    setup: Option<String>,

    /// Do not enable the fallback output when nothing else could be applied
    #[clap(long)]
    no_fallback: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let swaymsg = SwaymsgBackend::new(
        cli.executable
            .as_deref()
            .or(option_env!("SWAYMON_EXECUTABLE_SWAYMSG"))
            .unwrap_or("swaymsg")
            .to_string(),
    );
    let connection: Rc<dyn Connection> = if cli.dry_run {
        Rc::new(DryRunBackend::new(swaymsg))
    } else {
        Rc::new(swaymsg)
    };

    let config = read_config_file(cli.config.as_deref())?;
    debug!("Config: {:?}", &config);

    let registry = MonitorRegistry::new(connection)?;

    match cli.command {
        Commands::Info => {
            println!("{} connected outputs:", registry.monitors().len());
            for monitor in registry.monitors() {
                print_monitor(monitor);
            }
        }
        Commands::Check => {
            for setup in config.setups.iter() {
                match registry.check_setup(&setup.monitors) {
                    Ok(true) => println!("{}: connected", setup.name),
                    Ok(false) => println!("{}: not connected", setup.name),
                    Err(err) => println!("{}: {}", setup.name, err),
                }
            }
        }
        Commands::Apply(ref args) => apply(
            &registry,
            &config,
            &ApplyOptions {
                setup: args.setup.as_deref(),
                no_fallback: args.no_fallback,
            },
        )?,
    }

    Ok(())
}

fn print_monitor(monitor: &Monitor) {
    let meta = |key: &str| {
        monitor
            .meta()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let active_mode = monitor
        .active_mode()
        .map(|mode| mode.to_string())
        .unwrap_or_else(|| "-".to_string());
    let highest_mode = monitor
        .highest_mode()
        .map(|mode| mode.to_string())
        .unwrap_or_else(|_| "-".to_string());

    println!(
        "* {}{}\n  Make: {}\n  Model: {}\n  Serial: {}\n  Current mode: {}\n  Highest mode: {}",
        monitor.name(),
        if monitor.is_active() { "" } else { " [inactive]" },
        meta("make"),
        meta("model"),
        meta("serial"),
        active_mode,
        highest_mode,
    );
}
