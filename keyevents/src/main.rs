use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{LevelFilter, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use keyevents::{
    config::{self, Binding, load_config, load_config_from},
    describe_event_name, listen,
    logging::{DEFAULT_LOG_LEVEL, parse_log_level, setup_logging},
    normalize_events, replay_events,
};

#[derive(Parser, Debug)]
#[command(about = "Parse key event names and match keyboard events against them.")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        global = true,
        value_parser = parse_log_level,
        default_value = DEFAULT_LOG_LEVEL
    )]
    log_level: LevelFilter,

    /// Override the config directory (default: ~/.config/keyevents on Linux/macOS, %AppData%\keyevents on Windows)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Show how event names such as `keydown.control.shift.enter` are parsed
    Parse {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print the canonical key and full key of each keyboard event in a JSON lines file
    Normalize {
        /// File to read events from, defaults to stdin
        #[arg(value_parser = parse_file)]
        file: Option<PathBuf>,
    },
    /// Deliver the keyboard events in a JSON lines file to the configured bindings and print the actions fired
    Replay {
        /// File to read events from, defaults to stdin
        #[arg(value_parser = parse_file)]
        file: Option<PathBuf>,

        /// TOML file to read bindings from, instead of the config file
        #[arg(short, long, value_parser = parse_file)]
        bindings: Option<PathBuf>,
    },
    /// Show the full key of each key pressed in the terminal and fire the configured bindings
    Listen {
        /// TOML file to read bindings from, instead of the config file
        #[arg(short, long, value_parser = parse_file)]
        bindings: Option<PathBuf>,
    },
}

fn parse_file(file: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(file);
    if path.is_file() {
        Ok(path)
    } else {
        bail!("'{file}' is not a file. Please provide a valid path.")
    }
}

fn open_input(file: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn load_bindings(bindings_file: Option<&Path>) -> anyhow::Result<Vec<Binding>> {
    let config = match bindings_file {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if config.bindings.is_empty() {
        warn!("No bindings configured");
    }
    Ok(config.bindings)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    config::set_config_dir_override(args.config_dir.clone());
    setup_logging(args.log_level)?;

    match args.command {
        Command::Parse { names } => {
            for name in names {
                println!("{}", describe_event_name(&name));
            }
        }
        Command::Normalize { file } => {
            for line in normalize_events(open_input(file.as_deref())?)? {
                println!("{line}");
            }
        }
        Command::Replay { file, bindings } => {
            let bindings = load_bindings(bindings.as_deref())?;
            for line in replay_events(open_input(file.as_deref())?, &bindings)? {
                println!("{line}");
            }
        }
        Command::Listen { bindings } => {
            let bindings = load_bindings(bindings.as_deref())?;
            listen::listen(&bindings)?;
        }
    }

    Ok(())
}
