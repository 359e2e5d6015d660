// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nattiq_driver")]
#[command(author, version, about = "Nattiq Note / Mokey braille display driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Display to open: auto, usb:, usb:<serial>, bluetooth:<address>
    #[arg(long, short = 'd', global = true, value_name = "LOCATOR")]
    pub device: Option<String>,

    /// Configuration file (default: $XDG_CONFIG_HOME/nattiq/driver.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print all channel traffic
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Traffic format for --monitor (text, json)
    #[arg(long, global = true, default_value = "text")]
    pub monitor_format: String,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected displays
    #[command(visible_alias = "ls")]
    List,

    /// Connect and show model, identity, cell count and key table
    #[command(visible_aliases = ["i", "detect"])]
    Info,

    /// Show the configured protocol profiles
    Profiles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show cells, written as dot numbers (e.g. 1245 247 0)
    #[command(visible_alias = "w")]
    Write {
        /// One argument per cell; 0 is a blank cell. Missing cells are blank.
        #[arg(required = true)]
        cells: Vec<String>,
    },

    /// Blank the display
    Clear,

    /// Print key events until interrupted
    #[command(visible_aliases = ["k", "input"])]
    Keys {
        /// Stop after this many events
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
}
