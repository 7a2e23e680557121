//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::dispatch::Action;

#[derive(Parser)]
#[command(name = "pfcut")]
#[command(author, version, about = "Cut and restore outbound game traffic with pf")]
#[command(after_help = "Examples:\n  \
    sudo pfcut backup          copy /etc/pf.conf to ./pf.conf_<YYYYMMDDHH>\n  \
    sudo pfcut enable -s 7     cut the network, restore it after 7 seconds\n  \
    sudo pfcut enable          cut the network\n  \
    sudo pfcut disable         restore the network")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// pf config file to edit (overrides the settings file)
    #[arg(long, global = true)]
    pub pf_conf: Option<PathBuf>,

    /// Debug mode: dump the live pf rules before and after the action
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Cut the network (add the block rule and reload pf)
    Enable {
        /// Restore the network automatically after this many seconds
        #[arg(short, long)]
        seconds: Option<u64>,
    },

    /// Restore the network (remove the block rule and reload pf)
    Disable,

    /// Back up the pf config file into the current directory
    Backup,

    /// Show whether the block rule is present
    Status,
}

impl Commands {
    pub fn action(&self) -> Action {
        match self {
            Commands::Enable { .. } => Action::Enable,
            Commands::Disable => Action::Disable,
            Commands::Backup => Action::Backup,
            Commands::Status => Action::Status,
        }
    }
}
