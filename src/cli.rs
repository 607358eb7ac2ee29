//! CLI definitions for handset.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use handset_protocols::{ExtraValue, IntentFlags};

/// handset CLI.
#[derive(Parser)]
#[command(name = "handset")]
#[command(about = "Boot the handset system server and drive activities")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: <config dir>/handset/config.toml)
    #[arg(short, long, global = true, env = "HANDSET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Boot the system server and run the main looper (default)
    Boot {
        /// Stop after this many milliseconds instead of waiting for Ctrl-C
        #[arg(long)]
        run_for_ms: Option<u64>,
    },

    /// List installed applications and launcher activities
    Packages {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Boot, launch an activity and print the task stack
    Launch {
        /// Target package name
        package: String,

        /// Target activity name
        activity: String,

        /// Intent action
        #[arg(long)]
        action: Option<String>,

        /// Intent extra as key=value (repeatable)
        #[arg(long = "extra", value_parser = parse_extra)]
        extras: Vec<(String, ExtraValue)>,

        /// Intent flag: new-task, single-top, clear-top (repeatable)
        #[arg(long = "flag", value_parser = parse_flag)]
        flags: Vec<IntentFlags>,

        /// How long to let lifecycle events settle before printing
        #[arg(long, default_value_t = 200)]
        settle_ms: u64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

fn parse_extra(raw: &str) -> Result<(String, ExtraValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err("extra key cannot be empty".to_string());
    }
    Ok((key.to_string(), ExtraValue::parse_loose(value)))
}

fn parse_flag(raw: &str) -> Result<IntentFlags, String> {
    IntentFlags::from_name(raw).ok_or_else(|| format!("unknown intent flag '{}'", raw))
}
