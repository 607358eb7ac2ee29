//! handset: boot a device-style system server and drive activities from
//! the command line.

mod cli;
mod cmd_boot;
mod cmd_launch;
mod cmd_packages;
mod device;
mod logging;

use std::time::Duration;

use clap::Parser;
use handset_config::{ConfigLoader, ConfigValidator};
use tracing::warn;

use cli::{Cli, Commands};
use cmd_launch::LaunchArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    let _guard = logging::init_logging(&config.logging)?;
    for warning in ConfigValidator::validate(&config)?.into_result()? {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    match cli.command.unwrap_or(Commands::Boot { run_for_ms: None }) {
        Commands::Boot { run_for_ms } => cmd_boot::run_boot(&config, run_for_ms).await,
        Commands::Packages { format } => cmd_packages::run_packages(&config, format),
        Commands::Launch {
            package,
            activity,
            action,
            extras,
            flags,
            settle_ms,
            format,
        } => {
            let args = LaunchArgs {
                package,
                activity,
                action,
                extras,
                flags,
                settle: Duration::from_millis(settle_ms),
                format,
            };
            cmd_launch::run_launch(&config, args).await
        }
    }
}
