//! `handset boot`.

use std::time::Duration;

use handset_config::Config;
use tracing::info;

use crate::device::Device;

pub(crate) async fn run_boot(config: &Config, run_for_ms: Option<u64>) -> anyhow::Result<()> {
    let mut device = Device::boot(config).await?;

    if let Some(services) = device.server().services() {
        if let Some(top) = services.activity.top_activity() {
            info!("Top activity: {} ({})", top.component, top.token);
        }
    }
    println!(
        "handset ready: {}",
        device.server().process().services().list_services().join(", ")
    );

    match run_for_ms {
        Some(ms) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Interrupted");
        }
    }

    device.shutdown();
    Ok(())
}
