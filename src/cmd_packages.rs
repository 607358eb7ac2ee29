//! `handset packages`.

use handset_config::Config;
use handset_core::PackageRegistry;
use handset_protocols::ActivityInfo;
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct PackageListing {
    package_name: String,
    label: String,
    version: String,
    system: bool,
    /// Launcher activities only.
    activities: Vec<ActivityInfo>,
}

pub(crate) fn run_packages(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let listings = listings(config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
        OutputFormat::Table => {
            for listing in &listings {
                println!(
                    "{}  {}  {}{}",
                    listing.package_name,
                    listing.label,
                    listing.version,
                    if listing.system { "  [system]" } else { "" }
                );
                for activity in &listing.activities {
                    println!(
                        "    {:<24} {}",
                        activity.name,
                        activity.launch_mode.to_string()
                    );
                }
            }
        }
    }
    Ok(())
}

/// Installed applications, sorted by package name, with their launcher
/// activities.
fn listings(config: &Config) -> Vec<PackageListing> {
    let registry = PackageRegistry::with_home(config.home_manifest());
    for manifest in &config.packages {
        registry.install(manifest.clone());
    }
    let launchers = registry.get_launcher_activities();

    let mut listings: Vec<PackageListing> = registry
        .get_installed_applications()
        .into_iter()
        .map(|app| PackageListing {
            activities: launchers
                .iter()
                .filter(|a| a.package_name == app.package_name)
                .cloned()
                .collect(),
            package_name: app.package_name,
            label: app.label,
            version: format!("{} ({})", app.version_name, app.version_code),
            system: app.system,
        })
        .collect();
    listings.sort_by(|a, b| a.package_name.cmp(&b.package_name));
    listings
}
