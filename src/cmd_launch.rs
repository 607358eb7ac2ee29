//! `handset launch`.

use std::time::Duration;

use handset_config::Config;
use handset_core::ActivitySnapshot;
use handset_protocols::{ActivityToken, ExtraValue, Intent, IntentFlags};

use crate::cli::OutputFormat;
use crate::device::Device;

pub(crate) struct LaunchArgs {
    pub package: String,
    pub activity: String,
    pub action: Option<String>,
    pub extras: Vec<(String, ExtraValue)>,
    pub flags: Vec<IntentFlags>,
    pub settle: Duration,
    pub format: OutputFormat,
}

impl LaunchArgs {
    fn intent(&self) -> Intent {
        let mut intent = Intent::explicit(&self.package, &self.activity);
        if let Some(action) = &self.action {
            intent = intent.set_action(action);
        }
        for flag in &self.flags {
            intent = intent.add_flags(*flag);
        }
        for (key, value) in &self.extras {
            intent = intent.put_extra(key, value.clone());
        }
        intent
    }
}

pub(crate) async fn run_launch(config: &Config, args: LaunchArgs) -> anyhow::Result<()> {
    let mut device = Device::boot(config).await?;
    let context = device.context(&args.package);

    let token = context.start_activity(args.intent())?;
    tokio::time::sleep(args.settle).await;

    let stack = context
        .activity_manager()
        .map(|am| am.task_stack())
        .unwrap_or_default();
    device.shutdown();

    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "launched": token,
                "task_stack": stack,
            }))?
        ),
        OutputFormat::Table => print_stack(token, &stack),
    }
    Ok(())
}

fn print_stack(launched: ActivityToken, stack: &[ActivitySnapshot]) {
    println!("launched {}", launched);
    for (depth, record) in stack.iter().enumerate().rev() {
        println!(
            "  #{:<2} {:<8} {:<40} {:<12} {}{}",
            depth,
            record.token.to_string(),
            record.component.to_string(),
            record.launch_mode.to_string(),
            record.state,
            if record.finishing { " (finishing)" } else { "" }
        );
    }
}
