//! A booted device: the main looper thread plus a started system server.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context as _};
use handset_config::Config;
use handset_core::{Context, SystemServer, SystemServerConfig};
use handset_runloop::{Handler, Looper};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

pub(crate) struct Device {
    server: Arc<SystemServer>,
    main: Handler,
    looper_thread: Option<JoinHandle<()>>,
}

impl Device {
    /// Start the main looper on its own thread, then boot the system server
    /// against it and wait for every service to register.
    pub async fn boot(config: &Config) -> anyhow::Result<Self> {
        let (tx, rx) = oneshot::channel();
        let looper_thread = thread::Builder::new()
            .name("main-looper".to_string())
            .spawn(move || {
                let looper = match Looper::prepare_main() {
                    Ok(looper) => looper,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                };
                if tx.send(Ok(looper.handler())).is_err() {
                    return;
                }
                if let Err(e) = looper.run() {
                    error!("Main looper stopped: {}", e);
                }
            })
            .context("failed to spawn main looper thread")?;

        let main = rx
            .await
            .map_err(|_| anyhow!("main looper thread exited before starting"))??;
        let server = SystemServer::builder()
            .main_handler(main.clone())
            .config(SystemServerConfig {
                home: config.home_manifest(),
                packages: config.packages.clone(),
                language_model: config.language_model(),
            })
            .build();
        let mut device = Self {
            server: match server {
                Ok(server) => server,
                Err(e) => {
                    main.looper().quit();
                    let _ = looper_thread.join();
                    return Err(e.into());
                }
            },
            main,
            looper_thread: Some(looper_thread),
        };

        let server = device.server.clone();
        let timeout = config.system.await_ready_timeout();
        let boot = device.server.start()?;
        let outcome = tokio::task::spawn_blocking(move || {
            let result = boot.join();
            (result, server.await_ready(timeout))
        })
        .await?;

        match outcome {
            (Ok(Ok(())), true) => {}
            (Ok(Ok(())), false) => warn!(
                "Readiness barrier not released after {:?}, {} services missing",
                timeout,
                device.server.barrier().remaining()
            ),
            (Ok(Err(e)), _) => {
                device.shutdown();
                return Err(e.into());
            }
            (Err(_), _) => {
                device.shutdown();
                return Err(anyhow!("system server thread panicked"));
            }
        }

        info!(
            "Device booted with services {:?}",
            device.server.process().services().list_services()
        );
        Ok(device)
    }

    pub fn server(&self) -> &Arc<SystemServer> {
        &self.server
    }

    /// Context for an application process sharing this device's registry.
    pub fn context(&self, package_name: &str) -> Context {
        Context::new(
            self.server.process().clone(),
            self.main.clone(),
            package_name,
        )
    }

    /// Quit the main looper and wait for its thread.
    pub fn shutdown(&mut self) {
        self.main.looper().quit();
        if let Some(handle) = self.looper_thread.take() {
            if handle.join().is_err() {
                error!("Main looper thread panicked");
            }
        }
        info!("Device shut down");
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.looper_thread.is_some() {
            self.shutdown();
        }
    }
}
