//! Command-line options and the startup command.

use crate::config::{CompositorConfig, ConfigLoader};
use crate::error::{NimbusError, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// Options accepted by the compositor binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "nimbus", version, about = "A minimal Wayland compositor")]
pub struct LaunchOptions {
    /// Command to run once the display socket is ready.
    #[arg(short = 's', long = "startup", value_name = "COMMAND")]
    pub startup: Option<String>,

    /// Configuration file to use instead of `$XDG_CONFIG_HOME/nimbus/config.toml`.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl LaunchOptions {
    /// Loads the configuration and applies the command-line overrides.
    pub fn load_config(&self) -> Result<CompositorConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_path(path)?,
            None => ConfigLoader::load()?,
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// `--startup` replaces the configured startup command.
    pub fn apply(&self, config: &mut CompositorConfig) {
        if let Some(command) = &self.startup {
            config.startup_command = Some(command.clone());
        }
    }
}

/// Runs `command` through `/bin/sh -c` with `WAYLAND_DISPLAY` pointing at
/// `socket`. The child is reaped on a detached thread. Returns its pid.
pub fn spawn_startup_command(command: &str, socket: &str) -> Result<u32> {
    let mut child = Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        .env("WAYLAND_DISPLAY", socket)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| NimbusError::Launch {
            command: command.to_string(),
            source,
        })?;

    let pid = child.id();
    info!(pid, command, "startup command launched");

    thread::Builder::new()
        .name("nimbus-startup-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "startup command exited"),
            Err(e) => warn!(pid, error = %e, "failed to wait for startup command"),
        })?;
    Ok(pid)
}
