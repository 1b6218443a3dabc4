//! Side-effecting system calls used by the domain handlers
//!
//! Handlers never touch the OS directly; they go through [`Launcher`] so a
//! failing launch becomes a `Result` at the call site and tests can record
//! what would have been opened.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::{Error, Result};

/// Opens URLs and launches applications
pub trait Launcher: Send + Sync {
    /// Open a URL in the default browser
    ///
    /// # Errors
    ///
    /// Returns error if the platform opener fails
    fn open_url(&self, url: &str) -> Result<()>;

    /// Launch an application by executable or bundle path
    ///
    /// # Errors
    ///
    /// Returns error if the process cannot be spawned
    fn launch_app(&self, path: &Path) -> Result<()>;

    /// Whether a path exists on this machine
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Resolve a program name on `PATH`
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Launcher backed by the host OS
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open_url(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "opening url");
        open::that_detached(url).map_err(|e| Error::Launch(format!("failed to open {url}: {e}")))
    }

    fn launch_app(&self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "launching application");

        // Bundles and shortcuts go through the platform opener
        let is_bundle = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "app" | "lnk" | "desktop"));

        if is_bundle {
            return open::that_detached(path)
                .map_err(|e| Error::Launch(format!("failed to open {}: {e}", path.display())));
        }

        spawn_reaped(path)
            .map(drop)
            .map_err(|e| Error::Launch(format!("failed to launch {}: {e}", path.display())))
    }
}

/// Spawn a detached program and wait for it on a background thread so an
/// exited child does not linger as a zombie
fn spawn_reaped(path: &Path) -> std::io::Result<JoinHandle<std::io::Result<ExitStatus>>> {
    let mut child = Command::new(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let name = path.display().to_string();
    std::thread::Builder::new()
        .name("yuki-reaper".to_string())
        .spawn(move || {
            let status = child.wait();
            tracing::debug!(app = %name, ?status, "launched application exited");
            status
        })
}
