//! Browser launching for featured links.

use std::process::{Command, Stdio};

use tracing::{debug, info, warn};
use url::Url;

/// Opens a link somewhere the user can read it.
///
/// Implementations are fire-and-forget: failures are logged, never returned,
/// so a missing browser cannot interrupt a browsing session.
pub trait LinkOpener {
    fn open(&self, url: &Url);
}

/// Launches the platform's default browser (or `$BROWSER` when set).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &Url) -> Command {
        if let Some(browser) = std::env::var_os("BROWSER").filter(|value| !value.is_empty()) {
            let mut command = Command::new(browser);
            command.arg(url.as_str());
            return command;
        }

        if cfg!(target_os = "macos") {
            let mut command = Command::new("open");
            command.arg(url.as_str());
            command
        } else if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", "", url.as_str()]);
            command
        } else {
            let mut command = Command::new("xdg-open");
            command.arg(url.as_str());
            command
        }
    }
}

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &Url) {
        let mut command = Self::command(url);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match command.spawn() {
            // Not waited on: the browser outlives this process.
            Ok(child) => debug!(pid = child.id(), url = %url, "Launched browser"),
            Err(error) => warn!(url = %url, %error, "Could not launch browser"),
        }
    }
}

/// Logs the link instead of opening it (`--no-browser`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnly;

impl LinkOpener for LogOnly {
    fn open(&self, url: &Url) {
        info!(url = %url, "Featured link");
    }
}

impl<T: LinkOpener + ?Sized> LinkOpener for &T {
    fn open(&self, url: &Url) {
        (**self).open(url);
    }
}

impl<T: LinkOpener + ?Sized> LinkOpener for Box<T> {
    fn open(&self, url: &Url) {
        (**self).open(url);
    }
}
