//! Browser process lifecycle.
//!
//! [`HeadlessBrowser`] launches Chrome with a throwaway profile, opens
//! pages, and shuts the process down. One browser is launched per check.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{BrowserError, Result};
use crate::page::Page;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "pagewatch-bot/1.0 (+https://github.com)";

/// Deadline of a single `DevTools` command, navigation included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Launch options for [`HeadlessBrowser`].
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a window (default: true).
    pub headless: bool,

    /// Window and emulated viewport size (default: 1280x720).
    pub window_size: (u32, u32),

    /// Upper bound on any single CDP command. Must exceed the navigation
    /// timeout, or chromiumoxide gives up first.
    pub request_timeout: Duration,

    /// User agent reported by every page.
    pub user_agent: String,

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<PathBuf>,
}

impl BrowserSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the browser window.
    #[must_use]
    pub fn headed(mut self) -> Self {
        self.headless = false;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args.extend(args);
        self
    }

    /// The viewport pages emulate; chromiumoxide would otherwise keep its
    /// own 800x600 default regardless of the window size.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        let (width, height) = self.window_size;
        Viewport {
            width,
            height,
            ..Viewport::default()
        }
    }

    fn to_browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder()
            .window_size(self.window_size.0, self.window_size.1)
            .viewport(self.viewport())
            .request_timeout(self.request_timeout)
            .user_data_dir(user_data_dir)
            .arg(format!("--user-agent={}", self.user_agent));

        if !self.headless {
            config = config.with_head();
        }

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path);
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 720),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            args: vec![
                // scheduled runners are usually containers without user namespaces
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A running Chrome process.
///
/// Prefer [`HeadlessBrowser::close`]; dropping the value still kills the
/// process through chromiumoxide but leaves the profile directory behind.
pub struct HeadlessBrowser {
    inner: Option<Browser>,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl HeadlessBrowser {
    /// Launches Chrome with a fresh profile directory.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(settings: BrowserSettings) -> Result<Self> {
        debug!(?settings, "launching browser");

        // unique per launch so concurrent runs never share a ProcessSingleton
        let user_data_dir =
            std::env::temp_dir().join(format!("pagewatch-{}", uuid::Uuid::new_v4()));
        let config = settings.to_browser_config(&user_data_dir)?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: launch_failure_reason(settings.chrome_path.as_deref(), &e),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP traffic while the handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        debug!(profile = %user_data_dir.display(), "browser launched");

        Ok(Self {
            inner: Some(browser),
            handler,
            user_data_dir,
        })
    }

    /// Opens a blank tab.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` after [`close`](Self::close) and
    /// `ConnectionFailed` if Chrome cannot create the target.
    pub async fn new_page(&self) -> Result<Page> {
        let browser = self.inner.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Page::new(chrome_page))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Closes Chrome, reaps the process, and removes the profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully. The
    /// profile directory is removed regardless.
    pub async fn close(mut self) -> Result<()> {
        let closed = match self.inner.take() {
            Some(mut browser) => {
                debug!("closing browser");
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| BrowserError::ConnectionFailed(e.to_string()));
                if let Err(e) = browser.wait().await {
                    debug!("waiting for browser exit failed: {e}");
                }
                closed
            }
            None => Ok(()),
        };

        self.handler.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
            debug!(profile = %self.user_data_dir.display(), "profile not removed: {e}");
        }

        closed
    }
}

/// Names the executable and the underlying cause, since the report only
/// keeps the displayed message.
fn launch_failure_reason(chrome_path: Option<&Path>, cause: &dyn std::fmt::Display) -> String {
    match chrome_path {
        Some(path) => format!("failed to launch Chrome at {}: {cause}", path.display()),
        None => format!("failed to launch Chrome: {cause}"),
    }
}

impl Drop for HeadlessBrowser {
    fn drop(&mut self) {
        if self.inner.is_some() {
            // chromiumoxide's Browser drop kills the child process
            warn!("browser dropped without close(); forcing shutdown");
            self.handler.abort();
        }
    }
}
