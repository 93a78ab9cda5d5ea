//! Playwright browser automation
//!
//! Each [`PlaywrightDriver`] runs `node` with a small bridge script that
//! owns one browser and one fresh context. Commands and replies are single
//! JSON objects per line on the child's stdin and stdout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::driver::{DriverFactory, ElementHandle, PageDriver};
use crate::error::{DriverError, DriverResult, E2eError, E2eResult};

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Playwright(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Playwright's own wait for fill/click/select targets
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,

    /// How long a text read waits for its element before reporting none
    pub read_timeout_ms: u64,

    /// Time allowed for the browser to start
    pub launch_timeout_ms: u64,

    /// `node` executable
    pub node_binary: PathBuf,

    /// `node_modules` directory containing `playwright`, exported as `NODE_PATH`
    pub node_modules: Option<PathBuf>,

    /// Replace the embedded bridge script
    pub bridge_script: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 5_000,
            navigation_timeout_ms: 30_000,
            read_timeout_ms: 5_000,
            launch_timeout_ms: 30_000,
            node_binary: PathBuf::from("node"),
            node_modules: None,
            bridge_script: None,
        }
    }
}

impl PlaywrightConfig {
    /// Longest a single command may take before the bridge is considered stuck
    fn reply_timeout(&self) -> Duration {
        let longest = self
            .action_timeout_ms
            .max(self.navigation_timeout_ms)
            .max(self.read_timeout_ms);
        Duration::from_millis(longest + 5_000)
    }
}

/// Launch options handed to the bridge script
#[derive(Serialize)]
struct BridgeLaunch<'a> {
    browser: &'a str,
    headless: bool,
    viewport_width: u32,
    viewport_height: u32,
    action_timeout_ms: u64,
    navigation_timeout_ms: u64,
    read_timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

impl<'a> BridgeRequest<'a> {
    fn new(op: &'a str) -> Self {
        Self {
            id: 0,
            op,
            url: None,
            selector: None,
            value: None,
        }
    }

    fn selector(mut self, selector: &'a str) -> Self {
        self.selector = Some(selector);
        self
    }

    fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    fn url(mut self, url: &'a str) -> Self {
        self.url = Some(url);
        self
    }
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<BridgeFailure>,
}

#[derive(Debug, Deserialize)]
struct BridgeFailure {
    kind: String,
    message: String,
}

impl BridgeFailure {
    fn into_driver_error(self, request: &BridgeRequest<'_>, timeout_ms: u64) -> DriverError {
        let selector = request.selector.unwrap_or_default().to_string();
        match self.kind.as_str() {
            "not_found" => DriverError::NotFound { selector },
            "not_interactable" => DriverError::NotInteractable {
                selector,
                reason: self.message,
            },
            "navigation" => DriverError::Navigation {
                url: request.url.unwrap_or_default().to_string(),
                reason: self.message,
            },
            "timeout" => DriverError::Timeout {
                operation: format!("{} {}", request.op, selector),
                timeout_ms,
            },
            _ => DriverError::Protocol(self.message),
        }
    }
}

/// A browser context driven through the Playwright bridge
pub struct PlaywrightDriver {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    reply_timeout: Duration,
    action_timeout_ms: u64,
    closed: bool,
    _script_dir: TempDir,
}

impl PlaywrightDriver {
    /// Start the bridge and wait until its browser context is ready
    pub async fn launch(config: &PlaywrightConfig) -> DriverResult<Self> {
        let script_dir = tempfile::tempdir().map_err(protocol)?;
        let script_path = match &config.bridge_script {
            Some(path) => path.clone(),
            None => {
                let path = script_dir.path().join("bridge.js");
                std::fs::write(&path, BRIDGE_SCRIPT).map_err(protocol)?;
                path
            }
        };

        let launch = serde_json::to_string(&BridgeLaunch {
            browser: config.browser.as_str(),
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            action_timeout_ms: config.action_timeout_ms,
            navigation_timeout_ms: config.navigation_timeout_ms,
            read_timeout_ms: config.read_timeout_ms,
        })
        .map_err(protocol)?;

        let mut cmd = TokioCommand::new(&config.node_binary);
        cmd.arg(&script_path)
            .arg(launch)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(modules) = &config.node_modules {
            cmd.env("NODE_PATH", modules);
        }

        let mut child = cmd.spawn().map_err(|e| {
            DriverError::Protocol(format!(
                "failed to spawn {}: {}",
                config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::Protocol("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::Protocol("bridge stdout unavailable".to_string()))?;

        let mut driver = Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            reply_timeout: config.reply_timeout(),
            action_timeout_ms: config.action_timeout_ms,
            closed: false,
            _script_dir: script_dir,
        };

        let launch_timeout = Duration::from_millis(config.launch_timeout_ms);
        let ready = match tokio::time::timeout(launch_timeout, driver.read_response(0)).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                operation: format!("launch {}", config.browser.as_str()),
                timeout_ms: config.launch_timeout_ms,
            }),
        };

        match ready {
            Ok(response) if response.ok => {
                debug!("Playwright bridge ready ({})", config.browser.as_str());
                Ok(driver)
            }
            Ok(response) => {
                driver.terminate().await;
                Err(DriverError::Protocol(
                    response
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| "browser launch failed".to_string()),
                ))
            }
            Err(e) => {
                driver.terminate().await;
                Err(e)
            }
        }
    }

    async fn request(&mut self, mut request: BridgeRequest<'_>) -> DriverResult<serde_json::Value> {
        if self.closed {
            return Err(DriverError::Closed);
        }

        request.id = self.next_id;
        self.next_id += 1;

        let line = serde_json::to_string(&request).map_err(protocol)?;
        debug!("bridge >>> {}", line);
        self.stdin.write_all(line.as_bytes()).await.map_err(protocol)?;
        self.stdin.write_all(b"\n").await.map_err(protocol)?;
        self.stdin.flush().await.map_err(protocol)?;

        let reply = tokio::time::timeout(self.reply_timeout, self.read_response(request.id)).await;
        let response = match reply {
            Ok(result) => result?,
            Err(_) => {
                return Err(DriverError::Timeout {
                    operation: format!("{} {}", request.op, request.selector.unwrap_or_default()),
                    timeout_ms: self.reply_timeout.as_millis() as u64,
                })
            }
        };

        if response.ok {
            Ok(response.value)
        } else {
            let failure = response.error.unwrap_or(BridgeFailure {
                kind: "protocol".to_string(),
                message: "bridge reported failure without details".to_string(),
            });
            Err(failure.into_driver_error(&request, self.action_timeout_ms))
        }
    }

    /// Read lines until the reply for `id` arrives
    async fn read_response(&mut self, id: u64) -> DriverResult<BridgeResponse> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await
                .map_err(protocol)?
                .ok_or_else(|| DriverError::Protocol("bridge exited unexpectedly".to_string()))?;

            let response: BridgeResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(_) => {
                    debug!("bridge output: {}", line);
                    continue;
                }
            };
            debug!("bridge <<< {}", line);

            if response.id == id {
                return Ok(response);
            }
            warn!("Discarding stale bridge reply {} (waiting for {})", response.id, id);
        }
    }

    /// Stop the bridge process: SIGTERM first, then kill
    async fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && tokio::time::timeout(Duration::from_millis(500), self.child.wait())
                        .await
                        .is_ok()
                {
                    return;
                }
            }
        }

        let _ = self.child.kill().await;
    }
}

#[async_trait]
impl PageDriver for PlaywrightDriver {
    async fn goto(&mut self, url: &str) -> DriverResult<()> {
        self.request(BridgeRequest::new("goto").url(url)).await?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> DriverResult<()> {
        self.request(BridgeRequest::new("fill").selector(selector).value(value))
            .await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> DriverResult<()> {
        self.request(BridgeRequest::new("click").selector(selector)).await?;
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> DriverResult<()> {
        self.request(BridgeRequest::new("select_option").selector(selector).value(value))
            .await?;
        Ok(())
    }

    async fn text_content(&mut self, selector: &str) -> DriverResult<Option<String>> {
        let value = self
            .request(BridgeRequest::new("text_content").selector(selector))
            .await?;
        serde_json::from_value(value).map_err(protocol)
    }

    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        let value = self
            .request(BridgeRequest::new("query_all").selector(selector))
            .await?;
        serde_json::from_value(value).map_err(protocol)
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.request(BridgeRequest::new("close")).await;
        self.closed = true;

        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Playwright bridge exited: {}", status),
            _ => {
                warn!("Playwright bridge did not exit after close, terminating");
                self.terminate().await;
            }
        }
        result.map(|_| ())
    }
}

/// Launches one [`PlaywrightDriver`] per test case
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
}

impl PlaywrightFactory {
    /// Create a factory after verifying Playwright is installed
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        info!(
            "Using Playwright {} (headless: {})",
            config.browser.as_str(),
            config.headless
        );
        Ok(Self { config })
    }

    /// Create a factory without the installation check
    pub fn unchecked(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }
}

#[async_trait]
impl DriverFactory for PlaywrightFactory {
    async fn create(&self) -> DriverResult<Box<dyn PageDriver>> {
        let driver = PlaywrightDriver::launch(&self.config).await?;
        Ok(Box::new(driver))
    }
}

fn protocol(err: impl std::fmt::Display) -> DriverError {
    DriverError::Protocol(err.to_string())
}
