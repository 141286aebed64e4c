use std::path::PathBuf;
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use leadscope_core::config::LaunchOptions;
use leadscope_core::error::AppError;
use leadscope_core::traits::{
    BrowserPage, BrowserSession, MetadataQuery, RawMetadata, SessionLauncher, Viewport,
    WaitCondition,
};
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Part of the navigation timeout kept back from the network-idle wait.
const IDLE_HEADROOM: Duration = Duration::from_secs(1);

const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";

/// Launches headless Chromium over the Chrome DevTools Protocol.
///
/// Each [`SessionLauncher::launch`] starts a fresh browser process; pages are
/// opened on `about:blank` and navigated explicitly so that user agent and
/// viewport overrides apply to the first request.
///
/// # Example
///
/// ```rust,no_run
/// use leadscope_client::ChromeLauncher;
/// use leadscope_core::config::LaunchOptions;
/// use leadscope_core::traits::{BrowserSession, SessionLauncher};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let session = ChromeLauncher::new().launch(&LaunchOptions::default()).await?;
/// let page = session.new_page().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }

    fn browser_config(options: &LaunchOptions) -> Result<BrowserConfig, AppError> {
        let mut builder = BrowserConfig::builder().disable_default_args();

        if options.no_sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }

        // Snap-packaged Chromium ships a wrapper that drops unknown flags,
        // which breaks headless mode. Prefer the real binary when we can.
        if let Some(bin) = options.executable.clone().or_else(find_chrome_binary) {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        if options.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::SessionInit(format!("Browser config error: {e}")))
    }
}

/// Tries to locate a real Chrome/Chromium binary in well-known places.
///
/// Returns `None` to let `chromiumoxide` do its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        // Snap (Ubuntu default)
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        // Flatpak
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists())
}

impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, options: &LaunchOptions) -> Result<ChromeSession, AppError> {
        let config = Self::browser_config(options)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::SessionInit(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        tracing::info!(headless = options.headless, "Browser launched");
        Ok(ChromeSession { browser, handler })
    }
}

/// A running Chromium process plus its CDP event loop.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<ChromePage, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::Browser(format!("Failed to open page: {e}")))?;
        Ok(ChromePage { page })
    }

    async fn close(mut self) -> Result<(), AppError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Browser(format!("Failed to close browser: {e}")));
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        closed
    }
}

/// One tab.
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, AppError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| AppError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| AppError::Evaluation(format!("Unexpected script result: {e}")))
    }

    /// Poll the resource-timing entry count until it holds still for `idle`,
    /// or until `budget` runs out.
    ///
    /// The count only grows when a request completes, so a long-polling
    /// request still in flight looks idle.
    async fn wait_for_network_idle(&self, idle: Duration, budget: Duration) {
        let start = Instant::now();
        let mut last_count: Option<u64> = None;
        let mut stable_since = Instant::now();

        while start.elapsed() < budget {
            let count = self.eval::<u64>(RESOURCE_COUNT_JS).await.ok();
            if count.is_some() && count == last_count {
                if stable_since.elapsed() >= idle {
                    return;
                }
            } else {
                last_count = count;
                stable_since = Instant::now();
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        tracing::debug!(budget_ms = %budget.as_millis(), "Network did not settle, continuing");
    }
}

impl BrowserPage for ChromePage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), AppError> {
        self.page
            .execute(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(|e| AppError::Browser(format!("Failed to set user agent: {e}")))?;
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> Result<(), AppError> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        );
        self.page
            .execute(params)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to set viewport: {e}")))?;
        Ok(())
    }

    async fn navigate(
        &self,
        url: &str,
        wait: WaitCondition,
        timeout: Duration,
    ) -> Result<(), AppError> {
        let start = Instant::now();

        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| AppError::timeout("Navigation", timeout))?
            .map_err(|e| AppError::Navigation(format!("Failed to navigate to {url}: {e}")))?;

        if let WaitCondition::NetworkIdle { idle } = wait {
            self.wait_for_network_idle(idle, idle_budget(timeout, start.elapsed()))
                .await;
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), AppError> {
        let start = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(AppError::timeout(&format!("Waiting for {selector}"), timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> Result<String, AppError> {
        self.page
            .content()
            .await
            .map_err(|e| AppError::Evaluation(format!("Failed to read page content: {e}")))
    }

    async fn inner_text(&self, selector: &str) -> Result<String, AppError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| AppError::Evaluation(format!("No element for {selector}: {e}")))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| AppError::Evaluation(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn query_metadata(&self, query: &MetadataQuery) -> Result<RawMetadata, AppError> {
        let script = metadata_script(query)?;
        self.eval(&script).await
    }

    async fn close(self) -> Result<(), AppError> {
        self.page
            .close()
            .await
            .map_err(|e| AppError::Browser(format!("Failed to close page: {e}")))
    }
}

/// What is left of the navigation timeout for the network-idle wait, minus
/// headroom so the caller's own navigation timeout does not fire first.
fn idle_budget(timeout: Duration, elapsed: Duration) -> Duration {
    timeout.saturating_sub(elapsed).saturating_sub(IDLE_HEADROOM)
}

/// The in-page half of [`BrowserPage::query_metadata`]. Only the query goes
/// in and only a [`RawMetadata`]-shaped object comes out.
fn metadata_script(query: &MetadataQuery) -> Result<String, AppError> {
    let selectors = serde_json::to_string(&query.name_selectors)?;
    Ok(format!(
        r#"(() => {{
  const selectors = {selectors};
  const nameCandidates = [];
  for (const sel of selectors) {{
    try {{
      const el = document.querySelector(sel);
      const text = el && el.innerText ? el.innerText.trim() : '';
      if (text) nameCandidates.push(text);
    }} catch (_) {{}}
  }}
  const meta = (name) => {{
    for (const sel of [`meta[name="${{name}}"]`, `meta[property="${{name}}"]`, `meta[property="og:${{name}}"]`]) {{
      const el = document.querySelector(sel);
      const content = el ? (el.getAttribute('content') || '') : '';
      if (content) return content;
    }}
    return '';
  }};
  return {{
    nameCandidates,
    title: document.title || '',
    description: meta('description'),
    keywords: meta('keywords'),
    links: Array.from(document.querySelectorAll('a[href]')).map((a) => a.href),
  }};
}})()"#
    ))
}
