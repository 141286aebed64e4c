//! Test utilities: an in-memory browser implementing the session traits.
//!
//! Handwritten mocks for dependency injection in unit tests. Every URL is
//! served from a scripted [`MockSite`], and every call is recorded in a shared
//! [`BrowserLog`] so tests can assert on page lifecycle and ordering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::LaunchOptions;
use crate::error::AppError;
use crate::traits::{
    BrowserPage, BrowserSession, MetadataQuery, RawMetadata, SessionLauncher, Viewport,
    WaitCondition,
};

// ---------------------------------------------------------------------------
// Scripted sites
// ---------------------------------------------------------------------------

/// What a page looks like once loaded.
#[derive(Debug, Clone, Default)]
pub struct MockPageSpec {
    pub content: String,
    pub body_text: String,
    pub metadata: RawMetadata,
    /// Selectors that `wait_for_selector` will find.
    pub selectors: Vec<String>,
}

impl MockPageSpec {
    pub fn new(content: &str, body_text: &str) -> Self {
        Self {
            content: content.to_string(),
            body_text: body_text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: RawMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }
}

/// How a URL behaves across navigations.
#[derive(Debug, Clone)]
pub enum MockSite {
    /// Loads fine every time.
    Page(MockPageSpec),
    /// Navigation fails with this message every time.
    Unreachable(String),
    /// The first `failures` navigations fail, later ones load `page`.
    Flaky { failures: u32, page: MockPageSpec },
    /// Navigation loads but the metadata query always fails.
    BrokenScript(MockPageSpec),
    /// Navigation never completes.
    Hang,
}

// ---------------------------------------------------------------------------
// Call log
// ---------------------------------------------------------------------------

/// Everything the mock browser was asked to do.
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launches: u32,
    pub sessions_closed: u32,
    pub pages_opened: u32,
    pub pages_closed: u32,
    pub open_pages: u32,
    pub max_open_pages: u32,
    pub navigations: Vec<String>,
    pub user_agents: Vec<String>,
    pub viewports: Vec<Viewport>,
    pub waited_selectors: Vec<String>,
    pub queries: Vec<MetadataQuery>,
}

#[derive(Default)]
struct Shared {
    sites: HashMap<String, MockSite>,
    attempts: HashMap<String, u32>,
    log: BrowserLog,
    launch_error: Option<AppError>,
    new_page_error: Option<AppError>,
    session_close_fails: bool,
    page_close_fails: bool,
}

// ---------------------------------------------------------------------------
// MockLauncher
// ---------------------------------------------------------------------------

/// Mock launcher; all sessions and pages it creates share one state.
#[derive(Clone, Default)]
pub struct MockLauncher {
    shared: Arc<Mutex<Shared>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, url: &str, site: MockSite) -> Self {
        self.shared
            .lock()
            .unwrap()
            .sites
            .insert(url.to_string(), site);
        self
    }

    pub fn with_launch_error(self, error: AppError) -> Self {
        self.shared.lock().unwrap().launch_error = Some(error);
        self
    }

    /// The next `new_page` call fails once.
    pub fn with_new_page_error(self, error: AppError) -> Self {
        self.shared.lock().unwrap().new_page_error = Some(error);
        self
    }

    pub fn with_session_close_error(self) -> Self {
        self.shared.lock().unwrap().session_close_fails = true;
        self
    }

    pub fn with_page_close_error(self) -> Self {
        self.shared.lock().unwrap().page_close_fails = true;
        self
    }

    /// Inspect the call log.
    pub fn log<R>(&self, f: impl FnOnce(&BrowserLog) -> R) -> R {
        f(&self.shared.lock().unwrap().log)
    }
}

impl SessionLauncher for MockLauncher {
    type Session = MockSession;

    async fn launch(&self, _options: &LaunchOptions) -> Result<MockSession, AppError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(e) = shared.launch_error.take() {
            return Err(e);
        }
        shared.log.launches += 1;
        Ok(MockSession {
            shared: Arc::clone(&self.shared),
        })
    }
}

// ---------------------------------------------------------------------------
// MockSession
// ---------------------------------------------------------------------------

pub struct MockSession {
    shared: Arc<Mutex<Shared>>,
}

impl BrowserSession for MockSession {
    type Page = MockPage;

    async fn new_page(&self) -> Result<MockPage, AppError> {
        let mut shared = self.shared.lock().unwrap();
        if let Some(e) = shared.new_page_error.take() {
            return Err(e);
        }
        shared.log.pages_opened += 1;
        shared.log.open_pages += 1;
        shared.log.max_open_pages = shared.log.max_open_pages.max(shared.log.open_pages);
        Ok(MockPage {
            shared: Arc::clone(&self.shared),
            loaded: Mutex::new(None),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        let mut shared = self.shared.lock().unwrap();
        shared.log.sessions_closed += 1;
        if shared.session_close_fails {
            return Err(AppError::Browser("browser process already gone".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockPage
// ---------------------------------------------------------------------------

pub struct MockPage {
    shared: Arc<Mutex<Shared>>,
    loaded: Mutex<Option<(MockPageSpec, bool)>>,
}

impl MockPage {
    fn loaded(&self) -> Result<(MockPageSpec, bool), AppError> {
        self.loaded
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Evaluation("no document loaded".into()))
    }
}

impl BrowserPage for MockPage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), AppError> {
        self.shared
            .lock()
            .unwrap()
            .log
            .user_agents
            .push(user_agent.to_string());
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> Result<(), AppError> {
        self.shared.lock().unwrap().log.viewports.push(viewport);
        Ok(())
    }

    async fn navigate(
        &self,
        url: &str,
        _wait: WaitCondition,
        _timeout: Duration,
    ) -> Result<(), AppError> {
        let site = {
            let mut shared = self.shared.lock().unwrap();
            shared.log.navigations.push(url.to_string());
            let attempt = shared.attempts.entry(url.to_string()).or_insert(0);
            *attempt += 1;
            let attempt = *attempt;
            let site = shared
                .sites
                .get(url)
                .cloned()
                .unwrap_or_else(|| MockSite::Page(MockPageSpec::default()));
            (site, attempt)
        };

        match site {
            (MockSite::Page(spec), _) => {
                *self.loaded.lock().unwrap() = Some((spec, true));
                Ok(())
            }
            (MockSite::BrokenScript(spec), _) => {
                *self.loaded.lock().unwrap() = Some((spec, false));
                Ok(())
            }
            (MockSite::Unreachable(msg), _) => Err(AppError::Navigation(msg)),
            (MockSite::Flaky { failures, page }, attempt) => {
                if attempt <= failures {
                    Err(AppError::Navigation(format!(
                        "net::ERR_CONNECTION_RESET (attempt {attempt})"
                    )))
                } else {
                    *self.loaded.lock().unwrap() = Some((page, true));
                    Ok(())
                }
            }
            (MockSite::Hang, _) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), AppError> {
        self.shared
            .lock()
            .unwrap()
            .log
            .waited_selectors
            .push(selector.to_string());
        let (spec, _) = self.loaded()?;
        if spec.selectors.iter().any(|s| s == selector) {
            Ok(())
        } else {
            Err(AppError::timeout(&format!("Waiting for {selector}"), timeout))
        }
    }

    async fn content(&self) -> Result<String, AppError> {
        Ok(self.loaded()?.0.content)
    }

    async fn inner_text(&self, _selector: &str) -> Result<String, AppError> {
        Ok(self.loaded()?.0.body_text)
    }

    async fn query_metadata(&self, query: &MetadataQuery) -> Result<RawMetadata, AppError> {
        self.shared.lock().unwrap().log.queries.push(query.clone());
        let (spec, script_ok) = self.loaded()?;
        if !script_ok {
            return Err(AppError::Evaluation(
                "Execution context was destroyed".into(),
            ));
        }
        Ok(spec.metadata)
    }

    async fn close(self) -> Result<(), AppError> {
        let mut shared = self.shared.lock().unwrap();
        shared.log.pages_closed += 1;
        shared.log.open_pages = shared.log.open_pages.saturating_sub(1);
        if shared.page_close_fails {
            return Err(AppError::Browser("target closed".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Metadata with a title and optional name candidates.
pub fn make_metadata(title: &str, names: &[&str], links: &[&str]) -> RawMetadata {
    RawMetadata {
        name_candidates: names.iter().map(|s| s.to_string()).collect(),
        title: title.to_string(),
        description: String::new(),
        keywords: String::new(),
        links: links.iter().map(|s| s.to_string()).collect(),
    }
}
