use std::sync::Mutex;
use std::time::Duration;

use leadscope_core::config::LaunchOptions;
use leadscope_core::error::AppError;
use leadscope_core::traits::{
    BrowserPage, BrowserSession, MetadataQuery, RawMetadata, SessionLauncher, Viewport,
    WaitCondition,
};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Static browser substitute: plain GET requests parsed with `scraper`.
///
/// No JavaScript runs, so wait conditions and viewport overrides are no-ops.
/// Good enough for server-rendered sites and much cheaper than Chromium.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLauncher;

impl HttpLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl SessionLauncher for HttpLauncher {
    type Session = HttpSession;

    async fn launch(&self, _options: &LaunchOptions) -> Result<HttpSession, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::SessionInit(format!("Failed to build HTTP client: {e}")))?;
        Ok(HttpSession::with_client(client))
    }
}

/// A shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl BrowserSession for HttpSession {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage, AppError> {
        Ok(HttpPage {
            client: self.client.clone(),
            user_agent: Mutex::new(None),
            document: Mutex::new(None),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Document {
    url: Url,
    html: String,
}

/// One fetched document.
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    user_agent: Mutex<Option<String>>,
    document: Mutex<Option<Document>>,
}

impl HttpPage {
    fn document(&self) -> Result<Document, AppError> {
        self.document
            .lock()
            .map_err(|_| AppError::Browser("page state poisoned".into()))?
            .clone()
            .ok_or_else(|| AppError::Evaluation("No document loaded".into()))
    }
}

impl BrowserPage for HttpPage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), AppError> {
        let mut slot = self
            .user_agent
            .lock()
            .map_err(|_| AppError::Browser("page state poisoned".into()))?;
        *slot = Some(user_agent.to_string());
        Ok(())
    }

    async fn set_viewport(&self, _viewport: Viewport) -> Result<(), AppError> {
        Ok(())
    }

    async fn navigate(
        &self,
        url: &str,
        _wait: WaitCondition,
        timeout: Duration,
    ) -> Result<(), AppError> {
        let user_agent = self
            .user_agent
            .lock()
            .map_err(|_| AppError::Browser("page state poisoned".into()))?
            .clone();

        let mut request = self.client.get(url).timeout(timeout);
        if let Some(ua) = user_agent {
            request = request.header(reqwest::header::USER_AGENT, ua);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::timeout("Navigation", timeout)
            } else {
                AppError::Navigation(format!("Failed to fetch {url}: {e}"))
            }
        })?;

        // Error pages are still pages; a browser renders them too.
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                %url,
                status = status.as_u16(),
                "Non-success status, reading page anyway"
            );
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| AppError::Navigation(format!("Failed to read response body: {e}")))?;
        tracing::debug!(%url, final_url = %final_url, bytes = html.len(), "Fetched");

        let mut slot = self
            .document
            .lock()
            .map_err(|_| AppError::Browser("page state poisoned".into()))?;
        *slot = Some(Document {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), AppError> {
        let doc = self.document()?;
        if has_match(&doc.html, selector)? {
            Ok(())
        } else {
            Err(AppError::Evaluation(format!(
                "No element matches {selector}"
            )))
        }
    }

    async fn content(&self) -> Result<String, AppError> {
        Ok(self.document()?.html)
    }

    async fn inner_text(&self, selector: &str) -> Result<String, AppError> {
        let doc = self.document()?;
        first_text(&doc.html, selector)?
            .ok_or_else(|| AppError::Evaluation(format!("No element matches {selector}")))
    }

    async fn query_metadata(&self, query: &MetadataQuery) -> Result<RawMetadata, AppError> {
        let doc = self.document()?;
        Ok(evaluate_metadata(&doc.html, &doc.url, query))
    }

    async fn close(self) -> Result<(), AppError> {
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Evaluation(format!("Invalid selector {selector}: {e}")))
}

fn has_match(html: &str, selector: &str) -> Result<bool, AppError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).next().is_some())
}

fn first_text(html: &str, selector: &str) -> Result<Option<String>, AppError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).next().map(visible_text))
}

/// Text a reader would see: script and style contents skipped, whitespace
/// collapsed.
fn visible_text(element: ElementRef<'_>) -> String {
    let words: Vec<&str> = element
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
            })
        })
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect();
    words.join(" ")
}

/// Evaluate a [`MetadataQuery`] against static markup, the same way the
/// in-page script does in a real browser. Relative links resolve against
/// `base`.
pub fn evaluate_metadata(html: &str, base: &Url, query: &MetadataQuery) -> RawMetadata {
    let document = Html::parse_document(html);

    let name_candidates = query
        .name_selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|s| document.select(&s).next().map(visible_text))
        .filter(|text| !text.is_empty())
        .collect();

    let title = select_first(&document, "title")
        .map(visible_text)
        .unwrap_or_default();

    // `name`, then `property`, then the Open Graph variant; first non-empty wins.
    let meta = |name: &str| {
        [
            format!("meta[name=\"{name}\"]"),
            format!("meta[property=\"{name}\"]"),
            format!("meta[property=\"og:{name}\"]"),
        ]
        .iter()
        .filter_map(|selector| select_first(&document, selector))
        .filter_map(|e| e.value().attr("content"))
        .find(|content| !content.is_empty())
        .unwrap_or_default()
        .to_string()
    };

    let links = match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| base.join(href.trim()).ok())
            .map(|u| u.to_string())
            .collect(),
        Err(_) => Vec::new(),
    };

    RawMetadata {
        name_candidates,
        title,
        description: meta("description"),
        keywords: meta("keywords"),
        links,
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}
