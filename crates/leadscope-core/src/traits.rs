use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LaunchOptions;
use crate::error::AppError;

/// Browser window size applied before navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// The `load` event fired.
    Load,
    /// No new network activity for `idle` after load.
    NetworkIdle { idle: Duration },
}

impl Default for WaitCondition {
    fn default() -> Self {
        WaitCondition::NetworkIdle {
            idle: Duration::from_millis(500),
        }
    }
}

/// Selectors sent into the page to collect metadata.
///
/// Only plain data crosses the page boundary; the page answers with a
/// [`RawMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataQuery {
    /// Candidate selectors for the company name, in priority order.
    pub name_selectors: Vec<String>,
}

/// What the page reports back for a [`MetadataQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetadata {
    /// Trimmed text of the first element matching each name selector, same
    /// order as the query; empty when nothing matched.
    pub name_candidates: Vec<String>,
    pub title: String,
    pub description: String,
    pub keywords: String,
    /// Absolute `href` of every anchor, in document order.
    pub links: Vec<String>,
}

/// Starts browser sessions.
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    fn launch(
        &self,
        options: &LaunchOptions,
    ) -> impl Future<Output = Result<Self::Session, AppError>> + Send;
}

/// One browser process, shared by every page of a batch.
pub trait BrowserSession: Send + Sync {
    type Page: BrowserPage;

    fn new_page(&self) -> impl Future<Output = Result<Self::Page, AppError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// One browsing context, owned by a single scrape attempt.
pub trait BrowserPage: Send + Sync {
    fn set_user_agent(&self, user_agent: &str)
    -> impl Future<Output = Result<(), AppError>> + Send;

    fn set_viewport(&self, viewport: Viewport) -> impl Future<Output = Result<(), AppError>> + Send;

    fn navigate(
        &self,
        url: &str,
        wait: WaitCondition,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Resolves once `selector` matches, or fails after `timeout`.
    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Serialized DOM of the current document.
    fn content(&self) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Rendered text of the first element matching `selector`.
    fn inner_text(&self, selector: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    fn query_metadata(
        &self,
        query: &MetadataQuery,
    ) -> impl Future<Output = Result<RawMetadata, AppError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}
