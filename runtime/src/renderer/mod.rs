//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). Collectors only
//! ever talk to these traits, which keeps them testable against a scripted
//! fake.

pub mod chromium;

use anyhow::{Context, Result};
use async_trait::async_trait;
use company_scout::Cookie;
use serde::{Deserialize, Serialize};

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// The load event fired.
    Load,
    /// The load event fired and no new network requests were issued for a
    /// short quiet window.
    NetworkIdle,
}

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Attach cookies to this context. Call before navigating.
    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()>;
    /// Navigate to a URL and wait for `readiness`, bounded by `timeout_ms`.
    async fn navigate(
        &mut self,
        url: &str,
        readiness: Readiness,
        timeout_ms: u64,
    ) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full rendered page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Read an attribute of the first element matching `selector`.
    ///
    /// `Ok(None)` means the element exists but lacks the attribute.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;
    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<()>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Whether any element matches `selector`.
    async fn has_element(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let value = self.execute_js(&script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Current `document.body.scrollHeight` in CSS pixels.
    async fn scroll_height(&self) -> Result<u64> {
        let value = self
            .execute_js("document.body ? document.body.scrollHeight : 0")
            .await?;
        value
            .as_f64()
            .map(|h| h.max(0.0) as u64)
            .context("scrollHeight was not a number")
    }

    /// Scroll the window to the bottom of the current document.
    async fn scroll_to_bottom(&self) -> Result<()> {
        self.execute_js("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        Ok(())
    }
}

/// A renderer with no browser behind it. Every context request fails.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}
