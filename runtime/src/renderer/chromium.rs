//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, Readiness, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, CookieSameSite, SetCookiesParams, TimeSinceEpoch,
};
use chromiumoxide::page::Page;
use company_scout::{Cookie, SameSite};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Desktop user agent presented to both sources.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// How long the resource count must stay flat to call the network idle.
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Installed on every new document. Counts resource loads through an
/// observer, which is not capped by the resource timing buffer.
const RESOURCE_COUNTER_SCRIPT: &str = "window.__scoutResources = 0;
try {
  new PerformanceObserver((list) => {
    window.__scoutResources += list.getEntries().length;
  }).observe({ type: 'resource', buffered: true });
} catch (e) {}";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SCOUT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SCOUT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.company-scout/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".company-scout/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".company-scout/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".company-scout/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".company-scout/chromium/chrome-linux64/chrome"),
                home.join(".company-scout/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launch options for [`ChromiumRenderer`].
#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    /// Explicit browser binary; discovered with [`find_chromium`] when unset.
    pub executable: Option<PathBuf>,
    /// Run without a visible window.
    pub headless: bool,
    /// User agent applied to every new context.
    pub user_agent: String,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    user_agent: String,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance with the given options.
    pub async fn launch(options: ChromiumOptions) -> Result<Self> {
        let chrome_path = match options.executable {
            Some(path) => path,
            None => find_chromium()
                .context("Chromium not found. Install Chrome or set SCOUT_CHROMIUM_PATH.")?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        builder = if options.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            user_agent: options.user_agent,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;
        page.set_user_agent(self.user_agent.as_str())
            .await
            .context("failed to set user agent")?;
        page.evaluate_on_new_document(RESOURCE_COUNTER_SCRIPT)
            .await
            .context("failed to install resource counter")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// Convert a normalized cookie into a CDP cookie parameter.
pub fn cookie_param(cookie: &Cookie) -> Result<CookieParam> {
    let same_site = match cookie.same_site {
        SameSite::None => CookieSameSite::None,
        SameSite::Lax => CookieSameSite::Lax,
        SameSite::Strict => CookieSameSite::Strict,
    };
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .secure(cookie.secure)
        .http_only(cookie.http_only)
        .same_site(same_site);
    if let Some(expires) = cookie.expires {
        builder = builder.expires(TimeSinceEpoch::new(expires as f64));
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("invalid cookie {}: {e}", cookie.name))
}

/// Build the CDP command attaching `cookies` by domain, independent of the
/// tab's current URL.
pub fn set_cookies_params(cookies: &[Cookie]) -> Result<SetCookiesParams> {
    let params = cookies
        .iter()
        .map(cookie_param)
        .collect::<Result<Vec<_>>>()?;
    Ok(SetCookiesParams::new(params))
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    /// Poll the resource timeline until it stops growing or `deadline` passes.
    async fn wait_for_network_idle(&self, deadline: Instant) -> Result<()> {
        let mut last = self.resource_count().await?;
        loop {
            tokio::time::sleep(NETWORK_QUIET_WINDOW).await;
            let current = self.resource_count().await?;
            if current == last {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("network did not go idle before the navigation timeout");
            }
            last = current;
        }
    }

    async fn resource_count(&self) -> Result<u64> {
        let value = self
            .execute_js("window.__scoutResources || 0")
            .await?;
        Ok(value.as_u64().unwrap_or(0))
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()> {
        // `Page::set_cookies` rejects a tab still on about:blank.
        self.page
            .execute(set_cookies_params(cookies)?)
            .await
            .context("failed to attach cookies")?;
        Ok(())
    }

    async fn navigate(
        &mut self,
        url: &str,
        readiness: Readiness,
        timeout_ms: u64,
    ) -> Result<NavigationResult> {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(timeout_ms);

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => bail!("navigation to {url} failed: {e}"),
            Err(_) => bail!("navigation to {url} timed out after {timeout_ms}ms"),
        }

        if readiness == Readiness::NetworkIdle {
            self.wait_for_network_idle(deadline).await?;
        }

        let final_url = self
            .page
            .url()
            .await
            .unwrap_or_default()
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        self.page.content().await.context("failed to get HTML")
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("element not found: {selector}"))?;
        element
            .attribute(name)
            .await
            .with_context(|| format!("failed to read {name} of {selector}"))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("element not found: {selector}"))?;
        element
            .click()
            .await
            .with_context(|| format!("failed to click {selector}"))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}
