//! Scripted stand-in for the browser, shared by the integration tests.
//!
//! Each URL maps to a [`PageScript`] describing what the page shows per view,
//! how its height evolves while scrolling, and how long its next control
//! stays enabled. Every call the collector makes is appended to a shared
//! [`Event`] log.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use company_scout::Cookie;
use scout_runtime::renderer::{NavigationResult, Readiness, RenderContext, Renderer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Opened,
    Cookies(usize),
    Navigate(String, Readiness),
    Html(usize),
    Scroll,
    Click,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// HTML per view; the last entry repeats once the script runs out.
    pub views: Vec<String>,
    /// Successive `scrollHeight` readings; the last entry repeats.
    pub heights: Vec<u64>,
    /// Whether the next control exists at all.
    pub next_present: bool,
    /// Clicks after which the next control reports `disabled`.
    pub enabled_clicks: usize,
}

impl PageScript {
    pub fn scrolling(views: Vec<String>, heights: Vec<u64>) -> Self {
        Self {
            views,
            heights,
            ..Self::default()
        }
    }

    pub fn paginated(views: Vec<String>, enabled_clicks: usize) -> Self {
        Self {
            views,
            next_present: true,
            enabled_clicks,
            ..Self::default()
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeRenderer {
    pages: Arc<HashMap<String, PageScript>>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl FakeRenderer {
    pub fn new(pages: impl IntoIterator<Item = (String, PageScript)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            events: Arc::default(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.events.lock().unwrap().push(Event::Opened);
        Ok(Box::new(FakeContext {
            pages: Arc::clone(&self.pages),
            events: Arc::clone(&self.events),
            page: None,
            view: AtomicUsize::new(0),
            height_reads: AtomicUsize::new(0),
            clicks: 0,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        let events = self.events();
        let opened = events.iter().filter(|e| **e == Event::Opened).count();
        let closed = events.iter().filter(|e| **e == Event::Closed).count();
        opened - closed
    }
}

struct FakeContext {
    pages: Arc<HashMap<String, PageScript>>,
    events: Arc<Mutex<Vec<Event>>>,
    page: Option<PageScript>,
    /// Index into `views`; scrolling and clicking both reveal the next one.
    view: AtomicUsize,
    height_reads: AtomicUsize,
    clicks: usize,
}

impl FakeContext {
    fn log(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn page(&self) -> Result<&PageScript> {
        match &self.page {
            Some(page) => Ok(page),
            None => bail!("no page loaded"),
        }
    }
}

fn clamped<T: Clone>(items: &[T], index: usize) -> Option<T> {
    items.get(index.min(items.len().saturating_sub(1))).cloned()
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()> {
        self.log(Event::Cookies(cookies.len()));
        Ok(())
    }

    async fn navigate(
        &mut self,
        url: &str,
        readiness: Readiness,
        _timeout_ms: u64,
    ) -> Result<NavigationResult> {
        self.log(Event::Navigate(url.to_string(), readiness));
        let Some(page) = self.pages.get(url) else {
            bail!("navigation to {url} timed out");
        };
        self.page = Some(page.clone());
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn get_html(&self) -> Result<String> {
        let view = self.view.load(Ordering::SeqCst);
        self.log(Event::Html(view));
        Ok(clamped(&self.page()?.views, view).unwrap_or_default())
    }

    async fn attribute(&self, _selector: &str, name: &str) -> Result<Option<String>> {
        let page = self.page()?;
        if name == "disabled" && self.clicks >= page.enabled_clicks {
            return Ok(Some(String::new()));
        }
        Ok(None)
    }

    async fn click(&mut self, _selector: &str) -> Result<()> {
        self.log(Event::Click);
        self.clicks += 1;
        self.view.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log(Event::Closed);
        Ok(())
    }

    async fn has_element(&self, _selector: &str) -> Result<bool> {
        Ok(self.page()?.next_present)
    }

    async fn scroll_height(&self) -> Result<u64> {
        let page = self.page()?;
        let index = self.height_reads.fetch_add(1, Ordering::SeqCst);
        Ok(clamped(&page.heights, index).unwrap_or(0))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.log(Event::Scroll);
        self.view.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A directory listing page showing `names` as company cards.
pub fn directory_page(names: &[&str]) -> String {
    let cards: String = names
        .iter()
        .map(|name| {
            let slug = name.to_lowercase().replace(' ', "-");
            format!(
                r#"<a class="_company_86jzd_338" href="/companies/{slug}">
                     <span class="_coName_86jzd_453">{name}</span>
                     <span class="_coLocation_86jzd_469">San Francisco, CA, USA</span>
                     <div class="text-sm"><span>{name} does things.</span></div>
                   </a>"#
            )
        })
        .collect();
    format!("<html><body><div>{cards}</div></body></html>")
}

/// A professional-network search results page showing `names`.
pub fn network_page(names: &[&str]) -> String {
    let items: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<li>
                     <span class="entity-result__title-text"><a href="https://www.linkedin.com/company/{name}/">{name} (YC S25)</a></span>
                     <div class="entity-result__primary-subtitle">Software Development • New York, NY</div>
                     <p class="entity-result__summary">{name} summary</p>
                   </li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ul role="list">{items}</ul></body></html>"#)
}
