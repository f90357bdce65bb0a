//! Chrome session over the DevTools Protocol

use async_trait::async_trait;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::json;
use std::ffi::OsStr;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use tycoon_core::config::BrowserDefaults;
use tycoon_core::{Result, TycoonError};

use crate::driver::{Locator, OptionMatch, PageDriver, Query, TimeoutPolicy, WaitCondition};

const JS_CLICK: &str = "function() { this.click(); }";

const JS_CLEAR: &str = "function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}";

const JS_SELECT: &str = "function(mode, wanted) {
    for (const option of this.options) {
        const label = option.text.trim();
        const hit = mode === 'exact'
            ? label === wanted
            : label.toLowerCase().includes(wanted.toLowerCase());
        if (hit) {
            this.value = option.value;
            this.dispatchEvent(new Event('change', { bubbles: true }));
            return label;
        }
    }
    return null;
}";

const JS_SUBMIT: &str = "function() {
    const form = this.form || this.closest('form');
    if (!form) { return false; }
    form.submit();
    return true;
}";

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Navigation timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            timeout_seconds: 30,
        }
    }
}

impl BrowserConfig {
    /// Build from the `[browser]` section of the tool config
    pub fn from_defaults(defaults: &BrowserDefaults, headless: bool) -> Self {
        Self {
            headless,
            window_width: defaults.window_width,
            window_height: defaults.window_height,
            user_agent: defaults.user_agent.clone(),
            timeout_seconds: defaults.timeout_seconds,
        }
    }
}

fn browser_err(action: &str, target: impl Display, e: impl Display) -> TycoonError {
    TycoonError::Browser(format!("{} {} failed: {}", action, target, e))
}

fn is_missing(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NoElementFound>().is_some()
}

/// Missing elements are transient, every other lookup failure is a browser error
fn lookup_err(locator: &Locator, e: anyhow::Error) -> TycoonError {
    if is_missing(&e) {
        TycoonError::TransientLookup(format!("{}: {}", locator, e))
    } else {
        browser_err("find", locator, e)
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
    /// Configuration
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a new browser instance with default configuration
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| TycoonError::Browser(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> =
            config.user_agent.as_ref().map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| TycoonError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| TycoonError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Default wait used by flows that do not bring their own
    pub fn default_timeout(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(Duration::from_secs(self.config.timeout_seconds))
    }

    /// Close the tab, then shut Chrome down with the session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        self.tab
            .close(true)
            .map_err(|e| TycoonError::Browser(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }

    fn element(&self, locator: &Locator) -> Result<Element<'_>> {
        let found = match locator.query() {
            Query::Css(css) => self.tab.find_element(&css),
            Query::XPath(xpath) => self.tab.find_element_by_xpath(&xpath),
        };
        found.map_err(|e| lookup_err(locator, e))
    }

    fn elements(&self, locator: &Locator) -> Result<Vec<Element<'_>>> {
        let found = match locator.query() {
            Query::Css(css) => self.tab.find_elements(&css),
            Query::XPath(xpath) => self.tab.find_elements_by_xpath(&xpath),
        };
        match found {
            Ok(elements) => Ok(elements),
            Err(e) if is_missing(&e) => {
                debug!("No elements for {}", locator);
                Ok(Vec::new())
            }
            Err(e) => Err(browser_err("find", locator, e)),
        }
    }

    fn call(
        &self,
        locator: &Locator,
        action: &str,
        js: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<Option<serde_json::Value>> {
        let element = self.element(locator)?;
        let result = element
            .call_js_fn(js, args, false)
            .map_err(|e| browser_err(action, locator, e))?;
        Ok(result.value)
    }

    /// `Ok(false)` while the element is missing, `Err` on browser failure
    fn condition_met(&self, condition: &WaitCondition) -> Result<bool> {
        let WaitCondition::Present(locator) = condition;
        match self.element(locator) {
            Ok(_) => Ok(true),
            Err(e) if e.is_transient() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    #[instrument(skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| TycoonError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| TycoonError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    async fn find_text(&self, locator: &Locator) -> Result<String> {
        self.element(locator)?
            .get_inner_text()
            .map_err(|e| browser_err("read", locator, e))
    }

    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>> {
        self.elements(locator)?
            .iter()
            .map(|el| el.get_inner_text().map_err(|e| browser_err("read", locator, e)))
            .collect()
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> Result<String> {
        self.element(locator)?
            .get_attribute_value(name)
            .map_err(|e| browser_err("read attribute of", locator, e))?
            .ok_or_else(|| TycoonError::NotFound(format!("{} has no {} attribute", locator, name)))
    }

    async fn all_attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        for el in self.elements(locator)? {
            if let Some(value) = el
                .get_attribute_value(name)
                .map_err(|e| browser_err("read attribute of", locator, e))?
            {
                values.push(value);
            }
        }
        Ok(values)
    }

    #[instrument(skip(self))]
    async fn click(&self, locator: &Locator) -> Result<()> {
        // Dispatched from script so overlays cannot intercept the click
        self.call(locator, "click", JS_CLICK, Vec::new()).map(|_| ())
    }

    #[instrument(skip(self, value))]
    async fn type_into(&self, locator: &Locator, value: &str) -> Result<()> {
        self.element(locator)?
            .type_into(value)
            .map_err(|e| browser_err("type into", locator, e))?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        self.call(locator, "clear", JS_CLEAR, Vec::new()).map(|_| ())
    }

    #[instrument(skip(self))]
    async fn select_option(&self, locator: &Locator, option: &OptionMatch) -> Result<()> {
        let (mode, wanted) = match option {
            OptionMatch::Exact(text) => ("exact", text),
            OptionMatch::Contains(text) => ("contains", text),
        };
        match self.call(locator, "select", JS_SELECT, vec![json!(mode), json!(wanted)])? {
            Some(serde_json::Value::String(label)) => {
                debug!("Selected {:?} in {}", label, locator);
                Ok(())
            }
            _ => Err(TycoonError::NotFound(format!(
                "no option {:?} in {}",
                option, locator
            ))),
        }
    }

    async fn submit(&self, locator: &Locator) -> Result<()> {
        match self.call(locator, "submit", JS_SUBMIT, Vec::new())? {
            Some(serde_json::Value::Bool(true)) => Ok(()),
            _ => Err(TycoonError::Browser(format!("{} is not inside a form", locator))),
        }
    }

    async fn wait_until(&self, condition: &WaitCondition, timeout: &TimeoutPolicy) -> Result<()> {
        debug!("Waiting for {:?} (timeout: {:?})", condition, timeout.timeout);
        let start = Instant::now();

        loop {
            if self.condition_met(condition)? {
                return Ok(());
            }
            if start.elapsed() > timeout.timeout {
                return Err(TycoonError::TransientLookup(format!(
                    "{:?} not met within {:?}",
                    condition, timeout.timeout
                )));
            }
            tokio::time::sleep(timeout.poll_interval).await;
        }
    }
}
