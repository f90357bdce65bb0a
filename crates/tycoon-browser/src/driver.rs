//! Page driver abstraction
//!
//! Game flows only talk to a [`PageDriver`]; [`crate::BrowserSession`] drives a
//! real Chrome, [`MockPageDriver`] serves a static page in tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tycoon_core::{Result, TycoonError};

/// How to find an element on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Name(String),
    ClassName(String),
    /// Anchor whose whole visible text equals the value
    LinkText(String),
    Css(String),
    XPath(String),
}

/// Query understood by the browser backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self::XPath(query.into())
    }

    /// `rel` evaluated inside the `index`th (1-based) match of `base`
    pub fn xpath_item(base: &str, index: usize, rel: &str) -> Self {
        Self::XPath(format!("({})[{}]{}", base, index, rel))
    }

    pub fn query(&self) -> Query {
        match self {
            Self::Id(id) => Query::Css(format!("[id={}]", css_string(id))),
            Self::Name(name) => Query::Css(format!("[name={}]", css_string(name))),
            Self::ClassName(class) => Query::Css(format!(".{}", class)),
            Self::LinkText(text) => {
                Query::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(text)))
            }
            Self::Css(selector) => Query::Css(selector.clone()),
            Self::XPath(query) => Query::XPath(query.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Name(name) => write!(f, "[name={}]", name),
            Self::ClassName(class) => write!(f, ".{}", class),
            Self::LinkText(text) => write!(f, "link {:?}", text),
            Self::Css(selector) => write!(f, "{}", selector),
            Self::XPath(query) => write!(f, "{}", query),
        }
    }
}

fn css_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Quote a string for use inside an XPath expression
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// XPath step matching any element carrying `class` among its classes
pub fn class_step(class: &str) -> String {
    format!(
        "*[contains(concat(' ', normalize-space(@class), ' '), ' {} ')]",
        class
    )
}

/// Which `<select>` option to pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionMatch {
    /// Visible text equals the value
    Exact(String),
    /// Visible text contains the value, ignoring case
    Contains(String),
}

impl OptionMatch {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Exact(wanted) => text.trim() == wanted,
            Self::Contains(wanted) => text.to_lowercase().contains(&wanted.to_lowercase()),
        }
    }
}

/// Condition polled by [`PageDriver::wait_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    Present(Locator),
}

/// How long to poll a [`WaitCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl TimeoutPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Capabilities the game flows need from a browser
///
/// Lookups of elements that are not on the page (yet) fail with
/// [`TycoonError::TransientLookup`] so callers can retry them.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Visible text of the first match
    async fn find_text(&self, locator: &Locator) -> Result<String>;

    /// Visible text of every match, empty when nothing matches
    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Attribute of the first match; `NotFound` when the element lacks it
    async fn attribute(&self, locator: &Locator, name: &str) -> Result<String>;

    /// Attribute of every match that has it
    async fn all_attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    async fn type_into(&self, locator: &Locator, value: &str) -> Result<()>;

    async fn clear(&self, locator: &Locator) -> Result<()>;

    /// Choose an option of a `<select>`; `NotFound` when no option matches
    async fn select_option(&self, locator: &Locator, option: &OptionMatch) -> Result<()>;

    /// Submit the form the element belongs to
    async fn submit(&self, locator: &Locator) -> Result<()>;

    async fn wait_until(&self, condition: &WaitCondition, timeout: &TimeoutPolicy) -> Result<()>;
}

/// Action recorded by [`MockPageDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverAction {
    Navigate(String),
    Click(Locator),
    Type(Locator, String),
    Clear(Locator),
    Select(Locator, String),
    Submit(Locator),
}

/// Static in-memory page for testing flows
#[derive(Debug, Default)]
pub struct MockPageDriver {
    texts: HashMap<Locator, String>,
    lists: HashMap<Locator, Vec<String>>,
    attributes: HashMap<(Locator, String), Vec<String>>,
    options: HashMap<Locator, Vec<String>>,
    elements: HashSet<Locator>,
    permissive: bool,
    flaky: Mutex<HashMap<Locator, usize>>,
    actions: Mutex<Vec<DriverAction>>,
}

impl MockPageDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every unknown element as present (clicks and typing succeed)
    pub fn permissive(mut self) -> Self {
        self.permissive = true;
        self
    }

    pub fn with_element(mut self, locator: Locator) -> Self {
        self.elements.insert(locator);
        self
    }

    pub fn with_text(mut self, locator: Locator, text: impl Into<String>) -> Self {
        self.texts.insert(locator, text.into());
        self
    }

    pub fn with_list<S: Into<String>>(
        mut self,
        locator: Locator,
        texts: impl IntoIterator<Item = S>,
    ) -> Self {
        self.lists
            .insert(locator, texts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_attribute(mut self, locator: Locator, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .entry((locator, name.to_string()))
            .or_default()
            .push(value.into());
        self
    }

    pub fn with_options<S: Into<String>>(
        mut self,
        locator: Locator,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        self.options
            .insert(locator, options.into_iter().map(Into::into).collect());
        self
    }

    /// Make the first `failures` lookups of `locator` fail transiently
    pub fn with_flaky(self, locator: Locator, failures: usize) -> Self {
        self.flaky
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(locator, failures);
        self
    }

    /// Everything done to the page so far, in order
    pub fn actions(&self) -> Vec<DriverAction> {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                DriverAction::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Values typed into an element, in order
    pub fn typed_into(&self, locator: &Locator) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                DriverAction::Type(target, value) if &target == locator => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn clicks_on(&self, locator: &Locator) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, DriverAction::Click(target) if target == locator))
            .count()
    }

    fn record(&self, action: DriverAction) {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(action);
    }

    fn check_flaky(&self, locator: &Locator) -> Result<()> {
        let mut flaky = self.flaky.lock().unwrap_or_else(|e| e.into_inner());
        match flaky.get_mut(locator) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(TycoonError::TransientLookup(format!("{} (flaky)", locator)))
            }
            _ => Ok(()),
        }
    }

    fn is_present(&self, locator: &Locator) -> bool {
        self.permissive
            || self.elements.contains(locator)
            || self.texts.contains_key(locator)
            || self.lists.get(locator).is_some_and(|l| !l.is_empty())
            || self.options.contains_key(locator)
            || self.attributes.keys().any(|(l, _)| l == locator)
    }

    fn require(&self, locator: &Locator) -> Result<()> {
        self.check_flaky(locator)?;
        if self.is_present(locator) {
            Ok(())
        } else {
            Err(TycoonError::TransientLookup(locator.to_string()))
        }
    }
}

#[async_trait]
impl PageDriver for MockPageDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(DriverAction::Navigate(url.to_string()));
        Ok(())
    }

    async fn find_text(&self, locator: &Locator) -> Result<String> {
        self.check_flaky(locator)?;
        if let Some(text) = self.texts.get(locator) {
            return Ok(text.clone());
        }
        self.lists
            .get(locator)
            .and_then(|l| l.first())
            .cloned()
            .ok_or_else(|| TycoonError::TransientLookup(locator.to_string()))
    }

    async fn find_all_text(&self, locator: &Locator) -> Result<Vec<String>> {
        self.check_flaky(locator)?;
        if let Some(list) = self.lists.get(locator) {
            return Ok(list.clone());
        }
        Ok(self.texts.get(locator).cloned().into_iter().collect())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> Result<String> {
        self.check_flaky(locator)?;
        if let Some(value) = self
            .attributes
            .get(&(locator.clone(), name.to_string()))
            .and_then(|v| v.first())
        {
            return Ok(value.clone());
        }
        if self.is_present(locator) {
            Err(TycoonError::NotFound(format!("{} has no {} attribute", locator, name)))
        } else {
            Err(TycoonError::TransientLookup(locator.to_string()))
        }
    }

    async fn all_attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>> {
        self.check_flaky(locator)?;
        Ok(self
            .attributes
            .get(&(locator.clone(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.require(locator)?;
        self.record(DriverAction::Click(locator.clone()));
        Ok(())
    }

    async fn type_into(&self, locator: &Locator, value: &str) -> Result<()> {
        self.require(locator)?;
        self.record(DriverAction::Type(locator.clone(), value.to_string()));
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        self.require(locator)?;
        self.record(DriverAction::Clear(locator.clone()));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option: &OptionMatch) -> Result<()> {
        self.check_flaky(locator)?;
        let Some(options) = self.options.get(locator) else {
            return Err(TycoonError::TransientLookup(locator.to_string()));
        };
        let chosen = options
            .iter()
            .find(|text| option.matches(text))
            .ok_or_else(|| TycoonError::NotFound(format!("no option {:?} in {}", option, locator)))?;
        self.record(DriverAction::Select(locator.clone(), chosen.clone()));
        Ok(())
    }

    async fn submit(&self, locator: &Locator) -> Result<()> {
        self.require(locator)?;
        self.record(DriverAction::Submit(locator.clone()));
        Ok(())
    }

    async fn wait_until(&self, condition: &WaitCondition, timeout: &TimeoutPolicy) -> Result<()> {
        let WaitCondition::Present(locator) = condition;
        if self.is_present(locator) {
            Ok(())
        } else {
            Err(TycoonError::TransientLookup(format!(
                "{:?} not met within {:?}",
                condition, timeout.timeout
            )))
        }
    }
}
