//! Helpers shared by the game flows

use std::time::Duration;
use tycoon_core::{Result, TycoonConfig, TycoonError};

use crate::driver::{Locator, PageDriver, TimeoutPolicy};

/// Wait for the page to finish rendering
pub(crate) async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Element wait derived from the `[browser]` config section
pub(crate) fn page_timeout(config: &TycoonConfig) -> TimeoutPolicy {
    TimeoutPolicy::new(Duration::from_secs(config.browser.timeout_seconds))
}

/// Texts of every match, failing transiently while the list is still empty
pub(crate) async fn require_list(driver: &dyn PageDriver, locator: &Locator) -> Result<Vec<String>> {
    let texts = driver.find_all_text(locator).await?;
    if texts.is_empty() {
        return Err(TycoonError::TransientLookup(format!("{} (empty)", locator)));
    }
    Ok(texts)
}

/// Attribute of every match, failing transiently while nothing carries it
pub(crate) async fn require_attributes(
    driver: &dyn PageDriver,
    locator: &Locator,
    name: &str,
) -> Result<Vec<String>> {
    let values = driver.all_attributes(locator, name).await?;
    if values.is_empty() {
        return Err(TycoonError::TransientLookup(format!("{} @{} (empty)", locator, name)));
    }
    Ok(values)
}

/// Resolve a link taken from an `href` attribute against the game's base URL
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tycoon_core::TycoonConfig;

    /// Config with every delay removed
    pub fn fast_config() -> TycoonConfig {
        let mut config = TycoonConfig::default();
        config.game.base_url = "https://game.test".to_string();
        config.configurator.url = "https://seats.test/index.html".to_string();
        config.retry.lookup_delay_ms = 0;
        config.retry.planning_delay_ms = 0;
        config.retry.planning_step_ms = 0;
        config.delays.settle_ms = 0;
        config.delays.calculate_ms = 0;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://game.test/", "/network/showhub/12"),
            "https://game.test/network/showhub/12"
        );
        assert_eq!(
            absolute_url("https://game.test", "https://other.test/x"),
            "https://other.test/x"
        );
    }
}
