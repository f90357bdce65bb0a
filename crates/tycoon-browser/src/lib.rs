//! Browser automation for the airline game and its seat configurator
//!
//! Every flow is written against the [`PageDriver`] trait and takes the tool
//! configuration explicitly. [`BrowserSession`] implements it on top of a
//! Chrome instance driven over the DevTools Protocol; [`MockPageDriver`]
//! serves a static page so flows can be tested without a browser.
//!
//! # Example
//!
//! ```no_run
//! use tycoon_browser::{game, BrowserConfig, BrowserSession};
//! use tycoon_core::{Credentials, TycoonConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TycoonConfig::default();
//!     let session =
//!         BrowserSession::launch_with_config(BrowserConfig::from_defaults(&config.browser, true))
//!             .await?;
//!
//!     game::login(&session, &config, &Credentials::from_env(&config.game)?).await?;
//!     let hub_id = game::find_hub_id(&session, &config, "CGK").await?;
//!     for destination in game::list_destinations(&session, &config, "CGK", hub_id).await? {
//!         println!("CGK - {}", destination);
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`driver`]: locators, the page-driver trait and its mock
//! - [`browser`]: Chrome session
//! - [`game`]: login, hubs, route listing, route stats, line purchase
//! - [`configurator`]: seat configurator and wave scan
//! - [`planning`]: flight scheduling and seat reconfiguration
//! - [`fleet`]: aircraft purchase

pub mod browser;
pub mod configurator;
pub mod driver;
pub mod fleet;
pub mod game;
pub mod planning;

mod flow;

pub use browser::{BrowserConfig, BrowserSession};
pub use configurator::CircuitLeg;
pub use driver::{
    DriverAction, Locator, MockPageDriver, OptionMatch, PageDriver, TimeoutPolicy, WaitCondition,
};
