//! Flat-file cache for Tycoon automation
//!
//! Scraping the game is slow, so everything extracted is written under a data
//! directory and reused on the next run:
//!
//! ```text
//! <data_dir>/
//!   CGK/
//!     SIN.json                      route statistics, one file per route
//!   seat/
//!     CGK_SIN_Boeing_747-400.csv    scanned seat configurations
//! ```
//!
//! - [`routes`]: per-route JSON documents
//! - [`seats`]: per-aircraft seat configuration tables

pub mod routes;
pub mod seats;

pub use routes::RouteStore;
pub use seats::SeatConfigStore;
