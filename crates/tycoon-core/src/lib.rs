//! # tycoon-core
//!
//! Core types for the Tycoon airline-game automation tools.
//!
//! The pipeline is small: page text scraped by a driver is decoded into
//! [`RouteStats`] and [`WaveStat`] records ([`extract`]), seat configurations
//! are ranked by a [`Metric`] ([`rank`]), and flaky page lookups are wrapped
//! in a bounded retry ([`retry`]). Persistence lives in `tycoon-store`, page
//! automation in `tycoon-browser`.

pub mod config;
pub mod extract;
pub mod rank;
pub mod retry;

mod error;
mod types;

pub use config::{Credentials, TycoonConfig};
pub use error::{Result, TycoonError};
pub use types::*;
