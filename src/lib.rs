//! cookieheap - collect browser cookies for a site and its parent domains
//!
//! A holder task keeps the collected cookies in memory. The collector queries
//! a cookie store once per domain variant of the active page and merges the
//! results into the holder; the exporter writes the buffer as JSON to the
//! clipboard and clears it.

pub mod browser;
pub mod cli;
pub mod clipboard;
pub mod collector;
pub mod config;
pub mod cookie;
pub mod error;
pub mod exit_code;
pub mod export;
pub mod holder;
pub mod logging;
pub mod output;
pub mod platform;
pub mod session;
pub mod utils;

pub use error::{HeapError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
