//! Ticker logo server
//!
//! Serves one image per stock, crypto or forex ticker from a logos directory.
//! The directory is indexed once at startup; tickers missing from the index
//! trigger an on-demand rescan so newly added files are picked up.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod logos;
pub mod server;
