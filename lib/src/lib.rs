//! Download historical price data from Yahoo Finance and save it as CSV.

pub mod client;
pub mod config;
pub mod error;
pub mod service;
pub mod types;
