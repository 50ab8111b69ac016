//! A personal finance ledger: transactions in user-defined categories, a monthly summary and an
//! expense forecast, available from the command line and as an MCP server.

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod mcp;
pub mod model;
pub mod report;
mod utils;


pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
