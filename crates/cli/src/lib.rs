//! wssh command-line client.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod terminal;
