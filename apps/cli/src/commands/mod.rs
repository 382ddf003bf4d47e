//! Command implementations for the rebalance CLI.

pub mod alerts;
pub mod apply;
pub mod common;
pub mod config;
pub mod control_points;
pub mod decide;
pub mod plan;

pub use config::ConfigCommand;
