pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod monitor;
pub mod progress;
pub mod schedule;
pub mod stats;
