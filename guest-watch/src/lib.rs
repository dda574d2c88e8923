//! `guest-watch` library crate.
//!
//! Polls the Proxmox resource table, classifies guest CPU/RAM/disk usage and
//! notifies on escalations into Warning or Critical. The binary entrypoint
//! lives in `main.rs`; modules are public for integration testing.

pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod severity;
pub mod source;
pub mod store;
pub mod table;
pub mod transition;
pub mod units;
