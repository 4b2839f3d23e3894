//! hostadm - menu-driven Linux host administration toolkit.
//!
//! The binary crate: CLI and settings, the ratatui menu interface, and the
//! audit log of administrative actions. All host logic lives in
//! `hostadm-core`.

pub mod audit;
pub mod config;
pub mod state;
pub mod ui;
