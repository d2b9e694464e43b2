//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`classify`] - Property classification of a GeoJSON file
//! - [`config`] - Configuration management (path, list, init)
//! - [`inspect`] - Full point query over a layer list
//! - [`locate`] - Location codes for a coordinate

pub mod classify;
pub mod common;
pub mod config;
pub mod inspect;
pub mod locate;
