//! Mizan: multi-tenant expense management API server

pub mod audit;
pub mod auth;
pub mod config;
pub mod domain;
pub mod http_server;
pub mod store;
pub mod uploads;
pub mod utils;

pub use config::Config;
