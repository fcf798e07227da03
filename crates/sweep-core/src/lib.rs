//! Core types and configuration for the sweep collection agent.
//!
//! Defines the [`PostRecord`] data model shared by collectors, store, and
//! coordinator, plus the two configuration layers: env-based [`AppConfig`]
//! and the file-based platforms document.

pub mod app_config;
pub mod config;
pub mod error;
pub mod platforms;
pub mod post;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use platforms::{
    load_or_init_platforms, FacebookConfig, ForumsConfig, PlatformsConfig, RedditConfig,
    TwitterConfig,
};
pub use post::PostRecord;
