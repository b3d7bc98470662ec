pub mod analytics;
pub mod api;
pub mod config;
pub mod models;
pub mod redirect;
pub mod shortcode;
pub mod storage;
