//! # Config Module
//!
//! On-disk settings for the camera: where images live, the exposure
//! control ranges, library policies, the preview rectangle and which
//! filters are offered.

mod manager;
mod models;

pub use manager::ConfigManager;
pub use models::DarkroomConfig;
