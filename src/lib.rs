pub mod api;
#[cfg(feature = "desktop")]
pub mod camera;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod pose;
pub mod profile;
pub mod render;
pub mod report;
#[cfg(feature = "desktop")]
pub mod scoring;
pub mod session;
pub mod submit;
pub mod trace;
