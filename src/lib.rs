//! Chartdeck: download chart images for a symbol list and bind them into a PDF.

pub mod config;
pub mod core;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pdf;
pub mod services;
