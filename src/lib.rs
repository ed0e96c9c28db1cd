//! Personal GitHub contribution tracker. Pulls one user's activity in one repository for a given
//! day and keeps a row per day in an Excel workbook, leaving the user's own columns alone.
//!

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod github;
pub mod metrics;
pub mod utils;
pub mod workbook;
