//! Meal Streak Tracker Library
//!
//! Meal logging, daily summaries, and logging/goal streaks.

pub mod build_info;
pub mod config;
pub mod db;
pub mod engine;
pub mod mcp;
pub mod models;
pub mod tools;
