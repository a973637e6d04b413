//! MedAssist Library
//!
//! Core library for the offline medical assistant desktop application.

pub mod app;
pub mod assistant;
pub mod inference;
pub mod storage;
pub mod system;
pub mod types;
pub mod ui;
