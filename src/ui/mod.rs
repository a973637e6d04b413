//! UI components for the medical assistant
//!
//! This module contains all user interface components built with Dioxus.

pub mod answer;
pub mod ask;
pub mod components;
pub mod layout;

pub use layout::Layout;
