//! Shared type definitions
//!
//! This module contains the data types passed between the UI, the answer
//! pipeline and the inference layer.

pub mod model;
pub mod request;
