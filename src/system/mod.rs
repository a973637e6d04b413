//! System utilities
//!
//! GPU detection used to place the model at load time.

pub mod gpu;
