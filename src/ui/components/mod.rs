//! Small reusable widgets

pub mod disclaimer;
pub mod slider;
pub mod status;
