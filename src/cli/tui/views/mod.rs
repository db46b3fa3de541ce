//! Rendering for the TUI

pub mod dialog;
pub mod list;
