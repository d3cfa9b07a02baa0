//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title and status bars, overlays
//! - `input`: keyboard event handling
//! - `styles`: palette and text styling
//! - `pages`: per-route content and the event modals

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
