//! Terminal User Interface module.
//!
//! The terminal plays the browser: it renders the explore page, reports
//! scroll and resize, and performs the scroll jumps the navigation core asks
//! for.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and mouse handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch, overlays
//! - `explore` - Tab bar and masonry page
//! - `helpers` - Page-pixel placement and card drawing
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

mod events;
mod explore;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
