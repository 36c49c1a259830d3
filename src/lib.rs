//! Nami Video in the terminal.
//!
//! The core is the explore page: category sections laid out as masonry
//! columns ([`layout`]), a scroll-spy that reports which section is in view
//! and a single authority over the active category tab ([`nav`]), wired
//! together per page by [`home::HomePage`]. The rest is the application
//! around it: a mock catalog, session gating, remix drafts, local storage and
//! a ratatui front-end.

pub mod app;
pub mod catalog;
pub mod config;
pub mod gallery;
pub mod home;
pub mod keybindings;
pub mod layout;
pub mod nav;
pub mod preferences;
pub mod remix;
pub mod session;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
