//! Utility functions shared by the core and the terminal front-end.
//!
//! - **Text**: Unicode-aware width calculation and truncation
//! - **Tasks**: panic capture for spawned background work
//!
//! ```
//! use nami::util::{display_width, truncate_to_width};
//!
//! assert_eq!(display_width("Viral"), 5);
//! assert_eq!(truncate_to_width("Christmas Special", 10), "Christmas…");
//! ```

mod task;
mod text;

pub use task::catch_task_panic;
pub use text::{display_width, fit_to_width, truncate_to_width};
