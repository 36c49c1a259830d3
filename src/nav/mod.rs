//! Category navigation: scroll-spy, active-category reconciliation, routing.
//!
//! # Module Structure
//!
//! - `scroll_spy` - which section sits under the tab bar; programmatic jumps
//! - `category_state` - precedence between external, click and spy writes; highlight geometry
//! - `throttle` - one scroll/resize flush per frame
//! - `route` - deep-link parsing for the externally injected category

mod category_state;
mod route;
mod scroll_spy;
mod throttle;

pub use category_state::{
    Bounds, CategoryNavigationState, HighlightRect, MeasuredTabBar, Rejection, TabLayout,
    UpdateSource,
};
pub use route::Route;
pub use scroll_spy::{
    MeasureTop, ScrollBehavior, ScrollRequest, ScrollSpyCoordinator, SpyConfig, SpyState,
};
pub use throttle::{FrameThrottle, FrameWork};
