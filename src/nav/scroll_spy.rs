//! Scroll-spy: which section currently occupies the top of the viewport.
//!
//! Two inputs drive the coordinator: passive scroll positions and explicit
//! "jump to section" requests. A jump puts the spy into a suppressed state for
//! a quiet period so the smooth scroll it triggers cannot fight the optimistic
//! selection it just made.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Live measurement of a section's top edge in page coordinates.
///
/// Returns `None` while the section is not laid out; such sections are skipped
/// as activation candidates.
pub type MeasureTop = Box<dyn Fn() -> Option<f64> + Send>;

// ============================================================================
// Configuration
// ============================================================================

/// Geometry and timing for the spy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpyConfig {
    /// Height of the fixed page header.
    pub header_height: f64,
    /// Height of the sticky category tab bar.
    pub tab_bar_height: f64,
    /// Extra slack below the tab bar before a section counts as reached.
    pub activation_buffer: f64,
    /// How long spy updates stay disabled after a programmatic jump.
    pub quiet_period: Duration,
}

impl SpyConfig {
    /// Space covered by fixed chrome; a jump lands the section just below it.
    pub fn fixed_offset(&self) -> f64 {
        self.header_height + self.tab_bar_height
    }

    /// A section is active once its top is at or above `scroll + activation_offset`.
    pub fn activation_offset(&self) -> f64 {
        self.fixed_offset() + self.activation_buffer
    }
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            header_height: 72.0,
            tab_bar_height: 56.0,
            activation_buffer: 22.0,
            quiet_period: Duration::from_millis(500),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Spy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyState {
    /// Reacting to scroll events.
    Idle,
    /// Ignoring scroll events until `until`.
    Suppressed { until: Instant },
}

/// How the presentation layer should perform a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Scroll the page so its top sits at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub target: f64,
    pub behavior: ScrollBehavior,
}

// ============================================================================
// Coordinator
// ============================================================================

/// Tracks the active section and mediates programmatic jumps.
pub struct ScrollSpyCoordinator {
    config: SpyConfig,
    /// Declared scan order. Slugs may be declared before they mount.
    order: Vec<String>,
    sections: HashMap<String, MeasureTop>,
    active: Option<String>,
    state: SpyState,
}

impl ScrollSpyCoordinator {
    pub fn new(config: SpyConfig) -> Self {
        Self {
            config,
            order: Vec::new(),
            sections: HashMap::new(),
            active: None,
            state: SpyState::Idle,
        }
    }

    pub fn config(&self) -> &SpyConfig {
        &self.config
    }

    /// Set the order sections are scanned in. Registered sections that are not
    /// part of `slugs` keep their place after the declared ones.
    pub fn declare_order<I, S>(&mut self, slugs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = slugs.into_iter().map(Into::into).collect();
        for slug in &self.order {
            if self.sections.contains_key(slug) && !order.contains(slug) {
                order.push(slug.clone());
            }
        }
        self.order = order;
    }

    /// Register (or replace) the measurable region for `slug`.
    ///
    /// Undeclared slugs are appended to the scan order.
    pub fn register_section<F>(&mut self, slug: &str, measure: F)
    where
        F: Fn() -> Option<f64> + Send + 'static,
    {
        if !self.order.iter().any(|s| s == slug) {
            self.order.push(slug.to_string());
        }
        self.sections.insert(slug.to_string(), Box::new(measure));
    }

    /// Forget the region for `slug`. Its declared position is kept so a
    /// remount lands in the same place.
    pub fn unregister_section(&mut self, slug: &str) {
        self.sections.remove(slug);
    }

    pub fn is_registered(&self, slug: &str) -> bool {
        self.sections.contains_key(slug)
    }

    /// Currently active slug, or `None` when nothing is registered yet.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Current mode, after expiring a finished quiet period.
    pub fn state(&mut self) -> SpyState {
        self.refresh_state(Instant::now());
        self.state
    }

    pub fn is_suppressed(&mut self) -> bool {
        matches!(self.state(), SpyState::Suppressed { .. })
    }

    fn refresh_state(&mut self, now: Instant) {
        if let SpyState::Suppressed { until } = self.state {
            if now >= until {
                tracing::debug!("Scroll-spy quiet period over, resuming");
                self.state = SpyState::Idle;
            }
        }
    }

    /// End suppression early, e.g. because the user grabbed the scrollbar.
    pub fn resume(&mut self) {
        if self.state != SpyState::Idle {
            tracing::debug!("Scroll-spy resumed by user scroll");
            self.state = SpyState::Idle;
        }
    }

    /// Measured tops of mounted sections, in scan order.
    fn measured(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.order.iter().filter_map(|slug| {
            let measure = self.sections.get(slug)?;
            measure().map(|top| (slug.as_str(), top))
        })
    }

    /// Pick the section under the top of the viewport for `scroll_top`.
    ///
    /// The last section (in scan order) whose top has crossed the activation
    /// line wins. If none has crossed, the first mounted section is used.
    pub fn compute_active(&self, scroll_top: f64) -> Option<String> {
        let line = scroll_top + self.config.activation_offset();
        let mut first = None;
        let mut crossed = None;
        for (slug, top) in self.measured() {
            if first.is_none() {
                first = Some(slug);
            }
            if top <= line {
                crossed = Some(slug);
            }
        }
        crossed.or(first).map(str::to_string)
    }

    /// React to a scroll position. Returns the new active slug when it changed.
    ///
    /// Ignored entirely while suppressed.
    pub fn on_scroll(&mut self, scroll_top: f64) -> Option<String> {
        if self.is_suppressed() {
            tracing::trace!(scroll_top, "Scroll ignored while suppressed");
            return None;
        }

        let next = self.compute_active(scroll_top)?;
        if self.active.as_deref() == Some(next.as_str()) {
            return None;
        }
        tracing::debug!(slug = %next, scroll_top, "Scroll-spy activated section");
        self.active = Some(next.clone());
        Some(next)
    }

    /// Jump to a registered section.
    ///
    /// Sets the active slug immediately, suppresses the spy for the quiet
    /// period (replacing any earlier deadline) and returns where the page
    /// should scroll. Unknown or unmeasured slugs are a silent no-op.
    pub fn jump_to(&mut self, slug: &str) -> Option<ScrollRequest> {
        let Some(top) = self.sections.get(slug).and_then(|measure| measure()) else {
            tracing::debug!(slug = %slug, "Jump target not mounted, ignoring");
            return None;
        };

        let until = Instant::now() + self.config.quiet_period;
        self.state = SpyState::Suppressed { until };
        self.active = Some(slug.to_string());

        let target = (top - self.config.fixed_offset()).max(0.0);
        tracing::debug!(slug = %slug, target, "Jumping to section");
        Some(ScrollRequest {
            target,
            behavior: ScrollBehavior::Smooth,
        })
    }

    /// Drop every registration and return to the initial state.
    pub fn reset(&mut self) {
        self.order.clear();
        self.sections.clear();
        self.active = None;
        self.state = SpyState::Idle;
    }
}

impl std::fmt::Debug for ScrollSpyCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSpyCoordinator")
            .field("config", &self.config)
            .field("order", &self.order)
            .field("registered", &self.sections.len())
            .field("active", &self.active)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(buffer: f64) -> SpyConfig {
        SpyConfig {
            header_height: 72.0,
            tab_bar_height: 56.0,
            activation_buffer: buffer,
            quiet_period: Duration::from_millis(500),
        }
    }

    fn spy_with(tops: &[(&str, f64)]) -> ScrollSpyCoordinator {
        let mut spy = ScrollSpyCoordinator::new(SpyConfig::default());
        for (slug, top) in tops {
            let top = *top;
            spy.register_section(slug, move || Some(top));
        }
        spy
    }

    #[test]
    fn test_default_offsets() {
        let cfg = SpyConfig::default();
        assert_eq!(cfg.fixed_offset(), 128.0);
        assert_eq!(cfg.activation_offset(), 150.0);
    }

    #[tokio::test]
    async fn test_selects_last_crossed_section() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0), ("c", 1600.0)]);
        assert_eq!(spy.on_scroll(900.0).as_deref(), Some("b"));
        assert_eq!(spy.active(), Some("b"));
    }

    #[tokio::test]
    async fn test_first_section_when_nothing_crossed() {
        let mut spy = spy_with(&[("a", 400.0), ("b", 900.0)]);
        assert_eq!(spy.on_scroll(0.0).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_unchanged_section_reports_nothing() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0)]);
        assert!(spy.on_scroll(10.0).is_some());
        assert!(spy.on_scroll(20.0).is_none());
    }

    #[tokio::test]
    async fn test_empty_registry_has_no_active() {
        let mut spy = ScrollSpyCoordinator::new(config(22.0));
        assert_eq!(spy.on_scroll(500.0), None);
        assert_eq!(spy.active(), None);
    }

    #[tokio::test]
    async fn test_unmeasured_sections_are_skipped() {
        let mut spy = ScrollSpyCoordinator::new(SpyConfig::default());
        spy.register_section("a", || Some(0.0));
        spy.register_section("b", || None);
        spy.register_section("c", || Some(1000.0));
        assert_eq!(spy.on_scroll(2000.0).as_deref(), Some("c"));
        assert_eq!(spy.compute_active(100.0).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_declared_order_drives_scan() {
        let mut spy = ScrollSpyCoordinator::new(SpyConfig::default());
        spy.declare_order(["a", "b", "c"]);
        // Mount out of order; scan order stays a, b, c.
        spy.register_section("c", || Some(1600.0));
        spy.register_section("a", || Some(0.0));
        spy.register_section("b", || Some(800.0));
        assert_eq!(spy.compute_active(900.0).as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_unregister_removes_candidate() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0)]);
        spy.unregister_section("b");
        assert!(!spy.is_registered("b"));
        assert_eq!(spy.compute_active(5000.0).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_jump_to_unknown_is_noop() {
        let mut spy = spy_with(&[("a", 0.0)]);
        assert!(spy.jump_to("zzz").is_none());
        assert!(!spy.is_suppressed());
        assert_eq!(spy.active(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jump_suppresses_scroll_updates() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0), ("c", 1600.0)]);
        spy.on_scroll(0.0);

        let request = spy.jump_to("b").unwrap();
        assert_eq!(spy.active(), Some("b"));
        assert_eq!(request.target, 800.0 - 128.0);
        assert_eq!(request.behavior, ScrollBehavior::Smooth);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(spy.on_scroll(1700.0), None);
        assert_eq!(spy.active(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spy_resumes_after_quiet_period() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0), ("c", 1600.0)]);
        spy.jump_to("b");

        tokio::time::advance(Duration::from_millis(501)).await;
        assert_eq!(spy.state(), SpyState::Idle);
        assert_eq!(spy.on_scroll(1700.0).as_deref(), Some("c"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_jump_replaces_deadline() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0), ("c", 1600.0)]);
        spy.jump_to("b");
        tokio::time::advance(Duration::from_millis(400)).await;
        spy.jump_to("c");
        tokio::time::advance(Duration::from_millis(400)).await;

        // 800ms after the first jump but only 400ms after the second.
        assert!(spy.is_suppressed());
        assert_eq!(spy.on_scroll(0.0), None);
        assert_eq!(spy.active(), Some("c"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_ends_suppression_early() {
        let mut spy = spy_with(&[("a", 0.0), ("b", 800.0)]);
        spy.jump_to("b");
        spy.resume();
        assert_eq!(spy.on_scroll(0.0).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_jump_target_clamps_at_page_top() {
        let mut spy = spy_with(&[("a", 40.0)]);
        assert_eq!(spy.jump_to("a").unwrap().target, 0.0);
    }

    #[tokio::test]
    async fn test_live_measurement_is_read_on_demand() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;

        let top = Arc::new(AtomicU64::new(5000f64.to_bits()));
        let handle = Arc::clone(&top);
        let mut spy = ScrollSpyCoordinator::new(SpyConfig::default());
        spy.register_section("a", || Some(0.0));
        spy.register_section("b", move || Some(f64::from_bits(handle.load(Ordering::Relaxed))));

        assert_eq!(spy.compute_active(900.0).as_deref(), Some("a"));
        top.store(700f64.to_bits(), Ordering::Relaxed);
        assert_eq!(spy.compute_active(900.0).as_deref(), Some("b"));
    }
}
