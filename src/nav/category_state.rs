//! Active-category reconciliation and tab highlight geometry.
//!
//! Three writers compete for "which category is active": the external value
//! (deep link / route parameter), user tab clicks, and the scroll-spy. They are
//! ranked `External > UserClick > ScrollSpy`. A click or an external value is
//! a deliberate choice: it always applies and holds a claim for the quiet
//! period, so the latest deliberate choice wins. While a claim is held the
//! scroll-spy is rejected. Once the claim lapses the most recent write wins.

use std::time::Duration;
use tokio::time::Instant;

use crate::catalog::Category;

// ============================================================================
// Update Sources
// ============================================================================

/// Who is trying to change the active category. Ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateSource {
    ScrollSpy,
    UserClick,
    External,
}

/// Why a proposed update was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Slug is not one of the loaded categories.
    UnknownSlug,
    /// A click or external value still holds its claim.
    Outranked { holder: UpdateSource },
    /// Already active; nothing to do.
    Unchanged,
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    source: UpdateSource,
    until: Instant,
}

// ============================================================================
// Highlight Geometry
// ============================================================================

/// Horizontal extent of an element, in the tab bar's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub width: f64,
}

/// Underline under the active tab, relative to the tab bar's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HighlightRect {
    pub offset: f64,
    pub extent: f64,
}

impl HighlightRect {
    /// Drawn only after a real measurement, so it never flashes at the origin.
    pub fn is_visible(&self) -> bool {
        self.extent > 0.0
    }
}

/// Measurement access to the rendered tab bar.
pub trait TabLayout {
    /// Bounding box of the bar itself, `None` if not laid out.
    fn bar_bounds(&self) -> Option<Bounds>;
    /// Bounding box of the tab for `slug`, `None` if not mounted.
    fn tab_bounds(&self, slug: &str) -> Option<Bounds>;
}

/// Tab bar whose tabs are laid out left to right with a fixed gap.
#[derive(Debug, Clone, Default)]
pub struct MeasuredTabBar {
    origin: f64,
    gap: f64,
    tabs: Vec<(String, f64)>,
}

impl MeasuredTabBar {
    pub fn new(origin: f64, gap: f64) -> Self {
        Self {
            origin,
            gap,
            tabs: Vec::new(),
        }
    }

    pub fn push(&mut self, slug: impl Into<String>, width: f64) {
        self.tabs.push((slug.into(), width));
    }

    /// Build from `(slug, width)` pairs with no gap.
    pub fn from_widths<'a>(origin: f64, tabs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut bar = Self::new(origin, 0.0);
        for (slug, width) in tabs {
            bar.push(slug, width);
        }
        bar
    }

    /// Tab slugs with their absolute bounds, left to right.
    pub fn iter_bounds(&self) -> impl Iterator<Item = (&str, Bounds)> + '_ {
        let mut left = self.origin;
        self.tabs.iter().map(move |(slug, width)| {
            let bounds = Bounds {
                left,
                width: *width,
            };
            left += width + self.gap;
            (slug.as_str(), bounds)
        })
    }

    /// Slug of the tab under horizontal position `x`, if any.
    pub fn hit_test(&self, x: f64) -> Option<&str> {
        self.iter_bounds()
            .find(|(_, b)| x >= b.left && x < b.left + b.width)
            .map(|(slug, _)| slug)
    }
}

impl TabLayout for MeasuredTabBar {
    fn bar_bounds(&self) -> Option<Bounds> {
        let count = self.tabs.len();
        let width: f64 = self.tabs.iter().map(|(_, w)| w).sum::<f64>()
            + count.saturating_sub(1) as f64 * self.gap;
        Some(Bounds {
            left: self.origin,
            width,
        })
    }

    fn tab_bounds(&self, slug: &str) -> Option<Bounds> {
        self.iter_bounds().find(|(s, _)| *s == slug).map(|(_, b)| b)
    }
}

// ============================================================================
// Navigation State
// ============================================================================

/// Active category plus the geometry of its highlight.
#[derive(Debug)]
pub struct CategoryNavigationState {
    categories: Vec<Category>,
    active: Option<String>,
    highlight: HighlightRect,
    /// Last external value seen; external writes apply only when this changes.
    last_external: Option<String>,
    /// External value received before categories were loaded.
    pending_external: Option<String>,
    claim: Option<Claim>,
    claim_window: Duration,
    highlight_dirty: bool,
}

impl CategoryNavigationState {
    pub fn new(claim_window: Duration) -> Self {
        Self {
            categories: Vec::new(),
            active: None,
            highlight: HighlightRect::default(),
            last_external: None,
            pending_external: None,
            claim: None,
            claim_window,
            highlight_dirty: false,
        }
    }

    /// Active slug, empty before categories are loaded.
    pub fn active_slug(&self) -> &str {
        self.active.as_deref().unwrap_or("")
    }

    pub fn active_category(&self) -> Option<&Category> {
        let active = self.active.as_deref()?;
        self.categories.iter().find(|c| c.slug == active)
    }

    pub fn active_index(&self) -> Option<usize> {
        let active = self.active.as_deref()?;
        self.categories.iter().position(|c| c.slug == active)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn highlight(&self) -> HighlightRect {
        self.highlight
    }

    /// True when geometry inputs changed since the last measurement.
    pub fn needs_measure(&self) -> bool {
        self.highlight_dirty
    }

    fn is_known(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }

    fn set_active(&mut self, slug: &str) {
        if self.active.as_deref() != Some(slug) {
            self.active = Some(slug.to_string());
            self.highlight_dirty = true;
        }
    }

    /// Install the category list.
    ///
    /// The first non-empty list picks a default exactly once: a pending
    /// external value if it names a known category, otherwise the first
    /// category. Later lists keep the current selection unless it vanished.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.highlight_dirty = true;

        if self.categories.is_empty() {
            return;
        }

        match self.active.clone() {
            None => {
                let pending = self.pending_external.take();
                let chosen = match pending {
                    Some(slug) if self.is_known(&slug) => {
                        self.last_external = Some(slug.clone());
                        self.claim = Some(Claim {
                            source: UpdateSource::External,
                            until: Instant::now() + self.claim_window,
                        });
                        slug
                    }
                    _ => self.categories[0].slug.clone(),
                };
                tracing::debug!(slug = %chosen, "Default active category selected");
                self.set_active(&chosen);
            }
            Some(current) if !self.is_known(&current) => {
                let fallback = self.categories[0].slug.clone();
                tracing::warn!(
                    previous = %current,
                    fallback = %fallback,
                    "Active category disappeared from list, falling back"
                );
                self.set_active(&fallback);
            }
            Some(_) => {}
        }
    }

    /// Feed the externally injected value (route parameter).
    ///
    /// Applies only when present and different from the last external value;
    /// then it overrides whatever is active. Returns `true` if the active
    /// category changed.
    pub fn apply_external(&mut self, value: Option<&str>) -> bool {
        let Some(slug) = value else {
            return false;
        };
        if self.last_external.as_deref() == Some(slug) {
            return false;
        }

        if self.categories.is_empty() {
            self.pending_external = Some(slug.to_string());
            return false;
        }

        self.last_external = Some(slug.to_string());
        // A route echoing the active slug (e.g. after a click) keeps the
        // current claim as it is
        if self.active.as_deref() == Some(slug) {
            return false;
        }
        self.propose(UpdateSource::External, slug).is_ok()
    }

    /// Offer a new active slug from `source`.
    pub fn propose(&mut self, source: UpdateSource, slug: &str) -> Result<(), Rejection> {
        self.propose_at(source, slug, Instant::now())
    }

    fn propose_at(
        &mut self,
        source: UpdateSource,
        slug: &str,
        now: Instant,
    ) -> Result<(), Rejection> {
        if !self.is_known(slug) {
            tracing::debug!(?source, slug = %slug, "Rejected unknown category");
            return Err(Rejection::UnknownSlug);
        }

        if let Some(claim) = self.claim {
            if now >= claim.until {
                self.claim = None;
            } else if source == UpdateSource::ScrollSpy {
                tracing::trace!(?source, holder = ?claim.source, slug = %slug, "Update outranked");
                return Err(Rejection::Outranked {
                    holder: claim.source,
                });
            }
        }

        if source > UpdateSource::ScrollSpy {
            self.claim = Some(Claim {
                source,
                until: now + self.claim_window,
            });
        }

        if self.active.as_deref() == Some(slug) {
            return Err(Rejection::Unchanged);
        }

        tracing::debug!(?source, slug = %slug, "Active category changed");
        self.set_active(slug);
        Ok(())
    }

    /// Drop any held claim so the next scroll-spy update applies.
    pub fn release_claim(&mut self) {
        self.claim = None;
    }

    /// Viewport resized; the highlight must be re-measured.
    pub fn on_resize(&mut self) {
        self.highlight_dirty = true;
    }

    /// Measure the active tab against its bar and update the highlight.
    ///
    /// An unmeasurable tab or bar yields a zero-extent highlight.
    pub fn recompute_highlight(&mut self, layout: &dyn TabLayout) -> HighlightRect {
        let measured = self.active.as_deref().and_then(|slug| {
            let bar = layout.bar_bounds()?;
            let tab = layout.tab_bounds(slug)?;
            Some(HighlightRect {
                offset: tab.left - bar.left,
                extent: tab.width.max(0.0),
            })
        });
        self.highlight = measured.unwrap_or_default();
        self.highlight_dirty = false;
        self.highlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    fn cats(slugs: &[&str]) -> Vec<Category> {
        slugs
            .iter()
            .enumerate()
            .map(|(i, s)| Category::new(&(i + 1).to_string(), s, &s.to_uppercase(), None))
            .collect()
    }

    fn loaded(slugs: &[&str]) -> CategoryNavigationState {
        let mut nav = CategoryNavigationState::new(WINDOW);
        nav.set_categories(cats(slugs));
        nav
    }

    #[test]
    fn test_empty_before_load() {
        let nav = CategoryNavigationState::new(WINDOW);
        assert_eq!(nav.active_slug(), "");
        assert!(!nav.highlight().is_visible());
    }

    #[tokio::test]
    async fn test_defaults_to_first_category_once() {
        let mut nav = CategoryNavigationState::new(WINDOW);
        nav.set_categories(Vec::new());
        assert_eq!(nav.active_slug(), "");

        nav.set_categories(cats(&["a", "b", "c"]));
        assert_eq!(nav.active_slug(), "a");

        nav.propose(UpdateSource::ScrollSpy, "b").unwrap();
        nav.set_categories(cats(&["c", "b", "a"]));
        assert_eq!(nav.active_slug(), "b");
    }

    #[tokio::test]
    async fn test_vanished_active_falls_back_to_first() {
        let mut nav = loaded(&["a", "b"]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        nav.set_categories(cats(&["x", "y"]));
        assert_eq!(nav.active_slug(), "x");
    }

    #[tokio::test]
    async fn test_external_before_load_wins_default() {
        let mut nav = CategoryNavigationState::new(WINDOW);
        assert!(!nav.apply_external(Some("c")));
        nav.set_categories(cats(&["a", "b", "c"]));
        assert_eq!(nav.active_slug(), "c");
    }

    #[tokio::test]
    async fn test_unknown_external_before_load_falls_back() {
        let mut nav = CategoryNavigationState::new(WINDOW);
        nav.apply_external(Some("nope"));
        nav.set_categories(cats(&["a", "b"]));
        assert_eq!(nav.active_slug(), "a");
    }

    #[tokio::test]
    async fn test_external_applies_only_when_changed() {
        let mut nav = loaded(&["a", "b", "c"]);
        assert!(nav.apply_external(Some("b")));
        nav.release_claim();
        nav.propose(UpdateSource::UserClick, "c").unwrap();

        // Same external value again: ignored.
        assert!(!nav.apply_external(Some("b")));
        assert_eq!(nav.active_slug(), "c");
        // Absent: ignored.
        assert!(!nav.apply_external(None));
        // Changed: overrides a held click claim.
        assert!(nav.apply_external(Some("a")));
        assert_eq!(nav.active_slug(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_outranks_concurrent_spy() {
        let mut nav = loaded(&["a", "b", "c"]);
        nav.propose(UpdateSource::UserClick, "c").unwrap();

        let rejected = nav.propose(UpdateSource::ScrollSpy, "b");
        assert_eq!(
            rejected,
            Err(Rejection::Outranked {
                holder: UpdateSource::UserClick
            })
        );
        assert_eq!(nav.active_slug(), "c");

        tokio::time::advance(WINDOW).await;
        nav.propose(UpdateSource::ScrollSpy, "b").unwrap();
        assert_eq!(nav.active_slug(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_replaces_click() {
        let mut nav = loaded(&["a", "b", "c"]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        nav.propose(UpdateSource::UserClick, "c").unwrap();
        assert_eq!(nav.active_slug(), "c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_after_external_applies() {
        let mut nav = loaded(&["a", "b", "c"]);
        assert!(nav.apply_external(Some("b")));
        nav.propose(UpdateSource::UserClick, "c").unwrap();
        assert_eq!(nav.active_slug(), "c");

        // The click now holds the claim against the spy
        assert_eq!(
            nav.propose(UpdateSource::ScrollSpy, "a"),
            Err(Rejection::Outranked {
                holder: UpdateSource::UserClick
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_claim_blocks_spy_until_window_ends() {
        let mut nav = loaded(&["a", "b", "c"]);
        nav.apply_external(Some("b"));
        assert!(nav.propose(UpdateSource::ScrollSpy, "c").is_err());
        tokio::time::advance(WINDOW).await;
        nav.propose(UpdateSource::ScrollSpy, "c").unwrap();
        assert_eq!(nav.active_slug(), "c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_echo_of_click_keeps_click_claim() {
        let mut nav = loaded(&["a", "b", "c"]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        assert!(!nav.apply_external(Some("b")));
        assert_eq!(
            nav.propose(UpdateSource::ScrollSpy, "a"),
            Err(Rejection::Outranked {
                holder: UpdateSource::UserClick
            })
        );
        nav.propose(UpdateSource::UserClick, "c").unwrap();
        assert_eq!(nav.active_slug(), "c");
    }

    #[tokio::test]
    async fn test_unknown_slug_rejected() {
        let mut nav = loaded(&["a"]);
        assert_eq!(
            nav.propose(UpdateSource::UserClick, "zzz"),
            Err(Rejection::UnknownSlug)
        );
        assert_eq!(nav.active_slug(), "a");
    }

    #[tokio::test]
    async fn test_release_claim_lets_spy_through() {
        let mut nav = loaded(&["a", "b"]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        nav.release_claim();
        nav.propose(UpdateSource::ScrollSpy, "a").unwrap();
        assert_eq!(nav.active_slug(), "a");
    }

    #[tokio::test]
    async fn test_highlight_zero_until_measured() {
        let mut nav = loaded(&["a", "b", "c"]);
        assert_eq!(nav.highlight().extent, 0.0);
        assert!(nav.needs_measure());

        let bar = MeasuredTabBar::from_widths(0.0, [("a", 80.0), ("b", 120.0), ("c", 90.0)]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        let rect = nav.recompute_highlight(&bar);
        assert_eq!(rect, HighlightRect { offset: 80.0, extent: 120.0 });
        assert!(rect.is_visible());
        assert!(!nav.needs_measure());
    }

    #[tokio::test]
    async fn test_highlight_relative_to_bar_with_gap() {
        let mut nav = loaded(&["a", "b", "c"]);
        let mut bar = MeasuredTabBar::new(10.0, 4.0);
        bar.push("a", 80.0);
        bar.push("b", 120.0);
        bar.push("c", 90.0);
        nav.propose(UpdateSource::UserClick, "c").unwrap();
        let rect = nav.recompute_highlight(&bar);
        assert_eq!(rect.offset, 80.0 + 4.0 + 120.0 + 4.0);
        assert_eq!(rect.extent, 90.0);
    }

    #[tokio::test]
    async fn test_unmounted_tab_hides_highlight() {
        let mut nav = loaded(&["a", "b"]);
        let bar = MeasuredTabBar::from_widths(0.0, [("a", 50.0)]);
        nav.propose(UpdateSource::UserClick, "b").unwrap();
        assert!(!nav.recompute_highlight(&bar).is_visible());
    }

    #[test]
    fn test_hit_test() {
        let bar = MeasuredTabBar::from_widths(2.0, [("a", 10.0), ("b", 6.0)]);
        assert_eq!(bar.hit_test(2.0), Some("a"));
        assert_eq!(bar.hit_test(12.0), Some("b"));
        assert_eq!(bar.hit_test(18.0), None);
        assert_eq!(bar.hit_test(0.0), None);
    }

    #[test]
    fn test_source_order_is_total() {
        assert!(UpdateSource::External > UpdateSource::UserClick);
        assert!(UpdateSource::UserClick > UpdateSource::ScrollSpy);
    }
}
