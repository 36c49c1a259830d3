//! Explore page controller.
//!
//! Owns everything the explore feed needs between two renders: the load
//! lifecycle of the catalog fetch, the memoized column assignments, the page
//! geometry, the scroll-spy and the active-category state. The presentation
//! layer feeds it events (scroll, resize, tab click, route change, frame tick)
//! and reads back data to draw.
//!
//! # Load lifecycle
//!
//! Each [`HomePage::start_load`] bumps a generation counter and spawns the
//! fetch. The spawned task reports a [`HomeLoaded`] tagged with that
//! generation; [`HomePage::handle_loaded`] drops anything that is not from the
//! latest request, so a stale or cancelled fetch never mutates the page.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{CatalogError, CatalogService, CategorySection, HomeData};
use crate::config::Config;
use crate::layout::{ColumnAssignment, ColumnCache, ItemSequencer, PageGeometry, PageMetrics};
use crate::nav::{
    CategoryNavigationState, FrameThrottle, HighlightRect, Rejection, Route, ScrollRequest,
    ScrollSpyCoordinator, SpyConfig, TabLayout, UpdateSource,
};
use crate::util::catch_task_panic;

// ============================================================================
// Events & State
// ============================================================================

/// Completion of a home data fetch.
#[derive(Debug)]
pub struct HomeLoaded {
    pub generation: u64,
    pub result: Result<HomeData, CatalogError>,
}

/// Where the page is in its data lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Fetch rejected; retry by starting a new load.
    Failed(String),
}

/// What a tab click asks of the outside world.
#[derive(Debug, Clone, PartialEq)]
pub struct TabClick {
    /// Path the router should navigate to.
    pub path: String,
    /// Scroll to perform, `None` when the section is not mounted yet.
    pub scroll: Option<ScrollRequest>,
}

// ============================================================================
// Controller
// ============================================================================

pub struct HomePage {
    sequencer: ItemSequencer,
    cache: ColumnCache,
    metrics: PageMetrics,
    spy: ScrollSpyCoordinator,
    nav: CategoryNavigationState,
    throttle: FrameThrottle,
    /// Shared with the spy's measure closures.
    geometry: Arc<RwLock<PageGeometry>>,
    sections: Vec<CategorySection>,
    columns: Vec<Arc<ColumnAssignment>>,
    state: LoadState,
    generation: u64,
    load_handle: Option<JoinHandle<()>>,
    scroll_top: f64,
    viewport_height: f64,
    /// External category whose jump waits for the sections to mount.
    pending_external_jump: Option<String>,
    pending_scroll: Option<ScrollRequest>,
}

impl HomePage {
    pub fn new(columns: usize, metrics: PageMetrics, spy_config: SpyConfig) -> Self {
        let claim_window = spy_config.quiet_period;
        Self {
            sequencer: ItemSequencer::new(columns),
            cache: ColumnCache::default(),
            metrics,
            spy: ScrollSpyCoordinator::new(spy_config),
            nav: CategoryNavigationState::new(claim_window),
            throttle: FrameThrottle::new(),
            geometry: Arc::new(RwLock::new(PageGeometry::default())),
            sections: Vec::new(),
            columns: Vec::new(),
            state: LoadState::Idle,
            generation: 0,
            load_handle: None,
            scroll_top: 0.0,
            viewport_height: 0.0,
            pending_external_jump: None,
            pending_scroll: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.columns, config.page_metrics(), config.spy_config())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn nav(&self) -> &CategoryNavigationState {
        &self.nav
    }

    pub fn spy(&self) -> &ScrollSpyCoordinator {
        &self.spy
    }

    pub fn active_slug(&self) -> &str {
        self.nav.active_slug()
    }

    pub fn highlight(&self) -> HighlightRect {
        self.nav.highlight()
    }

    pub fn metrics(&self) -> &PageMetrics {
        &self.metrics
    }

    pub fn column_count(&self) -> usize {
        self.sequencer.columns()
    }

    /// Sections paired with their column assignment, in page order.
    pub fn sections(&self) -> impl Iterator<Item = (&CategorySection, &ColumnAssignment)> {
        self.sections
            .iter()
            .zip(self.columns.iter().map(|c| c.as_ref()))
    }

    /// Snapshot of the current page geometry.
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
            .read()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn max_scroll(&self) -> f64 {
        self.geometry().max_scroll(self.viewport_height)
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Start fetching home data, superseding any fetch in flight.
    ///
    /// The result arrives on `tx` as `E::from(HomeLoaded { .. })`.
    pub fn start_load<S, E>(&mut self, catalog: Arc<S>, tx: &mpsc::Sender<E>) -> u64
    where
        S: CatalogService,
        E: From<HomeLoaded> + Send + 'static,
    {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous home data load");
        }

        self.generation += 1;
        let generation = self.generation;
        self.state = LoadState::Loading;
        tracing::info!(generation, "Loading home data");

        let tx = tx.clone();
        self.load_handle = Some(tokio::spawn(async move {
            let result = match catch_task_panic(async { catalog.fetch_home_data().await }).await {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task = "home_load", error = %panic_msg, "Background task panicked");
                    Err(CatalogError::Unavailable(panic_msg))
                }
            };
            if let Err(e) = tx.send(E::from(HomeLoaded { generation, result })).await {
                tracing::warn!(error = %e, event = "HomeLoaded", "Channel send failed (receiver dropped)");
            }
        }));
        generation
    }

    /// Abandon the fetch in flight. A result that still arrives is ignored.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
        }
        if self.state == LoadState::Loading {
            self.generation += 1;
            self.state = LoadState::Idle;
            tracing::debug!("Home data load cancelled");
        }
    }

    /// Apply a fetch result. Returns `false` when it was stale and dropped.
    pub fn handle_loaded(&mut self, loaded: HomeLoaded) -> bool {
        if loaded.generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = loaded.generation,
                "Ignoring stale home data (generation mismatch)"
            );
            return false;
        }
        self.load_handle = None;

        match loaded.result {
            Ok(data) => self.install(data),
            Err(e) => {
                tracing::warn!(error = %e, "Home data failed to load");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Install fetched data: categories, layout, spy registrations.
    pub fn install(&mut self, data: HomeData) {
        tracing::info!(
            categories = data.categories.len(),
            sections = data.sections.len(),
            "Home data ready"
        );

        let order: Vec<String> = data.categories.iter().map(|c| c.slug.clone()).collect();
        self.nav.set_categories(data.categories);
        self.sections = data.sections;
        self.relayout();

        self.spy.reset();
        self.spy.declare_order(order);
        for section in &self.sections {
            let slug = section.slug().to_string();
            let geometry = Arc::clone(&self.geometry);
            self.spy.register_section(&section.category.slug, move || {
                geometry.read().ok()?.section(&slug).map(|s| s.top)
            });
        }
        self.state = LoadState::Ready;

        if let Some(slug) = self.pending_external_jump.take() {
            if self.nav.active_slug() == slug {
                self.pending_scroll = self.spy.jump_to(&slug);
            }
        }
        self.throttle.scroll(self.scroll_top);
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// Change the column count and recompute the grid.
    pub fn set_columns(&mut self, columns: usize) {
        if columns == self.sequencer.columns() {
            return;
        }
        tracing::debug!(columns, "Column count changed");
        self.sequencer = ItemSequencer::new(columns);
        self.relayout();
        self.throttle.resize();
    }

    fn relayout(&mut self) {
        let sequencer = self.sequencer;
        self.columns = self
            .sections
            .iter()
            .map(|s| self.cache.get_or_assign(sequencer, &s.items))
            .collect();

        let page = PageGeometry::compute(
            &self.metrics,
            self.sections
                .iter()
                .zip(self.columns.iter())
                .map(|(s, c)| (s.slug(), c.as_ref())),
        );
        match self.geometry.write() {
            Ok(mut geometry) => *geometry = page,
            Err(poisoned) => *poisoned.into_inner() = page,
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Programmatic or animated scroll; applied on the next frame.
    pub fn on_scroll(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top.clamp(0.0, self.max_scroll());
        self.throttle.scroll(self.scroll_top);
    }

    /// Scroll started by the user: ends any suppression and click claim.
    pub fn on_user_scroll(&mut self, scroll_top: f64) {
        self.spy.resume();
        self.nav.release_claim();
        self.pending_scroll = None;
        self.on_scroll(scroll_top);
    }

    pub fn on_resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height.max(0.0);
        self.throttle.resize();
        self.nav.on_resize();
    }

    /// Flush coalesced scroll/resize work. Returns `true` if anything ran.
    pub fn on_frame(&mut self) -> bool {
        let work = self.throttle.take();
        if work.is_empty() {
            return false;
        }

        if work.resized {
            self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
        }

        if let Some(scroll_top) = work.scroll_top {
            self.spy.on_scroll(scroll_top);
            if !self.spy.is_suppressed() {
                self.sync_from_spy();
            }
        }
        true
    }

    fn sync_from_spy(&mut self) {
        let Some(slug) = self.spy.active().map(str::to_string) else {
            return;
        };
        if slug == self.nav.active_slug() {
            return;
        }
        match self.nav.propose(UpdateSource::ScrollSpy, &slug) {
            Ok(()) | Err(Rejection::Unchanged) => {}
            Err(reason) => tracing::trace!(slug = %slug, ?reason, "Scroll-spy update not applied"),
        }
    }

    /// User clicked the tab for `slug`.
    ///
    /// Returns `None` when the click is rejected (unknown slug or outranked).
    pub fn click_tab(&mut self, slug: &str) -> Option<TabClick> {
        match self.nav.propose(UpdateSource::UserClick, slug) {
            Ok(()) | Err(Rejection::Unchanged) => {}
            Err(reason) => {
                tracing::debug!(slug = %slug, ?reason, "Tab click rejected");
                return None;
            }
        }
        let scroll = self.spy.jump_to(slug);
        self.pending_scroll = scroll;
        Some(TabClick {
            path: Route::explore_with_category(slug),
            scroll,
        })
    }

    /// Route parameter changed (or was first read).
    ///
    /// Returns `true` if the active category changed. Values seen before the
    /// data loads are remembered and jumped to once sections mount.
    pub fn set_external_category(&mut self, value: Option<&str>) -> bool {
        let loaded = !self.nav.categories().is_empty();
        let changed = self.nav.apply_external(value);
        match value {
            Some(slug) if !loaded => {
                self.pending_external_jump = Some(slug.to_string());
            }
            Some(slug) if changed => {
                self.pending_scroll = self.spy.jump_to(slug);
            }
            _ => {}
        }
        changed
    }

    /// Scroll the presentation layer should perform, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    /// Re-measure the highlight if its inputs changed.
    pub fn refresh_highlight(&mut self, layout: &dyn TabLayout) -> HighlightRect {
        if self.nav.needs_measure() {
            self.nav.recompute_highlight(layout)
        } else {
            self.nav.highlight()
        }
    }
}

impl Drop for HomePage {
    fn drop(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for HomePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomePage")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("columns", &self.sequencer.columns())
            .field("sections", &self.sections.len())
            .field("active", &self.nav.active_slug())
            .field("scroll_top", &self.scroll_top)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
