//! Application state for the terminal front-end.
//!
//! `App` is the application root: it owns the session, the page controllers
//! and the collaborators (catalog, database, preferences). The UI loop mutates
//! it in response to input and background events, then renders it.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::catalog::MockCatalog;
use crate::config::Config;
use crate::gallery::{CategoryGallery, GalleryLoaded, GalleryState};
use crate::home::{HomeLoaded, HomePage, LoadState};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::nav::{MeasuredTabBar, Route};
use crate::preferences::{PreferenceManager, THEME_KEY};
use crate::remix::{ReferenceFile, ReferenceHistory, RemixDraft, RemixGenerated};
use crate::session::SessionContext;
use crate::storage::Database;
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::display_width;

/// Status messages disappear after this long.
const STATUS_TTL_SECS: u64 = 3;
/// Share of the remaining distance a smooth scroll covers per frame.
const SMOOTH_SCROLL_STEP: f64 = 0.35;
pub const MIN_COLUMNS: usize = 1;
pub const MAX_COLUMNS: usize = 8;

// ============================================================================
// Views & Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Explore feed with category tabs.
    Home,
    /// One category's gallery.
    Category,
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Login,
    Remix,
}

/// Events from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    HomeLoaded(HomeLoaded),
    GalleryLoaded(GalleryLoaded),
    RemixGenerated(RemixGenerated),
    /// A write to the preference store failed.
    PersistFailed { what: &'static str, error: String },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

impl From<HomeLoaded> for AppEvent {
    fn from(event: HomeLoaded) -> Self {
        Self::HomeLoaded(event)
    }
}

impl From<GalleryLoaded> for AppEvent {
    fn from(event: GalleryLoaded) -> Self {
        Self::GalleryLoaded(event)
    }
}

impl From<RemixGenerated> for AppEvent {
    fn from(event: RemixGenerated) -> Self {
        Self::RemixGenerated(event)
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    pub db: Database,
    pub catalog: Arc<MockCatalog>,
    pub prefs: PreferenceManager,
    pub keybindings: KeybindingRegistry,
    pub theme: ThemeVariant,
    pub palette: ColorPalette,
    pub session: SessionContext,
    pub home: HomePage,
    pub gallery: Option<CategoryGallery>,
    pub remix: Option<RemixDraft>,
    /// Path being typed in the remix panel.
    pub remix_input: Option<String>,
    pub history: ReferenceHistory,
    pub view: View,
    pub overlay: Option<Overlay>,
    pub help_scroll: usize,
    pub route: Route,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    /// Smooth scroll destination, page pixels.
    pub scroll_target: Option<f64>,
    /// Laid-out tab bar, screen cells from the bar's left edge.
    pub tab_bar: MeasuredTabBar,
    /// Horizontal scroll of the tab bar, cells.
    pub tab_scroll: usize,
    /// Rows available to page content.
    pub content_rows: u16,
    pub columns: usize,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        config: Config,
        db: Database,
        prefs: PreferenceManager,
        history: ReferenceHistory,
    ) -> Self {
        let theme = ThemeVariant::from_str_name(prefs.theme_variant()).unwrap_or_else(|| {
            tracing::warn!(theme = %prefs.theme_variant(), "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(prefs.keybindings()) {
            tracing::warn!("{}", warning);
        }

        let columns = prefs.columns().clamp(MIN_COLUMNS, MAX_COLUMNS);
        let mut home = HomePage::from_config(&config);
        home.set_columns(columns);

        Self {
            catalog: Arc::new(MockCatalog::new(config.catalog.clone())),
            config,
            db,
            prefs,
            keybindings,
            theme,
            palette: theme.palette(),
            session: SessionContext::new(),
            home,
            gallery: None,
            remix: None,
            remix_input: None,
            history,
            view: View::Home,
            overlay: None,
            help_scroll: 0,
            route: Route::Explore { category: None },
            status_message: None,
            needs_redraw: true,
            scroll_target: None,
            tab_bar: MeasuredTabBar::default(),
            tab_scroll: 0,
            content_rows: 0,
            columns,
            spinner_frame: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it is old. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Dispatch context for key lookup.
    pub fn context(&self) -> Context {
        match self.overlay {
            Some(Overlay::Help) => Context::Help,
            Some(Overlay::Login) => Context::LoginModal,
            Some(Overlay::Remix) => Context::Remix,
            None => match self.view {
                View::Home => Context::Home,
                View::Category => Context::Gallery,
                View::Account => Context::Account,
            },
        }
    }

    /// Context of whatever the help overlay is covering.
    pub fn context_behind_help(&self) -> Context {
        match self.view {
            _ if self.remix.is_some() => Context::Remix,
            View::Home => Context::Home,
            View::Category => Context::Gallery,
            View::Account => Context::Account,
        }
    }

    pub fn px_per_row(&self) -> f64 {
        self.config.layout.px_per_row.max(1.0)
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    /// Follow a deep link or in-app navigation.
    pub fn navigate(&mut self, route: Route, tx: &mpsc::Sender<AppEvent>) {
        tracing::debug!(?route, "Navigate");
        // Every page sits on top of the explore data
        if *self.home.state() == LoadState::Idle {
            self.home.start_load(Arc::clone(&self.catalog), tx);
        }
        match &route {
            Route::Explore { category } => {
                self.view = View::Home;
                self.gallery = None;
                self.home.set_external_category(category.as_deref());
                self.scroll_target = None;
            }
            Route::Category { slug } => self.open_gallery(slug, tx),
            Route::Remix { title } => {
                if !self.session.require_auth() {
                    self.overlay = Some(Overlay::Login);
                    return;
                }
                self.remix = Some(RemixDraft::new(title.as_deref()));
                self.remix_input = None;
                self.overlay = Some(Overlay::Remix);
            }
            Route::Account => {
                if !self.session.require_auth() {
                    self.overlay = Some(Overlay::Login);
                    return;
                }
                self.view = View::Account;
            }
            Route::Video { .. } | Route::Edit | Route::Tools { .. } => {
                self.set_status("That page is only available on the web");
                return;
            }
            Route::NotFound => {
                self.set_status("Page not found");
                return;
            }
        }
        self.route = route;
        self.needs_redraw = true;
    }

    fn open_gallery(&mut self, slug: &str, tx: &mpsc::Sender<AppEvent>) {
        let categories = if self.home.nav().categories().is_empty() {
            crate::catalog::categories()
        } else {
            self.home.nav().categories().to_vec()
        };
        let mut gallery = CategoryGallery::open(slug, &categories, self.columns);
        gallery.start_load(
            Arc::clone(&self.catalog),
            self.config.catalog.category_page_items,
            tx,
        );
        self.gallery = Some(gallery);
        self.view = View::Category;
    }

    /// Retry whatever failed on the current view.
    pub fn retry(&mut self, tx: &mpsc::Sender<AppEvent>) {
        match self.view {
            View::Home => {
                self.home.start_load(Arc::clone(&self.catalog), tx);
                self.set_status("Reloading...");
            }
            View::Category => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.start_load(
                        Arc::clone(&self.catalog),
                        self.config.catalog.category_page_items,
                        tx,
                    );
                }
            }
            View::Account => {}
        }
    }

    // ------------------------------------------------------------------------
    // Category tabs
    // ------------------------------------------------------------------------

    /// Click on the tab for `slug`: optimistic switch, jump, route update.
    pub fn click_tab(&mut self, slug: &str) {
        let Some(click) = self.home.click_tab(slug) else {
            return;
        };
        self.route = Route::parse(&click.path);
        // The router echoes the click back as the external value
        self.home
            .set_external_category(self.route.external_category());
        if let Some(request) = self.home.take_scroll_request() {
            self.scroll_target = Some(request.target);
        }
        self.needs_redraw = true;
    }

    /// Move the active tab by `delta` positions.
    pub fn step_tab(&mut self, delta: isize) {
        let categories = self.home.nav().categories();
        if categories.is_empty() {
            return;
        }
        let current = self.home.nav().active_index().unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(categories.len() - 1);
        let slug = categories[next].slug.clone();
        self.click_tab(&slug);
    }

    /// Click the n-th tab (0-based).
    pub fn click_tab_index(&mut self, index: usize) {
        if let Some(slug) = self
            .home
            .nav()
            .categories()
            .get(index)
            .map(|c| c.slug.clone())
        {
            self.click_tab(&slug);
        }
    }

    /// Lay out the tab bar for `width` cells and re-measure the highlight.
    pub fn layout_tabs(&mut self, width: u16) {
        let mut bar = MeasuredTabBar::new(1.0, 1.0);
        for category in self.home.nav().categories() {
            bar.push(category.slug.clone(), (display_width(&category.name) + 2) as f64);
        }
        self.tab_bar = bar;
        let rect = self.home.refresh_highlight(&self.tab_bar);

        // Keep the active tab on screen
        if rect.is_visible() {
            let left = rect.offset as usize;
            let right = (rect.offset + rect.extent) as usize + 2;
            let width = width as usize;
            if left < self.tab_scroll {
                self.tab_scroll = left;
            } else if right > self.tab_scroll + width {
                self.tab_scroll = right.saturating_sub(width);
            }
        }
    }

    /// Screen column (relative to the bar) to slug.
    pub fn tab_at(&self, x: u16) -> Option<String> {
        self.tab_bar
            .hit_test(f64::from(x) + self.tab_scroll as f64)
            .map(str::to_string)
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    /// Scroll by `rows` terminal rows at the user's request.
    pub fn scroll_rows(&mut self, rows: i32) {
        let px = f64::from(rows) * self.px_per_row();
        match self.view {
            View::Home => {
                self.scroll_target = None;
                let next = self.home.scroll_top() + px;
                self.home.on_user_scroll(next);
            }
            View::Category => {
                let max_row = self.gallery_max_row();
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.scroll_by(rows as isize, max_row);
                }
            }
            View::Account => {}
        }
        self.needs_redraw = true;
    }

    /// Last gallery row that still fills the content area.
    pub fn gallery_max_row(&self) -> usize {
        let Some(GalleryState::Ready(assignment)) = self.gallery.as_ref().map(|g| g.state())
        else {
            return 0;
        };
        let rows = (assignment.height(self.config.layout.grid_gap) / self.px_per_row()).ceil();
        (rows as usize).saturating_sub(usize::from(self.content_rows))
    }

    pub fn page_rows(&self) -> i32 {
        (i32::from(self.content_rows) * 9 / 10).max(1)
    }

    pub fn scroll_to_top(&mut self) {
        match self.view {
            View::Home => {
                self.home.on_user_scroll(0.0);
                self.scroll_target = None;
            }
            View::Category => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.scroll_by(isize::MIN / 2, 0);
                }
            }
            View::Account => {}
        }
    }

    /// Terminal resized to `rows` rows of page content.
    ///
    /// The fixed chrome covers the first `fixed_offset` pixels of the page,
    /// so the viewport spans the chrome plus the content rows.
    pub fn on_resize(&mut self, rows: u16) {
        if rows == self.content_rows {
            return;
        }
        self.content_rows = rows;
        let viewport_px = self.home.metrics().fixed_offset + f64::from(rows) * self.px_per_row();
        self.home.on_resize(viewport_px);
        self.needs_redraw = true;
    }

    /// One animation frame: advance smooth scroll, flush spy work.
    ///
    /// Returns true if anything visible changed.
    pub fn on_frame(&mut self) -> bool {
        let mut changed = false;

        if let Some(request) = self.home.take_scroll_request() {
            self.scroll_target = Some(request.target);
        }

        if let Some(target) = self.scroll_target {
            let current = self.home.scroll_top();
            let remaining = target - current;
            let next = if remaining.abs() < 1.0 {
                self.scroll_target = None;
                target
            } else {
                current + remaining * SMOOTH_SCROLL_STEP
            };
            self.home.on_scroll(next);
            if (self.home.scroll_top() - next).abs() > f64::EPSILON {
                // Clamped by the page end; nothing more to animate
                self.scroll_target = None;
            }
            changed = true;
        }

        changed |= self.home.on_frame();

        if self.home.is_loading() || self.remix.as_ref().is_some_and(|r| r.is_generating()) {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            changed = true;
        }
        changed
    }

    // ------------------------------------------------------------------------
    // Columns & theme
    // ------------------------------------------------------------------------

    /// Use `columns` (clamped) for every grid. Returns true if it changed.
    pub fn set_columns(&mut self, columns: usize) -> bool {
        let columns = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);
        if columns == self.columns {
            return false;
        }
        self.columns = columns;
        self.home.set_columns(columns);
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.set_columns(columns);
        }
        self.needs_redraw = true;
        true
    }

    pub fn change_columns(&mut self, delta: isize) {
        if self.set_columns(self.columns.saturating_add_signed(delta)) {
            self.set_status(format!("{} columns", self.columns));
        }
    }

    /// Switch to the next theme and persist the choice.
    pub async fn cycle_theme(&mut self) -> Result<()> {
        self.theme = self.theme.next();
        self.palette = self.theme.palette();
        self.set_status(format!("Theme: {}", self.theme.name()));
        self.prefs.set(&self.db, THEME_KEY, self.theme.key()).await
    }

    // ------------------------------------------------------------------------
    // Session & remix
    // ------------------------------------------------------------------------

    pub fn confirm_login(&mut self) {
        self.session.login(crate::session::mock_user());
        self.overlay = None;
        self.set_status("Signed in as John Doe");
    }

    pub fn sign_out(&mut self) {
        self.session.logout();
        self.remix = None;
        if self.view == View::Account {
            self.view = View::Home;
        }
        self.set_status("Signed out");
    }

    /// Open the remix panel for the active category's first video.
    pub fn open_remix_for_active(&mut self, tx: &mpsc::Sender<AppEvent>) {
        let title = self
            .home
            .sections()
            .find(|(s, _)| s.slug() == self.home.active_slug())
            .and_then(|(s, _)| s.items.first().map(|i| i.title.to_string()));
        self.navigate(Route::Remix { title }, tx);
    }

    /// Add the file at `path` to the open remix draft.
    pub fn add_remix_file(&mut self, path: &str) {
        let Some(draft) = self.remix.as_mut() else {
            return;
        };
        let path = path.trim();
        let file = match ReferenceFile::from_path(Path::new(path)) {
            Ok(file) => file,
            Err(e) => {
                self.set_status(format!("Cannot read {path}: {e}"));
                return;
            }
        };
        let rejected = draft.add_files([file]);
        match rejected.first() {
            Some(reason) => self.set_status(reason.to_string()),
            None => self.set_status("Image added"),
        }
    }

    pub fn start_remix(&mut self, tx: &mpsc::Sender<AppEvent>) {
        let Some(draft) = self.remix.as_mut() else {
            return;
        };
        match draft.start_generate(&self.session, tx) {
            Ok(()) => self.set_status("Generating video..."),
            Err(e) => {
                if !self.session.is_authenticated() {
                    self.overlay = Some(Overlay::Login);
                }
                self.set_status(e.to_string());
            }
        }
    }

    /// Hide the help overlay, uncovering the remix panel if one is open.
    pub fn close_help(&mut self) {
        self.overlay = self.remix.as_ref().map(|_| Overlay::Remix);
    }

    /// Close overlays and leave sub-views; returns false when nothing to close.
    pub fn back(&mut self) -> bool {
        if self.remix_input.take().is_some() {
            return true;
        }
        if let Some(overlay) = self.overlay.take() {
            match overlay {
                Overlay::Login => self.session.close_login_modal(),
                Overlay::Remix => self.remix = None,
                Overlay::Help => self.close_help(),
            }
            return true;
        }
        if self.view != View::Home {
            self.view = View::Home;
            self.gallery = None;
            self.route = Route::Explore {
                category: Some(self.home.active_slug().to_string()).filter(|s| !s.is_empty()),
            };
            return true;
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let db = Database::open(":memory:").await.unwrap();
        let config = Config::default();
        let prefs = PreferenceManager::load(&config, &db).await.unwrap();
        let app = App::new(config, db, prefs, ReferenceHistory::new(10));
        let (tx, rx) = mpsc::channel(16);
        (app, tx, rx)
    }

    async fn loaded_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let (mut app, tx, rx) = test_app().await;
        app.home.install(app.catalog.home_data_now());
        app.on_resize(20);
        app.layout_tabs(80);
        app.on_frame();
        (app, tx, rx)
    }

    #[tokio::test]
    async fn test_remix_requires_sign_in() {
        let (mut app, tx, _rx) = test_app().await;
        app.navigate(Route::Remix { title: None }, &tx);
        assert_eq!(app.overlay, Some(Overlay::Login));
        assert!(app.remix.is_none());

        app.confirm_login();
        app.navigate(Route::Remix { title: None }, &tx);
        assert_eq!(app.overlay, Some(Overlay::Remix));
        assert_eq!(
            app.remix.as_ref().map(|r| r.title()),
            Some(crate::remix::DEFAULT_TITLE)
        );
    }

    #[tokio::test]
    async fn test_account_requires_sign_in() {
        let (mut app, tx, _rx) = test_app().await;
        app.navigate(Route::Account, &tx);
        assert_eq!(app.view, View::Home);
        app.confirm_login();
        app.navigate(Route::Account, &tx);
        assert_eq!(app.view, View::Account);
        app.sign_out();
        assert_eq!(app.view, View::Home);
    }

    #[tokio::test]
    async fn test_click_tab_updates_route_and_animates() {
        let (mut app, _tx, _rx) = loaded_app().await;
        app.click_tab("viral");
        assert_eq!(app.home.active_slug(), "viral");
        assert_eq!(app.route.external_category(), Some("viral"));
        let target = app.scroll_target.unwrap();

        for _ in 0..60 {
            app.on_frame();
        }
        assert!(app.scroll_target.is_none());
        assert!((app.home.scroll_top() - target).abs() < 1.0);
        assert_eq!(app.home.active_slug(), "viral");
    }

    #[tokio::test]
    async fn test_latest_click_wins_within_quiet_period() {
        let (mut app, _tx, _rx) = loaded_app().await;
        app.click_tab("viral");
        app.click_tab("ugc");
        assert_eq!(app.home.active_slug(), "ugc");
        assert_eq!(app.route.external_category(), Some("ugc"));

        app.step_tab(1);
        assert_eq!(app.home.active_slug(), "commercial");
        let top = app.home.geometry().section("commercial").unwrap().top;
        assert_eq!(app.scroll_target, Some((top - 128.0).max(0.0)));
    }

    #[tokio::test]
    async fn test_click_right_after_deep_link() {
        let (mut app, tx, _rx) = loaded_app().await;
        app.navigate(Route::parse("/explore?category=viral"), &tx);
        assert_eq!(app.home.active_slug(), "viral");

        app.click_tab("commercial");
        assert_eq!(app.home.active_slug(), "commercial");
        assert_eq!(app.route.external_category(), Some("commercial"));
    }

    #[tokio::test]
    async fn test_step_tab_clamps() {
        let (mut app, _tx, _rx) = loaded_app().await;
        app.step_tab(-1);
        assert_eq!(app.home.active_slug(), "nano-banana-pro");
        app.step_tab(1);
        assert_eq!(app.home.active_slug(), "camera-controls");
    }

    #[tokio::test]
    async fn test_tab_hit_test_matches_layout() {
        let (mut app, _tx, _rx) = loaded_app().await;
        // "Nano Banana Pro" is 15 cells + 2 padding starting at column 1
        assert_eq!(app.tab_at(1).as_deref(), Some("nano-banana-pro"));
        assert_eq!(app.tab_at(19).as_deref(), Some("camera-controls"));
        assert_eq!(app.tab_at(0), None);

        app.click_tab("camera-controls");
        app.layout_tabs(80);
        assert_eq!(app.home.highlight().offset, 18.0);
        assert_eq!(app.home.highlight().extent, 17.0);
    }

    #[tokio::test]
    async fn test_back_returns_home() {
        let (mut app, tx, _rx) = loaded_app().await;
        app.navigate(
            Route::Category {
                slug: "ugc".to_string(),
            },
            &tx,
        );
        assert_eq!(app.view, View::Category);
        assert!(app.back());
        assert_eq!(app.view, View::Home);
        assert!(!app.back());
    }

    #[tokio::test]
    async fn test_cycle_theme_persists() {
        let (mut app, _tx, _rx) = test_app().await;
        app.cycle_theme().await.unwrap();
        assert_eq!(app.theme, ThemeVariant::Light);
        assert_eq!(
            app.db.get_preference(THEME_KEY).await.unwrap().as_deref(),
            Some("light")
        );
    }

    #[tokio::test]
    async fn test_change_columns_bounds() {
        let (mut app, _tx, _rx) = loaded_app().await;
        app.change_columns(10);
        assert_eq!(app.columns, MAX_COLUMNS);
        assert_eq!(app.home.column_count(), MAX_COLUMNS);
        app.change_columns(-20);
        assert_eq!(app.columns, MIN_COLUMNS);
    }

    #[tokio::test]
    async fn test_closing_help_uncovers_remix() {
        let (mut app, tx, _rx) = test_app().await;
        app.confirm_login();
        app.navigate(Route::Remix { title: None }, &tx);
        app.overlay = Some(Overlay::Help);
        assert_eq!(app.context_behind_help(), Context::Remix);

        assert!(app.back());
        assert_eq!(app.overlay, Some(Overlay::Remix));
        assert!(app.back());
        assert_eq!(app.overlay, None);
        assert!(app.remix.is_none());
    }
}
