//! Category gallery page: one category, all of its items, one masonry grid.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{CatalogError, CatalogService, Category, DisplayItem};
use crate::layout::{ColumnAssignment, ItemSequencer};
use crate::util::catch_task_panic;

/// Load generations are unique across galleries, so a result queued for a
/// gallery that was closed can never match the one that replaced it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Completion of a gallery item fetch.
#[derive(Debug)]
pub struct GalleryLoaded {
    pub slug: String,
    pub generation: u64,
    pub result: Result<Vec<DisplayItem>, CatalogError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryState {
    Loading,
    /// Slug does not name a known category.
    NotFound,
    Ready(Arc<ColumnAssignment>),
    Failed(String),
}

#[derive(Debug)]
pub struct CategoryGallery {
    slug: String,
    category: Option<Category>,
    state: GalleryState,
    sequencer: ItemSequencer,
    generation: u64,
    handle: Option<JoinHandle<()>>,
    scroll_row: usize,
}

impl CategoryGallery {
    /// Resolve `slug` against the loaded categories.
    pub fn open(slug: &str, categories: &[Category], columns: usize) -> Self {
        let category = categories.iter().find(|c| c.slug == slug).cloned();
        let state = if category.is_some() {
            GalleryState::Loading
        } else {
            tracing::debug!(slug = %slug, "Gallery for unknown category");
            GalleryState::NotFound
        };
        Self {
            slug: slug.to_string(),
            category,
            state,
            sequencer: ItemSequencer::new(columns),
            generation: 0,
            handle: None,
            scroll_row: 0,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn scroll_by(&mut self, delta: isize, max_row: usize) {
        self.scroll_row = self.scroll_row.saturating_add_signed(delta).min(max_row);
    }

    /// Fetch `count` items for the category. No-op for an unknown slug.
    pub fn start_load<S, E>(&mut self, catalog: Arc<S>, count: usize, tx: &mpsc::Sender<E>)
    where
        S: CatalogService,
        E: From<GalleryLoaded> + Send + 'static,
    {
        if self.category.is_none() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.state = GalleryState::Loading;
        let generation = self.generation;
        let slug = self.slug.clone();
        let tx = tx.clone();

        self.handle = Some(tokio::spawn(async move {
            let result = match catch_task_panic(async {
                catalog.fetch_videos_by_category(&slug, count).await
            })
            .await
            {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task = "gallery_load", error = %panic_msg, "Background task panicked");
                    Err(CatalogError::Unavailable(panic_msg))
                }
            };
            let loaded = GalleryLoaded {
                slug,
                generation,
                result,
            };
            if let Err(e) = tx.send(E::from(loaded)).await {
                tracing::warn!(error = %e, event = "GalleryLoaded", "Channel send failed (receiver dropped)");
            }
        }));
    }

    /// Apply a fetch result; results for another gallery or an older request
    /// are dropped.
    pub fn handle_loaded(&mut self, loaded: GalleryLoaded) -> bool {
        if loaded.slug != self.slug {
            tracing::debug!(
                expected = %self.slug,
                got = %loaded.slug,
                "Ignoring gallery items for another category"
            );
            return false;
        }
        if loaded.generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = loaded.generation,
                "Ignoring stale gallery items"
            );
            return false;
        }
        self.handle = None;
        self.state = match loaded.result {
            Ok(items) => GalleryState::Ready(Arc::new(self.sequencer.assign(&items))),
            Err(e) => GalleryState::Failed(e.to_string()),
        };
        true
    }

    pub fn set_columns(&mut self, columns: usize) {
        if columns == self.sequencer.columns() {
            return;
        }
        self.sequencer = ItemSequencer::new(columns);
        if let GalleryState::Ready(assignment) = &self.state {
            let items: Vec<DisplayItem> = interleave(assignment);
            self.state = GalleryState::Ready(Arc::new(self.sequencer.assign(&items)));
        }
    }
}

/// Recover the original order from a round-robin assignment.
fn interleave(assignment: &ColumnAssignment) -> Vec<DisplayItem> {
    let columns = assignment.columns();
    let mut out = Vec::with_capacity(assignment.total_items());
    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
    for row in 0..depth {
        for column in columns {
            if let Some(item) = column.get(row) {
                out.push(item.clone());
            }
        }
    }
    out
}

impl Drop for CategoryGallery {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{categories, MockCatalog};

    #[test]
    fn test_unknown_slug_is_not_found() {
        let gallery = CategoryGallery::open("nope", &categories(), 4);
        assert_eq!(gallery.state(), &GalleryState::NotFound);
        assert!(gallery.category().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loads_items_into_columns() {
        let mut gallery = CategoryGallery::open("viral", &categories(), 4);
        let (tx, mut rx) = mpsc::channel::<GalleryLoaded>(2);
        gallery.start_load(Arc::new(MockCatalog::default()), 30, &tx);
        assert_eq!(gallery.state(), &GalleryState::Loading);

        let loaded = rx.recv().await.unwrap();
        assert!(gallery.handle_loaded(loaded));
        match gallery.state() {
            GalleryState::Ready(columns) => {
                assert_eq!(columns.column_count(), 4);
                assert_eq!(columns.total_items(), 30);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_column_change_keeps_order() {
        let mut gallery = CategoryGallery::open("ugc", &categories(), 4);
        let (tx, mut rx) = mpsc::channel::<GalleryLoaded>(2);
        gallery.start_load(Arc::new(MockCatalog::default()), 10, &tx);
        gallery.handle_loaded(rx.recv().await.unwrap());

        gallery.set_columns(3);
        let GalleryState::Ready(columns) = gallery.state() else {
            panic!("not ready");
        };
        let first_column: Vec<u64> = columns.columns()[0].iter().map(|i| i.id).collect();
        // ugc has numeric id 4 -> ids 401..=410; column 0 holds indices 0, 3, 6, 9
        assert_eq!(first_column, vec![401, 404, 407, 410]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut gallery = CategoryGallery::open("viral", &categories(), 4);
        gallery.scroll_by(-3, 10);
        assert_eq!(gallery.scroll_row(), 0);
        gallery.scroll_by(50, 10);
        assert_eq!(gallery.scroll_row(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_for_closed_gallery_is_dropped() {
        let catalog = Arc::new(MockCatalog::default());
        let (tx, mut rx) = mpsc::channel::<GalleryLoaded>(4);

        let mut viral = CategoryGallery::open("viral", &categories(), 4);
        viral.start_load(Arc::clone(&catalog), 10, &tx);
        let queued = rx.recv().await.unwrap();
        drop(viral);

        let mut ugc = CategoryGallery::open("ugc", &categories(), 4);
        ugc.start_load(catalog, 10, &tx);
        assert!(!ugc.handle_loaded(queued));
        assert_eq!(ugc.state(), &GalleryState::Loading);

        let own = rx.recv().await.unwrap();
        assert!(ugc.handle_loaded(own));
        let GalleryState::Ready(columns) = ugc.state() else {
            panic!("not ready");
        };
        assert_eq!(columns.columns()[0][0].id, 401);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopened_gallery_ignores_earlier_request() {
        let catalog = Arc::new(MockCatalog::default());
        let (tx, mut rx) = mpsc::channel::<GalleryLoaded>(4);

        let mut first = CategoryGallery::open("viral", &categories(), 4);
        first.start_load(Arc::clone(&catalog), 10, &tx);
        let queued = rx.recv().await.unwrap();
        drop(first);

        let mut again = CategoryGallery::open("viral", &categories(), 4);
        again.start_load(catalog, 10, &tx);
        assert!(!again.handle_loaded(queued));
    }
}
