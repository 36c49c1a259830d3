//! Masonry column bucketing.
//!
//! A flat ranked list is dealt into N fixed columns round-robin: item `i` goes
//! to column `i % N`. Columns end up with different total heights, which is
//! what produces the staggered masonry look without knowing real media sizes.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::catalog::DisplayItem;

/// Default number of memoized assignments kept by [`ColumnCache`].
const DEFAULT_CACHE_CAPACITY: usize = 32;

// ============================================================================
// Item Sequencer
// ============================================================================

/// Deterministic round-robin distributor for a fixed column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSequencer {
    columns: usize,
}

impl ItemSequencer {
    /// Create a sequencer for `columns` columns.
    ///
    /// # Panics
    ///
    /// Panics if `columns == 0`. A zero column count is a programming error
    /// and never originates from user input.
    pub fn new(columns: usize) -> Self {
        assert!(columns >= 1, "column count must be at least 1, got {columns}");
        Self { columns }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Deal `items` into columns, preserving relative order inside each column.
    pub fn distribute<T: Clone>(&self, items: &[T]) -> Vec<Vec<T>> {
        let per_column = items.len().div_ceil(self.columns);
        let mut columns: Vec<Vec<T>> = (0..self.columns)
            .map(|_| Vec::with_capacity(per_column))
            .collect();
        for (index, item) in items.iter().enumerate() {
            columns[index % self.columns].push(item.clone());
        }
        columns
    }

    /// Distribute display items into a [`ColumnAssignment`].
    pub fn assign(&self, items: &[DisplayItem]) -> ColumnAssignment {
        ColumnAssignment {
            columns: self.distribute(items),
        }
    }
}

// ============================================================================
// Column Assignment
// ============================================================================

/// N ordered columns of display items. Derived data, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignment {
    columns: Vec<Vec<DisplayItem>>,
}

impl ColumnAssignment {
    pub fn columns(&self) -> &[Vec<DisplayItem>] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of items across all columns.
    pub fn total_items(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Stacked pixel height of each column, with `gap` between adjacent items.
    pub fn column_heights(&self, gap: f64) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| {
                let items: f64 = column.iter().map(|i| f64::from(i.display_height)).sum();
                let gaps = column.len().saturating_sub(1) as f64 * gap;
                items + gaps
            })
            .collect()
    }

    /// Height of the tallest column; this is the grid's height on the page.
    pub fn height(&self, gap: f64) -> f64 {
        self.column_heights(gap).into_iter().fold(0.0, f64::max)
    }
}

// ============================================================================
// Memoization
// ============================================================================

/// Cache key: identity of the source sequence plus the parameters that shape
/// the output. Same identity and length means the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ColumnKey {
    source: usize,
    len: usize,
    columns: usize,
}

struct CachedAssignment {
    /// Holds the source alive so its address cannot be reused by another list
    /// while the entry exists.
    _source: Arc<Vec<DisplayItem>>,
    assignment: Arc<ColumnAssignment>,
}

/// LRU memo of column assignments keyed on source sequence identity.
///
/// Re-rendering the same section hits the cache; a freshly fetched item list
/// (new `Arc`) misses and is recomputed.
pub struct ColumnCache {
    entries: LruCache<ColumnKey, CachedAssignment>,
    hits: u64,
    misses: u64,
}

impl ColumnCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the assignment for `items`, computing it on first use.
    pub fn get_or_assign(
        &mut self,
        sequencer: ItemSequencer,
        items: &Arc<Vec<DisplayItem>>,
    ) -> Arc<ColumnAssignment> {
        let key = ColumnKey {
            source: Arc::as_ptr(items) as usize,
            len: items.len(),
            columns: sequencer.columns(),
        };

        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(&entry.assignment);
        }

        self.misses += 1;
        let assignment = Arc::new(sequencer.assign(items));
        self.entries.put(
            key,
            CachedAssignment {
                _source: Arc::clone(items),
                assignment: Arc::clone(&assignment),
            },
        );
        assignment
    }

    /// Drop every memoized assignment (e.g. after navigating away).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl Default for ColumnCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
