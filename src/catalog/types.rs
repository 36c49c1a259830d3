use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Failures surfaced by a catalog data source.
///
/// The UI translates any of these into a "failed to load" state; none of them
/// are fatal and every fetch can simply be re-issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The source could not produce data (simulated outage, bad fixture, ...).
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The request was superseded or aborted before it resolved.
    #[error("Catalog request cancelled")]
    Cancelled,
}

// ============================================================================
// Categories
// ============================================================================

/// A browsable category. Identity is `slug`, which doubles as the scroll-spy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(id: &str, slug: &str, name: &str, description: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }
}

// ============================================================================
// Display Items
// ============================================================================

/// Promotional badge attached to a grid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoTag {
    Hot,
    New,
    Recommended,
}

impl VideoTag {
    /// Short badge text shown on the card.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hot => "HOT",
            Self::New => "New",
            Self::Recommended => "Picks",
        }
    }
}

/// One card in a masonry grid.
///
/// `display_height` is a presentation hint in page pixels picked from a fixed
/// palette when the item is generated; it is not derived from media metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: u64,
    pub title: Arc<str>,
    pub image_ref: Arc<str>,
    pub display_height: u32,
    pub tag: Option<VideoTag>,
}

/// A category together with its ordered items, as shown on the explore page.
#[derive(Debug, Clone)]
pub struct CategorySection {
    pub category: Category,
    /// Shared so column memoization can key on the sequence identity.
    pub items: Arc<Vec<DisplayItem>>,
}

impl CategorySection {
    pub fn slug(&self) -> &str {
        &self.category.slug
    }
}

/// Aggregate payload for the explore page.
#[derive(Debug, Clone)]
pub struct HomeData {
    pub categories: Vec<Category>,
    pub sections: Vec<CategorySection>,
}

/// Large promotional card shown above the galleries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedCard {
    pub id: u64,
    pub title: &'static str,
    pub image_ref: &'static str,
    pub label: Option<&'static str>,
}
