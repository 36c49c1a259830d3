//! In-process catalog with simulated latency.
//!
//! Everything here is static fixture data. The only moving parts are the
//! artificial delays and an optional forced failure used to exercise the
//! "failed to load" path.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use super::service::CatalogService;
use super::types::{
    CatalogError, Category, CategorySection, DisplayItem, FeaturedCard, HomeData, VideoTag,
};
use crate::config::CatalogConfig;

const CATEGORIES_LATENCY: Duration = Duration::from_millis(300);
const CATEGORY_VIDEOS_LATENCY: Duration = Duration::from_millis(200);

const HEIGHTS: [u32; 8] = [297, 345, 396, 269, 377, 299, 320, 380];

const IMAGES: [&str; 8] = [
    "https://images.unsplash.com/photo-1536440136628-849c177e76a1?w=400",
    "https://images.unsplash.com/photo-1574717024653-61fd2cf4d44d?w=400",
    "https://images.unsplash.com/photo-1485846234645-a62644f84728?w=400",
    "https://images.unsplash.com/photo-1492691527719-9d1e07e534b4?w=400",
    "https://images.unsplash.com/photo-1518676590629-3dcbd9c5a5c9?w=400",
    "https://images.unsplash.com/photo-1524712245354-2c4e5e7121c0?w=400",
    "https://images.unsplash.com/photo-1535016120720-40c646be5580?w=400",
    "https://images.unsplash.com/photo-1478720568477-152d9b164e26?w=400",
];

const TITLES: [&str; 8] = [
    "Brazil Jersey in Transit",
    "Cinematic Mountain View",
    "Urban Street Style",
    "Nature Documentary",
    "Fashion Forward",
    "Tech Innovation",
    "Travel Vlog",
    "Music Video",
];

/// Tag palette; `None` entries keep most cards unbadged.
const TAGS: [Option<VideoTag>; 7] = [
    Some(VideoTag::Hot),
    Some(VideoTag::New),
    Some(VideoTag::Recommended),
    None,
    None,
    None,
    None,
];

const CATEGORY_FIXTURES: [(&str, &str, &str, &str); 10] = [
    ("1", "nano-banana-pro", "Nano Banana Pro", "The camera pulls back rapidly from the subject to reveal their city, then the continent, and finally the entire Earth."),
    ("2", "camera-controls", "Camera Controls", "Master the art of camera movement with dynamic controls and techniques."),
    ("3", "viral", "Viral", "Trending content that captures attention and spreads across social media platforms."),
    ("4", "ugc", "UGC", "User-generated content that feels authentic and connects with audiences."),
    ("5", "commercial", "Commercial", "Professional advertising and promotional videos designed to showcase products."),
    ("6", "tiktok-trend", "Tiktok Trend", "Stay ahead with the latest TikTok trends and viral video formats."),
    ("7", "black-friday", "Black Friday", "Special promotional content for the biggest shopping event."),
    ("8", "christmas-special", "Christmas Special", "Festive and holiday-themed content for Christmas celebrations."),
    ("9", "kling-turbo", "Kling 2.5 Turbo", "Powered by Kling 2.5 Turbo AI engine for ultra-fast video generation."),
    ("10", "seedance-pro", "Seedance Pro", "Advanced dance and motion content created with Seedance Pro technology."),
];

const FEATURED: [FeaturedCard; 3] = [
    FeaturedCard {
        id: 1,
        title: "Sora 2-Realism at Every Frame",
        image_ref: "https://images.unsplash.com/photo-1536440136628-849c177e76a1?w=600&h=400&fit=crop",
        label: None,
    },
    FeaturedCard {
        id: 2,
        title: "Edit Videos by Prompts",
        image_ref: "https://images.unsplash.com/photo-1574717024653-61fd2cf4d44d?w=600&h=400&fit=crop",
        label: Some("AI VIDEO EDITOR"),
    },
    FeaturedCard {
        id: 3,
        title: "Meet Veo 3.1 - Seamless from Start to End.",
        image_ref: "https://images.unsplash.com/photo-1485846234645-a62644f84728?w=600&h=400&fit=crop",
        label: None,
    },
];

/// The fixed category list, in display order.
pub fn categories() -> Vec<Category> {
    CATEGORY_FIXTURES
        .iter()
        .map(|(id, slug, name, description)| Category::new(id, slug, name, Some(description)))
        .collect()
}

/// Promotional cards shown above the explore galleries.
pub fn featured_cards() -> &'static [FeaturedCard] {
    &FEATURED
}

/// Deterministic tag choice for item `index` of `slug`.
fn tag_for(slug: &str, index: usize) -> Option<VideoTag> {
    let mut hasher = Sha256::new();
    hasher.update(slug.as_bytes());
    hasher.update((index as u64).to_le_bytes());
    let digest = hasher.finalize();
    TAGS[usize::from(digest[0]) % TAGS.len()]
}

/// Generate `count` items for `category`.
///
/// Ids are `numeric_id * 100 + index + 1` so items from different
/// categories never collide.
pub fn generate_items(category: &Category, count: usize) -> Vec<DisplayItem> {
    let base = category.id.parse::<u64>().unwrap_or(1) * 100;
    (0..count)
        .map(|i| DisplayItem {
            id: base + i as u64 + 1,
            title: Arc::from(TITLES[i % TITLES.len()]),
            image_ref: Arc::from(IMAGES[i % IMAGES.len()]),
            display_height: HEIGHTS[i % HEIGHTS.len()],
            tag: tag_for(&category.slug, i),
        })
        .collect()
}

// ============================================================================
// MockCatalog
// ============================================================================

/// Static catalog behind artificial delays.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    config: CatalogConfig,
}

impl MockCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        if self.config.fail {
            tracing::warn!("Mock catalog configured to fail");
            return Err(CatalogError::Unavailable(
                "mock catalog configured to fail".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the home payload without the simulated delay.
    pub fn home_data_now(&self) -> HomeData {
        let categories = categories();
        let sections = categories
            .iter()
            .take(self.config.home_sections)
            .map(|category| CategorySection {
                category: category.clone(),
                items: Arc::new(generate_items(category, self.config.items_per_section)),
            })
            .collect();
        HomeData {
            categories,
            sections,
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl CatalogService for MockCatalog {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        tokio::time::sleep(CATEGORIES_LATENCY).await;
        self.check_available()?;
        Ok(categories())
    }

    async fn fetch_videos_by_category(
        &self,
        slug: &str,
        count: usize,
    ) -> Result<Vec<DisplayItem>, CatalogError> {
        tokio::time::sleep(CATEGORY_VIDEOS_LATENCY).await;
        self.check_available()?;
        Ok(categories()
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| generate_items(c, count))
            .unwrap_or_default())
    }

    async fn fetch_home_data(&self) -> Result<HomeData, CatalogError> {
        tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        self.check_available()?;
        let data = self.home_data_now();
        tracing::debug!(
            categories = data.categories.len(),
            sections = data.sections.len(),
            "Mock catalog resolved home data"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slugs_unique() {
        let cats = categories();
        let mut slugs: Vec<&str> = cats.iter().map(|c| c.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), 10);
    }

    #[test]
    fn test_generated_items_cycle_palettes() {
        let cats = categories();
        let items = generate_items(&cats[2], 10);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].id, 301);
        assert_eq!(items[9].id, 310);
        assert_eq!(items[0].display_height, 297);
        assert_eq!(items[8].display_height, 297);
        assert_eq!(&*items[1].title, "Cinematic Mountain View");
    }

    #[test]
    fn test_tags_are_reproducible() {
        let cats = categories();
        let a = generate_items(&cats[0], 16);
        let b = generate_items(&cats[0], 16);
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_data_takes_configured_sections() {
        let catalog = MockCatalog::default();
        let data = catalog.fetch_home_data().await.unwrap();
        assert_eq!(data.categories.len(), 10);
        assert_eq!(data.sections.len(), 5);
        assert!(data.sections.iter().all(|s| s.items.len() == 16));
        assert_eq!(data.sections[0].slug(), "nano-banana-pro");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_flag_rejects() {
        let catalog = MockCatalog::new(CatalogConfig {
            fail: true,
            ..CatalogConfig::default()
        });
        let err = catalog.fetch_home_data().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_slug_yields_empty_list() {
        let catalog = MockCatalog::default();
        let items = catalog
            .fetch_videos_by_category("does-not-exist", 10)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_fetch_waits_for_latency() {
        let catalog = MockCatalog::default();
        let start = tokio::time::Instant::now();
        catalog.fetch_home_data().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
