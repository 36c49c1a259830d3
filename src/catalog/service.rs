use std::future::Future;

use super::types::{CatalogError, Category, DisplayItem, HomeData};

/// Asynchronous source of catalog data.
///
/// The page controller only relies on the contract "resolve to categories and
/// per-category item arrays, or reject". Futures must be `Send` so fetches can
/// run on spawned tasks.
pub trait CatalogService: Send + Sync + 'static {
    /// All categories, in display order.
    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Items for one category. Unknown slugs resolve to an empty list.
    fn fetch_videos_by_category(
        &self,
        slug: &str,
        count: usize,
    ) -> impl Future<Output = Result<Vec<DisplayItem>, CatalogError>> + Send;

    /// Aggregate payload for the explore page.
    fn fetch_home_data(&self) -> impl Future<Output = Result<HomeData, CatalogError>> + Send;
}
