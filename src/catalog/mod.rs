//! Catalog data: categories, grid items, featured cards.
//!
//! The catalog is a mocked data source. Consumers only see the
//! [`CatalogService`] contract, so a real backend could replace [`MockCatalog`]
//! without touching the page controller.

mod mock;
mod service;
mod types;

pub use mock::{categories, featured_cards, generate_items, MockCatalog};
pub use service::CatalogService;
pub use types::{
    CatalogError, Category, CategorySection, DisplayItem, FeaturedCard, HomeData, VideoTag,
};
