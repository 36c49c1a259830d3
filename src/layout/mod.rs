//! Masonry layout: column bucketing, page geometry, card presentation options.

mod card;
mod geometry;
mod sequencer;

pub use card::{CardStyle, CardVariant};
pub use geometry::{PageGeometry, PageMetrics, SectionGeometry};
pub use sequencer::{ColumnAssignment, ColumnCache, ItemSequencer};
