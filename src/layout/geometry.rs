//! Page geometry for the explore feed.
//!
//! Stands in for the browser's layout tree: given the column assignments of
//! every section, compute where each section starts and how tall it is in page
//! pixels. Section tops are what the scroll-spy measures.

use super::sequencer::ColumnAssignment;
use crate::config::LayoutConfig;

/// Vertical metrics of the page chrome and blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Header plus tab bar; content starts below it.
    pub fixed_offset: f64,
    /// Height of the featured cards block (0 to omit it).
    pub featured_height: f64,
    /// Title row above each grid.
    pub section_title_height: f64,
    /// Gap between stacked grid items.
    pub grid_gap: f64,
    /// Space between consecutive sections.
    pub section_spacing: f64,
}

impl PageMetrics {
    pub fn from_config(layout: &LayoutConfig) -> Self {
        Self {
            fixed_offset: layout.header_height + layout.tab_bar_height,
            featured_height: layout.featured_height,
            section_title_height: layout.section_title_height,
            grid_gap: layout.grid_gap,
            section_spacing: layout.grid_gap * 4.0,
        }
    }
}

/// Placement of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGeometry {
    pub slug: String,
    /// Top edge of the section (title row included).
    pub top: f64,
    /// Top edge of the masonry grid.
    pub grid_top: f64,
    /// Title row plus grid.
    pub height: f64,
}

impl SectionGeometry {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Placement of every block on the page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageGeometry {
    pub featured_top: f64,
    pub sections: Vec<SectionGeometry>,
    pub total_height: f64,
}

impl PageGeometry {
    /// Stack the featured block and sections top to bottom.
    pub fn compute<'a>(
        metrics: &PageMetrics,
        sections: impl IntoIterator<Item = (&'a str, &'a ColumnAssignment)>,
    ) -> Self {
        let featured_top = metrics.fixed_offset;
        let mut y = featured_top;
        if metrics.featured_height > 0.0 {
            y += metrics.featured_height + metrics.section_spacing;
        }

        let mut placed = Vec::new();
        for (slug, columns) in sections {
            let grid_height = columns.height(metrics.grid_gap);
            let height = metrics.section_title_height + grid_height;
            placed.push(SectionGeometry {
                slug: slug.to_string(),
                top: y,
                grid_top: y + metrics.section_title_height,
                height,
            });
            y += height + metrics.section_spacing;
        }

        Self {
            featured_top,
            sections: placed,
            total_height: y,
        }
    }

    pub fn section(&self, slug: &str) -> Option<&SectionGeometry> {
        self.sections.iter().find(|s| s.slug == slug)
    }

    /// Largest scroll offset that still fills a viewport of `viewport_height`.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.total_height - viewport_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DisplayItem;
    use crate::layout::ItemSequencer;
    use std::sync::Arc;

    fn items(heights: &[u32]) -> Vec<DisplayItem> {
        heights
            .iter()
            .enumerate()
            .map(|(i, h)| DisplayItem {
                id: i as u64,
                title: Arc::from("t"),
                image_ref: Arc::from("i"),
                display_height: *h,
                tag: None,
            })
            .collect()
    }

    fn metrics() -> PageMetrics {
        PageMetrics {
            fixed_offset: 128.0,
            featured_height: 0.0,
            section_title_height: 60.0,
            grid_gap: 8.0,
            section_spacing: 32.0,
        }
    }

    #[test]
    fn test_sections_stack_in_order() {
        let seq = ItemSequencer::new(2);
        let a = seq.assign(&items(&[100, 200, 100]));
        let b = seq.assign(&items(&[50]));
        let page = PageGeometry::compute(&metrics(), [("a", &a), ("b", &b)]);

        let sa = page.section("a").unwrap();
        assert_eq!(sa.top, 128.0);
        assert_eq!(sa.grid_top, 188.0);
        // tallest column: 100 + 8 + 100 = 208
        assert_eq!(sa.height, 268.0);

        let sb = page.section("b").unwrap();
        assert_eq!(sb.top, sa.bottom() + 32.0);
        assert_eq!(page.total_height, sb.bottom() + 32.0);
    }

    #[test]
    fn test_featured_block_pushes_sections_down() {
        let mut m = metrics();
        m.featured_height = 240.0;
        let a = ItemSequencer::new(2).assign(&items(&[100]));
        let page = PageGeometry::compute(&m, [("a", &a)]);
        assert_eq!(page.featured_top, 128.0);
        assert_eq!(page.section("a").unwrap().top, 128.0 + 240.0 + 32.0);
    }

    #[test]
    fn test_max_scroll_never_negative() {
        let page = PageGeometry::compute(&metrics(), std::iter::empty());
        assert_eq!(page.max_scroll(10_000.0), 0.0);
    }
}
