//! One card component, many looks.
//!
//! The explore grid, the category gallery and the featured strip all draw the
//! same card; [`CardStyle`] enumerates the options that used to be separate
//! near-identical components.

/// Where a card is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVariant {
    /// Explore page section grid.
    Grid,
    /// Full category gallery.
    Gallery,
    /// Promotional strip above the galleries.
    Featured,
}

/// Recognized presentation options for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    /// Show the hot/new/picks badge.
    pub show_tag: bool,
    /// Show the corner label (featured cards only carry one).
    pub show_label: bool,
    /// Title is drawn over the image instead of under it.
    pub title_overlay: bool,
    /// Offer the remix action on the card.
    pub remix_action: bool,
}

impl CardVariant {
    pub fn style(self) -> CardStyle {
        match self {
            Self::Grid => CardStyle {
                show_tag: false,
                show_label: false,
                title_overlay: true,
                remix_action: true,
            },
            Self::Gallery => CardStyle {
                show_tag: true,
                show_label: false,
                title_overlay: true,
                remix_action: true,
            },
            Self::Featured => CardStyle {
                show_tag: false,
                show_label: true,
                title_overlay: false,
                remix_action: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_gallery_shows_tags() {
        assert!(CardVariant::Gallery.style().show_tag);
        assert!(!CardVariant::Grid.style().show_tag);
        assert!(!CardVariant::Featured.style().show_tag);
    }

    #[test]
    fn test_featured_has_no_remix() {
        let style = CardVariant::Featured.style();
        assert!(!style.remix_action);
        assert!(style.show_label);
    }
}
