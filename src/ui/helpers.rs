//! Shared drawing helpers: page-pixel placement and clipped cards.
//!
//! Page content is laid out in page pixels. A `PageViewport` maps a pixel
//! span onto terminal rows of a content area; blocks that cross an edge are
//! drawn open on that side so partial cards read as partial.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::catalog::{DisplayItem, FeaturedCard};
use crate::layout::{CardStyle, CardVariant};
use crate::theme::ColorPalette;
use crate::util::truncate_to_width;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) fn spinner(frame: usize) -> char {
    SPINNER[frame % SPINNER.len()]
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Centered rectangle of a fixed size, shrunk to fit.
pub(super) fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Split `width` cells into `count` columns separated by one cell.
///
/// Returns `(x offset, width)` per column; leftover cells go to the left
/// columns.
pub(super) fn column_spans(width: u16, count: usize) -> Vec<(u16, u16)> {
    let count = count.max(1) as u16;
    let usable = width.saturating_sub(count - 1);
    let base = usable / count;
    let extra = usable % count;
    let mut x = 0;
    (0..count)
        .map(|i| {
            let w = base + u16::from(i < extra);
            let span = (x, w);
            x += w + 1;
            span
        })
        .collect()
}

// ============================================================================
// Page Viewport
// ============================================================================

/// A content area showing the page from `top_px` downwards.
#[derive(Debug, Clone, Copy)]
pub(super) struct PageViewport {
    pub area: Rect,
    pub top_px: f64,
    pub px_per_row: f64,
}

/// Where a page block landed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Placement {
    pub rect: Rect,
    /// Rows of the block above the visible area.
    pub hidden_above: u16,
    pub open_top: bool,
    pub open_bottom: bool,
}

impl PageViewport {
    /// Place the block `[y, y + height)` spanning columns `[x, x + width)` of
    /// the area. `None` when it is entirely off screen.
    pub fn place(&self, y: f64, height: f64, x: u16, width: u16) -> Option<Placement> {
        let start = ((y - self.top_px) / self.px_per_row).round() as i64;
        let end = (((y + height) - self.top_px) / self.px_per_row).round() as i64;
        let end = end.max(start + 1);
        let rows = i64::from(self.area.height);
        if end <= 0 || start >= rows || width == 0 {
            return None;
        }

        let top = start.max(0);
        let bottom = end.min(rows);
        Some(Placement {
            rect: Rect::new(
                self.area.x + x,
                self.area.y + top as u16,
                width.min(self.area.width.saturating_sub(x)),
                (bottom - top) as u16,
            ),
            hidden_above: (top - start) as u16,
            open_top: start < 0,
            open_bottom: end > rows,
        })
    }
}

// ============================================================================
// Cards
// ============================================================================

/// Draw a block whose top and bottom borders are dropped when clipped.
pub(super) fn render_clipped(
    f: &mut Frame,
    placement: Placement,
    lines: Vec<Line<'_>>,
    style: Style,
    border_style: Style,
) {
    let mut borders = Borders::LEFT | Borders::RIGHT;
    if !placement.open_top {
        borders |= Borders::TOP;
    }
    if !placement.open_bottom {
        borders |= Borders::BOTTOM;
    }
    // The first hidden row is the top border
    let skip = placement.hidden_above.saturating_sub(1);
    let block = Block::default()
        .borders(borders)
        .border_style(border_style)
        .style(style);
    f.render_widget(
        Paragraph::new(lines).block(block).scroll((skip, 0)),
        placement.rect,
    );
}

/// Card body for a grid item.
pub(super) fn item_lines(
    item: &DisplayItem,
    variant: CardVariant,
    width: u16,
    palette: &ColorPalette,
) -> Vec<Line<'static>> {
    let style: CardStyle = variant.style();
    let inner = usize::from(width.saturating_sub(2));
    let title = Line::from(Span::styled(
        truncate_to_width(&item.title, inner).into_owned(),
        palette.card_title,
    ));

    let mut lines = Vec::with_capacity(4);
    if style.title_overlay {
        lines.push(title.clone());
    }
    if style.show_tag {
        if let Some(tag) = item.tag {
            lines.push(Line::from(Span::styled(
                format!(" {} ", tag.label()),
                palette.tag(tag),
            )));
        }
    }
    if !style.title_overlay {
        lines.push(Line::default());
        lines.push(title);
    }
    if style.remix_action {
        lines.push(Line::from(Span::styled("[m] remix", palette.dim)));
    }
    lines
}

/// Card body for a featured promotion.
pub(super) fn featured_lines(
    card: &FeaturedCard,
    width: u16,
    palette: &ColorPalette,
) -> Vec<Line<'static>> {
    let style = CardVariant::Featured.style();
    let inner = usize::from(width.saturating_sub(2));
    let mut lines = Vec::with_capacity(3);
    if style.show_label {
        match card.label {
            Some(label) => lines.push(Line::from(Span::styled(
                format!(" {label} "),
                palette.featured_label,
            ))),
            None => lines.push(Line::default()),
        }
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        truncate_to_width(card.title, inner).into_owned(),
        palette.card_title,
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> PageViewport {
        PageViewport {
            area: Rect::new(0, 3, 80, 10),
            top_px: 100.0,
            px_per_row: 10.0,
        }
    }

    #[test]
    fn test_place_fully_visible() {
        let p = viewport().place(120.0, 30.0, 5, 10).unwrap();
        assert_eq!(p.rect, Rect::new(5, 5, 10, 3));
        assert!(!p.open_top && !p.open_bottom);
        assert_eq!(p.hidden_above, 0);
    }

    #[test]
    fn test_place_clipped_top() {
        let p = viewport().place(70.0, 50.0, 0, 10).unwrap();
        assert_eq!(p.rect.y, 3);
        assert_eq!(p.rect.height, 2);
        assert_eq!(p.hidden_above, 3);
        assert!(p.open_top);
    }

    #[test]
    fn test_place_clipped_bottom() {
        let p = viewport().place(180.0, 50.0, 0, 10).unwrap();
        assert_eq!(p.rect.height, 2);
        assert!(p.open_bottom);
    }

    #[test]
    fn test_place_off_screen() {
        assert!(viewport().place(0.0, 50.0, 0, 10).is_none());
        assert!(viewport().place(200.0, 50.0, 0, 10).is_none());
    }

    #[test]
    fn test_column_spans_cover_width() {
        let spans = column_spans(80, 5);
        assert_eq!(spans.len(), 5);
        let (last_x, last_w) = spans[4];
        assert_eq!(last_x + last_w, 80);
        assert_eq!(spans[0], (0, 16));
    }
}
