//! Explore view: category tab bar, featured strip and masonry sections.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::helpers::{
    column_spans, featured_lines, item_lines, render_clipped, spinner, PageViewport,
};
use crate::app::App;
use crate::catalog::featured_cards;
use crate::home::LoadState;
use crate::layout::CardVariant;
use crate::util::{display_width, truncate_to_width};

/// Draw the two-row tab bar: names, then the highlight underline.
pub(super) fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if area.height < 2 || area.width < 1 {
        return;
    }
    let palette = &app.palette;
    let active = app.home.active_slug();

    let mut spans = vec![Span::raw(" ")];
    for category in app.home.nav().categories() {
        let style = if category.slug == active {
            palette.tab_active
        } else {
            palette.tab
        };
        spans.push(Span::styled(format!(" {} ", category.name), style));
        spans.push(Span::raw(" "));
    }
    let scroll = u16::try_from(app.tab_scroll).unwrap_or(u16::MAX);
    f.render_widget(
        Paragraph::new(Line::from(spans)).scroll((0, scroll)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let highlight = app.home.highlight();
    if !highlight.is_visible() {
        return;
    }
    // Highlight offsets are relative to the bar origin, one cell in
    let left = 1 + highlight.offset.round() as i64 - app.tab_scroll as i64;
    let right = left + highlight.extent.round() as i64;
    let left = left.clamp(0, i64::from(area.width));
    let right = right.clamp(0, i64::from(area.width));
    if right <= left {
        return;
    }
    let underline = "▔".repeat((right - left) as usize);
    f.render_widget(
        Paragraph::new(Span::styled(underline, palette.tab_highlight)),
        Rect::new(area.x + left as u16, area.y + 1, (right - left) as u16, 1),
    );
}

/// Draw the scrolled page into `area`.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    match app.home.state() {
        LoadState::Idle => return,
        LoadState::Loading if app.home.nav().categories().is_empty() => {
            let msg = format!("{} Loading videos...", spinner(app.spinner_frame));
            render_centered(f, area, Line::from(Span::styled(msg, palette.dim)));
            return;
        }
        LoadState::Failed(error) => {
            let lines = vec![
                Line::from(Span::styled("Failed to load videos", palette.status_error)),
                Line::from(Span::styled(error.clone(), palette.dim)),
                Line::default(),
                Line::from("Press r to retry"),
            ];
            let top = area.height.saturating_sub(lines.len() as u16) / 2;
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                Rect::new(area.x, area.y + top, area.width, area.height - top),
            );
            return;
        }
        LoadState::Loading | LoadState::Ready => {}
    }

    let metrics = app.home.metrics();
    let viewport = PageViewport {
        area,
        top_px: app.home.scroll_top() + metrics.fixed_offset,
        px_per_row: app.px_per_row(),
    };
    let geometry = app.home.geometry();

    // Featured strip
    if metrics.featured_height > 0.0 {
        let cards = featured_cards();
        for (card, (x, width)) in cards.iter().zip(column_spans(area.width, cards.len())) {
            if let Some(p) =
                viewport.place(geometry.featured_top, metrics.featured_height, x, width)
            {
                render_clipped(
                    f,
                    p,
                    featured_lines(card, width, palette),
                    palette.featured,
                    palette.border,
                );
            }
        }
    }

    // Sections
    let active = app.home.active_slug();
    for ((section, assignment), placed) in app.home.sections().zip(geometry.sections.iter()) {
        if let Some(p) = viewport.place(placed.top, metrics.section_title_height, 0, area.width) {
            if p.hidden_above == 0 {
                let marker = if section.slug() == active { "▍" } else { " " };
                let title = format!("{marker}{}", section.category.name);
                let remaining = usize::from(area.width).saturating_sub(display_width(&title) + 2);
                let description = section.category.description.as_deref().unwrap_or_default();
                let line = Line::from(vec![
                    Span::styled(title, palette.section_title),
                    Span::raw("  "),
                    Span::styled(
                        truncate_to_width(description, remaining).into_owned(),
                        palette.section_description,
                    ),
                ]);
                f.render_widget(
                    Paragraph::new(line),
                    Rect::new(p.rect.x, p.rect.y, p.rect.width, 1),
                );
            }
        }

        let spans = column_spans(area.width, assignment.column_count());
        for (column, (x, width)) in assignment.columns().iter().zip(spans) {
            let mut y = placed.grid_top;
            for item in column {
                let height = f64::from(item.display_height);
                if let Some(p) = viewport.place(y, height, x, width) {
                    render_clipped(
                        f,
                        p,
                        item_lines(item, CardVariant::Grid, width, palette),
                        palette.card,
                        palette.border,
                    );
                }
                y += height + metrics.grid_gap;
            }
        }
    }
}

pub(super) fn render_centered(f: &mut Frame, area: Rect, line: Line<'_>) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    f.render_widget(
        Paragraph::new(line).alignment(Alignment::Center),
        Rect::new(area.x, y, area.width, 1),
    );
}
