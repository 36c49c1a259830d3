//! Render functions for the TUI.
//!
//! Dispatches on the current view, then draws any overlay on top.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::helpers::{
    centered_fixed, column_spans, item_lines, render_clipped, spinner, PageViewport,
};
use super::{explore, help, status};
use crate::app::{App, Overlay, View};
use crate::gallery::GalleryState;
use crate::layout::CardVariant;
use crate::remix::{GenerationState, MAX_IMAGES};
use crate::util::{display_width, fit_to_width};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) const HEADER_HEIGHT: u16 = 1;
/// Tab bar on the explore view, title block on the gallery view.
pub(super) const SUBHEADER_HEIGHT: u16 = 2;
pub(super) const STATUS_HEIGHT: u16 = 1;
/// Rows not available to page content.
pub(super) const CHROME_ROWS: u16 = HEADER_HEIGHT + SUBHEADER_HEIGHT + STATUS_HEIGHT;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(SUBHEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view {
        View::Home => {
            explore::render_tabs(f, app, chunks[1]);
            explore::render(f, app, chunks[2]);
        }
        View::Category => render_gallery(f, app, chunks[1], chunks[2]),
        View::Account => render_account(f, app, chunks[1], chunks[2]),
    }
    status::render(f, app, chunks[3]);

    match app.overlay {
        Some(Overlay::Help) => help::render(f, app),
        Some(Overlay::Login) => render_login_overlay(f, app),
        Some(Overlay::Remix) => render_remix_overlay(f, app),
        None => {}
    }
}

/// App name on the left, user and credits (or a sign-in hint) on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let right = match app.session.user() {
        Some(user) => format!("{}  {} credits ", user.name, user.credits),
        None => "[L] Sign in ".to_string(),
    };
    let right_width = display_width(&right) as u16;
    f.render_widget(
        Paragraph::new(Span::styled(" Nami Video", palette.header)),
        area,
    );
    if area.width > right_width {
        f.render_widget(
            Paragraph::new(Span::styled(right, palette.header_user)),
            Rect::new(
                area.x + area.width - right_width,
                area.y,
                right_width,
                area.height,
            ),
        );
    }
}

fn render_gallery(f: &mut Frame, app: &App, title_area: Rect, area: Rect) {
    let palette = &app.palette;
    let Some(gallery) = app.gallery.as_ref() else {
        return;
    };

    if let Some(category) = gallery.category() {
        let lines = vec![
            Line::from(Span::styled(format!(" {}", category.name), palette.section_title)),
            Line::from(Span::styled(
                format!(" {}", category.description.as_deref().unwrap_or_default()),
                palette.section_description,
            )),
        ];
        f.render_widget(Paragraph::new(lines), title_area);
    }

    match gallery.state() {
        GalleryState::Loading => explore::render_centered(
            f,
            area,
            Line::from(Span::styled(
                format!("{} Loading {}...", spinner(app.spinner_frame), gallery.slug()),
                palette.dim,
            )),
        ),
        GalleryState::NotFound => {
            let lines = vec![
                Line::from(Span::styled("Category not found", palette.status_error)),
                Line::from(Span::styled(
                    format!("No category named '{}'", gallery.slug()),
                    palette.dim,
                )),
                Line::default(),
                Line::from("Press Esc to go back to explore"),
            ];
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                area,
            );
        }
        GalleryState::Failed(error) => {
            let lines = vec![
                Line::from(Span::styled("Failed to load videos", palette.status_error)),
                Line::from(Span::styled(error.clone(), palette.dim)),
                Line::default(),
                Line::from("Press r to retry"),
            ];
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center),
                area,
            );
        }
        GalleryState::Ready(assignment) => {
            let px_per_row = app.px_per_row();
            let viewport = PageViewport {
                area,
                top_px: gallery.scroll_row() as f64 * px_per_row,
                px_per_row,
            };
            let gap = app.config.layout.grid_gap;
            let spans = column_spans(area.width, assignment.column_count());
            for (column, (x, width)) in assignment.columns().iter().zip(spans) {
                let mut y = 0.0;
                for item in column {
                    let height = f64::from(item.display_height);
                    if let Some(p) = viewport.place(y, height, x, width) {
                        render_clipped(
                            f,
                            p,
                            item_lines(item, CardVariant::Gallery, width, palette),
                            palette.card,
                            palette.border,
                        );
                    }
                    y += height + gap;
                }
            }
        }
    }
}

fn render_account(f: &mut Frame, app: &App, title_area: Rect, area: Rect) {
    let palette = &app.palette;
    f.render_widget(
        Paragraph::new(Span::styled(" Account", palette.section_title)),
        title_area,
    );
    let Some(user) = app.session.user() else {
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  Name     ", palette.dim),
            Span::raw(user.name.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Email    ", palette.dim),
            Span::raw(user.email.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Credits  ", palette.dim),
            Span::styled(user.credits.to_string(), palette.accent),
        ]),
        Line::default(),
        Line::from(Span::styled("  Recent reference images", palette.section_title)),
    ];
    if app.history.is_empty() {
        lines.push(Line::from(Span::styled("  (none yet)", palette.dim)));
    }
    for entry in app.history.entries() {
        lines.push(Line::from(format!("  {entry}")));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("  [O] sign out", palette.dim)));

    f.render_widget(Paragraph::new(lines), area);
}

fn render_login_overlay(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let overlay = centered_fixed(44, 7, f.area());
    f.render_widget(Clear, overlay);

    let lines = vec![
        Line::default(),
        Line::from("Sign in to continue"),
        Line::default(),
        Line::from(vec![
            Span::styled("[Enter]", palette.accent),
            Span::raw(" continue as John Doe  "),
            Span::styled("[Esc]", palette.accent),
            Span::raw(" cancel"),
        ]),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.modal_border)
            .title(" Sign in "),
    );
    f.render_widget(paragraph, overlay);
}

fn render_remix_overlay(f: &mut Frame, app: &App) {
    let palette = &app.palette;
    let Some(draft) = app.remix.as_ref() else {
        return;
    };
    let overlay = centered_fixed(64, 20, f.area());
    f.render_widget(Clear, overlay);
    let inner_width = usize::from(overlay.width.saturating_sub(4));

    let mut lines = vec![
        Line::from(Span::styled(draft.title().to_string(), palette.section_title)),
        Line::default(),
        Line::from(Span::styled(
            format!("Reference images ({}/{MAX_IMAGES})", draft.images().len()),
            palette.dim,
        )),
    ];
    for image in draft.images() {
        lines.push(Line::from(format!(
            " {:>2}. {} ({:?})",
            image.id,
            fit_to_width(&image.name, inner_width.saturating_sub(14)),
            image.format
        )));
    }
    if let Some(input) = &app.remix_input {
        lines.push(Line::from(vec![
            Span::styled(" path: ", palette.accent),
            Span::raw(input.clone()),
            Span::styled("_", palette.accent),
        ]));
    }
    lines.push(Line::default());

    let state_line = match draft.state() {
        GenerationState::Idle => Line::from(Span::styled("Ready to generate", palette.dim)),
        GenerationState::Generating => Line::from(Span::styled(
            format!("{} Generating video...", spinner(app.spinner_frame)),
            palette.accent,
        )),
        GenerationState::Done { preview } => Line::from(vec![
            Span::styled("Preview: ", palette.accent),
            Span::raw(preview.clone()),
        ]),
        GenerationState::Failed(e) => {
            Line::from(Span::styled(format!("Failed: {e}"), palette.status_error))
        }
    };
    lines.push(state_line);

    if !app.history.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Recently used", palette.dim)));
        for entry in app.history.entries().iter().take(3) {
            lines.push(Line::from(format!(" {}", fit_to_width(entry, inner_width))));
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.modal_border)
            .title(" Remix ")
            .title_bottom(" [a] add  [x] remove  [Enter] generate  [Esc] close "),
    );
    f.render_widget(paragraph, overlay);
}
