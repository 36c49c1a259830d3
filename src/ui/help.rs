//! Help overlay listing the live key bindings.
//!
//! User overrides are shown as bound. The group for the view underneath the
//! overlay is moved up and marked.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::helpers::centered_rect;

/// Context display order and labels for the help screen.
const CONTEXT_ORDER: [(Context, &str); 5] = [
    (Context::Global, "General"),
    (Context::Home, "Explore"),
    (Context::Gallery, "Category"),
    (Context::Remix, "Remix"),
    (Context::LoginModal, "Sign in"),
];

/// Groups in display order: general bindings, then the context the user is
/// in, then the rest.
fn ordered_groups(current: Context) -> Vec<(Context, &'static str)> {
    let mut groups = CONTEXT_ORDER.to_vec();
    if let Some(pos) = groups.iter().position(|(ctx, _)| *ctx == current) {
        if pos > 1 {
            let group = groups.remove(pos);
            groups.insert(1, group);
        }
    }
    groups
}

/// Number of rows the help table would occupy, headers and separators included.
pub(super) fn row_count(app: &App) -> usize {
    let bindings = app.keybindings.all_bindings();
    let groups = CONTEXT_ORDER
        .iter()
        .filter(|(ctx, _)| bindings.iter().any(|(c, _, _, _)| c == ctx))
        .count();
    // Header and separator per group, minus the trailing separator
    bindings.len() + (groups * 2).saturating_sub(1)
}

fn group_rows<'a>(app: &'a App, current: Context) -> Vec<Row<'a>> {
    let palette = &app.palette;
    let bindings = app.keybindings.all_bindings();
    let mut rows = Vec::new();

    for (ctx, label) in ordered_groups(current) {
        let entries: Vec<_> = bindings.iter().filter(|(c, _, _, _)| *c == ctx).collect();
        if entries.is_empty() {
            continue;
        }

        let heading = if ctx == current && ctx != Context::Global {
            format!("▸ {label} (here)")
        } else {
            format!("  {label}")
        };
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    heading,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(palette.accent),
        );

        rows.extend(entries.into_iter().map(|(_, key, _, description)| {
            Row::new(vec![format!("    {key}"), description.to_string()])
        }));
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();
    rows
}

/// Draw the help overlay above whatever view is open.
pub fn render(f: &mut Frame, app: &App) {
    let popup = centered_rect(80, 80, f.area());
    if popup.width < 20 || popup.height < 6 {
        return;
    }
    f.render_widget(Clear, popup);

    let palette = &app.palette;
    let rows = group_rows(app, app.context_behind_help());

    // Borders and the header row
    let body_height = usize::from(popup.height.saturating_sub(3));
    let max_scroll = rows.len().saturating_sub(body_height);
    let scroll = app.help_scroll.min(max_scroll);
    let visible: Vec<Row> = rows.into_iter().skip(scroll).take(body_height).collect();

    let title = match max_scroll {
        0 => " Keys (? to close) ".to_string(),
        _ => format!(" Keys {}/{} ", scroll + 1, max_scroll + 1),
    };

    let table = Table::new(visible, [Constraint::Length(18), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.modal_border)
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Does"])
                .style(palette.dim.add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        );
    f.render_widget(table, popup);

    if scroll < max_scroll {
        let hint_area = Rect {
            x: popup.x + 1,
            y: popup.bottom().saturating_sub(1),
            width: popup.width.saturating_sub(2),
            height: 1,
        };
        let hint = Line::from(Span::styled(" j/k scroll · ? or Esc close ", palette.dim));
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_context_listed_after_general() {
        let groups = ordered_groups(Context::Remix);
        assert_eq!(groups[0].0, Context::Global);
        assert_eq!(groups[1].0, Context::Remix);
        assert_eq!(groups.len(), CONTEXT_ORDER.len());
    }

    #[test]
    fn test_order_unchanged_on_home() {
        let groups = ordered_groups(Context::Home);
        let expected: Vec<Context> = CONTEXT_ORDER.iter().map(|(c, _)| *c).collect();
        let actual: Vec<Context> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(actual, expected);
    }
}
