use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

use super::helpers::spinner;
use crate::app::{App, Overlay, View};

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Status bar needs at least 1 char width to be meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.home.is_loading() {
        Cow::Owned(format!("{} Loading...", spinner(app.spinner_frame)))
    } else if app.remix_input.is_some() {
        Cow::Borrowed("Type a PNG/JPEG path | ENTER add | ESC cancel")
    } else {
        match (app.overlay, app.view) {
            (Some(Overlay::Help), _) => Cow::Borrowed("[j/k]scroll [?/Esc]close"),
            (Some(Overlay::Login), _) => Cow::Borrowed("[Enter]sign in [Esc]cancel"),
            (Some(Overlay::Remix), _) => {
                Cow::Borrowed("[a]dd image [x]remove [Enter]generate [Esc]close")
            }
            (None, View::Home) => Cow::Borrowed(
                "[h/l]tabs [1-0]jump [j/k]scroll [Enter]open [m]remix [+/-]columns [?]help [q]uit",
            ),
            (None, View::Category) => {
                Cow::Borrowed("[j/k]scroll [m]remix [r]eload [Esc]back [?]help [q]uit")
            }
            (None, View::Account) => Cow::Borrowed("[O]sign out [Esc]back [q]uit"),
        }
    };

    let style = if app
        .status_message
        .as_ref()
        .is_some_and(|(msg, _)| msg.starts_with("Failed") || msg.starts_with("Error"))
    {
        app.palette.status_error
    } else {
        app.palette.status_bar
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
