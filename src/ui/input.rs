//! Keyboard and mouse input handling.
//!
//! Keys resolve to an [`KbAction`] through the keybinding registry for the
//! current context; text entry in the remix panel and the number-key tab
//! shortcuts bypass the registry.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use super::help;
use super::loop_runner::Action;
use super::render::HEADER_HEIGHT;
use crate::app::{App, AppEvent, Overlay, View};
use crate::keybindings::Action as KbAction;
use crate::nav::Route;
use crate::util::catch_task_panic;

/// Rows moved per j/k press.
const SCROLL_STEP_ROWS: i32 = 2;
/// Rows moved per mouse wheel notch.
const WHEEL_STEP_ROWS: i32 = 3;

pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.remix_input.is_some() {
        handle_path_input(app, code);
        return Ok(Action::Continue);
    }

    // 1-9 and 0 jump to the first ten tabs
    if app.overlay.is_none() && app.view == View::Home && !modifiers.contains(KeyModifiers::CONTROL)
    {
        if let KeyCode::Char(c @ '0'..='9') = code {
            let index = match c {
                '0' => 9,
                _ => c as usize - '1' as usize,
            };
            app.click_tab_index(index);
            return Ok(Action::Continue);
        }
    }

    // Shifted characters arrive with SHIFT set; the character already says it
    let modifiers = if matches!(code, KeyCode::Char(_)) {
        modifiers.difference(KeyModifiers::SHIFT)
    } else {
        modifiers
    };

    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, app.context())
    else {
        return Ok(Action::Continue);
    };
    dispatch(app, action, event_tx).await
}

async fn dispatch(
    app: &mut App,
    action: KbAction,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let help_open = app.overlay == Some(Overlay::Help);

    match action {
        KbAction::Quit => return Ok(Action::Quit),
        KbAction::ScrollDown if help_open => {
            app.help_scroll = (app.help_scroll + 1).min(help::row_count(app));
        }
        KbAction::ScrollUp if help_open => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        KbAction::ScrollDown => app.scroll_rows(SCROLL_STEP_ROWS),
        KbAction::ScrollUp => app.scroll_rows(-SCROLL_STEP_ROWS),
        KbAction::PageDown => app.scroll_rows(app.page_rows()),
        KbAction::PageUp => app.scroll_rows(-app.page_rows()),
        KbAction::ScrollTop => app.scroll_to_top(),
        KbAction::NextCategory => app.step_tab(1),
        KbAction::PrevCategory => app.step_tab(-1),
        KbAction::OpenCategory => {
            let slug = app.home.active_slug().to_string();
            if !slug.is_empty() {
                app.navigate(Route::Category { slug }, event_tx);
            }
        }
        KbAction::Back => {
            app.back();
        }
        KbAction::Retry => app.retry(event_tx),
        KbAction::MoreColumns => change_columns(app, 1, event_tx),
        KbAction::FewerColumns => change_columns(app, -1, event_tx),
        KbAction::CycleTheme => {
            if let Err(e) = app.cycle_theme().await {
                tracing::warn!(error = %e, "Failed to persist theme");
                app.set_status(format!("Error: theme not saved ({e})"));
            }
        }
        KbAction::ShowHelp => {
            if help_open {
                app.close_help();
            } else {
                app.overlay = Some(Overlay::Help);
                app.help_scroll = 0;
            }
        }
        KbAction::SignIn => {
            if app.session.is_authenticated() {
                app.set_status("Already signed in");
            } else {
                app.session.open_login_modal();
                app.overlay = Some(Overlay::Login);
            }
        }
        KbAction::SignOut => {
            if app.session.is_authenticated() {
                app.sign_out();
            }
        }
        KbAction::OpenRemix => app.open_remix_for_active(event_tx),
        KbAction::OpenAccount => app.navigate(Route::Account, event_tx),
        KbAction::AddImage => {
            if app.remix.is_some() {
                app.remix_input = Some(String::new());
            }
        }
        KbAction::RemoveImage => {
            if let Some(draft) = app.remix.as_mut() {
                if let Some(id) = draft.images().last().map(|img| img.id) {
                    draft.remove_image(id);
                }
            }
        }
        KbAction::Generate => app.start_remix(event_tx),
        KbAction::Confirm => {
            if app.overlay == Some(Overlay::Login) {
                app.confirm_login();
            }
        }
    }
    Ok(Action::Continue)
}

/// Typing a reference image path in the remix panel.
fn handle_path_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.remix_input = None,
        KeyCode::Enter => {
            if let Some(path) = app.remix_input.take() {
                if !path.trim().is_empty() {
                    app.add_remix_file(&path);
                }
            }
        }
        KeyCode::Backspace => {
            if let Some(buffer) = app.remix_input.as_mut() {
                buffer.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(buffer) = app.remix_input.as_mut() {
                buffer.push(c);
            }
        }
        _ => {}
    }
}

/// Change the column count and store it in the background.
fn change_columns(app: &mut App, delta: isize, event_tx: &mpsc::Sender<AppEvent>) {
    let before = app.columns;
    app.change_columns(delta);
    if app.columns == before {
        return;
    }

    let db = app.db.clone();
    let tx = event_tx.clone();
    let value = app.columns.to_string();
    tokio::spawn(async move {
        let event = match catch_task_panic(db.set_preference("columns", &value)).await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => AppEvent::PersistFailed {
                what: "columns",
                error: e.to_string(),
            },
            Err(panic_msg) => AppEvent::TaskPanicked {
                task: "persist_columns",
                error: panic_msg,
            },
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Channel send failed (receiver dropped)");
        }
    });
}

/// Mouse wheel scrolls; a left click on the tab bar selects that tab.
pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let help_open = app.overlay == Some(Overlay::Help);
    match mouse.kind {
        MouseEventKind::ScrollDown if help_open => {
            app.help_scroll = (app.help_scroll + 1).min(help::row_count(app));
        }
        MouseEventKind::ScrollUp if help_open => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        MouseEventKind::ScrollDown if app.overlay.is_none() => app.scroll_rows(WHEEL_STEP_ROWS),
        MouseEventKind::ScrollUp if app.overlay.is_none() => app.scroll_rows(-WHEEL_STEP_ROWS),
        MouseEventKind::Down(MouseButton::Left)
            if app.overlay.is_none() && app.view == View::Home && mouse.row == HEADER_HEIGHT =>
        {
            if let Some(slug) = app.tab_at(mouse.column) {
                app.click_tab(&slug);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preferences::PreferenceManager;
    use crate::remix::ReferenceHistory;
    use crate::storage::Database;

    async fn loaded_app() -> (App, mpsc::Sender<AppEvent>) {
        let db = Database::open(":memory:").await.unwrap();
        let config = Config::default();
        let prefs = PreferenceManager::from_config(&config);
        let mut app = App::new(config, db, prefs, ReferenceHistory::new(10));
        app.home.install(app.catalog.home_data_now());
        app.on_resize(20);
        app.layout_tabs(120);
        let (tx, _rx) = mpsc::channel(16);
        (app, tx)
    }

    #[tokio::test]
    async fn test_number_keys_select_tabs() {
        let (mut app, tx) = loaded_app().await;
        handle_input(&mut app, KeyCode::Char('3'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert_eq!(app.home.active_slug(), "viral");
        handle_input(&mut app, KeyCode::Char('0'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert_eq!(app.home.active_slug(), "seedance-pro");
    }

    #[tokio::test]
    async fn test_shifted_binding_resolves() {
        let (mut app, tx) = loaded_app().await;
        handle_input(&mut app, KeyCode::Char('L'), KeyModifiers::SHIFT, &tx)
            .await
            .unwrap();
        assert_eq!(app.overlay, Some(Overlay::Login));
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert!(app.session.is_authenticated());
        assert_eq!(app.overlay, None);
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut app, tx) = loaded_app().await;
        let action = handle_input(&mut app, KeyCode::Char('q'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert!(matches!(action, Action::Quit));
    }

    #[tokio::test]
    async fn test_path_input_swallows_keys() {
        let (mut app, tx) = loaded_app().await;
        app.confirm_login();
        app.navigate(Route::Remix { title: None }, &tx);
        handle_input(&mut app, KeyCode::Char('a'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert_eq!(app.remix_input.as_deref(), Some(""));

        for c in "q1".chars() {
            let action = handle_input(&mut app, KeyCode::Char(c), KeyModifiers::NONE, &tx)
                .await
                .unwrap();
            assert!(matches!(action, Action::Continue));
        }
        assert_eq!(app.remix_input.as_deref(), Some("q1"));

        handle_input(&mut app, KeyCode::Esc, KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert!(app.remix_input.is_none());
        assert_eq!(app.overlay, Some(Overlay::Remix));
    }

    #[tokio::test]
    async fn test_wheel_scroll_releases_click_claim() {
        let (mut app, _tx) = loaded_app().await;
        app.click_tab("ugc");
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 10,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, wheel);
        assert!(app.scroll_target.is_none());
        assert!(app.home.scroll_top() > 0.0);
    }

    #[tokio::test]
    async fn test_click_on_tab_bar() {
        let (mut app, _tx) = loaded_app().await;
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 20,
            row: HEADER_HEIGHT,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, click);
        assert_eq!(app.home.active_slug(), "camera-controls");
    }
}
