//! Background task event processing.
//!
//! Each completion carries the generation it was started with; the owning
//! controller drops anything stale before it touches state.

use crate::app::{App, AppEvent};
use crate::gallery::GalleryState;
use crate::home::LoadState;
use crate::remix::GenerationState;

pub(super) async fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::HomeLoaded(loaded) => {
            if !app.home.handle_loaded(loaded) {
                return;
            }
            if let LoadState::Failed(e) = app.home.state() {
                let msg = format!("Failed to load videos: {e}");
                app.set_status(msg);
            }
        }

        AppEvent::GalleryLoaded(loaded) => {
            let Some(gallery) = app.gallery.as_mut() else {
                tracing::debug!("Gallery result arrived after leaving the page");
                return;
            };
            if !gallery.handle_loaded(loaded) {
                return;
            }
            if let GalleryState::Failed(e) = gallery.state() {
                let msg = format!("Failed to load {}: {e}", gallery.slug());
                app.set_status(msg);
            }
        }

        AppEvent::RemixGenerated(done) => {
            let Some(draft) = app.remix.as_mut() else {
                tracing::debug!("Remix result arrived after the panel closed");
                return;
            };
            let Some(used) = draft.handle_generated(done) else {
                if let GenerationState::Failed(e) = draft.state() {
                    let msg = format!("Failed to generate: {e}");
                    app.set_status(msg);
                }
                return;
            };
            app.history.record(used);
            if let Err(e) = app.history.save(&app.db).await {
                tracing::warn!(error = %e, "Failed to persist reference history");
                app.set_status(format!("Video ready (history not saved: {e})"));
            } else {
                app.set_status("Video ready");
            }
        }

        AppEvent::PersistFailed { what, error } => {
            tracing::warn!(what, error = %error, "Preference write failed");
            app.set_status(format!("Error: {what} not saved ({error})"));
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Error: internal task '{task}' failed"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::config::Config;
    use crate::home::HomeLoaded;
    use crate::preferences::PreferenceManager;
    use crate::remix::{ReferenceFile, ReferenceHistory, RemixDraft, RemixGenerated};
    use crate::storage::Database;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let config = Config::default();
        let prefs = PreferenceManager::from_config(&config);
        App::new(config, db, prefs, ReferenceHistory::new(3))
    }

    #[tokio::test]
    async fn test_stale_home_result_ignored() {
        let mut app = test_app().await;
        let event = AppEvent::HomeLoaded(HomeLoaded {
            generation: 42,
            result: Err(CatalogError::Unavailable("boom".into())),
        });
        handle_app_event(&mut app, event).await;
        assert_eq!(*app.home.state(), LoadState::Idle);
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_remix_success_records_history() {
        let mut app = test_app().await;
        app.confirm_login();
        let mut draft = RemixDraft::new(None);
        draft.add_files([
            ReferenceFile::new("a.png", 10, "image/png"),
            ReferenceFile::new("b.jpg", 10, "image/jpeg"),
        ]);
        let generation = draft.begin_generate(&app.session).unwrap();
        app.remix = Some(draft);

        let event = AppEvent::RemixGenerated(RemixGenerated {
            generation,
            result: Ok("preview".to_string()),
        });
        handle_app_event(&mut app, event).await;

        assert_eq!(app.history.entries(), ["b.jpg", "a.png"]);
        let stored = ReferenceHistory::load(&app.db, 3).await.unwrap();
        assert_eq!(stored.entries(), ["b.jpg", "a.png"]);
    }

    #[tokio::test]
    async fn test_persist_failure_sets_status() {
        let mut app = test_app().await;
        let event = AppEvent::PersistFailed {
            what: "columns",
            error: "disk full".to_string(),
        };
        handle_app_event(&mut app, event).await;
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("columns"));
    }
}
