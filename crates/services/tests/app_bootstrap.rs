use std::sync::Arc;

use quiz_core::model::{CatalogLocation, CatalogPath, QuizSettings, Theme};
use quiz_core::time::fixed_clock;
use services::{AppServices, SilentSpeech};
use storage::repository::Storage;

mod support {
    use services::{Feedback, Panel, QuestionView, QuizDisplay};

    pub struct NullDisplay;

    impl QuizDisplay for NullDisplay {
        fn show_panel(&self, _panel: Panel) {}
        fn show_question(&self, _question: &QuestionView) {}
        fn show_feedback(&self, _feedback: &Feedback) {}
        fn clear_feedback(&self) {}
        fn show_heard(&self, _heard: Option<&str>) {}
        fn show_score(&self, _score: &str) {}
        fn set_next_visible(&self, _visible: bool) {}
        fn set_previous_visible(&self, _visible: bool) {}
        fn set_voice_input_visible(&self, _visible: bool) {}
        fn alert(&self, _message: &str) {}
    }
}

fn missing_file() -> CatalogLocation {
    "does-not-exist/data.json".parse().unwrap()
}

#[tokio::test]
async fn missing_catalog_file_falls_back_and_still_runs_a_quiz() {
    let services =
        AppServices::from_storage(Storage::in_memory(), &missing_file(), fixed_clock()).unwrap();

    let load = services.catalog().load().await;
    assert!(load.fallback);
    assert_eq!(load.catalog.class_names(), vec!["Class 6"]);
    assert_eq!(load.catalog.subject_names(0).unwrap(), vec!["Fallback"]);
    assert_eq!(load.catalog.chapter_names(0, 0).unwrap(), vec!["Test"]);

    let controller = services.quiz_controller(
        QuizSettings::default(),
        Arc::new(support::NullDisplay),
        Arc::new(SilentSpeech),
    );
    controller
        .start_selection(&load.catalog, CatalogPath::new(0, 0, 0))
        .unwrap();
    let question = controller.snapshot().current_question().cloned().unwrap();
    assert_eq!(question.text(), "What is 1 + 1?");
    assert!(controller.submit_answer(0).unwrap().is_correct());
}

#[tokio::test]
async fn unknown_selection_is_rejected() {
    let services =
        AppServices::from_storage(Storage::in_memory(), &missing_file(), fixed_clock()).unwrap();
    let load = services.catalog().load().await;
    let controller = services.quiz_controller(
        QuizSettings::default(),
        Arc::new(support::NullDisplay),
        Arc::new(SilentSpeech),
    );

    assert!(
        controller
            .start_selection(&load.catalog, CatalogPath::new(3, 0, 0))
            .is_err()
    );
    assert!(!controller.is_active());
}

#[tokio::test]
async fn theme_preference_round_trips_through_storage() {
    let services =
        AppServices::from_storage(Storage::in_memory(), &missing_file(), fixed_clock()).unwrap();
    let preferences = services.preferences();

    assert_eq!(preferences.theme().await.unwrap(), Theme::Light);
    preferences.set_theme(Theme::HighContrast).await.unwrap();
    assert_eq!(preferences.theme().await.unwrap(), Theme::HighContrast);
}
