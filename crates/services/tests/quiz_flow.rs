use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{FinishReason, Question, QuizSettings, QuizSettingsDraft};
use quiz_core::quiz::{Direction, Grading, Navigation, QuizError};
use quiz_core::time::fixed_clock;
use services::{
    Feedback, FeedbackTone, Panel, QuestionView, QuizController, QuizDisplay, RecognitionError,
    SessionError, SpeechInput, SpeechOutput, TranscriptOutcome, Utterance,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Panel(Panel),
    Question(QuestionView),
    Feedback(Feedback),
    ClearFeedback,
    Heard(Option<String>),
    Score(String),
    Next(bool),
    Previous(bool),
    Voice(bool),
    Alert(String),
}

#[derive(Default)]
struct RecordingDisplay {
    events: Mutex<Vec<Event>>,
}

impl RecordingDisplay {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn last_feedback(&self) -> Option<Feedback> {
        self.events().into_iter().rev().find_map(|event| match event {
            Event::Feedback(feedback) => Some(feedback),
            _ => None,
        })
    }

    fn last_heard(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            Event::Heard(heard) => heard,
            _ => None,
        })
    }

    fn last_score(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            Event::Score(score) => Some(score),
            _ => None,
        })
    }
}

impl QuizDisplay for RecordingDisplay {
    fn show_panel(&self, panel: Panel) {
        self.push(Event::Panel(panel));
    }
    fn show_question(&self, question: &QuestionView) {
        self.push(Event::Question(question.clone()));
    }
    fn show_feedback(&self, feedback: &Feedback) {
        self.push(Event::Feedback(feedback.clone()));
    }
    fn clear_feedback(&self) {
        self.push(Event::ClearFeedback);
    }
    fn show_heard(&self, heard: Option<&str>) {
        self.push(Event::Heard(heard.map(str::to_owned)));
    }
    fn show_score(&self, score: &str) {
        self.push(Event::Score(score.to_owned()));
    }
    fn set_next_visible(&self, visible: bool) {
        self.push(Event::Next(visible));
    }
    fn set_previous_visible(&self, visible: bool) {
        self.push(Event::Previous(visible));
    }
    fn set_voice_input_visible(&self, visible: bool) {
        self.push(Event::Voice(visible));
    }
    fn alert(&self, message: &str) {
        self.push(Event::Alert(message.to_owned()));
    }
}

#[derive(Default)]
struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, utterance: &Utterance) {
        self.spoken.lock().unwrap().push(utterance.text.clone());
    }
    fn cancel(&self) {}
}

struct ScriptedInput {
    available: bool,
    result: Result<String, RecognitionError>,
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(&self) -> Result<String, RecognitionError> {
        self.result.clone()
    }
}

struct Harness {
    controller: QuizController,
    display: Arc<RecordingDisplay>,
    speech: Arc<RecordingSpeech>,
}

fn harness() -> Harness {
    harness_with(QuizSettings::default())
}

fn harness_with(settings: QuizSettings) -> Harness {
    let display = Arc::new(RecordingDisplay::default());
    let speech = Arc::new(RecordingSpeech::default());
    let controller = QuizController::with_seed(
        settings,
        display.clone(),
        speech.clone(),
        fixed_clock(),
        7,
    );
    Harness {
        controller,
        display,
        speech,
    }
}

fn pool() -> Vec<Question> {
    vec![
        Question::with_letter(
            "Capital of France?",
            vec!["Paris".into(), "Rome".into(), "Oslo".into()],
            "A",
            Some("Paris is the capital.".into()),
        )
        .unwrap(),
        Question::with_letter(
            "What is 1 + 1?",
            vec!["2".into(), "3".into(), "4".into()],
            "A",
            Some("Basic addition.".into()),
        )
        .unwrap(),
        Question::with_letter(
            "Largest planet?",
            vec!["Mars".into(), "Jupiter".into(), "Venus".into(), "Earth".into()],
            "B",
            None,
        )
        .unwrap(),
    ]
}

fn correct_index(controller: &QuizController) -> usize {
    controller
        .snapshot()
        .current_question()
        .unwrap()
        .correct_index()
}

fn wrong_index(controller: &QuizController) -> usize {
    (correct_index(controller) + 1) % 2
}

fn current_index(controller: &QuizController) -> Option<usize> {
    controller.snapshot().current_index()
}

async fn wait_past_delay(controller: &QuizController) {
    let delay = controller.settings().auto_advance_delay();
    tokio::time::sleep(delay + Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn three_question_run_reports_two_out_of_three() {
    let Harness {
        controller,
        display,
        ..
    } = harness();
    controller.start(&pool()).unwrap();
    assert_eq!(current_index(&controller), Some(0));

    let grading = controller.submit_answer(correct_index(&controller)).unwrap();
    assert!(grading.is_correct());
    assert!(controller.has_pending_advance());
    wait_past_delay(&controller).await;
    assert_eq!(current_index(&controller), Some(1));

    let grading = controller.submit_answer(wrong_index(&controller)).unwrap();
    assert!(matches!(grading, Grading::Incorrect { .. }));
    assert!(!controller.has_pending_advance());
    wait_past_delay(&controller).await;
    assert_eq!(current_index(&controller), Some(1), "wrong answers never auto-advance");
    assert!(display.events().contains(&Event::Next(true)));

    controller.advance(Direction::Next).unwrap();
    controller.submit_answer(correct_index(&controller)).unwrap();
    wait_past_delay(&controller).await;

    assert!(!controller.is_active());
    assert_eq!(
        display.alerts().last().map(String::as_str),
        Some("Quiz finished! Your score: 2 out of 3")
    );
    assert_eq!(
        display.events().iter().rev().find_map(|event| match event {
            Event::Panel(panel) => Some(*panel),
            _ => None,
        }),
        Some(Panel::Selection)
    );
    assert_eq!(display.last_score().as_deref(), Some("0 out of 0"));
}

#[tokio::test(start_paused = true)]
async fn manual_next_cancels_pending_auto_advance() {
    let Harness { controller, .. } = harness();
    controller.start(&pool()).unwrap();

    controller.submit_answer(correct_index(&controller)).unwrap();
    let navigation = controller.advance(Direction::Next).unwrap();
    assert_eq!(navigation, Navigation::Moved { index: 1 });
    assert!(!controller.has_pending_advance());

    wait_past_delay(&controller).await;
    assert_eq!(current_index(&controller), Some(1));
    assert_eq!(controller.snapshot().history(), &[0, 1]);
}

#[tokio::test(start_paused = true)]
async fn double_submit_counts_twice_but_advances_once() {
    let Harness { controller, .. } = harness();
    controller.start(&pool()).unwrap();

    let answer = correct_index(&controller);
    controller.submit_answer(answer).unwrap();
    controller.submit_answer(answer).unwrap();
    assert_eq!(controller.snapshot().attempted_count(), 2);
    assert_eq!(controller.snapshot().correct_count(), 2);

    wait_past_delay(&controller).await;
    wait_past_delay(&controller).await;
    assert_eq!(current_index(&controller), Some(1));
}

#[tokio::test(start_paused = true)]
async fn exiting_mid_quiz_discards_the_pending_advance() {
    let Harness {
        controller,
        display,
        ..
    } = harness();
    controller.start(&pool()).unwrap();
    controller.submit_answer(correct_index(&controller)).unwrap();

    let summary = controller.finish(FinishReason::Exited).unwrap().unwrap();
    assert_eq!(summary.correct_count(), 1);
    assert_eq!(summary.attempted_count(), 1);
    assert_eq!(
        display.alerts().last().map(String::as_str),
        Some("Quiz exited! Your score: 1 out of 1")
    );

    let alerts_before = display.alerts().len();
    wait_past_delay(&controller).await;
    assert!(!controller.is_active());
    assert_eq!(display.alerts().len(), alerts_before);
}

#[tokio::test]
async fn previous_on_first_question_is_a_no_op() {
    let Harness { controller, .. } = harness();
    controller.start(&pool()).unwrap();

    assert_eq!(
        controller.advance(Direction::Previous).unwrap(),
        Navigation::Unchanged
    );
    assert_eq!(current_index(&controller), Some(0));

    controller.advance(Direction::Next).unwrap();
    assert_eq!(
        controller.advance(Direction::Previous).unwrap(),
        Navigation::Moved { index: 0 }
    );
    assert_eq!(controller.snapshot().history(), &[0, 1]);
}

#[tokio::test]
async fn finish_while_idle_does_nothing() {
    let Harness {
        controller,
        display,
        speech,
    } = harness();

    assert!(controller.finish(FinishReason::Exited).unwrap().is_none());
    assert!(display.events().is_empty());
    assert!(speech.spoken.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_pool_alerts_and_stays_idle() {
    let Harness {
        controller,
        display,
        ..
    } = harness();

    let err = controller.start(&[]).unwrap_err();
    assert!(matches!(err, SessionError::Quiz(QuizError::EmptyPool)));
    assert_eq!(display.alerts(), vec!["No questions to display.".to_owned()]);
    assert!(!controller.is_active());
}

#[tokio::test]
async fn presenting_renders_and_speaks_the_current_question() {
    let Harness {
        controller,
        display,
        speech,
    } = harness();
    controller.start(&pool()).unwrap();

    let question = controller.snapshot().current_question().cloned().unwrap();
    let shown = display.events().into_iter().find_map(|event| match event {
        Event::Question(view) => Some(view),
        _ => None,
    });
    let shown = shown.unwrap();
    assert_eq!(shown.index, 0);
    assert_eq!(shown.total, 3);
    assert_eq!(shown.options, question.lettered_options());
    assert_eq!(
        speech.spoken.lock().unwrap().last(),
        Some(&question.spoken_prompt())
    );

    controller.present().unwrap();
    assert_eq!(
        speech.spoken.lock().unwrap().last(),
        Some(&question.spoken_prompt())
    );
}

#[tokio::test]
async fn wrong_answer_names_the_correct_option() {
    let Harness {
        controller,
        display,
        speech,
    } = harness();
    controller.start(&pool()).unwrap();

    let question = controller.snapshot().current_question().cloned().unwrap();
    controller.submit_answer(wrong_index(&controller)).unwrap();

    let feedback = display.last_feedback().unwrap();
    assert_eq!(feedback.tone, FeedbackTone::Incorrect);
    assert!(feedback.text.starts_with(&format!(
        "Wrong! Correct answer: {}.",
        question.correct_option()
    )));
    assert_eq!(speech.spoken.lock().unwrap().last(), Some(&feedback.text));
    assert_eq!(display.last_score().as_deref(), Some("0 out of 1"));
}

#[tokio::test]
async fn transcripts_grade_navigate_or_reprompt() {
    let Harness {
        controller,
        display,
        speech,
    } = harness();
    controller.start(&pool()).unwrap();

    let outcome = controller.handle_transcript("  Banana  ").unwrap();
    assert_eq!(outcome, TranscriptOutcome::NotUnderstood);
    assert_eq!(display.last_heard().as_deref(), Some("Heard: \"banana\""));
    assert_eq!(
        display.last_feedback().map(|feedback| feedback.tone),
        Some(FeedbackTone::Unrecognized)
    );
    assert_eq!(
        speech.spoken.lock().unwrap().last().map(String::as_str),
        Some("Sorry, I didn't understand that. Try again.")
    );
    assert_eq!(controller.snapshot().attempted_count(), 0);

    assert_eq!(
        controller.handle_transcript("next question").unwrap(),
        TranscriptOutcome::Ignored
    );
    assert_eq!(current_index(&controller), Some(0));

    let wrong_letter = ["a", "b", "c"][wrong_index(&controller)];
    let outcome = controller.handle_transcript(wrong_letter).unwrap();
    assert!(matches!(
        outcome,
        TranscriptOutcome::Graded(Grading::Incorrect { .. })
    ));

    let outcome = controller.handle_transcript("Next Question").unwrap();
    assert_eq!(
        outcome,
        TranscriptOutcome::Advanced(Navigation::Moved { index: 1 })
    );

    let question = controller.snapshot().current_question().cloned().unwrap();
    let outcome = controller
        .handle_transcript(&question.correct_option().to_uppercase())
        .unwrap();
    assert!(matches!(
        outcome,
        TranscriptOutcome::Graded(Grading::Correct { .. })
    ));
}

#[tokio::test]
async fn letter_beyond_the_options_is_not_understood() {
    let Harness {
        controller,
        display,
        speech,
    } = harness();
    let two = vec![
        Question::with_letter("2 + 2?", vec!["3".into(), "4".into()], "B", None).unwrap(),
    ];
    controller.start(&two).unwrap();

    let outcome = controller.handle_transcript("c").unwrap();
    assert_eq!(outcome, TranscriptOutcome::NotUnderstood);
    assert_eq!(
        display.last_feedback().map(|feedback| feedback.tone),
        Some(FeedbackTone::Unrecognized)
    );
    assert_eq!(
        speech.spoken.lock().unwrap().last().map(String::as_str),
        Some("Sorry, I didn't understand that. Try again.")
    );
    assert_eq!(controller.snapshot().attempted_count(), 0);
    assert_eq!(current_index(&controller), Some(0));
}

#[tokio::test]
async fn letter_d_is_only_accepted_when_enabled() {
    let four = vec![
        Question::with_letter(
            "Pick the last",
            vec!["w".into(), "x".into(), "y".into(), "z".into()],
            "D",
            None,
        )
        .unwrap(),
    ];

    let Harness { controller, .. } = harness();
    controller.start(&four).unwrap();
    assert!(matches!(
        controller.handle_transcript("d").unwrap(),
        TranscriptOutcome::Graded(Grading::Correct { .. })
    ));

    let settings = QuizSettingsDraft {
        accept_letter_d: Some(false),
        ..QuizSettingsDraft::default()
    }
    .validate()
    .unwrap();
    let Harness { controller, .. } = harness_with(settings);
    controller.start(&four).unwrap();
    assert_eq!(
        controller.handle_transcript("d").unwrap(),
        TranscriptOutcome::NotUnderstood
    );
}

#[tokio::test]
async fn recognition_errors_are_echoed() {
    let Harness {
        controller,
        display,
        ..
    } = harness();
    controller.start(&pool()).unwrap();

    let input = ScriptedInput {
        available: true,
        result: Err(RecognitionError::new("network")),
    };
    let err = controller.listen(&input).await.unwrap_err();
    assert!(matches!(err, SessionError::Recognition(_)));
    assert_eq!(
        display.last_heard().as_deref(),
        Some("Recognition error: network")
    );

    let input = ScriptedInput {
        available: true,
        result: Ok("next question".into()),
    };
    assert_eq!(
        controller.listen(&input).await.unwrap(),
        TranscriptOutcome::Ignored
    );
}

#[tokio::test]
async fn voice_control_follows_recognizer_support() {
    let Harness {
        controller,
        display,
        ..
    } = harness();
    let input = ScriptedInput {
        available: false,
        result: Ok(String::new()),
    };

    controller.sync_voice_control(&input);
    assert_eq!(display.events(), vec![Event::Voice(false)]);

    controller.start(&pool()).unwrap();
    assert!(matches!(
        controller.listen(&input).await,
        Err(SessionError::VoiceUnavailable)
    ));
}

#[tokio::test]
async fn stars_score_style_tracks_hits_and_misses() {
    let settings = QuizSettingsDraft {
        score_display_style: Some("stars".parse().unwrap()),
        ..QuizSettingsDraft::default()
    }
    .validate()
    .unwrap();
    let Harness {
        controller,
        display,
        ..
    } = harness_with(settings);
    controller.start(&pool()).unwrap();

    controller.submit_answer(correct_index(&controller)).unwrap();
    controller.submit_answer(wrong_index(&controller)).unwrap();
    assert_eq!(display.last_score().as_deref(), Some("★☆"));
}
