//! Terminal adapters for the quiz display and speech collaborators.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::Theme;
use services::{
    Feedback, FeedbackTone, Panel, QuestionView, QuizDisplay, RecognitionError, SpeechInput,
    SpeechOutput, Utterance,
};
use tokio::sync::watch;
use tracing::debug;

const RESET: &str = "\x1b[0m";

struct Palette {
    heading: &'static str,
    correct: &'static str,
    incorrect: &'static str,
    unrecognized: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                heading: "\x1b[1m",
                correct: "\x1b[32m",
                incorrect: "\x1b[31m",
                unrecognized: "\x1b[33m",
            },
            Theme::Dark => Self {
                heading: "\x1b[1;97m",
                correct: "\x1b[92m",
                incorrect: "\x1b[91m",
                unrecognized: "\x1b[93m",
            },
            Theme::HighContrast => Self {
                heading: "\x1b[1;4;97m",
                correct: "\x1b[1;92m",
                incorrect: "\x1b[1;91m",
                unrecognized: "\x1b[1;93m",
            },
        }
    }

    fn tone(&self, tone: FeedbackTone) -> &'static str {
        match tone {
            FeedbackTone::Correct => self.correct,
            FeedbackTone::Incorrect => self.incorrect,
            FeedbackTone::Unrecognized => self.unrecognized,
        }
    }
}

/// Prints quiz output to stdout and publishes panel switches to the input loop.
pub struct ConsoleDisplay {
    palette: Palette,
    panel: watch::Sender<Panel>,
    previous_visible: AtomicBool,
    voice_visible: AtomicBool,
}

impl ConsoleDisplay {
    pub fn new(theme: Theme) -> (Self, watch::Receiver<Panel>) {
        let (panel, receiver) = watch::channel(Panel::Selection);
        let display = Self {
            palette: Palette::for_theme(theme),
            panel,
            previous_visible: AtomicBool::new(false),
            voice_visible: AtomicBool::new(false),
        };
        (display, receiver)
    }

    pub fn heading(&self, text: &str) {
        println!("\n{}{text}{RESET}", self.palette.heading);
    }

    fn controls(&self) -> String {
        let mut controls = vec!["a-d or 1-4 to answer"];
        if self.voice_visible.load(Ordering::Relaxed) {
            controls.push("say <words>");
        }
        if self.previous_visible.load(Ordering::Relaxed) {
            controls.push("prev");
        }
        controls.extend(["next", "repeat", "exit"]);
        controls.join(" | ")
    }
}

impl QuizDisplay for ConsoleDisplay {
    fn show_panel(&self, panel: Panel) {
        self.panel.send_replace(panel);
    }

    fn show_question(&self, question: &QuestionView) {
        self.heading(&format!(
            "Question {} of {}",
            question.index + 1,
            question.total
        ));
        println!("{}", question.text);
        for option in &question.options {
            println!("  {option}");
        }
        println!("({})", self.controls());
    }

    fn show_feedback(&self, feedback: &Feedback) {
        println!("{}{}{RESET}", self.palette.tone(feedback.tone), feedback.text);
    }

    fn clear_feedback(&self) {}

    fn show_heard(&self, heard: Option<&str>) {
        if let Some(heard) = heard {
            println!("{heard}");
        }
    }

    fn show_score(&self, score: &str) {
        println!("Score: {score}");
    }

    fn set_next_visible(&self, visible: bool) {
        if visible {
            println!("(type `next` to continue)");
        }
    }

    fn set_previous_visible(&self, visible: bool) {
        self.previous_visible.store(visible, Ordering::Relaxed);
    }

    fn set_voice_input_visible(&self, visible: bool) {
        self.voice_visible.store(visible, Ordering::Relaxed);
    }

    fn alert(&self, message: &str) {
        println!("\n*** {message} ***");
    }
}

/// Stands in for a text-to-speech engine by logging each utterance.
#[derive(Debug, Default)]
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, utterance: &Utterance) {
        debug!(
            text = %utterance.text,
            language = %utterance.language,
            rate = utterance.rate,
            "speak"
        );
    }

    fn cancel(&self) {
        debug!("speech cancelled");
    }
}

/// Speech "recognizer" fed by `say <words>` lines.
pub struct TypedTranscript {
    enabled: bool,
    queued: Mutex<Option<String>>,
}

impl TypedTranscript {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            queued: Mutex::new(None),
        }
    }

    pub fn queue(&self, words: &str) {
        let mut queued = self
            .queued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *queued = Some(words.to_owned());
    }
}

#[async_trait]
impl SpeechInput for TypedTranscript {
    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn recognize(&self) -> Result<String, RecognitionError> {
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        queued
            .filter(|words| !words.trim().is_empty())
            .ok_or_else(|| RecognitionError::new("no-speech"))
    }
}
