use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::QuizSettings;
use thiserror::Error;
use tracing::debug;

/// One unit of synthesized speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
}

/// Text-to-speech engine.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, utterance: &Utterance);
    fn cancel(&self);
    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in used when no synthesis engine exists; every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechOutput for SilentSpeech {
    fn speak(&self, _utterance: &Utterance) {}

    fn cancel(&self) {}

    fn is_available(&self) -> bool {
        false
    }
}

/// Recognition failure reported by the engine, e.g. `no-speech`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("speech recognition failed: {code}")]
pub struct RecognitionError {
    pub code: String,
}

impl RecognitionError {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Single-shot speech recognizer.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listen once and return the final transcript.
    ///
    /// # Errors
    ///
    /// Returns `RecognitionError` with the engine's error code.
    async fn recognize(&self) -> Result<String, RecognitionError>;
}

/// Speaks through a `SpeechOutput` with the configured language and rate,
/// cutting off whatever was still being said.
#[derive(Clone)]
pub struct Voice {
    output: Arc<dyn SpeechOutput>,
    language: String,
    rate: f32,
}

impl Voice {
    #[must_use]
    pub fn new(output: Arc<dyn SpeechOutput>, settings: &QuizSettings) -> Self {
        Self {
            output,
            language: settings.speech_language().to_owned(),
            rate: settings.speech_rate(),
        }
    }

    pub fn say(&self, text: &str) {
        if !self.output.is_available() {
            return;
        }
        debug!(len = text.len(), "speaking");
        self.output.cancel();
        self.output.speak(&Utterance {
            text: text.to_owned(),
            language: self.language.clone(),
            rate: self.rate,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl SpeechOutput for Recorder {
        fn speak(&self, utterance: &Utterance) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("speak:{}:{}", utterance.language, utterance.text));
        }

        fn cancel(&self) {
            self.calls.lock().unwrap().push("cancel".into());
        }
    }

    #[test]
    fn say_cancels_before_speaking() {
        let recorder = Arc::new(Recorder::default());
        let voice = Voice::new(recorder.clone(), &QuizSettings::default());

        voice.say("Correct!");
        voice.say("Next");

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "cancel",
                "speak:en-US:Correct!",
                "cancel",
                "speak:en-US:Next"
            ]
        );
    }

    #[test]
    fn silent_speech_swallows_everything() {
        let voice = Voice::new(Arc::new(SilentSpeech), &QuizSettings::default());
        voice.say("nobody hears this");
    }
}
