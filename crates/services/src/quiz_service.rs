use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use quiz_core::messages;
use quiz_core::model::{Catalog, CatalogPath, FinishReason, Question, QuizSettings, SessionSummary};
use quiz_core::quiz::{
    AdvanceTicket, Direction, Grading, Navigation, Outcome, QuizError, QuizState,
};
use quiz_core::spoken::SpokenAnswer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::SessionError;
use crate::feedback::FeedbackPicker;
use crate::presenter::{Feedback, FeedbackTone, Panel, QuestionView, QuizDisplay};
use crate::speech::{SpeechInput, SpeechOutput, Voice};

/// What a speech transcript led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// The transcript named an option and it was graded.
    Graded(Grading),
    /// "next question" after a wrong answer moved the quiz on.
    Advanced(Navigation),
    /// "next question" while the last answer was not wrong; nothing happened.
    Ignored,
    /// Nothing matched; score untouched.
    NotUnderstood,
}

struct PendingAdvance {
    ticket: AdvanceTicket,
    handle: AbortHandle,
}

struct Inner {
    state: Mutex<QuizState>,
    pending: Mutex<Option<PendingAdvance>>,
    listening: AtomicBool,
    display: Arc<dyn QuizDisplay>,
    voice: Voice,
    feedback: FeedbackPicker,
    settings: QuizSettings,
    clock: Clock,
    rng: Mutex<StdRng>,
}

/// Quiz session controller.
///
/// Owns the `QuizState`, turns every transition into display and speech
/// effects, and runs the auto-advance after a correct answer as a cancellable
/// task. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct QuizController {
    inner: Arc<Inner>,
}

struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct CurrentView {
    question: QuestionView,
    has_previous: bool,
}

impl QuizController {
    #[must_use]
    pub fn new(
        settings: QuizSettings,
        display: Arc<dyn QuizDisplay>,
        speech: Arc<dyn SpeechOutput>,
        clock: Clock,
    ) -> Self {
        Self::build(
            settings.clone(),
            display,
            speech,
            clock,
            FeedbackPicker::new(settings.feedback_style()),
            StdRng::from_os_rng(),
        )
    }

    /// Controller with seeded shuffling and phrase selection.
    #[must_use]
    pub fn with_seed(
        settings: QuizSettings,
        display: Arc<dyn QuizDisplay>,
        speech: Arc<dyn SpeechOutput>,
        clock: Clock,
        seed: u64,
    ) -> Self {
        Self::build(
            settings.clone(),
            display,
            speech,
            clock,
            FeedbackPicker::with_seed(settings.feedback_style(), seed),
            StdRng::seed_from_u64(seed),
        )
    }

    fn build(
        settings: QuizSettings,
        display: Arc<dyn QuizDisplay>,
        speech: Arc<dyn SpeechOutput>,
        clock: Clock,
        feedback: FeedbackPicker,
        rng: StdRng,
    ) -> Self {
        let voice = Voice::new(speech, &settings);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QuizState::new()),
                pending: Mutex::new(None),
                listening: AtomicBool::new(false),
                display,
                voice,
                feedback,
                settings,
                clock,
                rng: Mutex::new(rng),
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.inner.settings
    }

    /// Copy of the current state, for inspection.
    #[must_use]
    pub fn snapshot(&self) -> QuizState {
        self.state().clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Whether an auto-advance is waiting to fire.
    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending().is_some()
    }

    //
    // ─── START ─────────────────────────────────────────────────────────────
    //

    /// Start a quiz over the chapter at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Catalog` for an incomplete or unknown selection
    /// and `SessionError::Quiz(EmptyPool)` for an empty chapter. Both are
    /// also shown as alerts.
    pub fn start_selection(&self, catalog: &Catalog, path: CatalogPath) -> Result<(), SessionError> {
        match catalog.questions(path) {
            Ok(pool) => self.start(pool),
            Err(err) => {
                self.inner.display.alert(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Start a quiz over a shuffled copy of `pool`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(EmptyPool)` when `pool` is empty; the user
    /// is alerted and nothing changes.
    pub fn start(&self, pool: &[Question]) -> Result<(), SessionError> {
        let started = {
            let mut state = self.state();
            let mut rng = self.inner.rng.lock().unwrap_or_else(PoisonError::into_inner);
            state.start(pool, &mut *rng, self.inner.clock.now())
        };
        if let Err(err) = started {
            self.inner.display.alert(messages::EMPTY_POOL);
            return Err(err.into());
        }

        self.cancel_pending();
        info!(questions = pool.len(), "quiz started");

        let display = &self.inner.display;
        display.show_panel(Panel::Quiz);
        display.show_score(&self.score_text(0, 0));
        self.present()
    }

    //
    // ─── PRESENT ───────────────────────────────────────────────────────────
    //

    /// Render and speak the current question. Repeating it yields the same output.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(NotActive)` when no quiz is running.
    pub fn present(&self) -> Result<(), SessionError> {
        let view = self
            .current_view()
            .ok_or(SessionError::Quiz(QuizError::NotActive))?;
        self.render(&view);
        Ok(())
    }

    //
    // ─── GRADING ───────────────────────────────────────────────────────────
    //

    /// Grade the option at `selected` for the current question.
    ///
    /// A correct answer schedules a move to the next question after the
    /// configured delay. A wrong answer shows the right one and waits for an
    /// explicit `advance(Direction::Next)`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz` when idle or when `selected` is not an option.
    pub fn submit_answer(&self, selected: usize) -> Result<Grading, SessionError> {
        let (grading, wrong_text, correct, attempted) = {
            let mut state = self.state();
            let grading = state.submit_answer(selected)?;
            let wrong_text = match &grading {
                Grading::Incorrect { .. } => state.current_question().map(messages::wrong_answer),
                Grading::Correct { .. } => None,
            };
            (
                grading,
                wrong_text,
                state.correct_count(),
                state.attempted_count(),
            )
        };

        self.cancel_pending();
        let display = &self.inner.display;
        display.show_score(&self.score_text(correct, attempted));

        match &grading {
            Grading::Correct { ticket, .. } => {
                let phrase = self.inner.feedback.correct_phrase();
                display.show_feedback(&Feedback::new(phrase, FeedbackTone::Correct));
                self.inner.voice.say(phrase);
                self.schedule_advance(*ticket);
            }
            Grading::Incorrect { .. } => {
                let text = wrong_text.unwrap_or_default();
                display.show_feedback(&Feedback::new(text.clone(), FeedbackTone::Incorrect));
                display.set_next_visible(true);
                self.inner.voice.say(&text);
            }
        }

        debug!(selected, correct = grading.is_correct(), "answer graded");
        Ok(grading)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────
    //

    /// Move to the next or previous question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(NotActive)` when no quiz is running.
    pub fn advance(&self, direction: Direction) -> Result<Navigation, SessionError> {
        self.cancel_pending();
        let navigation = self.state().advance(direction, self.inner.clock.now())?;
        self.render_navigation(&navigation);
        Ok(navigation)
    }

    /// End the quiz and return to the selection screen.
    ///
    /// Calling this with no quiz running does nothing and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz` if the summary cannot be built.
    pub fn finish(&self, reason: FinishReason) -> Result<Option<SessionSummary>, SessionError> {
        self.cancel_pending();
        let summary = self.state().finish(reason, self.inner.clock.now())?;
        if let Some(summary) = &summary {
            self.render_summary(summary);
        }
        Ok(summary)
    }

    fn schedule_advance(&self, ticket: AdvanceTicket) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime available; auto-advance disabled");
            return;
        };

        let delay = self.inner.settings.auto_advance_delay();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                QuizController { inner }.fire_scheduled_advance(ticket);
            }
        });

        let previous = self.pending().replace(PendingAdvance {
            ticket,
            handle: task.abort_handle(),
        });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    fn fire_scheduled_advance(&self, ticket: AdvanceTicket) {
        {
            let mut pending = self.pending();
            if pending.as_ref().is_some_and(|p| p.ticket == ticket) {
                pending.take();
            }
        }

        let navigation = match self
            .state()
            .fire_scheduled_advance(ticket, self.inner.clock.now())
        {
            Ok(navigation) => navigation,
            Err(err) => {
                warn!(error = %err, "auto-advance failed");
                return;
            }
        };

        if navigation == Navigation::Unchanged {
            debug!(index = ticket.index(), "stale auto-advance discarded");
            return;
        }
        debug!(index = ticket.index(), "auto-advance fired");
        self.render_navigation(&navigation);
    }

    fn cancel_pending(&self) {
        if let Some(pending) = self.pending().take() {
            pending.handle.abort();
        }
    }

    //
    // ─── SPEECH INPUT ──────────────────────────────────────────────────────
    //

    /// Show or hide the voice control depending on recognizer support.
    pub fn sync_voice_control(&self, input: &dyn SpeechInput) {
        self.inner
            .display
            .set_voice_input_visible(input.is_available());
    }

    /// Act on a recognized transcript.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(NotActive)` when no quiz is running.
    pub fn handle_transcript(&self, transcript: &str) -> Result<TranscriptOutcome, SessionError> {
        let (answer, last_outcome) = {
            let state = self.state();
            let answer =
                state.interpret_spoken(transcript, self.inner.settings.accept_letter_d())?;
            (answer, state.last_outcome())
        };

        let heard = quiz_core::spoken::normalize_transcript(transcript);
        self.inner.display.show_heard(Some(&messages::heard(&heard)));

        match answer {
            SpokenAnswer::Option(selected) => {
                Ok(TranscriptOutcome::Graded(self.submit_answer(selected)?))
            }
            SpokenAnswer::NextCommand if last_outcome == Some(Outcome::Incorrect) => {
                Ok(TranscriptOutcome::Advanced(self.advance(Direction::Next)?))
            }
            SpokenAnswer::NextCommand => Ok(TranscriptOutcome::Ignored),
            SpokenAnswer::NotUnderstood => {
                self.inner.display.show_feedback(&Feedback::new(
                    messages::NOT_UNDERSTOOD,
                    FeedbackTone::Unrecognized,
                ));
                self.inner.voice.say(messages::NOT_UNDERSTOOD);
                Ok(TranscriptOutcome::NotUnderstood)
            }
        }
    }

    /// Run one recognition pass and act on the transcript.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::VoiceUnavailable` without a recognizer,
    /// `SessionError::AlreadyListening` while another pass is running, and
    /// `SessionError::Recognition` when the engine reports an error (also
    /// echoed on screen).
    pub async fn listen(&self, input: &dyn SpeechInput) -> Result<TranscriptOutcome, SessionError> {
        if !input.is_available() {
            return Err(SessionError::VoiceUnavailable);
        }
        if !self.is_active() {
            return Err(SessionError::Quiz(QuizError::NotActive));
        }
        if self
            .inner
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyListening);
        }

        let result = {
            let _listening = ListeningGuard(&self.inner.listening);
            input.recognize().await
        };

        match result {
            Ok(transcript) => self.handle_transcript(&transcript),
            Err(err) => {
                self.inner
                    .display
                    .show_heard(Some(&messages::recognition_error(&err.code)));
                Err(err.into())
            }
        }
    }

    //
    // ─── RENDERING ─────────────────────────────────────────────────────────
    //

    fn current_view(&self) -> Option<CurrentView> {
        let state = self.state();
        let index = state.current_index()?;
        let question = state.current_question()?;
        Some(CurrentView {
            question: QuestionView::new(question, index, state.len()),
            has_previous: state.has_previous(),
        })
    }

    fn render(&self, view: &CurrentView) {
        let display = &self.inner.display;
        display.clear_feedback();
        display.show_heard(None);
        display.set_next_visible(false);
        display.set_previous_visible(view.has_previous);
        display.show_question(&view.question);
        self.inner.voice.say(&view.question.spoken);
    }

    fn render_navigation(&self, navigation: &Navigation) {
        match navigation {
            Navigation::Moved { .. } => {
                if let Some(view) = self.current_view() {
                    self.render(&view);
                }
            }
            Navigation::Unchanged => {}
            Navigation::Finished(summary) => self.render_summary(summary),
        }
    }

    fn render_summary(&self, summary: &SessionSummary) {
        info!(
            correct = summary.correct_count(),
            attempted = summary.attempted_count(),
            reason = ?summary.reason(),
            "quiz finished"
        );
        let message = messages::summary(
            summary.reason(),
            summary.correct_count(),
            summary.attempted_count(),
        );
        let display = &self.inner.display;
        display.alert(&message);
        self.inner.voice.say(&message);
        display.clear_feedback();
        display.show_heard(None);
        display.set_next_visible(false);
        display.set_previous_visible(false);
        display.show_panel(Panel::Selection);
        display.show_score(&self.score_text(0, 0));
    }

    fn score_text(&self, correct: u32, attempted: u32) -> String {
        messages::score(self.inner.settings.score_display_style(), correct, attempted)
    }

    fn state(&self) -> MutexGuard<'_, QuizState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingAdvance>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("QuizController")
            .field("active", &state.is_active())
            .field("current", &state.current_index())
            .field("correct", &state.correct_count())
            .field("attempted", &state.attempted_count())
            .finish_non_exhaustive()
    }
}
