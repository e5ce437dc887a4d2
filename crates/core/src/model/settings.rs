use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unknown feedback style: {0}")]
    UnknownFeedbackStyle(String),
    #[error("unknown score display style: {0}")]
    UnknownScoreStyle(String),
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
    #[error("speech language cannot be empty")]
    EmptySpeechLanguage,
    #[error("speech rate {0} is outside 0.1..=10.0")]
    InvalidSpeechRate(f32),
    #[error("auto-advance delay of {0:?} exceeds one minute")]
    DelayTooLong(Duration),
    #[error("catalog location cannot be empty")]
    EmptyCatalogLocation,
}

//
// ─── ENUMS ────────────────────────────────────────────────────────────────────
//

/// What gets said after a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackStyle {
    /// Always "Correct!".
    #[default]
    Plain,
    /// A phrase picked at random from a fixed encouragement list.
    Encouraging,
}

impl FromStr for FeedbackStyle {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "encouraging" => Ok(Self::Encouraging),
            _ => Err(SettingsError::UnknownFeedbackStyle(raw.to_owned())),
        }
    }
}

/// How the running score is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreDisplayStyle {
    /// `2 out of 3`
    #[default]
    Fraction,
    /// One filled star per correct answer, one hollow star per miss.
    Stars,
    /// `67%`
    Percent,
}

impl FromStr for ScoreDisplayStyle {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fraction" => Ok(Self::Fraction),
            "stars" => Ok(Self::Stars),
            "percent" => Ok(Self::Percent),
            _ => Err(SettingsError::UnknownScoreStyle(raw.to_owned())),
        }
    }
}

/// Persisted colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    HighContrast,
}

impl Theme {
    pub const PREFERENCE_KEY: &'static str = "theme";

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::HighContrast => "high-contrast",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "high-contrast" | "high_contrast" => Ok(Self::HighContrast),
            _ => Err(SettingsError::UnknownTheme(raw.to_owned())),
        }
    }
}

//
// ─── CATALOG LOCATION ─────────────────────────────────────────────────────────
//

/// Where the catalog document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Remote(Url),
    File(PathBuf),
}

impl FromStr for CatalogLocation {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SettingsError::EmptyCatalogLocation);
        }
        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => Ok(url
                .to_file_path()
                .map_or_else(|()| Self::File(PathBuf::from(trimmed)), Self::File)),
            _ => Ok(Self::File(PathBuf::from(trimmed))),
        }
    }
}

impl fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogLocation::Remote(url) => write!(f, "{url}"),
            CatalogLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

//
// ─── QUIZ SETTINGS ────────────────────────────────────────────────────────────
//

/// Validated quiz behaviour configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizSettings {
    feedback_style: FeedbackStyle,
    score_display_style: ScoreDisplayStyle,
    auto_advance_delay: Duration,
    speech_language: String,
    speech_rate: f32,
    accept_letter_d: bool,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub feedback_style: Option<FeedbackStyle>,
    pub score_display_style: Option<ScoreDisplayStyle>,
    pub auto_advance_delay: Option<Duration>,
    pub speech_language: Option<String>,
    pub speech_rate: Option<f32>,
    pub accept_letter_d: Option<bool>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for an empty language, a rate outside
    /// `0.1..=10.0`, or a delay longer than one minute.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let defaults = QuizSettings::default();

        let speech_language = match self.speech_language {
            Some(language) => {
                let language = language.trim().to_owned();
                if language.is_empty() {
                    return Err(SettingsError::EmptySpeechLanguage);
                }
                language
            }
            None => defaults.speech_language,
        };

        let speech_rate = self.speech_rate.unwrap_or(defaults.speech_rate);
        if !(0.1..=10.0).contains(&speech_rate) {
            return Err(SettingsError::InvalidSpeechRate(speech_rate));
        }

        let auto_advance_delay = self
            .auto_advance_delay
            .unwrap_or(defaults.auto_advance_delay);
        if auto_advance_delay > QuizSettings::MAX_AUTO_ADVANCE_DELAY {
            return Err(SettingsError::DelayTooLong(auto_advance_delay));
        }

        Ok(QuizSettings {
            feedback_style: self.feedback_style.unwrap_or(defaults.feedback_style),
            score_display_style: self
                .score_display_style
                .unwrap_or(defaults.score_display_style),
            auto_advance_delay,
            speech_language,
            speech_rate,
            accept_letter_d: self.accept_letter_d.unwrap_or(defaults.accept_letter_d),
        })
    }
}

impl QuizSettings {
    pub const DEFAULT_AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(2);
    pub const MAX_AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn feedback_style(&self) -> FeedbackStyle {
        self.feedback_style
    }

    #[must_use]
    pub fn score_display_style(&self) -> ScoreDisplayStyle {
        self.score_display_style
    }

    #[must_use]
    pub fn auto_advance_delay(&self) -> Duration {
        self.auto_advance_delay
    }

    #[must_use]
    pub fn speech_language(&self) -> &str {
        &self.speech_language
    }

    #[must_use]
    pub fn speech_rate(&self) -> f32 {
        self.speech_rate
    }

    #[must_use]
    pub fn accept_letter_d(&self) -> bool {
        self.accept_letter_d
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            feedback_style: FeedbackStyle::Plain,
            score_display_style: ScoreDisplayStyle::Fraction,
            auto_advance_delay: Self::DEFAULT_AUTO_ADVANCE_DELAY,
            speech_language: "en-US".to_owned(),
            speech_rate: 0.7,
            accept_letter_d: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_yields_defaults() {
        let settings = QuizSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, QuizSettings::default());
        assert_eq!(settings.auto_advance_delay(), Duration::from_secs(2));
        assert_eq!(settings.speech_language(), "en-US");
    }

    #[test]
    fn rejects_out_of_range_values() {
        let draft = QuizSettingsDraft {
            speech_rate: Some(0.0),
            ..QuizSettingsDraft::default()
        };
        assert_eq!(draft.validate(), Err(SettingsError::InvalidSpeechRate(0.0)));

        let draft = QuizSettingsDraft {
            speech_language: Some("   ".into()),
            ..QuizSettingsDraft::default()
        };
        assert_eq!(draft.validate(), Err(SettingsError::EmptySpeechLanguage));

        let draft = QuizSettingsDraft {
            auto_advance_delay: Some(Duration::from_secs(120)),
            ..QuizSettingsDraft::default()
        };
        assert!(matches!(
            draft.validate(),
            Err(SettingsError::DelayTooLong(_))
        ));
    }

    #[test]
    fn parses_style_and_theme_names() {
        assert_eq!(
            "Encouraging".parse::<FeedbackStyle>().unwrap(),
            FeedbackStyle::Encouraging
        );
        assert_eq!(
            "stars".parse::<ScoreDisplayStyle>().unwrap(),
            ScoreDisplayStyle::Stars
        );
        assert_eq!("high-contrast".parse::<Theme>().unwrap(), Theme::HighContrast);
        assert_eq!(
            Theme::HighContrast.as_str().parse::<Theme>().unwrap(),
            Theme::HighContrast
        );
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn catalog_location_distinguishes_urls_from_paths() {
        assert!(matches!(
            "https://example.com/data.json".parse::<CatalogLocation>().unwrap(),
            CatalogLocation::Remote(_)
        ));
        assert_eq!(
            "data.json".parse::<CatalogLocation>().unwrap(),
            CatalogLocation::File(PathBuf::from("data.json"))
        );
        assert!("  ".parse::<CatalogLocation>().is_err());
    }
}
