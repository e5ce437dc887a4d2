mod console;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::messages;
use quiz_core::model::{
    Catalog, CatalogLocation, CatalogPath, FinishReason, QuizSettings, QuizSettingsDraft,
    SettingsError, Theme,
};
use quiz_core::quiz::Direction;
use services::{AppServices, Clock, Panel, QuizController, QuizDisplay, SessionError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleDisplay, ConsoleSpeech, TypedTranscript};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidValue { flag: &'static str, raw: String },
    Settings(SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<SettingsError> for ArgsError {
    fn from(err: SettingsError) -> Self {
        ArgsError::Settings(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  quiz [--catalog <url|path>] [--db <sqlite_url>] [--feedback plain|encouraging]"
    );
    eprintln!(
        "       [--score fraction|stars|percent] [--delay-ms <ms>] [--theme light|dark|high-contrast]"
    );
    eprintln!("       [--no-voice]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --catalog data.json");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --delay-ms 2000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CATALOG, QUIZ_DB_URL, RUST_LOG");
}

struct Args {
    catalog: CatalogLocation,
    db_url: String,
    settings: QuizSettings,
    theme: Option<Theme>,
    voice: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut catalog = std::env::var("QUIZ_CATALOG").unwrap_or_else(|_| "data.json".into());
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut draft = QuizSettingsDraft::new();
        let mut theme = None;
        let mut voice = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = require_value(&mut args, "--catalog")?,
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--feedback" => {
                    draft.feedback_style = Some(require_value(&mut args, "--feedback")?.parse()?);
                }
                "--score" => {
                    draft.score_display_style =
                        Some(require_value(&mut args, "--score")?.parse()?);
                }
                "--delay-ms" => {
                    let value = require_value(&mut args, "--delay-ms")?;
                    let millis: u64 = value.trim().parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--delay-ms",
                        raw: value.clone(),
                    })?;
                    draft.auto_advance_delay = Some(Duration::from_millis(millis));
                }
                "--theme" => theme = Some(require_value(&mut args, "--theme")?.parse()?),
                "--no-voice" => voice = false,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            catalog: catalog.parse()?,
            db_url,
            settings: draft.validate()?,
            theme,
            voice,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

//
// ─── INPUT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
enum QuizCommand {
    Answer(usize),
    Say(String),
    Next,
    Previous,
    Repeat,
    Exit,
}

impl QuizCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(words) = line.strip_prefix("say ") {
            return Some(Self::Say(words.to_owned()));
        }
        match line.to_ascii_lowercase().as_str() {
            "a" | "1" => Some(Self::Answer(0)),
            "b" | "2" => Some(Self::Answer(1)),
            "c" | "3" => Some(Self::Answer(2)),
            "d" | "4" => Some(Self::Answer(3)),
            "next" | "n" => Some(Self::Next),
            "prev" | "p" => Some(Self::Previous),
            "repeat" | "r" => Some(Self::Repeat),
            "exit" | "q" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Ask for one entry of `names`; `None` means the user quit or input ended.
async fn choose<R: AsyncBufRead + Unpin>(
    display: &ConsoleDisplay,
    lines: &mut Lines<R>,
    title: &str,
    names: &[&str],
) -> std::io::Result<Option<usize>> {
    loop {
        display.heading(title);
        for (index, name) in names.iter().enumerate() {
            println!("  {}. {name}", index + 1);
        }
        println!("(number to choose, q to quit)");

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(choice) if (1..=names.len()).contains(&choice) => return Ok(Some(choice - 1)),
            _ => println!("Please enter a number between 1 and {}.", names.len()),
        }
    }
}

async fn select_chapter<R: AsyncBufRead + Unpin>(
    catalog: &Catalog,
    display: &ConsoleDisplay,
    lines: &mut Lines<R>,
) -> Result<Option<CatalogPath>, Box<dyn std::error::Error>> {
    loop {
        let Some(class) = choose(display, lines, "Select a class", &catalog.class_names()).await?
        else {
            return Ok(None);
        };
        let subjects = catalog.subject_names(class)?;
        if subjects.is_empty() {
            display.alert(&quiz_core::model::CatalogError::UnknownSelection.to_string());
            continue;
        }
        let Some(subject) = choose(display, lines, "Select a subject", &subjects).await? else {
            return Ok(None);
        };
        let chapters = catalog.chapter_names(class, subject)?;
        if chapters.is_empty() {
            display.alert(&quiz_core::model::CatalogError::UnknownSelection.to_string());
            continue;
        }
        let Some(chapter) = choose(display, lines, "Select a chapter", &chapters).await? else {
            return Ok(None);
        };
        return Ok(Some(CatalogPath::new(class, subject, chapter)));
    }
}

async fn handle_command(
    controller: &QuizController,
    transcript: &TypedTranscript,
    command: QuizCommand,
) -> Result<(), SessionError> {
    match command {
        QuizCommand::Answer(selected) => controller.submit_answer(selected).map(drop),
        QuizCommand::Say(words) => {
            transcript.queue(&words);
            controller.listen(transcript).await.map(drop)
        }
        QuizCommand::Next => controller.advance(Direction::Next).map(drop),
        QuizCommand::Previous => controller.advance(Direction::Previous).map(drop),
        QuizCommand::Repeat => controller.present(),
        QuizCommand::Exit => controller.finish(FinishReason::Exited).map(drop),
    }
}

/// Feed input lines to the controller until the quiz returns to selection.
///
/// Returns `false` when input ended mid-quiz.
async fn run_quiz<R: AsyncBufRead + Unpin>(
    controller: &QuizController,
    transcript: &TypedTranscript,
    panel: &mut watch::Receiver<Panel>,
    lines: &mut Lines<R>,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = panel.wait_for(|panel| *panel == Panel::Selection) => return Ok(true),
        };
        let Some(line) = line else {
            controller.finish(FinishReason::Exited)?;
            return Ok(false);
        };
        if line.trim().is_empty() {
            continue;
        }

        match QuizCommand::parse(&line) {
            Some(command) => {
                if let Err(err) = handle_command(controller, transcript, command).await {
                    println!("{err}");
                }
            }
            None => println!("Unknown command: {}", line.trim()),
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, &args.catalog, Clock::default_clock()).await?;

    let preferences = services.preferences();
    let theme = match args.theme {
        Some(theme) => {
            preferences.set_theme(theme).await?;
            theme
        }
        None => preferences.theme().await.unwrap_or_else(|err| {
            warn!(error = %err, "could not read theme preference");
            Theme::default()
        }),
    };

    let (display, mut panel) = ConsoleDisplay::new(theme);
    let display = Arc::new(display);
    let transcript = TypedTranscript::new(args.voice);
    let controller =
        services.quiz_controller(args.settings, display.clone(), Arc::new(ConsoleSpeech));
    controller.sync_voice_control(&transcript);

    let load = services.catalog().load().await;
    if load.fallback {
        display.alert(messages::CATALOG_FALLBACK);
    }
    info!(catalog = %args.catalog, %theme, "ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(path) = select_chapter(&load.catalog, &display, &mut lines).await? {
        if controller.start_selection(&load.catalog, path).is_err() {
            continue;
        }
        if !run_quiz(&controller, &transcript, &mut panel, &mut lines).await? {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(raw.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_quiz_commands() {
        assert_eq!(QuizCommand::parse("B"), Some(QuizCommand::Answer(1)));
        assert_eq!(QuizCommand::parse(" 4 "), Some(QuizCommand::Answer(3)));
        assert_eq!(
            QuizCommand::parse("say next question"),
            Some(QuizCommand::Say("next question".into()))
        );
        assert_eq!(QuizCommand::parse("prev"), Some(QuizCommand::Previous));
        assert_eq!(QuizCommand::parse("e"), None);
    }

    #[test]
    fn flags_build_validated_settings() {
        let parsed = args(&[
            "--catalog",
            "https://example.com/data.json",
            "--feedback",
            "encouraging",
            "--score",
            "percent",
            "--delay-ms",
            "500",
            "--theme",
            "dark",
            "--no-voice",
            "--db",
            "sqlite::memory:",
        ])
        .unwrap();

        assert!(matches!(parsed.catalog, CatalogLocation::Remote(_)));
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(
            parsed.settings.auto_advance_delay(),
            Duration::from_millis(500)
        );
        assert_eq!(parsed.theme, Some(Theme::Dark));
        assert!(!parsed.voice);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            args(&["--delay-ms", "soon"]),
            Err(ArgsError::InvalidValue { .. })
        ));
        assert!(matches!(
            args(&["--delay-ms", "120000"]),
            Err(ArgsError::Settings(SettingsError::DelayTooLong(_)))
        ));
        assert!(matches!(
            args(&["--score"]),
            Err(ArgsError::MissingValue { flag: "--score" })
        ));
        assert!(matches!(args(&["--frobnicate"]), Err(ArgsError::UnknownArg(_))));
    }
}
