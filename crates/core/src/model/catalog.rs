use serde::Deserialize;
use thiserror::Error;

use super::question::{Question, QuestionError};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(String),

    #[error("catalog has none of `classes`, `categories` or `questions` at the top level")]
    UnrecognizedShape,

    #[error("invalid question #{index} in {location}: {source}")]
    InvalidQuestion {
        location: String,
        index: usize,
        source: QuestionError,
    },

    #[error("Please select a class, subject, and chapter.")]
    UnknownSelection,
}

//
// ─── TREE ─────────────────────────────────────────────────────────────────────
//

/// Leaf of the catalog: a named list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    name: String,
    questions: Vec<Question>,
}

impl Chapter {
    #[must_use]
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            name: name.into(),
            questions,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    name: String,
    chapters: Vec<Chapter>,
}

impl Subject {
    #[must_use]
    pub fn new(name: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        Self {
            name: name.into(),
            chapters,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogClass {
    name: String,
    subjects: Vec<Subject>,
}

impl CatalogClass {
    #[must_use]
    pub fn new(name: impl Into<String>, subjects: Vec<Subject>) -> Self {
        Self {
            name: name.into(),
            subjects,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }
}

/// Index path of a chapter inside the catalog, as picked in the selection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogPath {
    pub class: usize,
    pub subject: usize,
    pub chapter: usize,
}

impl CatalogPath {
    #[must_use]
    pub fn new(class: usize, subject: usize, chapter: usize) -> Self {
        Self {
            class,
            subject,
            chapter,
        }
    }
}

/// Read-only question bank: `Class -> Subject -> Chapter -> Question[]`.
///
/// Shallower documents are normalized on load: a top-level `categories` list
/// becomes a single class, and a flat `questions` list becomes a single
/// class/subject/chapter chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    classes: Vec<CatalogClass>,
}

pub const ELIDED_CLASS_NAME: &str = "All";
pub const ELIDED_SUBJECT_NAME: &str = "General";
pub const ELIDED_CHAPTER_NAME: &str = "All questions";

impl Catalog {
    #[must_use]
    pub fn new(classes: Vec<CatalogClass>) -> Self {
        Self { classes }
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON,
    /// `CatalogError::UnrecognizedShape` when no known top-level key is present,
    /// and `CatalogError::InvalidQuestion` when any question fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: RawCatalog =
            serde_json::from_str(raw).map_err(|err| CatalogError::Parse(err.to_string()))?;
        document.into_catalog()
    }

    /// Single-question catalog used when the real one cannot be loaded.
    ///
    /// # Panics
    ///
    /// Panics if the embedded question is invalid.
    #[must_use]
    pub fn fallback() -> Self {
        let question = Question::with_letter(
            "What is 1 + 1?",
            vec!["2".into(), "3".into(), "4".into()],
            "A",
            Some("Basic addition.".into()),
        )
        .expect("fallback question should be valid");

        Self::new(vec![CatalogClass::new(
            "Class 6",
            vec![Subject::new(
                "Fallback",
                vec![Chapter::new("Test", vec![question])],
            )],
        )])
    }

    #[must_use]
    pub fn classes(&self) -> &[CatalogClass] {
        &self.classes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[must_use]
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(CatalogClass::name).collect()
    }

    /// Subject names of the class at `class`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSelection` if the index is out of range.
    pub fn subject_names(&self, class: usize) -> Result<Vec<&str>, CatalogError> {
        let class = self
            .classes
            .get(class)
            .ok_or(CatalogError::UnknownSelection)?;
        Ok(class.subjects.iter().map(Subject::name).collect())
    }

    /// Chapter names of a subject.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSelection` if either index is out of range.
    pub fn chapter_names(&self, class: usize, subject: usize) -> Result<Vec<&str>, CatalogError> {
        let subject = self
            .classes
            .get(class)
            .and_then(|class| class.subjects.get(subject))
            .ok_or(CatalogError::UnknownSelection)?;
        Ok(subject.chapters.iter().map(Chapter::name).collect())
    }

    /// Questions stored under `path`. May be empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSelection` if any index is out of range.
    pub fn questions(&self, path: CatalogPath) -> Result<&[Question], CatalogError> {
        self.classes
            .get(path.class)
            .and_then(|class| class.subjects.get(path.subject))
            .and_then(|subject| subject.chapters.get(path.chapter))
            .map(Chapter::questions)
            .ok_or(CatalogError::UnknownSelection)
    }

    /// Total number of questions across every chapter.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|class| &class.subjects)
            .flat_map(|subject| &subject.chapters)
            .map(|chapter| chapter.questions.len())
            .sum()
    }
}

//
// ─── WIRE FORMAT ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    name: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    name: String,
    #[serde(default, alias = "chapters")]
    subcategories: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawClassBody {
    #[serde(default, alias = "subjects")]
    categories: Vec<RawSubject>,
}

#[derive(Debug, Deserialize)]
struct RawNamedClass {
    name: String,
    #[serde(default, alias = "subjects")]
    categories: Vec<RawSubject>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawClasses {
    List(Vec<RawNamedClass>),
    Map(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    classes: Option<RawClasses>,
    #[serde(default)]
    categories: Option<Vec<RawSubject>>,
    #[serde(default)]
    questions: Option<Vec<RawQuestion>>,
}

impl RawCatalog {
    fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let classes = if let Some(classes) = self.classes {
            match classes {
                RawClasses::List(list) => list
                    .into_iter()
                    .map(|class| convert_class(class.name, class.categories))
                    .collect::<Result<Vec<_>, _>>()?,
                RawClasses::Map(map) => map
                    .into_iter()
                    .map(|(name, value)| {
                        let body: RawClassBody = serde_json::from_value(value)
                            .map_err(|err| CatalogError::Parse(format!("class {name}: {err}")))?;
                        convert_class(name, body.categories)
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            }
        } else if let Some(subjects) = self.categories {
            vec![convert_class(ELIDED_CLASS_NAME.to_owned(), subjects)?]
        } else if let Some(questions) = self.questions {
            let location = format!("{ELIDED_CLASS_NAME} / {ELIDED_SUBJECT_NAME} / {ELIDED_CHAPTER_NAME}");
            let questions = convert_questions(&location, questions)?;
            vec![CatalogClass::new(
                ELIDED_CLASS_NAME,
                vec![Subject::new(
                    ELIDED_SUBJECT_NAME,
                    vec![Chapter::new(ELIDED_CHAPTER_NAME, questions)],
                )],
            )]
        } else {
            return Err(CatalogError::UnrecognizedShape);
        };

        Ok(Catalog::new(classes))
    }
}

fn convert_class(name: String, subjects: Vec<RawSubject>) -> Result<CatalogClass, CatalogError> {
    let mut converted = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let mut chapters = Vec::with_capacity(subject.subcategories.len());
        for chapter in subject.subcategories {
            let location = format!("{name} / {} / {}", subject.name, chapter.name);
            let questions = convert_questions(&location, chapter.questions)?;
            chapters.push(Chapter::new(chapter.name, questions));
        }
        converted.push(Subject::new(subject.name, chapters));
    }
    Ok(CatalogClass::new(name, converted))
}

fn convert_questions(
    location: &str,
    questions: Vec<RawQuestion>,
) -> Result<Vec<Question>, CatalogError> {
    questions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            Question::with_letter(raw.question, raw.options, &raw.answer, raw.explanation).map_err(
                |source| CatalogError::InvalidQuestion {
                    location: location.to_owned(),
                    index,
                    source,
                },
            )
        })
        .collect()
}
