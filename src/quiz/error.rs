use std::fmt;

use crate::district::ShapeId;

/// Failure to fetch or parse a reference district. Recovered by the session
/// through the fallback square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// Reference file that was requested.
    pub file: String,
    pub reason: String,
}

impl LoadError {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { file: file.into(), reason: reason.into() }
    }

    pub(crate) fn from_anyhow(file: &str, err: &anyhow::Error) -> Self {
        Self::new(file, format!("{err:#}"))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {}: {}", self.file, self.reason)
    }
}

impl std::error::Error for LoadError {}

/// Errors surfaced by quiz commands. None of them is fatal; the session stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// Loading the reference failed.
    Load(LoadError),
    /// Grading was requested with no user shapes.
    NoInput,
    /// Grading was requested before any reference (or fallback) exists.
    ReferenceUnavailable,
    /// A submitted shape has no coordinates.
    DegenerateGeometry,
    /// No shape with this id in the session.
    UnknownShape(ShapeId),
    /// No city with this key in the table.
    UnknownCity(String),
    /// Command not valid in the current state.
    InvalidState(&'static str),
}

impl QuizError {
    /// Message suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self {
            QuizError::NoInput => "Please draw or place a district shape first!".to_string(),
            QuizError::ReferenceUnavailable => "Target district data not available for comparison.".to_string(),
            QuizError::DegenerateGeometry => "That shape has no area. Try drawing it again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::Load(e) => write!(f, "{e}"),
            QuizError::NoInput => write!(f, "no user shapes to grade"),
            QuizError::ReferenceUnavailable => write!(f, "reference district is not loaded"),
            QuizError::DegenerateGeometry => write!(f, "shape has no coordinates"),
            QuizError::UnknownShape(id) => write!(f, "unknown shape {id}"),
            QuizError::UnknownCity(key) => write!(f, "unknown city {key:?}"),
            QuizError::InvalidState(why) => write!(f, "invalid state: {why}"),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for QuizError {
    fn from(e: LoadError) -> Self { QuizError::Load(e) }
}
