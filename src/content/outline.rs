//! Course outline file.
//!
//! ```toml
//! [[units]]
//! id = 1
//! title = "Fractions"
//!
//! [[units.lessons]]
//! id = 10
//! title = "Adding fractions"
//! ```
//!
//! Lesson order in the file is the course order used by the first-lesson
//! fallback.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseOutline {
    #[serde(default)]
    pub units: Vec<OutlineUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutlineUnit {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<OutlineLesson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutlineLesson {
    pub id: i64,
    pub title: String,
}

/// Error loading an outline.
#[derive(Debug)]
pub enum OutlineError {
    IoError(String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for OutlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlineError::IoError(e) => write!(f, "IO error: {}", e),
            OutlineError::ParseError(e) => write!(f, "Parse error: {}", e),
            OutlineError::Invalid(e) => write!(f, "Invalid outline: {}", e),
        }
    }
}

impl std::error::Error for OutlineError {}

impl CourseOutline {
    pub fn parse(contents: &str) -> Result<Self, OutlineError> {
        let outline: CourseOutline =
            toml::from_str(contents).map_err(|e| OutlineError::ParseError(e.to_string()))?;
        outline.validate()?;
        Ok(outline)
    }

    pub fn load(path: &Path) -> Result<Self, OutlineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| OutlineError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Ids must be positive (0 means "unknown" in recovered contexts) and unique.
    fn validate(&self) -> Result<(), OutlineError> {
        let mut unit_ids = std::collections::HashSet::new();
        let mut lesson_ids = std::collections::HashSet::new();

        for unit in &self.units {
            if unit.id <= 0 {
                return Err(OutlineError::Invalid(format!("unit id must be positive: {}", unit.id)));
            }
            if !unit_ids.insert(unit.id) {
                return Err(OutlineError::Invalid(format!("duplicate unit id {}", unit.id)));
            }
            for lesson in &unit.lessons {
                if lesson.id <= 0 {
                    return Err(OutlineError::Invalid(format!(
                        "lesson id must be positive: {}",
                        lesson.id
                    )));
                }
                if !lesson_ids.insert(lesson.id) {
                    return Err(OutlineError::Invalid(format!("duplicate lesson id {}", lesson.id)));
                }
            }
        }
        Ok(())
    }
}
