//! Outline types: the single output artifact per document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outline depth of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level label as it appears in the output ("H1", "H2", "H3").
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span the classifier accepted as a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

impl HeadingCandidate {
    /// Create a new heading candidate.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Document title plus headings in document order.
///
/// `title` is `None` when no first-page span qualified; it is written as an
/// empty string in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(
        serialize_with = "serialize_title",
        deserialize_with = "deserialize_title"
    )]
    pub title: Option<String>,
    #[serde(rename = "outline")]
    pub headings: Vec<HeadingCandidate>,
}

impl Outline {
    /// Create an outline.
    pub fn new(title: Option<String>, headings: Vec<HeadingCandidate>) -> Self {
        Self { title, headings }
    }

    /// Outline of a document with no text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Title text, or "" when none was found.
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Whether neither a title nor any heading was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.headings.is_empty()
    }

    /// Number of headings at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }
}

fn serialize_title<S: Serializer>(title: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(title.as_deref().unwrap_or(""))
}

fn deserialize_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let title = Option::<String>::deserialize(deserializer)?;
    Ok(title.filter(|t| !t.is_empty()))
}
