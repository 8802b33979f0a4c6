use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A PDF as submitted by the user. Lives only for one interaction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn identity(&self) -> DocumentIdentity {
        DocumentIdentity::new(&self.filename, self.size())
    }

    pub fn has_pdf_extension(&self) -> bool {
        std::path::Path::new(&self.filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

/// Filename plus byte size. Two uploads with the same name and size are
/// treated as the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentIdentity(String);

impl DocumentIdentity {
    pub fn new(filename: &str, size: usize) -> Self {
        Self(format!("{}_{}", filename, size))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetailLevel {
    Concise,
    #[default]
    Balanced,
    Comprehensive,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [Self::Concise, Self::Balanced, Self::Comprehensive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "Concise",
            Self::Balanced => "Balanced",
            Self::Comprehensive => "Comprehensive",
        }
    }

    /// Unknown values yield `None`; callers fall back to the default.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value.trim())
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetAudience {
    Student,
    #[default]
    Researcher,
    Expert,
}

impl TargetAudience {
    pub const ALL: [TargetAudience; 3] = [Self::Student, Self::Researcher, Self::Expert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Researcher => "Researcher",
            Self::Expert => "Expert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|audience| audience.as_str() == value.trim())
    }
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub detail_level: DetailLevel,
    pub target_audience: TargetAudience,
}

/// Structured summary of one paper, as returned by the model.
///
/// Every field is optional. `null` is read as absent; a value of the wrong
/// type or a key outside this structure rejects the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub publication_year: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub main_subject: Option<String>,
    #[serde(default)]
    pub abstract_summary: Option<String>,
    #[serde(default)]
    pub introduction_summary: Option<String>,
    #[serde(default)]
    pub objective_hypotheses: Option<String>,
    #[serde(default)]
    pub methodology_summary: Option<String>,
    #[serde(default)]
    pub results_summary: Option<String>,
    #[serde(default)]
    pub discussion_summary: Option<String>,
    #[serde(default)]
    pub main_conclusions: Option<Vec<String>>,
}

/// Models emit the year either as `"2021"` or `2021`.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
        Year::Text(text) => text,
        Year::Number(number) => number.to_string(),
    }))
}
