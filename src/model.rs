//! Template / Variable model.
//!
//! Templates are re-read from the store on every run; nothing here is cached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

pub const MOBILITEIT_NS: &str = "https://data.vlaanderen.be/ns/mobiliteit#";
pub const EXT_NS: &str = "http://mu.semte.ch/vocabularies/ext/";

/// A template body with its `${name}` placeholders and the variables that fill them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub uri: String,
    pub raw_text: String,
    /// Order of first appearance in the source rows.
    pub variables: Vec<Variable>,
}

impl Template {
    pub fn new(uri: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            raw_text: raw_text.into(),
            variables: Vec::new(),
        }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub uri: String,
    /// Placeholder key, matched against `${name}` in the template text.
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist: Option<String>,
    /// Already-rendered artifact of the template an instruction points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_artifact: Option<String>,
}

impl Variable {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            var_type,
            default_value: None,
            codelist: None,
            linked_artifact: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_codelist(mut self, codelist: impl Into<String>) -> Self {
        self.codelist = Some(codelist.into());
        self
    }

    pub fn with_linked_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.linked_artifact = Some(artifact.into());
        self
    }

    /// The literal token this variable replaces, e.g. `${locatie}`.
    pub fn placeholder(&self) -> String {
        format!("${{{}}}", self.name)
    }
}

/// Variable type as stored in `dct:type`.
///
/// `Other` keeps unrecognised values around; they render like `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariableType {
    Text,
    Number,
    Location,
    Date,
    Codelist,
    Instruction,
    Other(String),
}

impl VariableType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Location => "location",
            Self::Date => "date",
            Self::Codelist => "codelist",
            Self::Instruction => "instruction",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for VariableType {
    fn from(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "number" => Self::Number,
            "location" => Self::Location,
            "date" => Self::Date,
            "codelist" => Self::Codelist,
            "instruction" => Self::Instruction,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for VariableType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<VariableType> for String {
    fn from(value: VariableType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which derived artifact the service maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// RDFa-annotated markup, stored under `ext:annotated`.
    #[default]
    Annotated,
    /// Plain preview text with instructions inlined, stored under `ext:preview`.
    Preview,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annotated => "annotated",
            Self::Preview => "preview",
        }
    }

    /// Full predicate IRI the artifact is stored under.
    pub fn predicate(&self) -> String {
        format!("{EXT_NS}{}", self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annotated" => Ok(Self::Annotated),
            "preview" => Ok(Self::Preview),
            other => Err(AnnotationError::Config(format!(
                "unknown artifact kind '{other}' (expected 'annotated' or 'preview')"
            ))),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the renderer, keyed by template URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTemplate {
    pub uri: String,
    pub rendered: String,
}
