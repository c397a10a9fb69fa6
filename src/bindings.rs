//! SPARQL JSON result types and the binding parser.
//!
//! A template select returns one row per template x variable pair. Rows are
//! folded into [`Template`]s here, keeping first-seen order for both templates
//! and variables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};
use crate::model::{Template, Variable, VariableType};

/// Column names projected by the template select.
pub mod columns {
    pub const URI: &str = "uri";
    pub const TEMPLATE_VALUE: &str = "templateValue";
    pub const VARIABLE_URI: &str = "variableUri";
    pub const VARIABLE_TYPE: &str = "variableType";
    pub const VARIABLE_LABEL: &str = "variableLabel";
    pub const VARIABLE_DEFAULT_VALUE: &str = "variableDefaultValue";
    pub const VARIABLE_CODELIST: &str = "variableCodelist";
    pub const LINKED_ARTIFACT: &str = "linkedArtifact";
    pub const DEPENDENT_URI: &str = "dependentUri";
}

/// `application/sparql-results+json` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectResponse {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Results,
}

impl SelectResponse {
    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.results.bindings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One RDF term in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".into(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".into(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// A result row: column name to bound term. Unbound columns are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(pub HashMap<String, Term>);

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, term: Term) -> Self {
        self.0.insert(column.to_string(), term);
        self
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(|term| term.value.as_str())
    }

    fn required(&self, row: usize, column: &'static str) -> Result<&str> {
        self.value(column)
            .ok_or(AnnotationError::MalformedBinding { row, field: column })
    }
}

/// Fold flat template rows into templates with their variables.
///
/// A row without `variableUri` only registers the template. A missing
/// `templateValue` becomes the empty string. Optional variable columns are
/// carried over only when bound.
pub fn parse_template_bindings(bindings: &[Binding]) -> Result<Vec<Template>> {
    let mut templates: Vec<Template> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, binding) in bindings.iter().enumerate() {
        let uri = binding.required(row, columns::URI)?;

        let slot = match index.get(uri) {
            Some(&slot) => slot,
            None => {
                let raw_text = binding.value(columns::TEMPLATE_VALUE).unwrap_or_default();
                templates.push(Template::new(uri, raw_text));
                index.insert(uri.to_string(), templates.len() - 1);
                templates.len() - 1
            }
        };

        let Some(variable_uri) = binding.value(columns::VARIABLE_URI) else {
            continue;
        };

        let name = binding.required(row, columns::VARIABLE_LABEL)?;
        let var_type = binding
            .value(columns::VARIABLE_TYPE)
            .map(VariableType::from)
            .unwrap_or(VariableType::Text);

        let variable = Variable {
            uri: variable_uri.to_string(),
            name: name.to_string(),
            var_type,
            default_value: binding
                .value(columns::VARIABLE_DEFAULT_VALUE)
                .map(str::to_string),
            codelist: binding.value(columns::VARIABLE_CODELIST).map(str::to_string),
            linked_artifact: binding.value(columns::LINKED_ARTIFACT).map(str::to_string),
        };

        templates[slot].variables.push(variable);
    }

    Ok(templates)
}

/// Collect one URI column from every row, deduplicated in first-seen order.
pub fn column_values(bindings: &[Binding], column: &'static str) -> Result<Vec<String>> {
    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for (row, binding) in bindings.iter().enumerate() {
        let value = binding.required(row, column)?;
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}
