//! Template renderer.
//!
//! Substitution is a single pass over the raw text. The matcher is built from
//! the template's own placeholders, so only literal `${name}` occurrences of
//! known variables are replaced, whatever else the text contains. Text coming
//! in through a replacement (markup fragments, embedded instruction artifacts)
//! is never scanned again, so placeholders that belong to an embedded template
//! stay as they are.

use std::collections::HashMap;

use anyhow::anyhow;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{AnnotationError, Result};
use crate::markup::{self, MarkupContext};
use crate::model::{ArtifactKind, RenderedTemplate, Template, Variable, VariableType};

/// Renders templates into one kind of derived artifact.
#[derive(Debug, Clone)]
pub struct Renderer {
    kind: ArtifactKind,
    markup: MarkupContext,
}

impl Renderer {
    pub fn new(kind: ArtifactKind, markup: MarkupContext) -> Self {
        Self { kind, markup }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn render(&self, template: &Template) -> Result<String> {
        if template.variables.is_empty() || template.raw_text.is_empty() {
            return Ok(template.raw_text.clone());
        }

        // Keyed by the full `${name}` token. Later variables overwrite
        // earlier ones sharing a name.
        let mut replacements: HashMap<String, String> = HashMap::new();
        for variable in &template.variables {
            match self.replacement(variable) {
                Replacement::With(text) => {
                    replacements.insert(variable.placeholder(), text);
                }
                Replacement::Keep => {
                    replacements.remove(&variable.placeholder());
                }
                Replacement::Skip => {
                    debug!(
                        template = %template.uri,
                        variable = %variable.uri,
                        "instruction has no linked artifact yet, leaving placeholder"
                    );
                }
            }
        }
        if replacements.is_empty() {
            return Ok(template.raw_text.clone());
        }

        let matcher = placeholder_matcher(replacements.keys().map(String::as_str))?;
        Ok(matcher
            .replace_all(&template.raw_text, |caps: &Captures| {
                replacements
                    .get(&caps[0])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned())
    }

    pub fn render_all(&self, templates: &[Template]) -> Result<Vec<RenderedTemplate>> {
        templates
            .iter()
            .map(|template| {
                Ok(RenderedTemplate {
                    uri: template.uri.clone(),
                    rendered: self.render(template)?,
                })
            })
            .collect()
    }

    fn replacement(&self, variable: &Variable) -> Replacement {
        match (&variable.var_type, self.kind) {
            (VariableType::Instruction, _) => match &variable.linked_artifact {
                Some(artifact) => Replacement::With(artifact.clone()),
                None => Replacement::Skip,
            },
            (_, ArtifactKind::Annotated) => {
                Replacement::With(markup::fragment(variable, &self.markup))
            }
            (_, ArtifactKind::Preview) => Replacement::Keep,
        }
    }
}

/// Alternation of the escaped tokens, longest first so a token that is a
/// prefix of another never shadows it.
fn placeholder_matcher<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Regex> {
    let mut tokens: Vec<&str> = tokens.collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let pattern = tokens
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern)
        .map_err(|e| AnnotationError::Internal(anyhow!("placeholder matcher: {e}")))
}

enum Replacement {
    With(String),
    /// Leave the token as written.
    Keep,
    /// Variable contributes nothing; an earlier one with the same name still applies.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated() -> Renderer {
        Renderer::new(
            ArtifactKind::Annotated,
            MarkupContext::new("http://example.com/sparql"),
        )
    }

    fn preview() -> Renderer {
        Renderer::new(
            ArtifactKind::Preview,
            MarkupContext::new("http://example.com/sparql"),
        )
    }

    fn normalize(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn no_variables_is_identity() {
        let template = Template::new("http://x/t", "de fietszone wordt afgebakend ${x}");
        assert_eq!(annotated().render(&template).unwrap(), template.raw_text);
        assert_eq!(preview().render(&template).unwrap(), template.raw_text);
    }

    #[test]
    fn empty_text_renders_empty() {
        let template = Template::new("http://x/t", "")
            .with_variable(Variable::new("http://x/v", "a", VariableType::Text));
        assert_eq!(annotated().render(&template).unwrap(), "");
    }

    #[test]
    fn location_then_number() {
        let template = Template::new("http://x/t", "${locatie} abc, ${autonummer}")
            .with_variable(Variable::new("http://x/v/1", "locatie", VariableType::Location))
            .with_variable(Variable::new("http://x/v/2", "autonummer", VariableType::Number));

        let out = annotated().render(&template).unwrap();
        let expected = format!(
            "{} abc, {}",
            markup::location(&template.variables[0], &MarkupContext::new("http://example.com/sparql")),
            markup::text(&template.variables[1]),
        );
        assert_eq!(out, expected);
        assert!(normalize(&out).contains(r#"<span property="dct:type" content="location"></span>"#));
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let template = Template::new("http://x/t", "${a} en ${a} en ${b}")
            .with_variable(Variable::new("http://x/v/a", "a", VariableType::Text));
        let out = annotated().render(&template).unwrap();
        let fragment = markup::text(&template.variables[0]);
        assert_eq!(out, format!("{fragment} en {fragment} en ${{b}}"));
    }

    #[test]
    fn names_are_matched_literally() {
        let template = Template::new("http://x/t", "${WM76.2} ${WM76X2}")
            .with_variable(Variable::new("http://x/v", "WM76.2", VariableType::Text));
        let out = annotated().render(&template).unwrap();
        assert!(out.ends_with(" ${WM76X2}"));
        assert!(out.starts_with(r#"<span resource="http://x/v""#));
    }

    #[test]
    fn unclosed_brace_does_not_hide_later_placeholder() {
        let template = Template::new("http://x/t", "Prijs ${bedrag EUR, zone ${zone}")
            .with_variable(Variable::new("http://x/v/zone", "zone", VariableType::Text));
        let out = annotated().render(&template).unwrap();
        let fragment = markup::text(&template.variables[0]);
        assert_eq!(out, format!("Prijs ${{bedrag EUR, zone {fragment}"));
        assert!(out.contains("mark-highlight-manual"));
    }

    #[test]
    fn names_containing_braces_match_whole_token() {
        let template = Template::new("http://x/t", "${a}b} ${a}")
            .with_variable(
                Variable::new("http://x/v/1", "a", VariableType::Instruction)
                    .with_linked_artifact("kort"),
            )
            .with_variable(
                Variable::new("http://x/v/2", "a}b", VariableType::Instruction)
                    .with_linked_artifact("lang"),
            );
        assert_eq!(preview().render(&template).unwrap(), "lang kort");
    }

    #[test]
    fn instruction_is_embedded_verbatim() {
        let embedded = "Rijrichting ${richting}: <b>$1</b>";
        let template = Template::new("http://x/t", "Zie: ${instructie1}.")
            .with_variable(
                Variable::new("http://x/v/i", "instructie1", VariableType::Instruction)
                    .with_linked_artifact(embedded),
            )
            .with_variable(Variable::new("http://x/v/r", "richting", VariableType::Text));

        let out = annotated().render(&template).unwrap();
        assert_eq!(out, format!("Zie: {embedded}."));
    }

    #[test]
    fn instruction_without_artifact_keeps_placeholder() {
        let template = Template::new("http://x/t", "Zie: ${instructie1}.").with_variable(
            Variable::new("http://x/v/i", "instructie1", VariableType::Instruction),
        );
        assert_eq!(annotated().render(&template).unwrap(), "Zie: ${instructie1}.");
    }

    #[test]
    fn preview_keeps_plain_placeholders() {
        let template = Template::new("http://x/t", "${locatie}: ${instructie}")
            .with_variable(Variable::new("http://x/v/1", "locatie", VariableType::Location))
            .with_variable(
                Variable::new("http://x/v/2", "instructie", VariableType::Instruction)
                    .with_linked_artifact("verboden toegang"),
            );
        assert_eq!(preview().render(&template).unwrap(), "${locatie}: verboden toegang");
    }

    #[test]
    fn last_variable_wins_on_shared_name() {
        let template = Template::new("http://x/t", "${x}")
            .with_variable(Variable::new("http://x/v/1", "x", VariableType::Date))
            .with_variable(
                Variable::new("http://x/v/2", "x", VariableType::Instruction)
                    .with_linked_artifact("embedded"),
            );
        assert_eq!(annotated().render(&template).unwrap(), "embedded");
    }

    #[test]
    fn render_all_keeps_order_and_uris() {
        let templates = vec![
            Template::new("http://x/t/1", "een"),
            Template::new("http://x/t/2", "twee"),
        ];
        let rendered = annotated().render_all(&templates).unwrap();
        assert_eq!(
            rendered,
            vec![
                RenderedTemplate {
                    uri: "http://x/t/1".into(),
                    rendered: "een".into()
                },
                RenderedTemplate {
                    uri: "http://x/t/2".into(),
                    rendered: "twee".into()
                },
            ]
        );
    }
}
