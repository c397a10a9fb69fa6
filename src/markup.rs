//! RDFa markup fragments for annotated templates.
//!
//! Each fragment wraps a variable's own placeholder (`${name}`) so the editor
//! can highlight it and fill it in later; values are never substituted here.
//! Instruction variables have no fragment, see [`crate::renderer`].

use std::fmt::Write;

use crate::model::{Variable, VariableType, MOBILITEIT_NS};

/// Inputs shared by every generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupContext {
    /// Endpoint advertised as `dct:source` on codelist and location variables.
    pub source: String,
}

impl MarkupContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Render the fragment for any non-instruction variable.
///
/// Unknown types (and instructions, should one get here) render as text.
pub fn fragment(variable: &Variable, ctx: &MarkupContext) -> String {
    match &variable.var_type {
        VariableType::Codelist => codelist(variable, ctx),
        VariableType::Location => location(variable, ctx),
        VariableType::Date => date(variable),
        VariableType::Text
        | VariableType::Number
        | VariableType::Instruction
        | VariableType::Other(_) => text(variable),
    }
}

pub fn text(variable: &Variable) -> String {
    Fragment::open(variable).title(variable).default(variable).close()
}

pub fn codelist(variable: &Variable, ctx: &MarkupContext) -> String {
    let mut fragment = Fragment::open(variable)
        .type_marker("codelist")
        .source(&ctx.source);
    if let Some(codelist) = &variable.codelist {
        fragment = fragment.codelist(codelist);
    }
    fragment.title(variable).default(variable).close()
}

pub fn location(variable: &Variable, ctx: &MarkupContext) -> String {
    Fragment::open(variable)
        .type_marker("location")
        .source(&ctx.source)
        .title(variable)
        .default(variable)
        .close()
}

pub fn date(variable: &Variable) -> String {
    Fragment::open(variable)
        .type_marker("date")
        .typed_title(variable, Some("xsd:date"))
        .typed_default(variable, Some("xsd:date"))
        .close()
}

struct Fragment {
    buf: String,
}

impl Fragment {
    fn open(variable: &Variable) -> Self {
        let mut buf = String::new();
        let _ = writeln!(
            buf,
            r#"<span resource="{}" typeof="{MOBILITEIT_NS}Variabele">"#,
            variable.uri
        );
        Self { buf }
    }

    fn type_marker(mut self, kind: &str) -> Self {
        let _ = writeln!(
            self.buf,
            r#"  <span property="dct:type" content="{kind}"></span>"#
        );
        self
    }

    fn source(mut self, source: &str) -> Self {
        let _ = writeln!(
            self.buf,
            r#"  <span property="dct:source" resource="{source}"></span>"#
        );
        self
    }

    fn codelist(mut self, codelist: &str) -> Self {
        let _ = writeln!(
            self.buf,
            r#"  <span property="ext:codelist" resource="{codelist}"></span>"#
        );
        self
    }

    fn title(self, variable: &Variable) -> Self {
        self.typed_title(variable, None)
    }

    fn typed_title(mut self, variable: &Variable, datatype: Option<&str>) -> Self {
        let _ = writeln!(
            self.buf,
            r#"  <span class="mark-highlight-manual" property="dct:title"{}>{}</span>"#,
            datatype_attr(datatype),
            variable.placeholder()
        );
        self
    }

    fn default(self, variable: &Variable) -> Self {
        self.typed_default(variable, None)
    }

    fn typed_default(mut self, variable: &Variable, datatype: Option<&str>) -> Self {
        let Some(value) = variable.default_value.as_deref().filter(|v| !v.is_empty()) else {
            return self;
        };
        let _ = writeln!(
            self.buf,
            r#"  <span property="{MOBILITEIT_NS}standaardwaarde"{}>{value}</span>"#,
            datatype_attr(datatype)
        );
        self
    }

    fn close(mut self) -> String {
        self.buf.push_str("</span>");
        self.buf
    }
}

fn datatype_attr(datatype: Option<&str>) -> String {
    datatype
        .map(|dt| format!(r#" datatype="{dt}""#))
        .unwrap_or_default()
}
