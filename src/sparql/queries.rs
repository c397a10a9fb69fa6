//! Query builders for the template graph.

use crate::bindings::columns;
use crate::model::{ArtifactKind, RenderedTemplate};

use super::escape::{escape_string, escape_uri};

const PREFIXES: &str = "\
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX mobiliteit: <https://data.vlaanderen.be/ns/mobiliteit#>
PREFIX ext: <http://mu.semte.ch/vocabularies/ext/>";

fn values_clause(uris: &[String]) -> String {
    let terms: Vec<String> = uris.iter().map(|uri| escape_uri(uri)).collect();
    format!("VALUES ?uri {{ {} }}", terms.join(" "))
}

/// Templates with their variables, one row per template x variable.
///
/// `filter` restricts `?uri`; `None` selects every template. Callers are
/// expected to short-circuit an empty filter instead of sending it.
pub fn select_templates(kind: ArtifactKind, filter: Option<&[String]>) -> String {
    let values = filter.map(values_clause).unwrap_or_default();
    let predicate = kind.as_str();
    format!(
        "{PREFIXES}

SELECT DISTINCT ?{uri} ?{value} ?{var} ?{ty} ?{label} ?{default} ?{codelist} ?{linked} WHERE {{
  {values}

  ?{uri} a mobiliteit:Template ;
    rdf:value ?{value} .

  OPTIONAL {{
    ?{uri} mobiliteit:variabele ?{var} .
    ?{var} dct:title ?{label} .
    OPTIONAL {{ ?{var} dct:type ?{ty} . }}
    OPTIONAL {{ ?{var} mobiliteit:standaardwaarde ?{default} . }}
    OPTIONAL {{ ?{var} ext:codelist ?{codelist} . }}
    OPTIONAL {{
      ?{var} mobiliteit:template ?linkedTemplate .
      ?linkedTemplate ext:{predicate} ?{linked} .
    }}
  }}
}}",
        uri = columns::URI,
        value = columns::TEMPLATE_VALUE,
        var = columns::VARIABLE_URI,
        ty = columns::VARIABLE_TYPE,
        label = columns::VARIABLE_LABEL,
        default = columns::VARIABLE_DEFAULT_VALUE,
        codelist = columns::VARIABLE_CODELIST,
        linked = columns::LINKED_ARTIFACT,
    )
}

/// Templates that currently carry an artifact of `kind` in `graph`.
pub fn select_artifact_uris(kind: ArtifactKind, graph: &str) -> String {
    format!(
        "{PREFIXES}

SELECT DISTINCT ?{uri} WHERE {{
  GRAPH {graph} {{
    ?{uri} a mobiliteit:Template ;
      ext:{predicate} ?artifact .
  }}
}}",
        uri = columns::URI,
        graph = escape_uri(graph),
        predicate = kind.as_str(),
    )
}

/// Templates embedding one of `uris` through an instruction variable.
pub fn select_dependents(uris: &[String]) -> String {
    format!(
        "{PREFIXES}

SELECT DISTINCT ?{dependent} WHERE {{
  {values}

  ?variableUri mobiliteit:template ?uri .
  ?{dependent} mobiliteit:variabele ?variableUri .

  ?uri a mobiliteit:Template .
}}",
        dependent = columns::DEPENDENT_URI,
        values = values_clause(uris),
    )
}

fn delete_artifact(kind: ArtifactKind, graph: &str, uri: &str) -> String {
    format!(
        "DELETE WHERE {{
  GRAPH {graph} {{
    {subject} ext:{predicate} ?artifact .
  }}
}};",
        graph = escape_uri(graph),
        subject = escape_uri(uri),
        predicate = kind.as_str(),
    )
}

/// Retract the old artifact of every template in `chunk` and assert the new one.
pub fn replace_artifacts(kind: ArtifactKind, graph: &str, chunk: &[RenderedTemplate]) -> String {
    let deletes: Vec<String> = chunk
        .iter()
        .map(|item| delete_artifact(kind, graph, &item.uri))
        .collect();
    let inserts: Vec<String> = chunk
        .iter()
        .map(|item| {
            format!(
                "    {} ext:{} {} .",
                escape_uri(&item.uri),
                kind.as_str(),
                escape_string(&item.rendered)
            )
        })
        .collect();

    format!(
        "{PREFIXES}

{deletes}

INSERT DATA {{
  GRAPH {graph} {{
{inserts}
  }}
}}",
        deletes = deletes.join("\n"),
        graph = escape_uri(graph),
        inserts = inserts.join("\n"),
    )
}

/// Retract the artifact of every template in `uris`.
pub fn retract_artifacts(kind: ArtifactKind, graph: &str, uris: &[String]) -> String {
    let deletes: Vec<String> = uris
        .iter()
        .map(|uri| delete_artifact(kind, graph, uri))
        .collect();
    format!("{PREFIXES}\n\n{}", deletes.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = "http://mu.semte.ch/graphs/mow/registry";

    #[test]
    fn select_all_has_no_values() {
        let query = select_templates(ArtifactKind::Annotated, None);
        assert!(!query.contains("VALUES"));
        assert!(query.contains("?linkedTemplate ext:annotated ?linkedArtifact"));
    }

    #[test]
    fn select_filtered_lists_uris() {
        let filter = vec!["http://x/t/1".to_string(), "http://x/t/2".to_string()];
        let query = select_templates(ArtifactKind::Preview, Some(&filter));
        assert!(query.contains("VALUES ?uri { <http://x/t/1> <http://x/t/2> }"));
        assert!(query.contains("?linkedTemplate ext:preview ?linkedArtifact"));
    }

    #[test]
    fn artifact_uris_scoped_to_graph() {
        let query = select_artifact_uris(ArtifactKind::Annotated, GRAPH);
        assert!(query.contains("GRAPH <http://mu.semte.ch/graphs/mow/registry>"));
        assert!(query.contains("ext:annotated ?artifact"));
    }

    #[test]
    fn dependents_join_through_variable() {
        let query = select_dependents(&["http://x/t/b".to_string()]);
        assert!(query.contains("VALUES ?uri { <http://x/t/b> }"));
        assert!(query.contains("?dependentUri mobiliteit:variabele ?variableUri"));
    }

    #[test]
    fn replace_deletes_each_then_inserts_once() {
        let chunk = vec![
            RenderedTemplate {
                uri: "http://x/t/1".into(),
                rendered: "een \"quote\"".into(),
            },
            RenderedTemplate {
                uri: "http://x/t/2".into(),
                rendered: "twee".into(),
            },
        ];
        let query = replace_artifacts(ArtifactKind::Annotated, GRAPH, &chunk);
        assert_eq!(query.matches("DELETE WHERE").count(), 2);
        assert_eq!(query.matches("INSERT DATA").count(), 1);
        assert!(query.contains(r#"<http://x/t/1> ext:annotated """een \"quote\"""" ."#));
        assert!(query.contains(r#"<http://x/t/2> ext:annotated """twee""" ."#));
        let last_delete = query.rfind("DELETE WHERE").unwrap();
        assert!(last_delete < query.find("INSERT DATA").unwrap());
    }

    #[test]
    fn retract_only_deletes() {
        let uris = vec!["http://x/t/1".to_string(), "http://x/t/2".to_string()];
        let query = retract_artifacts(ArtifactKind::Preview, GRAPH, &uris);
        assert_eq!(query.matches("DELETE WHERE").count(), 2);
        assert!(!query.contains("INSERT"));
        assert!(query.contains("<http://x/t/2> ext:preview ?artifact ."));
    }
}
