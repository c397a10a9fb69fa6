//! SPARQL term escaping, compatible with the mu-semtech helpers.

/// `<uri>` with `\`, `"`, `<` and `>` backslash-escaped.
pub fn escape_uri(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len() + 2);
    out.push('<');
    for ch in uri.chars() {
        if matches!(ch, '\\' | '"' | '<' | '>') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('>');
    out
}

/// Triple-quoted string literal with `\` and `"` backslash-escaped.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 6);
    out.push_str(r#"""""#);
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push_str(r#"""""#);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_is_wrapped() {
        assert_eq!(escape_uri("http://x/t/1"), "<http://x/t/1>");
    }

    #[test]
    fn uri_brackets_are_escaped() {
        assert_eq!(escape_uri("http://x/a>b"), r"<http://x/a\>b>");
    }

    #[test]
    fn string_quotes_are_escaped() {
        assert_eq!(
            escape_string(r#"<span resource="x">a\b</span>"#),
            r#""""<span resource=\"x\">a\\b</span>""""#
        );
    }

    #[test]
    fn multiline_string_kept() {
        assert_eq!(escape_string("a\nb"), "\"\"\"a\nb\"\"\"");
    }
}
