//! Named-placeholder templates: `{name}` is substituted, `{{` and `}}` are
//! literal braces. Rendering is a single pass, so placeholder-like text inside
//! a substituted value is emitted as is.

use labelprep_shared::{LabelPrepError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Var(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pieces: Vec<Piece>,
}

impl PromptTemplate {
    /// Parse `source`, rejecting unbalanced braces and empty or non-identifier names.
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(LabelPrepError::template(format!(
                            "unclosed '{{' at byte {pos}"
                        )));
                    }
                    if name.is_empty() || !name.chars().all(|n| n.is_alphanumeric() || n == '_') {
                        return Err(LabelPrepError::template(format!(
                            "invalid placeholder '{{{name}}}' at byte {pos}"
                        )));
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Var(name));
                }
                '}' => {
                    return Err(LabelPrepError::template(format!(
                        "unmatched '}}' at byte {pos}"
                    )));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for piece in &self.pieces {
            if let Piece::Var(name) = piece {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute `values` (name, text) pairs. Every placeholder must have a value;
    /// unused values are ignored.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Var(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            LabelPrepError::template(format!("no value for placeholder '{name}'"))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl std::str::FromStr for PromptTemplate {
    type Err = LabelPrepError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholders() {
        let t = PromptTemplate::parse("Hi {name}, see {thing}.").unwrap();
        assert_eq!(t.variables(), vec!["name", "thing"]);
        let out = t.render(&[("name", "Ada"), ("thing", "docs")]).unwrap();
        assert_eq!(out, "Hi Ada, see docs.");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let t = PromptTemplate::parse("{{\"k\": {v}}}").unwrap();
        assert_eq!(t.render(&[("v", "1")]).unwrap(), "{\"k\": 1}");
    }

    #[test]
    fn values_are_not_re_expanded() {
        let t = PromptTemplate::parse("{a}|{b}").unwrap();
        let out = t.render(&[("a", "{b}"), ("b", "x")]).unwrap();
        assert_eq!(out, "{b}|x");
    }

    #[test]
    fn missing_value_is_an_error() {
        let t = PromptTemplate::parse("{a}").unwrap();
        let err = t.render(&[("b", "x")]).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn malformed_templates_rejected() {
        assert!(PromptTemplate::parse("open {name").is_err());
        assert!(PromptTemplate::parse("stray } brace").is_err());
        assert!(PromptTemplate::parse("empty {}").is_err());
        assert!(PromptTemplate::parse("spaced {a b}").is_err());
    }

    #[test]
    fn repeated_variable_listed_once() {
        let t: PromptTemplate = "{x}-{x}".parse().unwrap();
        assert_eq!(t.variables(), vec!["x"]);
        assert_eq!(t.render(&[("x", "7")]).unwrap(), "7-7");
    }
}
