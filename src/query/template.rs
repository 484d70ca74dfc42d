//! Query template parsing and parameter substitution
//!
//! Templates use `{name}` placeholders and `{{` / `}}` for literal braces.
//! A template is parsed once into segments and can then be rendered against
//! any number of parameter sets.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// Parameter values keyed by placeholder name
pub type Params = BTreeMap<String, String>;

/// Errors raised while parsing or rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder had no entry in the parameter map
    #[error("missing parameter '{name}'")]
    MissingParameter { name: String },

    /// The template text is not valid placeholder syntax
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

impl TemplateError {
    fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}

/// Template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with brace escapes already collapsed
    Literal(String),
    /// Named placeholder
    Placeholder(String),
}

/// Parsed query template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string into segments
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            match ch {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }

                    if !closed {
                        return Err(TemplateError::malformed(position, "unterminated placeholder"));
                    }
                    if name.is_empty() {
                        return Err(TemplateError::malformed(position, "empty placeholder"));
                    }
                    if !name.chars().all(is_name_char) {
                        return Err(TemplateError::malformed(
                            position,
                            format!("invalid placeholder name '{name}'"),
                        ));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        literal.push('}');
                        continue;
                    }
                    return Err(TemplateError::malformed(position, "unmatched '}'"));
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Original template text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder from `params`
    ///
    /// Fails on the first placeholder (in template order) without a value.
    pub fn render(&self, params: &Params) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingParameter { name: name.clone() })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }

    /// Render the template and AND it with an optional, already rendered fragment
    pub fn resolve(
        &self,
        params: &Params,
        fragment: Option<&str>,
    ) -> Result<ResolvedQuery, TemplateError> {
        let base = self.render(params)?;
        Ok(ResolvedQuery(combine(&base, fragment)))
    }
}

/// Parse `base_template`, substitute `params` and append `fragment` with AND
pub fn resolve(
    base_template: &str,
    params: &Params,
    fragment: Option<&str>,
) -> Result<ResolvedQuery, TemplateError> {
    Template::parse(base_template)?.resolve(params, fragment)
}

fn combine(base: &str, fragment: Option<&str>) -> String {
    match fragment {
        Some(fragment) => format!("({base}) AND ({fragment})"),
        None => base.to_string(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// A fully substituted query, ready for an executor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedQuery(String);

impl ResolvedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for ResolvedQuery {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResolvedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ResolvedQuery> for String {
    fn from(query: ResolvedQuery) -> Self {
        query.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_with_fragment() {
        let resolved = resolve(
            r#"project = "{project}" AND type = {type}"#,
            &params(&[("project", "FOO"), ("type", "Bug")]),
            Some("resolution = Unresolved"),
        )
        .unwrap();

        assert_eq!(
            resolved.as_str(),
            r#"(project = "FOO" AND type = Bug) AND (resolution = Unresolved)"#
        );
    }

    #[test]
    fn test_resolve_without_fragment() {
        let resolved = resolve("project = {project}", &params(&[("project", "FOO")]), None).unwrap();
        assert_eq!(resolved.as_str(), "project = FOO");
    }

    #[test]
    fn test_missing_parameter_names_key() {
        let err = resolve(
            "project = {project} AND type = {type}",
            &params(&[("project", "FOO")]),
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TemplateError::MissingParameter {
                name: "type".to_string()
            }
        );
    }

    #[test]
    fn test_missing_parameter_reports_first_in_template_order() {
        let err = resolve("{b} {a}", &Params::new(), None).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingParameter {
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn test_extra_params_are_ignored() {
        let resolved = resolve(
            "type = {type}",
            &params(&[("type", "Bug"), ("unused", "x")]),
            None,
        )
        .unwrap();
        assert_eq!(resolved.as_str(), "type = Bug");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("labels in ({{a}}) AND project = {project}").unwrap();
        assert_eq!(template.placeholders(), vec!["project"]);
        assert_eq!(
            template.render(&params(&[("project", "FOO")])).unwrap(),
            "labels in ({a}) AND project = FOO"
        );
    }

    #[test]
    fn test_malformed_templates() {
        let cases = [
            ("project = {project", 10, "unterminated placeholder"),
            ("project = {}", 10, "empty placeholder"),
            ("a } b", 2, "unmatched '}'"),
            ("x = {bad name}", 4, "invalid placeholder name 'bad name'"),
        ];

        for (raw, expected_position, expected_reason) in cases {
            match Template::parse(raw) {
                Err(TemplateError::Malformed { position, reason }) => {
                    assert_eq!(position, expected_position, "position for {raw:?}");
                    assert_eq!(reason, expected_reason, "reason for {raw:?}");
                }
                other => panic!("Expected malformed error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_placeholders_deduplicated_in_order() {
        let template = Template::parse("{project} {type} {project} {custom.filter}").unwrap();
        assert_eq!(
            template.placeholders(),
            vec!["project", "type", "custom.filter"]
        );
    }

    #[test]
    fn test_fragment_is_appended_verbatim() {
        let resolved = resolve("a = 1", &Params::new(), Some("labels = {literal}")).unwrap();
        assert_eq!(resolved.as_str(), "(a = 1) AND (labels = {literal})");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let template = Template::parse("project = {project}").unwrap();
        let p = params(&[("project", "FOO")]);
        assert_eq!(
            template.resolve(&p, Some("x")).unwrap(),
            template.resolve(&p, Some("x")).unwrap()
        );
    }

    proptest! {
        #[test]
        fn test_rendered_output_has_no_placeholders(
            pieces in prop::collection::vec(("[a-zA-Z0-9 =\"()]{0,12}", "[a-z_]{1,8}"), 1..6),
            value in "[A-Za-z0-9 ]{0,10}",
        ) {
            let mut raw = String::new();
            let mut p = Params::new();
            for (literal, name) in &pieces {
                raw.push_str(literal);
                raw.push('{');
                raw.push_str(name);
                raw.push('}');
                p.insert(name.clone(), value.clone());
            }

            let rendered = Template::parse(&raw).unwrap().render(&p).unwrap();
            prop_assert!(!rendered.contains('{'), "leftover open brace in {:?}", rendered);
            prop_assert!(!rendered.contains('}'), "leftover close brace in {:?}", rendered);
        }

        #[test]
        fn test_missing_key_never_renders_empty(name in "[a-z_]{1,8}") {
            let raw = format!("x = {{{name}}}");
            let err = resolve(&raw, &Params::new(), None).unwrap_err();
            prop_assert_eq!(err, TemplateError::MissingParameter { name });
        }
    }
}
