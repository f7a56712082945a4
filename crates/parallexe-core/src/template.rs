//! Per-host template rendering

use crate::variables::VariableMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}")
        .expect("placeholder pattern is valid")
});

/// Template rendering errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholders without a value
    #[error("template '{template}' references undefined variables: {}", .names.join(", "))]
    Undefined {
        /// The template name
        template: String,
        /// Undefined variable names
        names: Vec<String>,
    },

    /// Renderer-specific failure
    #[error("failed to render template '{template}': {reason}")]
    Render {
        /// The template name
        template: String,
        /// The reason for the failure
        reason: String,
    },
}

/// Renders template text with a host's variables
pub trait Renderer: Send + Sync {
    /// Render `source`, named `name` for error messages
    fn render(
        &self,
        name: &str,
        source: &str,
        variables: &VariableMap,
    ) -> Result<String, TemplateError>;
}

/// Substitutes `${name}` placeholders.
///
/// Dotted names (`${db.host}`) walk into object values. Strings are inserted
/// verbatim and other values as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(
        &self,
        name: &str,
        source: &str,
        variables: &VariableMap,
    ) -> Result<String, TemplateError> {
        let mut undefined = Vec::new();

        let rendered = PLACEHOLDER.replace_all(source, |caps: &Captures<'_>| {
            let path = &caps[1];
            match lookup(variables, path) {
                Some(Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => {
                    if !undefined.iter().any(|n| n == path) {
                        undefined.push(path.to_string());
                    }
                    String::new()
                }
            }
        });

        if !undefined.is_empty() {
            return Err(TemplateError::Undefined {
                template: name.to_string(),
                names: undefined,
            });
        }

        Ok(rendered.into_owned())
    }
}

fn lookup<'a>(variables: &'a VariableMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut value = variables.get(segments.next()?)?;
    for segment in segments {
        value = value.get(segment)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> VariableMap {
        serde_json::from_value(json!({
            "name": "web-1",
            "port": 8080,
            "db": {"host": "db.internal", "port": 5432}
        }))
        .unwrap()
    }

    #[test]
    fn test_substitutes_placeholders() {
        let out = PlaceholderRenderer
            .render("app.conf", "server ${name}:${ port }\n", &vars())
            .unwrap();
        assert_eq!(out, "server web-1:8080\n");
    }

    #[test]
    fn test_dotted_lookup() {
        let out = PlaceholderRenderer
            .render("db.conf", "${db.host}:${db.port}", &vars())
            .unwrap();
        assert_eq!(out, "db.internal:5432");
    }

    #[test]
    fn test_reports_every_undefined_name_once() {
        let err = PlaceholderRenderer
            .render("x", "${a} ${b} ${a} ${db.user}", &vars())
            .unwrap_err();
        match err {
            TemplateError::Undefined { template, names } => {
                assert_eq!(template, "x");
                assert_eq!(names, vec!["a", "b", "db.user"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_text_without_placeholders_is_unchanged() {
        let source = "plain $HOME text";
        assert_eq!(PlaceholderRenderer.render("t", source, &vars()).unwrap(), source);
    }
}
