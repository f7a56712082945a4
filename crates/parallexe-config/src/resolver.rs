//! Environment variable resolver
//!
//! This module handles resolution of `${VAR}` and `${VAR:-default}` in
//! inventory strings, and `~` expansion in key paths.

use crate::{ConfigError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Context for resolving variables
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Environment variables (can be overridden)
    pub env_vars: HashMap<String, String>,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionContext {
    /// Create a context from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Create a context with no variables
    pub fn empty() -> Self {
        Self {
            env_vars: HashMap::new(),
        }
    }

    /// Add or update an environment variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.insert(key.into(), value.into());
    }
}

/// Substitute environment variables in a string
pub fn resolve_string(input: &str, context: &ResolutionContext) -> Result<String> {
    let mut missing = Vec::new();
    let resolved = resolve_collecting(input, context, &mut missing);

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(resolved)
}

/// Substitute what can be substituted, recording missing names in `missing`
pub(crate) fn resolve_collecting(
    input: &str,
    context: &ResolutionContext,
    missing: &mut Vec<String>,
) -> String {
    ENV_VAR
        .replace_all(input, |cap: &regex::Captures<'_>| {
            let var_expr = &cap[1];

            // Handle default values: ${VAR:-default}
            let (var_name, default_value) = match var_expr.find(":-") {
                Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
                None => (var_expr, None),
            };

            match (context.env_vars.get(var_name), default_value) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.to_string(),
                (None, None) => {
                    if !missing.iter().any(|m| m == var_name) {
                        missing.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Expand a leading `~` to the `HOME` of `context`
pub fn expand_home(path: &str, context: &ResolutionContext) -> String {
    let home = context.env_vars.get("HOME");
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", home, rest)
        }
        _ => path.to_string(),
    }
}
