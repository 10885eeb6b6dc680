/*!
 * Prompt templates with named placeholders.
 *
 * A placeholder is `{name}` where `name` is an identifier. `{{` and `}}`
 * render as literal braces, so JSON examples embedded in a prompt must
 * double their braces. Rendering is all-or-nothing: a template with a
 * placeholder that has no value is rejected before any request is built.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::errors::TemplateError;

// Alternation is leftmost-first, so escapes win over placeholders.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}|\{|\}").unwrap());

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptVars {
    values: BTreeMap<String, String>,
}

impl PromptVars {
    /// Create an empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a variable in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// A prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for captures in TOKEN_PATTERN.captures_iter(&self.template) {
            if let Some(name) = captures.get(1) {
                if !names.iter().any(|n| n == name.as_str()) {
                    names.push(name.as_str().to_string());
                }
            }
        }
        names
    }

    /// Render the template with the given variables.
    pub fn render(&self, vars: &PromptVars) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.template.len());
        let mut last = 0;

        for captures in TOKEN_PATTERN.captures_iter(&self.template) {
            let Some(token) = captures.get(0) else {
                continue;
            };
            rendered.push_str(&self.template[last..token.start()]);
            last = token.end();

            match (token.as_str(), captures.get(1)) {
                ("{{", _) => rendered.push('{'),
                ("}}", _) => rendered.push('}'),
                (_, Some(name)) => {
                    let value = vars
                        .get(name.as_str())
                        .ok_or_else(|| TemplateError::MissingVariable(name.as_str().to_string()))?;
                    rendered.push_str(value);
                }
                _ => {
                    return Err(TemplateError::Malformed {
                        position: token.start(),
                    });
                }
            }
        }

        rendered.push_str(&self.template[last..]);
        Ok(rendered)
    }
}

impl From<&str> for PromptTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}
