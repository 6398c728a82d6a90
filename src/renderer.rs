//! Template renderer for dexa.
//! Wraps MiniJinja behind the `TemplateRenderer` trait and registers the
//! filters available to stack templates.
use cruet::Inflector;
use minijinja::{AutoEscape, Environment, ErrorKind};
use regex::Regex;

use crate::error::Result;

/// Trait for template rendering engines.
pub trait TemplateRenderer: Send + Sync {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name reported in rendering errors, usually the source path
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new renderer with trailing newlines preserved and the case
    /// conversion and `regex` filters registered.
    ///
    /// Stacks generate source files, so no output is escaped whatever the
    /// template extension.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("camel_case", |value: String| value.to_camel_case());
        env.add_filter("pascal_case", |value: String| value.to_pascal_case());
        env.add_filter("snake_case", |value: String| value.to_snake_case());
        env.add_filter("kebab_case", |value: String| value.to_kebab_case());
        env.add_filter("screaming_snake_case", |value: String| value.to_screaming_snake_case());
        env.add_filter("title_case", |value: String| value.to_title_case());
        env.add_filter("regex", regex_filter);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        Ok(self.env.render_named_str(name, template, context)?)
    }
}

/// `{{ value | regex("^[a-z]+$") }}` evaluates to whether `value` matches.
fn regex_filter(value: &str, pattern: &str) -> std::result::Result<bool, minijinja::Error> {
    let re = Regex::new(pattern).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("invalid regex: {e}"))
    })?;
    Ok(re.is_match(value))
}
