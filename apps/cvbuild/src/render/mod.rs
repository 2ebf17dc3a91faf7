//! Template rendering over a filtered document.
//!
//! Templates use Jinja syntax via minijinja. File templates resolve
//! `{% include %}` and `{% extends %}` against their own directory.

pub mod handlers;

use std::path::Path;

use minijinja::{path_loader, AutoEscape, Environment, ErrorKind};
use thiserror::Error;
use tracing::debug;

use crate::document::Node;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to load template from {name}. Error on line {line}: {message}")]
    Syntax {
        name: String,
        line: usize,
        message: String,
    },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A compiled template plus the environment that owns it.
pub struct TemplateRenderer {
    env: Environment<'static>,
    name: String,
}

impl TemplateRenderer {
    /// Loads a template file. Sibling files are reachable from the template.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RenderError::NotFound(path.display().to_string()))?
            .to_string();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        let mut env = base_environment();
        env.set_loader(path_loader(dir));

        let renderer = TemplateRenderer { env, name };
        renderer.check()?;
        debug!(template = %path.display(), "Template loaded");
        Ok(renderer)
    }

    /// Compiles an in-memory template.
    pub fn from_source(name: &str, source: &str) -> Result<Self, RenderError> {
        let mut env = base_environment();
        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| classify(e, name))?;

        let renderer = TemplateRenderer {
            env,
            name: name.to_string(),
        };
        renderer.check()?;
        Ok(renderer)
    }

    /// Renders the template with `context` as its variables.
    pub fn render(&self, context: &Node) -> Result<String, RenderError> {
        let template = self
            .env
            .get_template(&self.name)
            .map_err(|e| classify(e, &self.name))?;
        template.render(context).map_err(|e| classify(e, &self.name))
    }

    fn check(&self) -> Result<(), RenderError> {
        self.env
            .get_template(&self.name)
            .map(|_| ())
            .map_err(|e| classify(e, &self.name))
    }
}

/// Writes rendered output, replacing any existing file.
pub fn write_output(path: &Path, rendered: &str) -> Result<(), RenderError> {
    std::fs::write(path, rendered).map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    // Output is usually LaTeX, Markdown or plain text, never escaped.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

fn classify(err: minijinja::Error, fallback_name: &str) -> RenderError {
    let name = err.name().unwrap_or(fallback_name).to_string();
    match err.kind() {
        ErrorKind::SyntaxError => RenderError::Syntax {
            name,
            line: err.line().unwrap_or_default(),
            message: err
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
        },
        ErrorKind::TemplateNotFound => RenderError::NotFound(name),
        _ => RenderError::Render { name, source: err },
    }
}
