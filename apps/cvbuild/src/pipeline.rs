//! Load → filter → render, shared by the CLI and the HTTP service.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::document::{self, filter_document, FilterError, LoadError, Map, Node, TagSet};
use crate::render::{write_output, RenderError, TemplateRenderer};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One CLI build: source document, template, output file and optional tags.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub source: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    /// `None` renders the document untouched.
    pub tags: Option<TagSet>,
}

/// Builds the output file for `request`.
pub fn build(request: &BuildRequest) -> Result<(), PipelineError> {
    let tree = document::load_path(&request.source)?;
    info!(source = %request.source.display(), "Loaded source document");

    let context = filter_tree(&tree, request.tags.as_ref())?;

    let renderer = TemplateRenderer::from_path(&request.template)?;
    let rendered = renderer.render(&context)?;
    write_output(&request.output, &rendered)?;

    info!(
        output = %request.output.display(),
        bytes = rendered.len(),
        "Wrote rendered document"
    );
    Ok(())
}

/// Loads and filters a source file without rendering it.
pub fn filter_file(source: &Path, tags: Option<&TagSet>) -> Result<Option<Node>, PipelineError> {
    let tree = document::load_path(source)?;
    Ok(filter_document(&tree, tags)?)
}

/// Renders an in-memory document with an in-memory template.
pub fn render_source(
    document_source: &str,
    template_source: &str,
    tags: Option<&TagSet>,
) -> Result<String, PipelineError> {
    let tree = document::load_str(document_source)?;
    let context = filter_tree(&tree, tags)?;
    let renderer = TemplateRenderer::from_source("document", template_source)?;
    Ok(renderer.render(&context)?)
}

/// Filters the loaded tree into a render context. A pruned root renders
/// against an empty mapping.
fn filter_tree(tree: &Node, tags: Option<&TagSet>) -> Result<Node, FilterError> {
    match tags {
        Some(tags) => info!(tags = %tags, "Filtering document"),
        None => info!("No tags given, rendering every variant"),
    }
    Ok(filter_document(tree, tags)?.unwrap_or_else(|| Node::PlainMap(Map::new())))
}
