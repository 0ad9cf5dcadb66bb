pub mod color;
pub mod config;
pub mod display_width;
pub mod document;
pub mod error;
pub mod graph;
pub mod layout;
pub mod palette;
pub mod renderer;

use std::fs;
use std::path::Path;

use tracing::info;

pub use config::{ColorMode, RenderConfig};
pub use document::Document;
pub use error::{Error, Result};

pub fn render(input: &str, config: &RenderConfig) -> Result<String> {
    let document = document::parse_document(input)?;
    render_document(&document, config)
}

pub fn render_document(document: &Document, config: &RenderConfig) -> Result<String> {
    config.validate()?;
    let graph = graph::build(document)?;
    let computed = layout::compute(&graph, config)?;
    Ok(renderer::render(&computed, config))
}

/// Reads the graph at `input` and writes the SVG to `output`. Nothing is
/// written unless rendering succeeds.
pub fn render_file(input: &Path, output: &Path, config: &RenderConfig) -> Result<()> {
    let document = document::load_document(input)?;
    let svg = render_document(&document, config)?;
    fs::write(output, svg).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;
    info!(path = %output.display(), "wrote svg");
    Ok(())
}
