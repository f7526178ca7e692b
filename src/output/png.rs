//! PNG chart output writer.
//!
//! Charts are drawn as SVG markup and rasterized here with `resvg`.
//! System fonts are loaded once per process and shared by every chart.

use super::{ensure_parent_dir, validate_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn system_fonts() -> Arc<fontdb::Database> {
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} font faces for chart text", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Rasterize an SVG document into PNG bytes
///
/// **Public** - the image size is the document's own width and height
///
/// # Errors
/// * `OutputError::RenderFailed` - markup does not parse or has no area
pub fn render_png(svg_content: &str) -> Result<Vec<u8>, OutputError> {
    let mut options = Options::default();
    options.fontdb = system_fonts();

    let tree = Tree::from_str(svg_content, &options)
        .map_err(|e| OutputError::RenderFailed(format!("Invalid chart markup: {}", e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        OutputError::RenderFailed(format!(
            "Cannot allocate {}x{} image",
            size.width(),
            size.height()
        ))
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| OutputError::RenderFailed(format!("PNG encoding failed: {}", e)))
}

/// Rasterize an SVG chart and write it as PNG
///
/// **Public** - main entry point for chart output
///
/// # Errors
/// * `OutputError::RenderFailed` - rasterization failed
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_png(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_path(output_path)?;
    if output_path.extension().is_some_and(|ext| ext != "png") {
        debug!("Warning: File does not have .png extension: {}", output_path.display());
    }

    let png = render_png(svg_content)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&png)?;
    writer.flush()?;

    info!(
        "Chart written: {} ({:.2} KB)",
        output_path.display(),
        png.len() as f64 / 1024.0
    );

    Ok(())
}
