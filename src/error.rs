//! Error type shared by print, export and model loading.
//!
//! Interactive edits never produce errors (they are clamped), and links that
//! reference missing nodes are skipped while rendering, so everything here is
//! raised at an action boundary: opening a network, printing or exporting.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by diagram actions.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// A named page layout was requested that the network does not define.
    #[error("page layout \"{0}\" is not defined by the network")]
    LayoutNotFound(String),

    /// The export path does not name a supported raster format.
    #[error("unsupported image format for {}: use .png, .jpg, .jpeg or .svg", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A pixel buffer of the requested size could not be allocated.
    #[error("failed to allocate a {width}x{height} pixel buffer")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The generated SVG could not be parsed for rasterization.
    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] usvg::Error),

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Png(String),

    /// JPEG encoding failed.
    #[error("failed to encode JPEG: {0}")]
    Jpeg(#[from] image::ImageError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A network file could not be (de)serialized.
    #[error("invalid network file: {0}")]
    Json(#[from] serde_json::Error),

    /// The print sink rejected the page.
    #[error("printing failed: {0}")]
    Print(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiagramError>;
