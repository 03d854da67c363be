//! Raster export of the whole document.
//!
//! The diagram is drawn onto an [`SvgSurface`] through the shared render
//! pipeline, rasterized with resvg and encoded according to the file
//! extension. Export always runs on an isolated copy of the engine.

use crate::engine::DiagramEngine;
use crate::error::{DiagramError, Result};
use crate::render::{rasterize, RenderTarget, SvgSurface, TextMeasure};
use eframe::egui;
use std::path::Path;

/// JPEG quality used for `.jpg`/`.jpeg` exports.
const JPEG_QUALITY: u8 = 90;

/// Output format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG, written without alpha
    Jpeg,
    /// The intermediate SVG document, written as-is
    Svg,
}

impl ImageFormat {
    /// Picks the format for `path` from its (case-insensitive) extension.
    ///
    /// # Errors
    ///
    /// [`DiagramError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            Some("svg") => Ok(ImageFormat::Svg),
            _ => Err(DiagramError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Extension used when suggesting a file name.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Pixel size of the export canvas: the printable area at the export DPI.
pub fn export_size(engine: &DiagramEngine) -> (u32, u32) {
    let printable = engine.layout().printable();
    let dpi = engine.settings().export_dpi as f64;
    (
        (printable.width_in * dpi).round().max(1.0) as u32,
        (printable.height_in * dpi).round().max(1.0) as u32,
    )
}

/// Draws the whole document as an SVG string at export resolution.
pub fn render_svg(engine: &DiagramEngine, measure: &dyn TextMeasure) -> String {
    let mut copy = engine.for_printing();
    let (width, height) = export_size(&copy);
    let device = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(width as f32, height as f32));
    let target = RenderTarget::raster_export(device, copy.settings().export_dpi);

    let mut surface = SvgSurface::new(width, height, measure, target.antialias);
    copy.render(&mut surface, &target);
    surface.finish()
}

/// Renders the whole document and writes it to `path`.
///
/// # Arguments
///
/// * `engine` - Source engine; it is not modified
/// * `path` - Output file; the extension selects the format
/// * `measure` - Text metrics used to lay out labels and the legend
///
/// # Errors
///
/// Unsupported extension, rasterization, encoding or I/O failures.
pub fn export_image(engine: &DiagramEngine, path: &Path, measure: &dyn TextMeasure) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let svg = render_svg(engine, measure);
    let bytes = match format {
        ImageFormat::Svg => svg.into_bytes(),
        ImageFormat::Png | ImageFormat::Jpeg => {
            let (width, height) = export_size(engine);
            let pixmap = rasterize(&svg, width, height)?;
            encode(&pixmap, format)?
        }
    };
    std::fs::write(path, bytes)?;
    log::info!("exported {} to {}", format.extension(), path.display());
    Ok(())
}

/// Encodes a rendered pixmap as PNG or JPEG.
pub(crate) fn encode(pixmap: &tiny_skia::Pixmap, format: ImageFormat) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Png => pixmap
            .encode_png()
            .map_err(|e| DiagramError::Png(e.to_string())),
        ImageFormat::Jpeg => {
            let rgb: Vec<u8> = pixmap
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue()]
                })
                .collect();
            let mut out = Vec::new();
            {
                let mut encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
                encoder.encode(
                    &rgb,
                    pixmap.width(),
                    pixmap.height(),
                    image::ExtendedColorType::Rgb8,
                )?;
            }
            Ok(out)
        }
        ImageFormat::Svg => Err(DiagramError::Png(
            "an SVG document is not a raster format".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a.PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a.jpeg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.jpg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.svg")).unwrap(), ImageFormat::Svg);
        let err = ImageFormat::from_path(Path::new("a.gif")).unwrap_err();
        assert!(matches!(err, DiagramError::UnsupportedFormat(p) if p == PathBuf::from("a.gif")));
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn jpeg_has_magic_bytes() {
        let mut pixmap = tiny_skia::Pixmap::new(8, 8).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        let bytes = encode(&pixmap, ImageFormat::Jpeg).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let png = encode(&pixmap, ImageFormat::Png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn export_writes_each_format() {
        use crate::render::EstimatedMetrics;
        use crate::samples::{build_sample, SampleKind};
        use crate::settings::EngineSettings;

        let mut settings = EngineSettings::default();
        settings.export_dpi = 12.0;
        let engine =
            DiagramEngine::new(Box::new(build_sample(SampleKind::Confluence)), settings).unwrap();
        assert_eq!(export_size(&engine), (186, 114));

        let dir = std::env::temp_dir().join(format!("network_diagram_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, magic) in [("d.png", &b"\x89PNG"[..]), ("d.jpg", &[0xFF, 0xD8][..]), ("d.svg", &b"<svg"[..])] {
            let path = dir.join(name);
            export_image(&engine, &path, &EstimatedMetrics).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(magic), "{name}");
        }

        let err = export_image(&engine, &dir.join("d.bmp"), &EstimatedMetrics).unwrap_err();
        assert!(matches!(err, DiagramError::UnsupportedFormat(_)));
        assert!(!dir.join("d.bmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
