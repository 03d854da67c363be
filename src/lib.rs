//! # Network Diagram
//!
//! An interactive editor for river network diagrams: nodes placed in data
//! coordinates, links between them, text annotations and a legend, laid out on
//! a printable page.
//!
//! One render pipeline draws to three targets:
//! - **Interactive**: the egui canvas, with zoom, pan and drag editing
//! - **Print**: a page of a chosen layout, rasterized at the print resolution
//! - **Raster export**: the whole document as PNG, JPEG or SVG
//!
//! ## Features
//! - Select, group-drag and rubber-band editing with snap-to-grid
//! - Undo and redo of node, legend and annotation moves
//! - Power-of-two zoom between fit-to-page and actual printed size
//! - Page layouts with paper size, orientation and margins

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod coords;
pub mod diagram;
pub mod engine;
pub mod error;
pub mod export;
pub mod interaction;
pub mod network;
pub mod print;
pub mod render;
pub mod samples;
pub mod settings;
pub mod types;
pub mod ui;
pub mod undo;
pub mod zoom;

pub use engine::DiagramEngine;
pub use error::{DiagramError, Result};
pub use export::{export_image, render_svg, ImageFormat};
pub use network::{NetworkModel, StreamNetwork};
pub use print::{PngFileSink, PrintJob, PrintSink};
pub use render::{EstimatedMetrics, TextMeasure};
pub use settings::{EngineSettings, Session};
pub use types::*;

use samples::{build_sample, SampleKind};
use std::path::PathBuf;
use ui::DiagramApp;

/// Reads the network at `path`, falling back to the bundled confluence sample
/// when no path is given or the file cannot be read.
fn initial_network(path: Option<PathBuf>) -> (StreamNetwork, Option<PathBuf>) {
    let Some(path) = path else {
        return (build_sample(SampleKind::Confluence), None);
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(DiagramError::from)
        .and_then(|json| StreamNetwork::from_json(&json));
    match loaded {
        Ok(network) => {
            log::info!("Loaded network from {}", path.display());
            (network, Some(path))
        }
        Err(e) => {
            log::error!("Failed to open {}: {e}", path.display());
            (build_sample(SampleKind::Confluence), None)
        }
    }
}

/// Builds the app, retrying with the bundled sample if `network` is unusable.
fn build_app(
    network: StreamNetwork,
    path: Option<PathBuf>,
    storage: Option<&dyn eframe::Storage>,
) -> std::result::Result<DiagramApp, DiagramError> {
    let (settings, mut session) = DiagramApp::restore(storage);
    if let Some(path) = &path {
        session.open_file(path);
    }
    match DiagramApp::new(network, settings.clone(), session.clone()) {
        Ok(app) => Ok(app),
        Err(e) => {
            log::error!("Cannot display network: {e}");
            session.current_file = None;
            DiagramApp::new(build_sample(SampleKind::Confluence), settings, session)
        }
    }
}

/// Runs the network diagram editor.
///
/// This function initializes the egui application window and starts the main
/// event loop. Dialogs are spawned on the ambient tokio runtime, so the caller
/// must have entered one.
///
/// # Arguments
///
/// * `initial` - Network file to open at startup
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use network_diagram::run_app;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let runtime = tokio::runtime::Runtime::new()?;
///     let _guard = runtime.enter();
///     run_app(None)?;
///     Ok(())
/// }
/// ```
pub fn run_app(initial: Option<PathBuf>) -> std::result::Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Network Diagram")
            .with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    let (network, path) = initial_network(initial);
    eframe::run_native(
        "Network Diagram",
        options,
        Box::new(move |cc| {
            // Cmd+Plus, Cmd+Minus and Cmd+0 zoom the diagram, not the UI.
            cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);
            let app = build_app(network, path, cc.storage)?;
            Ok(Box::new(app))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_sample() {
        let path = std::env::temp_dir().join("network_diagram_missing_file.json");
        let (network, opened) = initial_network(Some(path));
        assert!(opened.is_none());
        assert!(network.nodes().iter().any(|n| n.id == "3803713"));
    }

    #[test]
    fn test_build_app_opens_given_path() {
        let path = PathBuf::from("/data/reach.json");
        let app = build_app(
            build_sample(SampleKind::SingleReach),
            Some(path.clone()),
            None,
        )
        .unwrap();
        assert_eq!(app.session.current_file, Some(path));
        assert!(!app.engine.is_dirty());
    }
}
