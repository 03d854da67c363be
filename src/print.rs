//! Single-page print jobs.
//!
//! A [`PrintJob`] renders the whole document onto one full-scale page of a
//! named page layout and hands the raster to a [`PrintSink`]. The job works on
//! an isolated engine so the interactive session is never disturbed.

use crate::engine::DiagramEngine;
use crate::error::{DiagramError, Result};
use crate::render::{rasterize, RenderTarget, Surface, SvgSurface, TextMeasure};
use crate::types::PageLayout;
use eframe::egui;
use std::path::{Path, PathBuf};

/// Receives rendered pages; implemented by the host printer integration.
pub trait PrintSink {
    /// Called once before the first page.
    fn begin_job(&mut self, _layout: &PageLayout) -> Result<()> {
        Ok(())
    }

    /// Delivers one rendered page covering the whole sheet.
    fn print_page(&mut self, page: &tiny_skia::Pixmap, layout: &PageLayout) -> Result<()>;

    /// Called once after the last page.
    fn end_job(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes the printed page to a PNG file.
#[derive(Debug, Clone)]
pub struct PngFileSink {
    path: PathBuf,
    pages: usize,
}

impl PngFileSink {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: 0,
        }
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages written so far.
    pub fn pages_written(&self) -> usize {
        self.pages
    }
}

impl PrintSink for PngFileSink {
    fn print_page(&mut self, page: &tiny_skia::Pixmap, _layout: &PageLayout) -> Result<()> {
        let bytes = page
            .encode_png()
            .map_err(|e| DiagramError::Png(e.to_string()))?;
        std::fs::write(&self.path, bytes)?;
        self.pages += 1;
        Ok(())
    }
}

/// A print job for exactly one page.
#[derive(Debug)]
pub struct PrintJob {
    engine: DiagramEngine,
    dpi: f32,
    render_calls: usize,
}

impl PrintJob {
    /// Prepares a job printing `source` on the layout named `layout`.
    ///
    /// # Errors
    ///
    /// [`DiagramError::LayoutNotFound`] if the network defines no such layout.
    pub fn new(source: &DiagramEngine, layout: &str) -> Result<Self> {
        let mut engine = source.for_printing();
        engine.set_layout(layout)?;
        let dpi = engine.settings().print_dpi;
        Ok(Self {
            engine,
            dpi,
            render_calls: 0,
        })
    }

    /// Overrides the print resolution.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        if dpi > 0.0 {
            self.dpi = dpi;
        }
        self
    }

    /// The page layout being printed.
    pub fn layout(&self) -> &PageLayout {
        self.engine.layout()
    }

    /// Always one: the document is scaled to fit a single sheet.
    pub fn page_count(&self) -> usize {
        1
    }

    /// Sheet size in pixels at the job resolution.
    pub fn page_size(&self) -> (u32, u32) {
        let medium = self.layout().medium();
        let dpi = self.dpi as f64;
        (
            (medium.width_in * dpi).round().max(1.0) as u32,
            (medium.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Renders page `page_index` of the job.
    ///
    /// # Returns
    ///
    /// `None` for any page other than the first, and for repeated requests of
    /// the first page within one job.
    pub fn render_page(
        &mut self,
        page_index: usize,
        measure: &dyn TextMeasure,
    ) -> Result<Option<tiny_skia::Pixmap>> {
        if page_index >= self.page_count() {
            return Ok(None);
        }
        self.render_calls += 1;
        if self.render_calls > 1 {
            log::debug!("page already rendered ({} requests)", self.render_calls);
            return Ok(None);
        }

        let (width, height) = self.page_size();
        let page = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(width as f32, height as f32));
        let margin = (self.layout().margin_in.max(0.0) * self.dpi as f64) as f32;
        let printable = page.shrink(margin);
        let target = RenderTarget::full_print(printable, self.dpi);

        let mut surface = SvgSurface::new(width, height, measure, target.antialias);
        surface.fill_rect(page, egui::Color32::WHITE);
        self.engine.render(&mut surface, &target);
        let pixmap = rasterize(&surface.finish(), width, height)?;
        Ok(Some(pixmap))
    }

    /// Runs the job against `sink`.
    ///
    /// # Errors
    ///
    /// Rasterization failures and anything the sink reports.
    pub fn run(&mut self, sink: &mut dyn PrintSink, measure: &dyn TextMeasure) -> Result<()> {
        self.render_calls = 0;
        let layout = self.layout().clone();
        log::info!(
            "printing on \"{}\" ({:?} {:?}) at {} dpi",
            layout.name,
            layout.paper,
            layout.orientation,
            self.dpi
        );
        sink.begin_job(&layout)?;
        if let Some(page) = self.render_page(0, measure)? {
            sink.print_page(&page, &layout)?;
        }
        sink.end_job()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::DataPoint;
    use crate::network::StreamNetwork;
    use crate::render::EstimatedMetrics;
    use crate::settings::EngineSettings;
    use crate::types::{Node, NodeCategory};

    fn engine() -> DiagramEngine {
        let net = StreamNetwork::new(
            vec![Node::new("A", NodeCategory::Reservoir, DataPoint::new(10.0, 10.0))],
            vec![],
        );
        DiagramEngine::new(Box::new(net), EngineSettings::default()).unwrap()
    }

    #[derive(Default)]
    struct CountingSink {
        begun: usize,
        pages: Vec<(u32, u32)>,
        ended: usize,
    }

    impl PrintSink for CountingSink {
        fn begin_job(&mut self, _layout: &PageLayout) -> Result<()> {
            self.begun += 1;
            Ok(())
        }

        fn print_page(&mut self, page: &tiny_skia::Pixmap, _layout: &PageLayout) -> Result<()> {
            self.pages.push((page.width(), page.height()));
            Ok(())
        }

        fn end_job(&mut self) -> Result<()> {
            self.ended += 1;
            Ok(())
        }
    }

    #[test]
    fn only_the_first_page_renders_once_per_job() {
        let mut job = PrintJob::new(&engine(), "Default").unwrap().with_dpi(10.0);
        assert!(job.render_page(1, &EstimatedMetrics).unwrap().is_none());
        assert!(job.render_page(0, &EstimatedMetrics).unwrap().is_some());
        assert!(job.render_page(0, &EstimatedMetrics).unwrap().is_none());
    }

    #[test]
    fn each_run_delivers_one_page() {
        let mut job = PrintJob::new(&engine(), "Default").unwrap().with_dpi(10.0);
        let mut sink = CountingSink::default();
        job.run(&mut sink, &EstimatedMetrics).unwrap();
        job.run(&mut sink, &EstimatedMetrics).unwrap();
        assert_eq!((sink.begun, sink.ended), (2, 2));
        // Ledger landscape at 10 dpi
        assert_eq!(sink.pages, vec![(170, 110), (170, 110)]);
    }

    #[test]
    fn missing_layout_is_reported() {
        let err = PrintJob::new(&engine(), "Poster").unwrap_err();
        assert!(matches!(err, DiagramError::LayoutNotFound(_)));
    }

    #[test]
    fn printing_leaves_the_source_untouched() {
        let mut source = engine();
        source.select_node("A");
        let mut job = PrintJob::new(&source, "Default").unwrap().with_dpi(10.0);
        job.run(&mut CountingSink::default(), &EstimatedMetrics).unwrap();
        assert!(source.model().node_by_id("A").unwrap().selected);
        assert!(source.drag_state().is_idle());
    }

    #[test]
    fn png_sink_writes_the_page() {
        let path = std::env::temp_dir().join(format!("network_diagram_print_{}.png", std::process::id()));
        let mut sink = PngFileSink::new(&path);
        let mut job = PrintJob::new(&engine(), "Default").unwrap().with_dpi(10.0);
        job.run(&mut sink, &EstimatedMetrics).unwrap();
        assert_eq!(sink.pages_written(), 1);
        let bytes = std::fs::read(sink.path()).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let _ = std::fs::remove_file(&path);
    }
}
