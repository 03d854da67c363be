//! Shared engine-wide constants.
//! Centralizes tweakable values used across rendering, zooming and interaction.

// Zoom
/// Largest allowed ratio of visible extents to full document extents (zoomed out).
pub const MAX_VIEW_TO_DOCUMENT_RATIO: f64 = 17.0;
/// Smallest allowed ratio of visible extents to full document extents (zoomed in).
pub const MIN_VIEW_TO_DOCUMENT_RATIO: f64 = 1.0 / 9.0;
/// Zoom percentage at which anti-aliasing is switched back on.
pub const ANTIALIAS_ZOOM_PERCENT: f64 = 100.0;

// Resolution
/// Points per inch, used to convert configured font and icon sizes.
pub const POINTS_PER_INCH: f64 = 72.0;
/// Logical DPI of the interactive canvas (egui points).
pub const SCREEN_DPI: f32 = 96.0;
/// Default DPI for the print target.
pub const PRINT_DPI: f32 = 150.0;
/// Default DPI for raster export.
pub const EXPORT_DPI: f32 = 96.0;

// Default layout
/// Node icon diameter in points when no page layout specifies one.
pub const DEFAULT_NODE_SIZE_PT: f64 = 20.0;
/// Label font size in points when no page layout specifies one.
pub const DEFAULT_FONT_SIZE_PT: f64 = 10.0;
/// Page margin in inches when no page layout specifies one.
pub const DEFAULT_MARGIN_IN: f64 = 0.75;

// Grid/drawing
/// Grid cell size in data units.
pub const GRID_SPACING: f64 = 20.0;
/// Grid lines closer than this many device pixels are not drawn.
pub const MIN_GRID_PIXELS: f32 = 4.0;
/// Base line thickness in points for network lines and links.
pub const BASE_LINE_PT: f64 = 1.0;
/// Smallest font size (toolkit units) that is still drawn.
pub const MIN_FONT_SIZE: f32 = 2.0;

// Legend
/// Padding around legend content, as a fraction of the icon diameter.
pub const LEGEND_PADDING_FRACTION: f32 = 0.5;
/// Row height as a multiple of the larger of icon diameter and font size.
pub const LEGEND_ROW_SPACING: f32 = 1.4;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;
