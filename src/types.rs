//! Core data types for the network diagram.
//!
//! This module defines the entities the diagram draws and edits: stations
//! (nodes), links, free-form annotations, the legend and named page layouts.

use crate::constants;
use crate::coords::{DataPoint, DataRect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for links.
pub type LinkId = Uuid;

/// Station category. Drives icon shape, legend content and traversal filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum NodeCategory {
    /// Diversion structure
    Diversion,
    /// Instream flow reach
    InstreamFlow,
    /// Reservoir
    Reservoir,
    /// Stream gage or stream estimate station
    StreamGage,
    /// Well
    Well,
    /// End of the network
    EndOfNetwork,
    /// Operational plan
    Plan,
    /// Other node, also used for stream confluences
    Other,
    /// Placeholder with no known type
    #[default]
    Unknown,
}

/// Outline geometry of a node icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconShape {
    /// Circle
    Circle,
    /// Axis-aligned square
    Square,
    /// Upward pointing triangle
    Triangle,
    /// Square rotated by 45 degrees
    Diamond,
    /// Circle with an inscribed X
    CircleCross,
    /// Circle drawn at half the diameter
    Dot,
}

/// How a node category is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconStyle {
    /// Outline geometry
    pub shape: IconShape,
    /// Whether the outline is filled
    pub filled: bool,
}

impl NodeCategory {
    /// Categories shown in the legend, in legend order.
    pub const LEGEND: [NodeCategory; 8] = [
        NodeCategory::StreamGage,
        NodeCategory::Diversion,
        NodeCategory::InstreamFlow,
        NodeCategory::Reservoir,
        NodeCategory::Well,
        NodeCategory::Plan,
        NodeCategory::Other,
        NodeCategory::EndOfNetwork,
    ];

    /// Icon style for this category.
    pub fn icon(self) -> IconStyle {
        let (shape, filled) = match self {
            NodeCategory::Diversion => (IconShape::Circle, false),
            NodeCategory::InstreamFlow => (IconShape::Square, false),
            NodeCategory::Reservoir => (IconShape::Triangle, true),
            NodeCategory::StreamGage => (IconShape::Circle, true),
            NodeCategory::Well => (IconShape::Diamond, false),
            NodeCategory::EndOfNetwork => (IconShape::CircleCross, false),
            NodeCategory::Plan => (IconShape::Square, true),
            NodeCategory::Other => (IconShape::Dot, true),
            NodeCategory::Unknown => (IconShape::Dot, false),
        };
        IconStyle { shape, filled }
    }

    /// Human readable label used by the legend.
    pub fn label(self) -> &'static str {
        match self {
            NodeCategory::Diversion => "Diversion",
            NodeCategory::InstreamFlow => "Instream Flow",
            NodeCategory::Reservoir => "Reservoir",
            NodeCategory::StreamGage => "Stream Gage/Estimate",
            NodeCategory::Well => "Well",
            NodeCategory::EndOfNetwork => "End of Network",
            NodeCategory::Plan => "Plan",
            NodeCategory::Other => "Other/Confluence",
            NodeCategory::Unknown => "Unknown",
        }
    }

    /// Whether nodes of this category mark a convergence of flow paths.
    pub fn is_convergence(self) -> bool {
        matches!(self, NodeCategory::Other)
    }
}

/// Nine anchor positions for text relative to a point.
///
/// The name says where the text sits relative to the anchor: `UpperRight` text
/// starts at the anchor and extends up and to the right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TextPosition {
    /// Centered on the anchor
    #[default]
    Center,
    /// Above the anchor, horizontally centered
    Above,
    /// Below the anchor, horizontally centered
    Below,
    /// Left of the anchor, vertically centered
    Left,
    /// Right of the anchor, vertically centered
    Right,
    /// Above and left of the anchor
    UpperLeft,
    /// Above and right of the anchor
    UpperRight,
    /// Below and left of the anchor
    LowerLeft,
    /// Below and right of the anchor
    LowerRight,
}

impl TextPosition {
    /// All positions.
    pub const ALL: [TextPosition; 9] = [
        TextPosition::Center,
        TextPosition::Above,
        TextPosition::Below,
        TextPosition::Left,
        TextPosition::Right,
        TextPosition::UpperLeft,
        TextPosition::UpperRight,
        TextPosition::LowerLeft,
        TextPosition::LowerRight,
    ];

    /// Bounding box of text of `width`×`height` data units placed at `anchor`,
    /// separated from it by `gap` on the offset axes.
    pub fn text_box(self, anchor: DataPoint, width: f64, height: f64, gap: f64) -> DataRect {
        // Horizontal placement: -1 left of the anchor, 0 centered, 1 right of it.
        let (hx, vy) = match self {
            TextPosition::Center => (0, 0),
            TextPosition::Above => (0, 1),
            TextPosition::Below => (0, -1),
            TextPosition::Left => (-1, 0),
            TextPosition::Right => (1, 0),
            TextPosition::UpperLeft => (-1, 1),
            TextPosition::UpperRight => (1, 1),
            TextPosition::LowerLeft => (-1, -1),
            TextPosition::LowerRight => (1, -1),
        };
        let min_x = match hx {
            -1 => anchor.x - gap - width,
            0 => anchor.x - width / 2.0,
            _ => anchor.x + gap,
        };
        let min_y = match vy {
            -1 => anchor.y - gap - height,
            0 => anchor.y - height / 2.0,
            _ => anchor.y + gap,
        };
        DataRect::new(min_x, min_y, min_x + width, min_y + height)
    }
}

/// Font weight/slant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FontStyle {
    /// Regular
    #[default]
    Plain,
    /// Bold
    Bold,
    /// Italic
    Italic,
    /// Bold italic
    BoldItalic,
}

/// Font descriptor for annotations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontSpec {
    /// Family name, e.g. "Arial"
    pub name: String,
    /// Weight/slant
    pub style: FontStyle,
    /// Size in points at full scale
    pub size_pt: f64,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Arial".to_string(),
            style: FontStyle::Plain,
            size_pt: constants::DEFAULT_FONT_SIZE_PT,
        }
    }
}

/// A station in the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier (made unique on load)
    pub id: String,
    /// Descriptive name
    #[serde(default)]
    pub name: String,
    /// Station category
    #[serde(default)]
    pub category: NodeCategory,
    /// Position in data units
    pub position: DataPoint,
    /// Id of the next node downstream, if any
    #[serde(default)]
    pub downstream: Option<String>,
    /// Where the id label is drawn relative to the icon
    #[serde(default = "default_label_position")]
    pub label_position: TextPosition,
    /// Whether the station carries natural (baseflow) data
    #[serde(default)]
    pub natural_flow: bool,
    /// Icon diameter in data units, derived from the current layout and scale
    #[serde(skip)]
    pub icon_diameter: f64,
    /// Whether the node is part of the current selection
    #[serde(skip)]
    pub selected: bool,
    /// Whether the node was moved since the network was loaded or saved
    #[serde(skip)]
    pub dirty: bool,
}

fn default_label_position() -> TextPosition {
    TextPosition::LowerRight
}

impl Node {
    /// Creates a node with no downstream neighbour.
    pub fn new(id: impl Into<String>, category: NodeCategory, position: DataPoint) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
            position,
            downstream: None,
            label_position: default_label_position(),
            natural_flow: false,
            icon_diameter: 0.0,
            selected: false,
            dirty: false,
        }
    }

    /// Sets the downstream node id.
    pub fn with_downstream(mut self, id: impl Into<String>) -> Self {
        self.downstream = Some(id.into());
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether `p` falls within the node's icon.
    pub fn contains(&self, p: DataPoint) -> bool {
        self.position.distance(p) <= self.icon_diameter / 2.0
    }
}

/// Stroke pattern of a link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous line
    #[default]
    Solid,
    /// Dashed line
    Dashed,
}

/// Arrowhead drawn at a link end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ArrowStyle {
    /// No arrowhead
    #[default]
    None,
    /// Two open strokes
    Open,
    /// Filled triangle
    Filled,
}

/// A connection drawn between two nodes, independent of the downstream chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: LinkId,
    /// Id of the start node
    pub from: String,
    /// Id of the end node
    pub to: String,
    /// Stroke pattern
    #[serde(default)]
    pub line_style: LineStyle,
    /// Arrowhead at the start node
    #[serde(default)]
    pub from_arrow: ArrowStyle,
    /// Arrowhead at the end node
    #[serde(default)]
    pub to_arrow: ArrowStyle,
}

impl Link {
    /// Creates a solid link with an arrow pointing at `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.into(),
            to: to.into(),
            line_style: LineStyle::Solid,
            from_arrow: ArrowStyle::None,
            to_arrow: ArrowStyle::Filled,
        }
    }
}

/// Free text placed on the diagram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Text, possibly spanning several lines
    pub text: String,
    /// Anchor point in data units
    pub anchor: DataPoint,
    /// Placement of the text relative to the anchor
    #[serde(default)]
    pub position: TextPosition,
    /// Font
    #[serde(default)]
    pub font: FontSpec,
    /// Text bounds in data units at the most recently rendered scale
    #[serde(skip)]
    pub bounds: Option<DataRect>,
    /// Whether the annotation is selected
    #[serde(skip)]
    pub selected: bool,
    /// Whether the annotation was moved since load
    #[serde(skip)]
    pub dirty: bool,
}

impl Annotation {
    /// Creates an annotation with the default font.
    pub fn new(text: impl Into<String>, anchor: DataPoint, position: TextPosition) -> Self {
        Self {
            text: text.into(),
            anchor,
            position,
            font: FontSpec::default(),
            bounds: None,
            selected: false,
            dirty: false,
        }
    }

    /// Whether `p` falls within the last computed text bounds.
    pub fn contains(&self, p: DataPoint) -> bool {
        self.bounds.is_some_and(|b| b.contains(p))
    }
}

/// The legend block. Only its anchor is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Legend {
    /// Bottom-left corner in data units
    pub anchor: DataPoint,
    /// Legend extent in data units at the most recently rendered scale
    #[serde(skip)]
    pub bounds: Option<DataRect>,
    /// Whether the legend was moved since load
    #[serde(skip)]
    pub dirty: bool,
}

impl Legend {
    /// Whether `p` falls within the last computed legend bounds.
    pub fn contains(&self, p: DataPoint) -> bool {
        self.bounds.is_some_and(|b| b.contains(p))
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaperSize {
    /// 8.5 x 11 in
    #[default]
    Letter,
    /// 8.5 x 14 in
    Legal,
    /// 11 x 17 in
    Ledger,
    /// 17 x 22 in
    C,
    /// 22 x 34 in
    D,
    /// 34 x 44 in
    E,
    /// 210 x 297 mm
    A4,
    /// 297 x 420 mm
    A3,
}

impl PaperSize {
    /// Portrait width and height in inches.
    pub fn inches(self) -> (f64, f64) {
        match self {
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::Ledger => (11.0, 17.0),
            PaperSize::C => (17.0, 22.0),
            PaperSize::D => (22.0, 34.0),
            PaperSize::E => (34.0, 44.0),
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::A3 => (11.69, 16.54),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Long edge vertical
    Portrait,
    /// Long edge horizontal
    #[default]
    Landscape,
}

/// Size of a physical medium in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Medium {
    /// Width in inches
    pub width_in: f64,
    /// Height in inches
    pub height_in: f64,
}

impl Medium {
    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.width_in / self.height_in
    }
}

/// Named page layout preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageLayout {
    /// Preset name used for lookups
    pub name: String,
    /// Paper size
    pub paper: PaperSize,
    /// Orientation
    pub orientation: Orientation,
    /// Uniform margin on all four sides, in inches
    pub margin_in: f64,
    /// Node icon diameter in points at full scale
    pub node_size_pt: f64,
    /// Node label font size in points at full scale
    pub font_size_pt: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            paper: PaperSize::Ledger,
            orientation: Orientation::Landscape,
            margin_in: constants::DEFAULT_MARGIN_IN,
            node_size_pt: constants::DEFAULT_NODE_SIZE_PT,
            font_size_pt: constants::DEFAULT_FONT_SIZE_PT,
        }
    }
}

impl PageLayout {
    /// The whole sheet, oriented.
    pub fn medium(&self) -> Medium {
        let (w, h) = self.paper.inches();
        let (width_in, height_in) = match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        };
        Medium { width_in, height_in }
    }

    /// The sheet minus the margin on every side.
    pub fn printable(&self) -> Medium {
        let m = self.medium();
        let margin = self.margin_in.max(0.0);
        Medium {
            width_in: (m.width_in - 2.0 * margin).max(0.1),
            height_in: (m.height_in - 2.0 * margin).max(0.1),
        }
    }
}
