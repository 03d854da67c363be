//! Built-in sample networks that can be loaded from the UI.
//!
//! They give new users something to pan, zoom and drag before opening a real
//! network file, and double as fixtures for the integration tests.

use crate::coords::{Buffer, DataPoint};
use crate::network::StreamNetwork;
use crate::types::{
    Annotation, ArrowStyle, Link, LineStyle, Node, NodeCategory, Orientation, PageLayout, PaperSize,
    TextPosition,
};

/// Kinds of built-in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// A single reach from headwater gage to the end of the network
    SingleReach,
    /// Two tributaries meeting at a confluence, with a reservoir and wells
    Confluence,
}

/// Metadata for a single sample.
pub struct SampleInfo {
    /// Stable identifier
    pub kind: SampleKind,
    /// Display name
    pub name: &'static str,
}

/// Returns all samples with their display names.
pub const fn all_samples() -> &'static [SampleInfo] {
    const SAMPLES: &[SampleInfo] = &[
        SampleInfo {
            kind: SampleKind::SingleReach,
            name: "Single Reach",
        },
        SampleInfo {
            kind: SampleKind::Confluence,
            name: "Two Tributaries and a Confluence",
        },
    ];
    SAMPLES
}

/// Builds the network for the given sample.
pub fn build_sample(kind: SampleKind) -> StreamNetwork {
    match kind {
        SampleKind::SingleReach => build_single_reach(),
        SampleKind::Confluence => build_confluence(),
    }
}

fn layouts() -> Vec<PageLayout> {
    vec![
        PageLayout::default(),
        PageLayout {
            name: "Letter Portrait".to_string(),
            paper: PaperSize::Letter,
            orientation: Orientation::Portrait,
            margin_in: 0.5,
            node_size_pt: 14.0,
            font_size_pt: 8.0,
        },
        PageLayout {
            name: "Plot D".to_string(),
            paper: PaperSize::D,
            orientation: Orientation::Landscape,
            margin_in: 1.0,
            node_size_pt: 24.0,
            font_size_pt: 12.0,
        },
    ]
}

fn build_single_reach() -> StreamNetwork {
    let nodes = vec![
        Node::new("09010500", NodeCategory::StreamGage, DataPoint::new(100.0, 500.0))
            .with_name("Headwater gage")
            .with_downstream("3600501"),
        Node::new("3600501", NodeCategory::Diversion, DataPoint::new(250.0, 450.0))
            .with_name("Upper ditch")
            .with_downstream("3600642"),
        Node::new("3600642", NodeCategory::InstreamFlow, DataPoint::new(400.0, 400.0))
            .with_name("Minimum flow reach")
            .with_downstream("END"),
        Node::new("END", NodeCategory::EndOfNetwork, DataPoint::new(550.0, 350.0)),
    ];
    let mut net = StreamNetwork::new(nodes, vec![]);
    net.nodes[0].natural_flow = true;
    net.legend.anchor = DataPoint::new(450.0, 450.0);
    net.layouts = layouts();
    net.edge_buffer = Buffer::uniform(40.0);
    net.annotations.push(Annotation::new(
        "Upper Basin",
        DataPoint::new(120.0, 560.0),
        TextPosition::UpperRight,
    ));
    net
}

fn build_confluence() -> StreamNetwork {
    let nodes = vec![
        // North fork
        Node::new("09110000", NodeCategory::StreamGage, DataPoint::new(100.0, 800.0))
            .with_downstream("3800507"),
        Node::new("3800507", NodeCategory::Diversion, DataPoint::new(220.0, 700.0))
            .with_downstream("3803713"),
        Node::new("3803713", NodeCategory::Reservoir, DataPoint::new(340.0, 600.0))
            .with_downstream("CONF"),
        // South fork
        Node::new("09112500", NodeCategory::StreamGage, DataPoint::new(100.0, 200.0))
            .with_downstream("3800891"),
        Node::new("3800891", NodeCategory::Well, DataPoint::new(220.0, 300.0))
            .with_downstream("3800920"),
        Node::new("3800920", NodeCategory::Plan, DataPoint::new(340.0, 400.0))
            .with_downstream("CONF"),
        // Main stem
        Node::new("CONF", NodeCategory::Other, DataPoint::new(480.0, 500.0))
            .with_name("Confluence")
            .with_downstream("09114500"),
        Node::new("09114500", NodeCategory::StreamGage, DataPoint::new(640.0, 500.0))
            .with_downstream("END"),
        Node::new("END", NodeCategory::EndOfNetwork, DataPoint::new(800.0, 500.0)),
    ];
    let links = vec![
        Link::new("3803713", "3800920"),
        Link {
            line_style: LineStyle::Dashed,
            from_arrow: ArrowStyle::Open,
            to_arrow: ArrowStyle::Open,
            ..Link::new("3800507", "3800891")
        },
    ];
    let mut net = StreamNetwork::new(nodes, links);
    net.nodes[0].natural_flow = true;
    net.nodes[3].natural_flow = true;
    net.legend.anchor = DataPoint::new(600.0, 650.0);
    net.layouts = layouts();
    net.edge_buffer = Buffer::uniform(60.0);
    net.annotations.extend([
        Annotation::new("North Fork", DataPoint::new(160.0, 780.0), TextPosition::UpperRight),
        Annotation::new("South Fork", DataPoint::new(160.0, 220.0), TextPosition::LowerRight),
        Annotation::new("Main Stem", DataPoint::new(640.0, 470.0), TextPosition::Below),
    ]);
    net
}
