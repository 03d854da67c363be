use super::*;
use crate::coords::DataPoint;
use crate::interaction::InteractionMode;
use crate::network::StreamNetwork;
use crate::render::testing::{Op, RecordingSurface};
use crate::render::LineDash;
use crate::types::{Annotation, Link, Node, NodeCategory, TextPosition};

fn network() -> StreamNetwork {
    let mut net = StreamNetwork::new(
        vec![
            Node::new("A", NodeCategory::Diversion, DataPoint::new(100.0, 100.0)),
            Node::new("B", NodeCategory::Diversion, DataPoint::new(130.0, 170.0)),
            Node::new("C", NodeCategory::Well, DataPoint::new(300.0, 300.0)),
        ],
        vec![],
    );
    net.bounds = Some(DataRect::new(0.0, 0.0, 1000.0, 1000.0));
    net.legend.anchor = DataPoint::new(600.0, 100.0);
    net
}

fn engine_with(net: StreamNetwork) -> DiagramEngine {
    DiagramEngine::new(Box::new(net), EngineSettings::default()).unwrap()
}

fn at(engine: &DiagramEngine, p: DataPoint) -> egui::Pos2 {
    engine.transform().data_to_device(p)
}

fn position(engine: &DiagramEngine, id: &str) -> DataPoint {
    engine.model().node_by_id(id).unwrap().position
}

fn drag(engine: &mut DiagramEngine, from: DataPoint, to: DataPoint) {
    let (a, b) = (at(engine, from), at(engine, to));
    engine.pointer_down(a, egui::Modifiers::NONE);
    engine.pointer_move(b);
    engine.pointer_up(b);
}

fn frame(engine: &mut DiagramEngine) -> RecordingSurface {
    let mut surface = RecordingSurface::default();
    let target = engine.interactive_target(1.0);
    engine.render(&mut surface, &target);
    surface
}

#[test]
fn click_selects_without_recording() {
    let mut engine = engine_with(network());
    let p = at(&engine, position(&engine, "A"));
    engine.pointer_down(p, egui::Modifiers::NONE);
    engine.pointer_up(p);
    assert!(engine.model().node_by_id("A").unwrap().selected);
    assert_eq!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
    assert!(engine.history().is_empty());
    assert!(engine.drag_state().is_idle());
}

#[test]
fn group_drag_keeps_formation_with_snap() {
    let mut engine = engine_with(network());
    engine.settings_mut().snap_to_grid = true;
    engine.select_node("A");
    let b = at(&engine, position(&engine, "B"));
    engine.pointer_down(b, egui::Modifiers::SHIFT);
    engine.pointer_up(b);
    assert_eq!(engine.model().selected_nodes().len(), 2);

    drag(&mut engine, DataPoint::new(100.0, 100.0), DataPoint::new(157.0, 133.0));

    let a = position(&engine, "A");
    let b = position(&engine, "B");
    // The primary lands on the grid; the other node keeps its offset.
    assert_eq!(a, DataPoint::new(160.0, 140.0));
    assert!((b.x - a.x - 30.0).abs() < 1e-9);
    assert!((b.y - a.y - 70.0).abs() < 1e-9);
    assert_eq!(position(&engine, "C"), DataPoint::new(300.0, 300.0));
    assert_eq!(engine.history().len(), 1);
    assert!(engine.is_dirty());

    assert!(engine.undo());
    assert_eq!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
    assert_eq!(position(&engine, "B"), DataPoint::new(130.0, 170.0));
    assert!(engine.redo());
    assert_eq!(position(&engine, "A"), a);
    assert_eq!(position(&engine, "B"), b);
}

#[test]
fn pressing_an_unselected_node_collapses_the_selection() {
    let mut engine = engine_with(network());
    engine.select_node("A");
    let c = at(&engine, position(&engine, "C"));
    engine.pointer_down(c, egui::Modifiers::NONE);
    engine.pointer_up(c);
    let selected: Vec<&str> = engine
        .model()
        .selected_nodes()
        .into_iter()
        .map(|i| engine.model().node(i).unwrap().id.as_str())
        .collect();
    assert_eq!(selected, ["C"]);
}

#[test]
fn escape_restores_positions_without_history() {
    let mut engine = engine_with(network());
    let start = at(&engine, DataPoint::new(100.0, 100.0));
    engine.pointer_down(start, egui::Modifiers::NONE);
    engine.pointer_move(at(&engine, DataPoint::new(400.0, 500.0)));
    assert_ne!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
    assert!(engine.key_pressed(egui::Key::Escape, egui::Modifiers::NONE));
    assert_eq!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
    assert!(engine.history().is_empty());
    assert!(engine.drag_state().is_idle());
}

#[test]
fn drop_outside_bounds_is_clamped() {
    let mut engine = engine_with(network());
    drag(&mut engine, DataPoint::new(300.0, 300.0), DataPoint::new(1400.0, 300.0));
    let half = engine.model().icon_diameter() / 2.0;
    let c = position(&engine, "C");
    assert!((c.x - (1000.0 + half)).abs() < 1e-9);
}

#[test]
fn clamped_group_keeps_its_formation() {
    let mut engine = engine_with(network());
    engine.select_node("A");
    let b = at(&engine, position(&engine, "B"));
    engine.pointer_down(b, egui::Modifiers::SHIFT);
    engine.pointer_up(b);

    drag(&mut engine, DataPoint::new(100.0, 100.0), DataPoint::new(1400.0, 100.0));

    let half = engine.model().icon_diameter() / 2.0;
    let a = position(&engine, "A");
    let b = position(&engine, "B");
    assert!((a.x - (1000.0 + half)).abs() < 1e-9);
    // The group shifts with the primary even where that leaves B outside.
    assert!((b.x - a.x - 30.0).abs() < 1e-9);
    assert!((b.y - a.y - 70.0).abs() < 1e-9);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn legend_drag_is_clamped_inside_bounds() {
    let mut engine = engine_with(network());
    frame(&mut engine);
    let legend = engine.model().legend().bounds.unwrap();
    assert!(legend.width() > 2.0 && legend.height() > 2.0);

    let grab = DataPoint::new(601.0, 101.0);
    drag(&mut engine, grab, DataPoint::new(1051.0, 501.0));
    let anchor = engine.model().legend().anchor;
    assert!(anchor.x <= 1000.0);
    assert!(anchor.x >= 0.0);
    assert!((anchor.y - 500.0).abs() < 1e-3);
    assert_eq!(engine.history().len(), 1);

    assert!(engine.undo());
    assert_eq!(engine.model().legend().anchor, DataPoint::new(600.0, 100.0));
}

#[test]
fn legend_move_marks_the_document_unsaved() {
    let mut engine = engine_with(network());
    frame(&mut engine);
    assert!(!engine.is_dirty());

    drag(&mut engine, DataPoint::new(601.0, 101.0), DataPoint::new(651.0, 201.0));
    assert_eq!(engine.history().len(), 1);
    assert!(engine.is_dirty());

    engine.mark_saved();
    assert!(!engine.is_dirty());
    assert!(engine.undo());
    assert!(engine.is_dirty());

    engine.mark_saved();
    assert!(engine.redo());
    assert!(engine.is_dirty());
    let anchor = engine.model().legend().anchor;
    assert!((anchor.x - 650.0).abs() < 1e-3 && (anchor.y - 200.0).abs() < 1e-3);
}

#[test]
fn legend_is_hidden_while_dragged() {
    let mut engine = engine_with(network());
    assert!(frame(&mut engine).texts().contains(&"Legend"));
    engine.pointer_down(at(&engine, DataPoint::new(601.0, 101.0)), egui::Modifiers::NONE);
    assert!(engine.drag_state().is_dragging_legend());
    assert!(!frame(&mut engine).texts().contains(&"Legend"));
}

#[test]
fn annotation_drag_records_and_hides_text() {
    let mut net = network();
    net.annotations.push(Annotation::new(
        "Gunnison River",
        DataPoint::new(500.0, 700.0),
        TextPosition::Center,
    ));
    let mut engine = engine_with(net);
    assert!(frame(&mut engine).texts().contains(&"Gunnison River"));

    let from = at(&engine, DataPoint::new(500.0, 700.0));
    engine.pointer_down(from, egui::Modifiers::NONE);
    assert_eq!(engine.drag_state().dragged_annotation(), Some(0));
    let to = at(&engine, DataPoint::new(520.0, 650.0));
    engine.pointer_move(to);
    assert!(!frame(&mut engine).texts().contains(&"Gunnison River"));
    engine.pointer_up(to);

    let anchor = engine.model().annotations()[0].anchor;
    assert!((anchor.x - 520.0).abs() < 1e-3);
    assert!((anchor.y - 650.0).abs() < 1e-3);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn rubber_band_selects_enclosed_nodes() {
    let mut engine = engine_with(network());
    engine.select_node("C");
    drag(&mut engine, DataPoint::new(50.0, 50.0), DataPoint::new(200.0, 200.0));
    let a = engine.model().node_by_id("A").unwrap().selected;
    let b = engine.model().node_by_id("B").unwrap().selected;
    let c = engine.model().node_by_id("C").unwrap().selected;
    assert!(a && b && !c);
    assert!(engine.history().is_empty());
}

#[test]
fn pan_mode_moves_the_view() {
    let mut engine = engine_with(network());
    engine.settings_mut().mode = InteractionMode::Pan;
    engine.zoom_in();
    engine.zoom_in();
    let before = engine.zoom().center();
    let p = at(&engine, DataPoint::new(800.0, 800.0));
    engine.pointer_down(p, egui::Modifiers::NONE);
    engine.pointer_move(p + egui::vec2(40.0, 0.0));
    engine.pointer_up(p + egui::vec2(40.0, 0.0));
    assert!(engine.zoom().center().x < before.x);
    assert_eq!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
}

#[test]
fn undo_n_edits_then_truncate() {
    let mut engine = engine_with(network());
    let targets = [(150.0, 120.0), (200.0, 140.0), (250.0, 160.0)];
    let mut from = DataPoint::new(100.0, 100.0);
    for (x, y) in targets {
        let to = DataPoint::new(x, y);
        drag(&mut engine, from, to);
        from = position(&engine, "A");
    }
    let last = position(&engine, "A");
    assert_eq!(engine.history().len(), 3);
    for _ in 0..3 {
        assert!(engine.undo());
    }
    assert!(!engine.undo());
    assert_eq!(position(&engine, "A"), DataPoint::new(100.0, 100.0));
    for _ in 0..3 {
        assert!(engine.redo());
    }
    assert_eq!(position(&engine, "A"), last);

    engine.undo();
    engine.undo();
    let from = position(&engine, "A");
    drag(&mut engine, from, DataPoint::new(400.0, 400.0));
    assert_eq!(engine.history().len(), 2);
    assert!(!engine.redo());
}

#[test]
fn headless_engine_ignores_input_and_undo() {
    let mut engine =
        DiagramEngine::new_headless(Box::new(network()), EngineSettings::default()).unwrap();
    let p = at(&engine, DataPoint::new(100.0, 100.0));
    engine.pointer_down(p, egui::Modifiers::NONE);
    assert!(engine.drag_state().is_idle());
    assert!(!engine.undo());
    assert!(!engine.key_pressed(egui::Key::Plus, egui::Modifiers::NONE));
}

#[test]
fn printing_copy_is_isolated() {
    let mut engine = engine_with(network());
    drag(&mut engine, DataPoint::new(100.0, 100.0), DataPoint::new(140.0, 100.0));
    let mut copy = engine.for_printing();
    assert!(copy.model().selected_nodes().is_empty());
    assert!(copy.history().is_empty());
    assert!(!copy.undo());

    copy.model_mut().node_mut(0).unwrap().position = DataPoint::new(0.0, 0.0);
    assert!(engine.model().node_by_id("A").unwrap().selected);
    assert_ne!(position(&engine, "A"), DataPoint::new(0.0, 0.0));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn dangling_link_draws_no_segment() {
    let plain = network();
    let mut dangling = network();
    dangling.links.push(Link::new("A", "X"));

    let lines_without = frame(&mut engine_with(plain)).lines().len();
    let mut engine = engine_with(dangling);
    let surface = frame(&mut engine);
    assert_eq!(surface.lines().len(), lines_without);

    let mut resolved = network();
    resolved.links.push(Link::new("A", "C"));
    assert_eq!(frame(&mut engine_with(resolved)).lines().len(), lines_without + 1);
}

#[test]
fn lines_into_a_convergence_are_dotted() {
    let mut net = StreamNetwork::new(
        vec![
            Node::new("A", NodeCategory::Diversion, DataPoint::new(100.0, 100.0)).with_downstream("B"),
            Node::new("B", NodeCategory::Diversion, DataPoint::new(200.0, 100.0)).with_downstream("J"),
            Node::new("J", NodeCategory::Other, DataPoint::new(300.0, 100.0)),
        ],
        vec![],
    );
    net.bounds = Some(DataRect::new(0.0, 0.0, 1000.0, 1000.0));
    let surface = frame(&mut engine_with(net));
    let dotted = surface
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Line(_, _, LineDash::Dotted)))
        .count();
    assert_eq!(dotted, 1);
}

#[test]
fn node_labels_are_drawn_in_traversal_order() {
    let mut engine = engine_with(network());
    let surface = frame(&mut engine);
    let texts = surface.texts();
    let ids: Vec<&str> = texts
        .iter()
        .copied()
        .filter(|t| ["A", "B", "C"].contains(t))
        .collect();
    let expected: Vec<&str> = engine.model().ordered_nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn grid_is_drawn_only_when_enabled() {
    let mut engine = engine_with(network());
    let base = frame(&mut engine).lines().len();
    engine.settings_mut().show_grid = true;
    assert!(frame(&mut engine).lines().len() > base);
}

#[test]
fn unknown_layout_is_rejected() {
    let mut engine = engine_with(network());
    let err = engine.set_layout("Poster").unwrap_err();
    assert!(matches!(err, DiagramError::LayoutNotFound(name) if name == "Poster"));
    assert_eq!(engine.layout().name, "Default");
}

#[test]
fn zoom_round_trip_and_antialias() {
    let mut engine = engine_with(network());
    engine.zoom_to_actual_size();
    assert!((engine.zoom_percent() - 100.0).abs() < 1e-6);
    assert_eq!(engine.zoom_in(), ZoomOutcome::Changed);
    assert!(engine.interactive_target(1.0).antialias);
    let view = engine.zoom().view_rect();
    engine.zoom_out();
    assert_eq!(engine.zoom_out(), ZoomOutcome::Changed);
    assert!(!engine.interactive_target(1.0).antialias);
    engine.zoom_in();
    engine.zoom_in();
    assert_eq!(engine.zoom().view_rect(), view);
}
