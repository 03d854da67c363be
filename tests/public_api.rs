use network_diagram::samples::{build_sample, SampleKind};
use network_diagram::{DiagramEngine, DiagramError, EngineSettings, EstimatedMetrics, PrintJob, StreamNetwork};

fn engine(kind: SampleKind) -> DiagramEngine {
    DiagramEngine::new(Box::new(build_sample(kind)), EngineSettings::default()).unwrap()
}

#[test]
fn saved_network_reopens_with_the_same_order_and_layouts() {
    let original = build_sample(SampleKind::Confluence);
    let json = original.to_json().unwrap();

    let reopened = StreamNetwork::from_json(&json).unwrap();
    assert_eq!(reopened.computational_order(), original.computational_order());

    let engine = DiagramEngine::new(Box::new(reopened), EngineSettings::default()).unwrap();
    assert_eq!(
        engine.layout_names(),
        vec!["Default", "Letter Portrait", "Plot D"]
    );
    assert!(!engine.is_dirty());
}

#[test]
fn print_job_renders_its_page_once() {
    let source = engine(SampleKind::Confluence);
    let mut job = PrintJob::new(&source, "Letter Portrait").unwrap().with_dpi(20.0);
    assert_eq!(job.page_size(), (170, 220));

    let page = job.render_page(0, &EstimatedMetrics).unwrap().unwrap();
    assert_eq!((page.width(), page.height()), (170, 220));
    assert!(job.render_page(0, &EstimatedMetrics).unwrap().is_none());
    assert!(job.render_page(1, &EstimatedMetrics).unwrap().is_none());

    // Printing never touches the interactive layout.
    assert_eq!(source.layout().name, "Default");
}

#[test]
fn unknown_layout_is_reported() {
    let mut engine = engine(SampleKind::SingleReach);
    let err = PrintJob::new(&engine, "A0 Poster").unwrap_err();
    assert!(matches!(err, DiagramError::LayoutNotFound(ref name) if name == "A0 Poster"));

    assert!(engine.set_layout("A0 Poster").is_err());
    assert_eq!(engine.layout().name, "Default");
}
