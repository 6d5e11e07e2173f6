use std::sync::Arc;

use data_visualizer::charts::{ChartKind, ChartRequest, Figure, ValidationError};
use data_visualizer::data::DataLoader;
use data_visualizer::{Session, VisualizerError};

#[test]
fn generate_without_table_asks_for_upload() {
    let session = Session::new();
    let err = session
        .generate(&ChartRequest::new(ChartKind::Bar, vec!["A".into()]))
        .unwrap_err();

    assert!(matches!(err, VisualizerError::NoTable));
    assert!(err.is_warning());
    assert_eq!(err.to_string(), "Please upload a CSV file to begin.");
}

#[test]
fn failed_load_keeps_previous_table() {
    let mut session = Session::new();
    session
        .load_bytes("good.csv", b"A,B\n1,4\n2,5\n3,6\n".to_vec())
        .unwrap();

    let err = session
        .load_bytes("bad.csv", b"A,B\n1,2\n3,4,5\n".to_vec())
        .unwrap_err();
    assert!(matches!(err, VisualizerError::Parse(_)));
    assert!(err.to_string().starts_with("Failed to read file:"));
    assert!(!err.is_warning());

    let table = session.table().unwrap();
    assert_eq!(table.source(), "good.csv");
    assert_eq!(table.row_count(), 3);
}

#[test]
fn new_upload_replaces_table() {
    let mut session = Session::new();
    session.load_bytes("one.csv", b"A\n1\n".to_vec()).unwrap();
    session.load_bytes("two.csv", b"X,Y\n1,2\n".to_vec()).unwrap();

    assert_eq!(session.table().unwrap().column_names(), vec!["X", "Y"]);
}

#[test]
fn validation_errors_are_warnings() {
    let mut session = Session::new();
    session
        .load_bytes("data.csv", b"A,B\n1,4\n2,5\n".to_vec())
        .unwrap();

    let err = session
        .generate(&ChartRequest::new(ChartKind::Scatter, vec!["A".into()]))
        .unwrap_err();
    assert!(matches!(
        err,
        VisualizerError::Validation(ValidationError::WrongArityForScatter)
    ));
    assert!(err.is_warning());

    let err = session
        .generate(&ChartRequest::new(ChartKind::Bar, Vec::new()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Please select at least one column.");
}

#[test]
fn end_to_end_bar() {
    let mut session = Session::new();
    session
        .load_bytes("data.csv", b"A,B\n1,4\n2,5\n3,6\n".to_vec())
        .unwrap();

    let figure = session
        .generate(&ChartRequest::new(
            ChartKind::Bar,
            vec!["A".into(), "B".into()],
        ))
        .unwrap();
    let Figure::Bar(bar) = figure else {
        panic!("expected a bar figure");
    };
    assert_eq!(bar.bars[0].annotation(), "6.00");
    assert_eq!(bar.bars[1].annotation(), "15.00");
}

#[test]
fn render_failures_are_errors() {
    let mut session = Session::new();
    session
        .load_bytes("data.csv", b"name\nann\n".to_vec())
        .unwrap();

    let err = session
        .generate(&ChartRequest::new(ChartKind::Histogram, vec!["name".into()]))
        .unwrap_err();
    assert!(matches!(err, VisualizerError::Render(_)));
    assert!(!err.is_warning());
}

#[test]
fn replace_installs_parsed_table() {
    let mut session = Session::new();
    session.load_bytes("old.csv", b"A\n1\n".to_vec()).unwrap();

    let parsed = DataLoader::load_bytes("new.csv", b"X,Y\n1,2\n3,4\n".to_vec()).unwrap();
    let table = session.replace(parsed);

    assert_eq!(table.source(), "new.csv");
    assert!(Arc::ptr_eq(session.table().unwrap(), &table));
    assert_eq!(session.table().unwrap().row_count(), 2);
}
