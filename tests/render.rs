use plotters::style::{FontDesc, FontFamily, FontStyle};

use data_visualizer::charts::{ChartKind, ChartRequest, Figure, StaticChartRenderer};
use data_visualizer::data::DataLoader;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Text layout needs a system sans-serif font; headless hosts may have none.
fn fonts_available() -> bool {
    let found = FontDesc::new(FontFamily::SansSerif, 12.0, FontStyle::Normal)
        .box_size("x")
        .is_ok();
    if !found {
        eprintln!("no sans-serif font installed, skipping render check");
    }
    found
}

fn figures() -> Vec<Figure> {
    let table = DataLoader::load_bytes(
        "render.csv",
        b"A,B,Cat\n1,4,x\n2,5,y\n3,6,x\n4,,z\n".to_vec(),
    )
    .unwrap();
    [
        (ChartKind::Bar, vec!["A", "B"]),
        (ChartKind::Line, vec!["A", "B"]),
        (ChartKind::Pie, vec!["Cat"]),
        (ChartKind::Scatter, vec!["A", "B"]),
        (ChartKind::Histogram, vec!["A", "B"]),
    ]
    .into_iter()
    .map(|(kind, columns)| {
        let request = ChartRequest::new(kind, columns.into_iter().map(String::from).collect());
        Figure::build(&table, &request).unwrap()
    })
    .collect()
}

#[test]
fn every_kind_renders_svg() {
    if !fonts_available() {
        return;
    }
    for figure in figures() {
        let svg = StaticChartRenderer::render_svg(&figure, 1000, 500).unwrap();
        assert!(svg.contains("<svg"), "{}", figure.title());
        assert!(svg.contains(&figure.title()), "{}", figure.title());
    }
}

#[test]
fn every_kind_renders_png() {
    if !fonts_available() {
        return;
    }
    for figure in figures() {
        let png = StaticChartRenderer::render_png(&figure, 400, 200).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE, "{}", figure.title());
    }
}

#[test]
fn bar_svg_carries_sum_annotations() {
    if !fonts_available() {
        return;
    }
    let figure = figures().remove(0);
    let svg = StaticChartRenderer::render_svg(&figure, 1000, 500).unwrap();
    assert!(svg.contains("10.00"));
    assert!(svg.contains("15.00"));
}

#[test]
fn png_export_writes_file() {
    if !fonts_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.png");
    let figure = figures().remove(2);

    StaticChartRenderer::save_png(&figure, &path, 400, 400).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[..8], PNG_SIGNATURE);
}
