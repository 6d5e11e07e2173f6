use approx::assert_relative_eq;

use data_visualizer::charts::figure::{HISTOGRAM_BINS, OTHERS_LABEL};
use data_visualizer::charts::{
    ChartKind, ChartRequest, Figure, MarkerColor, MarkerStyle, RenderError, ValidationError,
};
use data_visualizer::data::{ColumnError, DataLoader, Table};

fn table(csv: &str) -> Table {
    DataLoader::load_bytes("test.csv", csv.as_bytes().to_vec()).unwrap()
}

fn build(table: &Table, kind: ChartKind, columns: &[&str]) -> Result<Figure, RenderError> {
    let request = ChartRequest::new(kind, columns.iter().map(|c| c.to_string()).collect());
    Figure::build(table, &request)
}

#[test]
fn bar_sums_each_column() {
    let table = table("A,B\n1,4\n2,5\n3,6\n");

    let Figure::Bar(bar) = build(&table, ChartKind::Bar, &["A", "B"]).unwrap() else {
        panic!("expected a bar figure");
    };

    let sums: Vec<f64> = bar.bars.iter().map(|b| b.sum).collect();
    let labels: Vec<String> = bar.bars.iter().map(|b| b.annotation()).collect();
    assert_eq!(sums, vec![6.0, 15.0]);
    assert_eq!(labels, vec!["6.00", "15.00"]);
}

#[test]
fn bar_skips_nulls_and_keeps_selection_order() {
    let table = table("A,B\n1.25,\n,2\n1.25,3\n");

    let Figure::Bar(bar) = build(&table, ChartKind::Bar, &["B", "A"]).unwrap() else {
        panic!("expected a bar figure");
    };
    assert_eq!(bar.bars[0].column, "B");
    assert_eq!(bar.bars[0].annotation(), "5.00");
    assert_eq!(bar.bars[1].annotation(), "2.50");
}

#[test]
fn pie_percentages() {
    let table = table("Cat\nx\nx\ny\n");

    let figure = build(&table, ChartKind::Pie, &["Cat"]).unwrap();
    assert_eq!(figure.title(), "Pie Chart of Cat");
    let Figure::Pie(pie) = figure else {
        panic!("expected a pie figure");
    };

    let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["x", "y"]);
    let percentages = pie.percentages();
    assert_relative_eq!(percentages[0], 200.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(percentages[1], 100.0 / 3.0, epsilon = 1e-9);
    assert_eq!(pie.percent_labels(), vec!["66.7%", "33.3%"]);
}

#[test]
fn pie_groups_tail_into_others() {
    // v0 appears 13 times, v1 12 times, ... v12 once.
    let mut csv = String::from("Cat\n");
    for i in 0..13 {
        for _ in 0..(13 - i) {
            csv.push_str(&format!("v{i}\n"));
        }
    }
    let table = table(&csv);

    let Figure::Pie(pie) = build(&table, ChartKind::Pie, &["Cat"]).unwrap() else {
        panic!("expected a pie figure");
    };

    assert_eq!(pie.slices.len(), 11);
    assert_eq!(pie.slices[0].label, "v0");
    assert_eq!(pie.slices[9].label, "v9");
    let others = &pie.slices[10];
    assert_eq!(others.label, OTHERS_LABEL);
    assert_eq!(others.count, 3 + 2 + 1);
    assert_eq!(pie.total(), (1..=13).sum::<u64>());
}

#[test]
fn pie_with_ten_values_has_no_others() {
    let csv: String = std::iter::once("Cat\n".to_string())
        .chain((0..10).map(|i| format!("v{i}\n")))
        .collect();
    let table = table(&csv);

    let Figure::Pie(pie) = build(&table, ChartKind::Pie, &["Cat"]).unwrap() else {
        panic!("expected a pie figure");
    };
    assert_eq!(pie.slices.len(), 10);
    assert!(pie.slices.iter().all(|s| s.label != OTHERS_LABEL));
}

#[test]
fn pie_accepts_numeric_columns() {
    let table = table("n\n1\n2\n2\n");

    let Figure::Pie(pie) = build(&table, ChartKind::Pie, &["n"]).unwrap() else {
        panic!("expected a pie figure");
    };
    assert_eq!(pie.slices[0].label, "2");
    assert_eq!(pie.slices[0].count, 2);
}

#[test]
fn line_uses_row_index() {
    let table = table("A,B\n5,1\n,2\n7,3\n");

    let Figure::Line(line) = build(&table, ChartKind::Line, &["A"]).unwrap() else {
        panic!("expected a line figure");
    };
    assert_eq!(line.series.len(), 1);
    assert_eq!(line.series[0].name, "A");
    assert_eq!(line.series[0].points, vec![(0.0, 5.0), (2.0, 7.0)]);
}

#[test]
fn line_breaks_across_missing_rows() {
    let table = table("A\n1\n2\nNA\n4\n5\n");

    let Figure::Line(line) = build(&table, ChartKind::Line, &["A"]).unwrap() else {
        panic!("expected a line figure");
    };
    let segments = line.series[0].segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], &[(0.0, 1.0), (1.0, 2.0)][..]);
    assert_eq!(segments[1], &[(3.0, 4.0), (4.0, 5.0)][..]);
}

#[test]
fn line_colors_cycle_after_ten_series() {
    let names: Vec<String> = (0..11).map(|i| format!("c{i}")).collect();
    let csv = format!("{}\n{}\n", names.join(","), vec!["1"; 11].join(","));
    let table = table(&csv);
    let columns: Vec<&str> = names.iter().map(String::as_str).collect();

    let Figure::Line(line) = build(&table, ChartKind::Line, &columns).unwrap() else {
        panic!("expected a line figure");
    };
    assert_eq!(line.series.len(), 11);
    assert_eq!(line.series[10].color, line.series[0].color);
    assert_ne!(line.series[1].color, line.series[0].color);
}

#[test]
fn missing_value_markers_do_not_poison_sums() {
    let table = table("A\n1\nNA\n3\n");

    let Figure::Bar(bar) = build(&table, ChartKind::Bar, &["A"]).unwrap() else {
        panic!("expected a bar figure");
    };
    assert_eq!(bar.bars[0].annotation(), "4.00");

    let table = self::table("A\n1.5\nNaN\n2.5\n");
    let Figure::Bar(bar) = build(&table, ChartKind::Bar, &["A"]).unwrap() else {
        panic!("expected a bar figure");
    };
    assert_eq!(bar.bars[0].annotation(), "4.00");
}

#[test]
fn infinite_cells_are_skipped() {
    let table = table("A,B\n1,1\ninf,2\n3,3\n");

    let Figure::Bar(bar) = build(&table, ChartKind::Bar, &["A"]).unwrap() else {
        panic!("expected a bar figure");
    };
    assert_eq!(bar.bars[0].annotation(), "4.00");

    let Figure::Line(line) = build(&table, ChartKind::Line, &["A"]).unwrap() else {
        panic!("expected a line figure");
    };
    assert_eq!(line.series[0].points, vec![(0.0, 1.0), (2.0, 3.0)]);

    let Figure::Scatter(scatter) = build(&table, ChartKind::Scatter, &["A", "B"]).unwrap() else {
        panic!("expected a scatter figure");
    };
    assert_eq!(scatter.points, vec![(1.0, 1.0), (3.0, 3.0)]);
}

#[test]
fn scatter_pairs_rows_and_keeps_marker() {
    let table = table("x,y\n1,10\n2,\n3,30\n");
    let request = ChartRequest::new(ChartKind::Scatter, vec!["x".into(), "y".into()])
        .with_marker(MarkerStyle::Star, MarkerColor::Red);

    let figure = Figure::build(&table, &request).unwrap();
    assert_eq!(figure.x_label(), Some("x"));
    assert_eq!(figure.y_label(), Some("y"));
    let Figure::Scatter(scatter) = figure else {
        panic!("expected a scatter figure");
    };
    assert_eq!(scatter.points, vec![(1.0, 10.0), (3.0, 30.0)]);
    assert_eq!(scatter.marker, MarkerStyle::Star);
    assert_eq!(scatter.color, MarkerColor::Red);
}

#[test]
fn histogram_counts_every_value() {
    let table = table("a,b\n0,5\n1,5\n2,\n3,6\n10,7\n");

    let Figure::Histogram(hist) = build(&table, ChartKind::Histogram, &["a", "b"]).unwrap() else {
        panic!("expected a histogram figure");
    };

    assert_eq!(hist.edges.len(), HISTOGRAM_BINS + 1);
    assert_relative_eq!(hist.edges[0], 0.0);
    assert_relative_eq!(hist.edges[HISTOGRAM_BINS], 10.0);

    let totals: Vec<u64> = hist.series.iter().map(|s| s.counts.iter().sum()).collect();
    assert_eq!(totals, vec![5, 4]);
    assert_eq!(hist.series[0].counts[HISTOGRAM_BINS - 1], 1);
}

#[test]
fn non_numeric_column_is_a_render_error() {
    let table = table("name,score\nann,1\nbob,2\n");

    for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Histogram] {
        let err = build(&table, kind, &["score", "name"]).unwrap_err();
        match err {
            RenderError::Column(ColumnError::NonNumeric { name, .. }) => assert_eq!(name, "name"),
            other => panic!("unexpected error for {kind}: {other}"),
        }
    }
}

#[test]
fn unknown_column_is_reported() {
    let table = table("a\n1\n");
    let err = build(&table, ChartKind::Bar, &["zzz"]).unwrap_err();
    assert!(matches!(err, RenderError::Column(ColumnError::Missing(_))));
}

#[test]
fn all_null_pie_has_no_values() {
    let table = table("a,b\n1,\n2,\n");
    let err = build(&table, ChartKind::Pie, &["b"]).unwrap_err();
    assert!(matches!(err, RenderError::NoValues(_)));
}

#[test]
fn build_rejects_invalid_arity() {
    let table = table("a,b\n1,2\n");
    let err = build(&table, ChartKind::Scatter, &["a"]).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Invalid(ValidationError::WrongArityForScatter)
    ));
}
