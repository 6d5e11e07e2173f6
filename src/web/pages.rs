//! Server-rendered HTML for the single-page web front-end.

use std::fmt::Write;

use crate::charts::{ChartKind, ChartRequest, MarkerColor, MarkerStyle};
use crate::data::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Everything one page render needs.
pub struct PageView<'a> {
    pub table: Option<&'a Table>,
    pub preview_rows: usize,
    pub request: &'a ChartRequest,
    pub notices: Vec<Notice>,
    /// Inline SVG document of the last generated chart.
    pub chart_svg: Option<String>,
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:1100px;margin:2em auto;color:#222}\
h1{color:#6495ed}\
.notice{padding:.6em 1em;border-radius:5px;margin:.8em 0}\
.info{background:#e7f1ff}.success{background:#d4edda}\
.warning{background:#fff3cd}.error{background:#f8d7da}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25em .6em}\
th{background:#f4f4f4}form{margin:1em 0}label{margin-right:1em}\
.columns{display:flex;flex-wrap:wrap;gap:.4em 1em;margin:.5em 0}\
.hint{color:#888;font-size:.85em}";

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Data Visualizer</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body>");
    html.push_str("<h1>Data Visualizer</h1>");

    html.push_str(
        "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"file\" accept=\".csv\"> \
         <button type=\"submit\">Upload CSV</button></form>",
    );

    for notice in &view.notices {
        let _ = write!(
            html,
            "<div class=\"notice {}\">{}</div>",
            notice.level.css_class(),
            escape_html(&notice.text)
        );
    }

    match view.table {
        Some(table) => {
            render_preview(&mut html, table, view.preview_rows);
            render_chart_form(&mut html, table, view.request);
        }
        None if view.notices.is_empty() => {
            html.push_str(
                "<div class=\"notice info\">Please upload a CSV file to begin.</div>",
            );
        }
        None => {}
    }

    if let Some(svg) = &view.chart_svg {
        html.push_str("<div class=\"chart\">");
        html.push_str(strip_xml_prolog(svg));
        html.push_str("</div>");
    }

    html.push_str("</body></html>");
    html
}

fn render_preview(html: &mut String, table: &Table, rows: usize) {
    let preview = table.preview(rows);
    let _ = write!(
        html,
        "<h2>Data Preview</h2><p>{} &middot; {} rows, {} columns</p><table><tr>",
        escape_html(table.source()),
        table.row_count(),
        table.column_count()
    );
    for name in &preview.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(name));
    }
    html.push_str("</tr>");
    for row in &preview.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
}

fn render_chart_form(html: &mut String, table: &Table, request: &ChartRequest) {
    html.push_str("<h2>Chart</h2><form action=\"/chart\" method=\"post\">");

    html.push_str("<label>Chart type <select name=\"kind\">");
    for kind in ChartKind::ALL {
        push_option(html, kind.code(), kind.label(), kind == request.kind);
    }
    html.push_str("</select></label>");

    html.push_str("<label>Marker style <select name=\"marker\">");
    for style in MarkerStyle::ALL {
        push_option(
            html,
            style.symbol(),
            &style.to_string(),
            style == request.marker_style,
        );
    }
    html.push_str("</select></label>");

    html.push_str("<label>Marker color <select name=\"color\">");
    for color in MarkerColor::ALL {
        push_option(html, color.name(), color.name(), color == request.marker_color);
    }
    html.push_str("</select></label>");

    // Text columns only make sense for pie charts; flag them.
    let numeric = table.numeric_columns();
    html.push_str("<div class=\"columns\">");
    for name in table.column_names() {
        let checked = if request.columns.contains(&name) {
            " checked"
        } else {
            ""
        };
        let hint = if numeric.contains(&name) {
            ""
        } else {
            " <span class=\"hint\">(text)</span>"
        };
        let name = escape_html(&name);
        let _ = write!(
            html,
            "<label><input type=\"checkbox\" name=\"columns\" value=\"{name}\"{checked}> {name}{hint}</label>"
        );
    }
    html.push_str("</div><button type=\"submit\">Generate Chart</button></form>");
}

fn push_option(html: &mut String, value: &str, text: &str, selected: bool) {
    let selected = if selected { " selected" } else { "" };
    let _ = write!(
        html,
        "<option value=\"{}\"{selected}>{}</option>",
        escape_html(value),
        escape_html(text)
    );
}

/// Inline SVG must not carry its own `<?xml ...?>` declaration.
fn strip_xml_prolog(svg: &str) -> &str {
    let trimmed = svg.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn strips_prolog() {
        assert_eq!(
            strip_xml_prolog("<?xml version=\"1.0\"?>\n<svg></svg>"),
            "\n<svg></svg>"
        );
        assert_eq!(strip_xml_prolog("<svg></svg>"), "<svg></svg>");
    }

    #[test]
    fn empty_page_asks_for_upload() {
        let request = ChartRequest::default();
        let html = render_page(&PageView {
            table: None,
            preview_rows: 5,
            request: &request,
            notices: Vec::new(),
            chart_svg: None,
        });
        assert!(html.contains("Please upload a CSV file to begin."));
        assert!(!html.contains("action=\"/chart\""));
    }

    #[test]
    fn chart_form_flags_text_columns() {
        let table =
            DataLoader::load_bytes("mixed.csv", b"score,name\n1,ann\n2,bob\n".to_vec()).unwrap();
        let request = ChartRequest::new(ChartKind::Bar, vec!["score".into()]);
        let html = render_page(&PageView {
            table: Some(&table),
            preview_rows: 5,
            request: &request,
            notices: Vec::new(),
            chart_svg: None,
        });

        assert!(html.contains("value=\"score\" checked> score</label>"));
        assert!(html.contains("value=\"name\"> name <span class=\"hint\">(text)</span></label>"));
    }
}
