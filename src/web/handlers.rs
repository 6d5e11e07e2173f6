//! Request handlers for the upload page.

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use super::pages::{render_page, Notice, NoticeLevel, PageView};
use super::state::{AppState, SessionId};
use crate::charts::{ChartRequest, StaticChartRenderer, UnknownOptionError};
use crate::data::{DataLoader, ParseError, Table};
use crate::session::Session;
use crate::VisualizerError;

pub(crate) async fn handle_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = SessionId::from_headers(&headers);
    let session = state.snapshot(sid.id);
    page(&state, &sid, &session, &ChartRequest::default(), Vec::new(), None)
}

pub(crate) async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let sid = SessionId::from_headers(&headers);

    let upload = match read_file_field(&mut multipart).await {
        Ok(upload) => upload,
        Err(notice) => {
            let session = state.snapshot(sid.id);
            return page(&state, &sid, &session, &ChartRequest::default(), vec![notice], None);
        }
    };

    let Some((name, bytes)) = upload else {
        let session = state.snapshot(sid.id);
        let notice = Notice::new(NoticeLevel::Warning, VisualizerError::NoTable.to_string());
        return page(&state, &sid, &session, &ChartRequest::default(), vec![notice], None);
    };

    info!(file = %name, bytes = bytes.len(), "upload received");
    let parsed = match parse_upload(name, bytes).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "upload task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // The session map is only locked to swap in the parsed table.
    let (session, notice) = match parsed {
        Ok(table) => {
            let session = state.with_session(sid.id, |session| {
                session.replace(table);
                session.clone()
            });
            let notice = Notice::new(NoticeLevel::Success, "File uploaded successfully!");
            (session, notice)
        }
        Err(e) => {
            warn!(error = %e, "upload rejected, previous table kept");
            (state.snapshot(sid.id), error_notice(&VisualizerError::from(e)))
        }
    };
    page(&state, &sid, &session, &ChartRequest::default(), vec![notice], None)
}

/// Parse an uploaded file on the blocking pool.
async fn parse_upload(
    name: String,
    bytes: Vec<u8>,
) -> Result<Result<Table, ParseError>, JoinError> {
    tokio::task::spawn_blocking(move || DataLoader::load_bytes(&name, bytes)).await
}

pub(crate) async fn handle_chart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let sid = SessionId::from_headers(&headers);

    let request = match parse_chart_form(&fields) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected chart form");
            let session = state.snapshot(sid.id);
            let notice = Notice::new(NoticeLevel::Error, e.to_string());
            let mut response = page(
                &state,
                &sid,
                &session,
                &ChartRequest::default(),
                vec![notice],
                None,
            );
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return response;
        }
    };

    let session = state.snapshot(sid.id);
    let size = state.config().figure;
    let blocking_session = session.clone();
    let blocking_request = request.clone();
    let rendered = tokio::task::spawn_blocking(move || -> Result<String, VisualizerError> {
        let figure = blocking_session.generate(&blocking_request)?;
        Ok(StaticChartRenderer::render_svg(
            &figure,
            size.width,
            size.height,
        )?)
    })
    .await;

    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            error!(error = %e, "render task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match rendered {
        Ok(svg) => page(&state, &sid, &session, &request, Vec::new(), Some(svg)),
        Err(e) => {
            let notice = error_notice(&e);
            page(&state, &sid, &session, &request, vec![notice], None)
        }
    }
}

/// First `file` field of the form as (file name, bytes).
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, Notice> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(upload_error(e)),
        };
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field.bytes().await.map_err(upload_error)?;
        if name.is_empty() && bytes.is_empty() {
            // Browsers send an empty part when no file was picked.
            return Ok(None);
        }
        return Ok(Some((name, bytes.to_vec())));
    }
}

fn upload_error(e: axum::extract::multipart::MultipartError) -> Notice {
    warn!(error = %e, "multipart read failed");
    Notice::new(NoticeLevel::Error, format!("Failed to read file: {e}"))
}

/// Build a request from urlencoded pairs; `columns` may repeat and keeps form order.
pub(crate) fn parse_chart_form(fields: &[(String, String)]) -> Result<ChartRequest, UnknownOptionError> {
    let mut request = ChartRequest::default();
    for (key, value) in fields {
        match key.as_str() {
            "kind" => request.kind = value.parse()?,
            "marker" => request.marker_style = value.parse()?,
            "color" => request.marker_color = value.parse()?,
            "columns" => request.columns.push(value.clone()),
            _ => {}
        }
    }
    Ok(request)
}

fn error_notice(err: &VisualizerError) -> Notice {
    let level = if err.is_warning() {
        NoticeLevel::Warning
    } else {
        NoticeLevel::Error
    };
    Notice::new(level, err.to_string())
}

fn page(
    state: &AppState,
    sid: &SessionId,
    session: &Session,
    request: &ChartRequest,
    notices: Vec<Notice>,
    chart_svg: Option<String>,
) -> Response {
    let html = render_page(&PageView {
        table: session.table().map(|t| t.as_ref()),
        preview_rows: state.config().preview_rows,
        request,
        notices,
        chart_svg,
    });

    let mut response = Html(html).into_response();
    if let Some(cookie) = sid.set_cookie() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, MarkerColor, MarkerStyle};
    use crate::config::VisualizerConfig;
    use uuid::Uuid;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_repeated_columns_in_order() {
        let request = parse_chart_form(&pairs(&[
            ("kind", "scatter"),
            ("columns", "B"),
            ("columns", "A"),
            ("marker", "^"),
            ("color", "Green"),
        ]))
        .unwrap();

        assert_eq!(request.kind, ChartKind::Scatter);
        assert_eq!(request.columns, vec!["B", "A"]);
        assert_eq!(request.marker_style, MarkerStyle::Triangle);
        assert_eq!(request.marker_color, MarkerColor::Green);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let request = parse_chart_form(&pairs(&[("columns", "A")])).unwrap();
        assert_eq!(request, ChartRequest::new(ChartKind::Bar, vec!["A".into()]));
    }

    #[test]
    fn upload_parses_while_sessions_are_locked() {
        let state = AppState::new(VisualizerConfig::default());
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let rows = state.with_session(Uuid::new_v4(), |_| {
            runtime
                .block_on(parse_upload("a.csv".into(), b"A\n1\n2\n".to_vec()))
                .unwrap()
                .unwrap()
                .row_count()
        });
        assert_eq!(rows, 2);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_chart_form(&pairs(&[("kind", "radar")])).unwrap_err();
        assert_eq!(err.value, "radar");
    }
}
