use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{Next, from_fn},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    error::AnalysisError,
    models::{AnalysisOptions, DetailLevel, TargetAudience, UploadedDocument},
    report::{REPORT_MEDIA_TYPE, render_markdown_report, render_screen_view, report_filename},
    session::SessionState,
    tasks::TextGenerator,
    workflow::AnalysisWorkflow,
};

/// One interactive session per process; the lock doubles as the busy flag.
///
/// `options` holds the last submitted selectors so a refresh keeps them. It is
/// only written while the session lock is held.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionState>>,
    pub options: Arc<Mutex<AnalysisOptions>>,
    pub workflow: AnalysisWorkflow,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            session: Arc::new(Mutex::new(SessionState::new())),
            options: Arc::new(Mutex::new(AnalysisOptions::default())),
            workflow: AnalysisWorkflow::new(generator),
        }
    }
}

pub fn create_app(generator: Arc<dyn TextGenerator>, max_upload_bytes: usize) -> Router {
    build_router(AppState::new(generator), max_upload_bytes)
}

pub fn build_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/clear", post(clear_document))
        .route("/report", get(download_report))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Refresh: re-render the page from current state.
async fn index(State(state): State<AppState>) -> Response {
    let Ok(session) = state.session.try_lock() else {
        return Html(page::busy()).into_response();
    };
    let options = *state.options.lock().await;
    Html(page::render(&session, options, None)).into_response()
}

async fn analyze(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (upload, options) = match read_analyze_form(multipart).await {
        Ok(form) => form,
        Err(message) => {
            warn!("Rejected analysis form: {}", message);
            return (StatusCode::BAD_REQUEST, Html(page::error_only(&message))).into_response();
        }
    };

    let Ok(mut session) = state.session.try_lock() else {
        warn!("Analysis requested while another one is in progress");
        return (StatusCode::CONFLICT, Html(page::busy())).into_response();
    };
    *state.options.lock().await = options;

    match state.workflow.run(&mut session, upload, options).await {
        Ok(()) => Html(page::render(&session, options, None)).into_response(),
        Err(e) => {
            error!("Analysis failed: {}", e);
            let status = status_for(&e);
            (status, Html(page::render(&session, options, Some(&e.to_string())))).into_response()
        }
    }
}

async fn clear_document(State(state): State<AppState>) -> Response {
    let Ok(mut session) = state.session.try_lock() else {
        return (StatusCode::CONFLICT, Html(page::busy())).into_response();
    };
    state.workflow.clear(&mut session);
    Redirect::to("/").into_response()
}

async fn download_report(State(state): State<AppState>) -> Response {
    let Ok(session) = state.session.try_lock() else {
        return (StatusCode::CONFLICT, Html(page::busy())).into_response();
    };
    let Some(record) = session.current_record() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No analysis available" })),
        )
            .into_response();
    };

    let filename = report_filename(record);
    let body = render_markdown_report(record);
    info!("Serving report {} ({} bytes)", filename, body.len());

    (
        [
            (header::CONTENT_TYPE, REPORT_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response()
}

async fn read_analyze_form(
    mut multipart: Multipart,
) -> Result<(Option<UploadedDocument>, AnalysisOptions), String> {
    let mut upload = None;
    let mut options = AnalysisOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid form data: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read upload: {}", e))?;
                // Browsers send an empty part when no file is chosen
                if !filename.is_empty() {
                    upload = Some(UploadedDocument::new(filename, content.to_vec()));
                }
            }
            "detail_level" => {
                let value = field.text().await.map_err(|e| e.to_string())?;
                options.detail_level = DetailLevel::parse(&value).unwrap_or_default();
            }
            "target_audience" => {
                let value = field.text().await.map_err(|e| e.to_string())?;
                options.target_audience = TargetAudience::parse(&value).unwrap_or_default();
            }
            _ => {}
        }
    }

    Ok((upload, options))
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Generation(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::Unbound => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// ASCII `filename` fallback plus RFC 5987 `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

mod page {
    use super::*;
    use html_escape::encode_text;

    const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem; }
.hero { text-align: center; margin-bottom: 2rem; }
.controls { border: 1px solid #ddd; border-radius: 12px; padding: 1.5rem; max-width: 600px; margin: 0 auto; }
.notice { background: #fde8e8; border-radius: 8px; padding: 0.8rem 1rem; margin: 1rem 0; }
.columns { display: flex; gap: 1.5rem; }
.column { flex: 1; }
.summary-card { border-radius: 12px; padding: 1.2rem; margin-bottom: 1.2rem; box-shadow: 0 2px 6px rgba(0,0,0,0.1); }
.tag { display: inline-block; background: #eaddff; padding: 0.2rem 0.6rem; border-radius: 16px; margin: 0 0.4rem 0.4rem 0; }
#busy { display: none; }
"#;

    fn shell(body: &str, refresh: bool) -> String {
        let meta = if refresh {
            r#"<meta http-equiv="refresh" content="3">"#
        } else {
            ""
        };
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
{meta}
<title>ResearchMate</title>
<style>{STYLE}</style>
</head>
<body>
<div class="hero"><h1>ResearchMate</h1><p>Understand Research Faster with AI-Powered Summaries</p></div>
{body}
</body>
</html>
"#
        )
    }

    fn select<T: Copy + PartialEq>(
        name: &str,
        label: &str,
        values: &[T],
        selected: T,
        as_str: fn(&T) -> &'static str,
    ) -> String {
        let options: String = values
            .iter()
            .map(|value| {
                let marker = if *value == selected { " selected" } else { "" };
                format!(r#"<option value="{0}"{1}>{0}</option>"#, as_str(value), marker)
            })
            .collect();
        format!(r#"<label>{label} <select name="{name}">{options}</select></label>"#)
    }

    /// Same session + options + notice always gives the same page.
    pub fn render(session: &SessionState, options: AnalysisOptions, notice: Option<&str>) -> String {
        let mut body = String::new();

        body.push_str(r#"<div class="controls"><h3>⚙️ Configuration</h3>"#);
        body.push_str(r#"<form method="post" action="/analyze" enctype="multipart/form-data" onsubmit="document.getElementById('submit').disabled = true; document.getElementById('busy').style.display = 'block';">"#);
        body.push_str(&select(
            "detail_level",
            "Detail Level",
            &DetailLevel::ALL,
            options.detail_level,
            DetailLevel::as_str,
        ));
        body.push_str(&select(
            "target_audience",
            "Target Audience",
            &TargetAudience::ALL,
            options.target_audience,
            TargetAudience::as_str,
        ));
        body.push_str(
            r#"<hr><label>Upload PDF Paper <input type="file" name="file" accept="application/pdf,.pdf"></label>
<button id="submit" type="submit">✨ Summarize Paper</button>
<p id="busy">🧠 Analyzing paper structure...</p>
</form>"#,
        );

        if let Some(identity) = session.current_identity() {
            body.push_str(&format!(
                r#"<p>Current document: <code>{}</code></p><form method="post" action="/clear"><button type="submit">Remove file</button></form>"#,
                encode_text(identity.as_str())
            ));
        }
        body.push_str("</div>");

        if let Some(message) = notice {
            body.push_str(&format!(
                r#"<div class="notice">❌ {}</div>"#,
                encode_text(message)
            ));
        }

        if let Some(record) = session.current_record() {
            body.push_str("<hr><h2>📊 Analysis Results</h2>\n");
            body.push_str(&render_screen_view(record));
            body.push_str(r#"<p><a href="/report" download>📥 Download Full Report</a></p>"#);
        }

        shell(&body, false)
    }

    pub fn busy() -> String {
        shell(
            r#"<div class="controls"><p>🧠 Analysis in progress, please wait...</p></div>"#,
            true,
        )
    }

    pub fn error_only(message: &str) -> String {
        shell(
            &format!(
                r#"<div class="notice">❌ {}</div><p><a href="/">Back</a></p>"#,
                encode_text(message)
            ),
            false,
        )
    }
}
