//! # API REST
//!
//! REST API for the clinic print pipeline.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, download headers, CORS, status codes)
//!
//! Document assembly, rendering and export live in `clinic-print-core`.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clinic_print_core::{
    config::{builtin_default_organization, default_organization_from_env_values},
    constants::{DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_DIR, DEFAULT_SPOOL_DIR},
    document::{OrganizationRecord, UserProfile},
    export_to_csv, export_to_pdf,
    filename::pdf_filename,
    layout::{orientation_from_env_value, page_format_from_env_value},
    ContextSource, DocumentAssembler, Export, FilenameStyle, HttpContextSource, Notice,
    PageLayout, PdfOptions, PrintAction, PrintConfig, PrintError, PrintRequest, PrintResult,
    PrintableDocument, Renderer, StaticContextSource, TargetRegistry,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

// ============================================================================
// STATE
// ============================================================================

/// Where the print context comes from.
#[derive(Clone, Debug)]
pub enum ContextProvider {
    /// The clinic API. A bearer token on the incoming request is forwarded to it.
    Http(HttpContextSource),
    /// Fixed values, for offline use and tests.
    Static(StaticContextSource),
}

impl ContextProvider {
    fn for_request(&self, headers: &HeaderMap) -> ContextProvider {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match (self, token) {
            (ContextProvider::Http(source), Some(token)) => {
                ContextProvider::Http(source.clone().with_bearer_token(token))
            }
            _ => self.clone(),
        }
    }
}

impl ContextSource for ContextProvider {
    async fn fetch_profile(&self) -> PrintResult<UserProfile> {
        match self {
            ContextProvider::Http(source) => source.fetch_profile().await,
            ContextProvider::Static(source) => source.fetch_profile().await,
        }
    }

    async fn fetch_organization(&self) -> PrintResult<OrganizationRecord> {
        match self {
            ContextProvider::Http(source) => source.fetch_organization().await,
            ContextProvider::Static(source) => source.fetch_organization().await,
        }
    }
}

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<PrintConfig>,
    context: ContextProvider,
    targets: TargetRegistry,
}

impl AppState {
    pub fn new(cfg: Arc<PrintConfig>, context: ContextProvider) -> Self {
        Self {
            cfg,
            context,
            targets: TargetRegistry::new(),
        }
    }
}

/// Resolves the print configuration from the process environment.
///
/// # Environment Variables
/// - `CLINIC_PRINT_API_URL`: clinic API base URL (default: `http://localhost:5000`)
/// - `CLINIC_PRINT_DEFAULT_ORG_NAME`, `CLINIC_PRINT_DEFAULT_ORG_ADDRESS`,
///   `CLINIC_PRINT_DEFAULT_ORG_PHONE`, `CLINIC_PRINT_DEFAULT_ORG_EMAIL`: fallback letterhead
/// - `CLINIC_PRINT_PAGE_FORMAT`: `a4`, `a5`, `letter` or `legal` (default: `a4`)
/// - `CLINIC_PRINT_ORIENTATION`: `portrait` or `landscape` (default: `portrait`)
/// - `CLINIC_PRINT_SPOOL_DIR`, `CLINIC_PRINT_DOWNLOAD_DIR`: output directories
pub fn config_from_env() -> anyhow::Result<PrintConfig> {
    let var = |name: &str| std::env::var(name).ok();

    let api_base_url =
        var("CLINIC_PRINT_API_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let default_organization = default_organization_from_env_values(
        var("CLINIC_PRINT_DEFAULT_ORG_NAME"),
        var("CLINIC_PRINT_DEFAULT_ORG_ADDRESS"),
        var("CLINIC_PRINT_DEFAULT_ORG_PHONE"),
        var("CLINIC_PRINT_DEFAULT_ORG_EMAIL"),
    );
    let page_layout = PageLayout::new(
        page_format_from_env_value(var("CLINIC_PRINT_PAGE_FORMAT"))?,
        orientation_from_env_value(var("CLINIC_PRINT_ORIENTATION"))?,
    );
    let spool_dir = var("CLINIC_PRINT_SPOOL_DIR").unwrap_or_else(|| DEFAULT_SPOOL_DIR.into());
    let download_dir =
        var("CLINIC_PRINT_DOWNLOAD_DIR").unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.into());

    Ok(PrintConfig::new(
        api_base_url,
        default_organization,
        page_layout,
        PathBuf::from(spool_dir),
        PathBuf::from(download_dir),
    )?)
}

// ============================================================================
// REQUESTS AND RESPONSES
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// A document to render or export.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderReq {
    /// `{kind, payload, patient, recordId?, createdAt?}`
    #[schema(value_type = Object)]
    pub document: PrintRequest,
    pub page_format: Option<String>,
    pub orientation: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfReq {
    #[schema(value_type = Object)]
    pub document: PrintRequest,
    /// Overrides the generated file name.
    pub filename: Option<String>,
    /// `patient-name` or `record-id`
    #[serde(default)]
    #[schema(value_type = String)]
    pub filename_style: FilenameStyle,
    pub page_format: Option<String>,
    pub orientation: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CsvReq {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<serde_json::Value>,
    pub filename: String,
}

/// Error body: the same short message a user would see.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub level: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    notice: Notice,
}

impl ApiError {
    fn new(action: PrintAction, error: PrintError) -> Self {
        let status = match &error {
            PrintError::InvalidInput(_) | PrintError::Text(_) => StatusCode::BAD_REQUEST,
            PrintError::TargetNotFound(_) => StatusCode::NOT_FOUND,
            PrintError::TargetBusy(_) => StatusCode::CONFLICT,
            PrintError::EmptyExport => StatusCode::UNPROCESSABLE_ENTITY,
            PrintError::ProfileFetch(_)
            | PrintError::ProfileStatus(_)
            | PrintError::ProfileUnavailable => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{:?} error: {:?}", action, error);
        } else {
            tracing::warn!("{:?} rejected: {}", action, error);
        }
        let notice = match &error {
            PrintError::InvalidInput(_) | PrintError::Text(_) => Notice::error(error.to_string()),
            _ => Notice::for_failure(action, &error),
        };
        Self { status, notice }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.notice)).into_response()
    }
}

// ============================================================================
// ROUTER
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    paths(health, render_document, export_pdf, export_csv),
    components(schemas(HealthRes, RenderReq, PdfReq, CsvReq, ErrorRes))
)]
struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/print/render", post(render_document))
        .route("/print/pdf", post(export_pdf))
        .route("/export/csv", post(export_csv))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Default letterhead-only state, used when no clinic API is reachable.
pub fn offline_state(cfg: Arc<PrintConfig>, profile: UserProfile) -> AppState {
    AppState::new(
        cfg,
        ContextProvider::Static(StaticContextSource::new(profile, None)),
    )
}

fn request_layout(
    cfg: &PrintConfig,
    page_format: Option<String>,
    orientation: Option<String>,
) -> PrintResult<PageLayout> {
    let default = cfg.page_layout();
    Ok(PageLayout::new(
        match page_format {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => default.format,
        },
        match orientation {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => default.orientation,
        },
    ))
}

async fn assemble(
    state: &AppState,
    headers: &HeaderMap,
    request: PrintRequest,
    action: PrintAction,
) -> Result<PrintableDocument, ApiError> {
    let source = state.context.for_request(headers);
    let assembler = DocumentAssembler::new(state.cfg.clone())
        .resolve(&source)
        .await
        .map_err(|e| ApiError::new(action, e))?;
    assembler
        .assemble(request)
        .map_err(|e| ApiError::new(action, e))
}

fn download(export: Export) -> Response {
    (
        [
            (header::CONTENT_TYPE, export.mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.bytes,
    )
        .into_response()
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Clinic print API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/print/render",
    request_body = RenderReq,
    responses(
        (status = 200, description = "Printable HTML document", content_type = "text/html"),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 502, description = "User profile unavailable", body = ErrorRes)
    )
)]
/// Render a document to printable HTML
///
/// The response is a complete HTML page that opens the print dialog when loaded.
#[axum::debug_handler]
async fn render_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RenderReq>,
) -> Result<Html<String>, ApiError> {
    let layout = request_layout(&state.cfg, req.page_format, req.orientation)
        .map_err(|e| ApiError::new(PrintAction::Print, e))?;
    let document = assemble(&state, &headers, req.document, PrintAction::Print).await?;
    Ok(Html(Renderer::new(layout).render(&document)))
}

#[utoipa::path(
    post,
    path = "/print/pdf",
    request_body = PdfReq,
    responses(
        (status = 200, description = "PDF download", content_type = "application/pdf"),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 502, description = "User profile unavailable", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Export a document as a PDF download
#[axum::debug_handler]
async fn export_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PdfReq>,
) -> Result<Response, ApiError> {
    let layout = request_layout(&state.cfg, req.page_format, req.orientation)
        .map_err(|e| ApiError::new(PrintAction::ExportPdf, e))?;
    let document = assemble(&state, &headers, req.document, PrintAction::ExportPdf).await?;

    let filename = req
        .filename
        .unwrap_or_else(|| pdf_filename(&document, req.filename_style));
    let options = PdfOptions::new(filename)
        .with_organization(document.organization().name.clone())
        .with_layout(layout);

    let target_id = Uuid::new_v4().to_string();
    state.targets.register_document(target_id.as_str(), &document);
    let result = export_to_pdf(&state.targets, &target_id, &options);
    state.targets.remove(&target_id);

    let export = result.map_err(|e| ApiError::new(PrintAction::ExportPdf, e))?;
    Ok(download(export))
}

#[utoipa::path(
    post,
    path = "/export/csv",
    request_body = CsvReq,
    responses(
        (status = 200, description = "CSV download", content_type = "text/csv"),
        (status = 422, description = "No records to export", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Export flat records as a CSV download
#[axum::debug_handler]
async fn export_csv(
    State(_state): State<AppState>,
    Json(req): Json<CsvReq>,
) -> Result<Response, ApiError> {
    let export = export_to_csv(&req.records, &req.filename)
        .map_err(|e| ApiError::new(PrintAction::ExportCsv, e))?;
    Ok(download(export))
}

/// A config with the built-in fallback letterhead, for tests and offline runs.
pub fn default_config() -> PrintResult<PrintConfig> {
    PrintConfig::new(
        DEFAULT_API_BASE_URL,
        builtin_default_organization(),
        PageLayout::default(),
        PathBuf::from(DEFAULT_SPOOL_DIR),
        PathBuf::from(DEFAULT_DOWNLOAD_DIR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let profile = UserProfile {
            title: Some("Dr.".into()),
            first_name: Some("Kemi".into()),
            last_name: Some("Okafor".into()),
            role: Some("doctor".into()),
            ..Default::default()
        };
        router(offline_state(Arc::new(default_config().unwrap()), profile))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn lab_order() -> Value {
        json!({
            "kind": "lab-order",
            "payload": {"id": "lab-9", "tests": [{"name": "Lipid Panel"}]},
            "patient": {"id": "P-1", "firstName": "Amara", "lastName": "Obi"}
        })
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn render_uses_default_letterhead_when_offline() {
        let response = app()
            .oneshot(post_json("/print/render", json!({"document": lab_order()})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Medical Clinic"));
        assert!(html.contains("LABORATORY ORDER"));
        assert!(html.contains("1. Lipid Panel"));
        assert!(html.contains("Dr. Kemi Okafor"));
    }

    #[tokio::test]
    async fn untagged_prescription_renders_its_medication() {
        let document = json!({
            "kind": "prescription",
            "payload": {
                "medicationName": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "3x daily",
                "duration": "7 days",
                "prescribedBy": "Okafor"
            },
            "patient": {"id": "P-1", "firstName": "Amara", "lastName": "Obi"}
        });
        let response = app()
            .oneshot(post_json("/print/render", json!({"document": document})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Amoxicillin"));
        assert!(!html.contains("Content not available."));
    }

    #[tokio::test]
    async fn unsupported_page_format_is_rejected() {
        let response = app()
            .oneshot(post_json(
                "/print/render",
                json!({"document": lab_order(), "pageFormat": "b5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pdf_is_downloaded_with_record_id_name() {
        let response = app()
            .oneshot(post_json(
                "/print/pdf",
                json!({"document": lab_order(), "filenameStyle": "record-id"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"lab-order-lab-9-"));
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn csv_export_and_empty_input() {
        let response = app()
            .oneshot(post_json(
                "/export/csv",
                json!({"records": [{"a": 1, "b": "x"}, {"a": 2, "b": "y"}], "filename": "rows"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"rows.csv\""
        );
        assert_eq!(body_bytes(response).await, b"a,b\n1,x\n2,y\n");

        let response = app()
            .oneshot(post_json(
                "/export/csv",
                json!({"records": [], "filename": "rows"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["message"], "No data to export");
    }
}
