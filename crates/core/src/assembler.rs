//! Data assembler.
//!
//! Fetches the print context (who is printing, for which organization) and bundles it with a
//! record into an immutable [`PrintableDocument`].
//!
//! ## Architecture
//!
//! - [`ContextSource`] abstracts the two context endpoints. [`HttpContextSource`] calls them over
//!   HTTP; [`StaticContextSource`] serves fixed values for offline rendering and tests.
//! - [`DocumentAssembler`] uses the type-state pattern: documents can only be assembled once the
//!   context has been resolved, so the renderer never sees a document without an organization.
//!
//! A failed profile fetch is an error. A failed organization fetch is not: it is logged and the
//! configured default letterhead is used instead.

use crate::config::PrintConfig;
use crate::constants::{
    DEFAULT_ORGANIZATION_NAME, DEFAULT_ORGANIZATION_TYPE, DEFAULT_THEME_COLOR, DRAFT_RECORD_ID,
    FALLBACK_ROLE, ORGANIZATION_ENDPOINT, PROFILE_ENDPOINT,
};
use crate::document::{
    DocumentContent, DocumentKind, DocumentParts, OrganizationInfo, OrganizationRecord,
    PatientInfo, PatientRecord, PrintableDocument, StaffInfo, UserProfile,
};
use crate::format::parse_timestamp;
use crate::markup::present;
use crate::names::{capitalize, display_name, NameParts};
use crate::{PrintError, PrintResult};
use chrono::{DateTime, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// CONTEXT SOURCES
// ============================================================================

/// Source of the acting user's profile and the active organization's print metadata.
pub trait ContextSource {
    fn fetch_profile(&self) -> impl Future<Output = PrintResult<UserProfile>> + Send;

    fn fetch_organization(&self) -> impl Future<Output = PrintResult<OrganizationRecord>> + Send;
}

/// Calls `GET {base}/api/profile` and `GET {base}/api/print/organization`.
///
/// Both endpoints may answer with the bare record or with a `{"success": .., "data": ..}`
/// envelope.
#[derive(Clone, Debug)]
pub struct HttpContextSource {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpContextSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    pub fn from_config(cfg: &PrintConfig) -> Self {
        Self::new(cfg.api_base_url())
    }

    /// Sends `Authorization: Bearer <token>` with both requests.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Strips a response envelope. `None` when the envelope reports failure.
fn unwrap_envelope(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                return None;
            }
            match map.remove("data") {
                Some(data @ Value::Object(_)) => Some(data),
                _ => Some(Value::Object(map)),
            }
        }
        other => Some(other),
    }
}

impl ContextSource for HttpContextSource {
    async fn fetch_profile(&self) -> PrintResult<UserProfile> {
        let response = self
            .get(PROFILE_ENDPOINT)
            .send()
            .await
            .map_err(PrintError::ProfileFetch)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::ProfileStatus(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(PrintError::ProfileFetch)?;
        let body = unwrap_envelope(body).ok_or(PrintError::ProfileUnavailable)?;
        serde_json::from_value(body).map_err(PrintError::Deserialization)
    }

    async fn fetch_organization(&self) -> PrintResult<OrganizationRecord> {
        let response = self
            .get(ORGANIZATION_ENDPOINT)
            .send()
            .await
            .map_err(PrintError::OrganizationFetch)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::OrganizationStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(PrintError::OrganizationFetch)?;
        let body = unwrap_envelope(body).ok_or(PrintError::OrganizationUnavailable)?;
        serde_json::from_value(body).map_err(PrintError::Deserialization)
    }
}

/// Serves a fixed profile and, optionally, a fixed organization.
///
/// With no organization every fetch reports the organization as unavailable, which makes the
/// assembler fall back to the default letterhead.
#[derive(Clone, Debug, Default)]
pub struct StaticContextSource {
    profile: UserProfile,
    organization: Option<OrganizationRecord>,
}

impl StaticContextSource {
    pub fn new(profile: UserProfile, organization: Option<OrganizationRecord>) -> Self {
        Self {
            profile,
            organization,
        }
    }
}

impl ContextSource for StaticContextSource {
    async fn fetch_profile(&self) -> PrintResult<UserProfile> {
        Ok(self.profile.clone())
    }

    async fn fetch_organization(&self) -> PrintResult<OrganizationRecord> {
        self.organization
            .clone()
            .ok_or(PrintError::OrganizationUnavailable)
    }
}

// ============================================================================
// CONTEXT SHAPING
// ============================================================================

/// Who is printing and under which letterhead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintContext {
    pub current_user: StaffInfo,
    pub organization: OrganizationInfo,
}

pub fn format_patient_info(patient: &PatientRecord) -> PatientInfo {
    PatientInfo {
        id: patient.id.trim().to_string(),
        full_name: display_name(&NameParts {
            title: patient.title.as_deref(),
            first_name: patient.first_name.as_deref(),
            last_name: patient.last_name.as_deref(),
            username: None,
        }),
        first_name: present(patient.first_name.as_deref()).map(str::to_string),
        last_name: present(patient.last_name.as_deref()).map(str::to_string),
        date_of_birth: present(patient.date_of_birth.as_deref()).map(str::to_string),
        gender: present(patient.gender.as_deref()).map(str::to_string),
        phone: present(patient.phone.as_deref()).map(str::to_string),
        address: present(patient.address.as_deref()).map(str::to_string),
    }
}

pub fn format_staff_info(profile: &UserProfile) -> StaffInfo {
    StaffInfo {
        full_name: display_name(&NameParts {
            title: profile.title.as_deref(),
            first_name: profile.first_name.as_deref(),
            last_name: profile.last_name.as_deref(),
            username: profile.username.as_deref(),
        }),
        role: present(profile.role.as_deref())
            .map(capitalize)
            .unwrap_or_else(|| FALLBACK_ROLE.to_string()),
        phone: present(profile.phone.as_deref()).map(str::to_string),
    }
}

pub fn format_organization_info(record: &OrganizationRecord) -> OrganizationInfo {
    let keep = |value: &Option<String>| present(value.as_deref()).map(str::to_string);
    OrganizationInfo {
        name: present(record.name.as_deref())
            .unwrap_or(DEFAULT_ORGANIZATION_NAME)
            .to_string(),
        org_type: present(record.org_type.as_deref())
            .unwrap_or(DEFAULT_ORGANIZATION_TYPE)
            .to_string(),
        address: keep(&record.address),
        phone: keep(&record.phone),
        email: keep(&record.email),
        website: keep(&record.website),
        logo_url: keep(&record.logo_url),
        theme_color: present(record.theme_color.as_deref())
            .unwrap_or(DEFAULT_THEME_COLOR)
            .to_string(),
    }
}

/// Fetches the profile, then the organization.
///
/// Profile errors propagate. Organization errors, including a record without a name, are logged
/// and replaced by `default_organization`.
pub async fn fetch_print_context<C: ContextSource>(
    source: &C,
    default_organization: &OrganizationInfo,
) -> PrintResult<PrintContext> {
    let profile = source.fetch_profile().await?;
    let current_user = format_staff_info(&profile);

    let organization = match source.fetch_organization().await {
        Ok(record) if present(record.name.as_deref()).is_some() => {
            format_organization_info(&record)
        }
        Ok(_) => {
            tracing::warn!("organization record has no name, using default letterhead");
            default_organization.clone()
        }
        Err(e) => {
            tracing::warn!("organization metadata unavailable, using default letterhead: {}", e);
            default_organization.clone()
        }
    };

    tracing::debug!(
        user = %current_user.full_name,
        organization = %organization.name,
        "print context resolved"
    );

    Ok(PrintContext {
        current_user,
        organization,
    })
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// A record to print, as sent by the caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    pub kind: DocumentKind,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub patient: PatientRecord,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn payload_text(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(key)? {
        Value::String(s) => present(Some(s.as_str())).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn resolve_created_at(request: &PrintRequest, printed_at: DateTime<Utc>) -> DateTime<Utc> {
    request
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| {
            payload_text(&request.payload, &["createdAt", "created_at"])
                .as_deref()
                .and_then(parse_timestamp)
        })
        .unwrap_or(printed_at)
}

fn resolve_record_id(request: &PrintRequest) -> PrintResult<NonEmptyText> {
    let candidate = NonEmptyText::from_optional(request.record_id.as_deref())
        .or_else(|| NonEmptyText::from_optional(payload_text(&request.payload, &["id"])));
    match candidate {
        Some(id) => Ok(id),
        None => Ok(NonEmptyText::new(DRAFT_RECORD_ID)?),
    }
}

/// Marker type: print context not fetched yet.
#[derive(Clone, Copy, Debug)]
pub struct Unresolved;

/// Marker type: print context available.
#[derive(Clone, Debug)]
pub struct Resolved {
    context: PrintContext,
}

/// Builds printable documents.
///
/// Generic parameter `S` is either `Unresolved` or `Resolved`.
#[derive(Clone, Debug)]
pub struct DocumentAssembler<S> {
    cfg: Arc<PrintConfig>,
    state: S,
}

impl DocumentAssembler<Unresolved> {
    pub fn new(cfg: Arc<PrintConfig>) -> Self {
        Self {
            cfg,
            state: Unresolved,
        }
    }

    /// Fetches the print context from `source`, falling back to the configured default
    /// organization when its metadata is unavailable.
    pub async fn resolve<C: ContextSource>(
        self,
        source: &C,
    ) -> PrintResult<DocumentAssembler<Resolved>> {
        let context = fetch_print_context(source, self.cfg.default_organization()).await?;
        Ok(DocumentAssembler {
            cfg: self.cfg,
            state: Resolved { context },
        })
    }
}

impl DocumentAssembler<Resolved> {
    pub fn context(&self) -> &PrintContext {
        &self.state.context
    }

    /// Assembles `request`, stamping the current time as the print time.
    pub fn assemble(&self, request: PrintRequest) -> PrintResult<PrintableDocument> {
        self.assemble_at(request, Utc::now())
    }

    pub fn assemble_at(
        &self,
        request: PrintRequest,
        printed_at: DateTime<Utc>,
    ) -> PrintResult<PrintableDocument> {
        let created_at = resolve_created_at(&request, printed_at);
        let record_id = resolve_record_id(&request)?;
        let patient = format_patient_info(&request.patient);
        let content = DocumentContent::from_payload(&request.kind, request.payload);

        tracing::info!(
            kind = %request.kind,
            record_id = %record_id,
            "assembled printable document"
        );

        Ok(PrintableDocument::from_parts(DocumentParts {
            kind: request.kind,
            content,
            organization: self.state.context.organization.clone(),
            patient,
            issuer: self.state.context.current_user.clone(),
            created_at,
            record_id,
            printed_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_default_organization;
    use crate::layout::PageLayout;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::json;

    fn cfg() -> Arc<PrintConfig> {
        Arc::new(
            PrintConfig::new(
                "http://localhost:5000",
                builtin_default_organization(),
                PageLayout::default(),
                "spool".into(),
                "downloads".into(),
            )
            .unwrap(),
        )
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn profile_json() -> Value {
        json!({"username": "kokafor", "title": "Dr.", "firstName": "Kemi", "lastName": "Okafor", "role": "doctor"})
    }

    #[test]
    fn staff_info_capitalizes_role_and_defaults_to_staff() {
        let staff = format_staff_info(&UserProfile {
            username: Some("jdoe".into()),
            role: Some("NURSE".into()),
            ..Default::default()
        });
        assert_eq!(staff.full_name, "jdoe");
        assert_eq!(staff.role, "Nurse");

        let unknown = format_staff_info(&UserProfile::default());
        assert_eq!(unknown.full_name, "User");
        assert_eq!(unknown.role, "Staff");
    }

    #[test]
    fn organization_info_drops_blank_fields_and_defaults_theme() {
        let org = format_organization_info(&OrganizationRecord {
            name: Some("Harbor Clinic".into()),
            phone: Some("  ".into()),
            email: Some("hi@harbor.example".into()),
            ..Default::default()
        });
        assert_eq!(org.org_type, "clinic");
        assert_eq!(org.phone, None);
        assert_eq!(org.email.as_deref(), Some("hi@harbor.example"));
        assert_eq!(org.theme_color, "#2563eb");
    }

    #[test]
    fn envelope_is_unwrapped_or_rejected() {
        assert_eq!(
            unwrap_envelope(json!({"success": true, "data": {"name": "A"}})),
            Some(json!({"name": "A"}))
        );
        assert_eq!(unwrap_envelope(json!({"success": false})), None);
        assert_eq!(
            unwrap_envelope(json!({"name": "A"})),
            Some(json!({"name": "A"}))
        );
    }

    #[tokio::test]
    async fn http_source_reads_both_endpoints_with_bearer_token() {
        let app = Router::new()
            .route(
                "/api/profile",
                get(|headers: axum::http::HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer secret") => Ok(Json(profile_json())),
                        _ => Err(StatusCode::UNAUTHORIZED),
                    }
                }),
            )
            .route(
                "/api/print/organization",
                get(|| async {
                    Json(json!({"success": true, "data": {"name": "Harbor Clinic", "type": "hospital", "themeColor": "#0f766e"}}))
                }),
            );
        let base = serve(app).await;
        let source = HttpContextSource::new(&base).with_bearer_token("secret");

        let context = fetch_print_context(&source, &builtin_default_organization())
            .await
            .unwrap();
        assert_eq!(context.current_user.full_name, "Dr. Kemi Okafor");
        assert_eq!(context.current_user.role, "Doctor");
        assert_eq!(context.organization.name, "Harbor Clinic");
        assert_eq!(context.organization.org_type, "hospital");

        let anonymous = HttpContextSource::new(&base);
        assert!(matches!(
            anonymous.fetch_profile().await,
            Err(PrintError::ProfileStatus(401))
        ));
    }

    #[tokio::test]
    async fn organization_failure_falls_back_to_default() {
        let app = Router::new()
            .route("/api/profile", get(|| async { Json(profile_json()) }))
            .route(
                "/api/print/organization",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let base = serve(app).await;
        let default_org = builtin_default_organization();

        let context = fetch_print_context(&HttpContextSource::new(&base), &default_org)
            .await
            .unwrap();
        assert_eq!(context.organization, default_org);
    }

    #[tokio::test]
    async fn organization_envelope_failure_falls_back_to_default() {
        let app = Router::new()
            .route("/api/profile", get(|| async { Json(profile_json()) }))
            .route(
                "/api/print/organization",
                get(|| async { Json(json!({"success": false, "message": "no org"})) }),
            );
        let base = serve(app).await;
        let mut custom = builtin_default_organization();
        custom.name = "Fallback Test Clinic".into();

        let context = fetch_print_context(&HttpContextSource::new(&base), &custom)
            .await
            .unwrap();
        assert_eq!(context.organization.name, "Fallback Test Clinic");
    }

    #[tokio::test]
    async fn profile_failure_propagates() {
        let app = Router::new().route(
            "/api/profile",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = serve(app).await;

        let result =
            fetch_print_context(&HttpContextSource::new(&base), &builtin_default_organization())
                .await;
        assert!(matches!(result, Err(PrintError::ProfileStatus(503))));
    }

    #[tokio::test]
    async fn assembler_fills_record_id_and_dates() {
        let source = StaticContextSource::new(
            serde_json::from_value(profile_json()).unwrap(),
            None,
        );
        let assembler = DocumentAssembler::new(cfg()).resolve(&source).await.unwrap();
        assert_eq!(assembler.context().organization.name, "Medical Clinic");

        let printed_at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let request: PrintRequest = serde_json::from_value(json!({
            "kind": "lab-order",
            "payload": {"id": 77, "createdAt": "2024-03-01T08:15:00Z", "tests": []},
            "patient": {"id": 42, "firstName": "Amara", "lastName": "Obi", "title": "none"}
        }))
        .unwrap();
        let doc = assembler.assemble_at(request, printed_at).unwrap();

        assert_eq!(doc.kind(), &DocumentKind::LabOrder);
        assert_eq!(doc.record_id().as_str(), "77");
        assert_eq!(
            doc.created_at(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap()
        );
        assert_eq!(doc.printed_at(), printed_at);
        assert_eq!(doc.patient().full_name, "Amara Obi");
        assert_eq!(doc.patient().id, "42");
        assert_eq!(doc.issuer().full_name, "Dr. Kemi Okafor");
    }

    #[tokio::test]
    async fn draft_documents_default_to_print_time() {
        let assembler = DocumentAssembler::new(cfg())
            .resolve(&StaticContextSource::default())
            .await
            .unwrap();
        let printed_at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let request = PrintRequest {
            kind: DocumentKind::Consultation,
            record_id: Some("   ".into()),
            ..Default::default()
        };

        let doc = assembler.assemble_at(request, printed_at).unwrap();
        assert_eq!(doc.record_id().as_str(), "draft");
        assert_eq!(doc.created_at(), printed_at);
        assert_eq!(doc.issuer().full_name, "User");
    }

    #[tokio::test]
    async fn untagged_prescription_is_assembled_by_shape() {
        let assembler = DocumentAssembler::new(cfg())
            .resolve(&StaticContextSource::default())
            .await
            .unwrap();
        let request: PrintRequest = serde_json::from_value(json!({
            "kind": "prescription",
            "payload": {
                "medicationName": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "3x daily",
                "duration": "7 days",
                "prescribedBy": "Okafor"
            }
        }))
        .unwrap();
        let doc = assembler.assemble(request).unwrap();
        assert!(matches!(
            doc.content(),
            DocumentContent::Prescription(crate::document::Prescription::Flat(_))
        ));

        let request: PrintRequest = serde_json::from_value(json!({
            "kind": "prescription",
            "payload": {"doctor": {}, "patient": {}, "medications": [{"name": "Metformin"}]}
        }))
        .unwrap();
        let doc = assembler.assemble(request).unwrap();
        assert!(matches!(
            doc.content(),
            DocumentContent::Prescription(crate::document::Prescription::Structured(_))
        ));
    }
}
