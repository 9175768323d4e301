//! The printable document value and the records it is assembled from.
//!
//! Source records (`PatientRecord`, `UserProfile`, `OrganizationRecord` and the per-kind payloads)
//! mirror the camelCase JSON the surrounding application sends. They are deliberately lenient:
//! every field is optional and scalar fields accept numbers as well as strings, because a payload
//! that cannot be read only ever degrades to fallback text on the printed page.

use chrono::{DateTime, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which content section a document renders.
///
/// Tags are kebab-case strings. Any tag outside the known set parses as `Unknown` rather than
/// failing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentKind {
    Prescription,
    LabOrder,
    Consultation,
    PatientSummary,
    Insurance,
    Unknown(String),
}

impl DocumentKind {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentKind::Prescription => "prescription",
            DocumentKind::LabOrder => "lab-order",
            DocumentKind::Consultation => "consultation",
            DocumentKind::PatientSummary => "patient-summary",
            DocumentKind::Insurance => "insurance",
            DocumentKind::Unknown(tag) => tag,
        }
    }

    /// Banner text printed under the letterhead.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Prescription => "PRESCRIPTION",
            DocumentKind::LabOrder => "LABORATORY ORDER",
            DocumentKind::Consultation => "CONSULTATION RECORD",
            DocumentKind::PatientSummary => "PATIENT SUMMARY",
            DocumentKind::Insurance => "INSURANCE DETAILS",
            DocumentKind::Unknown(_) => "MEDICAL DOCUMENT",
        }
    }
}

impl Default for DocumentKind {
    fn default() -> Self {
        DocumentKind::Unknown(String::new())
    }
}

impl FromStr for DocumentKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('_', "-");
        Ok(match tag.as_str() {
            "prescription" => DocumentKind::Prescription,
            "lab-order" => DocumentKind::LabOrder,
            "consultation" => DocumentKind::Consultation,
            "patient-summary" => DocumentKind::PatientSummary,
            "insurance" => DocumentKind::Insurance,
            _ => DocumentKind::Unknown(s.trim().to_string()),
        })
    }
}

impl From<String> for DocumentKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<DocumentKind> for String {
    fn from(value: DocumentKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SOURCE RECORDS
// ============================================================================

/// Patient record as supplied by the calling page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecord {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Response of the current-user profile endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub username: Option<String>,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: Option<String>,
}

/// Response of the organization print-metadata endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
}

// ============================================================================
// RESOLVED CONTEXT
// ============================================================================

/// Letterhead data. Always complete once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub theme_color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub id: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffInfo {
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
}

// ============================================================================
// PAYLOADS
// ============================================================================

/// A prescription payload, in the shape named by its `variant` tag.
///
/// Payloads without a tag are tagged by [`DocumentContent::from_payload`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum Prescription {
    Flat(FlatPrescription),
    Structured(StructuredPrescription),
}

/// A single-medication prescription record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlatPrescription {
    #[serde(deserialize_with = "lenient::text")]
    pub medication_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub dosage: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub frequency: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub instructions: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prescribed_by: Option<String>,
}

/// A multi-medication prescription with nested doctor, clinic and patient details.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredPrescription {
    #[serde(deserialize_with = "lenient::record")]
    pub doctor: Option<PrescribingDoctor>,
    #[serde(deserialize_with = "lenient::record")]
    pub clinic: Option<ClinicDetails>,
    #[serde(deserialize_with = "lenient::record")]
    pub patient: Option<PrescriptionPatient>,
    #[serde(deserialize_with = "lenient::text")]
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "lenient::vec")]
    pub medications: Vec<MedicationLine>,
    #[serde(deserialize_with = "lenient::list")]
    pub special_instructions: Vec<String>,
    #[serde(deserialize_with = "lenient::record")]
    pub future_needs: Option<FutureNeeds>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescribingDoctor {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub qualification: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub specialization: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub registration_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescriptionPatient {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub age: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub weight: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationLine {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub dosage: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub frequency: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub route: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub quantity: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FutureNeeds {
    #[serde(deserialize_with = "lenient::text")]
    pub next_review_date: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub additional_tests: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabOrder {
    #[serde(deserialize_with = "lenient::vec")]
    pub tests: Vec<LabTest>,
    #[serde(deserialize_with = "lenient::text")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub instructions: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabTest {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consultation {
    #[serde(deserialize_with = "lenient::text")]
    pub consultation_type: Option<String>,
    /// Free-form form fields, kept in the order the form produced them.
    #[serde(deserialize_with = "lenient::map")]
    pub form_data: serde_json::Map<String, serde_json::Value>,
    #[serde(deserialize_with = "lenient::text")]
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub treatment_plan: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientSummary {
    #[serde(deserialize_with = "lenient::text")]
    pub blood_group: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub allergies: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub chronic_conditions: Vec<String>,
    #[serde(deserialize_with = "lenient::vec")]
    pub current_medications: Vec<SummaryMedication>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: Option<String>,
}

/// A current medication, either a bare name or a detailed entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryMedication {
    Name(String),
    Detailed(MedicationLine),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsurancePolicy {
    #[serde(deserialize_with = "lenient::text")]
    pub provider: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub policy_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub group_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub holder_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub coverage_type: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub coverage_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub expiry_date: Option<String>,
}

/// Typed content of a printable document.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentContent {
    Prescription(Prescription),
    LabOrder(LabOrder),
    Consultation(Consultation),
    PatientSummary(PatientSummary),
    Insurance(InsurancePolicy),
    /// The kind is unknown or its payload could not be read.
    Unavailable,
}

impl DocumentContent {
    /// Reads a raw payload for `kind`. Never fails: unreadable payloads become `Unavailable`.
    pub fn from_payload(kind: &DocumentKind, payload: serde_json::Value) -> Self {
        let payload = match payload {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        fn read<T: serde::de::DeserializeOwned>(
            kind: &DocumentKind,
            payload: serde_json::Value,
        ) -> Option<T> {
            match serde_json::from_value(payload) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("unreadable {} payload: {}", kind, e);
                    None
                }
            }
        }

        let content = match kind {
            DocumentKind::Prescription => {
                read(kind, with_prescription_variant(payload)).map(DocumentContent::Prescription)
            }
            DocumentKind::LabOrder => read(kind, payload).map(DocumentContent::LabOrder),
            DocumentKind::Consultation => read(kind, payload).map(DocumentContent::Consultation),
            DocumentKind::PatientSummary => {
                read(kind, payload).map(DocumentContent::PatientSummary)
            }
            DocumentKind::Insurance => read(kind, payload).map(DocumentContent::Insurance),
            DocumentKind::Unknown(_) => None,
        };
        content.unwrap_or(DocumentContent::Unavailable)
    }
}

/// Tags an untagged prescription: `structured` when it carries a doctor, a patient or a
/// medication list, `flat` otherwise.
fn with_prescription_variant(mut payload: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut payload {
        if map.get("variant").map_or(true, serde_json::Value::is_null) {
            let structured = ["doctor", "patient", "medications"]
                .iter()
                .any(|key| map.get(*key).is_some_and(|v| !v.is_null()));
            let variant = if structured { "structured" } else { "flat" };
            map.insert("variant".into(), variant.into());
        }
    }
    payload
}

// ============================================================================
// PRINTABLE DOCUMENT
// ============================================================================

/// Everything needed to construct a [`PrintableDocument`].
///
/// Crate-private: `content` must have been read for `kind`, which only the assembler guarantees.
#[derive(Clone, Debug)]
pub(crate) struct DocumentParts {
    pub(crate) kind: DocumentKind,
    pub(crate) content: DocumentContent,
    pub(crate) organization: OrganizationInfo,
    pub(crate) patient: PatientInfo,
    pub(crate) issuer: StaffInfo,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) record_id: NonEmptyText,
    pub(crate) printed_at: DateTime<Utc>,
}

/// A record bundled with its patient, organization and issuer context, ready for rendering.
///
/// The value owns snapshots of everything it was built from and has no setters, so a rendered
/// document never changes underneath the caller.
#[derive(Clone, Debug)]
pub struct PrintableDocument {
    kind: DocumentKind,
    content: DocumentContent,
    organization: OrganizationInfo,
    patient: PatientInfo,
    issuer: StaffInfo,
    created_at: DateTime<Utc>,
    record_id: NonEmptyText,
    printed_at: DateTime<Utc>,
}

impl PrintableDocument {
    pub(crate) fn from_parts(parts: DocumentParts) -> Self {
        Self {
            kind: parts.kind,
            content: parts.content,
            organization: parts.organization,
            patient: parts.patient,
            issuer: parts.issuer,
            created_at: parts.created_at,
            record_id: parts.record_id,
            printed_at: parts.printed_at,
        }
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    pub fn organization(&self) -> &OrganizationInfo {
        &self.organization
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn issuer(&self) -> &StaffInfo {
        &self.issuer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn record_id(&self) -> &NonEmptyText {
        &self.record_id
    }

    /// When the print action was triggered; shown in the footer.
    pub fn printed_at(&self) -> DateTime<Utc> {
        self.printed_at
    }
}

/// Deserializers that accept whatever scalar shape the UI happened to send.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.unwrap_or_default())
    }

    /// A list of strings, a single string (one entry per line), or nothing.
    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = match Value::deserialize(deserializer)? {
            Value::Array(values) => values.into_iter().filter_map(scalar).collect(),
            Value::String(s) => s.lines().map(str::to_string).collect(),
            other => scalar(other).into_iter().collect(),
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// A list of records. `null` or a non-list is empty and unreadable entries are dropped.
    pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(values) => values
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    /// A nested record, or `None` when it is missing or not an object.
    pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        })
    }
}
