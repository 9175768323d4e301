//! Constants used throughout the print core crate.
//!
//! Fallback texts, endpoint paths and layout values live here so the renderer, the sinks and the
//! tests agree on them.

/// Path of the current user's profile endpoint, relative to the API base URL.
pub const PROFILE_ENDPOINT: &str = "/api/profile";

/// Path of the organization print-metadata endpoint, relative to the API base URL.
pub const ORGANIZATION_ENDPOINT: &str = "/api/print/organization";

/// Default API base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Letterhead used when organization metadata cannot be fetched.
pub const DEFAULT_ORGANIZATION_NAME: &str = "Medical Clinic";
pub const DEFAULT_ORGANIZATION_TYPE: &str = "clinic";
pub const DEFAULT_ORGANIZATION_ADDRESS: &str = "123 Healthcare Street, Medical City";
pub const DEFAULT_ORGANIZATION_PHONE: &str = "+1 (555) 123-4567";
pub const DEFAULT_ORGANIZATION_EMAIL: &str = "info@medicalclinic.com";

/// Theme colour used when the organization does not define one.
pub const DEFAULT_THEME_COLOR: &str = "#2563eb";

/// Name shown when neither a personal name nor a username is known.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Role shown when the issuer's role is unknown.
pub const FALLBACK_ROLE: &str = "Staff";

/// Record identifier used when a document has not been saved yet.
pub const DRAFT_RECORD_ID: &str = "draft";

pub const NOT_AVAILABLE: &str = "N/A";
pub const AS_PRESCRIBED: &str = "As prescribed";
pub const AS_DIRECTED: &str = "As directed";
pub const NONE_RECORDED: &str = "None recorded";
pub const CONTENT_NOT_AVAILABLE: &str = "Content not available.";
pub const NO_LAB_TESTS: &str = "No laboratory tests ordered.";

/// Days before expiry at which an insurance policy is flagged as expiring soon.
pub const INSURANCE_EXPIRY_WARNING_DAYS: i64 = 30;

/// Page margin applied on every side of exported PDF pages, in millimetres.
pub const PDF_MARGIN_MM: f32 = 10.0;

/// Default directory for print spool files.
pub const DEFAULT_SPOOL_DIR: &str = "print_spool";

/// Default directory for downloaded exports.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
