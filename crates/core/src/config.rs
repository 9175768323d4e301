//! Print pipeline runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the assembler and the
//! sinks as `Arc<PrintConfig>`. Nothing in request handling reads environment variables.

use crate::constants::{
    DEFAULT_ORGANIZATION_ADDRESS, DEFAULT_ORGANIZATION_EMAIL, DEFAULT_ORGANIZATION_NAME,
    DEFAULT_ORGANIZATION_PHONE, DEFAULT_ORGANIZATION_TYPE, DEFAULT_THEME_COLOR,
};
use crate::document::OrganizationInfo;
use crate::layout::PageLayout;
use crate::markup::present;
use crate::{PrintError, PrintResult};
use std::path::{Path, PathBuf};

/// Print configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct PrintConfig {
    api_base_url: String,
    default_organization: OrganizationInfo,
    page_layout: PageLayout,
    spool_dir: PathBuf,
    download_dir: PathBuf,
}

impl PrintConfig {
    /// Create a new `PrintConfig`.
    ///
    /// The base URL must be an absolute `http(s)` URL; a trailing slash is removed. The default
    /// organization must have a name.
    pub fn new(
        api_base_url: impl Into<String>,
        default_organization: OrganizationInfo,
        page_layout: PageLayout,
        spool_dir: PathBuf,
        download_dir: PathBuf,
    ) -> PrintResult<Self> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(PrintError::InvalidInput(format!(
                "api base url must start with http:// or https://: {api_base_url:?}"
            )));
        }
        if default_organization.name.trim().is_empty() {
            return Err(PrintError::InvalidInput(
                "default organization name cannot be empty".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            default_organization,
            page_layout,
            spool_dir,
            download_dir,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Letterhead substituted when organization metadata cannot be fetched.
    pub fn default_organization(&self) -> &OrganizationInfo {
        &self.default_organization
    }

    pub fn page_layout(&self) -> PageLayout {
        self.page_layout
    }

    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Returns a copy using a different fallback letterhead.
    pub fn with_default_organization(mut self, organization: OrganizationInfo) -> Self {
        self.default_organization = organization;
        self
    }
}

/// The built-in fallback letterhead.
pub fn builtin_default_organization() -> OrganizationInfo {
    OrganizationInfo {
        name: DEFAULT_ORGANIZATION_NAME.into(),
        org_type: DEFAULT_ORGANIZATION_TYPE.into(),
        address: Some(DEFAULT_ORGANIZATION_ADDRESS.into()),
        phone: Some(DEFAULT_ORGANIZATION_PHONE.into()),
        email: Some(DEFAULT_ORGANIZATION_EMAIL.into()),
        website: None,
        logo_url: None,
        theme_color: DEFAULT_THEME_COLOR.into(),
    }
}

/// Overrides fields of the built-in fallback letterhead from optional environment values.
///
/// Unset or blank values keep the built-in text.
pub fn default_organization_from_env_values(
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
) -> OrganizationInfo {
    let mut org = builtin_default_organization();
    if let Some(name) = present(name.as_deref()) {
        org.name = name.to_string();
    }
    if let Some(address) = present(address.as_deref()) {
        org.address = Some(address.to_string());
    }
    if let Some(phone) = present(phone.as_deref()) {
        org.phone = Some(phone.to_string());
    }
    if let Some(email) = present(email.as_deref()) {
        org.email = Some(email.to_string());
    }
    org
}
