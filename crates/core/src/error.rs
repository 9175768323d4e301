#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] clinic_types::TextError),

    #[error("failed to fetch user profile: {0}")]
    ProfileFetch(reqwest::Error),
    #[error("user profile request returned status {0}")]
    ProfileStatus(u16),
    #[error("user profile endpoint reported failure")]
    ProfileUnavailable,
    #[error("failed to fetch organization: {0}")]
    OrganizationFetch(reqwest::Error),
    #[error("organization request returned status {0}")]
    OrganizationStatus(u16),
    #[error("organization endpoint reported failure")]
    OrganizationUnavailable,

    #[error("print target not found: {0}")]
    TargetNotFound(String),
    #[error("print target is already being printed or exported: {0}")]
    TargetBusy(String),
    #[error("could not open a print window (popup blocked)")]
    PopupBlocked,

    #[error("no records to export")]
    EmptyExport,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finish CSV buffer: {0}")]
    CsvBuffer(String),
    #[error("failed to generate PDF: {0}")]
    Pdf(String),

    #[error("failed to create output directory: {0}")]
    OutputDirCreation(std::io::Error),
    #[error("failed to write output file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize: {0}")]
    Deserialization(serde_json::Error),
}

impl PrintError {
    /// True for failures caused by the caller or the user's environment rather than by this
    /// crate, such as a missing target or an empty export.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PrintError::InvalidInput(_)
                | PrintError::Text(_)
                | PrintError::TargetNotFound(_)
                | PrintError::TargetBusy(_)
                | PrintError::PopupBlocked
                | PrintError::EmptyExport
        )
    }
}

pub type PrintResult<T> = std::result::Result<T, PrintError>;
