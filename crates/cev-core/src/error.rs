use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CevError {
    #[error("document has {found} page(s), a CEV v2 report needs at least {required}")]
    PageCount { found: usize, required: usize },

    #[error("not a CEV v2 report: page {page} title area reads '{found}'")]
    InvalidFormat { page: usize, found: String },

    #[error("report is missing page record(s) {missing:?}")]
    IncompleteReport { missing: Vec<usize> },

    #[error("page {0} is not part of a CEV v2 report")]
    UnknownPage(usize),

    #[error("schema registry is inconsistent: {0}")]
    Configuration(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("failed to load limits from {path}: {reason}")]
    LimitsLoad { path: PathBuf, reason: String },

    #[error("failed to parse value: {0}")]
    ParseError(String),

    #[error("session cannot run from state {0}")]
    SessionState(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CevError {
    /// True when the input document itself is the problem (wrong page count,
    /// wrong format, unreadable or oversized PDF) rather than the environment.
    pub fn is_document_problem(&self) -> bool {
        matches!(
            self,
            CevError::PageCount { .. }
                | CevError::InvalidFormat { .. }
                | CevError::Extraction(_)
                | CevError::PdftotextFailed { .. }
                | CevError::ResourceLimit(_)
        )
    }
}
