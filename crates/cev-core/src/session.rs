use crate::config::Limits;
use crate::error::CevError;
use crate::extraction::{load_document, PdfBackend};
use crate::model::FieldWarning;
use crate::report::Report;
use crate::validate::{self, ValidationResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uploaded,
    Validating,
    Valid,
    Invalid,
    Extracting,
    Extracted,
    Failed,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uploaded => "uploaded",
            SessionState::Validating => "validating",
            SessionState::Valid => "valid",
            SessionState::Invalid => "invalid",
            SessionState::Extracting => "extracting",
            SessionState::Extracted => "extracted",
            SessionState::Failed => "failed",
            SessionState::Ready => "ready",
        };
        write!(f, "{name}")
    }
}

/// One uploaded file on its way from bytes to a report.
///
/// `Uploaded -> Validating -> Valid -> Extracting -> Extracted -> Ready`,
/// or `Validating -> Invalid`, or `Validating | Extracting -> Failed`.
/// A session runs once; `Invalid`, `Failed` and `Ready` are final.
#[derive(Debug)]
pub struct Session {
    file_name: String,
    bytes: Vec<u8>,
    state: SessionState,
    history: Vec<SessionState>,
    validation: Option<ValidationResult>,
    report: Option<Report>,
    warnings: Vec<FieldWarning>,
    error: Option<String>,
}

impl Session {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Session {
            file_name: file_name.into(),
            bytes,
            state: SessionState::Uploaded,
            history: vec![SessionState::Uploaded],
            validation: None,
            report: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state the session has been in, oldest first.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    /// Message of the error that ended the session, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate, extract and collect warnings. Extraction is never attempted
    /// for a document that failed validation.
    pub fn run(&mut self, backend: &dyn PdfBackend, limits: &Limits) -> Result<&Report, CevError> {
        if self.state != SessionState::Uploaded {
            return Err(CevError::SessionState(self.state.to_string()));
        }

        self.enter(SessionState::Validating);
        let document = match load_document(&self.bytes, backend, limits) {
            Ok(document) => document,
            Err(e) => return Err(self.fail(SessionState::Failed, e)),
        };

        let validation = validate::validate(&document);
        self.validation = Some(validation.clone());
        if let Err(e) = validation.into_result() {
            return Err(self.fail(SessionState::Invalid, e));
        }
        self.enter(SessionState::Valid);

        self.enter(SessionState::Extracting);
        let report = match crate::extract_validated(&document) {
            Ok(report) => report,
            Err(e) => return Err(self.fail(SessionState::Failed, e)),
        };
        self.enter(SessionState::Extracted);

        self.warnings = report.warnings();
        self.enter(SessionState::Ready);
        Ok(&*self.report.insert(report))
    }

    fn enter(&mut self, state: SessionState) {
        tracing::info!(file = %self.file_name, from = %self.state, to = %state, "session state");
        self.state = state;
        self.history.push(state);
    }

    fn fail(&mut self, state: SessionState, error: CevError) -> CevError {
        tracing::debug!(file = %self.file_name, error = %error, "session ended as {}", state);
        self.error = Some(error.to_string());
        self.enter(state);
        error
    }
}
