use crate::error::CevError;
use crate::extraction::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Hard ceilings applied to every document before and after text extraction.
///
/// Missing keys in a limits file fall back to the defaults, so a file
/// containing only `{"timeout_secs": 5}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_input_bytes: usize,
    pub max_pages: usize,
    pub max_words_per_page: usize,
    pub timeout_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_input_bytes: 32 * 1024 * 1024,
            max_pages: 64,
            max_words_per_page: 20_000,
            timeout_secs: 30,
        }
    }
}

impl Limits {
    /// Load limits from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CevError> {
        let content = std::fs::read_to_string(path).map_err(|e| CevError::LimitsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let limits: Limits = serde_json::from_str(&content).map_err(|e| CevError::LimitsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        limits.validate().map_err(|e| CevError::LimitsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(limits)
    }

    /// Reject limits that could never admit a CEV v2 report.
    pub fn validate(&self) -> Result<(), CevError> {
        let min_pages = crate::schema::registry().min_pages();
        if self.max_pages < min_pages {
            return Err(CevError::Configuration(format!(
                "max_pages {} is below the {} pages of a report",
                self.max_pages, min_pages
            )));
        }
        if self.max_input_bytes == 0 || self.max_words_per_page == 0 || self.timeout_secs == 0 {
            return Err(CevError::Configuration(
                "limits must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn check_input(&self, len: usize) -> Result<(), CevError> {
        if len > self.max_input_bytes {
            return Err(CevError::ResourceLimit(format!(
                "input is {} bytes, limit is {}",
                len, self.max_input_bytes
            )));
        }
        Ok(())
    }

    pub fn check_document(&self, document: &Document) -> Result<(), CevError> {
        if document.page_count() > self.max_pages {
            return Err(CevError::ResourceLimit(format!(
                "document has more than {} pages",
                self.max_pages
            )));
        }
        for page in document.pages() {
            let words = page.word_count();
            if words > self.max_words_per_page {
                return Err(CevError::ResourceLimit(format!(
                    "page {} has {} words, limit is {}",
                    page.page_number, words, self.max_words_per_page
                )));
            }
        }
        Ok(())
    }
}
