use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanLabelError {
    #[error("scan label is empty")]
    Empty,
    #[error("scan label {0:?} may only contain ASCII letters, digits, '-' and '_'")]
    InvalidCharacters(String),
}

/// Tag naming where a symbol list came from; it only ends up in the PDF file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanLabel(String);

impl ScanLabel {
    pub fn parse(raw: &str) -> Result<Self, ScanLabelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScanLabelError::Empty);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ScanLabelError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `charts_<label>.pdf`
    pub fn pdf_file_name(&self) -> String {
        format!("charts_{}.pdf", self.0)
    }
}

impl Default for ScanLabel {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for ScanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ScanLabel {
    type Error = ScanLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ScanLabel::parse(&value)
    }
}

impl From<ScanLabel> for String {
    fn from(label: ScanLabel) -> Self {
        label.0
    }
}
