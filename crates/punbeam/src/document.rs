use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Document is empty: {0}")]
    Empty(String),
}

/// A piece of text with source metadata, the unit the splitter and the
/// vector store operate on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new<S: Into<String>>(page_content: S) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Extract the text of a PDF file into a single [`Document`] with the file
/// path recorded as `source` metadata
pub fn load_pdf(path: &Path) -> Result<Document, DocumentError> {
    let source = path.display().to_string();
    let content = pdf_extract::extract_text(path).map_err(|e| DocumentError::Pdf(e.to_string()))?;

    if content.trim().is_empty() {
        return Err(DocumentError::Empty(source));
    }

    Ok(Document::new(content).with_metadata("source", source))
}
