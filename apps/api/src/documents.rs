//! Document Loader — reads the profile PDF and the summary text once at startup.
//!
//! The resulting `SystemContext` is immutable and shared by every turn.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::chat::prompts::render_system_prompt;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to extract text from profile PDF {path}: {message}")]
    Profile { path: PathBuf, message: String },

    #[error("Failed to read summary file {path}: {source}")]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Profile and summary text embedded into the system message of every turn.
#[derive(Debug, Clone)]
pub struct SystemContext {
    pub name: String,
    pub profile_text: String,
    pub summary: String,
}

impl SystemContext {
    pub fn new(
        name: impl Into<String>,
        profile_text: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            profile_text: profile_text.into(),
            summary: summary.into(),
        }
    }

    /// Loads both documents from the configured locations. Any failure is fatal.
    pub fn load(config: &Config) -> Result<Self, DocumentError> {
        let profile_text = load_profile_text(&config.profile_pdf_path)?;
        let summary = load_summary(&config.summary_path)?;
        info!(
            "Loaded profile ({} chars) and summary ({} chars)",
            profile_text.len(),
            summary.len()
        );
        Ok(Self::new(config.profile_name.clone(), profile_text, summary))
    }

    /// Renders the system instructions. Profile and summary are embedded verbatim.
    pub fn system_prompt(&self) -> String {
        render_system_prompt(&self.name, &self.profile_text, &self.summary)
    }
}

/// Extracts the text layer of a PDF. Pages without text contribute nothing.
pub fn load_profile_text(path: &Path) -> Result<String, DocumentError> {
    pdf_extract::extract_text(path).map_err(|e| DocumentError::Profile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn load_summary(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| DocumentError::Summary {
        path: path.to_path_buf(),
        source,
    })
}
