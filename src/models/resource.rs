//! Resource kind selection.

/// Kind of a watched document, selected by filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Html,
    Pdf,
}

impl ResourceKind {
    /// Classify a stored filename. Anything that is not a PDF is
    /// treated as extracted HTML text.
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_ascii_lowercase().ends_with(".pdf") {
            Self::Pdf
        } else {
            Self::Html
        }
    }
}

/// Output folder stem for a filename: everything before the first dot.
pub fn artifact_stem(filename: &str) -> &str {
    filename.split('.').next().unwrap_or("")
}
