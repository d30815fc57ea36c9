use crate::{ChatLine, FileStatus, PreviewArtifact};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub files: Vec<FileRowView>,
    pub active_jobs: usize,
    pub preview: PreviewView,
    /// Newest first.
    pub chat: Vec<ChatLine>,
    /// Oldest first.
    pub notices: Vec<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub filename: String,
    pub status: FileStatus,
    /// Present only while the file is processing.
    pub elapsed_seconds: Option<u64>,
    pub progress: Option<u8>,
    /// Whether the "start RAG" affordance is offered.
    pub can_start: bool,
    pub previewed: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewView {
    pub filename: Option<String>,
    pub artifacts: Vec<PreviewArtifact>,
    pub loading: bool,
}
