use thiserror::Error;

/// User-visible failures. All of them are recoverable: local state stays
/// consistent and the action can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskError {
    #[error("file list unavailable: {0}")]
    ListUnavailable(String),
    #[error("{0} was already listed; replaced with the uploaded copy")]
    DuplicateFilename(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("could not remove {filename}: {reason}")]
    RemoveFailed { filename: String, reason: String },
    #[error("RAG job for {filename} was rejected: {reason}")]
    JobStartRejected { filename: String, reason: String },
    #[error("RAG job for {filename} failed: {reason}")]
    ChannelError { filename: String, reason: String },
    #[error("preview for {filename} unavailable: {reason}")]
    PreviewGenerationFailed { filename: String, reason: String },
}

impl DeskError {
    /// Filename the error refers to, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            DeskError::ListUnavailable(_) | DeskError::UploadFailed(_) => None,
            DeskError::DuplicateFilename(filename) => Some(filename),
            DeskError::RemoveFailed { filename, .. }
            | DeskError::JobStartRejected { filename, .. }
            | DeskError::ChannelError { filename, .. }
            | DeskError::PreviewGenerationFailed { filename, .. } => Some(filename),
        }
    }
}
