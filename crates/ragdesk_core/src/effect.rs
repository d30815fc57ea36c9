use std::path::PathBuf;

use crate::JobId;

/// Work requested by `update`; executed outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ListFiles,
    UploadFile { path: PathBuf },
    RemoveFile { filename: String },
    /// Issue the start-job call and, once accepted, drive the push channel.
    StartJob { job_id: JobId, filename: String },
    /// Stop the job's ticker and close its channel. Idempotent.
    CloseJob { job_id: JobId, filename: String },
    GeneratePreview { filename: String, request: u64 },
    SubmitChat {
        text: String,
        chat_id: Option<String>,
    },
}
