use std::path::PathBuf;

use crate::{ChatReply, JobEvent, JobId, ListedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for a fresh listing (also sent once at startup).
    RefreshRequested,
    /// Remote listing finished.
    FilesListed(Result<Vec<ListedFile>, String>),
    /// User picked a local file to upload.
    UploadRequested { path: PathBuf },
    /// Remote upload finished.
    UploadFinished(Result<ListedFile, String>),
    /// User clicked Remove on a file row.
    RemoveClicked { filename: String },
    /// Remote removal finished.
    RemoveFinished {
        filename: String,
        result: Result<(), String>,
    },
    /// User clicked Screenshot on a file row.
    ScreenshotClicked { filename: String },
    /// Remote thumbnail generation finished.
    PreviewGenerated {
        filename: String,
        request: u64,
        result: Result<Vec<String>, String>,
    },
    /// User clicked Start RAG on a file row.
    StartRagClicked { filename: String },
    /// Remote answered the start-job call.
    JobStartFinished {
        job_id: JobId,
        filename: String,
        result: Result<(), String>,
    },
    /// Push channel event for a job.
    JobEvent {
        job_id: JobId,
        filename: String,
        event: JobEvent,
    },
    /// Liveness ticker fired for a job.
    JobTick {
        job_id: JobId,
        filename: String,
        elapsed_seconds: u64,
    },
    /// User sent a chat message.
    ChatSubmitted(String),
    /// Chat endpoint answered.
    ChatReplied(Result<ChatReply, String>),
    /// Render tick; also pumps engine events.
    Tick,
}
