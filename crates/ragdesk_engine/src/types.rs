use std::fmt;

use serde::Deserialize;

pub type JobId = u64;

/// A file entry as returned by the list and upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub filename: String,
    #[serde(default)]
    pub processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatAnswer {
    pub result: String,
    pub chat_id: String,
}

/// Push-channel events after filtering and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Progress { percent: Option<u8> },
    Complete { artifacts: Option<Vec<String>> },
    Error { reason: String },
    ChannelError { reason: String },
    ChannelClosed,
}

impl ChannelEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChannelEvent::Progress { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FilesListed(Result<Vec<RemoteFile>, RemoteError>),
    Uploaded(Result<RemoteFile, RemoteError>),
    Removed {
        filename: String,
        result: Result<(), RemoteError>,
    },
    JobStarted {
        job_id: JobId,
        filename: String,
        result: Result<(), RemoteError>,
    },
    Channel {
        job_id: JobId,
        filename: String,
        event: ChannelEvent,
    },
    JobTick {
        job_id: JobId,
        filename: String,
        elapsed_seconds: u64,
    },
    PreviewGenerated {
        filename: String,
        request: u64,
        result: Result<Vec<String>, RemoteError>,
    },
    ChatReplied(Result<ChatAnswer, RemoteError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            // The server's own reason is the useful part here.
            FailureKind::Rejected => write!(f, "{}", self.message),
            kind => write!(f, "{kind}: {}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    /// The remote answered but refused the request.
    Rejected,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Rejected => write!(f, "rejected"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
