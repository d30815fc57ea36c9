//! RAG Desk core: pure state machine for the file collection, per-file RAG
//! jobs, the shared preview pane and the chat transcript.
mod chat;
mod effect;
mod error;
mod job;
mod msg;
mod preview;
mod state;
mod store;
mod update;
mod view_model;

pub use chat::{ChatLine, ChatReply, ChatSender, ChatTranscript, CHAT_ERROR_TEXT};
pub use effect::Effect;
pub use error::DeskError;
pub use job::{JobEvent, JobHandle, JobId, JobPhase, JobTable};
pub use msg::Msg;
pub use preview::{
    PreviewArtifact, PreviewKind, PreviewPane, ThumbnailOutcome, PAGINATED_EXTENSION,
    PLACEHOLDER_SRC, RASTER_EXTENSIONS, UPLOADS_PREFIX,
};
pub use state::{AppState, MAX_NOTICES};
pub use store::{FileRecord, FileRecordStore, FileStatus, ListedFile};
pub use update::update;
pub use view_model::{AppViewModel, FileRowView, PreviewView};
