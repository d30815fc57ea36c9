use desk_logging::{desk_debug, desk_info, desk_warn};
use ragdesk_core::{ChatReply, Effect, JobEvent, ListedFile, Msg};
use ragdesk_engine::{
    ChannelEvent, EngineConfig, EngineError, EngineEvent, EngineHandle, RemoteError, RemoteFile,
};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(config)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ListFiles => self.engine.list_files(),
                Effect::UploadFile { path } => {
                    desk_info!("Upload {}", path.display());
                    self.engine.upload(path);
                }
                Effect::RemoveFile { filename } => {
                    desk_info!("Remove {filename}");
                    self.engine.remove(filename);
                }
                Effect::StartJob { job_id, filename } => {
                    desk_info!("StartJob job_id={job_id} filename={filename}");
                    self.engine.start_job(job_id, filename);
                }
                Effect::CloseJob { job_id, filename } => {
                    desk_debug!("CloseJob job_id={job_id} filename={filename}");
                    self.engine.close_job(job_id);
                }
                Effect::GeneratePreview { filename, request } => {
                    self.engine.generate_preview(filename, request);
                }
                Effect::SubmitChat { text, chat_id } => {
                    desk_debug!("SubmitChat text_len={} chat_id={:?}", text.len(), chat_id);
                    self.engine.submit_chat(text, chat_id);
                }
            }
        }
    }

    /// Messages for every engine event received since the last call.
    pub fn drain(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FilesListed(result) => Msg::FilesListed(
            result
                .map(|files| files.into_iter().map(listed).collect())
                .map_err(describe),
        ),
        EngineEvent::Uploaded(result) => Msg::UploadFinished(result.map(listed).map_err(describe)),
        EngineEvent::Removed { filename, result } => Msg::RemoveFinished {
            filename,
            result: result.map_err(describe),
        },
        EngineEvent::JobStarted {
            job_id,
            filename,
            result,
        } => Msg::JobStartFinished {
            job_id,
            filename,
            result: result.map_err(describe),
        },
        EngineEvent::Channel {
            job_id,
            filename,
            event,
        } => Msg::JobEvent {
            job_id,
            filename,
            event: map_channel_event(event),
        },
        EngineEvent::JobTick {
            job_id,
            filename,
            elapsed_seconds,
        } => Msg::JobTick {
            job_id,
            filename,
            elapsed_seconds,
        },
        EngineEvent::PreviewGenerated {
            filename,
            request,
            result,
        } => Msg::PreviewGenerated {
            filename,
            request,
            result: result.map_err(describe),
        },
        EngineEvent::ChatReplied(result) => Msg::ChatReplied(
            result
                .map(|answer| ChatReply {
                    result: answer.result,
                    chat_id: answer.chat_id,
                })
                .map_err(describe),
        ),
    }
}

fn map_channel_event(event: ChannelEvent) -> JobEvent {
    match event {
        ChannelEvent::Progress { percent } => JobEvent::Progress { percent },
        ChannelEvent::Complete { artifacts } => JobEvent::Complete { artifacts },
        ChannelEvent::Error { reason } => JobEvent::Error { reason },
        ChannelEvent::ChannelError { reason } => JobEvent::ChannelError { reason },
        ChannelEvent::ChannelClosed => JobEvent::ChannelClosed,
    }
}

fn listed(file: RemoteFile) -> ListedFile {
    ListedFile::new(file.filename, file.processed)
}

fn describe(err: RemoteError) -> String {
    desk_warn!("Remote call failed: {err}");
    err.to_string()
}
