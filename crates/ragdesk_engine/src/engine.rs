use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use desk_logging::{desk_debug, desk_info};
use tokio::task::AbortHandle;

use crate::channel::{drive_channel, ChannelConnector, ChannelSettings, WsConnector};
use crate::remote::{Remote, RemoteSettings, ReqwestRemote};
use crate::sink::{ChannelEventSink, EventSink};
use crate::{ChannelEvent, EngineEvent, JobId, RemoteError};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub remote: RemoteSettings,
    pub channel: ChannelSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    Config(#[from] RemoteError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    ListFiles,
    Upload { path: PathBuf },
    Remove { filename: String },
    StartJob { job_id: JobId, filename: String },
    CloseJob { job_id: JobId },
    GeneratePreview { filename: String, request: u64 },
    SubmitChat { text: String, chat_id: Option<String> },
}

/// Runs remote calls and job channels on a background tokio runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let remote = Arc::new(ReqwestRemote::new(config.remote)?);
        let connector = Arc::new(WsConnector::new(&config.channel.ws_base_url)?);
        Self::with_backends(remote, connector, config.channel)
    }

    pub fn with_backends(
        remote: Arc<dyn Remote>,
        connector: Arc<dyn ChannelConnector>,
        channel: ChannelSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("ragdesk-engine")
            .build()?;
        let channel = Arc::new(channel);

        thread::Builder::new()
            .name("ragdesk-engine-commands".to_string())
            .spawn(move || {
                let mut jobs: HashMap<JobId, AbortHandle> = HashMap::new();
                while let Ok(command) = cmd_rx.recv() {
                    jobs.retain(|_, handle| !handle.is_finished());
                    let sink = ChannelEventSink::new(event_tx.clone());
                    match command {
                        EngineCommand::StartJob { job_id, filename } => {
                            let remote = remote.clone();
                            let connector = connector.clone();
                            let channel = channel.clone();
                            let task = runtime.spawn(async move {
                                run_job(
                                    remote.as_ref(),
                                    connector.as_ref(),
                                    &channel,
                                    job_id,
                                    filename,
                                    &sink,
                                )
                                .await;
                            });
                            jobs.insert(job_id, task.abort_handle());
                        }
                        EngineCommand::CloseJob { job_id } => match jobs.remove(&job_id) {
                            Some(handle) => {
                                handle.abort();
                                desk_debug!("Job {job_id}: channel closed");
                            }
                            None => desk_debug!("Job {job_id}: already closed"),
                        },
                        command => {
                            let remote = remote.clone();
                            runtime.spawn(async move {
                                handle_command(remote.as_ref(), command, &sink).await;
                            });
                        }
                    }
                }
                desk_info!("Engine command loop stopped; {} job(s) abandoned", jobs.len());
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn list_files(&self) {
        self.send(EngineCommand::ListFiles);
    }

    pub fn upload(&self, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Upload { path: path.into() });
    }

    pub fn remove(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Remove {
            filename: filename.into(),
        });
    }

    pub fn start_job(&self, job_id: JobId, filename: impl Into<String>) {
        self.send(EngineCommand::StartJob {
            job_id,
            filename: filename.into(),
        });
    }

    /// Stops the job's channel and ticker. Closing twice is a no-op.
    pub fn close_job(&self, job_id: JobId) {
        self.send(EngineCommand::CloseJob { job_id });
    }

    pub fn generate_preview(&self, filename: impl Into<String>, request: u64) {
        self.send(EngineCommand::GeneratePreview {
            filename: filename.into(),
            request,
        });
    }

    pub fn submit_chat(&self, text: impl Into<String>, chat_id: Option<String>) {
        self.send(EngineCommand::SubmitChat {
            text: text.into(),
            chat_id,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn run_job(
    remote: &dyn Remote,
    connector: &dyn ChannelConnector,
    settings: &ChannelSettings,
    job_id: JobId,
    filename: String,
    sink: &dyn EventSink,
) {
    let started = remote.start_job(&filename).await;
    let accepted = started.is_ok();
    sink.emit(EngineEvent::JobStarted {
        job_id,
        filename: filename.clone(),
        result: started,
    });
    if !accepted {
        return;
    }

    match connector.connect(&filename).await {
        Ok(frames) => drive_channel(job_id, &filename, frames, settings, sink).await,
        Err(err) => sink.emit(EngineEvent::Channel {
            job_id,
            filename,
            event: ChannelEvent::ChannelError {
                reason: err.to_string(),
            },
        }),
    }
}

async fn handle_command(remote: &dyn Remote, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::ListFiles => {
            sink.emit(EngineEvent::FilesListed(remote.list_files().await));
        }
        EngineCommand::Upload { path } => {
            sink.emit(EngineEvent::Uploaded(remote.upload_file(&path).await));
        }
        EngineCommand::Remove { filename } => {
            let result = remote.remove_file(&filename).await;
            sink.emit(EngineEvent::Removed { filename, result });
        }
        EngineCommand::GeneratePreview { filename, request } => {
            let result = remote.generate_preview(&filename).await;
            sink.emit(EngineEvent::PreviewGenerated {
                filename,
                request,
                result,
            });
        }
        EngineCommand::SubmitChat { text, chat_id } => {
            let result = remote.submit_chat(&text, chat_id.as_deref()).await;
            sink.emit(EngineEvent::ChatReplied(result));
        }
        EngineCommand::StartJob { .. } | EngineCommand::CloseJob { .. } => {}
    }
}
