use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::stream;
use pretty_assertions::assert_eq;
use ragdesk_engine::{
    ChannelConnector, ChannelEvent, ChannelSettings, ChatAnswer, EngineEvent, EngineHandle,
    FailureKind, FrameStream, Remote, RemoteError, RemoteFile,
};

struct FakeRemote {
    start_result: Result<(), RemoteError>,
    files: Vec<RemoteFile>,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    fn accepting() -> Self {
        Self {
            start_result: Ok(()),
            files: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl Remote for FakeRemote {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, RemoteError> {
        self.record("list".into());
        Ok(self.files.clone())
    }

    async fn upload_file(&self, path: &Path) -> Result<RemoteFile, RemoteError> {
        self.record(format!("upload {}", path.display()));
        Ok(RemoteFile {
            filename: "up.pdf".into(),
            processed: false,
        })
    }

    async fn remove_file(&self, filename: &str) -> Result<(), RemoteError> {
        self.record(format!("remove {filename}"));
        Ok(())
    }

    async fn start_job(&self, filename: &str) -> Result<(), RemoteError> {
        self.record(format!("start {filename}"));
        self.start_result.clone()
    }

    async fn generate_preview(&self, filename: &str) -> Result<Vec<String>, RemoteError> {
        Ok(vec![format!("/uploads/{filename}_1.png")])
    }

    async fn submit_chat(
        &self,
        text: &str,
        chat_id: Option<&str>,
    ) -> Result<ChatAnswer, RemoteError> {
        Ok(ChatAnswer {
            result: format!("echo {text}"),
            chat_id: chat_id.unwrap_or("new").to_string(),
        })
    }
}

enum Script {
    Frames(Vec<&'static str>),
    Silent,
    Refuse,
}

struct FakeConnector {
    script: Script,
}

#[async_trait::async_trait]
impl ChannelConnector for FakeConnector {
    async fn connect(&self, _filename: &str) -> Result<FrameStream, RemoteError> {
        match &self.script {
            Script::Frames(frames) => {
                let frames: Vec<Result<String, String>> =
                    frames.iter().map(|frame| Ok(frame.to_string())).collect();
                Ok(Box::pin(stream::iter(frames)))
            }
            Script::Silent => Ok(Box::pin(stream::pending())),
            Script::Refuse => Err(RemoteError {
                kind: FailureKind::Network,
                message: "refused".into(),
            }),
        }
    }
}

fn settings(tick_interval: Duration) -> ChannelSettings {
    ChannelSettings {
        ws_base_url: "ws://127.0.0.1:1".into(),
        tick_interval,
        max_wait: None,
    }
}

fn engine(remote: FakeRemote, script: Script) -> EngineHandle {
    EngineHandle::with_backends(
        Arc::new(remote),
        Arc::new(FakeConnector { script }),
        settings(Duration::from_secs(5)),
    )
    .expect("engine")
}

fn collect(handle: &EngineHandle, count: usize) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < count && Instant::now() < deadline {
        if let Some(event) = handle.recv_timeout(Duration::from_millis(50)) {
            events.push(event);
        }
    }
    events
}

#[test]
fn accepted_job_streams_channel_events() {
    let handle = engine(
        FakeRemote::accepting(),
        Script::Frames(vec![
            r#"{"filename":"a.pdf","progress":10}"#,
            r#"{"filename":"a.pdf","complete":true}"#,
        ]),
    );
    handle.start_job(3, "a.pdf");

    assert_eq!(
        collect(&handle, 3),
        vec![
            EngineEvent::JobStarted {
                job_id: 3,
                filename: "a.pdf".into(),
                result: Ok(()),
            },
            EngineEvent::Channel {
                job_id: 3,
                filename: "a.pdf".into(),
                event: ChannelEvent::Progress { percent: Some(10) },
            },
            EngineEvent::Channel {
                job_id: 3,
                filename: "a.pdf".into(),
                event: ChannelEvent::Complete { artifacts: None },
            },
        ]
    );
}

#[test]
fn rejected_start_opens_no_channel() {
    let rejection = RemoteError {
        kind: FailureKind::Rejected,
        message: "busy".into(),
    };
    let remote = FakeRemote {
        start_result: Err(rejection.clone()),
        ..FakeRemote::accepting()
    };
    let handle = engine(remote, Script::Frames(vec![r#"{"filename":"a.pdf"}"#]));
    handle.start_job(1, "a.pdf");

    assert_eq!(
        collect(&handle, 1),
        vec![EngineEvent::JobStarted {
            job_id: 1,
            filename: "a.pdf".into(),
            result: Err(rejection),
        }]
    );
    assert!(handle.recv_timeout(Duration::from_millis(200)).is_none());
}

#[test]
fn channel_connect_failure_is_channel_error() {
    let handle = engine(FakeRemote::accepting(), Script::Refuse);
    handle.start_job(2, "a.pdf");

    let events = collect(&handle, 2);
    assert_eq!(
        events[1],
        EngineEvent::Channel {
            job_id: 2,
            filename: "a.pdf".into(),
            event: ChannelEvent::ChannelError {
                reason: "network error: refused".into()
            },
        }
    );
}

#[test]
fn close_stops_liveness_ticks() {
    let handle = EngineHandle::with_backends(
        Arc::new(FakeRemote::accepting()),
        Arc::new(FakeConnector {
            script: Script::Silent,
        }),
        settings(Duration::from_secs(1)),
    )
    .expect("engine");
    handle.start_job(4, "a.pdf");

    let events = collect(&handle, 2);
    assert_eq!(
        events[1],
        EngineEvent::JobTick {
            job_id: 4,
            filename: "a.pdf".into(),
            elapsed_seconds: 1,
        }
    );

    handle.close_job(4);
    handle.close_job(4);
    std::thread::sleep(Duration::from_millis(200));
    while handle.try_recv().is_some() {}
    assert!(handle.recv_timeout(Duration::from_millis(2500)).is_none());
}

#[test]
fn plain_commands_report_results() {
    let remote = FakeRemote {
        files: vec![RemoteFile {
            filename: "a.pdf".into(),
            processed: true,
        }],
        ..FakeRemote::accepting()
    };
    let handle = engine(remote, Script::Silent);

    handle.list_files();
    assert_eq!(
        collect(&handle, 1),
        vec![EngineEvent::FilesListed(Ok(vec![RemoteFile {
            filename: "a.pdf".into(),
            processed: true,
        }]))]
    );

    handle.remove("a.pdf");
    assert_eq!(
        collect(&handle, 1),
        vec![EngineEvent::Removed {
            filename: "a.pdf".into(),
            result: Ok(()),
        }]
    );

    handle.generate_preview("b.pdf", 7);
    assert_eq!(
        collect(&handle, 1),
        vec![EngineEvent::PreviewGenerated {
            filename: "b.pdf".into(),
            request: 7,
            result: Ok(vec!["/uploads/b.pdf_1.png".into()]),
        }]
    );

    handle.submit_chat("hi", Some("c-9".into()));
    assert_eq!(
        collect(&handle, 1),
        vec![EngineEvent::ChatReplied(Ok(ChatAnswer {
            result: "echo hi".into(),
            chat_id: "c-9".into(),
        }))]
    );
}
