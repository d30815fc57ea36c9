//! Per-job push channel: frame normalization, the liveness ticker and the
//! loop that drives both until a terminal event.

use std::pin::Pin;
use std::time::Duration;

use desk_logging::{desk_debug, desk_info, desk_warn};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::remote::parse_base_url;
use crate::{ChannelEvent, EngineEvent, EventSink, FailureKind, JobId, RemoteError};

const MIN_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub ws_base_url: String,
    pub tick_interval: Duration,
    /// Fail a job that has produced no terminal event after this long.
    pub max_wait: Option<Duration>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            ws_base_url: "ws://127.0.0.1:8000".to_string(),
            tick_interval: Duration::from_secs(5),
            max_wait: Some(Duration::from_secs(30 * 60)),
        }
    }
}

/// Raw text frames; an `Err` is a transport failure.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>;

#[async_trait::async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Opens the push channel scoped to `filename`.
    async fn connect(&self, filename: &str) -> Result<FrameStream, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct WsConnector {
    base: Url,
}

impl WsConnector {
    pub fn new(ws_base_url: &str) -> Result<Self, RemoteError> {
        let base = parse_base_url(ws_base_url)?;
        if !matches!(base.scheme(), "ws" | "wss") {
            return Err(RemoteError::new(
                FailureKind::InvalidUrl,
                format!("{ws_base_url} is not a ws:// or wss:// url"),
            ));
        }
        Ok(Self { base })
    }

    pub fn channel_url(&self, filename: &str) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(["ws", "rag", filename]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ChannelConnector for WsConnector {
    async fn connect(&self, filename: &str) -> Result<FrameStream, RemoteError> {
        let url = self.channel_url(filename)?;
        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|err| RemoteError::new(FailureKind::Network, err.to_string()))?;
        desk_debug!("Channel open: {url}");
        let frames = ws.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(_) => None,
                Err(err) => Some(Err(err.to_string())),
            }
        });
        Ok(Box::pin(frames))
    }
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    filename: String,
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    thumbnails: Option<Vec<String>>,
}

/// Normalizes one text frame. Frames for other files and frames that do
/// not parse yield `None`.
pub fn parse_frame(filename: &str, text: &str) -> Option<ChannelEvent> {
    let frame: WireFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            desk_warn!("Ignoring malformed frame for {filename}: {err}");
            return None;
        }
    };
    if frame.filename != filename {
        desk_debug!("Ignoring frame for {} on channel of {filename}", frame.filename);
        return None;
    }
    if let Some(reason) = frame.error {
        return Some(ChannelEvent::Error { reason });
    }
    if frame.complete {
        return Some(ChannelEvent::Complete {
            artifacts: frame.thumbnails,
        });
    }
    let percent = frame
        .progress
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 100.0).round() as u8);
    Some(ChannelEvent::Progress { percent })
}

/// Fixed-interval elapsed-time counter for user feedback.
#[derive(Debug)]
pub struct LivenessTicker {
    interval: Option<Interval>,
    period: Duration,
    ticks: u64,
}

impl LivenessTicker {
    /// The first tick fires one full period after the start.
    pub fn start(period: Duration) -> Self {
        let period = period.max(MIN_TICK_INTERVAL);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: Some(interval),
            period,
            ticks: 0,
        }
    }

    /// Waits for the next tick and returns the new elapsed seconds. Never
    /// resolves once cancelled.
    pub async fn tick(&mut self) -> u64 {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                self.ticks += 1;
                self.elapsed_seconds()
            }
            None => std::future::pending().await,
        }
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.period.as_secs().saturating_mul(self.ticks)
    }
}

/// Forwards channel events and liveness ticks for one job until a terminal
/// event, which is emitted only after the ticker has been cancelled.
pub async fn drive_channel(
    job_id: JobId,
    filename: &str,
    mut frames: FrameStream,
    settings: &ChannelSettings,
    sink: &dyn EventSink,
) {
    let mut ticker = LivenessTicker::start(settings.tick_interval);
    let max_wait = settings.max_wait;
    let deadline = async move {
        match max_wait {
            Some(wait) => tokio::time::sleep(wait).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        let event = tokio::select! {
            biased;
            frame = frames.next() => match frame {
                Some(Ok(text)) => match parse_frame(filename, &text) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(reason)) => ChannelEvent::ChannelError { reason },
                None => ChannelEvent::ChannelClosed,
            },
            () = &mut deadline => ChannelEvent::ChannelError {
                reason: format!(
                    "no terminal event within {}s",
                    max_wait.unwrap_or_default().as_secs()
                ),
            },
            elapsed_seconds = ticker.tick() => {
                sink.emit(EngineEvent::JobTick {
                    job_id,
                    filename: filename.to_string(),
                    elapsed_seconds,
                });
                continue;
            }
        };

        if event.is_terminal() {
            ticker.cancel();
            desk_info!(
                "Job {job_id}: channel for {filename} finished after {}s with {event:?}",
                ticker.elapsed_seconds()
            );
            sink.emit(EngineEvent::Channel {
                job_id,
                filename: filename.to_string(),
                event,
            });
            return;
        }
        sink.emit(EngineEvent::Channel {
            job_id,
            filename: filename.to_string(),
            event,
        });
    }
}
