//! RAG desk engine: remote calls, job channels and effect execution.
mod channel;
mod engine;
mod remote;
mod sink;
mod types;

pub use channel::{
    drive_channel, parse_frame, ChannelConnector, ChannelSettings, FrameStream, LivenessTicker,
    WsConnector,
};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use remote::{Remote, RemoteSettings, ReqwestRemote};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{ChannelEvent, ChatAnswer, EngineEvent, FailureKind, JobId, RemoteError, RemoteFile};
