use desk_logging::{desk_debug, desk_warn};

use crate::{
    AppState, ChatSender, DeskError, Effect, JobEvent, JobHandle, JobId, Msg, PreviewKind,
    ThumbnailOutcome, CHAT_ERROR_TEXT,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => vec![Effect::ListFiles],
        Msg::FilesListed(Ok(listed)) => close_all(state.apply_listing(listed)),
        Msg::FilesListed(Err(reason)) => {
            state.report(DeskError::ListUnavailable(reason));
            Vec::new()
        }
        Msg::UploadRequested { path } => vec![Effect::UploadFile { path }],
        Msg::UploadFinished(Ok(file)) => close_all(state.insert_upload(file)),
        Msg::UploadFinished(Err(reason)) => {
            state.report(DeskError::UploadFailed(reason));
            Vec::new()
        }
        Msg::RemoveClicked { filename } => {
            // Not optimistic: the record stays until the remote confirms.
            if state.files().contains(&filename) {
                vec![Effect::RemoveFile { filename }]
            } else {
                Vec::new()
            }
        }
        Msg::RemoveFinished {
            filename,
            result: Ok(()),
        } => close_all(state.remove_file(&filename)),
        Msg::RemoveFinished {
            filename,
            result: Err(reason),
        } => {
            state.report(DeskError::RemoveFailed { filename, reason });
            Vec::new()
        }
        Msg::ScreenshotClicked { filename } => {
            if state.files().contains(&filename) {
                show_preview(&mut state, &filename)
            } else {
                Vec::new()
            }
        }
        Msg::PreviewGenerated {
            filename,
            request,
            result,
        } => {
            match state.apply_thumbnails(&filename, request, result) {
                ThumbnailOutcome::Applied => {}
                ThumbnailOutcome::Stale => {
                    desk_debug!("Dropping stale thumbnails for {filename} (request {request})");
                }
                ThumbnailOutcome::Failed(reason) => {
                    state.report(DeskError::PreviewGenerationFailed { filename, reason });
                }
            }
            Vec::new()
        }
        Msg::StartRagClicked { filename } => match state.start_job(&filename) {
            Some(job_id) => vec![Effect::StartJob { job_id, filename }],
            None => {
                desk_debug!("Start for {filename} ignored: not startable or already running");
                Vec::new()
            }
        },
        Msg::JobStartFinished {
            job_id,
            filename,
            result,
        } => apply_start_result(&mut state, job_id, filename, result),
        Msg::JobEvent {
            job_id,
            filename,
            event,
        } => apply_job_event(&mut state, job_id, filename, event),
        Msg::JobTick {
            job_id,
            filename,
            elapsed_seconds,
        } => {
            if state.record_tick(&filename, job_id, elapsed_seconds) {
                Vec::new()
            } else {
                desk_debug!("Tick for stale job {job_id} ({filename})");
                vec![Effect::CloseJob { job_id, filename }]
            }
        }
        Msg::ChatSubmitted(text) => {
            let text = text.trim();
            if text.is_empty() {
                return (state, Vec::new());
            }
            state.chat_mut().push(ChatSender::User, text);
            vec![Effect::SubmitChat {
                text: text.to_string(),
                chat_id: state.chat().chat_id().map(ToOwned::to_owned),
            }]
        }
        Msg::ChatReplied(Ok(reply)) => {
            let chat = state.chat_mut();
            chat.push(ChatSender::System, reply.result);
            chat.set_chat_id(reply.chat_id);
            Vec::new()
        }
        Msg::ChatReplied(Err(reason)) => {
            desk_warn!("Chat request failed: {reason}");
            state.chat_mut().push(ChatSender::System, CHAT_ERROR_TEXT);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn apply_start_result(
    state: &mut AppState,
    job_id: JobId,
    filename: String,
    result: Result<(), String>,
) -> Vec<Effect> {
    if !state.is_live_job(&filename, job_id) {
        // Removed or superseded while the start call was in flight; make sure
        // whatever channel the engine opened for it is closed again.
        desk_debug!("Start result for stale job {job_id} ({filename}) dropped");
        return vec![Effect::CloseJob { job_id, filename }];
    }
    match result {
        Ok(()) => {
            state.job_accepted(&filename, job_id);
            Vec::new()
        }
        Err(reason) => {
            let effects = vec![Effect::CloseJob {
                job_id,
                filename: filename.clone(),
            }];
            state.fail_job(&filename, job_id, &reason);
            state.report(DeskError::JobStartRejected { filename, reason });
            effects
        }
    }
}

fn apply_job_event(
    state: &mut AppState,
    job_id: JobId,
    filename: String,
    event: JobEvent,
) -> Vec<Effect> {
    if !state.is_live_job(&filename, job_id) {
        desk_debug!("Dropping {event:?} for stale job {job_id} ({filename})");
        return vec![Effect::CloseJob { job_id, filename }];
    }

    let reason = match event {
        JobEvent::Progress { percent } => {
            state.record_progress(&filename, job_id, percent);
            return Vec::new();
        }
        JobEvent::Complete { artifacts } => {
            // Closing the job comes first so the ticker stops before anything repaints.
            let mut effects = vec![Effect::CloseJob {
                job_id,
                filename: filename.clone(),
            }];
            state.complete_job(&filename, job_id);
            // The pane belongs to the user's latest selection; a background
            // completion only repaints an empty pane or its own file.
            let pane_free = state
                .preview()
                .selected()
                .is_none_or(|selected| selected == filename);
            if !pane_free {
                desk_debug!("Job {job_id}: {filename} completed behind another preview");
                return effects;
            }
            match artifacts {
                Some(refs) if !refs.is_empty() => state.show_artifacts(&filename, refs),
                _ => effects.extend(show_preview(state, &filename)),
            }
            return effects;
        }
        JobEvent::Error { reason } | JobEvent::ChannelError { reason } => reason,
        JobEvent::ChannelClosed => "channel closed before the job finished".to_string(),
    };

    let effects = vec![Effect::CloseJob {
        job_id,
        filename: filename.clone(),
    }];
    state.fail_job(&filename, job_id, &reason);
    state.report(DeskError::ChannelError { filename, reason });
    effects
}

fn show_preview(state: &mut AppState, filename: &str) -> Vec<Effect> {
    let kind = PreviewKind::for_filename(filename);
    match state.show_preview(filename, kind) {
        Some(request) => vec![Effect::GeneratePreview {
            filename: filename.to_string(),
            request,
        }],
        None => Vec::new(),
    }
}

fn close_all(dropped: impl IntoIterator<Item = JobHandle>) -> Vec<Effect> {
    dropped
        .into_iter()
        .map(|handle| Effect::CloseJob {
            job_id: handle.job_id,
            filename: handle.filename,
        })
        .collect()
}
