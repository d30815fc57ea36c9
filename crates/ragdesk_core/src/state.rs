use desk_logging::{desk_debug, desk_info, desk_warn};

use crate::view_model::{AppViewModel, FileRowView, PreviewView};
use crate::{
    ChatTranscript, DeskError, FileRecord, FileRecordStore, FileStatus, JobHandle, JobId,
    JobTable, ListedFile, PreviewKind, PreviewPane, ThumbnailOutcome,
};

/// Notices kept for display; older ones are dropped first.
pub const MAX_NOTICES: usize = 8;

/// Application context: the only owner of client-side state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    files: FileRecordStore,
    jobs: JobTable,
    preview: PreviewPane,
    chat: ChatTranscript,
    notices: Vec<DeskError>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let selected = self.preview.selected();
        let files = self
            .files
            .iter()
            .map(|record| FileRowView {
                filename: record.filename.clone(),
                status: record.status,
                elapsed_seconds: (record.status == FileStatus::Processing)
                    .then_some(record.elapsed_seconds),
                progress: record.progress,
                can_start: record.status == FileStatus::Unprocessed
                    && !self.jobs.contains(&record.filename),
                previewed: selected == Some(record.filename.as_str()),
                last_error: record.last_error.clone(),
            })
            .collect();

        AppViewModel {
            files,
            active_jobs: self.jobs.len(),
            preview: PreviewView {
                filename: selected.map(ToOwned::to_owned),
                artifacts: self.preview.artifacts().to_vec(),
                loading: self.preview.is_loading(),
            },
            chat: self.chat.lines().to_vec(),
            notices: self.notices.iter().map(ToString::to_string).collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a re-render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn files(&self) -> &FileRecordStore {
        &self.files
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn chat(&self) -> &ChatTranscript {
        &self.chat
    }

    pub fn notices(&self) -> &[DeskError] {
        &self.notices
    }

    /// Selects `filename` in the preview pane; returns the thumbnail request
    /// number when the remote has to generate them.
    pub(crate) fn show_preview(&mut self, filename: &str, kind: PreviewKind) -> Option<u64> {
        desk_debug!("Preview {filename} as {kind:?}");
        self.dirty = true;
        self.preview.show(filename, kind)
    }

    pub(crate) fn show_artifacts(&mut self, filename: &str, refs: Vec<String>) {
        self.dirty = true;
        self.preview.show_artifacts(filename, refs);
    }

    pub(crate) fn apply_thumbnails(
        &mut self,
        filename: &str,
        request: u64,
        result: Result<Vec<String>, String>,
    ) -> ThumbnailOutcome {
        let outcome = self.preview.apply_thumbnails(filename, request, result);
        if outcome != ThumbnailOutcome::Stale {
            self.dirty = true;
        }
        outcome
    }

    pub(crate) fn chat_mut(&mut self) -> &mut ChatTranscript {
        self.dirty = true;
        &mut self.chat
    }

    pub(crate) fn report(&mut self, error: DeskError) {
        desk_warn!("{error}");
        self.notices.push(error);
        if self.notices.len() > MAX_NOTICES {
            let overflow = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..overflow);
        }
        self.dirty = true;
    }

    /// Replaces the store with the remote listing, keeping local jobs that
    /// the remote has not finished yet. Returns the jobs whose interest was
    /// dropped.
    pub(crate) fn apply_listing(&mut self, listed: Vec<ListedFile>) -> Vec<JobHandle> {
        let mut dropped = Vec::new();
        let mut records = Vec::with_capacity(listed.len());
        for file in &listed {
            let mut record = FileRecord::from_listing(file);
            let previous = self.files.get(&file.filename);
            if let Some(previous) = previous {
                record.last_error = previous.last_error.clone();
            }
            if file.processed {
                dropped.extend(self.jobs.drop_interest(&file.filename));
            } else if self.jobs.contains(&file.filename) {
                record.status = FileStatus::Processing;
                if let Some(previous) = previous {
                    record.elapsed_seconds = previous.elapsed_seconds;
                    record.progress = previous.progress;
                }
            }
            records.push(record);
        }

        let orphaned: Vec<String> = self
            .jobs
            .iter()
            .filter(|handle| !listed.iter().any(|f| f.filename == handle.filename))
            .map(|handle| handle.filename.clone())
            .collect();
        for filename in orphaned {
            dropped.extend(self.jobs.drop_interest(&filename));
        }

        let selection_gone = self
            .preview
            .selected()
            .is_some_and(|selected| !listed.iter().any(|f| f.filename == selected));
        if selection_gone {
            self.preview.clear();
        }

        self.files.replace_all(records);
        desk_info!(
            "Loaded {} file(s), {} active job(s)",
            self.files.len(),
            self.jobs.len()
        );
        self.dirty = true;
        dropped
    }

    /// Adds an uploaded file; a same-named record is replaced and its job,
    /// if any, is dropped and returned.
    pub(crate) fn insert_upload(&mut self, file: ListedFile) -> Option<JobHandle> {
        let dropped = self.jobs.drop_interest(&file.filename);
        if let Err(duplicate) = self.files.add(FileRecord::from_listing(&file)) {
            self.report(duplicate);
        }
        desk_info!("Uploaded {} (processed={})", file.filename, file.processed);
        self.dirty = true;
        dropped
    }

    /// Deletes a record after the remote confirmed the removal.
    pub(crate) fn remove_file(&mut self, filename: &str) -> Option<JobHandle> {
        let Some(_) = self.files.remove(filename) else {
            desk_debug!("Removal of {filename} confirmed but no record was present");
            return None;
        };
        if self.preview.clear_if_selected(filename) {
            desk_debug!("Cleared preview of removed file {filename}");
        }
        desk_info!("Removed {filename}");
        self.dirty = true;
        self.jobs.drop_interest(filename)
    }

    /// `Unprocessed --start--> Processing`. `None` when the guard rejects it.
    pub(crate) fn start_job(&mut self, filename: &str) -> Option<JobId> {
        let record = self.files.get_mut(filename)?;
        if record.status != FileStatus::Unprocessed {
            return None;
        }
        let job_id = self.jobs.begin(filename)?;
        record.status = FileStatus::Processing;
        record.elapsed_seconds = 0;
        record.progress = None;
        record.last_error = None;
        desk_info!("Job {job_id}: {filename} Unprocessed -> Processing");
        self.dirty = true;
        Some(job_id)
    }

    /// True while `job_id` is the active job of a file that is still listed.
    pub(crate) fn is_live_job(&self, filename: &str, job_id: JobId) -> bool {
        self.files.contains(filename) && self.jobs.is_current(filename, job_id)
    }

    pub(crate) fn job_accepted(&mut self, filename: &str, job_id: JobId) -> bool {
        if !self.is_live_job(filename, job_id) {
            return false;
        }
        desk_debug!("Job {job_id}: remote accepted {filename}");
        self.jobs.mark_open(filename, job_id)
    }

    pub(crate) fn record_progress(
        &mut self,
        filename: &str,
        job_id: JobId,
        percent: Option<u8>,
    ) -> bool {
        if !self.is_live_job(filename, job_id) {
            return false;
        }
        if let (Some(record), Some(percent)) = (self.files.get_mut(filename), percent) {
            record.progress = Some(percent.min(100));
            self.dirty = true;
        }
        true
    }

    pub(crate) fn record_tick(&mut self, filename: &str, job_id: JobId, elapsed: u64) -> bool {
        if !self.is_live_job(filename, job_id) {
            return false;
        }
        match self.files.get_mut(filename) {
            Some(record) if record.status == FileStatus::Processing => {
                record.elapsed_seconds = elapsed;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// `Processing --complete--> Processed`.
    pub(crate) fn complete_job(&mut self, filename: &str, job_id: JobId) -> bool {
        if !self.is_live_job(filename, job_id) {
            return false;
        }
        self.jobs.finish(filename, job_id);
        if let Some(record) = self.files.get_mut(filename) {
            record.status = FileStatus::Processed;
            record.progress = None;
        }
        desk_info!("Job {job_id}: {filename} Processing -> Processed");
        self.dirty = true;
        true
    }

    /// `Processing --error--> Failed --> Unprocessed`.
    pub(crate) fn fail_job(&mut self, filename: &str, job_id: JobId, reason: &str) -> bool {
        if !self.is_live_job(filename, job_id) {
            return false;
        }
        self.jobs.finish(filename, job_id);
        if let Some(record) = self.files.get_mut(filename) {
            // Failed is never stored: the record reverts within this update.
            desk_info!("Job {job_id}: {filename} Processing -> Failed ({reason})");
            record.status = FileStatus::Unprocessed;
            record.elapsed_seconds = 0;
            record.progress = None;
            record.last_error = Some(reason.to_string());
            desk_debug!("Job {job_id}: {filename} Failed -> Unprocessed");
        }
        self.dirty = true;
        true
    }
}
