use std::collections::BTreeMap;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Start call sent, no answer yet.
    Requested,
    /// Remote accepted; the push channel is being driven.
    Open,
}

/// Core-side marker for the one in-flight job of a file. The push channel
/// itself lives in the engine task registered under `job_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub filename: String,
    pub phase: JobPhase,
}

/// Normalized push-channel events, as seen by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// Liveness signal; may carry a percentage.
    Progress { percent: Option<u8> },
    Complete { artifacts: Option<Vec<String>> },
    Error { reason: String },
    ChannelError { reason: String },
    ChannelClosed,
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress { .. })
    }
}

/// Active job handles keyed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTable {
    handles: BTreeMap<String, JobHandle>,
    next_job_id: JobId,
}

impl Default for JobTable {
    fn default() -> Self {
        Self {
            handles: BTreeMap::new(),
            next_job_id: 1,
        }
    }
}

impl JobTable {
    /// Registers a new job for `filename` unless one is already active.
    pub fn begin(&mut self, filename: &str) -> Option<JobId> {
        if self.handles.contains_key(filename) {
            return None;
        }
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.handles.insert(
            filename.to_string(),
            JobHandle {
                job_id,
                filename: filename.to_string(),
                phase: JobPhase::Requested,
            },
        );
        Some(job_id)
    }

    /// True when `job_id` is the active job of `filename`.
    pub fn is_current(&self, filename: &str, job_id: JobId) -> bool {
        self.handles
            .get(filename)
            .is_some_and(|handle| handle.job_id == job_id)
    }

    pub fn mark_open(&mut self, filename: &str, job_id: JobId) -> bool {
        match self.handles.get_mut(filename) {
            Some(handle) if handle.job_id == job_id => {
                handle.phase = JobPhase::Open;
                true
            }
            _ => false,
        }
    }

    /// Destroys the handle if `job_id` is still the active job of `filename`.
    pub fn finish(&mut self, filename: &str, job_id: JobId) -> Option<JobHandle> {
        if self.is_current(filename, job_id) {
            self.handles.remove(filename)
        } else {
            None
        }
    }

    /// Drops whatever job is active for `filename`.
    pub fn drop_interest(&mut self, filename: &str) -> Option<JobHandle> {
        self.handles.remove(filename)
    }

    pub fn get(&self, filename: &str) -> Option<&JobHandle> {
        self.handles.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.handles.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobHandle> {
        self.handles.values()
    }
}
