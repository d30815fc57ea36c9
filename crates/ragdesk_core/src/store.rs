use crate::DeskError;

/// Client-visible processing status of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStatus {
    #[default]
    Unprocessed,
    Processing,
    Processed,
    /// Transient: a failed job returns the file to `Unprocessed` in the same update.
    Failed,
}

/// A file as reported by the remote listing or upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    pub filename: String,
    pub processed: bool,
}

impl ListedFile {
    pub fn new(filename: impl Into<String>, processed: bool) -> Self {
        Self {
            filename: filename.into(),
            processed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub filename: String,
    pub status: FileStatus,
    /// Only meaningful while `status == Processing`.
    pub elapsed_seconds: u64,
    pub progress: Option<u8>,
    pub last_error: Option<String>,
}

impl FileRecord {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: FileStatus::Unprocessed,
            elapsed_seconds: 0,
            progress: None,
            last_error: None,
        }
    }

    pub fn from_listing(file: &ListedFile) -> Self {
        let mut record = Self::new(file.filename.clone());
        if file.processed {
            record.status = FileStatus::Processed;
        }
        record
    }
}

/// Ordered set of known files, at most one record per filename.
///
/// Listing order is preserved; uploads append at the end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRecordStore {
    records: Vec<FileRecord>,
}

impl FileRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set. Later duplicates in `records` win.
    pub fn replace_all(&mut self, records: Vec<FileRecord>) {
        self.records.clear();
        for record in records {
            // Duplicates inside one listing are not an error worth reporting.
            let _ = self.add(record);
        }
    }

    /// Inserts a record. An existing record with the same filename is
    /// replaced and reported as `DuplicateFilename`.
    pub fn add(&mut self, record: FileRecord) -> Result<(), DeskError> {
        match self.position(&record.filename) {
            Some(index) => {
                let filename = record.filename.clone();
                self.records[index] = record;
                Err(DeskError::DuplicateFilename(filename))
            }
            None => {
                self.records.push(record);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, filename: &str) -> Option<FileRecord> {
        self.position(filename)
            .map(|index| self.records.remove(index))
    }

    pub fn get(&self, filename: &str) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.filename == filename)
    }

    pub fn get_mut(&mut self, filename: &str) -> Option<&mut FileRecord> {
        self.records
            .iter_mut()
            .find(|record| record.filename == filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.position(filename).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, filename: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.filename == filename)
    }
}
