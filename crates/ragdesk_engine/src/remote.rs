use std::path::Path;
use std::time::Duration;

use desk_logging::{desk_debug, desk_info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::{ChatAnswer, FailureKind, RemoteError, RemoteFile};

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// HTTP collaborator owning files, processed flags and job execution.
#[async_trait::async_trait]
pub trait Remote: Send + Sync {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, RemoteError>;

    async fn upload_file(&self, path: &Path) -> Result<RemoteFile, RemoteError>;

    async fn remove_file(&self, filename: &str) -> Result<(), RemoteError>;

    /// Asks the remote to start a RAG job. A refusal is an error.
    async fn start_job(&self, filename: &str) -> Result<(), RemoteError>;

    /// Page thumbnails for a paginated document, in page order.
    async fn generate_preview(&self, filename: &str) -> Result<Vec<String>, RemoteError>;

    async fn submit_chat(
        &self,
        text: &str,
        chat_id: Option<&str>,
    ) -> Result<ChatAnswer, RemoteError>;
}

#[derive(Debug, Deserialize)]
struct FileListing {
    files: Vec<ListingEntry>,
}

/// Older servers list bare filenames without a processed flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingEntry {
    Name(String),
    Record(RemoteFile),
}

impl From<ListingEntry> for RemoteFile {
    fn from(entry: ListingEntry) -> Self {
        match entry {
            ListingEntry::Name(filename) => RemoteFile {
                filename,
                processed: false,
            },
            ListingEntry::Record(file) => file,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    thumbnails: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StartAck {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestRemote {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestRemote {
    pub fn new(settings: RemoteSettings) -> Result<Self, RemoteError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RemoteError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|err| RemoteError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Remote for ReqwestRemote {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, RemoteError> {
        let response = self
            .client
            .get(self.endpoint("files")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let listing: FileListing = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        let files: Vec<RemoteFile> = listing.files.into_iter().map(RemoteFile::from).collect();
        desk_debug!("Listed {} file(s)", files.len());
        Ok(files)
    }

    async fn upload_file(&self, path: &Path) -> Result<RemoteFile, RemoteError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RemoteError::new(FailureKind::Io, format!("{} has no file name", path.display()))
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| RemoteError::new(FailureKind::Io, err.to_string()))?;
        let byte_len = bytes.len();
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.clone()));

        let response = self
            .client
            .post(self.endpoint("upload")?)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let file: RemoteFile = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        desk_info!("Uploaded {filename} ({byte_len} bytes) as {}", file.filename);
        Ok(file)
    }

    async fn remove_file(&self, filename: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("remove")?)
            .form(&[("filename", filename)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn start_job(&self, filename: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.endpoint("rag/start")?)
            .form(&[("filename", filename)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(map_reqwest_error)?;
        // An empty or non-JSON body is a plain acknowledgement.
        let ack: StartAck = serde_json::from_str(&body).unwrap_or_default();
        match ack.error {
            Some(reason) => Err(RemoteError::new(FailureKind::Rejected, reason)),
            None => Ok(()),
        }
    }

    async fn generate_preview(&self, filename: &str) -> Result<Vec<String>, RemoteError> {
        let response = self
            .client
            .post(self.endpoint("screenshot")?)
            .form(&[("file_path", filename)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let thumbnails: Thumbnails = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(thumbnails.thumbnails)
    }

    async fn submit_chat(
        &self,
        text: &str,
        chat_id: Option<&str>,
    ) -> Result<ChatAnswer, RemoteError> {
        let mut fields = vec![("text", text)];
        if let Some(chat_id) = chat_id {
            fields.push(("chat_id", chat_id));
        }
        let response = self
            .client
            .post(self.endpoint("chat-submit")?)
            .form(&fields)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)
    }
}

/// Parses the server root so that relative endpoint paths join beneath it.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, RemoteError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|err| RemoteError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(RemoteError::new(
            FailureKind::InvalidUrl,
            format!("{trimmed} cannot be used as a base url"),
        ));
    }
    Ok(url)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    Err(RemoteError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RemoteError::new(FailureKind::Decode, err.to_string());
    }
    RemoteError::new(FailureKind::Network, err.to_string())
}
