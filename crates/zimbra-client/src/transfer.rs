//! Attachment upload and download.
//!
//! Uploads go to the upload service, which answers with an attachment id
//! usable in a later `SendMsgRequest`. Downloads fetch one part of a stored
//! message from the content service. Both authenticate with the token cookie.
//!
//! Uploads are sequential and fail fast. Ids of items uploaded before a
//! failure are not reclaimed; the server expires them on its own.

use std::fmt;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};
use zimbra_wire::{Attachment, Message, parse_upload_response};

use crate::error::{DownloadError, TransportError, UploadError};
use crate::session::Session;
use crate::transport::{HttpRequest, Transport};

/// Characters escaped in the upload filename (RFC 3986 unreserved are kept).
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<R: Read + Seek> ReadSeek for R {}

/// Where upload content comes from.
pub enum UploadSource {
    /// In-memory bytes.
    Buffer(Vec<u8>),
    /// A file read at upload time.
    File(PathBuf),
    /// A seekable stream, rewound to its start before each upload.
    Stream(Box<dyn ReadSeek + Send>),
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A named attachment to upload.
#[derive(Debug)]
pub struct UploadItem {
    /// Filename presented to the server.
    pub basename: String,
    /// Content.
    pub source: UploadSource,
}

impl UploadItem {
    /// Creates an item from in-memory bytes.
    #[must_use]
    pub fn from_bytes(basename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            basename: basename.into(),
            source: UploadSource::Buffer(bytes.into()),
        }
    }

    /// Creates an item from a file, named after the file.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            basename,
            source: UploadSource::File(path.to_path_buf()),
        }
    }

    /// Creates an item from a seekable stream.
    #[must_use]
    pub fn from_stream(basename: impl Into<String>, stream: impl ReadSeek + Send + 'static) -> Self {
        Self {
            basename: basename.into(),
            source: UploadSource::Stream(Box::new(stream)),
        }
    }

    /// Reads the full content.
    ///
    /// Stream reads run on the blocking pool; the stream is put back
    /// afterwards so the item can be uploaded again.
    async fn read_payload(&mut self) -> Result<Vec<u8>, UploadError> {
        let basename = self.basename.as_str();
        let invalid = |reason: &str, source| UploadError::InvalidSource {
            basename: basename.to_string(),
            reason: reason.to_string(),
            source: Some(source),
        };

        match &mut self.source {
            UploadSource::Buffer(bytes) => Ok(bytes.clone()),
            UploadSource::File(path) => tokio::fs::read(path.as_path())
                .await
                .map_err(|e| invalid("cannot read file", e)),
            UploadSource::Stream(stream) => {
                let mut taken = std::mem::replace(stream, Box::new(io::Cursor::new(Vec::new())));
                let (taken, result) = tokio::task::spawn_blocking(move || {
                    let result = read_from_start(taken.as_mut());
                    (taken, result)
                })
                .await
                .map_err(|e| invalid("stream reader panicked", io::Error::other(e)))?;
                *stream = taken;
                result.map_err(|(reason, e)| invalid(reason, e))
            }
        }
    }
}

/// Rewinds a stream and reads it to the end.
fn read_from_start(stream: &mut dyn ReadSeek) -> Result<Vec<u8>, (&'static str, io::Error)> {
    stream
        .rewind()
        .map_err(|e| ("cannot rewind stream", e))?;
    let mut payload = Vec::new();
    stream
        .read_to_end(&mut payload)
        .map_err(|e| ("cannot read stream", e))?;
    Ok(payload)
}

/// Result of one successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAttachment {
    /// Filename presented to the server.
    pub basename: String,
    /// Id to reference in `m.attach.aid`.
    pub attachment_id: String,
}

/// One downloaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAttachment {
    /// Attachment metadata from the message.
    pub attachment: Attachment,
    /// Raw content.
    pub payload: Vec<u8>,
}

impl<T: Transport> Session<T> {
    /// Uploads one item.
    ///
    /// # Errors
    ///
    /// - `UploadError::NotAuthenticated` without a token
    /// - `UploadError::InvalidSource` for an empty basename or unreadable content
    /// - `UploadError::Transport` if the request fails
    /// - `UploadError::Rejected` if the service reports a non-200 code
    /// - `UploadError::MalformedResponse` if the reply cannot be parsed
    pub async fn upload_one(&self, item: &mut UploadItem) -> Result<UploadedAttachment, UploadError> {
        let cookie = self.auth_cookie().ok_or(UploadError::NotAuthenticated)?;
        if item.basename.is_empty() {
            return Err(UploadError::InvalidSource {
                basename: String::new(),
                reason: "empty basename".to_string(),
                source: None,
            });
        }
        let payload = item.read_payload().await?;

        let url = self.config().upload_url().map_err(TransportError::from)?;
        let filename = utf8_percent_encode(&item.basename, FILENAME_ENCODE_SET);
        let request = HttpRequest::post(url, payload)
            .with_header("Content-Type", "application/octet-stream")
            .with_header(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            )
            .with_header("Content-Transfer-Encoding", "binary")
            .with_header("Cookie", cookie);

        debug!(basename = %item.basename, bytes = request.body.len(), "Uploading attachment");
        let response = self.transport().execute(request).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
            }
            .into());
        }

        let line = String::from_utf8_lossy(&response.body);
        let receipt =
            parse_upload_response(&line).map_err(|source| UploadError::MalformedResponse {
                basename: item.basename.clone(),
                source,
            })?;
        if !receipt.is_success() {
            warn!(
                basename = %item.basename,
                status_code = receipt.status,
                "Upload rejected"
            );
            return Err(UploadError::Rejected {
                basename: item.basename.clone(),
                status_code: receipt.status,
            });
        }

        debug!(
            basename = %item.basename,
            attachment_id = %receipt.attachment_id,
            "Attachment uploaded"
        );
        Ok(UploadedAttachment {
            basename: item.basename.clone(),
            attachment_id: receipt.attachment_id,
        })
    }

    /// Uploads items in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first item's error; see [`Session::upload_one`].
    pub async fn upload(
        &self,
        items: &mut [UploadItem],
    ) -> Result<Vec<UploadedAttachment>, UploadError> {
        let mut uploaded = Vec::with_capacity(items.len());
        for item in items.iter_mut() {
            uploaded.push(self.upload_one(item).await?);
        }
        Ok(uploaded)
    }

    /// Downloads the message's attachments accepted by `filter`.
    ///
    /// # Errors
    ///
    /// - `DownloadError::NotAuthenticated` without a token
    /// - `DownloadError::NotFound` if the server has no such part
    /// - `DownloadError::Transport` for any other failure
    pub async fn download<F>(
        &self,
        message: &Message,
        filter: F,
    ) -> Result<Vec<DownloadedAttachment>, DownloadError>
    where
        F: Fn(&Attachment) -> bool,
    {
        let cookie = self.auth_cookie().ok_or(DownloadError::NotAuthenticated)?;

        let mut downloaded = Vec::new();
        for attachment in message.attachments.iter().filter(|a| filter(a)) {
            let payload = self.fetch_part(&message.id, &attachment.part, &cookie).await?;
            downloaded.push(DownloadedAttachment {
                attachment: attachment.clone(),
                payload,
            });
        }
        Ok(downloaded)
    }

    /// Downloads every attachment of the message.
    ///
    /// # Errors
    ///
    /// Same as [`Session::download`].
    pub async fn download_all(
        &self,
        message: &Message,
    ) -> Result<Vec<DownloadedAttachment>, DownloadError> {
        self.download(message, |_| true).await
    }

    async fn fetch_part(
        &self,
        message_id: &str,
        part: &str,
        cookie: &str,
    ) -> Result<Vec<u8>, DownloadError> {
        let failed = |source| DownloadError::Transport {
            message_id: message_id.to_string(),
            part: part.to_string(),
            source,
        };

        let url = self
            .config()
            .content_url(message_id, part)
            .map_err(|e| failed(TransportError::from(e)))?;
        let request = HttpRequest::get(url).with_header("Cookie", cookie);

        debug!(message_id, part, "Downloading attachment");
        let response = self.transport().execute(request).await.map_err(failed)?;

        match response.status {
            404 => Err(DownloadError::NotFound {
                message_id: message_id.to_string(),
                part: part.to_string(),
            }),
            _ if response.is_success() => Ok(response.body),
            status => Err(failed(TransportError::Status { status })),
        }
    }
}
