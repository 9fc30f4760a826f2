//! Client configuration: server location and service endpoints.

use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

/// Default SOAP service path.
pub const DEFAULT_SOAP_PATH: &str = "service/soap/";

/// Default upload service path. `fmt=raw` selects the one-line response.
pub const DEFAULT_UPLOAD_PATH: &str = "service/upload?fmt=raw";

/// Default content service path.
pub const DEFAULT_CONTENT_PATH: &str = "service/content/get";

/// Default auth cookie name.
pub const DEFAULT_AUTH_COOKIE: &str = "ZM_AUTH_TOKEN";

/// Server-side cap on search page size.
pub const MAX_SEARCH_LIMIT: u32 = 1_000;

/// Client configuration.
///
/// Paths are relative to `base_url`, so a server mounted under a prefix
/// (e.g. `https://www.example.net/zimbra`) keeps that prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL, e.g. `https://zimbra.example.net`.
    pub base_url: Url,
    /// SOAP service path.
    #[serde(default = "default_soap_path")]
    pub soap_path: String,
    /// Upload service path.
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// Content service path.
    #[serde(default = "default_content_path")]
    pub content_path: String,
    /// Cookie carrying the auth token on upload and content requests.
    #[serde(default = "default_auth_cookie")]
    pub auth_cookie: String,
    /// Locale sent with searches (affects date parsing in queries).
    #[serde(default)]
    pub locale: Option<String>,
    /// Default search page size.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

fn default_soap_path() -> String {
    DEFAULT_SOAP_PATH.to_string()
}

fn default_upload_path() -> String {
    DEFAULT_UPLOAD_PATH.to_string()
}

fn default_content_path() -> String {
    DEFAULT_CONTENT_PATH.to_string()
}

fn default_auth_cookie() -> String {
    DEFAULT_AUTH_COOKIE.to_string()
}

const fn default_search_limit() -> u32 {
    MAX_SEARCH_LIMIT
}

impl ClientConfig {
    /// Creates a configuration with default endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> crate::Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            soap_path: default_soap_path(),
            upload_path: default_upload_path(),
            content_path: default_content_path(),
            auth_cookie: default_auth_cookie(),
            locale: None,
            search_limit: default_search_limit(),
        })
    }

    /// Sets the search locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the default search page size, capped at [`MAX_SEARCH_LIMIT`].
    #[must_use]
    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit.min(MAX_SEARCH_LIMIT);
        self
    }

    /// Sets the auth cookie name.
    #[must_use]
    pub fn with_auth_cookie(mut self, name: impl Into<String>) -> Self {
        self.auth_cookie = name.into();
        self
    }

    /// Sets the SOAP service path.
    #[must_use]
    pub fn with_soap_path(mut self, path: impl Into<String>) -> Self {
        self.soap_path = path.into();
        self
    }

    /// Sets the upload service path.
    #[must_use]
    pub fn with_upload_path(mut self, path: impl Into<String>) -> Self {
        self.upload_path = path.into();
        self
    }

    /// Sets the content service path.
    #[must_use]
    pub fn with_content_path(mut self, path: impl Into<String>) -> Self {
        self.content_path = path.into();
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
    }

    /// Returns the SOAP endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn soap_url(&self) -> Result<Url, ParseError> {
        self.endpoint(&self.soap_path)
    }

    /// Returns the upload endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn upload_url(&self) -> Result<Url, ParseError> {
        self.endpoint(&self.upload_path)
    }

    /// Returns the content URL for one message part.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn content_url(&self, message_id: &str, part: &str) -> Result<Url, ParseError> {
        let mut url = self.endpoint(&self.content_path)?;
        url.query_pairs_mut()
            .append_pair("id", message_id)
            .append_pair("part", part);
        Ok(url)
    }

    /// Formats the auth cookie header value.
    #[must_use]
    pub fn auth_cookie_header(&self, token: &str) -> String {
        format!("{}={token}", self.auth_cookie)
    }
}
