//! Authenticated session against one account.
//!
//! A [`Session`] owns the transport, the configuration and the auth token.
//! Every mailbox, transfer and compose operation is a method on it.
//!
//! ## Example
//!
//! ```ignore
//! use zimbra_client::{ClientConfig, HttpTransport, Session};
//!
//! let config = ClientConfig::new("https://zimbra.example.net")?;
//! let mut session =
//!     Session::authenticate(HttpTransport::new(), config, "user@example.net", "secret").await?;
//!
//! assert!(session.is_authenticated());
//!
//! // Later, after the token expired
//! session.reauthenticate("secret").await?;
//! ```

use std::fmt;

use tracing::{debug, info, warn};
use zimbra_wire::{AuthResponse, Namespace, Request, Response, text_content};

use crate::config::ClientConfig;
use crate::error::{AuthError, CallError, TransportError};
use crate::transport::{HttpRequest, HttpTransport, Transport};

/// HTTP header carrying the CSRF token issued at login.
pub const CSRF_HEADER: &str = "X-Zimbra-Csrf-Token";

/// An account session.
pub struct Session<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
    account: String,
    token: Option<String>,
    csrf_token: Option<String>,
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url.as_str())
            .field("account", &self.account)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Creates a session that is not yet authenticated.
    ///
    /// Operations other than [`Session::reauthenticate`] fail with
    /// `NotAuthenticated` until a token is obtained.
    #[must_use]
    pub fn new(transport: T, config: ClientConfig, account: impl Into<String>) -> Self {
        Self {
            transport,
            config,
            account: account.into(),
            token: None,
            csrf_token: None,
        }
    }

    /// Logs in and returns an authenticated session.
    ///
    /// # Errors
    ///
    /// - `AuthError::Transport` if the request does not complete
    /// - `AuthError::Rejected` if the server answers with a fault
    /// - `AuthError::MissingToken` if the response carries no token
    pub async fn authenticate(
        transport: T,
        config: ClientConfig,
        account: impl Into<String>,
        secret: &str,
    ) -> Result<Self, AuthError> {
        let mut session = Self::new(transport, config, account);
        session.reauthenticate(secret).await?;
        Ok(session)
    }

    /// Logs in again with the session's account, replacing any token.
    ///
    /// The previous token is dropped before the request is sent, so a failed
    /// attempt leaves the session unauthenticated.
    ///
    /// # Errors
    ///
    /// Same as [`Session::authenticate`].
    pub async fn reauthenticate(&mut self, secret: &str) -> Result<(), AuthError> {
        self.invalidate();

        let request = Request::new("AuthRequest", Namespace::Account)
            .element(
                "account",
                serde_json::json!({ "by": "name", "_content": self.account }),
            )
            .text("password", secret);

        let response = self.exchange(&request, None).await?;
        let auth: Option<AuthResponse> = response
            .element("AuthResponse")
            .map_err(TransportError::Malformed)?;
        let auth = auth.ok_or(AuthError::MissingToken)?;

        let token = auth
            .auth_token
            .as_ref()
            .and_then(text_content)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.token = Some(token.to_string());
        self.csrf_token = auth
            .csrf_token
            .as_ref()
            .and_then(text_content)
            .map(str::to_string);

        info!(
            account = %self.account,
            lifetime_ms = auth.lifetime,
            "Authenticated"
        );
        Ok(())
    }

    /// Drops the auth token.
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            debug!(account = %self.account, "Session token dropped");
        }
        self.csrf_token = None;
    }

    /// Returns true if the session holds a token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the auth token.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the CSRF token issued at login, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Returns the account name.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends an authenticated SOAP request.
    ///
    /// An auth-class fault drops the token before the fault is returned.
    pub(crate) async fn call(&mut self, request: &Request) -> Result<Response, CallError> {
        let token = self.token.clone().ok_or(CallError::NotAuthenticated)?;

        match self.exchange(request, Some(&token)).await {
            Err(CallError::Fault(fault)) if fault.is_auth_failure() => {
                warn!(
                    account = %self.account,
                    request = request.name(),
                    code = fault.code.as_deref().unwrap_or_default(),
                    "Session rejected by server, token dropped"
                );
                self.invalidate();
                Err(CallError::Fault(fault))
            }
            other => other,
        }
    }

    /// Performs one SOAP round trip.
    async fn exchange(
        &self,
        request: &Request,
        token: Option<&str>,
    ) -> Result<Response, CallError> {
        let body = request.encode(token).map_err(TransportError::Encode)?;
        let url = self.config.soap_url().map_err(TransportError::from)?;

        let mut http = HttpRequest::post(url, body).with_header("Content-Type", "application/json");
        if let Some(csrf) = &self.csrf_token {
            http = http.with_header(CSRF_HEADER, csrf.clone());
        }

        debug!(request = request.name(), "Sending SOAP request");
        let response = self.transport.execute(http).await?;
        debug!(
            request = request.name(),
            status = response.status,
            bytes = response.body.len(),
            "SOAP response received"
        );

        // Faults arrive with a 500 status, so the body is decoded first.
        match Response::decode(&response.body) {
            Err(zimbra_wire::Error::Fault(fault)) => Err(CallError::Fault(fault)),
            _ if !response.is_success() => Err(TransportError::Status {
                status: response.status,
            }
            .into()),
            Ok(decoded) => Ok(decoded),
            Err(e) => Err(TransportError::Malformed(e).into()),
        }
    }

    /// Returns the cookie header value for upload and content requests.
    pub(crate) fn auth_cookie(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(|token| self.config.auth_cookie_header(token))
    }
}
