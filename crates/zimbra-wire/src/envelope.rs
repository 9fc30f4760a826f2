//! JSON-SOAP envelope encoding and decoding.
//!
//! The server accepts SOAP expressed as JSON with a few fixed conventions:
//!
//! - no `Envelope` wrapper, only `Header` and `Body`
//! - every namespaced element carries a `_jsns` attribute
//! - element text content lives under `_content`
//!
//! ```text
//! {
//!   "Header": { "context": { "_jsns": "urn:zimbra", "authToken": { "_content": "..." } } },
//!   "Body":   { "SearchRequest": { "_jsns": "urn:zimbraMail", "query": { "_content": "..." } } }
//! }
//! ```

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Namespace attribute key.
pub const NAMESPACE_KEY: &str = "_jsns";

/// Text content key.
pub const CONTENT_KEY: &str = "_content";

/// Namespace of the header context element.
pub const CONTEXT_NAMESPACE: &str = "urn:zimbra";

/// Request namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Account service (`urn:zimbraAccount`), used for authentication.
    Account,
    /// Mail service (`urn:zimbraMail`).
    Mail,
}

impl Namespace {
    /// Returns the namespace URN.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "urn:zimbraAccount",
            Self::Mail => "urn:zimbraMail",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a value as element text content: `{"_content": value}`.
#[must_use]
pub fn text(value: impl Into<String>) -> Value {
    let mut element = Map::new();
    element.insert(CONTENT_KEY.to_string(), Value::String(value.into()));
    Value::Object(element)
}

/// Reads element text content.
///
/// Accepts `{"_content": "x"}`, a list whose first item has text content,
/// or a bare string.
#[must_use]
pub fn text_content(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(text_content),
        Value::Object(element) => element.get(CONTENT_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// A SOAP request body element, e.g. `SearchRequest`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    name: String,
    element: Map<String, Value>,
}

impl Request {
    /// Creates a request element tagged with its namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        let mut element = Map::new();
        element.insert(
            NAMESPACE_KEY.to_string(),
            Value::String(namespace.as_str().to_string()),
        );
        Self {
            name: name.into(),
            element,
        }
    }

    /// Sets a plain attribute.
    #[must_use]
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.element.insert(key.to_string(), value.into());
        self
    }

    /// Sets a text-bearing child element.
    #[must_use]
    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.element.insert(key.to_string(), text(value));
        self
    }

    /// Sets a structured child element.
    #[must_use]
    pub fn element(mut self, key: &str, value: Value) -> Self {
        self.element.insert(key.to_string(), value);
        self
    }

    /// Returns the request name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a child attribute or element.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.element.get(key)
    }

    /// Builds the full envelope.
    ///
    /// The `Header` is only present when a token is supplied.
    #[must_use]
    pub fn to_envelope(&self, token: Option<&str>) -> Value {
        let mut body = Map::new();
        body.insert(self.name.clone(), Value::Object(self.element.clone()));

        let mut envelope = Map::new();
        if let Some(token) = token {
            let mut context = Map::new();
            context.insert(
                NAMESPACE_KEY.to_string(),
                Value::String(CONTEXT_NAMESPACE.to_string()),
            );
            context.insert("authToken".to_string(), text(token));

            let mut header = Map::new();
            header.insert("context".to_string(), Value::Object(context));
            envelope.insert("Header".to_string(), Value::Object(header));
        }
        envelope.insert("Body".to_string(), Value::Object(body));

        Value::Object(envelope)
    }

    /// Encodes the envelope to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self, token: Option<&str>) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_envelope(token)).map_err(Into::into)
    }
}

/// A SOAP fault returned under `Body.Fault`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// Server error code (e.g. `account.AUTH_FAILED`), from `Detail.Error.Code`.
    pub code: Option<String>,
    /// Human-readable reason, from `Reason.Text`.
    pub reason: String,
    /// Raw fault payload.
    pub detail: Value,
}

/// Fault codes that mean the auth token is no longer usable.
const AUTH_FAULT_CODES: &[&str] = &[
    "service.AUTH_EXPIRED",
    "service.AUTH_REQUIRED",
    "account.AUTH_FAILED",
];

impl Fault {
    /// Extracts a fault from its wire object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let code = value
            .pointer("/Detail/Error/Code")
            .and_then(text_content)
            .map(str::to_string);
        let reason = value
            .pointer("/Reason/Text")
            .and_then(text_content)
            .unwrap_or("unknown fault")
            .to_string();

        Self {
            code,
            reason,
            detail: value.clone(),
        }
    }

    /// Returns true if the fault invalidates the current session.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| AUTH_FAULT_CODES.contains(&code))
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

/// A decoded, fault-free response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    body: Map<String, Value>,
}

impl Response {
    /// Decodes response bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed JSON, `Error::MissingElement` when
    /// there is no `Body` object, and `Error::Fault` when the body carries a
    /// fault.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes)?;
        let Value::Object(mut root) = root else {
            return Err(Error::MissingElement("Body".to_string()));
        };
        let Some(Value::Object(body)) = root.remove("Body") else {
            return Err(Error::MissingElement("Body".to_string()));
        };

        if let Some(fault) = body.get("Fault") {
            return Err(Error::Fault(Fault::from_value(fault)));
        }

        Ok(Self { body })
    }

    /// Returns a raw body element.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Deserializes a body element, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the element does not match `T`.
    pub fn element<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.body
            .get(name)
            .map(T::deserialize)
            .transpose()
            .map_err(Into::into)
    }

    /// Deserializes a body element that must be present.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingElement` if absent.
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.element(name)?
            .ok_or_else(|| Error::MissingElement(name.to_string()))
    }
}
