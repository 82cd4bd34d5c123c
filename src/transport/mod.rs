//! The boundary between the model layer and the network
//!
//! Calendars, events and sessions never open sockets themselves. They hand request bodies to a [`Transport`], and interpret the [`Response`]s it returns.
//! [`HttpTransport`](http::HttpTransport) talks to an actual server, [`MockTransport`](mock::MockTransport) replies with scripted responses.

pub mod http;
pub mod mock;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use url::Url;

use crate::entity::VersionTag;
use crate::error::{Error, Result};

/// Request or response headers. Names of response headers are lower-cased
pub type Headers = HashMap<String, String>;

pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// What a server replied
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: String,
}

impl Response {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self { status, headers: Headers::new(), body: body.into() }
    }

    /// Add a header to this response
    pub fn with_header<N: AsRef<str>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.headers.insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn body(&self) -> &str  { &self.body }
    pub fn headers(&self) -> &Headers { &self.headers }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    /// Classify a non-success response to a request on `locator`
    pub fn to_error(&self, locator: &Url) -> Error {
        match self.status {
            409 | 412 => Error::Conflict { locator: locator.to_string() },
            status => Error::Transport(format!("unexpected HTTP status {} from {}", status, locator)),
        }
    }
}


/// The four operations the model layer needs from the network.
///
/// Implementors are responsible for attaching the bearer token (see [`Transport::set_auth_token`]) to every request, as well as for timeouts and cancellation.
/// A non-success HTTP status is not a transport failure: it is returned as a [`Response`] and classified by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET
    async fn fetch(&self, locator: &Url) -> Result<Response>;
    /// POST
    async fn create(&self, locator: &Url, body: String, headers: Headers) -> Result<Response>;
    /// PUT
    async fn replace(&self, locator: &Url, body: String, headers: Headers) -> Result<Response>;
    /// DELETE
    async fn remove(&self, locator: &Url, headers: Headers) -> Result<Response>;

    /// Called once an account has been authenticated. Every subsequent request must carry this token
    fn set_auth_token(&self, token: &str);

    /// The token attached to requests, if an account has been authenticated
    fn auth_token(&self) -> Option<String>;
}

/// Fail with [`Error::NotAuthenticated`] unless `transport` holds a token, so that no anonymous request is sent
pub fn ensure_authenticated(transport: &dyn Transport) -> Result<()> {
    match transport.auth_token() {
        Some(token) if token.is_empty() == false => Ok(()),
        _ => Err(Error::NotAuthenticated),
    }
}


/// Headers of every Atom write
pub fn atom_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(String::from("Content-Type"), String::from(ATOM_CONTENT_TYPE));
    headers
}

/// Headers of a conditional write, that the server must reject if the entity has changed since it had `version_tag`
pub fn conditional_headers(version_tag: &VersionTag) -> Headers {
    let mut headers = atom_headers();
    headers.insert(String::from("If-Match"), version_tag.as_str().to_string());
    headers
}

/// Lock a mutex, even if a thread panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
