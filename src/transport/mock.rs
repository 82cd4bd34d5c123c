//! A scripted [`Transport`], that does not need any server
//!
//! Replies are queued per (verb, locator). The last queued reply of a route is repeated for every further request.
//! Every request is recorded, so that callers can check what would have been sent.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::{Error, Result};
use super::{lock, Headers, Response, Transport};

/// The four transport operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Fetch,
    Create,
    Replace,
    Remove,
}

/// A request received by a [`MockTransport`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub locator: String,
    pub body: Option<String>,
    pub headers: Headers,
    /// The token that would have been attached to this request
    pub auth_token: Option<String>,
}

#[derive(Clone, Debug)]
enum Reply {
    Respond(Response),
    Fail(String),
}

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(Verb, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    auth_token: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `verb` request on `locator`
    pub fn reply<S: AsRef<str>>(&self, verb: Verb, locator: S, response: Response) {
        self.enqueue(verb, locator.as_ref(), Reply::Respond(response));
    }

    /// Make the next `verb` request on `locator` fail, as if the network was down
    pub fn fail<S: AsRef<str>, M: ToString>(&self, verb: Verb, locator: S, message: M) {
        self.enqueue(verb, locator.as_ref(), Reply::Fail(message.to_string()));
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// The requests received so far for a given verb
    pub fn requests_for(&self, verb: Verb) -> Vec<RecordedRequest> {
        lock(&self.requests).iter()
            .filter(|req| req.verb == verb)
            .cloned()
            .collect()
    }

    fn enqueue(&self, verb: Verb, locator: &str, reply: Reply) {
        lock(&self.replies)
            .entry((verb, normalize(locator)))
            .or_default()
            .push_back(reply);
    }

    fn handle(&self, verb: Verb, locator: &Url, body: Option<String>, headers: Headers) -> Result<Response> {
        log::debug!("Mock transport: {:?} {}", verb, locator);
        lock(&self.requests).push(RecordedRequest {
            verb,
            locator: locator.to_string(),
            body,
            headers,
            auth_token: self.auth_token(),
        });

        let mut replies = lock(&self.replies);
        let queue = match replies.get_mut(&(verb, normalize(locator.as_str()))) {
            None => return Err(Error::Transport(format!("No reply scripted for {:?} {}", verb, locator))),
            Some(queue) => queue,
        };
        let reply = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        match reply {
            None => Err(Error::Transport(format!("No reply scripted for {:?} {}", verb, locator))),
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(Error::Transport(message)),
        }
    }
}

/// Scripted locators go through the same normalisation as the ones the crate builds
fn normalize(locator: &str) -> String {
    match Url::parse(locator) {
        Ok(url) => url.to_string(),
        Err(_) => locator.to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, locator: &Url) -> Result<Response> {
        self.handle(Verb::Fetch, locator, None, Headers::new())
    }

    async fn create(&self, locator: &Url, body: String, headers: Headers) -> Result<Response> {
        self.handle(Verb::Create, locator, Some(body), headers)
    }

    async fn replace(&self, locator: &Url, body: String, headers: Headers) -> Result<Response> {
        self.handle(Verb::Replace, locator, Some(body), headers)
    }

    async fn remove(&self, locator: &Url, headers: Headers) -> Result<Response> {
        self.handle(Verb::Remove, locator, None, headers)
    }

    fn set_auth_token(&self, token: &str) {
        *lock(&self.auth_token) = Some(token.to_string());
    }

    fn auth_token(&self) -> Option<String> {
        lock(&self.auth_token).clone()
    }
}
