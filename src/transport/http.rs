//! A [`Transport`] over HTTP

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use reqwest::header::CONTENT_LENGTH;
use url::Url;

use crate::config::ServiceConfig;
use crate::error::Result;
use super::{lock, Headers, Response, Transport};

/// Sends requests to an actual calendar server
pub struct HttpTransport {
    client: reqwest::Client,
    gdata_version: String,
    auth_token: Mutex<Option<String>>,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            gdata_version: config.gdata_version.clone(),
            auth_token: Mutex::new(None),
        }
    }

    async fn send(&self, method: Method, locator: &Url, body: Option<String>, headers: Headers) -> Result<Response> {
        log::debug!("{} {}", method, locator);
        let mut request: RequestBuilder = self.client
            .request(method, locator.clone())
            .header("GData-Version", self.gdata_version.as_str());

        let auth_token = lock(&self.auth_token).clone();
        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("GoogleLogin auth={}", token));
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_LENGTH, body.len())
                .body(body);
        }

        let reply = request.send().await?;

        let mut response = Response::new(reply.status().as_u16(), "");
        for (name, value) in reply.headers() {
            match value.to_str() {
                Ok(value) => response = response.with_header(name.as_str(), value),
                Err(_) => log::debug!("Ignoring non-ASCII header {}", name),
            }
        }
        let text = reply.text().await?;
        log::debug!("{} replied with status {}", locator, response.status());
        Ok(Response { body: text, ..response })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, locator: &Url) -> Result<Response> {
        self.send(Method::GET, locator, None, Headers::new()).await
    }

    async fn create(&self, locator: &Url, body: String, headers: Headers) -> Result<Response> {
        self.send(Method::POST, locator, Some(body), headers).await
    }

    async fn replace(&self, locator: &Url, body: String, headers: Headers) -> Result<Response> {
        self.send(Method::PUT, locator, Some(body), headers).await
    }

    async fn remove(&self, locator: &Url, headers: Headers) -> Result<Response> {
        self.send(Method::DELETE, locator, None, headers).await
    }

    fn set_auth_token(&self, token: &str) {
        *lock(&self.auth_token) = Some(token.to_string());
    }

    fn auth_token(&self) -> Option<String> {
        lock(&self.auth_token).clone()
    }
}
