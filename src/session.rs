//! Authentication, and the entry point to the calendars of an account

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::calendar::{self, CalendarRecord};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::transport::{self, Headers, Transport};

/// The Google service name of the calendar
const CALENDAR_SERVICE: &str = "cl";

/// A session with the calendar service, on behalf of one account.
///
/// A session must be authenticated (see [`AccountSession::authenticate`]) before its calendars can be listed.
pub struct AccountSession {
    transport: Arc<dyn Transport>,
    config: Arc<ServiceConfig>,
    account: Option<String>,
    auth_token: Option<String>,
}

impl AccountSession {
    /// Create an unauthenticated session that talks to the default service locations
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ServiceConfig::default())
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: ServiceConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            account: None,
            auth_token: None,
        }
    }

    pub fn account(&self) -> Option<&str>             { self.account.as_deref() }
    pub fn auth_token(&self) -> Option<&str>          { self.auth_token.as_deref() }
    pub fn is_authenticated(&self) -> bool            { self.auth_token.is_some() }
    pub fn transport(&self) -> &Arc<dyn Transport>    { &self.transport }
    pub fn config(&self) -> &Arc<ServiceConfig>       { &self.config }

    /// Log in with an account name and its password.
    ///
    /// On success, the transport is given the token, so that every later request is authorized.
    /// On failure, the session is left as it was
    pub async fn authenticate(&mut self, account: &str, secret: &str) -> Result<()> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("Email", account)
            .append_pair("Passwd", secret)
            .append_pair("source", &self.config.source)
            .append_pair("service", CALENDAR_SERVICE)
            .finish();
        let mut headers = Headers::new();
        headers.insert(String::from("Content-Type"), String::from(transport::FORM_CONTENT_TYPE));

        let locator = &self.config.auth_url;
        let response = self.transport.create(locator, body, headers).await
            .map_err(|err| Error::AuthenticationFailed(err.to_string()))?;
        if response.is_success() == false {
            return Err(Error::AuthenticationFailed(format!("{} replied with status {}: {}", locator, response.status(), response.body().trim())));
        }

        let token = auth_token_from(response.body())
            .ok_or_else(|| Error::AuthenticationFailed(String::from("the reply does not contain any Auth token")))?;

        log::info!("Authenticated as {}", account);
        self.transport.set_auth_token(&token);
        self.account = Some(account.to_string());
        self.auth_token = Some(token);
        Ok(())
    }

    /// The calendars owned by the account, in feed order
    pub async fn calendars(&self) -> Result<Vec<CalendarRecord>> {
        if self.is_authenticated() == false {
            return Err(Error::NotAuthenticated);
        }
        calendar::fetch_calendars(&self.transport, &self.config).await
    }
}

impl Debug for AccountSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSession")
            .field("account", &self.account)
            .field("authenticated", &self.is_authenticated())
            .field("config", &self.config)
            .finish()
    }
}

/// The login reply is made of `SID=`, `LSID=` then `Auth=` lines
fn auth_token_from(body: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();
    let third = lines.get(2)
        .and_then(|line| line.strip_prefix("Auth="));
    third
        .or_else(|| lines.iter().find_map(|line| line.strip_prefix("Auth=")))
        .filter(|token| token.is_empty() == false)
        .map(str::to_string)
}
