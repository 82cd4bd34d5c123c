//! Service endpoints and client settings

use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Root of every calendar feed
pub static DEFAULT_FEEDS_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://www.google.com/calendar/feeds/").unwrap(/* this cannot panic since this is a valid constant URL */)
});

/// Where account credentials are exchanged for a bearer token
pub static DEFAULT_AUTH_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://www.google.com/accounts/ClientLogin").unwrap(/* this cannot panic since this is a valid constant URL */)
});

/// Locators and identification sent to the calendar service.
///
/// Every feed locator used by this crate is derived from this structure, so that it can be pointed at another server (e.g. in tests)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Root of the calendar feeds (e.g. `http://www.google.com/calendar/feeds/`)
    pub feeds_base: Url,
    /// Locator of the credentials-for-token exchange
    pub auth_url: Url,
    /// Name of the application, as reported to the service when logging in
    pub source: String,
    /// Value of the `GData-Version` header
    pub gdata_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            feeds_base: DEFAULT_FEEDS_BASE.clone(),
            auth_url: DEFAULT_AUTH_URL.clone(),
            source: String::from("gdata-calendar"),
            gdata_version: String::from("2"),
        }
    }
}

impl ServiceConfig {
    /// Read a configuration from a JSON file. Missing fields take their default values
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| Error::Config(format!("unable to open {:?}: {}", path, err)))?;
        let config = serde_json::from_reader(file)
            .map_err(|err| Error::Config(format!("unable to parse {:?}: {}", path, err)))?;
        Ok(config)
    }

    /// The feed listing the calendars owned by the authenticated account
    pub fn owncalendars_feed(&self) -> Result<Url> {
        self.join("default/owncalendars/full")
    }

    /// The locator of a single owned calendar
    pub fn owncalendar_entry(&self, calendar_id: &str) -> Result<Url> {
        self.join(&format!("default/owncalendars/full/{}", calendar_id))
    }

    /// The private feed listing the events of a calendar
    pub fn event_feed(&self, calendar_id: &str) -> Result<Url> {
        self.join(&format!("{}/private/full", calendar_id))
    }

    /// The access-control feed of a calendar
    pub fn acl_feed(&self, calendar_id: &str) -> Result<Url> {
        self.join(&format!("{}/acl/full", calendar_id))
    }

    /// The access rule that governs anonymous access to a calendar
    pub fn acl_default_rule(&self, calendar_id: &str) -> Result<Url> {
        self.join(&format!("{}/acl/full/default", calendar_id))
    }

    /// Prefixes that calendar entry `<id>`s start with. What follows is the calendar identifier
    pub fn calendar_id_prefixes(&self) -> Vec<String> {
        let base = self.base_str();
        vec![
            format!("{}default/calendars/", base),
            format!("{}default/owncalendars/full/", base),
            format!("{}default/allcalendars/full/", base),
        ]
    }

    fn base_str(&self) -> String {
        let base = self.feeds_base.as_str();
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }

    fn join(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_str())?;
        Ok(base.join(path)?)
    }
}
