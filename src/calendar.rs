//! Calendars owned by an account

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use minidom::Element;
use url::Url;

use crate::config::ServiceConfig;
use crate::entity::{EntityState, FindScope};
use crate::error::{Error, Result};
use crate::event::{self, EventRecord};
use crate::schema::{self, ns, Field, Slot};
use crate::session::AccountSession;
use crate::transport::{self, Transport};
use crate::utils;

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_COLOR: &str = "#2952A3";

/// The colors a calendar can be displayed with
pub const PALETTE: [&str; 21] = [
    "#A32929", "#B1365F", "#7A367A", "#5229A3", "#29527A", "#2952A3", "#1B887A",
    "#28754E", "#0D7813", "#528800", "#88880E", "#AB8B00", "#BE6D00", "#B1440E",
    "#865A5A", "#705770", "#4E5D6C", "#5A6986", "#4A716C", "#6E6E41", "#8D6F47",
];

/// Parse any CSS color, and write it as `#RRGGBB`
pub fn normalize_color(color: &str) -> Result<String> {
    let parsed = csscolorparser::parse(color.trim())
        .map_err(|err| Error::Validation(format!("invalid color {:?}: {}", color, err)))?;
    let (r, g, b, _) = parsed.rgba_u8();
    Ok(format!("#{:02X}{:02X}{:02X}", r, g, b))
}


/// What an event needs to know about its calendar: how to reach the server, and where its events live.
///
/// This does not keep the calendar alive, nor follows its later changes.
#[derive(Clone)]
pub struct CalendarHandle {
    transport: Arc<dyn Transport>,
    calendar_id: Option<String>,
    event_feed: Option<Url>,
}

impl CalendarHandle {
    pub fn transport(&self) -> &Arc<dyn Transport> { &self.transport }
    pub fn calendar_id(&self) -> Option<&str>      { self.calendar_id.as_deref() }
    pub fn event_feed(&self) -> Option<&Url>       { self.event_feed.as_ref() }
}

impl Debug for CalendarHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarHandle")
            .field("calendar_id", &self.calendar_id)
            .field("event_feed", &self.event_feed)
            .finish()
    }
}


static CALENDAR_FIELDS: &[Field<CalendarRecord>] = &[
    Field { element: "id", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[],
        get: |c| c.id.as_ref().map(|id| format!("{}{}", c.config.calendar_id_prefixes()[0], id)),
        set: |c, v| { c.id = Some(calendar_id_from(&c.config, v)); Ok(()) } },
    Field { element: "title", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[("type", "text")],
        get: |c| Some(c.title.clone()),
        set: |c, v| { c.title = v.to_string(); Ok(()) } },
    Field { element: "summary", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[("type", "text")],
        get: |c| Some(c.summary.clone()),
        set: |c, v| { c.summary = v.to_string(); Ok(()) } },
    Field { element: "timezone", ns: ns::GCAL, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |c| Some(c.timezone.clone()),
        set: |c, v| { c.timezone = v.to_string(); Ok(()) } },
    Field { element: "hidden", ns: ns::GCAL, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |c| Some(c.hidden.to_string()),
        set: |c, v| { c.hidden = schema::parse_bool(v)?; Ok(()) } },
    Field { element: "color", ns: ns::GCAL, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |c| Some(c.color.clone()),
        set: |c, v| { c.color = normalize_color(v)?; Ok(()) } },
    Field { element: "selected", ns: ns::GCAL, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |c| Some(c.selected.to_string()),
        set: |c, v| { c.selected = schema::parse_bool(v)?; Ok(()) } },
    Field { element: "where", ns: ns::GD, slot: Slot::Attr("valueString"), fixed_attrs: &[],
        get: |c| Some(c.location.clone()),
        set: |c, v| { c.location = v.to_string(); Ok(()) } },
];

/// The identifier is what follows the feed prefix in the `<id>` of a calendar entry
fn calendar_id_from(config: &ServiceConfig, id_text: &str) -> String {
    let id_text = id_text.trim();
    for prefix in config.calendar_id_prefixes() {
        if let Some(id) = id_text.strip_prefix(prefix.as_str()) {
            return id.to_string();
        }
    }
    id_text.rsplit('/').next().unwrap_or(id_text).to_string()
}


/// A calendar of the authenticated account.
///
/// Like events, calendars are [`EntityState::New`] until saved, [`EntityState::Persisted`] once they exist on the server,
/// and [`EntityState::Deleted`] once deleted.
#[derive(Clone)]
pub struct CalendarRecord {
    transport: Arc<dyn Transport>,
    config: Arc<ServiceConfig>,
    state: EntityState,

    id: Option<String>,
    title: String,
    summary: String,
    hidden: bool,
    timezone: String,
    color: String,
    location: String,
    selected: bool,
    /// Read from the access-control feed of this calendar, not from its entry
    public: bool,

    event_feed: Option<Url>,
    edit_feed: Option<Url>,
    /// The entry this calendar has last been loaded from
    raw: Option<String>,
}

impl CalendarRecord {
    /// Create a brand new calendar for the account of `session`. It is not on the server until it is saved
    pub fn new(session: &AccountSession) -> Self {
        Self::blank(Arc::clone(session.transport()), Arc::clone(session.config()))
    }

    fn blank(transport: Arc<dyn Transport>, config: Arc<ServiceConfig>) -> Self {
        Self {
            transport,
            config,
            state: EntityState::New,
            id: None,
            title: String::new(),
            summary: String::new(),
            hidden: false,
            timezone: String::from(DEFAULT_TIMEZONE),
            color: String::from(DEFAULT_COLOR),
            location: String::new(),
            selected: true,
            public: false,
            event_feed: None,
            edit_feed: None,
            raw: None,
        }
    }

    pub fn state(&self) -> EntityState         { self.state }
    pub fn exists(&self) -> bool               { self.state.exists() }
    pub fn id(&self) -> Option<&str>           { self.id.as_deref() }
    pub fn title(&self) -> &str                { &self.title }
    pub fn summary(&self) -> &str              { &self.summary }
    pub fn hidden(&self) -> bool               { self.hidden }
    pub fn timezone(&self) -> &str             { &self.timezone }
    pub fn color(&self) -> &str                { &self.color }
    pub fn location(&self) -> &str             { &self.location }
    pub fn selected(&self) -> bool             { self.selected }
    pub fn is_public(&self) -> bool            { self.public }
    pub fn event_feed(&self) -> Option<&Url>   { self.event_feed.as_ref() }
    pub fn edit_feed(&self) -> Option<&Url>    { self.edit_feed.as_ref() }
    pub fn raw_xml(&self) -> Option<&str>      { self.raw.as_deref() }

    pub fn set_title<S: Into<String>>(&mut self, title: S)       { self.title = title.into(); }
    pub fn set_summary<S: Into<String>>(&mut self, summary: S)   { self.summary = summary.into(); }
    pub fn set_location<S: Into<String>>(&mut self, location: S) { self.location = location.into(); }
    pub fn set_hidden(&mut self, hidden: bool)                   { self.hidden = hidden; }
    pub fn set_selected(&mut self, selected: bool)               { self.selected = selected; }

    /// Set the time zone name (e.g. `Europe/Paris`). Names are not checked against a time zone database
    pub fn set_timezone(&mut self, timezone: &str) -> Result<()> {
        let timezone = timezone.trim();
        if timezone.is_empty() || timezone.contains(char::is_whitespace) {
            return Err(Error::Validation(format!("invalid time zone {:?}", timezone)));
        }
        self.timezone = timezone.to_string();
        Ok(())
    }

    /// Set the display color. It must be one of the [`PALETTE`] colors
    pub fn set_color(&mut self, color: &str) -> Result<()> {
        let normalized = normalize_color(color)?;
        if PALETTE.contains(&normalized.as_str()) == false {
            return Err(Error::Validation(format!("color must be one of {}, got {:?}", PALETTE.join(" "), color)));
        }
        self.color = normalized;
        Ok(())
    }

    /// What events of this calendar need to reach the server
    pub fn handle(&self) -> CalendarHandle {
        CalendarHandle {
            transport: Arc::clone(&self.transport),
            calendar_id: self.id.clone(),
            event_feed: self.event_feed.clone(),
        }
    }

    /// The entry describing this calendar, as it would be sent to the server
    pub fn to_entry(&self) -> Element {
        schema::build(CALENDAR_FIELDS, self, schema::entry_builder()).build()
    }

    pub fn to_wire_form(&self) -> Result<String> {
        utils::xml_to_string(&self.to_entry())
    }

    /// Populate this calendar from an XML entry, then read its access rules to know whether it is public.
    ///
    /// On failure, this calendar is left unchanged. Failing to read the access rules is not a failure: the calendar is then considered private
    pub async fn load_from_wire_form(&mut self, body: &str) -> Result<()> {
        let entry = utils::parse_entry(body)?;
        self.apply_entry(&entry)?;
        self.refresh_public().await;
        Ok(())
    }

    /// Every attribute is read from `entry`. Those it lacks take their default values
    fn apply_entry(&mut self, entry: &Element) -> Result<()> {
        let mut loaded = CalendarRecord::blank(Arc::clone(&self.transport), Arc::clone(&self.config));
        schema::apply(CALENDAR_FIELDS, entry, &mut loaded)?;

        loaded.edit_feed = match utils::link_href(entry, "edit") {
            None => None,
            Some(href) => Some(Url::parse(href)
                .map_err(|err| Error::MalformedResponse(format!("invalid edit link {:?}: {}", href, err)))?),
        };
        loaded.event_feed = match &loaded.id {
            None => None,
            Some(id) => Some(loaded.config.event_feed(id)?),
        };
        loaded.raw = Some(utils::xml_to_string(entry)?);
        loaded.state = EntityState::Persisted;

        *self = loaded;
        Ok(())
    }

    async fn refresh_public(&mut self) {
        match self.fetch_public().await {
            Ok(public) => self.public = public,
            Err(err) => {
                log::warn!("Unable to read the access rules of calendar {:?}: {}", self.id, err);
                self.public = false;
            }
        }
    }

    async fn fetch_public(&self) -> Result<bool> {
        let id = self.id.as_deref()
            .ok_or_else(|| Error::InvalidState(String::from("this calendar has no identifier")))?;
        let locator = self.config.acl_feed(id)?;
        transport::ensure_authenticated(self.transport.as_ref())?;

        let response = self.transport.fetch(&locator).await?;
        if response.is_success() == false {
            return Err(response.to_error(&locator));
        }
        let feed = utils::parse_feed(response.body())?;
        Ok(schema::default_scope_is_public(&feed).unwrap_or(false))
    }

    /// Make this calendar readable by anyone, or by its owners only.
    ///
    /// Returns whether the server accepted the change. The local flag is only updated when it did.
    pub async fn set_public(&mut self, public: bool) -> bool {
        let id = match &self.id {
            None => {
                log::warn!("Cannot change the visibility of a calendar that does not exist on the server");
                return false;
            },
            Some(id) => id.clone(),
        };
        let locator = match self.config.acl_default_rule(&id) {
            Err(err) => {
                log::warn!("Cannot change the visibility of calendar {}: {}", id, err);
                return false;
            },
            Ok(url) => url,
        };
        if let Err(err) = transport::ensure_authenticated(self.transport.as_ref()) {
            log::warn!("Cannot change the visibility of calendar {}: {}", id, err);
            return false;
        }
        let role = if public { schema::ROLE_PUBLIC_READ } else { schema::ROLE_NONE };
        let body = match utils::xml_to_string(&schema::default_acl_rule(role)) {
            Err(err) => {
                log::warn!("Unable to write an access rule: {}", err);
                return false;
            },
            Ok(body) => body,
        };

        match self.transport.replace(&locator, body, transport::atom_headers()).await {
            Err(err) => {
                log::warn!("Unable to change the visibility of calendar {}: {}", id, err);
                false
            },
            Ok(response) if response.is_success() == false => {
                log::warn!("Unable to change the visibility of calendar {}: {}", id, response.to_error(&locator));
                false
            },
            Ok(_) => {
                log::info!("Calendar {} is now {}", id, if public { "public" } else { "private" });
                self.public = public;
                true
            },
        }
    }

    /// The events of this calendar, in feed order. Entries that cannot be loaded are skipped
    pub async fn events(&self) -> Result<Vec<EventRecord>> {
        let locator = self.event_feed.as_ref()
            .ok_or_else(|| Error::InvalidState(String::from("this calendar does not exist on the server")))?;
        transport::ensure_authenticated(self.transport.as_ref())?;
        event::fetch_feed(&self.handle(), locator).await
    }

    /// Create this calendar on the server if it is new, or update it if it exists already.
    ///
    /// In case the server replies to a creation with something that cannot be loaded, this returns [`Error::SaveFailed`]
    pub async fn save(&mut self) -> Result<()> {
        if self.state == EntityState::Deleted {
            return Err(Error::InvalidState(String::from("this calendar has been deleted")));
        }
        transport::ensure_authenticated(self.transport.as_ref())?;

        match self.state {
            EntityState::Deleted => Err(Error::InvalidState(String::from("this calendar has been deleted"))),
            EntityState::Persisted => {
                let locator = self.edit_feed.clone()
                    .ok_or_else(|| Error::InvalidState(String::from("this calendar has no edit link")))?;
                let response = self.transport.replace(&locator, self.to_wire_form()?, transport::atom_headers()).await?;
                if response.is_success() == false {
                    return Err(response.to_error(&locator));
                }
                log::info!("Updated calendar {}", locator);
                Ok(())
            },
            EntityState::New => {
                let feed = self.config.owncalendars_feed()?;
                let response = self.transport.create(&feed, self.to_wire_form()?, transport::atom_headers()).await?;
                if response.is_success() == false {
                    return Err(response.to_error(&feed));
                }
                let body = response.body().to_string();
                self.load_from_wire_form(&body).await
                    .map_err(|err| Error::SaveFailed(format!("unable to load the created calendar: {}", err)))?;
                log::info!("Created calendar {}", self.id.as_deref().unwrap_or("<no id>"));
                Ok(())
            },
        }
    }

    /// Delete this calendar from the server.
    ///
    /// Returns `false` (and does not change anything) if it does not exist on the server, or if the server refused to delete it
    pub async fn delete(&mut self) -> bool {
        if self.state.exists() == false {
            log::warn!("Cannot delete a calendar that does not exist on the server");
            return false;
        }
        let locator = match (&self.edit_feed, &self.id) {
            (Some(url), _) => url.clone(),
            (None, Some(id)) => match self.config.owncalendar_entry(id) {
                Ok(url) => url,
                Err(err) => {
                    log::warn!("Cannot delete calendar {}: {}", id, err);
                    return false;
                },
            },
            (None, None) => {
                log::warn!("Cannot delete a calendar without identifier");
                return false;
            },
        };

        if let Err(err) = transport::ensure_authenticated(self.transport.as_ref()) {
            log::warn!("Cannot delete calendar {}: {}", locator, err);
            return false;
        }

        let transport = Arc::clone(&self.transport);
        match transport.remove(&locator, transport::Headers::new()).await {
            Err(err) => {
                log::warn!("Unable to delete calendar {}: {}", locator, err);
                false
            },
            Ok(response) if response.is_success() == false => {
                log::warn!("Unable to delete calendar {}: {}", locator, response.to_error(&locator));
                false
            },
            Ok(_) => {
                log::info!("Deleted calendar {}", locator);
                self.clear();
                true
            },
        }
    }

    fn clear(&mut self) {
        self.state = EntityState::Deleted;
        self.id = None;
        self.title.clear();
        self.summary.clear();
        self.hidden = false;
        self.timezone.clear();
        self.color.clear();
        self.location.clear();
        self.selected = false;
        self.public = false;
        self.event_feed = None;
        self.edit_feed = None;
        self.raw = None;
    }

    /// Read this calendar again from the owned calendars feed.
    ///
    /// Returns `false` if it is not listed anymore
    pub async fn reload(&mut self) -> Result<bool> {
        let id = match (&self.state, &self.id) {
            (EntityState::Persisted, Some(id)) => id.clone(),
            _ => return Err(Error::InvalidState(String::from("only existing calendars can be reloaded"))),
        };
        transport::ensure_authenticated(self.transport.as_ref())?;
        let feed_url = self.config.owncalendars_feed()?;
        let response = self.transport.fetch(&feed_url).await?;
        if response.is_success() == false {
            return Err(response.to_error(&feed_url));
        }

        let feed = utils::parse_feed(response.body())?;
        let entry = utils::feed_entries(&feed).into_iter()
            .find(|entry| {
                utils::find_elem(entry, "id")
                    .map(|el| calendar_id_from(&self.config, &el.text()) == id)
                    .unwrap_or(false)
            });
        match entry {
            None => Ok(false),
            Some(entry) => {
                self.apply_entry(entry)?;
                self.refresh_public().await;
                Ok(true)
            },
        }
    }

    /// The calendars of an account whose title, summary or identifier contains `term` (case-insensitive)
    pub async fn find(session: &AccountSession, term: &str, scope: FindScope) -> Result<Vec<CalendarRecord>> {
        let term = term.to_lowercase();
        let matches = session.calendars().await?
            .into_iter()
            .filter(|cal| {
                cal.title.to_lowercase().contains(&term)
                    || cal.summary.to_lowercase().contains(&term)
                    || cal.id.as_deref().unwrap_or("").to_lowercase().contains(&term)
            });
        Ok(match scope {
            FindScope::First => matches.take(1).collect(),
            FindScope::All => matches.collect(),
        })
    }

    /// The first calendar of an account matching `term`, if any
    pub async fn find_first(session: &AccountSession, term: &str) -> Result<Option<CalendarRecord>> {
        let calendars = Self::find(session, term, FindScope::First).await?;
        Ok(calendars.into_iter().next())
    }
}

impl Debug for CalendarRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarRecord")
            .field("state", &self.state)
            .field("id", &self.id)
            .field("title", &self.title)
            .field("summary", &self.summary)
            .field("timezone", &self.timezone)
            .field("color", &self.color)
            .field("hidden", &self.hidden)
            .field("selected", &self.selected)
            .field("public", &self.public)
            .finish()
    }
}

/// Fetch the owned calendars feed, and load every calendar it lists (including whether it is public)
pub(crate) async fn fetch_calendars(transport: &Arc<dyn Transport>, config: &Arc<ServiceConfig>) -> Result<Vec<CalendarRecord>> {
    let locator = config.owncalendars_feed()?;
    let response = transport.fetch(&locator).await?;
    if response.is_success() == false {
        return Err(response.to_error(&locator));
    }

    let feed = utils::parse_feed(response.body())?;
    let mut calendars = Vec::new();
    for entry in utils::feed_entries(&feed) {
        let mut calendar = CalendarRecord::blank(Arc::clone(transport), Arc::clone(config));
        calendar.apply_entry(entry)?;
        calendar.refresh_public().await;
        log::debug!("Found calendar {:?}", calendar.title());
        calendars.push(calendar);
    }
    Ok(calendars)
}
