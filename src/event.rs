//! Calendar events

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use minidom::Element;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::calendar::{CalendarHandle, CalendarRecord};
use crate::datetime::{self, TimeInput};
use crate::entity::{EntityState, FindScope, VersionTag};
use crate::error::{Error, Result};
use crate::recurrence::RecurrenceRule;
use crate::schema::{self, ns, Field, Slot};
use crate::transport::{self, Response};
use crate::utils;

/// Whether an event blocks time in its calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    Opaque,
    Transparent,
}

impl Default for Transparency {
    fn default() -> Self { Transparency::Opaque }
}

impl Transparency {
    /// The schema URI this value is stored as
    pub fn as_uri(&self) -> &'static str {
        match self {
            Transparency::Opaque => "http://schemas.google.com/g/2005#event.opaque",
            Transparency::Transparent => "http://schemas.google.com/g/2005#event.transparent",
        }
    }
}

impl FromStr for Transparency {
    type Err = Error;

    /// Accepts either the schema URI or its short name (`"opaque"`, `"transparent"`)
    fn from_str(s: &str) -> Result<Self> {
        match short_name(s).to_lowercase().as_str() {
            "opaque" => Ok(Transparency::Opaque),
            "transparent" => Ok(Transparency::Transparent),
            _ => Err(Error::Validation(format!("unknown transparency {:?}", s))),
        }
    }
}

/// Whether an event is going to happen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self { EventStatus::Confirmed }
}

impl EventStatus {
    /// The schema URI this value is stored as
    pub fn as_uri(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "http://schemas.google.com/g/2005#event.confirmed",
            EventStatus::Tentative => "http://schemas.google.com/g/2005#event.tentative",
            EventStatus::Cancelled => "http://schemas.google.com/g/2005#event.canceled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = Error;

    /// Accepts either the schema URI or its short name (`"confirmed"`, `"tentative"`, `"cancelled"`)
    fn from_str(s: &str) -> Result<Self> {
        match short_name(s).to_lowercase().as_str() {
            "confirmed" => Ok(EventStatus::Confirmed),
            "tentative" => Ok(EventStatus::Tentative),
            "canceled" | "cancelled" => Ok(EventStatus::Cancelled),
            _ => Err(Error::Validation(format!("unknown event status {:?}", s))),
        }
    }
}

/// `http://schemas.google.com/g/2005#event.opaque` => `opaque`
fn short_name(s: &str) -> &str {
    let s = s.trim();
    match s.rfind("#event.") {
        Some(pos) => &s[pos + "#event.".len()..],
        None => s,
    }
}


/// The attributes of an event that are plain elements of its entry.
/// Times are handled separately, since they are written either as a `<gd:when>` or as a `<gd:recurrence>`
static EVENT_FIELDS: &[Field<EventRecord>] = &[
    Field { element: "id", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[],
        get: |e| e.id.clone(),
        set: |e, v| { e.id = Some(v.trim().to_string()); Ok(()) } },
    Field { element: "title", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[("type", "text")],
        get: |e| Some(e.title.clone()),
        set: |e, v| { e.title = v.to_string(); Ok(()) } },
    Field { element: "content", ns: ns::ATOM, slot: Slot::Text, fixed_attrs: &[("type", "text")],
        get: |e| Some(e.content.clone()),
        set: |e, v| { e.content = v.to_string(); Ok(()) } },
    Field { element: "transparency", ns: ns::GD, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |e| Some(e.transparency.as_uri().to_string()),
        set: |e, v| { e.transparency = v.parse()?; Ok(()) } },
    Field { element: "eventStatus", ns: ns::GD, slot: Slot::Attr("value"), fixed_attrs: &[],
        get: |e| Some(e.status.as_uri().to_string()),
        set: |e, v| { e.status = v.parse()?; Ok(()) } },
    Field { element: "where", ns: ns::GD, slot: Slot::Attr("valueString"), fixed_attrs: &[],
        get: |e| Some(e.location.clone()),
        set: |e, v| { e.location = v.to_string(); Ok(()) } },
];


/// An event of a calendar.
///
/// An event is [`EntityState::New`] until it is saved, [`EntityState::Persisted`] once it has been created or loaded from a feed,
/// and [`EntityState::Deleted`] once it has been deleted (this last state is terminal).
#[derive(Clone, Debug)]
pub struct EventRecord {
    /// The calendar this event belongs to
    calendar: CalendarHandle,
    state: EntityState,

    /// The `<id>` of the event entry, assigned by the server
    id: Option<String>,
    title: String,
    content: String,
    location: String,
    transparency: Transparency,
    status: EventStatus,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    /// When set, this replaces the single occurrence described by `start` and `end` in the wire form
    recurrence: Option<RecurrenceRule>,

    version_tag: Option<VersionTag>,
    edit_feed: Option<Url>,
    /// The entry this event has last been loaded from
    raw: Option<String>,
}

impl EventRecord {
    /// Create a brand new event in a calendar. It is not on the server until it is saved
    pub fn new(calendar: &CalendarRecord) -> Self {
        Self::with_handle(calendar.handle())
    }

    pub(crate) fn with_handle(calendar: CalendarHandle) -> Self {
        Self {
            calendar,
            state: EntityState::New,
            id: None,
            title: String::new(),
            content: String::new(),
            location: String::new(),
            transparency: Transparency::default(),
            status: EventStatus::default(),
            start: None,
            end: None,
            recurrence: None,
            version_tag: None,
            edit_feed: None,
            raw: None,
        }
    }

    pub fn state(&self) -> EntityState                 { self.state }
    pub fn exists(&self) -> bool                       { self.state.exists() }
    pub fn id(&self) -> Option<&str>                   { self.id.as_deref() }
    pub fn title(&self) -> &str                        { &self.title }
    pub fn content(&self) -> &str                      { &self.content }
    pub fn location(&self) -> &str                     { &self.location }
    pub fn transparency(&self) -> Transparency         { self.transparency }
    pub fn status(&self) -> EventStatus                { self.status }
    pub fn start(&self) -> Option<&DateTime<Utc>>      { self.start.as_ref() }
    pub fn end(&self) -> Option<&DateTime<Utc>>        { self.end.as_ref() }
    pub fn recurrence(&self) -> Option<&RecurrenceRule> { self.recurrence.as_ref() }
    pub fn version_tag(&self) -> Option<&VersionTag>   { self.version_tag.as_ref() }
    pub fn edit_feed(&self) -> Option<&Url>            { self.edit_feed.as_ref() }
    pub fn raw_xml(&self) -> Option<&str>              { self.raw.as_deref() }
    pub fn calendar_id(&self) -> Option<&str>          { self.calendar.calendar_id() }

    pub fn set_title<S: Into<String>>(&mut self, title: S)       { self.title = title.into(); }
    pub fn set_content<S: Into<String>>(&mut self, content: S)   { self.content = content.into(); }
    pub fn set_location<S: Into<String>>(&mut self, location: S) { self.location = location.into(); }
    pub fn set_transparency(&mut self, transparency: Transparency) { self.transparency = transparency; }
    pub fn set_status(&mut self, status: EventStatus)            { self.status = status; }

    /// Set the start, either from an instant or from a timestamp string.
    ///
    /// Note that nothing checks the start is before the end
    pub fn set_start<T: Into<TimeInput>>(&mut self, start: T) -> Result<()> {
        self.start = Some(start.into().resolve("start time")?);
        Ok(())
    }

    pub fn set_end<T: Into<TimeInput>>(&mut self, end: T) -> Result<()> {
        self.end = Some(end.into().resolve("end time")?);
        Ok(())
    }

    /// Make this event repeat. The rule now belongs to this event
    pub fn set_recurrence(&mut self, rule: RecurrenceRule) {
        self.recurrence = Some(rule);
    }

    /// Make this event a single occurrence again, and return the rule it had
    pub fn take_recurrence(&mut self) -> Option<RecurrenceRule> {
        self.recurrence.take()
    }

    /// The entry describing this event, as it would be sent to the server
    pub fn to_entry(&self) -> Result<Element> {
        let mut entry = schema::entry_builder()
            .append(schema::kind_category(schema::EVENT_KIND));
        entry = schema::build(EVENT_FIELDS, self, entry);

        let time = match &self.recurrence {
            Some(rule) => Element::builder("recurrence", ns::GD)
                .append(rule.render()?)
                .build(),
            None => {
                let mut when = Element::builder("when", ns::GD);
                if let Some(start) = &self.start {
                    when = when.attr("startTime", datetime::format_timestamp(start));
                }
                if let Some(end) = &self.end {
                    when = when.attr("endTime", datetime::format_timestamp(end));
                }
                when.build()
            },
        };
        Ok(entry.append(time).build())
    }

    /// Serialize this event into an XML entry
    pub fn to_wire_form(&self) -> Result<String> {
        utils::xml_to_string(&self.to_entry()?)
    }

    /// Populate this event from an XML entry. It is then considered as existing on the server.
    ///
    /// On failure, this event is left unchanged
    pub fn load_from_wire_form(&mut self, body: &str) -> Result<()> {
        let entry = utils::parse_entry(body)?;
        self.apply_entry(&entry)
    }

    /// Every attribute is read from `entry`. Those it lacks take their default values
    pub(crate) fn apply_entry(&mut self, entry: &Element) -> Result<()> {
        let mut loaded = EventRecord::with_handle(self.calendar.clone());
        loaded.version_tag = utils::attr_any_prefix(entry, "etag").map(VersionTag::from);
        schema::apply(EVENT_FIELDS, entry, &mut loaded)?;

        for child in entry.children() {
            match child.name() {
                "when" => {
                    if let Some(start) = child.attr("startTime") {
                        loaded.start = Some(parse_wire_time(start)?);
                    }
                    if let Some(end) = child.attr("endTime") {
                        loaded.end = Some(parse_wire_time(end)?);
                    }
                },
                "recurrence" => {
                    let rule = RecurrenceRule::parse(&child.text())?;
                    loaded.start = rule.start().cloned();
                    loaded.end = rule.end().cloned();
                    loaded.recurrence = Some(rule);
                },
                _ => {},
            }
        }

        loaded.edit_feed = match utils::link_href(entry, "edit") {
            None => None,
            Some(href) => Some(Url::parse(href)
                .map_err(|err| Error::MalformedResponse(format!("invalid edit link {:?}: {}", href, err)))?),
        };
        loaded.raw = Some(utils::xml_to_string(entry)?);
        loaded.state = EntityState::Persisted;

        *self = loaded;
        Ok(())
    }

    /// Send this event to the server: create it if it is new, or update it if it exists already.
    ///
    /// Updates are conditional: if the event has been modified on the server since it was loaded, this returns [`Error::Conflict`]
    /// (in which case you may [`reload`](Self::reload) it, then retry).
    /// In case the server replies to a creation with something that cannot be loaded, this returns [`Error::SaveFailed`]:
    /// the event may exist on the server although this instance still is [`EntityState::New`].
    pub async fn save(&mut self) -> Result<()> {
        match self.state {
            EntityState::Deleted => Err(Error::InvalidState(String::from("this event has been deleted"))),
            EntityState::Persisted => self.update().await,
            EntityState::New => self.create().await,
        }
    }

    async fn create(&mut self) -> Result<()> {
        let feed = self.calendar.event_feed().cloned()
            .ok_or_else(|| Error::InvalidState(String::from("the calendar of this event does not exist on the server")))?;
        let body = self.to_wire_form()?;
        let transport = Arc::clone(self.calendar.transport());
        transport::ensure_authenticated(transport.as_ref())?;

        log::debug!("Creating event {:?} in {}", self.title, feed);
        let response = transport.create(&feed, body, transport::atom_headers()).await?;
        if response.is_success() == false {
            return Err(response.to_error(&feed));
        }

        self.load_from_wire_form(response.body())
            .map_err(|err| Error::SaveFailed(format!("unable to load the created event: {}", err)))?;
        if self.version_tag.is_none() {
            self.version_tag = response.header("etag").map(VersionTag::from);
        }
        log::info!("Created event {}", self.id.as_deref().unwrap_or("<no id>"));
        Ok(())
    }

    async fn update(&mut self) -> Result<()> {
        let locator = self.edit_feed.clone()
            .ok_or_else(|| Error::InvalidState(String::from("this event has no edit link")))?;
        let version_tag = self.version_tag.as_ref()
            .ok_or_else(|| Error::InvalidState(String::from("the entity tag of this event is unknown, reload it before updating it")))?;
        let headers = transport::conditional_headers(version_tag);
        let body = self.to_wire_form()?;
        let transport = Arc::clone(self.calendar.transport());
        transport::ensure_authenticated(transport.as_ref())?;

        log::debug!("Updating event {}", locator);
        let response = transport.replace(&locator, body, headers).await?;
        if response.is_success() == false {
            let err = response.to_error(&locator);
            if let Error::Conflict{ .. } = err {
                log::warn!("Event {} has been modified on the server", locator);
            }
            return Err(err);
        }

        self.refresh_version(&response);
        Ok(())
    }

    /// Keep the entity tag in sync with the server after an update, so that the next update is not rejected
    fn refresh_version(&mut self, response: &Response) {
        let reloaded = utils::parse_entry(response.body())
            .and_then(|entry| self.apply_entry(&entry));
        match reloaded {
            Ok(()) if self.version_tag.is_some() => {},
            Ok(()) => self.version_tag = response.header("etag").map(VersionTag::from),
            Err(err) => {
                log::debug!("Update reply is not an entry ({}), using its headers", err);
                if let Some(etag) = response.header("etag") {
                    self.version_tag = Some(VersionTag::from(etag));
                }
            },
        }
    }

    /// Delete this event from the server.
    ///
    /// Returns `false` (and does not change anything) if this event does not exist on the server, or if the server refused to delete it.
    /// Otherwise, every attribute of this event is cleared and it becomes [`EntityState::Deleted`].
    pub async fn delete(&mut self) -> bool {
        if self.state.exists() == false {
            log::warn!("Cannot delete an event that does not exist on the server");
            return false;
        }
        let locator = match &self.edit_feed {
            None => {
                log::warn!("Cannot delete event {:?}: it has no edit link", self.id);
                return false;
            },
            Some(url) => url.clone(),
        };
        let headers = match &self.version_tag {
            None => {
                log::warn!("Cannot delete event {}: its entity tag is unknown, reload it first", locator);
                return false;
            },
            Some(version_tag) => transport::conditional_headers(version_tag),
        };
        let transport = Arc::clone(self.calendar.transport());
        if let Err(err) = transport::ensure_authenticated(transport.as_ref()) {
            log::warn!("Cannot delete event {}: {}", locator, err);
            return false;
        }

        match transport.remove(&locator, headers).await {
            Err(err) => {
                log::warn!("Unable to delete event {}: {}", locator, err);
                false
            },
            Ok(response) if response.is_success() == false => {
                log::warn!("Unable to delete event {}: {}", locator, response.to_error(&locator));
                false
            },
            Ok(_) => {
                log::info!("Deleted event {}", locator);
                self.clear();
                true
            },
        }
    }

    fn clear(&mut self) {
        self.state = EntityState::Deleted;
        self.id = None;
        self.title.clear();
        self.content.clear();
        self.location.clear();
        self.transparency = Transparency::default();
        self.status = EventStatus::default();
        self.start = None;
        self.end = None;
        self.recurrence = None;
        self.version_tag = None;
        self.edit_feed = None;
        self.raw = None;
    }

    /// Read this event again from the server
    pub async fn reload(&mut self) -> Result<()> {
        if self.state.exists() == false {
            return Err(Error::InvalidState(String::from("only existing events can be reloaded")));
        }
        let locator = self.edit_feed.clone()
            .ok_or_else(|| Error::InvalidState(String::from("this event has no edit link")))?;
        transport::ensure_authenticated(self.calendar.transport().as_ref())?;

        let response = self.calendar.transport().fetch(&locator).await?;
        if response.is_success() == false {
            return Err(response.to_error(&locator));
        }
        self.load_from_wire_form(response.body())
    }

    /// A new event, not on the server yet, with the same attributes as this one (and in the same calendar)
    pub fn copy(&self) -> Result<EventRecord> {
        let mut copy = EventRecord::with_handle(self.calendar.clone());
        copy.load_from_wire_form(&self.to_wire_form()?)?;

        copy.state = EntityState::New;
        copy.id = None;
        copy.version_tag = None;
        copy.edit_feed = None;
        copy.raw = None;
        Ok(copy)
    }

    /// Full-text search among the events of a calendar.
    ///
    /// With [`FindScope::First`], at most one event is returned
    pub async fn find(calendar: &CalendarRecord, term: &str, scope: FindScope) -> Result<Vec<EventRecord>> {
        let handle = calendar.handle();
        let mut locator = handle.event_feed().cloned()
            .ok_or_else(|| Error::InvalidState(String::from("this calendar does not exist on the server")))?;
        locator.query_pairs_mut().append_pair("q", term);

        let mut events = fetch_feed(&handle, &locator).await?;
        if scope == FindScope::First {
            events.truncate(1);
        }
        Ok(events)
    }

    /// The first event matching a full-text search, if any
    pub async fn find_first(calendar: &CalendarRecord, term: &str) -> Result<Option<EventRecord>> {
        let events = Self::find(calendar, term, FindScope::First).await?;
        Ok(events.into_iter().next())
    }
}

impl Display for EventRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => write!(f, "{} ({} - {})", self.title, start, end),
            _ => write!(f, "{}", self.title),
        }
    }
}

fn parse_wire_time(value: &str) -> Result<DateTime<Utc>> {
    datetime::parse_timestamp(value)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid time {:?}", value)))
}

/// Fetch an event feed, and load every entry it contains.
///
/// Entries that cannot be loaded are skipped
pub(crate) async fn fetch_feed(calendar: &CalendarHandle, locator: &Url) -> Result<Vec<EventRecord>> {
    transport::ensure_authenticated(calendar.transport().as_ref())?;
    let response = calendar.transport().fetch(locator).await?;
    if response.is_success() == false {
        return Err(response.to_error(locator));
    }

    let feed = utils::parse_feed(response.body())?;
    let mut events = Vec::new();
    for entry in utils::feed_entries(&feed) {
        let mut event = EventRecord::with_handle(calendar.clone());
        match event.apply_entry(entry) {
            Ok(()) => events.push(event),
            Err(err) => log::warn!("Ignoring an event of {}: {}", locator, err),
        }
    }
    log::debug!("Loaded {} events from {}", events.len(), locator);
    Ok(events)
}


#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    use crate::session::AccountSession;
    use crate::transport::mock::MockTransport;

    fn detached_event() -> EventRecord {
        let session = AccountSession::new(Arc::new(MockTransport::new()));
        let calendar = CalendarRecord::new(&session);
        EventRecord::new(&calendar)
    }

    fn lunch() -> EventRecord {
        let mut event = detached_event();
        event.set_title("Team lunch");
        event.set_content("At the usual place");
        event.set_location("Cafeteria");
        event.set_status(EventStatus::Tentative);
        event.set_transparency(Transparency::Transparent);
        event.set_start("2024-03-02T12:00:00Z").unwrap();
        event.set_end(Utc.ymd(2024, 3, 2).and_hms(13, 30, 0)).unwrap();
        event
    }

    #[test]
    fn test_single_occurrence_wire_form() {
        let entry = lunch().to_entry().unwrap();
        let when = utils::find_elem(&entry, "when").unwrap();
        assert_eq!(when.attr("startTime"), Some("2024-03-02T12:00:00.000Z"));
        assert_eq!(when.attr("endTime"), Some("2024-03-02T13:30:00.000Z"));
        assert!(utils::find_elem(&entry, "recurrence").is_none());
        assert_eq!(utils::find_elem(&entry, "eventStatus").and_then(|el| el.attr("value")), Some("http://schemas.google.com/g/2005#event.tentative"));
        assert_eq!(utils::find_elem(&entry, "where").and_then(|el| el.attr("valueString")), Some("Cafeteria"));
        // New events have no id yet
        assert!(utils::find_elem(&entry, "id").is_none());
    }

    #[test]
    fn test_recurrence_replaces_when() {
        let mut event = lunch();
        let mut rule = RecurrenceRule::new();
        rule.set_start("2024-03-02T12:00:00Z").unwrap();
        rule.set_end("2024-03-02T13:30:00Z").unwrap();
        rule.set_frequency("weekly").unwrap();
        event.set_recurrence(rule);

        let entry = event.to_entry().unwrap();
        assert!(utils::find_elem(&entry, "when").is_none());
        let recurrence = utils::find_elem(&entry, "recurrence").unwrap();
        assert!(recurrence.text().starts_with("DTSTART;VALUE=DATE-TIME:20240302T120000\n"));
        assert!(recurrence.text().contains("RRULE:FREQ=WEEKLY\n"));
    }

    #[test]
    fn test_wire_form_round_trip() {
        let event = lunch();
        let mut loaded = detached_event();
        loaded.load_from_wire_form(&event.to_wire_form().unwrap()).unwrap();

        assert_eq!(loaded.title(), event.title());
        assert_eq!(loaded.content(), event.content());
        assert_eq!(loaded.location(), event.location());
        assert_eq!(loaded.status(), event.status());
        assert_eq!(loaded.transparency(), event.transparency());
        assert_eq!(loaded.start(), event.start());
        assert_eq!(loaded.end(), event.end());
        assert_eq!(loaded.recurrence(), None);
        assert_eq!(loaded.state(), EntityState::Persisted);
    }

    #[test]
    fn test_recurring_round_trip() {
        let mut event = lunch();
        let mut rule = RecurrenceRule::new();
        rule.set_start("2024-03-02T12:00:00Z").unwrap();
        rule.set_end("2024-03-02T13:30:00Z").unwrap();
        rule.set_frequency("WEEKLY").unwrap();
        rule.set_day_of_week(vec!["SA"]).unwrap();
        rule.set_repeat_until("2024-12-31").unwrap();
        event.set_recurrence(rule.clone());

        let mut loaded = detached_event();
        loaded.load_from_wire_form(&event.to_wire_form().unwrap()).unwrap();
        assert_eq!(loaded.recurrence(), Some(&rule));
        assert_eq!(loaded.start(), event.start());
        assert_eq!(loaded.end(), event.end());
    }

    #[test]
    fn test_load_server_entry() {
        let body = r#"<?xml version='1.0' encoding='UTF-8'?>
<entry xmlns='http://www.w3.org/2005/Atom' xmlns:gd='http://schemas.google.com/g/2005' gd:etag='"EkkOQg1GfCp7ImA6WhVV"'>
  <id>http://www.google.com/calendar/feeds/default/private/full/o8ru2hf7</id>
  <title type='text'>Tennis with Beth</title>
  <content type='text'>Meet for a quick lesson.</content>
  <link rel='alternate' type='text/html' href='http://www.google.com/calendar/event?eid=o8ru2hf7'/>
  <link rel='edit' type='application/atom+xml' href='http://www.google.com/calendar/feeds/default/private/full/o8ru2hf7'/>
  <gd:eventStatus value='http://schemas.google.com/g/2005#event.canceled'/>
  <gd:transparency value='http://schemas.google.com/g/2005#event.opaque'/>
  <gd:where valueString='Rolling Lawn Courts'/>
  <gd:when startTime='2006-04-17T15:00:00.000Z' endTime='2006-04-17T17:00:00.000Z'/>
</entry>"#;
        let mut event = detached_event();
        event.load_from_wire_form(body).unwrap();

        assert_eq!(event.id(), Some("http://www.google.com/calendar/feeds/default/private/full/o8ru2hf7"));
        assert_eq!(event.edit_feed().map(|u| u.as_str()), Some("http://www.google.com/calendar/feeds/default/private/full/o8ru2hf7"));
        assert_eq!(event.version_tag(), Some(&VersionTag::from("\"EkkOQg1GfCp7ImA6WhVV\"")));
        assert_eq!(event.title(), "Tennis with Beth");
        assert_eq!(event.status(), EventStatus::Cancelled);
        assert_eq!(event.location(), "Rolling Lawn Courts");
        assert_eq!(event.start(), Some(&Utc.ymd(2006, 4, 17).and_hms(15, 0, 0)));
        assert!(event.raw_xml().is_some());
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let mut event = lunch();
        assert!(matches!(event.load_from_wire_form("<entry><gd:when startTime='soon'/></entry>"), Err(Error::MalformedResponse(_))));
        assert!(matches!(event.load_from_wire_form("this is not XML"), Err(Error::MalformedResponse(_))));
        assert_eq!(event.state(), EntityState::New);
        assert_eq!(event.title(), "Team lunch");
    }

    #[test]
    fn test_copy_is_new() {
        let mut event = lunch();
        event.load_from_wire_form(&lunch().to_wire_form().unwrap()).unwrap();
        let copy = event.copy().unwrap();
        assert_eq!(copy.state(), EntityState::New);
        assert_eq!(copy.id(), None);
        assert_eq!(copy.title(), event.title());
        assert_eq!(copy.start(), event.start());
        assert_eq!(copy.status(), event.status());
        assert_eq!(copy.calendar_id(), event.calendar_id());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!("Cancelled".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
        assert_eq!(EventStatus::Tentative.as_uri().parse::<EventStatus>().unwrap(), EventStatus::Tentative);
        assert_eq!("transparent".parse::<Transparency>().unwrap(), Transparency::Transparent);
        assert!(matches!("busy".parse::<Transparency>(), Err(Error::Validation(_))));

        let mut event = detached_event();
        assert!(matches!(event.set_start("whenever"), Err(Error::Validation(_))));
        assert_eq!(event.start(), None);
    }
}
