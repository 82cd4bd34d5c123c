//! Feeds and entries, as a calendar server would reply them
#![allow(dead_code)]

use std::sync::Arc;

use gdata_calendar::AccountSession;
use gdata_calendar::transport::Response;
use gdata_calendar::transport::mock::{MockTransport, Verb};

pub const AUTH_URL: &str = "https://www.google.com/accounts/ClientLogin";
pub const FEEDS: &str = "http://www.google.com/calendar/feeds/";
pub const OWNCALENDARS: &str = "http://www.google.com/calendar/feeds/default/owncalendars/full";

pub fn event_feed(calendar_id: &str) -> String {
    format!("{}{}/private/full", FEEDS, calendar_id)
}

pub fn acl_feed(calendar_id: &str) -> String {
    format!("{}{}/acl/full", FEEDS, calendar_id)
}

pub fn acl_default_rule(calendar_id: &str) -> String {
    format!("{}{}/acl/full/default", FEEDS, calendar_id)
}

pub fn event_edit_link(calendar_id: &str, event_id: &str) -> String {
    format!("{}{}/private/full/{}", FEEDS, calendar_id, event_id)
}

/// A calendar entry, without namespace declarations (they belong to the enclosing feed)
pub fn calendar_entry(id: &str, title: &str, summary: &str) -> String {
    format!(r##"<entry>
  <id>{feeds}default/owncalendars/full/{id}</id>
  <title type="text">{title}</title>
  <summary type="text">{summary}</summary>
  <link rel="alternate" type="application/atom+xml" href="{feeds}{id}/private/full"/>
  <link rel="edit" type="application/atom+xml" href="{feeds}default/owncalendars/full/{id}"/>
  <gCal:timezone value="Europe/Paris"/>
  <gCal:hidden value="false"/>
  <gCal:color value="#0D7813"/>
  <gCal:selected value="true"/>
  <gd:where valueString="Stadium"/>
</entry>"##, feeds = FEEDS, id = id, title = title, summary = summary)
}

pub fn feed(entries: &[String]) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005" xmlns:gCal="http://schemas.google.com/gCal/2005" xmlns:gAcl="http://schemas.google.com/acl/2007">
  <title type="text">Feed</title>
  {}
</feed>"#, entries.join("\n  "))
}

pub fn acl_feed_body(public: bool) -> String {
    let role = if public { "http://schemas.google.com/gCal/2005#read" } else { "none" };
    feed(&[
        String::from(r#"<entry><gAcl:scope type="user" value="owner@example.com"/><gAcl:role value="http://schemas.google.com/gCal/2005#owner"/></entry>"#),
        format!(r#"<entry><gAcl:scope type="default"/><gAcl:role value="{}"/></entry>"#, role),
    ])
}

/// An event entry, as a standalone document (the way servers reply to a creation)
pub fn event_entry(calendar_id: &str, event_id: &str, title: &str, etag: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?>
<entry xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005" xmlns:gCal="http://schemas.google.com/gCal/2005" gd:etag='{etag}'>
  <id>{edit}</id>
  <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/g/2005#event"/>
  <title type="text">{title}</title>
  <content type="text">Bring shoes</content>
  <link rel="edit" type="application/atom+xml" href="{edit}"/>
  <gd:transparency value="http://schemas.google.com/g/2005#event.opaque"/>
  <gd:eventStatus value="http://schemas.google.com/g/2005#event.confirmed"/>
  <gd:where valueString="Field 3"/>
  <gd:when startTime="2009-05-02T10:00:00.000Z" endTime="2009-05-02T12:00:00.000Z"/>
</entry>"#, etag = etag, edit = event_edit_link(calendar_id, event_id), title = title)
}

/// An event entry inside a feed, without namespace declarations
pub fn feed_event_entry(calendar_id: &str, event_id: &str, title: &str) -> String {
    format!(r#"<entry gd:etag='"E-{id}"'>
  <id>{edit}</id>
  <title type="text">{title}</title>
  <link rel="edit" type="application/atom+xml" href="{edit}"/>
  <gd:when startTime="2009-05-02T10:00:00.000Z" endTime="2009-05-02T12:00:00.000Z"/>
</entry>"#, id = event_id, edit = event_edit_link(calendar_id, event_id), title = title)
}

/// A session that has been authenticated against a mock server
pub async fn authenticated_session() -> (Arc<MockTransport>, AccountSession) {
    let mock = Arc::new(MockTransport::new());
    mock.reply(Verb::Create, AUTH_URL, Response::new(200, "SID=sid\nLSID=lsid\nAuth=TOKEN\n"));
    let mut session = AccountSession::new(mock.clone());
    session.authenticate("user@example.com", "secret").await.unwrap();
    (mock, session)
}

/// Script the owned calendars feed with "Soccer Team" (public) and "Book Club" (private)
pub fn script_two_calendars(mock: &MockTransport) {
    mock.reply(Verb::Fetch, OWNCALENDARS, Response::new(200, feed(&[
        calendar_entry("soccer", "Soccer Team", "Matches and training"),
        calendar_entry("books", "Book Club", "Monthly meetings"),
    ])));
    mock.reply(Verb::Fetch, acl_feed("soccer"), Response::new(200, acl_feed_body(true)));
    mock.reply(Verb::Fetch, acl_feed("books"), Response::new(200, acl_feed_body(false)));
}
