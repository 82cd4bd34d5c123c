//! Creating, updating and deleting events against a scripted server

mod fixtures;

use chrono::{TimeZone, Utc};

use gdata_calendar::{CalendarRecord, EntityState, Error, EventRecord, EventStatus, FindScope, RecurrenceRule, VersionTag};
use gdata_calendar::transport::Response;
use gdata_calendar::transport::mock::{MockTransport, Verb};

use fixtures::*;

async fn soccer_calendar(mock: &MockTransport, session: &gdata_calendar::AccountSession) -> CalendarRecord {
    script_two_calendars(mock);
    CalendarRecord::find_first(session, "Soccer").await.unwrap().unwrap()
}


#[tokio::test]
async fn test_list_events_skips_bad_entries() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;

    let broken = String::from(r#"<entry><title type="text">Broken</title><gd:when startTime="next tuesday"/></entry>"#);
    mock.reply(Verb::Fetch, event_feed("soccer"), Response::new(200, feed(&[
        feed_event_entry("soccer", "m1", "Match"),
        broken,
        feed_event_entry("soccer", "t1", "Training"),
    ])));

    let events = soccer.events().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title(), "Match");
    assert_eq!(events[1].title(), "Training");
    assert_eq!(events[0].version_tag(), Some(&VersionTag::from("\"E-m1\"")));
    assert_eq!(events[0].calendar_id(), Some("soccer"));
    assert_eq!(events[0].start(), Some(&Utc.ymd(2009, 5, 2).and_hms(10, 0, 0)));
}

#[tokio::test]
async fn test_create_event() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    mock.reply(Verb::Create, event_feed("soccer"), Response::new(201, event_entry("soccer", "m2", "Final", "\"V1\"")));

    let mut event = EventRecord::new(&soccer);
    event.set_title("Final");
    event.set_start("2009-05-02T10:00:00Z").unwrap();
    event.set_end("2009-05-02T12:00:00Z").unwrap();
    event.save().await.unwrap();

    assert_eq!(event.state(), EntityState::Persisted);
    assert_eq!(event.id(), Some(event_edit_link("soccer", "m2").as_str()));
    assert_eq!(event.version_tag(), Some(&VersionTag::from("\"V1\"")));
    assert_eq!(event.content(), "Bring shoes");

    let request = mock.requests_for(Verb::Create).pop().unwrap();
    assert_eq!(request.locator, event_feed("soccer"));
    let body = request.body.unwrap();
    assert!(body.contains("Final"));
    assert!(body.contains("2009-05-02T10:00:00.000Z"));
}

#[tokio::test]
async fn test_update_event_and_conflicts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    let edit_link = event_edit_link("soccer", "m1");
    mock.reply(Verb::Replace, &edit_link, Response::new(200, event_entry("soccer", "m1", "Match (moved)", "\"V2\"")));
    mock.reply(Verb::Replace, &edit_link, Response::new(412, "Precondition Failed"));

    let mut event = EventRecord::new(&soccer);
    event.load_from_wire_form(&event_entry("soccer", "m1", "Match", "\"V1\"")).unwrap();
    event.set_title("Match (moved)");
    event.save().await.unwrap();

    // The update is conditional on the tag the event was loaded with
    let first = &mock.requests_for(Verb::Replace)[0];
    assert_eq!(first.headers.get("If-Match").map(String::as_str), Some("\"V1\""));
    assert_eq!(event.version_tag(), Some(&VersionTag::from("\"V2\"")));

    // Someone else modified the event meanwhile
    event.set_status(EventStatus::Cancelled);
    match event.save().await {
        Err(Error::Conflict{ locator }) => assert_eq!(locator, edit_link),
        other => panic!("expected a conflict, got {:?}", other),
    }
    assert_eq!(event.status(), EventStatus::Cancelled);
    assert_eq!(event.state(), EntityState::Persisted);
}

#[tokio::test]
async fn test_delete_event() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    let edit_link = event_edit_link("soccer", "m1");

    // Never saved: nothing is sent
    let mut unsaved = EventRecord::new(&soccer);
    unsaved.set_title("Draft");
    assert_eq!(unsaved.delete().await, false);
    assert_eq!(unsaved.title(), "Draft");
    assert_eq!(mock.requests_for(Verb::Remove).len(), 0);

    // Refused by the server: nothing changes
    mock.reply(Verb::Remove, &edit_link, Response::new(500, "Oops"));
    mock.reply(Verb::Remove, &edit_link, Response::new(200, ""));
    let mut event = EventRecord::new(&soccer);
    event.load_from_wire_form(&event_entry("soccer", "m1", "Match", "\"V1\"")).unwrap();
    assert_eq!(event.delete().await, false);
    assert_eq!(event.state(), EntityState::Persisted);
    assert_eq!(event.title(), "Match");

    assert_eq!(event.delete().await, true);
    assert_eq!(event.state(), EntityState::Deleted);
    assert_eq!(event.title(), "");
    assert_eq!(event.id(), None);
    assert_eq!(mock.requests_for(Verb::Remove)[1].headers.get("If-Match").map(String::as_str), Some("\"V1\""));

    let requests_before = mock.request_count();
    assert!(matches!(event.save().await, Err(Error::InvalidState(_))));
    assert_eq!(event.delete().await, false);
    assert_eq!(mock.request_count(), requests_before);
}

#[tokio::test]
async fn test_find_events() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    mock.reply(Verb::Fetch, format!("{}?q=final+match", event_feed("soccer")), Response::new(200, feed(&[
        feed_event_entry("soccer", "m1", "Final match"),
        feed_event_entry("soccer", "m2", "Final match (replay)"),
    ])));

    let all = EventRecord::find(&soccer, "final match", FindScope::All).await.unwrap();
    assert_eq!(all.len(), 2);

    let first = EventRecord::find_first(&soccer, "final match").await.unwrap().unwrap();
    assert_eq!(first.title(), "Final match");
}

#[tokio::test]
async fn test_recurring_event() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;

    let mut rule = RecurrenceRule::new();
    rule.set_start("2009-05-02T10:00:00Z").unwrap();
    rule.set_end("2009-05-02T12:00:00Z").unwrap();
    rule.set_frequency("weekly").unwrap();
    rule.set_day_of_week(vec!["SA"]).unwrap();
    rule.set_repeat_until("2009-07-01").unwrap();

    let mut event = EventRecord::new(&soccer);
    event.set_title("Training");
    event.set_recurrence(rule);
    let wire = event.to_wire_form().unwrap();
    assert!(wire.contains("RRULE:FREQ=WEEKLY;BYDAY=SA;UNTIL=20090701"));
    assert!(wire.contains("when") == false);

    // Events of unsaved calendars cannot be created
    let session_calendar = CalendarRecord::new(&session);
    let mut orphan = EventRecord::new(&session_calendar);
    orphan.set_title("Orphan");
    assert!(matches!(orphan.save().await, Err(Error::InvalidState(_))));
}

#[tokio::test]
async fn test_feed_without_namespace_declarations() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;

    let atom_only = format!(
        "<feed xmlns='http://www.w3.org/2005/Atom'>{}</feed>",
        feed_event_entry("soccer", "m1", "Match").replace("<gd:when", "<gd:where valueString='Field 3'/><gd:when"));
    mock.reply(Verb::Fetch, event_feed("soccer"), Response::new(200, atom_only));

    let events = soccer.events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].location(), "Field 3");
    assert_eq!(events[0].version_tag(), Some(&VersionTag::from("\"E-m1\"")));
}

#[tokio::test]
async fn test_reload_forgets_removed_attributes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    let edit_link = event_edit_link("soccer", "m1");

    let mut event = EventRecord::new(&soccer);
    event.load_from_wire_form(&event_entry("soccer", "m1", "Match", "\"V1\"")).unwrap();
    assert_eq!(event.location(), "Field 3");
    assert_eq!(event.content(), "Bring shoes");

    // The server copy has no location nor description anymore
    mock.reply(Verb::Fetch, &edit_link, Response::new(200, feed_event_entry("soccer", "m1", "Match")));
    event.reload().await.unwrap();
    assert_eq!(event.location(), "");
    assert_eq!(event.content(), "");
    assert_eq!(event.title(), "Match");
    assert_eq!(event.version_tag(), Some(&VersionTag::from("\"E-m1\"")));
    assert_eq!(event.calendar_id(), Some("soccer"));
}

#[tokio::test]
async fn test_writes_need_an_entity_tag() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;

    let untagged = feed_event_entry("soccer", "m1", "Match").replace(r#" gd:etag='"E-m1"'"#, "");
    let mut event = EventRecord::new(&soccer);
    event.load_from_wire_form(&untagged).unwrap();
    assert_eq!(event.version_tag(), None);

    event.set_title("Match (moved)");
    assert!(matches!(event.save().await, Err(Error::InvalidState(_))));
    assert_eq!(event.delete().await, false);
    assert_eq!(event.state(), EntityState::Persisted);
    assert_eq!(mock.requests_for(Verb::Replace).len(), 0);
    assert_eq!(mock.requests_for(Verb::Remove).len(), 0);
}

#[tokio::test]
async fn test_copy_event() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mock, session) = authenticated_session().await;
    let soccer = soccer_calendar(&mock, &session).await;
    mock.reply(Verb::Create, event_feed("soccer"), Response::new(201, event_entry("soccer", "m9", "Match", "\"V9\"")));

    let mut event = EventRecord::new(&soccer);
    event.load_from_wire_form(&event_entry("soccer", "m1", "Match", "\"V1\"")).unwrap();

    let mut copy = event.copy().unwrap();
    assert_eq!(copy.state(), EntityState::New);
    assert_eq!(copy.id(), None);
    assert_eq!(copy.calendar_id(), Some("soccer"));
    assert_eq!(copy.location(), event.location());

    // Saving the copy creates another event in the same calendar
    copy.save().await.unwrap();
    assert_eq!(mock.requests_for(Verb::Create).pop().unwrap().locator, event_feed("soccer"));
    assert_eq!(copy.id(), Some(event_edit_link("soccer", "m9").as_str()));
    assert_eq!(event.id(), Some(event_edit_link("soccer", "m1").as_str()));
}
