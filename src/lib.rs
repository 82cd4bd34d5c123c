//! This crate maps calendars and events of a GData calendar service to Rust objects.
//!
//! Everything starts with an [`AccountSession`], that exchanges credentials for a token, then lists the [`CalendarRecord`]s of the account. \
//! Each calendar gives access to its [`EventRecord`]s. Events may repeat, according to a [`RecurrenceRule`].
//!
//! Calendars and events are loaded from, and saved as, Atom entries. The declarative [`schema`] module describes how their attributes map to XML elements. \
//! Network access goes through a [`Transport`](transport::Transport): [`HttpTransport`](transport::http::HttpTransport) talks to an actual server,
//! while [`MockTransport`](transport::mock::MockTransport) replies with scripted responses, which is handy in tests.

pub mod error;
pub use error::{Error, Result};
pub mod config;
pub use config::ServiceConfig;
pub mod transport;

pub mod entity;
pub use entity::{EntityState, FindScope, VersionTag};
pub mod datetime;
pub mod schema;
pub mod utils;

pub mod recurrence;
pub use recurrence::{Frequency, RecurrenceRule};
pub mod event;
pub use event::{EventRecord, EventStatus, Transparency};
pub mod calendar;
pub use calendar::{CalendarHandle, CalendarRecord};
pub mod session;
pub use session::AccountSession;
