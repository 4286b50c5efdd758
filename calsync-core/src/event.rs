//! Provider-neutral event record.
//!
//! The fields the rule engine reads or writes are typed. Everything else the
//! provider sends (etag, organizer, attendees, reminders, ...) is kept in
//! `extra` so a record read from the provider can be inspected and logged
//! without losing data.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A calendar event.
///
/// Two events are equal when every field present in one is present and equal
/// in the other, passthrough fields included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Provider-assigned id. Absent on copies that have not been imported yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Cross-calendar identifier linking a copy (and recurring instances) to
    /// the event it came from.
    #[serde(rename = "iCalUID", default, skip_serializing_if = "Option::is_none")]
    pub ical_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,

    /// Disables propagation of the copy (no invitations, no further sharing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_copy: Option<bool>,

    /// Provider fields the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Start or end of an event: either a calendar date (all-day) or a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn date(date: NaiveDate) -> Self {
        EventTime {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn date_time(date_time: DateTime<FixedOffset>) -> Self {
        EventTime {
            date_time: Some(date_time),
            ..Default::default()
        }
    }

    /// A pure calendar date with no time-of-day component.
    pub fn is_date_only(&self) -> bool {
        self.date.is_some() && self.date_time.is_none()
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => write!(f, "{}", dt.to_rfc3339()),
            (None, Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            (None, None) => write!(f, "-"),
        }
    }
}

impl Event {
    /// An event is all-day iff both start and end are pure dates.
    pub fn is_all_day(&self) -> bool {
        let date_only = |t: &Option<EventTime>| t.as_ref().is_some_and(EventTime::is_date_only);
        date_only(&self.start) && date_only(&self.end)
    }

    /// Build a fresh event holding only the fields a client may write on
    /// import. Server-assigned and side-effecting fields (id, etag,
    /// timestamps, organizer, attendees, reminders, sequence, links) are left
    /// behind.
    pub fn to_copy(&self) -> Event {
        Event {
            id: None,
            ical_uid: self.ical_uid.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            private_copy: None,
            extra: Map::new(),
        }
    }

    pub fn summary_or_empty(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    /// Display name of the organizer, if the provider sent one.
    pub fn organizer_name(&self) -> Option<&str> {
        self.extra
            .get("organizer")
            .and_then(|o| o.get("displayName"))
            .and_then(Value::as_str)
    }
}

/// Short form used in logs and error context.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<&str>| v.unwrap_or("-").to_string();
        let time = |t: &Option<EventTime>| t.as_ref().map_or("-".to_string(), |t| t.to_string());

        write!(
            f,
            "Event(id={}, summary={}, start={}, end={}, organizer={})",
            opt(self.id.as_deref()),
            opt(self.summary.as_deref()),
            time(&self.start),
            time(&self.end),
            opt(self.organizer_name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timed(start: &str, end: &str) -> Event {
        Event {
            id: Some("123".into()),
            summary: Some("Event 123".into()),
            start: Some(EventTime::date_time(DateTime::parse_from_rfc3339(start).unwrap())),
            end: Some(EventTime::date_time(DateTime::parse_from_rfc3339(end).unwrap())),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_day_requires_dates_on_both_ends() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 11).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 12).unwrap();

        let all_day = Event {
            start: Some(EventTime::date(d1)),
            end: Some(EventTime::date(d2)),
            ..Default::default()
        };
        assert!(all_day.is_all_day());

        let half = Event {
            start: Some(EventTime::date(d1)),
            end: timed("2020-01-11T10:00:00Z", "2020-01-12T10:00:00Z").end,
            ..Default::default()
        };
        assert!(!half.is_all_day());

        assert!(!timed("2020-01-11T10:00:00Z", "2020-01-11T11:00:00Z").is_all_day());
        assert!(!Event::default().is_all_day());
    }

    #[test]
    fn test_date_and_date_time_together_is_not_all_day() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 11).unwrap();
        let both = EventTime {
            date: Some(d),
            date_time: Some(DateTime::parse_from_rfc3339("2020-01-11T10:00:00Z").unwrap()),
            time_zone: None,
        };
        let event = Event {
            start: Some(both.clone()),
            end: Some(both),
            ..Default::default()
        };
        assert!(!event.is_all_day());
    }

    #[test]
    fn test_copy_drops_server_fields() {
        let raw = json!({
            "id": "abc",
            "etag": "\"3181\"",
            "iCalUID": "abc@google.com",
            "summary": "Standup",
            "description": "Daily",
            "location": "Room 1",
            "created": "2020-01-01T00:00:00Z",
            "updated": "2020-01-02T00:00:00Z",
            "organizer": { "displayName": "Alice", "email": "alice@example.com" },
            "attendees": [{ "email": "bob@example.com" }],
            "reminders": { "useDefault": true },
            "sequence": 2,
            "htmlLink": "https://example.com",
            "start": { "dateTime": "2020-01-11T11:11:11Z" },
            "end": { "dateTime": "2020-01-11T12:11:11Z" }
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert_eq!(event.organizer_name(), Some("Alice"));

        let copy = event.to_copy();
        assert_eq!(copy.id, None);
        assert!(copy.extra.is_empty());
        assert_eq!(copy.ical_uid.as_deref(), Some("abc@google.com"));
        assert_eq!(copy.summary.as_deref(), Some("Standup"));
        assert_eq!(copy.location.as_deref(), Some("Room 1"));
        assert_eq!(copy.start, event.start);

        let body = serde_json::to_value(&copy).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("attendees").is_none());
        let reparsed: Event = serde_json::from_value(body).unwrap();
        assert_eq!(reparsed, copy);
    }

    #[test]
    fn test_equality_includes_passthrough_fields() {
        let a = timed("2020-01-11T11:11:11Z", "2020-01-11T12:11:11Z");
        let mut b = a.clone();
        assert_eq!(a, b);

        b.extra.insert("colorId".into(), json!("4"));
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_display_short_form() {
        let event = timed("2020-01-11T11:11:11Z", "2020-01-11T12:11:11Z");
        assert_eq!(
            event.to_string(),
            "Event(id=123, summary=Event 123, start=2020-01-11T11:11:11+00:00, \
             end=2020-01-11T12:11:11+00:00, organizer=-)"
        );
    }
}
