//! The event resource served by the event API.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Base URL of the asset server that event images are served from.
pub const IMAGE_BASE_URL: &str = "http://localhost:3000";

/// An event as returned by `GET /events/{id}`.
///
/// `date` and `time` are free text owned by the server. Use
/// [`Event::starts_at`] for a parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
}

impl Event {
    /// Absolute URL of the event image on the asset server.
    pub fn image_url(&self) -> String {
        format!(
            "{}/{}",
            IMAGE_BASE_URL.trim_end_matches('/'),
            self.image.trim_start_matches('/')
        )
    }

    /// Parse `date` and `time` into a local timestamp.
    ///
    /// Returns `None` when either field is not in a recognised format.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = parse_time(self.time.trim())?;
        Some(date.and_time(time))
    }

    /// ISO-8601 timestamp for machine consumers, e.g. `2024-05-01T18:30:00`.
    pub fn machine_timestamp(&self) -> Option<String> {
        self.starts_at()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    /// Human-readable "date @ time" label, always built from the raw fields.
    pub fn schedule_label(&self) -> String {
        format!("{} @ {}", self.date, self.time)
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Payload shapes the API uses for a single event.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum EventPayload {
    Wrapped { event: Event },
    Bare(Event),
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        match payload {
            EventPayload::Wrapped { event } => event,
            EventPayload::Bare(event) => event,
        }
    }
}

/// Payload shapes the API uses for the event list.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum EventListPayload {
    Wrapped { events: Vec<Event> },
    Bare(Vec<Event>),
}

impl From<EventListPayload> for Vec<Event> {
    fn from(payload: EventListPayload) -> Self {
        match payload {
            EventListPayload::Wrapped { events } => events,
            EventListPayload::Bare(events) => events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Event {
        Event {
            id: "e1".into(),
            title: "City Walk".into(),
            description: "A walk through the old town".into(),
            date: "2024-05-01".into(),
            time: "18:30".into(),
            location: "Main Square".into(),
            image: "images/walk.jpg".into(),
        }
    }

    #[test]
    fn image_url_joins_base_and_path() {
        assert_eq!(sample().image_url(), "http://localhost:3000/images/walk.jpg");

        let mut event = sample();
        event.image = "/images/walk.jpg".into();
        assert_eq!(event.image_url(), "http://localhost:3000/images/walk.jpg");
    }

    #[test]
    fn machine_timestamp_is_iso8601() {
        assert_eq!(
            sample().machine_timestamp().as_deref(),
            Some("2024-05-01T18:30:00")
        );
    }

    #[test]
    fn time_with_seconds_parses() {
        let mut event = sample();
        event.time = "09:05:30".into();
        assert_eq!(
            event.machine_timestamp().as_deref(),
            Some("2024-05-01T09:05:30")
        );
    }

    #[test]
    fn free_text_schedule_has_no_machine_timestamp() {
        let mut event = sample();
        event.date = "next friday".into();
        assert_eq!(event.starts_at(), None);
        assert_eq!(event.schedule_label(), "next friday @ 18:30");
    }

    #[test]
    fn payload_accepts_wrapped_and_bare_shapes() {
        let bare = r#"{"id":"e1","title":"City Walk","description":"d","date":"2024-05-01","time":"18:30","location":"l","image":"i.jpg"}"#;
        let wrapped = format!(r#"{{"event":{bare}}}"#);

        let a: Event = serde_json::from_str::<EventPayload>(bare).unwrap().into();
        let b: Event = serde_json::from_str::<EventPayload>(&wrapped).unwrap().into();
        assert_eq!(a, b);
        assert_eq!(a.title, "City Walk");
    }

    #[test]
    fn list_payload_accepts_wrapped_and_bare_shapes() {
        let bare = r#"[{"id":"e1","title":"One"},{"id":"e2","title":"Two"}]"#;
        let wrapped = format!(r#"{{"events":{bare}}}"#);

        let a: Vec<Event> = serde_json::from_str::<EventListPayload>(bare).unwrap().into();
        let b: Vec<Event> = serde_json::from_str::<EventListPayload>(&wrapped)
            .unwrap()
            .into();
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
    }
}
