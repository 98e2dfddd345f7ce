use std::path::Path;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::fingerprint::{fingerprint, Fingerprint};

// ---------------------------------------------------------------------------
// GeneratedEvent — raw reply from the text generator
// ---------------------------------------------------------------------------

/// An event as the text generator returned it. Fields are optional here so a
/// reply with a missing field parses and is rejected by [`validate`](Self::validate)
/// with a precise message instead of a serde error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
}

impl GeneratedEvent {
    pub fn validate(self) -> Result<Event, ValidationError> {
        let missing: Vec<&'static str> = [
            ("title", self.title.is_none()),
            ("description", self.description.is_none()),
            ("location", self.location.is_none()),
            ("date", self.date.is_none()),
            ("image_prompt", self.image_prompt.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (
            self.title,
            self.description,
            self.location,
            self.date,
            self.image_prompt,
        ) {
            (Some(title), Some(description), Some(location), Some(date), Some(image_prompt)) => {
                Ok(Event {
                    title,
                    description,
                    location,
                    date,
                    image_prompt,
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

impl From<Event> for GeneratedEvent {
    fn from(event: Event) -> Self {
        Self {
            title: Some(event.title),
            description: Some(event.description),
            location: Some(event.location),
            date: Some(event.date),
            image_prompt: Some(event.image_prompt),
        }
    }
}

// ---------------------------------------------------------------------------
// Event — validated candidate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Free-form, e.g. "March 14, 1912".
    pub date: String,
    pub image_prompt: String,
}

impl Event {
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.title, &self.description, &self.location)
    }
}

// ---------------------------------------------------------------------------
// HistoryRecord — persisted, immutable
// ---------------------------------------------------------------------------

/// One published event in the history log.
///
/// Every field defaults to empty so a record missing keys still loads; the
/// novelty gate treats missing text as empty. `null` reads as empty too, and
/// a stray number or bool is kept as its JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_prompt: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_path: String,
    #[serde(default, rename = "hash", deserialize_with = "lenient_fingerprint")]
    pub fingerprint: Fingerprint,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_fingerprint<'de, D>(deserializer: D) -> Result<Fingerprint, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Fingerprint::from)
}

/// Local ISO-8601 with microseconds, the format existing logs use.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

impl HistoryRecord {
    pub fn from_published<Tz>(
        event: &Event,
        image_path: &Path,
        fingerprint: Fingerprint,
        published_at: DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            timestamp: published_at.format(TIMESTAMP_FORMAT).to_string(),
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            image_prompt: event.image_prompt.clone(),
            image_path: image_path.display().to_string(),
            fingerprint,
        }
    }

    /// Fingerprint derived from the stored text, for verifying the log.
    pub fn recomputed_fingerprint(&self) -> Fingerprint {
        fingerprint(&self.title, &self.description, &self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn full_event() -> GeneratedEvent {
        GeneratedEvent {
            title: Some("The Silent Armistice".into()),
            description: Some("Both fleets lower their flags at noon.".into()),
            location: Some("Jutland, Denmark".into()),
            date: Some("May 31, 1916".into()),
            image_prompt: Some("two fleets at rest".into()),
        }
    }

    #[test]
    fn complete_event_validates() {
        let event = full_event().validate().unwrap();
        assert_eq!(event.title, "The Silent Armistice");
        assert_eq!(event.date, "May 31, 1916");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let mut raw = full_event();
        raw.location = None;
        raw.image_prompt = None;

        let err = raw.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["location", "image_prompt"])
        );
    }

    #[test]
    fn empty_string_counts_as_present() {
        let mut raw = full_event();
        raw.description = Some(String::new());
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn generated_event_parses_model_json_with_missing_key() {
        let raw: GeneratedEvent = serde_json::from_str(
            r#"{"title":"T","description":"D","location":"L","date":"June 1, 1900"}"#,
        )
        .unwrap();
        assert!(raw.image_prompt.is_none());
        assert!(raw.validate().is_err());
    }

    #[test]
    fn record_uses_legacy_field_names() {
        let event = full_event().validate().unwrap();
        let fp = event.fingerprint();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record =
            HistoryRecord::from_published(&event, Path::new("generated_images/a.png"), fp.clone(), at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["hash"], fp.as_str());
        assert_eq!(json["image_path"], "generated_images/a.png");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00.000000");
        assert!(json.get("fingerprint").is_none());
    }

    #[test]
    fn partial_record_loads_with_empty_fields() {
        let record: HistoryRecord = serde_json::from_str(r#"{"title":"Only a title"}"#).unwrap();
        assert_eq!(record.title, "Only a title");
        assert_eq!(record.description, "");
        assert!(record.fingerprint.is_empty());
    }

    #[test]
    fn null_and_non_string_fields_read_as_text() {
        let record: HistoryRecord = serde_json::from_str(
            r#"{"title":null,"description":"D","location":42,"date":true,"hash":null}"#,
        )
        .unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.description, "D");
        assert_eq!(record.location, "42");
        assert_eq!(record.date, "true");
        assert!(record.fingerprint.is_empty());
    }

    #[test]
    fn recomputed_fingerprint_matches_event() {
        let event = full_event().validate().unwrap();
        let record = HistoryRecord::from_published(
            &event,
            Path::new("x.png"),
            event.fingerprint(),
            Utc::now(),
        );
        assert_eq!(record.recomputed_fingerprint(), record.fingerprint);
    }
}
