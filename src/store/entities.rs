use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reserved prefix that marks a persisted `imageUri` as a symbolic icon instead of an external
/// image reference.
pub const ICON_PREFIX: &str = "icon:";

/// The picture shown for a workout. Icons come from a predefined symbolic set, images are opaque
/// uris handed over by an external picker. On the wire both are a single string, distinguished
/// by [ICON_PREFIX].
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(from = "String", into = "String")]
pub enum WorkoutImage {
    Icon(String),
    Image(String),
}

impl WorkoutImage {
    pub fn is_empty(&self) -> bool {
        match self {
            WorkoutImage::Icon(name) => name.is_empty(),
            WorkoutImage::Image(uri) => uri.is_empty(),
        }
    }
}

impl From<String> for WorkoutImage {
    fn from(value: String) -> Self {
        match value.strip_prefix(ICON_PREFIX) {
            Some(name) => WorkoutImage::Icon(name.to_string()),
            None => WorkoutImage::Image(value),
        }
    }
}

impl From<WorkoutImage> for String {
    fn from(value: WorkoutImage) -> Self {
        match value {
            WorkoutImage::Icon(name) => format!("{ICON_PREFIX}{name}"),
            WorkoutImage::Image(uri) => uri,
        }
    }
}

impl Display for WorkoutImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutImage::Icon(name) => write!(f, "{ICON_PREFIX}{name}"),
            WorkoutImage::Image(uri) => write!(f, "{uri}"),
        }
    }
}

/// A user-defined trackable activity. Immutable after creation, removed explicitly.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub image_uri: WorkoutImage,
    pub created_at: DateTime<Utc>,
}

/// The live completed set for a single local calendar date. Exactly one instance is persisted at
/// a time; it is replaced, not merged, once the date advances.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DailyCompletion {
    pub date: NaiveDate,
    pub completed_workout_ids: Vec<String>,
}

/// Completion count for one day that had completions recorded at some point.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// Parses the persisted activity history, dropping entries that don't deserialize instead of
/// failing the whole document.
pub fn parse_activity_history(payload: &str) -> Result<Vec<ActivityDay>, serde_json::Error> {
    let raw = serde_json::from_str::<Vec<serde_json::Value>>(payload)?;
    let history = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ActivityDay>(value.clone()) {
            Ok(day) => Some(day),
            Err(e) => {
                // ignore illegal values. Might happen after a partial write or a hand edit
                warn!("Skipping malformed activity entry {value}: {e}");
                None
            }
        })
        .collect();
    Ok(history)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_activity_history, ActivityDay, Workout, WorkoutImage};

    #[test]
    fn icon_round_trips_through_prefix() {
        let image = WorkoutImage::from("icon:barbell".to_string());
        assert_eq!(image, WorkoutImage::Icon("barbell".into()));
        assert_eq!(String::from(image), "icon:barbell");
    }

    #[test]
    fn plain_uri_stays_an_image() {
        let image = WorkoutImage::from("file:///photos/rock-climbing.jpg".to_string());
        assert_eq!(
            image,
            WorkoutImage::Image("file:///photos/rock-climbing.jpg".into())
        );
        assert_eq!(String::from(image), "file:///photos/rock-climbing.jpg");
    }

    #[test]
    fn workout_wire_format_is_camel_case() {
        let workout: Workout = serde_json::from_str(
            r#"{
                "id": "1704067200000",
                "name": "Push-ups",
                "imageUri": "icon:fitness",
                "createdAt": "2024-01-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();

        assert_eq!(workout.image_uri, WorkoutImage::Icon("fitness".into()));

        let payload = serde_json::to_string(&workout).unwrap();
        assert!(payload.contains("\"imageUri\":\"icon:fitness\""));
        assert!(payload.contains("\"createdAt\""));
    }

    #[test]
    fn malformed_history_entries_are_skipped() {
        let history = parse_activity_history(
            r#"[
                {"date": "2024-01-01", "count": 2},
                {"date": "not-a-date", "count": 1},
                {"count": 3},
                {"date": "2024-01-03", "count": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            history,
            vec![
                ActivityDay {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    count: 2
                },
                ActivityDay {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn history_that_is_not_an_array_is_an_error() {
        assert!(parse_activity_history(r#"{"date": "2024-01-01"}"#).is_err());
    }
}
