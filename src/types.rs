use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::errors::{Result, SilenceCtlError};

/// Default lifetime of a new silence, in hours
pub const DEFAULT_SILENCE_HOURS: u32 = 2;

/// Label matcher selecting the alerts a silence applies to
///
/// Two matchers are the same matcher when name, value and `is_regex` all agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    /// Label name
    pub name: String,

    /// Label value, or a pattern when `is_regex` is set
    pub value: String,

    /// Whether `value` is a regular expression
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_regex: bool,
}

impl Matcher {
    /// Create an exact (non-regex) matcher
    pub fn equal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            is_regex: false,
        }
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_regex {
            write!(f, "{}=~{}", self.name, self.value)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}

/// Silence lifecycle state as reported by Alertmanager
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SilenceState {
    Active,
    Pending,
    Expired,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SilenceStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: SilenceState,
}

/// Silence as returned by `GET /api/v2/silences`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Silence {
    /// Silence identifier; some backends report it as `silenceID`
    #[serde(default, alias = "silenceID")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub matchers: Vec<Matcher>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: SilenceStatus,

    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl Silence {
    pub fn is_active(&self) -> bool {
        self.status.state == SilenceState::Active
    }

    /// Check whether every requested matcher is part of this silence
    ///
    /// Order and duplicates are irrelevant, the comparison is set inclusion.
    pub fn matches(&self, requested: &[Matcher]) -> bool {
        let own: HashSet<&Matcher> = self.matchers.iter().collect();
        requested.iter().all(|m| own.contains(m))
    }
}

/// Decode an explicit `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for `POST /api/v2/silences`
///
/// # Example
///
/// ```rust
/// use am_silence_ctl::{Matcher, PostableSilence};
///
/// let silence = PostableSilence::new(vec![Matcher::equal("role", "db")], "alice")
///     .with_hours(4)
///     .unwrap()
///     .with_comment("kernel upgrade");
///
/// assert_eq!(silence.created_by, "alice");
/// assert_eq!(silence.comment, "kernel upgrade");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostableSilence {
    pub matchers: Vec<Matcher>,

    /// Start of the silence window, serialized as RFC 3339 UTC (`...Z`)
    pub starts_at: DateTime<Utc>,

    pub ends_at: DateTime<Utc>,

    pub created_by: String,

    pub comment: String,
}

impl PostableSilence {
    /// Create a silence starting now and lasting [`DEFAULT_SILENCE_HOURS`]
    ///
    /// The comment defaults to `Silence created by <created_by>`.
    pub fn new(matchers: Vec<Matcher>, created_by: &str) -> Self {
        let starts_at = Utc::now();

        Self {
            matchers,
            starts_at,
            ends_at: starts_at + Duration::hours(i64::from(DEFAULT_SILENCE_HOURS)),
            created_by: created_by.to_string(),
            comment: format!("Silence created by {created_by}"),
        }
    }

    /// Set the silence duration, counted from `starts_at`
    ///
    /// # Errors
    ///
    /// Returns [`SilenceCtlError::InvalidDuration`] when the end time is out of range.
    pub fn with_duration(mut self, duration: Duration) -> Result<Self> {
        self.ends_at = self
            .starts_at
            .checked_add_signed(duration)
            .ok_or(SilenceCtlError::InvalidDuration(duration))?;
        Ok(self)
    }

    pub fn with_hours(self, hours: u32) -> Result<Self> {
        self.with_duration(Duration::hours(i64::from(hours)))
    }

    /// Set the comment; an empty string keeps the generated one
    pub fn with_comment(mut self, comment: &str) -> Self {
        if !comment.is_empty() {
            self.comment = comment.to_string();
        }
        self
    }

    /// Move the silence window to start at `time`, keeping its duration
    pub fn with_starts_at(mut self, time: DateTime<Utc>) -> Result<Self> {
        let duration = self.duration();
        self.starts_at = time;
        self.with_duration(duration)
    }

    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }
}

/// Result of a successful create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedSilence {
    /// Identifier extracted from a JSON response
    Id(String),
    /// Response body when no identifier could be extracted
    Raw(String),
}

impl CreatedSilence {
    pub fn id(&self) -> Option<&str> {
        match self {
            CreatedSilence::Id(id) => Some(id),
            CreatedSilence::Raw(_) => None,
        }
    }
}

impl Display for CreatedSilence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatedSilence::Id(id) => write!(f, "{id}"),
            CreatedSilence::Raw(body) => write!(f, "{body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence_with(matchers: Vec<Matcher>) -> Silence {
        Silence {
            id: Some("abc".to_string()),
            matchers,
            status: SilenceStatus {
                state: SilenceState::Active,
            },
            starts_at: None,
            ends_at: None,
            created_by: None,
            comment: None,
        }
    }

    #[test]
    fn test_silence_matches_subset() {
        let silence = silence_with(vec![Matcher::equal("a", "1"), Matcher::equal("b", "2")]);

        assert!(silence.matches(&[Matcher::equal("a", "1")]));
        assert!(silence.matches(&[Matcher::equal("b", "2"), Matcher::equal("a", "1")]));
        assert!(!silence.matches(&[Matcher::equal("a", "1"), Matcher::equal("c", "3")]));
    }

    #[test]
    fn test_silence_matches_respects_regex_flag() {
        let silence = silence_with(vec![Matcher {
            name: "a".to_string(),
            value: "1".to_string(),
            is_regex: true,
        }]);

        assert!(!silence.matches(&[Matcher::equal("a", "1")]));
    }

    #[test]
    fn test_silence_deserialization() {
        let json = r#"{
            "id": "5f0c",
            "status": {"state": "active"},
            "matchers": [
                {"name": "alertname", "value": "Disk", "isRegex": false, "isEqual": true},
                {"name": "fqdn", "value": "db1.example.com"}
            ],
            "startsAt": "2024-05-01T10:00:00.000Z",
            "endsAt": "2024-05-01T12:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z",
            "createdBy": "alice",
            "comment": "maintenance"
        }"#;

        let silence: Silence = serde_json::from_str(json).unwrap();
        assert_eq!(silence.id.as_deref(), Some("5f0c"));
        assert!(silence.is_active());
        assert_eq!(silence.matchers.len(), 2);
        assert!(!silence.matchers[1].is_regex);
        assert_eq!(silence.created_by.as_deref(), Some("alice"));
    }

    #[test]
    fn test_silence_unknown_state_and_alias() {
        let json = r#"{"silenceID": "x1", "status": {"state": "weird"}, "matchers": []}"#;

        let silence: Silence = serde_json::from_str(json).unwrap();
        assert_eq!(silence.id.as_deref(), Some("x1"));
        assert_eq!(silence.status.state, SilenceState::Unknown);
        assert!(!silence.is_active());
    }

    #[test]
    fn test_postable_silence_defaults() {
        let silence = PostableSilence::new(vec![Matcher::equal("fqdn", "host")], "bob");

        assert_eq!(silence.comment, "Silence created by bob");
        assert_eq!(
            silence.duration(),
            Duration::hours(i64::from(DEFAULT_SILENCE_HOURS))
        );
    }

    #[test]
    fn test_postable_silence_empty_comment_keeps_default() {
        let silence = PostableSilence::new(vec![], "bob").with_comment("");
        assert_eq!(silence.comment, "Silence created by bob");
    }

    #[test]
    fn test_postable_silence_serialization() {
        let start = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let silence = PostableSilence::new(vec![Matcher::equal("role", "db")], "carol")
            .with_hours(3)
            .unwrap()
            .with_starts_at(start)
            .unwrap();

        let json = serde_json::to_value(&silence).unwrap();
        assert_eq!(json["matchers"][0]["name"], "role");
        assert_eq!(json["matchers"][0]["isRegex"], false);
        assert_eq!(json["createdBy"], "carol");

        let starts_at = json["startsAt"].as_str().unwrap();
        let ends_at = json["endsAt"].as_str().unwrap();
        assert!(starts_at.starts_with("2024-05-01T10:00:00"));
        assert!(starts_at.ends_with('Z'));
        assert!(ends_at.starts_with("2024-05-01T13:00:00"));
        assert!(ends_at.ends_with('Z'));
    }

    #[test]
    fn test_postable_silence_duration_overflow() {
        let result = PostableSilence::new(vec![], "bob").with_hours(u32::MAX);
        assert!(matches!(result, Err(SilenceCtlError::InvalidDuration(_))));

        let result = PostableSilence::new(vec![], "bob").with_starts_at(DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(SilenceCtlError::InvalidDuration(_))));
    }

    #[test]
    fn test_silence_null_fields_decode_as_defaults() {
        let json = r#"[
            {"id": "a", "status": {"state": "active"}, "matchers": null},
            {"id": "b", "status": null, "matchers": [{"name": "role", "value": "db", "isRegex": null}]},
            {"id": "c", "status": {"state": null}, "matchers": []}
        ]"#;

        let silences: Vec<Silence> = serde_json::from_str(json).unwrap();
        assert_eq!(silences.len(), 3);
        assert!(silences[0].matchers.is_empty());
        assert!(silences[0].is_active());
        assert_eq!(silences[1].status.state, SilenceState::Unknown);
        assert_eq!(silences[1].matchers, vec![Matcher::equal("role", "db")]);
        assert_eq!(silences[2].status.state, SilenceState::Unknown);
    }

    #[test]
    fn test_matcher_display() {
        assert_eq!(Matcher::equal("role", "db").to_string(), "role=db");
    }
}
