use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Label used wherever an article carries no source identifier.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A single article as returned by the news search API.
///
/// Field names follow the upstream wire format. Anything else the upstream
/// sends is ignored here; the gateway relays it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "pubDate", default, deserialize_with = "null_as_default")]
    pub pub_date: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

impl Article {
    /// Identity used to suppress an article that was already shown:
    /// the title followed by the description (empty when absent).
    pub fn fingerprint(&self) -> String {
        let mut fingerprint = self.title.clone();
        if let Some(description) = &self.description {
            fingerprint.push_str(description);
        }
        fingerprint
    }

    /// Parses `pubDate`. Accepts RFC 3339 as well as the upstream's
    /// `YYYY-MM-DD HH:MM:SS`, which is in UTC.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.pub_date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn source(&self) -> &str {
        self.source_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SOURCE)
    }
}

/// One page of results for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "totalResults", default, deserialize_with = "null_as_default")]
    pub total_results: u64,
    /// `None` when the upstream omitted the array or sent `null`.
    #[serde(default)]
    pub results: Option<Vec<Article>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.total_results == 0
    }

    pub fn into_articles(self) -> Option<Vec<Article>> {
        self.results
    }
}

/// Error body returned by the gateway on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
