//! Domain records for the CanLII API.
//!
//! # Design
//! Records are flat projections of one API object, built by explicit mapping
//! functions over the raw `serde_json::Value` rather than by deserializing
//! the payload directly. The API is loose about types (case ids arrive as
//! strings, numbers, or per-language objects), so each field is coerced on
//! its own and anything unusable becomes `None` instead of failing the whole
//! response. The serde derives describe the records' own camelCase shape for
//! callers that want to re-emit them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_LANGUAGE;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A case collection such as `csc-scc` (Supreme Court of Canada).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub database_id: Option<String>,
    pub name: Option<String>,
    pub jurisdiction: Option<String>,
}

impl Database {
    pub fn from_record(data: &Value) -> Self {
        Self {
            database_id: text(data, "databaseId"),
            name: text(data, "name"),
            jurisdiction: text(data, "jurisdiction"),
        }
    }
}

/// One decision within a database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub database_id: Option<String>,
    pub case_id: Option<String>,
    pub title: Option<String>,
    pub citation: Option<String>,
    pub url: Option<String>,
    pub decision_date: Option<NaiveDate>,
    pub language: Option<String>,
}

impl Case {
    /// Map an entry of a browse listing.
    ///
    /// Browse entries may carry `caseId` as `{"en": "..."}`; the id under
    /// `language` is taken, falling back to English. Browse entries have no
    /// `url` or `language`.
    pub fn from_browse(data: &Value, language: &str) -> Self {
        Self {
            database_id: text(data, "databaseId"),
            case_id: data
                .get("caseId")
                .and_then(|id| localized_id(id, language)),
            title: text(data, "title"),
            citation: text(data, "citation"),
            url: None,
            decision_date: date(data, "decisionDate"),
            language: None,
        }
    }

    /// Map a case detail response.
    pub fn from_detail(data: &Value) -> Self {
        Self {
            database_id: text(data, "databaseId"),
            case_id: text(data, "caseId"),
            title: text(data, "title"),
            citation: text(data, "citation"),
            url: text(data, "url"),
            decision_date: date(data, "decisionDate"),
            language: text(data, "language"),
        }
    }
}

/// Citation, else title, else `"{database_id}/{case_id}"`.
impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match non_empty(&self.citation).or_else(|| non_empty(&self.title)) {
            Some(label) => f.write_str(label),
            None => write!(
                f,
                "{}/{}",
                self.database_id.as_deref().unwrap_or_default(),
                self.case_id.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Paging and date filters for `Case::browse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOptions {
    pub offset: u32,
    pub limit: u32,
    pub published_after: Option<NaiveDate>,
    pub published_before: Option<NaiveDate>,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
            published_after: None,
            published_before: None,
        }
    }
}

impl BrowseOptions {
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn published_after(mut self, date: NaiveDate) -> Self {
        self.published_after = Some(date);
        self
    }

    pub fn published_before(mut self, date: NaiveDate) -> Self {
        self.published_before = Some(date);
        self
    }

    /// Query parameters understood by the browse endpoint. Date filters are
    /// only present when set.
    pub fn to_query(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("offset".to_string(), self.offset.to_string());
        params.insert("resultCount".to_string(), self.limit.to_string());
        if let Some(after) = self.published_after {
            params.insert(
                "decisionDateAfter".to_string(),
                after.format(DATE_FORMAT).to_string(),
            );
        }
        if let Some(before) = self.published_before {
            params.insert(
                "decisionDateBefore".to_string(),
                before.format(DATE_FORMAT).to_string(),
            );
        }
        params
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(scalar)
}

fn localized_id(value: &Value, language: &str) -> Option<String> {
    match value {
        Value::Object(by_language) => by_language
            .get(language)
            .or_else(|| by_language.get(DEFAULT_LANGUAGE))
            .and_then(scalar),
        other => scalar(other),
    }
}

fn date(data: &Value, key: &str) -> Option<NaiveDate> {
    data.get(key).and_then(Value::as_str).and_then(parse_date)
}

/// Accepts `YYYY-MM-DD`, or any string that starts with one.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().or_else(|| {
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
