//! Wire types for the PersonalDetails resource

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned record identifier.
///
/// Backends hand these out as either JSON numbers or strings; both are kept
/// as text since the id is only ever echoed back in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct PersonId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for PersonId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => PersonId(n.to_string()),
            RawId::Text(s) => PersonId(s),
        }
    }
}

impl From<PersonId> for String {
    fn from(id: PersonId) -> Self {
        id.0
    }
}

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        PersonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted personal-details record as returned by the list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PersonId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub postal_code: String,
}

/// Request body for create and update (the id travels in the URL)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// `GET /api/PersonalDetails` envelope.
///
/// Decoding never fails on an object: a `success` that is not literally
/// `true` reads as `false`, and a `data` that is not an array of records
/// reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEnvelope {
    #[serde(default, deserialize_with = "only_true")]
    pub success: bool,
    #[serde(default, deserialize_with = "records_or_none")]
    pub data: Option<Vec<PersonRecord>>,
}

impl ListEnvelope {
    /// The records, if the envelope carries both markers
    pub fn into_records(self) -> Option<Vec<PersonRecord>> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// Structured error body sent with a non-2xx status.
///
/// Submission failures carry an `errors` list, list and delete failures a
/// `message`. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse leniently; `None` when the body is not a JSON object
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
        let object = value.as_object()?;

        let errors = object
            .get("errors")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let message = object
            .get("message")
            .and_then(|v| v.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Some(ErrorBody { errors, message })
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn only_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)? == serde_json::Value::Bool(true))
}

fn records_or_none<'de, D>(deserializer: D) -> Result<Option<Vec<PersonRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Array(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}
