//! Wire types for the challenge API.
//!
//! The registration response arrives in one of two shapes: problem fields at
//! the top level, or nested under a generic `data` object. [`InitialResponse::into_problem`]
//! folds both into a single [`Problem`].

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ApiError, Result};

/// Identifier of a user in the follows graph.
pub type NodeId = i64;

/// Registration body posted to the challenge API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialRequest {
    pub name: String,
    pub reg_no: String,
    pub email: String,
}

impl InitialRequest {
    pub fn new(name: impl Into<String>, reg_no: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reg_no: reg_no.into(),
            email: email.into(),
        }
    }
}

/// A user and the ids it follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: NodeId,
    /// Absent or null means the user follows nobody.
    #[serde(default, deserialize_with = "lenient_follows")]
    pub follows: Vec<NodeId>,
}

impl UserRecord {
    pub fn new(id: NodeId, follows: Vec<NodeId>) -> Self {
        Self { id, follows }
    }
}

/// Raw registration response, tolerant of both response shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialResponse {
    #[serde(default, alias = "webhook")]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_find_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub find_id: Option<NodeId>,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRecord>>,
}

/// A complete problem, ready for the level finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub webhook_url: String,
    pub access_token: String,
    pub find_id: NodeId,
    pub level: i64,
    pub users: Vec<UserRecord>,
}

/// Answer body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub reg_no: String,
    pub outcome: Vec<NodeId>,
}

impl WebhookRequest {
    pub fn new(reg_no: impl Into<String>, outcome: Vec<NodeId>) -> Self {
        Self {
            reg_no: reg_no.into(),
            outcome,
        }
    }
}

impl InitialResponse {
    /// Start id, from the flat field or `data.findId`.
    pub fn find_id(&self) -> Result<Option<NodeId>> {
        match self.find_id {
            Some(id) => Ok(Some(id)),
            None => self
                .nested("findId")
                .map(|value| integer_field(value, "findId"))
                .transpose(),
        }
    }

    /// Target level, from the flat field or `data.level`.
    pub fn level(&self) -> Result<Option<i64>> {
        match self.level {
            Some(level) => Ok(Some(level)),
            None => self
                .nested("level")
                .map(|value| integer_field(value, "level"))
                .transpose(),
        }
    }

    /// Users, from the flat field or `data.users`.
    pub fn users(&self) -> Result<Option<Vec<UserRecord>>> {
        match &self.users {
            Some(users) => Ok(Some(users.clone())),
            None => self.nested("users").map(nested_users).transpose(),
        }
    }

    /// Normalize either response shape into a [`Problem`].
    ///
    /// Fails with [`ApiError::MissingField`] on the first absent piece. An
    /// empty user list counts as absent.
    pub fn into_problem(self) -> Result<Problem> {
        let find_id = self.find_id()?.ok_or(ApiError::MissingField("findId"))?;
        let level = self.level()?.ok_or(ApiError::MissingField("level"))?;
        let users = self
            .users()?
            .filter(|users| !users.is_empty())
            .ok_or(ApiError::MissingField("users"))?;
        let webhook_url = self
            .webhook_url
            .ok_or(ApiError::MissingField("webhookUrl"))?;
        let access_token = self
            .access_token
            .ok_or(ApiError::MissingField("accessToken"))?;

        Ok(Problem {
            webhook_url,
            access_token,
            find_id,
            level,
            users,
        })
    }

    fn nested(&self, key: &str) -> Option<&Value> {
        self.data
            .as_ref()?
            .get(key)
            .filter(|value| !value.is_null())
    }
}

/// Read an integer that may arrive as a JSON number or a numeric string.
fn integer_field(value: &Value, field: &'static str) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| ApiError::invalid(field, value)),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| ApiError::invalid(field, value)),
        _ => Err(ApiError::invalid(field, value)),
    }
}

fn nested_users(value: &Value) -> Result<Vec<UserRecord>> {
    Vec::<UserRecord>::deserialize(value).map_err(|e| ApiError::invalid("users", e))
}

/// Shared by both response shapes: a number, a numeric string, or null.
fn optional_integer<'de, D>(
    deserializer: D,
    field: &'static str,
) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integer_field(&value, field)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

fn lenient_find_id<'de, D>(deserializer: D) -> std::result::Result<Option<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_integer(deserializer, "findId")
}

fn lenient_level<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_integer(deserializer, "level")
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_field(&value, "users[].id").map_err(de::Error::custom)
}

fn lenient_follows<'de, D>(deserializer: D) -> std::result::Result<Vec<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .map(|item| integer_field(item, "users[].follows").map_err(de::Error::custom))
        .collect()
}
