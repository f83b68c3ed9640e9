use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Role as carried on the wire. Unknown strings decode to `Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// An explicit `null` role means the same as an absent one.
fn null_as_unspecified<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Role>::deserialize(deserializer)?.unwrap_or_default())
}

/// Mutable user fields as sent on create and returned on get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_unspecified")]
    pub role: Role,
}

/// Update payload. `None` means "not provided"; role defaults to `Unspecified`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_unspecified")]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub info: UserInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct GetRequest {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub user: UserMessage,
}

/// User as returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMessage {
    pub id: i64,
    pub info: UserInfo,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub id: i64,
    #[serde(default)]
    pub info: UpdateUserInfo,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: i64,
}

/// Empty response body (`{}`).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}
