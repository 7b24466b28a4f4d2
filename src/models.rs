use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Distinguishes an explicit `null` (`Some(None)`) from a missing field (`None`)
/// so it can be written back unchanged.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A message from `conversations.history`.
///
/// Only the fields the exporter reads are typed; everything else is kept in
/// `extra` so the raw JSON dump matches what the API returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Might not exist, or be null, for bots
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ts: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRef>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref()?.as_deref()
    }

    /// Name of the bot or integration that sent the message, if any.
    pub fn bot_name(&self) -> Option<&str> {
        self.extra
            .get("bot_profile")
            .and_then(|p| p.get("name"))
            .or_else(|| self.extra.get("username"))
            .and_then(|n| n.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// A file attached to a message, or returned by `files.list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_private_download: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_private: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRef {
    /// Prefer `url_private_download`, fall back to `url_private`.
    pub fn download_url(&self) -> Option<&str> {
        self.url_private_download
            .as_deref()
            .or(self.url_private.as_deref())
    }

    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.title.as_deref().unwrap_or(self.id.as_str())
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
}

/// A member from `users.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile: UserProfile,
}

impl User {
    /// Display name, then real name, then account name, then the ID.
    pub fn display_name(&self) -> &str {
        [
            self.profile.display_name.as_str(),
            self.profile.real_name.as_str(),
            self.name.as_str(),
        ]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(self.id.as_str())
    }
}

/// A channel, group or IM from `conversations.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_im: bool,
    /// The other party of an IM
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct UsersListResponse {
    #[serde(default)]
    pub members: Vec<User>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsListResponse {
    #[serde(default)]
    pub channels: Vec<Conversation>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub paging: Option<Paging>,
}
