use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Display name used whenever a blog or comment has no embedded author.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(BlogId);

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Author reference as the backend sends it: populated or bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Embedded(UserSummary),
    Id(UserId),
}

impl UserRef {
    pub fn id(&self) -> &UserId {
        match self {
            Self::Embedded(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Embedded(summary) => summary.username.as_deref(),
            Self::Id(_) => None,
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        match self {
            Self::Embedded(summary) => summary.avatar_url.as_deref(),
            Self::Id(_) => None,
        }
    }
}

/// One entry of a blog's `likes` collection.
///
/// Depending on the endpoint the backend sends plain id strings, populated user
/// documents, or extended-JSON object ids. [`LikeEntry::normalized_id`] maps all
/// of them to the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LikeEntry {
    Id(String),
    Embedded {
        #[serde(rename = "_id")]
        id: Box<LikeEntry>,
    },
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl LikeEntry {
    pub fn normalized_id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Embedded { id } => id.normalized_id(),
            Self::ObjectId { oid } => oid,
        }
    }
}

impl From<&UserId> for LikeEntry {
    fn from(value: &UserId) -> Self {
        Self::Id(value.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(UserRef::username)
            .unwrap_or(ANONYMOUS_AUTHOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: BlogId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: Vec<LikeEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl Blog {
    pub fn author_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(UserRef::id)
    }

    /// Name shown on cards and matched by feed search.
    pub fn author_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(UserRef::username)
            .unwrap_or(ANONYMOUS_AUTHOR)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.author_id() == Some(user_id)
    }

    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likes
            .iter()
            .any(|like| like.normalized_id() == user_id.as_str())
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(full_name) if !full_name.is_empty() => full_name,
            _ => &self.username,
        }
    }
}

/// Locally persisted blog draft. Never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user as remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
}
