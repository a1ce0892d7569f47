//! Core type definitions for content items.
//!
//! Item types and statuses are serialized in lowercase, matching the host
//! platform's REST vocabulary (`"video"`, `"draft"`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type discriminator of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A regular blog post.
    Post,
    /// A static page.
    Page,
    /// A video entry carrying URL, length and text-track metadata.
    Video,
}

impl ItemType {
    /// All item types known to the host.
    pub const ALL: [ItemType; 3] = [Self::Post, Self::Page, Self::Video];

    /// Whether this is the `"video"` type the metadata extension acts on.
    pub fn is_video(self) -> bool {
        self == Self::Video
    }

    /// Route segment under `/wp/v2/` for this type.
    pub fn rest_base(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Page => "pages",
            Self::Video => "video",
        }
    }

    /// Resolve a `/wp/v2/{rest_base}` route segment.
    pub fn from_rest_base(base: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.rest_base() == base)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Page => write!(f, "page"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "page" => Ok(Self::Page),
            "video" => Ok(Self::Video),
            _ => Err(format!("Invalid item type: {}", s)),
        }
    }
}

/// Publication status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Draft,
    Pending,
    Private,
    Publish,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Private => write!(f, "private"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "publish" => Ok(Self::Publish),
            _ => Err(format!("Invalid item status: {}", s)),
        }
    }
}
