use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::Attrs;

/// Who may react to channel posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionMode {
    All,
    Basic,
    None,
}

impl ReactionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Basic => "BASIC",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for ReactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role the metadata lookup is performed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViewRole {
    Admin,
    Guest,
    Owner,
    Subscriber,
}

impl ViewRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Guest => "GUEST",
            Self::Owner => "OWNER",
            Self::Subscriber => "SUBSCRIBER",
        }
    }
}

impl fmt::Display for ViewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channel a history fetch addresses: by invite code or by address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Invite(String),
    Jid(String),
}

impl MessageSource {
    /// Builds a source from a free-form kind string, `invite` or `jid`.
    pub fn from_kind(kind: &str, key: impl Into<String>) -> Result<Self, UnknownSourceKind> {
        match kind {
            "invite" => Ok(Self::Invite(key.into())),
            "jid" => Ok(Self::Jid(key.into())),
            other => Err(UnknownSourceKind(other.to_string())),
        }
    }

    /// Value of the `type` attribute on the `messages` request node.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invite(_) => "invite",
            Self::Jid(_) => "jid",
        }
    }

    /// Attribute name the key travels under, `key` for invites and `jid` otherwise.
    pub fn key_attr(&self) -> &'static str {
        match self {
            Self::Invite(_) => "key",
            Self::Jid(_) => "jid",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Invite(key) | Self::Jid(key) => key,
        }
    }
}

/// Error for a kind string outside `invite` / `jid`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message source kind '{0}'")]
pub struct UnknownSourceKind(pub String);

/// Error for a reaction mode outside `ALL` / `BASIC` / `NONE`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reaction mode '{0}'")]
pub struct UnknownReactionMode(pub String);

impl FromStr for ReactionMode {
    type Err = UnknownReactionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "BASIC" => Ok(Self::Basic),
            "NONE" => Ok(Self::None),
            other => Err(UnknownReactionMode(other.to_string())),
        }
    }
}

/// Normalized channel metadata.
///
/// Timestamps are epoch seconds. `picture` and `preview` hold the media
/// direct path and are `None` when the channel has no image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterMetadata {
    pub id: String,
    pub state: String,
    pub creation_time: i64,
    pub name: String,
    pub name_time: i64,
    pub description: String,
    pub description_time: i64,
    pub invite: Option<String>,
    pub handle: Option<String>,
    pub picture: Option<String>,
    pub preview: Option<String>,
    /// Reaction mode exactly as the server reported it. Parse with
    /// `ReactionMode::from_str` when a known mode is needed.
    pub reaction_codes: Option<String>,
    pub subscribers: u64,
    pub verification: Option<String>,
    /// Per-viewer fields, passed through untouched.
    pub viewer_metadata: Option<serde_json::Value>,
}

/// View and reaction counters of one channel post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCounters {
    pub server_id: String,
    /// `None` when the server sent no `views_count`, which is not the same as zero.
    pub views: Option<u64>,
    /// Attribute sets of every `reactions` child, in received order.
    pub reactions: Vec<Attrs>,
}

/// Reply to a live updates subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveUpdates {
    /// Subscription lifetime as sent by the server.
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_mode_serializes_uppercase() {
        assert_eq!(serde_json::to_value(ReactionMode::Basic).unwrap(), "BASIC");
        assert_eq!("NONE".parse::<ReactionMode>().unwrap(), ReactionMode::None);
        assert_eq!(
            "none".parse::<ReactionMode>(),
            Err(UnknownReactionMode("none".into()))
        );
        assert_eq!(
            UnknownReactionMode("BLOCKLIST".into()).to_string(),
            "unknown reaction mode 'BLOCKLIST'"
        );
    }

    #[test]
    fn message_source_from_kind() {
        let invite = MessageSource::from_kind("invite", "AbCd").unwrap();
        assert_eq!(invite.key_attr(), "key");
        assert_eq!(invite.key(), "AbCd");

        let jid = MessageSource::from_kind("jid", "1@newsletter").unwrap();
        assert_eq!(jid.kind(), "jid");
        assert_eq!(jid.key_attr(), "jid");

        assert_eq!(
            MessageSource::from_kind("phone", "x"),
            Err(UnknownSourceKind("phone".into()))
        );
        assert_eq!(
            UnknownSourceKind("phone".into()).to_string(),
            "unknown message source kind 'phone'"
        );
    }
}
