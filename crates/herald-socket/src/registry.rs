use std::fmt;
use std::str::FromStr;

use crate::error::NewsletterError;

/// Server-side operation selected by a tunneled query.
///
/// The numeric tokens are fixed by the service and never derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryId {
    JobMutation,
    Metadata,
    Unfollow,
    Follow,
    Unmute,
    Mute,
    Create,
    AdminCount,
    ChangeOwner,
    Delete,
    Demote,
}

impl QueryId {
    pub const ALL: [QueryId; 11] = [
        Self::JobMutation,
        Self::Metadata,
        Self::Unfollow,
        Self::Follow,
        Self::Unmute,
        Self::Mute,
        Self::Create,
        Self::AdminCount,
        Self::ChangeOwner,
        Self::Delete,
        Self::Demote,
    ];

    /// Token carried in the `query_id` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JobMutation => "7150902998257522",
            Self::Metadata => "6620195908089573",
            Self::Unfollow => "7238632346214362",
            Self::Follow => "7871414976211147",
            Self::Unmute => "7337137176362961",
            Self::Mute => "25151904754424642",
            Self::Create => "6996806640408138",
            Self::AdminCount => "7130823597031706",
            Self::ChangeOwner => "7341777602580933",
            Self::Delete => "8316537688363079",
            Self::Demote => "6551828931592903",
        }
    }

    /// Logical operation name.
    pub fn name(self) -> &'static str {
        match self {
            Self::JobMutation => "JOB_MUTATION",
            Self::Metadata => "METADATA",
            Self::Unfollow => "UNFOLLOW",
            Self::Follow => "FOLLOW",
            Self::Unmute => "UNMUTE",
            Self::Mute => "MUTE",
            Self::Create => "CREATE",
            Self::AdminCount => "ADMIN_COUNT",
            Self::ChangeOwner => "CHANGE_OWNER",
            Self::Delete => "DELETE",
            Self::Demote => "DEMOTE",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks an operation up by its logical name.
impl FromStr for QueryId {
    type Err = NewsletterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| NewsletterError::invalid(format!("unknown operation '{}'", name)))
    }
}

/// Key under `data` where a tunneled reply puts its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XwaPath {
    Newsletter,
    Create,
    AdminCount,
}

impl XwaPath {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newsletter => "xwa2_newsletter",
            Self::Create => "xwa2_newsletter_create",
            Self::AdminCount => "xwa2_newsletter_admin",
        }
    }
}
