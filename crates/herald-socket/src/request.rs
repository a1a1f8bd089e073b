use serde_json::{Map, Value, json};

use herald_types::{BinaryNode, MessageSource, ReactionMode, ViewRole, is_newsletter_jid};

use crate::error::{NewsletterError, Result};
use crate::registry::QueryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IqType {
    Get,
    Set,
}

impl IqType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

/// The three request shapes the service understands for newsletters.
#[derive(Debug, Clone, PartialEq)]
pub enum WireRequest {
    /// Legacy command: an `iq` in the `newsletter` namespace whose children name the action.
    Tagged {
        to: String,
        mode: IqType,
        content: Vec<BinaryNode>,
    },
    /// Opaque query id plus JSON variables, tunneled through `w:mex`.
    Tunneled {
        newsletter_id: Option<String>,
        query_id: QueryId,
        variables: Map<String, Value>,
    },
    /// A `message` stanza reacting to a post. No code removes the reaction.
    Reaction {
        to: String,
        server_id: String,
        code: Option<String>,
    },
}

/// One newsletter operation with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsletterRequest {
    SubscribeUpdates { jid: String },
    ReactionMode { jid: String, mode: ReactionMode },
    UpdateDescription { jid: String, description: Option<String> },
    UpdateName { jid: String, name: String },
    /// `picture` is the base64 of the derived image.
    UpdatePicture { jid: String, picture: String },
    RemovePicture { jid: String },
    Follow { jid: String },
    Unfollow { jid: String },
    Mute { jid: String },
    Unmute { jid: String },
    Create { name: String, description: String },
    Metadata { jid: String, role: ViewRole },
    AdminCount { jid: String },
    ChangeOwner { jid: String, user_id: String },
    Demote { jid: String, user_id: String },
    Delete { jid: String },
    React { jid: String, server_id: String, code: Option<String> },
    FetchMessages { source: MessageSource, count: u32, after: u64 },
    FetchMessageUpdates { jid: String, count: u32, after: u64, since: u64 },
}

impl NewsletterRequest {
    /// Rejects structurally invalid parameters before anything is sent.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::SubscribeUpdates { jid }
            | Self::ReactionMode { jid, .. }
            | Self::UpdateDescription { jid, .. }
            | Self::UpdatePicture { jid, .. }
            | Self::RemovePicture { jid }
            | Self::Follow { jid }
            | Self::Unfollow { jid }
            | Self::Mute { jid }
            | Self::Unmute { jid }
            | Self::Metadata { jid, .. }
            | Self::AdminCount { jid }
            | Self::Delete { jid }
            | Self::FetchMessageUpdates { jid, .. } => check_jid(jid),
            Self::UpdateName { jid, name } => {
                check_jid(jid)?;
                check_non_empty("name", name)
            }
            Self::Create { name, .. } => check_non_empty("name", name),
            Self::ChangeOwner { jid, user_id } | Self::Demote { jid, user_id } => {
                check_jid(jid)?;
                check_non_empty("user id", user_id)
            }
            Self::React { jid, server_id, .. } => {
                check_jid(jid)?;
                check_non_empty("server id", server_id)
            }
            Self::FetchMessages { source, .. } => match source {
                MessageSource::Jid(jid) => check_jid(jid),
                MessageSource::Invite(key) => check_non_empty("invite key", key),
            },
        }
    }

    /// Wires the operation to its request shape. `server_jid` addresses
    /// history fetches that go to the service rather than the channel.
    pub fn into_wire(self, server_jid: &str) -> WireRequest {
        match self {
            Self::SubscribeUpdates { jid } => WireRequest::Tagged {
                to: jid,
                mode: IqType::Set,
                content: vec![BinaryNode::new("live_updates").with_children(Vec::new())],
            },
            Self::ReactionMode { jid, mode } => tunneled(
                Some(jid),
                QueryId::JobMutation,
                fields([(
                    "updates",
                    json!({ "settings": { "reaction_codes": { "value": mode.as_str() } } }),
                )]),
            ),
            Self::UpdateDescription { jid, description } => tunneled(
                Some(jid),
                QueryId::JobMutation,
                fields([(
                    "updates",
                    json!({ "description": description.unwrap_or_default(), "settings": null }),
                )]),
            ),
            Self::UpdateName { jid, name } => tunneled(
                Some(jid),
                QueryId::JobMutation,
                fields([("updates", json!({ "name": name, "settings": null }))]),
            ),
            Self::UpdatePicture { jid, picture } => tunneled(
                Some(jid),
                QueryId::JobMutation,
                fields([("updates", json!({ "picture": picture, "settings": null }))]),
            ),
            Self::RemovePicture { jid } => tunneled(
                Some(jid),
                QueryId::JobMutation,
                fields([("updates", json!({ "picture": "", "settings": null }))]),
            ),
            Self::Follow { jid } => tunneled(Some(jid), QueryId::Follow, Map::new()),
            Self::Unfollow { jid } => tunneled(Some(jid), QueryId::Unfollow, Map::new()),
            Self::Mute { jid } => tunneled(Some(jid), QueryId::Mute, Map::new()),
            Self::Unmute { jid } => tunneled(Some(jid), QueryId::Unmute, Map::new()),
            Self::Create { name, description } => tunneled(
                None,
                QueryId::Create,
                fields([("input", json!({ "name": name, "description": description }))]),
            ),
            Self::Metadata { jid, role } => {
                let input = fields([
                    (
                        "input",
                        json!({ "key": jid, "type": "JID", "view_role": role.as_str() }),
                    ),
                    ("fetch_viewer_metadata", Value::Bool(true)),
                    ("fetch_full_image", Value::Bool(true)),
                    ("fetch_creation_time", Value::Bool(true)),
                ]);
                tunneled(Some(jid), QueryId::Metadata, input)
            }
            Self::AdminCount { jid } => tunneled(Some(jid), QueryId::AdminCount, Map::new()),
            Self::ChangeOwner { jid, user_id } => {
                tunneled(Some(jid), QueryId::ChangeOwner, fields([("user_id", Value::String(user_id))]))
            }
            Self::Demote { jid, user_id } => {
                tunneled(Some(jid), QueryId::Demote, fields([("user_id", Value::String(user_id))]))
            }
            Self::Delete { jid } => tunneled(Some(jid), QueryId::Delete, Map::new()),
            Self::React {
                jid,
                server_id,
                code,
            } => WireRequest::Reaction {
                to: jid,
                server_id,
                code: code.filter(|c| !c.is_empty()),
            },
            Self::FetchMessages {
                source,
                count,
                after,
            } => WireRequest::Tagged {
                to: server_jid.to_string(),
                mode: IqType::Get,
                content: vec![
                    BinaryNode::new("messages")
                        .with_attr("type", source.kind())
                        .with_attr(source.key_attr(), source.key())
                        .with_attr("count", count.to_string())
                        .with_attr("after", after.to_string()),
                ],
            },
            Self::FetchMessageUpdates {
                jid,
                count,
                after,
                since,
            } => WireRequest::Tagged {
                to: jid,
                mode: IqType::Get,
                content: vec![
                    BinaryNode::new("messages_updates")
                        .with_attr("count", count.to_string())
                        .with_attr("after", after.to_string())
                        .with_attr("since", since.to_string()),
                ],
            },
        }
    }
}

fn tunneled(
    newsletter_id: Option<String>,
    query_id: QueryId,
    variables: Map<String, Value>,
) -> WireRequest {
    WireRequest::Tunneled {
        newsletter_id,
        query_id,
        variables,
    }
}

/// Top-level variables in the order they are written.
fn fields<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub(crate) fn check_jid(jid: &str) -> Result<()> {
    if is_newsletter_jid(jid) {
        Ok(())
    } else {
        Err(NewsletterError::invalid(format!(
            "'{}' is not a newsletter address",
            jid
        )))
    }
}

fn check_non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(NewsletterError::invalid(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JID: &str = "120363@newsletter";

    #[test]
    fn every_channel_operation_checks_the_address() {
        let bad = "120363@s.whatsapp.net".to_string();
        let requests = vec![
            NewsletterRequest::Follow { jid: bad.clone() },
            NewsletterRequest::Delete { jid: bad.clone() },
            NewsletterRequest::Metadata {
                jid: bad.clone(),
                role: ViewRole::Guest,
            },
            NewsletterRequest::FetchMessages {
                source: MessageSource::Jid(bad.clone()),
                count: 10,
                after: 0,
            },
        ];
        for request in requests {
            assert!(matches!(
                request.validate(),
                Err(NewsletterError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn create_needs_a_name_but_no_address() {
        let ok = NewsletterRequest::Create {
            name: "Daily".into(),
            description: String::new(),
        };
        assert!(ok.validate().is_ok());

        let empty = NewsletterRequest::Create {
            name: "  ".into(),
            description: "d".into(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn missing_description_is_sent_empty() {
        let wire = NewsletterRequest::UpdateDescription {
            jid: JID.into(),
            description: None,
        }
        .into_wire("s.whatsapp.net");

        let WireRequest::Tunneled { variables, query_id, .. } = wire else {
            panic!("expected tunneled request");
        };
        assert_eq!(query_id, QueryId::JobMutation);
        assert_eq!(
            Value::Object(variables),
            json!({ "updates": { "description": "", "settings": null } })
        );
    }

    #[test]
    fn metadata_lookup_variables_in_order() {
        let wire = NewsletterRequest::Metadata {
            jid: JID.into(),
            role: ViewRole::Owner,
        }
        .into_wire("s.whatsapp.net");

        let WireRequest::Tunneled {
            newsletter_id,
            variables,
            ..
        } = wire
        else {
            panic!("expected tunneled request");
        };
        assert_eq!(newsletter_id.as_deref(), Some(JID));
        let keys: Vec<_> = variables.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["input", "fetch_viewer_metadata", "fetch_full_image", "fetch_creation_time"]
        );
        assert_eq!(variables["input"]["view_role"], "OWNER");
    }

    #[test]
    fn empty_reaction_code_means_removal() {
        let wire = NewsletterRequest::React {
            jid: JID.into(),
            server_id: "101".into(),
            code: Some(String::new()),
        }
        .into_wire("s.whatsapp.net");
        assert_eq!(
            wire,
            WireRequest::Reaction {
                to: JID.into(),
                server_id: "101".into(),
                code: None,
            }
        );
    }

    #[test]
    fn invite_fetch_uses_key_attribute() {
        let wire = NewsletterRequest::FetchMessages {
            source: MessageSource::Invite("AbCdEf".into()),
            count: 25,
            after: 100,
        }
        .into_wire("s.whatsapp.net");

        let WireRequest::Tagged { to, mode, content } = wire else {
            panic!("expected tagged request");
        };
        assert_eq!(to, "s.whatsapp.net");
        assert_eq!(mode, IqType::Get);
        assert_eq!(
            content,
            vec![
                BinaryNode::new("messages")
                    .with_attr("type", "invite")
                    .with_attr("key", "AbCdEf")
                    .with_attr("count", "25")
                    .with_attr("after", "100")
            ]
        );
    }
}
