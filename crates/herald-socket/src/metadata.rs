use serde::Deserialize;
use serde_json::Value;

use herald_types::{BinaryNode, LiveUpdates, NewsletterMetadata};

use crate::error::{NewsletterError, Result};
use crate::parser::{decode_result_payload, extract_named_child};
use crate::registry::XwaPath;

/// Which operation produced the reply; creation and lookup nest the
/// metadata under different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Create,
    Lookup,
}

impl MetadataKind {
    fn path(self) -> XwaPath {
        match self {
            Self::Create => XwaPath::Create,
            Self::Lookup => XwaPath::Newsletter,
        }
    }
}

// Reply shape as the service sends it. Only the normalizer sees these.

#[derive(Deserialize)]
struct WireNewsletter {
    id: String,
    state: WireState,
    thread_metadata: WireThread,
    viewer_metadata: Option<Value>,
}

#[derive(Deserialize)]
struct WireState {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct WireThread {
    creation_time: Numeric,
    name: WireText,
    description: WireText,
    invite: Option<String>,
    handle: Option<String>,
    picture: Option<WireImage>,
    preview: Option<WireImage>,
    settings: Option<WireSettings>,
    subscribers_count: Numeric,
    verification: Option<String>,
}

#[derive(Deserialize)]
struct WireText {
    text: String,
    update_time: Numeric,
}

#[derive(Deserialize)]
struct WireImage {
    direct_path: Option<String>,
}

#[derive(Deserialize)]
struct WireSettings {
    reaction_codes: Option<WireReactionCodes>,
}

#[derive(Deserialize)]
struct WireReactionCodes {
    value: Option<String>,
}

/// Integers arrive as decimal strings; plain JSON numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Text(String),
    Int(i64),
}

impl Numeric {
    fn to_i64(&self, field: &str) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Text(s) => s.trim().parse().map_err(|_| {
                NewsletterError::malformed(format!("{} is not an integer: '{}'", field, s))
            }),
        }
    }

    fn to_u64(&self, field: &str) -> Result<u64> {
        let n = self.to_i64(field)?;
        u64::try_from(n)
            .map_err(|_| NewsletterError::malformed(format!("{} is negative: {}", field, n)))
    }
}

fn direct_path(image: Option<WireImage>) -> Option<String> {
    image
        .and_then(|i| i.direct_path)
        .filter(|p| !p.is_empty())
}

/// Normalizes the metadata carried by a tunneled create or lookup reply.
pub fn extract_newsletter_metadata(
    reply: &BinaryNode,
    kind: MetadataKind,
) -> Result<NewsletterMetadata> {
    let payload = decode_result_payload(reply)?;
    normalize_metadata(&payload, kind)
}

/// Projects decoded reply JSON into a `NewsletterMetadata`.
pub fn normalize_metadata(payload: &Value, kind: MetadataKind) -> Result<NewsletterMetadata> {
    let node = data_path(payload, kind.path())?;
    let wire = WireNewsletter::deserialize(node).map_err(|e| {
        NewsletterError::malformed(format!("{}: {}", kind.path().as_str(), e))
    })?;

    let thread = wire.thread_metadata;
    Ok(NewsletterMetadata {
        id: wire.id,
        state: wire.state.kind,
        creation_time: thread.creation_time.to_i64("creation_time")?,
        name: thread.name.text,
        name_time: thread.name.update_time.to_i64("name.update_time")?,
        description: thread.description.text,
        description_time: thread.description.update_time.to_i64("description.update_time")?,
        invite: thread.invite,
        handle: thread.handle,
        picture: direct_path(thread.picture),
        preview: direct_path(thread.preview),
        reaction_codes: thread
            .settings
            .and_then(|s| s.reaction_codes)
            .and_then(|r| r.value),
        subscribers: thread.subscribers_count.to_u64("subscribers_count")?,
        verification: thread.verification,
        viewer_metadata: wire.viewer_metadata.filter(|v| !v.is_null()),
    })
}

/// Number of admins from an admin count reply.
pub fn extract_admin_count(reply: &BinaryNode) -> Result<u64> {
    let payload = decode_result_payload(reply)?;
    let node = data_path(&payload, XwaPath::AdminCount)?;
    let count = node
        .get("admin_count")
        .ok_or_else(|| NewsletterError::malformed("admin count reply without admin_count"))?;
    Numeric::deserialize(count)
        .map_err(|_| NewsletterError::malformed(format!("admin_count is not an integer: {}", count)))?
        .to_u64("admin_count")
}

/// Subscription attributes straight off the reply tree.
pub fn extract_live_updates(reply: &BinaryNode) -> Result<LiveUpdates> {
    let node = extract_named_child(reply, "live_updates")
        .ok_or_else(|| NewsletterError::malformed("reply has no <live_updates> child"))?;
    let duration = node
        .attr("duration")
        .ok_or_else(|| NewsletterError::malformed("<live_updates> without duration"))?;
    Ok(LiveUpdates {
        duration: duration.to_string(),
    })
}

fn data_path(payload: &Value, path: XwaPath) -> Result<&Value> {
    match payload.get("data").and_then(|d| d.get(path.as_str())) {
        Some(node) if !node.is_null() => Ok(node),
        _ => {
            let reason = payload
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .map(|m| format!(" (server said: {})", m))
                .unwrap_or_default();
            Err(NewsletterError::malformed(format!(
                "reply has no data.{}{}",
                path.as_str(),
                reason
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn thread(subscribers: Value) -> Value {
        json!({
            "creation_time": "1000",
            "name": { "text": "Daily", "update_time": "1001" },
            "description": { "text": "News", "update_time": "1002" },
            "invite": "0029Va",
            "handle": null,
            "preview": { "direct_path": "/v/preview" },
            "settings": { "reaction_codes": { "value": "BASIC" } },
            "subscribers_count": subscribers,
            "verification": "UNVERIFIED",
        })
    }

    #[test]
    fn lookup_fixture_is_coerced() {
        let payload = json!({
            "data": {
                "xwa2_newsletter": {
                    "id": "120363@newsletter",
                    "state": { "type": "ACTIVE" },
                    "thread_metadata": thread(json!("42")),
                    "viewer_metadata": { "mute": "OFF", "role": "SUBSCRIBER" },
                }
            }
        });

        let meta = normalize_metadata(&payload, MetadataKind::Lookup).unwrap();
        assert_eq!(meta.subscribers, 42);
        assert_eq!(meta.creation_time, 1000);
        assert_eq!(meta.name_time, 1001);
        assert_eq!(meta.description_time, 1002);
        assert_eq!(meta.picture, None);
        assert_eq!(meta.preview.as_deref(), Some("/v/preview"));
        assert_eq!(meta.reaction_codes.as_deref(), Some("BASIC"));
        assert_eq!(meta.state, "ACTIVE");
        assert_eq!(meta.handle, None);
        assert_eq!(meta.viewer_metadata, Some(json!({ "mute": "OFF", "role": "SUBSCRIBER" })));
    }

    #[test]
    fn unrecognised_reaction_mode_passes_through() {
        let mut thread_metadata = thread(json!(7));
        thread_metadata["settings"]["reaction_codes"]["value"] = json!("BLOCKLIST");
        let payload = json!({
            "data": {
                "xwa2_newsletter": {
                    "id": "120363@newsletter",
                    "state": { "type": "ACTIVE" },
                    "thread_metadata": thread_metadata,
                }
            }
        });

        let meta = normalize_metadata(&payload, MetadataKind::Lookup).unwrap();
        assert_eq!(meta.reaction_codes.as_deref(), Some("BLOCKLIST"));
        assert_eq!(meta.subscribers, 7);
    }

    #[test]
    fn numeric_string_that_is_not_a_number() {
        let payload = json!({
            "data": {
                "xwa2_newsletter": {
                    "id": "1@newsletter",
                    "state": { "type": "ACTIVE" },
                    "thread_metadata": thread(json!("lots")),
                }
            }
        });
        let err = normalize_metadata(&payload, MetadataKind::Lookup).unwrap_err();
        assert!(matches!(err, NewsletterError::MalformedReply(ref m) if m.contains("subscribers_count")));
    }

    #[test]
    fn wrong_path_is_malformed() {
        let payload = json!({
            "data": { "xwa2_newsletter": { "id": "1@newsletter" } }
        });
        assert!(matches!(
            normalize_metadata(&payload, MetadataKind::Create),
            Err(NewsletterError::MalformedReply(_))
        ));

        let payload = json!({ "data": null, "errors": [{ "message": "not authorized" }] });
        let err = normalize_metadata(&payload, MetadataKind::Lookup).unwrap_err();
        assert!(err.to_string().contains("not authorized"));
    }

    #[test]
    fn empty_direct_path_is_none() {
        assert_eq!(direct_path(Some(WireImage { direct_path: Some(String::new()) })), None);
        assert_eq!(direct_path(Some(WireImage { direct_path: None })), None);
        assert_eq!(direct_path(None), None);
    }

    #[test]
    fn live_updates_need_duration() {
        let reply = BinaryNode::new("iq").with_children(vec![
            BinaryNode::new("live_updates").with_attr("duration", "300"),
        ]);
        assert_eq!(extract_live_updates(&reply).unwrap().duration, "300");

        let reply = BinaryNode::new("iq");
        assert!(extract_live_updates(&reply).is_err());
    }

    #[test]
    fn admin_count_from_number() {
        let reply = BinaryNode::new("iq").with_children(vec![BinaryNode::new("result").with_bytes(
            br#"{"data":{"xwa2_newsletter_admin":{"admin_count":3}}}"#.to_vec(),
        )]);
        assert_eq!(extract_admin_count(&reply).unwrap(), 3);
    }
}
