use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use herald_crypto::{DecryptError, DecryptedMessage, MessageDecryptor, OwnIdentity};
use herald_types::{Attrs, BinaryNode, MessageCounters};

use crate::error::{NewsletterError, Result};

/// One fetched channel post with its counters and decryption outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUpdate {
    pub server_id: String,
    /// `None` when the server sent no view count.
    pub views: Option<u64>,
    pub reactions: Vec<Attrs>,
    /// A failure here concerns this post only.
    pub message: std::result::Result<DecryptedMessage, DecryptError>,
}

/// First immediate child tagged `name`. Absence is a normal outcome.
pub fn extract_named_child<'a>(tree: &'a BinaryNode, name: &str) -> Option<&'a BinaryNode> {
    tree.child(name)
}

pub fn extract_all_children(tree: &BinaryNode) -> &[BinaryNode] {
    tree.children()
}

/// Reads a node's byte payload as UTF-8 JSON.
pub fn decode_json_payload(node: &BinaryNode) -> Result<Value> {
    let bytes = node.bytes().ok_or_else(|| {
        NewsletterError::MalformedPayload(format!("<{}> carries no byte payload", node.tag))
    })?;
    let text = std::str::from_utf8(bytes)
        .map_err(|e| NewsletterError::MalformedPayload(format!("<{}> is not UTF-8: {}", node.tag, e)))?;
    serde_json::from_str(text)
        .map_err(|e| NewsletterError::MalformedPayload(format!("<{}> is not JSON: {}", node.tag, e)))
}

/// Decodes the JSON carried by the `result` child of a tunneled reply.
pub fn decode_result_payload(reply: &BinaryNode) -> Result<Value> {
    let result = extract_named_child(reply, "result")
        .ok_or_else(|| NewsletterError::malformed("reply has no <result> child"))?;
    decode_json_payload(result)
}

/// Server id, view count and reactions of a single post node.
pub fn read_counters(message: &BinaryNode) -> Result<MessageCounters> {
    let server_id = message
        .attr("server_id")
        .ok_or_else(|| NewsletterError::malformed("message node without server_id"))?
        .to_string();

    let views = match extract_named_child(message, "views_count").and_then(|v| v.attr("count")) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            NewsletterError::malformed(format!("post {} has view count '{}'", server_id, raw))
        })?),
        None => None,
    };

    let reactions = message
        .children_named("reactions")
        .map(|r| r.attrs.clone())
        .collect();

    Ok(MessageCounters {
        server_id,
        views,
        reactions,
    })
}

/// Parses a history reply and decrypts every post.
///
/// Decryption runs at most `concurrency` posts at a time. The result keeps
/// the order posts appear in the reply, and a post that fails to decrypt is
/// still returned with its error.
pub async fn parse_message_batch<D: MessageDecryptor>(
    reply: &BinaryNode,
    decryptor: &D,
    me: &OwnIdentity,
    concurrency: usize,
) -> Result<Vec<MessageUpdate>> {
    let Some(messages) = extract_named_child(reply, "messages") else {
        return Ok(Vec::new());
    };
    let channel = messages.attr("jid");

    let mut items = Vec::with_capacity(messages.children().len());
    for node in extract_all_children(messages) {
        let counters = read_counters(node)?;
        let mut node = node.clone();
        if let Some(jid) = channel {
            node.attrs
                .entry("from".to_string())
                .or_insert_with(|| jid.to_string());
        }
        items.push((counters, node));
    }
    debug!("decrypting {} newsletter posts", items.len());

    let me_id = me.id.as_str();
    let me_lid = me.lid_or_empty();
    let updates = stream::iter(items)
        .map(move |(counters, node)| async move {
            let message = decryptor.decrypt(&node, me_id, me_lid).await;
            if let Err(e) = &message {
                warn!("failed to decrypt newsletter post {}: {}", counters.server_id, e);
            }
            MessageUpdate {
                server_id: counters.server_id,
                views: counters.views,
                reactions: counters.reactions,
                message,
            }
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    Ok(updates)
}

/// Counters from a `message_updates` reply. Nothing is decrypted.
pub fn parse_message_counters(reply: &BinaryNode) -> Result<Vec<MessageCounters>> {
    let Some(messages) =
        extract_named_child(reply, "message_updates").and_then(|u| extract_named_child(u, "messages"))
    else {
        return Ok(Vec::new());
    };
    extract_all_children(messages).iter().map(read_counters).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(server_id: &str) -> BinaryNode {
        BinaryNode::new("message").with_attr("server_id", server_id)
    }

    #[test]
    fn malformed_bytes_are_reported() {
        let node = BinaryNode::new("result").with_bytes(b"{\"data\":".to_vec());
        assert!(matches!(
            decode_json_payload(&node),
            Err(NewsletterError::MalformedPayload(_))
        ));

        let node = BinaryNode::new("result").with_bytes(vec![0xff, 0xfe]);
        assert!(matches!(
            decode_json_payload(&node),
            Err(NewsletterError::MalformedPayload(_))
        ));

        let node = BinaryNode::new("result");
        assert!(matches!(
            decode_json_payload(&node),
            Err(NewsletterError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_result_child_is_malformed_reply() {
        let reply = BinaryNode::new("iq").with_attr("type", "result");
        assert!(matches!(
            decode_result_payload(&reply),
            Err(NewsletterError::MalformedReply(_))
        ));
    }

    #[test]
    fn absent_views_stay_absent() {
        let counters = read_counters(&post("1")).unwrap();
        assert_eq!(counters.views, None);

        let node = post("2").with_children(vec![BinaryNode::new("views_count").with_attr("count", "0")]);
        assert_eq!(read_counters(&node).unwrap().views, Some(0));
    }

    #[test]
    fn non_numeric_views_are_malformed() {
        let node = post("3").with_children(vec![BinaryNode::new("views_count").with_attr("count", "many")]);
        assert!(matches!(read_counters(&node), Err(NewsletterError::MalformedReply(_))));
    }

    #[test]
    fn reactions_keep_received_order() {
        let node = post("4").with_children(vec![
            BinaryNode::new("reactions").with_attr("code", "🔥").with_attr("count", "3"),
            BinaryNode::new("views_count").with_attr("count", "12"),
            BinaryNode::new("reactions").with_attr("code", "👍").with_attr("count", "9"),
        ]);
        let counters = read_counters(&node).unwrap();
        let codes: Vec<_> = counters
            .reactions
            .iter()
            .map(|r| r.get("code").map(String::as_str))
            .collect();
        assert_eq!(codes, vec![Some("🔥"), Some("👍")]);
        assert_eq!(counters.views, Some(12));
    }

    #[test]
    fn counters_reply_without_updates_is_empty() {
        let reply = BinaryNode::new("iq");
        assert!(parse_message_counters(&reply).unwrap().is_empty());

        let reply = BinaryNode::new("iq").with_children(vec![
            BinaryNode::new("message_updates").with_children(vec![
                BinaryNode::new("messages").with_children(vec![post("7"), post("8")]),
            ]),
        ]);
        let counters = parse_message_counters(&reply).unwrap();
        assert_eq!(counters.len(), 2);
        assert_eq!(counters[1].server_id, "8");
    }
}
