use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use herald_types::BinaryNode;

use crate::error::{NewsletterError, Result};
use crate::registry::QueryId;
use crate::request::{IqType, WireRequest};
use crate::transport::Transport;

/// Namespace of legacy tagged newsletter commands.
pub const XMLNS_NEWSLETTER: &str = "newsletter";

/// Namespace of the tunneled query envelope.
pub const XMLNS_MEX: &str = "w:mex";

/// Builds request trees and pushes them through the transport.
///
/// Every send consumes exactly one fresh id from the transport.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    server_jid: String,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            server_jid: self.server_jid.clone(),
        }
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: Arc<T>, server_jid: impl Into<String>) -> Self {
        Self {
            transport,
            server_jid: server_jid.into(),
        }
    }

    pub fn server_jid(&self) -> &str {
        &self.server_jid
    }

    /// Sends a request in whichever shape it was wired to.
    pub async fn send(&self, request: WireRequest) -> Result<BinaryNode> {
        match request {
            WireRequest::Tagged { to, mode, content } => self.send_tagged(&to, mode, content).await,
            WireRequest::Tunneled {
                newsletter_id,
                query_id,
                variables,
            } => {
                self.send_tunneled(newsletter_id.as_deref(), query_id, variables)
                    .await
            }
            WireRequest::Reaction {
                to,
                server_id,
                code,
            } => self.send_reaction(&to, &server_id, code.as_deref()).await,
        }
    }

    pub async fn send_tagged(
        &self,
        to: &str,
        mode: IqType,
        content: Vec<BinaryNode>,
    ) -> Result<BinaryNode> {
        let node = build_tagged(self.transport.generate_message_tag(), to, mode, content);
        debug!(
            "newsletter {} to {}: {:?}",
            mode.as_str(),
            to,
            node.children().iter().map(|c| c.tag.as_str()).collect::<Vec<_>>()
        );
        Ok(self.transport.query(node).await?)
    }

    /// Always a `get` to the routing address, whatever the operation does.
    pub async fn send_tunneled(
        &self,
        newsletter_id: Option<&str>,
        query_id: QueryId,
        fields: Map<String, Value>,
    ) -> Result<BinaryNode> {
        let node = build_tunneled(
            self.transport.generate_message_tag(),
            &self.server_jid,
            newsletter_id,
            query_id,
            fields,
        )?;
        debug!(
            "w:mex query {} ({}) for {}",
            query_id.name(),
            query_id.as_str(),
            newsletter_id.unwrap_or("<new>")
        );
        Ok(self.transport.query(node).await?)
    }

    pub async fn send_reaction(
        &self,
        to: &str,
        server_id: &str,
        code: Option<&str>,
    ) -> Result<BinaryNode> {
        let node = build_reaction(self.transport.generate_message_id(), to, server_id, code);
        debug!("reaction {:?} on {} post {}", code, to, server_id);
        Ok(self.transport.query(node).await?)
    }
}

pub fn build_tagged(id: String, to: &str, mode: IqType, content: Vec<BinaryNode>) -> BinaryNode {
    BinaryNode::new("iq")
        .with_attr("id", id)
        .with_attr("type", mode.as_str())
        .with_attr("xmlns", XMLNS_NEWSLETTER)
        .with_attr("to", to)
        .with_children(content)
}

/// `iq{type=get, xmlns=w:mex}` wrapping one `query` node whose payload is
/// `{"variables":{"newsletter_id":..., ...fields}}`.
pub fn build_tunneled(
    id: String,
    server_jid: &str,
    newsletter_id: Option<&str>,
    query_id: QueryId,
    fields: Map<String, Value>,
) -> Result<BinaryNode> {
    let mut variables = Map::new();
    variables.insert(
        "newsletter_id".to_string(),
        newsletter_id.map_or(Value::Null, |id| Value::String(id.to_string())),
    );
    for (key, value) in fields {
        if key != "newsletter_id" {
            variables.insert(key, value);
        }
    }

    let mut envelope = Map::new();
    envelope.insert("variables".to_string(), Value::Object(variables));
    let payload = serde_json::to_vec(&Value::Object(envelope))
        .map_err(|e| NewsletterError::invalid(format!("unencodable variables: {}", e)))?;

    Ok(BinaryNode::new("iq")
        .with_attr("id", id)
        .with_attr("type", IqType::Get.as_str())
        .with_attr("xmlns", XMLNS_MEX)
        .with_attr("to", server_jid)
        .with_children(vec![
            BinaryNode::new("query")
                .with_attr("query_id", query_id.as_str())
                .with_bytes(payload),
        ]))
}

/// A `message` stanza whose `reaction` child carries `code`, or no attrs to remove it.
pub fn build_reaction(id: String, to: &str, server_id: &str, code: Option<&str>) -> BinaryNode {
    let mut reaction = BinaryNode::new("reaction");
    if let Some(code) = code {
        reaction = reaction.with_attr("code", code);
    }

    BinaryNode::new("message")
        .with_attr("to", to)
        .with_attr("type", "reaction")
        .with_attr("server_id", server_id)
        .with_attr("id", id)
        .with_children(vec![reaction])
}
