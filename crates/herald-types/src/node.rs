use std::collections::BTreeMap;

use bytes::Bytes;

/// Well-known routing address of the service itself.
pub const S_WHATSAPP_NET: &str = "s.whatsapp.net";

/// Server suffix of every newsletter address.
pub const NEWSLETTER_SERVER: &str = "newsletter";

pub type Attrs = BTreeMap<String, String>;

/// Content of a node: nothing, nested nodes, or an opaque byte payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeContent {
    #[default]
    Empty,
    Nodes(Vec<BinaryNode>),
    Bytes(Bytes),
}

/// One node of the tree-structured binary protocol.
///
/// Serialization to the wire format is owned by the transport; this is only
/// the in-memory shape requests are built in and replies are walked in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryNode {
    pub tag: String,
    pub attrs: Attrs,
    pub content: NodeContent,
}

impl BinaryNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            content: NodeContent::Empty,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_children(mut self, children: Vec<BinaryNode>) -> Self {
        self.content = NodeContent::Nodes(children);
        self
    }

    pub fn with_bytes(mut self, payload: impl Into<Bytes>) -> Self {
        self.content = NodeContent::Bytes(payload.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Immediate children, empty for byte or empty content.
    pub fn children(&self) -> &[BinaryNode] {
        match &self.content {
            NodeContent::Nodes(nodes) => nodes,
            _ => &[],
        }
    }

    /// First immediate child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&BinaryNode> {
        self.children().iter().find(|c| c.tag == tag)
    }

    /// All immediate children with the given tag, in order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a BinaryNode> + 'a {
        self.children().iter().filter(move |c| c.tag == tag)
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.content {
            NodeContent::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// True for addresses on the newsletter server (`<id>@newsletter`).
pub fn is_newsletter_jid(jid: &str) -> bool {
    match jid.split_once('@') {
        Some((user, server)) => !user.is_empty() && server == NEWSLETTER_SERVER,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_lookup_returns_first_match() {
        let node = BinaryNode::new("iq").with_children(vec![
            BinaryNode::new("a").with_attr("n", "1"),
            BinaryNode::new("b"),
            BinaryNode::new("a").with_attr("n", "2"),
        ]);

        assert_eq!(node.child("a").and_then(|c| c.attr("n")), Some("1"));
        assert_eq!(node.children_named("a").count(), 2);
        assert!(node.child("missing").is_none());
    }

    #[test]
    fn byte_content_has_no_children() {
        let node = BinaryNode::new("result").with_bytes(b"{}".to_vec());
        assert!(node.children().is_empty());
        assert_eq!(node.bytes().map(|b| &b[..]), Some(&b"{}"[..]));
    }

    #[test]
    fn newsletter_jid_detection() {
        assert!(is_newsletter_jid("120363@newsletter"));
        assert!(!is_newsletter_jid("@newsletter"));
        assert!(!is_newsletter_jid("120363@s.whatsapp.net"));
        assert!(!is_newsletter_jid("120363"));
    }
}
