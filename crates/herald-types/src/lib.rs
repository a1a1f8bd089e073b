//! Shared data model for the Herald newsletter adapter: the protocol node
//! tree and the typed records replies are normalized into.

pub mod models;
pub mod node;

pub use models::{
    LiveUpdates, MessageCounters, MessageSource, NewsletterMetadata, ReactionMode,
    UnknownReactionMode, UnknownSourceKind, ViewRole,
};
pub use node::{Attrs, BinaryNode, NodeContent, S_WHATSAPP_NET, is_newsletter_jid};
