//! Herald Socket
//!
//! Translates newsletter (broadcast channel) operations into the service's
//! two query shapes and turns the replies back into typed results:
//! - legacy tagged `iq` commands in the `newsletter` namespace
//! - `w:mex` queries tunneling an opaque query id plus JSON variables
//!
//! The transport, decryption and picture derivation are collaborators
//! supplied by the surrounding session.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod parser;
pub mod picture;
pub mod registry;
pub mod request;
pub mod socket;
pub mod transport;

pub use config::NewsletterConfig;
pub use dispatcher::Dispatcher;
pub use error::{NewsletterError, Result, TransportError};
pub use ids::{MessageTagGenerator, generate_message_id};
pub use metadata::{MetadataKind, extract_newsletter_metadata, normalize_metadata};
pub use parser::MessageUpdate;
pub use picture::{MediaUpload, PictureDeriver};
pub use registry::{QueryId, XwaPath};
pub use request::{IqType, NewsletterRequest, WireRequest};
pub use socket::NewsletterSocket;
pub use transport::Transport;
